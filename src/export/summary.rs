//! コンソール表示
//!
//! 結果表・診断表を等幅の罫線なしテーブルとして出力する

use crate::pipeline::RunReport;
use imani_common::table::{diagnostic_cells, diagnostic_headers, result_cells, RESULT_HEADERS};
use imani_common::{format_hms, DiagnosticView};

/// 1セルの最大表示幅（文字数）
const MAX_CELL_CHARS: usize = 60;

/// セルを1行に収める（改行は " | "、長すぎれば省略）
fn display_cell(cell: &str) -> String {
    let flat = cell.replace('\n', " | ");
    if flat.chars().count() > MAX_CELL_CHARS {
        let truncated: String = flat.chars().take(MAX_CELL_CHARS - 1).collect();
        format!("{}…", truncated)
    } else {
        flat
    }
}

/// 表を文字列に整形
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let header_cells: Vec<String> = headers.iter().map(|h| display_cell(h)).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(|c| display_cell(c)).collect())
        .collect();

    let columns = body.iter().map(Vec::len).chain([header_cells.len()]).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(&header_cells).chain(&body) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{}{}", cell, " ".repeat(w - cell.chars().count())))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    // ヘッダーなしなら本文だけ
    let mut lines = Vec::new();
    if !header_cells.is_empty() {
        lines.push(render(&header_cells));
        lines.push(
            widths
                .iter()
                .map(|&w| "-".repeat(w))
                .collect::<Vec<_>>()
                .join("  "),
        );
    }
    lines.extend(body.iter().map(|row| render(row)));
    lines.join("\n")
}

/// 実行結果のサマリーを表示
pub fn print_summary(report: &RunReport, view: DiagnosticView) {
    let rows: Vec<Vec<String>> = report.results.iter().map(result_cells).collect();
    println!("\n{}", format_table(RESULT_HEADERS, &rows));

    if report.mode.wants_diagnostics() && !report.diagnostics.is_empty() {
        let headers = diagnostic_headers(view);
        let rows: Vec<Vec<String>> = report
            .diagnostics
            .iter()
            .map(|d| diagnostic_cells(d, view))
            .collect();
        println!("\n📋 Diagnóstico\n{}", format_table(&headers, &rows));
    }

    println!(
        "\n✅ 完了 [{}] 所要時間 {} ({}件中 {}件検出)",
        report.mode.label(),
        format_hms(report.elapsed),
        report.results.len(),
        report.found_count()
    );

    let degraded = report.degraded_count();
    let failed = report.failed_count();
    if degraded + failed > 0 {
        println!("⚠ 一部失敗: {}件, 取得失敗: {}件", degraded, failed);
    }
}
