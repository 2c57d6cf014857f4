//! Excel/JSON出力の統合テスト
//!
//! 書き出したファイルを calamine で読み戻して列と値を確認

use calamine::{open_workbook_auto, Data, Reader};
use imani_common::{build_diagnostic, DiagnosticView, ResultRecord, RowStatus, RunMode};
use imani_rust::export::{self, excel, ExportOptions};
use imani_rust::pipeline::{RowOutcome, RunReport};
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn create_result(company: &str, file: &str, status: RowStatus, recommendations: &[&str]) -> ResultRecord {
    ResultRecord {
        company: company.to_string(),
        expected_filename: file.to_string(),
        status,
        recommendations: recommendations.iter().map(|s| s.to_string()).collect(),
        link: Some(format!("https://conta.blob.core.windows.net/relatorios/{}.pdf", file)),
    }
}

fn read_back(path: &Path) -> Vec<Vec<String>> {
    let mut workbook = open_workbook_auto(path).expect("読み込み失敗");
    let name = workbook.sheet_names()[0].clone();
    let range = workbook.worksheet_range(&name).expect("シート読み込み失敗");
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

fn sample_report(mode: RunMode) -> RunReport {
    let results = vec![
        create_result("Acme", "rel1", RowStatus::Found, &["Reforçar drenagem", "Revisar talude"]),
        create_result("Acme", "rel2", RowStatus::NotFound, &[]),
    ];
    let diagnostics = if mode.wants_diagnostics() {
        vec![
            build_diagnostic(
                "rel1",
                Some("Relatórios Técnicos/Acme/Relatórios/rel1.pdf"),
                "Relatório\nElaborado por: Geo",
                Some(4),
            ),
            build_diagnostic("rel2", None, "", None),
        ]
    } else {
        vec![]
    };

    RunReport {
        mode,
        results,
        diagnostics,
        outcomes: vec![RowOutcome::Success, RowOutcome::Success],
        elapsed: Duration::from_secs(12),
    }
}

#[test]
fn test_results_excel_columns() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("resultado_ia.xlsx");
    let report = sample_report(RunMode::Normal { diagnostics: false });

    let result = excel::generate_results_excel(&report.results, &output_path);
    assert!(result.is_ok(), "Excel生成に失敗: {:?}", result.err());

    let rows = read_back(&output_path);
    assert_eq!(rows[0], vec!["Empresa", "Arquivo", "Status", "Recomendações", "Link"]);
    assert_eq!(rows[1][2], "✔️ Encontrado");
    assert_eq!(rows[1][3], "Reforçar drenagem\nRevisar talude");
    assert_eq!(rows[2][2], "❌ Arquivo não encontrado");
    assert_eq!(rows[2][3], "-");
}

#[test]
fn test_diagnostics_excel_detailed_view() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("diagnostico_ia.xlsx");
    let report = sample_report(RunMode::DiagnosticsOnly);

    excel::generate_diagnostics_excel(&report.diagnostics, DiagnosticView::Detailed, &output_path)
        .expect("診断Excel生成に失敗");

    let rows = read_back(&output_path);
    assert_eq!(rows[0], vec!["Nome no Excel", "Nome Encontrado", "Match Exato", "Páginas"]);
    assert_eq!(rows[1], vec!["rel1", "rel1.pdf", "Sim", "4"]);
    assert_eq!(rows[2], vec!["rel2", "-", "Não", "-"]);
}

#[test]
fn test_export_report_writes_expected_files() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_dir = dir.path().join("saida");
    let report = sample_report(RunMode::Normal { diagnostics: true });

    let options = ExportOptions {
        json: true,
        ..ExportOptions::new(&output_dir)
    };
    let written = export::export_report(&report, &options).expect("出力に失敗");

    assert_eq!(written.len(), 3);
    assert!(output_dir.join(export::RESULT_FILE).exists());
    assert!(output_dir.join(export::DIAGNOSTIC_FILE).exists());

    let json = std::fs::read_to_string(output_dir.join(export::JSON_FILE)).expect("JSON読み込み");
    let value: serde_json::Value = serde_json::from_str(&json).expect("JSON解析");
    assert_eq!(value["results"][0]["status"], "found");
    assert_eq!(value["results"][1]["status"], "not-found");
    // JSONは全フィールドを保持
    assert_eq!(value["diagnostics"][0]["issuer"], "Elaborado por: Geo");
    assert!(value["diagnostics"][1]["matchedKey"].is_null());
}

#[test]
fn test_export_without_diagnostics_skips_diagnostic_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let report = sample_report(RunMode::Normal { diagnostics: false });

    let written = export::export_report(&report, &ExportOptions::new(dir.path())).expect("出力に失敗");

    assert_eq!(written, vec![dir.path().join(export::RESULT_FILE)]);
    assert!(!dir.path().join(export::DIAGNOSTIC_FILE).exists());
    assert!(!dir.path().join(export::JSON_FILE).exists());
}

#[test]
fn test_excel_generation_empty_results() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("empty.xlsx");

    let result = excel::generate_results_excel(&[], &output_path);

    // 空の結果でもヘッダーだけのファイルを作る
    assert!(result.is_ok(), "空のExcel生成に失敗: {:?}", result.err());
    assert_eq!(read_back(&output_path).len(), 1);
}
