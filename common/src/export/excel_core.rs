//! Excel生成（共通ライブラリ）
//!
//! table.rs の列定義を使って結果表・診断表の xlsx をバッファに生成

use crate::table::{
    diagnostic_cells, diagnostic_headers, result_cells, DiagnosticView, RESULT_HEADERS,
};
use crate::types::{DiagnosticRecord, ResultRecord};
use rust_xlsxwriter::*;

/// 結果表のシート名
pub const RESULT_SHEET_NAME: &str = "Resultados";
/// 診断表のシート名
pub const DIAGNOSTIC_SHEET_NAME: &str = "Diagnóstico";

/// 列ごとの幅（文字数）
const RESULT_COL_WIDTHS: &[f64] = &[20.0, 30.0, 32.0, 80.0, 50.0];
const DIAGNOSTIC_COL_WIDTH: f64 = 28.0;

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA))
}

fn value_format() -> Format {
    Format::new()
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::Top)
        .set_text_wrap()
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC))
}

/// ヘッダー行＋データ行を1シートに書き込む
fn write_table(
    worksheet: &mut Worksheet,
    headers: &[&str],
    rows: &[Vec<String>],
    widths: &[f64],
) -> Result<(), String> {
    let header_format = header_format();
    let value_format = value_format();

    for (col, header) in headers.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, *header, &header_format)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
        let width = widths.get(col as usize).copied().unwrap_or(DIAGNOSTIC_COL_WIDTH);
        worksheet
            .set_column_width(col, width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
    }

    for (row_idx, cells) in rows.iter().enumerate() {
        let row = row_idx as u32 + 1;
        for (col, value) in cells.iter().enumerate() {
            worksheet
                .write_string_with_format(row, col as u16, value, &value_format)
                .map_err(|e| format!("セル書き込みエラー: {}", e))?;
        }
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;

    Ok(())
}

/// 結果表をバッファに生成
pub fn generate_results_buffer(results: &[ResultRecord]) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(RESULT_SHEET_NAME)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    let rows: Vec<Vec<String>> = results.iter().map(result_cells).collect();
    write_table(worksheet, RESULT_HEADERS, &rows, RESULT_COL_WIDTHS)?;

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

/// 診断表をバッファに生成
pub fn generate_diagnostics_buffer(
    diagnostics: &[DiagnosticRecord],
    view: DiagnosticView,
) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(DIAGNOSTIC_SHEET_NAME)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    let headers = diagnostic_headers(view);
    let rows: Vec<Vec<String>> = diagnostics
        .iter()
        .map(|d| diagnostic_cells(d, view))
        .collect();
    write_table(worksheet, &headers, &rows, &[])?;

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}
