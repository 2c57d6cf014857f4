//! Excel出力（CLI版）
//!
//! 共通ライブラリの excel_core でバッファを作り、ファイルに書き出す

use crate::error::{ImaniError, Result};
use imani_common::export::excel_core;
use imani_common::{DiagnosticRecord, DiagnosticView, ResultRecord};
use std::path::Path;

pub fn generate_results_excel(results: &[ResultRecord], output_path: &Path) -> Result<()> {
    let buffer = excel_core::generate_results_buffer(results).map_err(ImaniError::ExcelGeneration)?;
    std::fs::write(output_path, buffer)?;
    Ok(())
}

pub fn generate_diagnostics_excel(
    diagnostics: &[DiagnosticRecord],
    view: DiagnosticView,
    output_path: &Path,
) -> Result<()> {
    let buffer = excel_core::generate_diagnostics_buffer(diagnostics, view)
        .map_err(ImaniError::ExcelGeneration)?;
    std::fs::write(output_path, buffer)?;
    Ok(())
}
