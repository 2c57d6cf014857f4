pub mod excel;
pub mod summary;

use crate::error::Result;
use crate::pipeline::RunReport;
use imani_common::{DiagnosticRecord, DiagnosticView, ResultRecord, RunMode};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 結果表のファイル名
pub const RESULT_FILE: &str = "resultado_ia.xlsx";
/// 診断表のファイル名
pub const DIAGNOSTIC_FILE: &str = "diagnostico_ia.xlsx";
/// JSON出力のファイル名
pub const JSON_FILE: &str = "resultado_ia.json";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    /// JSONも出力する
    pub json: bool,
    /// 診断表の列構成
    pub view: DiagnosticView,
}

impl ExportOptions {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            json: false,
            view: DiagnosticView::Detailed,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    mode: RunMode,
    elapsed_seconds: f64,
    results: &'a [ResultRecord],
    diagnostics: &'a [DiagnosticRecord],
}

/// 実行結果をファイルに出力し、書き出したパスを返す
pub fn export_report(report: &RunReport, options: &ExportOptions) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&options.output_dir)?;
    let mut written = Vec::new();

    let results_path = options.output_dir.join(RESULT_FILE);
    println!("- Excelを生成中...");
    excel::generate_results_excel(&report.results, &results_path)?;
    println!("✔ Excel出力: {}", results_path.display());
    written.push(results_path);

    if report.mode.wants_diagnostics() {
        let diagnostics_path = options.output_dir.join(DIAGNOSTIC_FILE);
        excel::generate_diagnostics_excel(&report.diagnostics, options.view, &diagnostics_path)?;
        println!("✔ 診断Excel出力: {}", diagnostics_path.display());
        written.push(diagnostics_path);
    }

    if options.json {
        let json_path = options.output_dir.join(JSON_FILE);
        write_json(report, &json_path)?;
        println!("✔ JSON出力: {}", json_path.display());
        written.push(json_path);
    }

    tracing::debug!(files = written.len(), "出力完了");
    Ok(written)
}

/// 結果と診断（全フィールド）をJSONで書き出す
pub fn write_json(report: &RunReport, path: &Path) -> Result<()> {
    let export = JsonExport {
        mode: report.mode,
        elapsed_seconds: report.elapsed.as_secs_f64(),
        results: &report.results,
        diagnostics: &report.diagnostics,
    };
    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(path, json)?;
    Ok(())
}
