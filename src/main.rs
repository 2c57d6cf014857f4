use clap::Parser;
use imani_common::{format_hms, DiagnosticView, RunMode};
use imani_rust::{cli, config, error, export, extractor, pipeline, recommender, selector, spreadsheet, storage};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::debug!("{:?}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

/// RUST_LOG があれば優先、なければ warn（--verbose で debug）
fn init_tracing(verbose: bool) {
    let default = if verbose { "imani_rust=debug,imani=debug,warn" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let verbose = cli.verbose;

    match cli.command {
        Commands::Run {
            spreadsheet,
            sheet,
            company,
            all_companies,
            diagnostics,
            diagnostics_only,
            output,
            json,
            local_store,
        } => {
            let mode = RunMode::from_flags(diagnostics_only, diagnostics);
            println!("🚀 imani - {}\n", mode.label());

            // 1. 設定
            println!("[1/5] 設定を確認中...");
            let settings = Config::load()?.validate(mode.uses_ai(), local_store.as_deref())?;
            println!("✔ 設定OK\n");

            // 2. Excel
            println!("[2/5] Excelを読み込み中...");
            let mut workbook = spreadsheet::Workbook::open(&spreadsheet)?;
            if let Some(info) = workbook.info_sheet()? {
                if !info.is_empty() {
                    println!("📄 Informações da planilha");
                    println!("{}\n", export::summary::format_table(&[], &info));
                }
            }
            let sheet = selector::choose_sheet(sheet.as_deref(), &workbook.processable_sheets())?;
            let rows = workbook.read_rows(&sheet)?;
            let rows = if all_companies {
                rows
            } else {
                let companies = spreadsheet::companies(&rows);
                let company = selector::choose_company(company.as_deref(), &companies)?;
                spreadsheet::filter_company(&rows, &company)
            };
            println!("✔ {}行を検出 (シート: {})\n", rows.len(), sheet);

            if rows.is_empty() {
                println!("⚠ 処理対象の行がありません");
                return Ok(());
            }

            // 3. 接続
            println!("[3/5] ストレージに接続中...");
            let store = storage::connect(&settings.storage).await?;
            let recommender = recommender::from_settings(settings.ai.as_ref())?;
            println!("✔ 接続: {}\n", store.describe());

            // 4. 照合・解析
            println!("[4/5] 照合・解析中...");
            let pipeline = pipeline::Pipeline::new(
                store.as_ref(),
                &extractor::PdfTextExtractor,
                recommender.as_ref(),
                mode,
            );
            let bar = progress_bar(rows.len());
            let report = pipeline
                .run(&rows, |p| {
                    bar.set_position(p.completed as u64);
                    bar.set_message(format!(
                        "{} | decorrido {} | restante {}",
                        p.row.expected_filename,
                        format_hms(p.elapsed),
                        format_hms(p.eta)
                    ));
                    if verbose {
                        bar.println(format!("  {} / {} → {}", p.row.company, p.row.expected_filename, p.status.label()));
                    }
                })
                .await;
            bar.finish_and_clear();
            println!("✔ 解析完了\n");

            // 5. 出力
            println!("[5/5] 結果を出力中...");
            let options = export::ExportOptions {
                output_dir: output,
                json,
                view: DiagnosticView::Detailed,
            };
            export::summary::print_summary(&report, options.view);
            export::export_report(&report, &options)?;
        }

        Commands::Sheets { spreadsheet, sheet } => {
            println!("📊 imani - シート情報\n");
            let mut workbook = spreadsheet::Workbook::open(&spreadsheet)?;

            println!("シート:");
            let processable = workbook.processable_sheets();
            for name in workbook.sheet_names() {
                let marker = if processable.contains(&name) { "" } else { " (informativa)" };
                println!("  - {}{}", name, marker);
            }

            if let Some(info) = workbook.info_sheet()? {
                println!("\n📄 Informações da planilha");
                println!("{}", export::summary::format_table(&[], &info));
            }

            if let Some(name) = sheet {
                let rows = workbook.read_rows(&name)?;
                println!("\n会社 ({}行):", rows.len());
                for company in spreadsheet::companies(&rows) {
                    let count = rows.iter().filter(|r| r.company == company).count();
                    println!("  - {} ({}件)", company, count);
                }
            }
        }

        Commands::Config { show, set, check, local_store } => {
            if !set.is_empty() {
                let path = Config::config_path()?;
                let mut file_config = Config::load_from(&path)?;
                for assignment in &set {
                    file_config.set_entry(assignment)?;
                }
                file_config.save_to(&path)?;
                println!("✔ 設定を保存しました: {}", path.display());
            }

            if show || (set.is_empty() && !check) {
                println!("設定 ({}):", Config::config_path()?.display());
                for (key, value) in Config::load()?.entries_masked() {
                    println!("  {}: {}", key, value);
                }
            }

            if check {
                check_config(local_store).await?;
            }
        }
    }

    Ok(())
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

/// ストレージ接続とAI設定を確認
async fn check_config(local_store: Option<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    let local_store: Option<&Path> = local_store.as_deref();

    let settings = config.validate(false, local_store)?;
    let store = storage::connect(&settings.storage).await?;
    println!("✔ ストレージ接続OK: {}", store.describe());

    match config.validate(true, local_store) {
        Ok(settings) => {
            recommender::from_settings(settings.ai.as_ref())?;
            println!("✔ AI設定OK");
        }
        Err(e) => println!("⚠ {}（Somente Diagnóstico は実行可能）", e),
    }
    Ok(())
}
