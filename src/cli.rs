use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imani")]
#[command(about = "技術報告書AI解析ツール（Blob照合・推奨事項抽出・診断）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Excelの行をBlob上の報告書と照合して解析
    Run {
        /// 入力Excelファイル
        #[arg(required = true)]
        spreadsheet: PathBuf,

        /// 処理するシート（省略時は対話選択）
        #[arg(long)]
        sheet: Option<String>,

        /// 処理する会社（省略時は対話選択）
        #[arg(short, long, conflicts_with = "all_companies")]
        company: Option<String>,

        /// 全会社を処理
        #[arg(long)]
        all_companies: bool,

        /// 診断表も作成
        #[arg(short, long)]
        diagnostics: bool,

        /// 診断のみ（AIを呼ばない）
        #[arg(long)]
        diagnostics_only: bool,

        /// 出力ディレクトリ
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// JSONも出力
        #[arg(long)]
        json: bool,

        /// Blobの代わりにローカルディレクトリを使う
        #[arg(long)]
        local_store: Option<PathBuf>,
    },

    /// シート一覧・案内シート・会社一覧を表示
    Sheets {
        /// 入力Excelファイル
        #[arg(required = true)]
        spreadsheet: PathBuf,

        /// 会社一覧を表示するシート
        #[arg(long)]
        sheet: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 設定を変更（KEY=VALUE）
        #[arg(long, value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// 設定とストレージ接続を確認
        #[arg(long)]
        check: bool,

        /// 確認時にBlobの代わりに使うローカルディレクトリ
        #[arg(long, requires = "check")]
        local_store: Option<PathBuf>,
    },
}
