//! 照合結果の型定義
//!
//! CLIとパイプラインで共有される型:
//! - ProjectRow: Excelの1行（会社 → 報告書ファイル名）
//! - RowStatus / ResultRecord: 結果表の1行
//! - DiagnosticRecord: 診断表の1行
//! - RunMode: 通常解析か診断のみか

use serde::{Deserialize, Serialize};

/// エクスポート時に「データなし」を表すプレースホルダ
pub const SENTINEL: &str = "-";

/// 処理対象の1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRow {
    /// 会社名（Empresa）。Blobのパス生成にも使う
    pub company: String,
    /// 拡張子なしのファイル名（Nome do arquivo salvo）
    pub expected_filename: String,
}

impl ProjectRow {
    /// 前後の空白を除去して生成。どちらかが空なら None
    pub fn new(company: &str, expected_filename: &str) -> Option<Self> {
        let company = company.trim();
        let expected_filename = expected_filename.trim();
        if company.is_empty() || expected_filename.is_empty() {
            return None;
        }
        Some(Self {
            company: company.to_string(),
            expected_filename: expected_filename.to_string(),
        })
    }

    /// Blob上で探すファイル名（`<expected_filename>.pdf`）
    pub fn pdf_name(&self) -> String {
        format!("{}.pdf", self.expected_filename)
    }
}

/// 実行モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// AIで推奨事項を抽出する。`diagnostics` が true なら診断も作る
    Normal { diagnostics: bool },
    /// 診断のみ（AIは呼ばない）
    DiagnosticsOnly,
}

impl RunMode {
    pub fn from_flags(diagnostics_only: bool, diagnostics: bool) -> Self {
        if diagnostics_only {
            RunMode::DiagnosticsOnly
        } else {
            RunMode::Normal { diagnostics }
        }
    }

    /// このモードで診断レコードを作るか
    pub fn wants_diagnostics(&self) -> bool {
        match self {
            RunMode::Normal { diagnostics } => *diagnostics,
            RunMode::DiagnosticsOnly => true,
        }
    }

    /// このモードでAIを呼ぶか
    pub fn uses_ai(&self) -> bool {
        matches!(self, RunMode::Normal { .. })
    }

    /// 完了メッセージ用のラベル
    pub fn label(&self) -> &'static str {
        match self {
            RunMode::Normal { .. } => "Análise completa",
            RunMode::DiagnosticsOnly => "Somente Diagnóstico",
        }
    }
}

/// 行ごとのステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowStatus {
    Found,
    FoundNoRecommendations,
    NotFound,
    FoundDiagnosticOnly,
    NotFoundDiagnosticOnly,
}

impl RowStatus {
    /// 機械可読な名前（JSON出力と同じ）
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Found => "found",
            RowStatus::FoundNoRecommendations => "found-no-recommendations",
            RowStatus::NotFound => "not-found",
            RowStatus::FoundDiagnosticOnly => "found-diagnostic-only",
            RowStatus::NotFoundDiagnosticOnly => "not-found-diagnostic-only",
        }
    }

    /// 結果表に表示するラベル
    pub fn label(&self) -> &'static str {
        match self {
            RowStatus::Found => "✔️ Encontrado",
            RowStatus::FoundNoRecommendations => "✔️ Encontrado (sem recomendações)",
            RowStatus::NotFound => "❌ Arquivo não encontrado",
            RowStatus::FoundDiagnosticOnly => "✔️ Encontrado (diagnóstico)",
            RowStatus::NotFoundDiagnosticOnly => "❌ Arquivo não encontrado (diagnóstico)",
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(
            self,
            RowStatus::Found | RowStatus::FoundNoRecommendations | RowStatus::FoundDiagnosticOnly
        )
    }
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 結果表の1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub company: String,
    pub expected_filename: String,
    pub status: RowStatus,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// 見つかったPDF、または会社フォルダへのリンク
    #[serde(default)]
    pub link: Option<String>,
}

impl ResultRecord {
    /// 推奨事項セル（改行区切り、なければ "-"）
    pub fn recommendations_cell(&self) -> String {
        if self.recommendations.is_empty() {
            SENTINEL.to_string()
        } else {
            self.recommendations.join("\n")
        }
    }
}

/// 診断表の1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRecord {
    pub expected_filename: String,
    /// 照合されたBlobキー（見つからなければ None）
    pub matched_key: Option<String>,
    /// `<expected_filename>.pdf` とキーのベース名が完全一致するか（大文字小文字区別）
    pub exact_match: bool,
    /// 本文の1行目（最大100文字）
    pub title: Option<String>,
    pub date: Option<String>,
    pub issuer: Option<String>,
    pub pages: Option<usize>,
}
