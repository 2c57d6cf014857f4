//! 診断レコードの組み立て
//!
//! 照合キー・本文・ページ数から DiagnosticRecord を作る純粋関数。
//! 完全一致フラグは照合（大文字小文字無視の部分一致）より厳しい
//! 大文字小文字区別の完全一致で判定する。

use crate::heuristics::{extract_date, extract_issuer};
use crate::types::DiagnosticRecord;

/// タイトルの最大文字数
pub const TITLE_MAX_CHARS: usize = 100;

/// キーの最後の `/` 以降
pub fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// 本文の1行目を最大100文字で返す
fn title_of(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let first_line = text.split('\n').next().unwrap_or_default();
    Some(first_line.chars().take(TITLE_MAX_CHARS).collect())
}

/// 診断レコードを生成
///
/// # Arguments
/// * `expected_filename` - Excel上のファイル名（拡張子なし）
/// * `matched_key` - 照合されたBlobキー。見つからなければ None
/// * `text` - 抽出済み本文（文書がなければ空文字）
/// * `page_count` - ページ数（文書がなければ None）
pub fn build_diagnostic(
    expected_filename: &str,
    matched_key: Option<&str>,
    text: &str,
    page_count: Option<usize>,
) -> DiagnosticRecord {
    let expected_pdf = format!("{}.pdf", expected_filename);
    let exact_match = matched_key
        .map(|key| basename(key) == expected_pdf)
        .unwrap_or(false);

    DiagnosticRecord {
        expected_filename: expected_filename.to_string(),
        matched_key: matched_key.map(str::to_string),
        exact_match,
        title: title_of(text),
        date: extract_date(text),
        issuer: extract_issuer(text),
        pages: page_count,
    }
}

impl DiagnosticRecord {
    /// 見つかったファイルのベース名
    pub fn matched_name(&self) -> Option<&str> {
        self.matched_key.as_deref().map(basename)
    }
}
