//! Blobキーとの照合ルール
//!
//! - プレフィックス: `Relatórios Técnicos/{company}/Relatórios/`
//! - `<expected_filename>.pdf` を大文字小文字無視の部分一致で探し、一覧順で最初のものを採用

use crate::diagnostic::basename;

/// 会社ごとの格納フォルダ
pub fn storage_prefix(company: &str) -> String {
    format!("Relatórios Técnicos/{}/Relatórios/", company)
}

/// 一覧から最初に一致したキーを返す
pub fn find_match<'a>(expected_filename: &str, listing: &'a [String]) -> Option<&'a str> {
    let needle = format!("{}.pdf", expected_filename).to_lowercase();
    listing
        .iter()
        .find(|key| basename(key).to_lowercase().contains(&needle))
        .map(|key| key.as_str())
}
