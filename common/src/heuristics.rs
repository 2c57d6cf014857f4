//! 報告書本文からの簡易フィールド抽出
//!
//! - 受領日: 最初の `DD/DD/DDDD`（暦の妥当性は検証しない）
//! - 作成会社: 「elaborado por」「responsável」を含む最初の行

use regex::Regex;

/// 作成会社の行を示すキーワード（小文字）
const ISSUER_KEYWORDS: &[&str] = &["elaborado por", "responsável"];

/// 最初の `DD/DD/DDDD` をそのまま返す
pub fn extract_date(text: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref DATE_RE: Regex = Regex::new(r"\d{2}/\d{2}/\d{4}").unwrap();
    }

    DATE_RE.find(text).map(|m| m.as_str().to_string())
}

/// キーワードを含む最初の行（前後空白除去）
pub fn extract_issuer(text: &str) -> Option<String> {
    text.split('\n')
        .find(|line| {
            let lower = line.to_lowercase();
            ISSUER_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(|line| line.trim().to_string())
}
