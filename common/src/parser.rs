//! AIレスポンスパーサー
//!
//! 箇条書きの自由文レスポンスを推奨事項のリストに変換する

use crate::error::{Error, Result};

/// 行頭・行末から取り除く記号
const BULLET_CHARS: &[char] = &['-', '•', ' '];

/// 推奨事項リストをパース
///
/// - 改行で分割
/// - 空行を除外
/// - 先頭/末尾の `-` `•` と空白を除去
///
/// # Returns
/// * `Ok(Vec<String>)` - 1件以上の推奨事項（0件の場合もあり）
/// * `Err` - レスポンス自体が空の場合
///
/// # Examples
/// ```
/// use imani_common::parse_recommendations;
///
/// let items = parse_recommendations("- Revisar talude\n• Limpar drenos").unwrap();
/// assert_eq!(items, vec!["Revisar talude", "Limpar drenos"]);
/// ```
pub fn parse_recommendations(response: &str) -> Result<Vec<String>> {
    let response = response.trim();
    if response.is_empty() {
        return Err(Error::Parse("レスポンスが空です".into()));
    }

    Ok(response
        .split('\n')
        .map(|line| line.trim().trim_matches(BULLET_CHARS).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
