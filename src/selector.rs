//! 対話式のシート・会社選択
//!
//! 引数で指定されていればそれを使い、なければ dialoguer で選ばせる。
//! 候補が1つだけなら聞かずに決める。

use crate::error::{ImaniError, Result};
use dialoguer::Select;

/// 指定値を候補と照合する（前後空白・大文字小文字を無視）
pub fn resolve_choice(requested: &str, candidates: &[String]) -> Option<String> {
    let requested = requested.trim();
    candidates
        .iter()
        .find(|c| c.as_str() == requested)
        .or_else(|| candidates.iter().find(|c| c.eq_ignore_ascii_case(requested)))
        .cloned()
}

/// 候補から1つ選ぶ
fn select_one(prompt: &str, candidates: &[String]) -> Result<String> {
    match candidates {
        [] => Err(ImaniError::Config(format!("{}: 候補がありません", prompt))),
        [only] => {
            println!("✔ {}: {}", prompt, only);
            Ok(only.clone())
        }
        _ => {
            let index = Select::new()
                .with_prompt(prompt)
                .items(candidates)
                .default(0)
                .interact()
                .map_err(|e| ImaniError::CliExecution(format!("選択に失敗: {}", e)))?;
            Ok(candidates[index].clone())
        }
    }
}

/// 処理するシートを決める
pub fn choose_sheet(requested: Option<&str>, sheets: &[String]) -> Result<String> {
    match requested {
        Some(name) => {
            resolve_choice(name, sheets).ok_or_else(|| ImaniError::SheetNotFound(name.to_string()))
        }
        None => select_one("Selecione a aba", sheets),
    }
}

/// 処理する会社を決める
pub fn choose_company(requested: Option<&str>, companies: &[String]) -> Result<String> {
    match requested {
        Some(name) => resolve_choice(name, companies)
            .ok_or_else(|| ImaniError::Config(format!("会社が見つかりません: {}", name))),
        None => select_one("Selecione a empresa", companies),
    }
}
