//! プロンプト生成モジュール
//!
//! 技術報告書から推奨事項を抽出するためのチャットメッセージ

/// システムプロンプト
pub const SYSTEM_PROMPT: &str =
    "Você é um especialista em engenharia que extrai recomendações técnicas de documentos.";

/// ユーザープロンプト生成
///
/// # Arguments
/// * `text` - 報告書の本文
pub fn build_recommendation_prompt(text: &str) -> String {
    format!(
        "Leia o relatório técnico a seguir e extraia todas as recomendações técnicas presentes, \
principalmente nas conclusões. Apresente-as de forma clara e objetiva, \
utilizando bullet points para facilitar a cópia e organização no Excel:\n\n{text}"
    )
}
