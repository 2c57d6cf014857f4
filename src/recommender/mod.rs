//! 推奨事項抽出（ホストされた言語モデル）
//!
//! 設定は生成時に一度だけ渡す。グローバルな可変状態は持たない。

mod azure_openai;

pub use azure_openai::AzureOpenAiRecommender;

use crate::config::AiSettings;
use crate::error::{ImaniError, Result};
use async_trait::async_trait;

#[async_trait]
pub trait RecommendationExtractor: Send + Sync {
    /// 本文から推奨事項を抽出（順序を保つ）
    async fn extract(&self, text: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl<T: RecommendationExtractor + ?Sized> RecommendationExtractor for Box<T> {
    async fn extract(&self, text: &str) -> Result<Vec<String>> {
        (**self).extract(text).await
    }
}

/// AI設定がないときの抽出器。呼ばれたら警告して空を返す
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredRecommender;

#[async_trait]
impl RecommendationExtractor for UnconfiguredRecommender {
    async fn extract(&self, _text: &str) -> Result<Vec<String>> {
        tracing::warn!("{}", ImaniError::AiNotConfigured);
        eprintln!("⚠ {}", ImaniError::AiNotConfigured);
        Ok(Vec::new())
    }
}

/// 設定から抽出器を生成
pub fn from_settings(settings: Option<&AiSettings>) -> Result<Box<dyn RecommendationExtractor>> {
    match settings {
        Some(ai) => Ok(Box::new(AzureOpenAiRecommender::new(ai.clone())?)),
        None => Ok(Box::new(UnconfiguredRecommender)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_returns_empty() {
        let items = UnconfiguredRecommender.extract("texto").await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_from_settings_none_is_unconfigured() {
        let recommender = from_settings(None).unwrap();
        assert!(recommender.extract("texto").await.unwrap().is_empty());
    }
}
