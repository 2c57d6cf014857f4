//! Azure OpenAI 連携
//!
//! chat/completions にシステム・ユーザープロンプトを送り、
//! 箇条書きの応答を推奨事項リストにパースする。
//! 認証は api-key（設定時）または Azure CLI のベアラートークン。

use super::RecommendationExtractor;
use crate::config::AiSettings;
use crate::error::{ImaniError, Result};
use crate::storage::credential::{AzureCliCredential, CachedToken, COGNITIVE_SCOPE};
use async_trait::async_trait;
use imani_common::{build_recommendation_prompt, parse_recommendations, SYSTEM_PROMPT};
use serde::{Deserialize, Serialize};

const MAX_TOKENS: u32 = 4096;
const TEMPERATURE: f32 = 1.0;
const TOP_P: f32 = 1.0;

/// chat/completions リクエスト
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: std::borrow::Cow<'a, str>,
}

/// chat/completions レスポンス
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

enum AiAuth {
    ApiKey(String),
    Bearer(CachedToken),
}

pub struct AzureOpenAiRecommender {
    http: reqwest::Client,
    url: String,
    auth: AiAuth,
}

impl AzureOpenAiRecommender {
    pub fn new(settings: AiSettings) -> Result<Self> {
        let endpoint = settings.endpoint.trim_end_matches('/');
        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            return Err(ImaniError::Config(format!(
                "AZURE_OPENAI_ENDPOINT が不正です: {}",
                settings.endpoint
            )));
        }

        let auth = match settings.api_key {
            Some(key) => AiAuth::ApiKey(key),
            None => AiAuth::Bearer(CachedToken::new(Box::new(AzureCliCredential), COGNITIVE_SCOPE)),
        };

        Ok(Self {
            http: reqwest::Client::new(),
            url: completions_url(endpoint, &settings.deployment, &settings.api_version),
            auth,
        })
    }

    async fn complete(&self, text: &str) -> Result<String> {
        let body = build_request(text);
        let request = self.http.post(&self.url).json(&body);
        let request = match &self.auth {
            AiAuth::ApiKey(key) => request.header("api-key", key),
            AiAuth::Bearer(token) => request.bearer_auth(token.bearer().await?),
        };

        let response = request
            .send()
            .await
            .map_err(|e| ImaniError::ApiCall(format!("Azure OpenAI 呼び出しエラー: {}", e)))?;
        let status = response.status();
        let payload = response.text().await?;

        if !status.is_success() {
            return Err(ImaniError::ApiCall(format!("{}: {}", status, error_message(&payload))));
        }

        parse_completion(&payload)
    }
}

#[async_trait]
impl RecommendationExtractor for AzureOpenAiRecommender {
    async fn extract(&self, text: &str) -> Result<Vec<String>> {
        let content = self.complete(text).await?;
        tracing::debug!(chars = content.len(), "AI応答を受信");
        Ok(parse_recommendations(&content)?)
    }
}

fn completions_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        endpoint,
        urlencoding::encode(deployment),
        urlencoding::encode(api_version)
    )
}

fn build_request(text: &str) -> ChatRequest<'_> {
    ChatRequest {
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT.into(),
            },
            ChatMessage {
                role: "user",
                content: build_recommendation_prompt(text).into(),
            },
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
        top_p: TOP_P,
    }
}

/// 最初の choice の本文を取り出す
fn parse_completion(payload: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(payload)
        .map_err(|e| ImaniError::ApiParse(format!("chat/completions: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ImaniError::ApiParse("Empty response".into()))
}

fn error_message(payload: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(payload) {
        Ok(envelope) => match envelope.error.code {
            Some(code) => format!("{} ({})", envelope.error.message, code),
            None => envelope.error.message,
        },
        Err(_) => payload.chars().take(200).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(endpoint: &str, api_key: Option<&str>) -> AiSettings {
        AiSettings {
            endpoint: endpoint.to_string(),
            deployment: "gpt-4o".to_string(),
            api_version: "2025-01-01-preview".to_string(),
            api_key: api_key.map(str::to_string),
        }
    }

    #[test]
    fn test_completions_url() {
        assert_eq!(
            completions_url("https://ia.openai.azure.com", "gpt-4o", "2025-01-01-preview"),
            "https://ia.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2025-01-01-preview"
        );
    }

    #[test]
    fn test_new_rejects_invalid_endpoint() {
        let result = AzureOpenAiRecommender::new(settings("ia.openai.azure.com", Some("k")));
        assert!(matches!(result, Err(ImaniError::Config(_))));
    }

    #[test]
    fn test_new_with_api_key() {
        let recommender = AzureOpenAiRecommender::new(settings("https://ia.openai.azure.com/", Some("k"))).unwrap();
        assert!(recommender.url.starts_with("https://ia.openai.azure.com/openai/"));
        assert!(matches!(recommender.auth, AiAuth::ApiKey(_)));
    }

    #[test]
    fn test_build_request_json() {
        let body = serde_json::to_value(build_request("CONCLUSÕES")).unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body["messages"][1]["content"].as_str().unwrap().ends_with("CONCLUSÕES"));
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["temperature"], 1.0);
        assert_eq!(body["top_p"], 1.0);
    }

    #[test]
    fn test_parse_completion() {
        let payload = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"- Reforçar drenagem\n- Revisar talude\n"}}]}"#;
        let content = parse_completion(payload).unwrap();
        assert_eq!(
            parse_recommendations(&content).unwrap(),
            vec!["Reforçar drenagem", "Revisar talude"]
        );
    }

    #[test]
    fn test_parse_completion_empty() {
        assert!(parse_completion(r#"{"choices":[]}"#).is_err());
        assert!(parse_completion(r#"{"choices":[{"message":{"content":null}}]}"#).is_err());
        assert!(parse_completion(r#"{"choices":[{"message":{"content":"  "}}]}"#).is_err());
        assert!(parse_completion("not json").is_err());
    }

    #[test]
    fn test_error_message() {
        let payload = r#"{"error":{"code":"DeploymentNotFound","message":"The API deployment for this resource does not exist."}}"#;
        assert_eq!(
            error_message(payload),
            "The API deployment for this resource does not exist. (DeploymentNotFound)"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
