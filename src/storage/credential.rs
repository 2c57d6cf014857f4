//! Azure AD トークン取得
//!
//! BLOB_AUTH_METHOD ごとの資格情報:
//! - service_principal: クライアントシークレット（client_credentials）
//! - username_password: ユーザー名/パスワード（password grant）
//! - それ以外: Azure CLI（`az account get-access-token`）
//!
//! 取得したトークンは有効期限まで使い回す。

use crate::config::BlobAuth;
use crate::error::{ImaniError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Azure Storage のスコープ
pub const STORAGE_SCOPE: &str = "https://storage.azure.com/.default";
/// Azure OpenAI のスコープ
pub const COGNITIVE_SCOPE: &str = "https://cognitiveservices.azure.com/.default";

/// Azure CLI の公開クライアントID（password grant の既定値）
const AZURE_CLI_CLIENT_ID: &str = "04b07795-8ddb-461a-bbee-02f9e1bf7b46";
const AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// 期限切れ扱いにする余裕
const EXPIRY_MARGIN: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Instant,
}

impl AccessToken {
    pub fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self, scope: &str) -> Result<AccessToken>;

    fn name(&self) -> &'static str;
}

/// 設定の認証方式から資格情報を生成
pub fn from_auth(auth: &BlobAuth, http: reqwest::Client) -> Box<dyn TokenCredential> {
    match auth {
        BlobAuth::ServicePrincipal {
            tenant_id,
            client_id,
            client_secret,
        } => Box::new(ClientSecretCredential {
            http,
            tenant_id: tenant_id.clone(),
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
        }),
        BlobAuth::UsernamePassword {
            tenant_id,
            client_id,
            username,
            password,
        } => Box::new(UsernamePasswordCredential {
            http,
            tenant_id: tenant_id.clone(),
            client_id: client_id.clone().unwrap_or_else(|| AZURE_CLI_CLIENT_ID.to_string()),
            username: username.clone(),
            password: password.clone(),
        }),
        BlobAuth::Default => Box::new(AzureCliCredential),
    }
}

/// トークンエンドポイントのレスポンス
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

fn token_url(tenant_id: &str) -> String {
    format!("{}/{}/oauth2/v2.0/token", AUTHORITY_HOST, tenant_id)
}

/// トークンレスポンスを解釈
fn parse_token_response(body: &str) -> Result<AccessToken> {
    let response: TokenResponse = serde_json::from_str(body)
        .map_err(|e| ImaniError::Credential(format!("トークンレスポンスのパースに失敗: {}", e)))?;

    if let Some(error) = response.error {
        let description = response.error_description.unwrap_or_default();
        return Err(ImaniError::Credential(format!("{}: {}", error, description)));
    }

    let token = response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ImaniError::Credential("access_token がありません".into()))?;
    let expires_in = response.expires_in.unwrap_or(300);

    Ok(AccessToken {
        token,
        expires_at: Instant::now() + Duration::from_secs(expires_in),
    })
}

async fn request_token(http: &reqwest::Client, tenant_id: &str, form: &[(&str, &str)]) -> Result<AccessToken> {
    let response = http
        .post(token_url(tenant_id))
        .form(form)
        .send()
        .await
        .map_err(|e| ImaniError::Credential(format!("トークン取得に失敗: {}", e)))?;
    let body = response.text().await?;
    parse_token_response(&body)
}

pub struct ClientSecretCredential {
    http: reqwest::Client,
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope),
        ];
        request_token(&self.http, &self.tenant_id, &form).await
    }

    fn name(&self) -> &'static str {
        "Service Principal"
    }
}

pub struct UsernamePasswordCredential {
    http: reqwest::Client,
    tenant_id: String,
    client_id: String,
    username: String,
    password: String,
}

#[async_trait]
impl TokenCredential for UsernamePasswordCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let form = [
            ("grant_type", "password"),
            ("client_id", self.client_id.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("scope", scope),
        ];
        request_token(&self.http, &self.tenant_id, &form).await
    }

    fn name(&self) -> &'static str {
        "Usuário/Senha"
    }
}

/// Azure CLI にログイン済みの資格情報
pub struct AzureCliCredential;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    /// 新しいCLIが返すUNIX時刻
    #[serde(default, rename = "expires_on")]
    expires_on: Option<i64>,
}

/// `az account get-access-token` の出力を解釈
fn parse_cli_token(stdout: &str) -> Result<AccessToken> {
    let parsed: CliToken = serde_json::from_str(stdout.trim())
        .map_err(|e| ImaniError::Credential(format!("Azure CLI 出力のパースに失敗: {}", e)))?;

    let now = chrono::Utc::now().timestamp();
    let lifetime = parsed
        .expires_on
        .map(|at| (at - now).max(0) as u64)
        .unwrap_or(300);

    Ok(AccessToken {
        token: parsed.access_token,
        expires_at: Instant::now() + Duration::from_secs(lifetime),
    })
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let args = ["account", "get-access-token", "--scope", scope, "--output", "json"];

        // Windowsではcmd /c経由
        #[cfg(windows)]
        let output = tokio::process::Command::new("cmd")
            .arg("/c")
            .arg("az")
            .args(args)
            .output()
            .await;

        #[cfg(not(windows))]
        let output = tokio::process::Command::new("az").args(args).output().await;

        let output = output.map_err(|e| ImaniError::CliExecution(format!("Azure CLI 実行エラー: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ImaniError::Credential(format!(
                "Azure CLI failed (code {:?}): {}。`az login` を実行してください",
                output.status.code(),
                stderr.trim()
            )));
        }

        parse_cli_token(&String::from_utf8_lossy(&output.stdout))
    }

    fn name(&self) -> &'static str {
        "Azure CLI"
    }
}

/// 有効期限内のトークンを使い回すラッパー
pub struct CachedToken {
    credential: Box<dyn TokenCredential>,
    scope: &'static str,
    current: Mutex<Option<AccessToken>>,
}

impl CachedToken {
    pub fn new(credential: Box<dyn TokenCredential>, scope: &'static str) -> Self {
        Self {
            credential,
            scope,
            current: Mutex::new(None),
        }
    }

    pub async fn bearer(&self) -> Result<String> {
        let mut current = self.current.lock().await;
        if let Some(token) = current.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.token.clone());
        }

        tracing::debug!(credential = self.credential.name(), scope = self.scope, "トークンを取得");
        let token = self.credential.get_token(self.scope).await?;
        let value = token.token.clone();
        *current = Some(token);
        Ok(value)
    }

    pub fn credential_name(&self) -> &'static str {
        self.credential.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_parse_token_response_ok() {
        let body = r#"{"token_type":"Bearer","expires_in":3599,"access_token":"eyJ0"}"#;
        let token = parse_token_response(body).unwrap();
        assert_eq!(token.token, "eyJ0");
        assert!(token.is_fresh());
    }

    #[test]
    fn test_parse_token_response_error() {
        let body = r#"{"error":"invalid_client","error_description":"AADSTS7000215: Invalid client secret"}"#;
        let err = parse_token_response(body).unwrap_err();
        let message = format!("{}", err);
        assert!(message.contains("invalid_client"));
        assert!(message.contains("AADSTS7000215"));
    }

    #[test]
    fn test_parse_cli_token() {
        let expires_on = chrono::Utc::now().timestamp() + 3600;
        let stdout = format!(
            r#"{{"accessToken":"abc","expiresOn":"2030-01-01 00:00:00.000000","expires_on":{},"tokenType":"Bearer"}}"#,
            expires_on
        );
        let token = parse_cli_token(&stdout).unwrap();
        assert_eq!(token.token, "abc");
        assert!(token.is_fresh());
    }

    #[test]
    fn test_parse_cli_token_expired() {
        let stdout = r#"{"accessToken":"abc","expires_on":1}"#;
        let token = parse_cli_token(stdout).unwrap();
        assert!(!token.is_fresh());
    }

    #[test]
    fn test_token_url() {
        assert_eq!(
            token_url("tenant-1"),
            "https://login.microsoftonline.com/tenant-1/oauth2/v2.0/token"
        );
    }

    struct CountingCredential {
        calls: Arc<AtomicUsize>,
        lifetime: Duration,
    }

    #[async_trait]
    impl TokenCredential for CountingCredential {
        async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken {
                token: format!("token-{}", n),
                expires_at: Instant::now() + self.lifetime,
            })
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_cached_token_reused_while_fresh() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedToken::new(
            Box::new(CountingCredential { calls: calls.clone(), lifetime: Duration::from_secs(3600) }),
            STORAGE_SCOPE,
        );
        assert_eq!(cached.bearer().await.unwrap(), "token-0");
        assert_eq!(cached.bearer().await.unwrap(), "token-0");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_token_refreshed_when_expiring() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedToken::new(
            Box::new(CountingCredential { calls: calls.clone(), lifetime: Duration::from_secs(10) }),
            STORAGE_SCOPE,
        );
        assert_eq!(cached.bearer().await.unwrap(), "token-0");
        assert_eq!(cached.bearer().await.unwrap(), "token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
