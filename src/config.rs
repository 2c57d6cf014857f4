use crate::error::{ImaniError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Azure OpenAI の既定APIバージョン
pub const DEFAULT_AI_API_VERSION: &str = "2025-01-01-preview";

/// 設定ファイル（~/.config/imani/config.json）と環境変数の内容
///
/// キー名は環境変数名と同じ。環境変数が設定ファイルより優先される。
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Config {
    pub azure_openai_endpoint: Option<String>,
    pub azure_openai_deployment_name: Option<String>,
    pub azure_openai_api_key: Option<String>,
    pub azure_openai_api_version: Option<String>,
    pub blob_account_url: Option<String>,
    pub blob_container_name: Option<String>,
    pub blob_auth_method: Option<String>,
    pub blob_client_id: Option<String>,
    pub blob_client_secret: Option<String>,
    pub blob_tenant_id: Option<String>,
    pub blob_username: Option<String>,
    pub blob_password: Option<String>,
}

/// 表示時にマスクするキー
const SECRET_KEYS: &[&str] = &["AZURE_OPENAI_API_KEY", "BLOB_CLIENT_SECRET", "BLOB_PASSWORD"];

/// Blob認証方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobAuth {
    ServicePrincipal {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    UsernamePassword {
        tenant_id: String,
        client_id: Option<String>,
        username: String,
        password: String,
    },
    /// 環境の既定資格情報（Azure CLI）
    Default,
}

impl BlobAuth {
    pub fn describe(&self) -> &'static str {
        match self {
            BlobAuth::ServicePrincipal { .. } => "Service Principal",
            BlobAuth::UsernamePassword { .. } => "Usuário/Senha",
            BlobAuth::Default => "Azure CLI (DefaultAzureCredential)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureStorageSettings {
    pub account_url: String,
    pub container: String,
    pub auth: BlobAuth,
}

/// ストレージの接続先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Azure(AzureStorageSettings),
    /// ローカルディレクトリをコンテナとして扱う
    Local(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiSettings {
    pub endpoint: String,
    pub deployment: String,
    pub api_version: String,
    /// 未設定なら Azure CLI のトークンを使う
    pub api_key: Option<String>,
}

/// 検証済みの実行設定
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub storage: StorageBackend,
    pub ai: Option<AiSettings>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// 設定ファイルのみ読み込み（存在しなければ空）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ImaniError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("imani").join("config.json"))
    }

    fn entries_mut(&mut self) -> [(&'static str, &mut Option<String>); 12] {
        [
            ("AZURE_OPENAI_ENDPOINT", &mut self.azure_openai_endpoint),
            ("AZURE_OPENAI_DEPLOYMENT_NAME", &mut self.azure_openai_deployment_name),
            ("AZURE_OPENAI_API_KEY", &mut self.azure_openai_api_key),
            ("AZURE_OPENAI_API_VERSION", &mut self.azure_openai_api_version),
            ("BLOB_ACCOUNT_URL", &mut self.blob_account_url),
            ("BLOB_CONTAINER_NAME", &mut self.blob_container_name),
            ("BLOB_AUTH_METHOD", &mut self.blob_auth_method),
            ("BLOB_CLIENT_ID", &mut self.blob_client_id),
            ("BLOB_CLIENT_SECRET", &mut self.blob_client_secret),
            ("BLOB_TENANT_ID", &mut self.blob_tenant_id),
            ("BLOB_USERNAME", &mut self.blob_username),
            ("BLOB_PASSWORD", &mut self.blob_password),
        ]
    }

    /// 全キーと値（表示用、シークレットはマスク）
    pub fn entries_masked(&self) -> Vec<(&'static str, String)> {
        let mut copy = self.clone();
        copy.entries_mut()
            .into_iter()
            .map(|(key, value)| {
                let shown = match value.as_deref() {
                    None => "未設定".to_string(),
                    Some(_) if SECRET_KEYS.contains(&key) => "********".to_string(),
                    Some(v) => v.to_string(),
                };
                (key, shown)
            })
            .collect()
    }

    /// 環境変数（またはテスト用の任意の取得関数）で上書き
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (key, slot) in self.entries_mut() {
            if let Some(value) = lookup(key) {
                if !value.trim().is_empty() {
                    *slot = Some(value);
                }
            }
        }
    }

    /// `KEY=VALUE` 形式で1項目を設定
    pub fn set_entry(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| ImaniError::Config(format!("KEY=VALUE 形式で指定してください: {}", assignment)))?;
        let key = key.trim().to_uppercase();

        for (name, slot) in self.entries_mut() {
            if name == key {
                let value = value.trim();
                *slot = if value.is_empty() { None } else { Some(value.to_string()) };
                return Ok(());
            }
        }
        Err(ImaniError::Config(format!("不明なキー: {}", key)))
    }

    /// 実行に必要な設定を検証
    ///
    /// * `uses_ai` - AIを呼ぶモードか（診断のみなら false）
    /// * `local_store` - 指定時はBlobの代わりにローカルディレクトリを使う
    ///
    /// 不足している項目はまとめて `MissingSettings` で返す
    pub fn validate(&self, uses_ai: bool, local_store: Option<&Path>) -> Result<Settings> {
        let mut missing = Vec::new();

        let ai = if uses_ai {
            let endpoint = required(&self.azure_openai_endpoint, "AZURE_OPENAI_ENDPOINT", &mut missing);
            let deployment = required(
                &self.azure_openai_deployment_name,
                "AZURE_OPENAI_DEPLOYMENT_NAME",
                &mut missing,
            );
            match (endpoint, deployment) {
                (Some(endpoint), Some(deployment)) => Some(AiSettings {
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                    deployment,
                    api_version: optional(&self.azure_openai_api_version)
                        .unwrap_or_else(|| DEFAULT_AI_API_VERSION.to_string()),
                    api_key: optional(&self.azure_openai_api_key),
                }),
                _ => None,
            }
        } else {
            None
        };

        let storage = match local_store {
            Some(dir) => Some(StorageBackend::Local(dir.to_path_buf())),
            None => self.validate_azure_storage(&mut missing).map(StorageBackend::Azure),
        };

        match storage {
            Some(storage) if missing.is_empty() => Ok(Settings { storage, ai }),
            _ => Err(ImaniError::MissingSettings(missing)),
        }
    }

    fn validate_azure_storage(&self, missing: &mut Vec<String>) -> Option<AzureStorageSettings> {
        let account_url = required(&self.blob_account_url, "BLOB_ACCOUNT_URL", missing);
        let container = required(&self.blob_container_name, "BLOB_CONTAINER_NAME", missing);
        let method = required(&self.blob_auth_method, "BLOB_AUTH_METHOD", missing);

        let auth = match method.as_deref().map(str::to_lowercase).as_deref() {
            Some("service_principal") => {
                let client_id = required(&self.blob_client_id, "BLOB_CLIENT_ID", missing);
                let client_secret = required(&self.blob_client_secret, "BLOB_CLIENT_SECRET", missing);
                let tenant_id = required(&self.blob_tenant_id, "BLOB_TENANT_ID", missing);
                match (tenant_id, client_id, client_secret) {
                    (Some(tenant_id), Some(client_id), Some(client_secret)) => Some(BlobAuth::ServicePrincipal {
                        tenant_id,
                        client_id,
                        client_secret,
                    }),
                    _ => None,
                }
            }
            Some("username_password") => {
                let username = required(&self.blob_username, "BLOB_USERNAME", missing);
                let password = required(&self.blob_password, "BLOB_PASSWORD", missing);
                let tenant_id = required(&self.blob_tenant_id, "BLOB_TENANT_ID", missing);
                match (tenant_id, username, password) {
                    (Some(tenant_id), Some(username), Some(password)) => Some(BlobAuth::UsernamePassword {
                        tenant_id,
                        client_id: optional(&self.blob_client_id),
                        username,
                        password,
                    }),
                    _ => None,
                }
            }
            // azure_cli など、それ以外はすべて既定資格情報
            Some(_) => Some(BlobAuth::Default),
            None => None,
        };

        match (account_url, container, auth) {
            (Some(account_url), Some(container), Some(auth)) => Some(AzureStorageSettings {
                account_url: account_url.trim_end_matches('/').to_string(),
                container,
                auth,
            }),
            _ => None,
        }
    }
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(value: &Option<String>, name: &str, missing: &mut Vec<String>) -> Option<String> {
    let value = optional(value);
    if value.is_none() {
        missing.push(name.to_string());
    }
    value
}
