use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImaniError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("必須設定が不足しています: {}", .0.join(", "))]
    MissingSettings(Vec<String>),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("認証エラー: {0}")]
    Credential(String),

    #[error("ストレージエラー: {0}")]
    Storage(String),

    #[error("コンテナに接続できません `{container}`: {reason}")]
    ContainerUnreachable { container: String, reason: String },

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("AIが設定されていません。AZURE_OPENAI_ENDPOINT と AZURE_OPENAI_DEPLOYMENT_NAME を設定してください")]
    AiNotConfigured,

    #[error("Excel読み込みエラー: {0}")]
    SpreadsheetRead(String),

    #[error("先頭10行に「Empresa」を含むヘッダー行がありません（シート: {0}）")]
    HeaderNotFound(String),

    #[error("必須列がありません: {0}")]
    MissingColumn(String),

    #[error("シートが見つかりません: {0}")]
    SheetNotFound(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error(transparent)]
    Common(#[from] imani_common::Error),
}

pub type Result<T> = std::result::Result<T, ImaniError>;
