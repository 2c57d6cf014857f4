//! エラーケーステスト
//!
//! 起動時の致命的エラー（設定・入力・ストレージ）を検証

use imani_rust::config::Config;
use imani_rust::error::ImaniError;
use imani_rust::storage::{self, ObjectStore};
use imani_rust::config::StorageBackend;
use std::path::Path;
use tempfile::tempdir;

/// 設定が空なら不足項目をまとめて返す
#[test]
fn test_missing_settings_lists_every_name() {
    let err = Config::default().validate(true, None).unwrap_err();

    match &err {
        ImaniError::MissingSettings(names) => {
            for name in [
                "AZURE_OPENAI_ENDPOINT",
                "AZURE_OPENAI_DEPLOYMENT_NAME",
                "BLOB_ACCOUNT_URL",
                "BLOB_CONTAINER_NAME",
                "BLOB_AUTH_METHOD",
            ] {
                assert!(names.iter().any(|n| n == name), "{} がない: {:?}", name, names);
            }
        }
        other => panic!("MissingSettings を期待: {:?}", other),
    }
    assert!(err.to_string().contains("AZURE_OPENAI_ENDPOINT, "));
}

/// 診断のみ＋ローカルストアなら設定なしで動く
#[test]
fn test_diagnostics_only_with_local_store_needs_no_settings() {
    let dir = tempdir().expect("Failed to create temp dir");
    let settings = Config::default()
        .validate(false, Some(dir.path()))
        .expect("設定不要のはず");

    assert!(settings.ai.is_none());
    assert!(matches!(settings.storage, StorageBackend::Local(_)));
}

/// 存在しないローカルストアには接続できない
#[tokio::test]
async fn test_connect_missing_local_store() {
    let backend = StorageBackend::Local(Path::new("/nonexistent/imani/12345").to_path_buf());
    let result = storage::connect(&backend).await;

    assert!(matches!(result, Err(ImaniError::ContainerUnreachable { .. })));
}

/// ローカルストアはBlobと同じプレフィックスで一覧できる
#[tokio::test]
async fn test_connect_local_store_lists_company_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let folder = dir.path().join("Relatórios Técnicos").join("Acme").join("Relatórios");
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(folder.join("rel1.pdf"), b"%PDF-1.4").unwrap();

    let store = storage::connect(&StorageBackend::Local(dir.path().to_path_buf()))
        .await
        .expect("接続失敗");
    let keys = store
        .list_objects(&imani_common::storage_prefix("Acme"))
        .await
        .expect("一覧失敗");

    assert_eq!(keys, vec!["Relatórios Técnicos/Acme/Relatórios/rel1.pdf"]);
}

/// ImaniErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        ImaniError::Config("テスト設定エラー".to_string()),
        ImaniError::FileNotFound("planilha.xlsx".to_string()),
        ImaniError::Credential("AADSTS7000215".to_string()),
        ImaniError::ContainerUnreachable {
            container: "relatorios".to_string(),
            reason: "403".to_string(),
        },
        ImaniError::ApiCall("API呼び出し失敗".to_string()),
        ImaniError::HeaderNotFound("2024".to_string()),
        ImaniError::MissingColumn("Empresa".to_string()),
        ImaniError::ExcelGeneration("Excel生成エラー".to_string()),
        ImaniError::AiNotConfigured,
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 共通ライブラリのエラーはそのまま表示される
#[test]
fn test_common_error_is_transparent() {
    let common = imani_common::parse_recommendations("").unwrap_err();
    let expected = common.to_string();
    let err: ImaniError = common.into();

    assert_eq!(err.to_string(), expected);
}

/// JSONエラーからの変換
#[test]
fn test_error_from_json() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid").unwrap_err();
    let err: ImaniError = json_err.into();

    assert!(matches!(err, ImaniError::JsonParse(_)));
}
