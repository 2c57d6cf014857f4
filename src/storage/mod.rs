//! オブジェクトストレージ
//!
//! パイプラインは `ObjectStore`（一覧・取得）だけを知っていて、
//! どの認証方式で接続したかは知らない。

pub mod azure_blob;
pub mod credential;
pub mod local;

pub use azure_blob::AzureBlobStore;
pub use local::LocalStore;

use crate::config::StorageBackend;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// プレフィックスで始まるキーを一覧順に返す
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>>;

    /// オブジェクトの中身を取得
    async fn fetch_object(&self, key: &str) -> Result<Vec<u8>>;

    /// ブラウザで開けるURL（あれば）
    fn object_url(&self, _key: &str) -> Option<String> {
        None
    }

    /// 表示用の接続先名
    fn describe(&self) -> String;
}

/// 設定からストアを生成し、接続を確認する
pub async fn connect(backend: &StorageBackend) -> Result<Box<dyn ObjectStore>> {
    match backend {
        StorageBackend::Azure(settings) => {
            let store = AzureBlobStore::connect(settings).await?;
            Ok(Box::new(store))
        }
        StorageBackend::Local(root) => {
            let store = LocalStore::open(root)?;
            Ok(Box::new(store))
        }
    }
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).list_objects(prefix).await
    }

    async fn fetch_object(&self, key: &str) -> Result<Vec<u8>> {
        (**self).fetch_object(key).await
    }

    fn object_url(&self, key: &str) -> Option<String> {
        (**self).object_url(key)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
