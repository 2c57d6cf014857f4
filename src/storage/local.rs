//! ローカルディレクトリをコンテナとして扱うストア
//!
//! キーはルートからの相対パスを `/` 区切りにしたもの。オフライン実行用。

use super::ObjectStore;
use crate::error::{ImaniError, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(ImaniError::ContainerUnreachable {
                container: root.display().to_string(),
                reason: "ディレクトリが存在しません".into(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn key_of(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        Some(parts.join("/"))
    }

    fn path_of(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(ImaniError::Storage(format!("不正なキー: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        // プレフィックスのフォルダ部分から下だけを走査
        let folder = match prefix.rfind('/') {
            Some(idx) => self.path_of(&prefix[..idx])?,
            None => self.root.clone(),
        };
        if !folder.is_dir() {
            return Ok(Vec::new());
        }

        let mut keys: Vec<String> = WalkDir::new(&folder)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| self.key_of(e.path()))
            .filter(|key| key.starts_with(prefix))
            .collect();

        // Blobの一覧と同じくキー順
        keys.sort();
        Ok(keys)
    }

    async fn fetch_object(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_of(key)?;
        if !path.is_file() {
            return Err(ImaniError::FileNotFound(key.to_string()));
        }
        Ok(tokio::fs::read(path).await?)
    }

    fn object_url(&self, key: &str) -> Option<String> {
        self.path_of(key).ok().map(|p| p.display().to_string())
    }

    fn describe(&self) -> String {
        format!("{} (local)", self.root.display())
    }
}
