//! Azure Blob Storage（REST API）
//!
//! - List Blobs: `?restype=container&comp=list&prefix=...&marker=...`
//! - Get Blob: `/{container}/{key}`
//! - Get Container Properties: 起動時の接続確認

use super::credential::{self, CachedToken, STORAGE_SCOPE};
use super::ObjectStore;
use crate::config::AzureStorageSettings;
use crate::error::{ImaniError, Result};
use async_trait::async_trait;
use regex::Regex;

const BLOB_API_VERSION: &str = "2021-08-06";

pub struct AzureBlobStore {
    http: reqwest::Client,
    account_url: String,
    container: String,
    token: CachedToken,
}

impl AzureBlobStore {
    /// 資格情報を解決し、コンテナの存在を確認してから返す
    pub async fn connect(settings: &AzureStorageSettings) -> Result<Self> {
        let http = reqwest::Client::new();
        let credential = credential::from_auth(&settings.auth, http.clone());
        let store = Self {
            http,
            account_url: settings.account_url.trim_end_matches('/').to_string(),
            container: settings.container.clone(),
            token: CachedToken::new(credential, STORAGE_SCOPE),
        };

        store
            .get(&store.container_url(), &[("restype", "container")])
            .await
            .map_err(|e| ImaniError::ContainerUnreachable {
                container: store.container.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!(container = %store.container, credential = store.token.credential_name(), "Blobコンテナに接続");
        Ok(store)
    }

    fn container_url(&self) -> String {
        format!("{}/{}", self.account_url, self.container)
    }

    fn blob_url(&self, key: &str) -> String {
        format!("{}/{}", self.container_url(), encode_key(key))
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        let bearer = self.token.bearer().await?;
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(bearer)
            .header("x-ms-version", BLOB_API_VERSION)
            .header("x-ms-date", http_date())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let code = error_code(&body).unwrap_or_default();
            return Err(ImaniError::Storage(format!("{} {}", status, code).trim().to_string()));
        }
        Ok(response)
    }
}

#[async_trait]
impl ObjectStore for AzureBlobStore {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        let url = self.container_url();
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut query = vec![("restype", "container"), ("comp", "list"), ("prefix", prefix)];
            if let Some(m) = marker.as_deref() {
                query.push(("marker", m));
            }
            let body = self.get(&url, &query).await?.text().await?;
            let page = parse_list_blobs(&body);
            names.extend(page.names);

            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        Ok(names)
    }

    async fn fetch_object(&self, key: &str) -> Result<Vec<u8>> {
        let bytes = self.get(&self.blob_url(key), &[]).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    fn object_url(&self, key: &str) -> Option<String> {
        Some(self.blob_url(key))
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.container_url(), self.token.credential_name())
    }
}

/// List Blobs の1ページ
#[derive(Debug, Default, PartialEq)]
pub struct ListPage {
    pub names: Vec<String>,
    pub next_marker: Option<String>,
}

/// List Blobs のXMLからキーと継続マーカーを取り出す
pub fn parse_list_blobs(xml: &str) -> ListPage {
    lazy_static::lazy_static! {
        static ref BLOB_NAME_RE: Regex = Regex::new(r"(?s)<Blob>.*?<Name>(.*?)</Name>").unwrap();
        static ref NEXT_MARKER_RE: Regex = Regex::new(r"(?s)<NextMarker>(.*?)</NextMarker>").unwrap();
    }

    let names = BLOB_NAME_RE
        .captures_iter(xml)
        .map(|cap| unescape_xml(&cap[1]))
        .collect();
    let next_marker = NEXT_MARKER_RE
        .captures(xml)
        .map(|cap| cap[1].trim().to_string())
        .filter(|m| !m.is_empty());

    ListPage { names, next_marker }
}

/// エラーレスポンスの `<Code>`
fn error_code(xml: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref CODE_RE: Regex = Regex::new(r"<Code>(.*?)</Code>").unwrap();
    }
    CODE_RE.captures(xml).map(|cap| cap[1].to_string())
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// キーをパスセグメントごとにURLエンコード（`/` は残す）
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// RFC 1123 形式の現在時刻（x-ms-date）
fn http_date() -> String {
    chrono::Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="https://conta.blob.core.windows.net/" ContainerName="relatorios">
  <Prefix>Relatórios Técnicos/Acme/Relatórios/</Prefix>
  <Blobs>
    <Blob>
      <Name>Relatórios Técnicos/Acme/Relatórios/REL1.pdf</Name>
      <Properties><Content-Length>1024</Content-Length></Properties>
    </Blob>
    <Blob>
      <Name>Relatórios Técnicos/Acme/Relatórios/P&amp;D rel2.pdf</Name>
      <Properties><Content-Length>2048</Content-Length></Properties>
    </Blob>
  </Blobs>
  <NextMarker>2!96!MDAwMDI</NextMarker>
</EnumerationResults>"#;

    #[test]
    fn test_parse_list_blobs() {
        let page = parse_list_blobs(LIST_XML);
        assert_eq!(
            page.names,
            vec![
                "Relatórios Técnicos/Acme/Relatórios/REL1.pdf",
                "Relatórios Técnicos/Acme/Relatórios/P&D rel2.pdf",
            ]
        );
        assert_eq!(page.next_marker.as_deref(), Some("2!96!MDAwMDI"));
    }

    #[test]
    fn test_parse_list_blobs_last_page() {
        let xml = "<EnumerationResults><Blobs /><NextMarker /></EnumerationResults>";
        assert_eq!(parse_list_blobs(xml), ListPage::default());

        let xml = "<EnumerationResults><Blobs></Blobs><NextMarker></NextMarker></EnumerationResults>";
        assert_eq!(parse_list_blobs(xml), ListPage::default());
    }

    #[test]
    fn test_encode_key_keeps_slashes() {
        assert_eq!(
            encode_key("Relatórios Técnicos/Acme/Relatórios/rel 1.pdf"),
            "Relat%C3%B3rios%20T%C3%A9cnicos/Acme/Relat%C3%B3rios/rel%201.pdf"
        );
    }

    #[test]
    fn test_error_code() {
        let xml = r#"<?xml version="1.0"?><Error><Code>ContainerNotFound</Code><Message>x</Message></Error>"#;
        assert_eq!(error_code(xml).as_deref(), Some("ContainerNotFound"));
        assert_eq!(error_code(""), None);
    }

    #[test]
    fn test_http_date_format() {
        let date = http_date();
        assert!(date.ends_with(" GMT"));
        assert_eq!(date.len(), "Mon, 01 Jan 2024 00:00:00 GMT".len());
    }
}
