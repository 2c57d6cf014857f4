//! 文書テキスト抽出
//!
//! 失敗しても例外にはせず、本文の代わりにエラーマーカー文字列を返す。

mod pdf;

pub use pdf::PdfTextExtractor;

/// 抽出結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// 本文（失敗時はエラーマーカー）
    pub text: String,
    /// ページ数（読めなかった場合は None）
    pub page_count: Option<usize>,
    /// 失敗理由
    pub error: Option<String>,
}

impl ExtractedDocument {
    pub fn ok(text: String, page_count: usize) -> Self {
        Self {
            text,
            page_count: Some(page_count),
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            text: error_marker(&reason),
            page_count: None,
            error: Some(reason),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// 本文の代わりに入れるマーカー
pub fn error_marker(reason: &str) -> String {
    format!("[Erro ao ler o PDF: {}]", reason)
}

pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> ExtractedDocument;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_document_has_marker() {
        let doc = ExtractedDocument::failed("cabeçalho inválido");
        assert_eq!(doc.text, "[Erro ao ler o PDF: cabeçalho inválido]");
        assert_eq!(doc.page_count, None);
        assert!(!doc.is_ok());
    }

    #[test]
    fn test_ok_document() {
        let doc = ExtractedDocument::ok("texto".into(), 2);
        assert!(doc.is_ok());
        assert_eq!(doc.page_count, Some(2));
    }
}
