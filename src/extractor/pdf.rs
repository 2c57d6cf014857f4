use super::{ExtractedDocument, TextExtractor};

/// pdf-extract によるテキスト抽出（テキストレイヤーのあるPDF）
///
/// ページごとに抽出して改行で連結する。
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> ExtractedDocument {
        // 壊れたPDFでパーサーがpanicすることがあるので捕まえる
        let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes));

        match result {
            Ok(Ok(pages)) => {
                let page_count = pages.len();
                ExtractedDocument::ok(pages.join("\n"), page_count)
            }
            Ok(Err(e)) => {
                tracing::warn!("PDF extraction failed: {}", e);
                ExtractedDocument::failed(e.to_string())
            }
            Err(_) => {
                tracing::warn!("PDF parser panicked");
                ExtractedDocument::failed("PDF parser panicked")
            }
        }
    }
}
