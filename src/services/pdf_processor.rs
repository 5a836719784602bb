use std::time::Instant;

use chrono::Utc;
use lopdf::Document as PdfDocument;

use crate::error::ExtractionError;
use crate::models::{Document, PdfMetadata, ProcessedFile};

/// Extraction adapter: turns PDF bytes into plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfProcessor;

#[derive(Debug)]
pub struct ExtractionResult {
    pub text: String,
    pub pages: usize,
    pub metadata: PdfMetadata,
    pub processing_time_ms: u64,
}

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts every page in order and joins them with [`join_pages`].
    ///
    /// A page that cannot be decoded fails the whole extraction rather than
    /// producing partial text.
    pub fn extract_text(&self, content: &[u8]) -> Result<ExtractionResult, ExtractionError> {
        let start = Instant::now();

        tracing::info!("Starting PDF text extraction ({} bytes)", content.len());

        let doc = PdfDocument::load_mem(content)
            .map_err(|e| ExtractionError::Malformed(e.to_string()))?;

        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(ExtractionError::Encrypted);
        }

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(ExtractionError::NoPages);
        }

        let mut page_texts = Vec::with_capacity(page_numbers.len());
        for page in &page_numbers {
            let text = doc.extract_text(&[*page]).map_err(|e| {
                tracing::warn!(page = *page, error = %e, "Page text extraction failed");
                ExtractionError::Page {
                    page: *page,
                    message: e.to_string(),
                }
            })?;
            page_texts.push(text);
        }

        let text = join_pages(&page_texts);
        let metadata = PdfMetadata::new(content.len())
            .with_title(info_string(&doc, b"Title"))
            .with_author(info_string(&doc, b"Author"));
        let processing_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            pages = page_numbers.len(),
            text_length = text.len(),
            processing_time_ms,
            "PDF text extraction completed"
        );

        Ok(ExtractionResult {
            text,
            pages: page_numbers.len(),
            metadata,
            processing_time_ms,
        })
    }

    pub fn extract_document(&self, file: ProcessedFile) -> Result<Document, ExtractionError> {
        let result = self.extract_text(&file.content)?;

        Ok(Document {
            file_name: file.name,
            raw: file.content,
            text: result.text,
            pages: result.pages,
            metadata: result.metadata,
            extracted_at: Utc::now(),
        })
    }

    pub fn is_available(&self) -> bool {
        true
    }
}

/// Page texts are concatenated in order with no separator between them.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages.iter().map(AsRef::as_ref).collect()
}

/// Reads a string entry from the trailer's Info dictionary.
fn info_string(doc: &PdfDocument, key: &[u8]) -> Option<String> {
    let info_ref = doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
    let info = doc.get_object(info_ref).ok()?.as_dict().ok()?;
    let raw = info.get(key).ok()?.as_str().ok()?;

    let decoded = decode_pdf_string(raw);
    let trimmed = decoded.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        decode_utf16(rest, u16::from_be_bytes)
    } else if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        decode_utf16(rest, u16::from_le_bytes)
    } else if looks_like_utf16(bytes) {
        decode_utf16(bytes, u16::from_be_bytes)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

// Mostly-NUL byte strings are UTF-16 without a BOM
fn looks_like_utf16(bytes: &[u8]) -> bool {
    if bytes.len() < 2 {
        return false;
    }
    let null_count = bytes.iter().filter(|&&b| b == 0).count();
    null_count > bytes.len() / 3
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .filter_map(Result::ok)
        .filter(|ch| *ch != '\0')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_join_without_delimiter() {
        assert_eq!(join_pages(&["Hello ", "World"]), "Hello World");
        assert_eq!(join_pages::<&str>(&[]), "");
    }

    #[test]
    fn decodes_utf16_with_and_without_bom() {
        assert_eq!(decode_pdf_string(&[0xFE, 0xFF, 0x00, b'H', 0x00, b'i']), "Hi");
        assert_eq!(decode_pdf_string(&[0xFF, 0xFE, b'H', 0x00, b'i', 0x00]), "Hi");
        assert_eq!(decode_pdf_string(&[0x00, b'O', 0x00, b'k']), "Ok");
        assert_eq!(decode_pdf_string(b"Plain title"), "Plain title");
    }

    #[test]
    fn rejects_bytes_that_are_not_pdf() {
        let err = PdfProcessor::new().extract_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));
    }
}
