use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::response::{DocumentData, PdfMetadata};

/// A successfully extracted upload. Lives in a session's document slot until
/// replaced by another upload or the session ends.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub raw: Bytes,
    pub text: String,
    pub pages: usize,
    pub metadata: PdfMetadata,
    pub extracted_at: DateTime<Utc>,
}

impl Document {
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn to_data(&self) -> DocumentData {
        DocumentData {
            file_name: self.file_name.clone(),
            pages: self.pages,
            characters: self.text.chars().count(),
            has_text: self.has_text(),
            metadata: self.metadata.clone(),
            extracted_at: self.extracted_at,
        }
    }
}
