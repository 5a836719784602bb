use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::DifficultyLevel;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub processing_time_ms: u64,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, processing_time_ms: u64) -> Self {
        Self {
            success: true,
            data,
            processing_time_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentData {
    pub file_name: String,
    pub pages: usize,
    pub characters: usize,
    pub has_text: bool,
    pub metadata: PdfMetadata,
    pub extracted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentStatus {
    pub loaded: bool,
    pub document: Option<DocumentData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub file_size_bytes: usize,
}

impl PdfMetadata {
    pub fn new(file_size_bytes: usize) -> Self {
        Self {
            title: None,
            author: None,
            file_size_bytes,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }
}

/// Text produced by the language model for one user action.
#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedText {
    pub text: String,
    pub difficulty: DifficultyLevel,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DifficultyInfo {
    pub level: DifficultyLevel,
    pub prefix: String,
}
