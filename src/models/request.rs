use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::services::DifficultyLevel;

#[derive(Debug, Deserialize, Serialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub difficulty: DifficultyLevel,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
}

/// An uploaded file as received from the client, before extraction.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub name: String,
    pub size: usize,
    pub content: Bytes,
    pub mime_type: Option<String>,
}

impl ProcessedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len(),
            content,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn is_pdf(&self) -> bool {
        let declared_pdf = self
            .mime_type
            .as_deref()
            .map(|mt| mt.starts_with("application/pdf"))
            .unwrap_or(false);

        declared_pdf
            || self.name.to_lowercase().ends_with(".pdf")
            || self.content.starts_with(b"%PDF")
    }
}
