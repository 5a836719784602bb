use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppResult, ValidationError};
use crate::models::{Document, ProcessedFile};
use crate::services::difficulty::DifficultyLevel;
use crate::services::dispatcher::{question_instruction, PromptDispatcher, SUMMARY_INSTRUCTION};
use crate::services::pdf_processor::PdfProcessor;

/// Per-session state: a single document slot, empty or populated.
#[derive(Debug, Default)]
pub struct SessionController {
    document: Option<Document>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn is_populated(&self) -> bool {
        self.document.is_some()
    }

    /// Extracts `file` and replaces the slot. On failure the previous
    /// document stays in place.
    pub async fn upload(&mut self, extractor: &PdfProcessor, file: ProcessedFile) -> AppResult<&Document> {
        let extractor = *extractor;
        let document = tokio::task::spawn_blocking(move || extractor.extract_document(file)).await??;

        info!(
            file_name = %document.file_name,
            pages = document.pages,
            text_length = document.text.len(),
            "Document slot replaced"
        );

        Ok(self.document.insert(document))
    }

    pub fn clear(&mut self) -> Option<Document> {
        self.document.take()
    }

    pub async fn generate_summary(
        &self,
        dispatcher: &PromptDispatcher,
        difficulty: DifficultyLevel,
    ) -> AppResult<String> {
        let text = self.document_text()?;
        Ok(dispatcher.dispatch(text, SUMMARY_INSTRUCTION, difficulty).await?)
    }

    pub async fn get_answer(
        &self,
        dispatcher: &PromptDispatcher,
        question: &str,
        difficulty: DifficultyLevel,
    ) -> AppResult<String> {
        let text = self.document_text()?;
        let question = question.trim();
        if question.is_empty() {
            return Err(ValidationError::EmptyQuestion.into());
        }
        let instruction = question_instruction(question);
        Ok(dispatcher.dispatch(text, &instruction, difficulty).await?)
    }

    fn document_text(&self) -> Result<&str, ValidationError> {
        self.document
            .as_ref()
            .filter(|doc| doc.has_text())
            .map(|doc| doc.text.as_str())
            .ok_or(ValidationError::NoDocument)
    }
}

pub type SessionHandle = Arc<Mutex<SessionController>>;

struct SessionEntry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// Table of live sessions keyed by the session cookie.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Returns the session's controller, creating an empty one if needed.
    /// Sessions idle longer than the TTL are dropped on the way.
    pub async fn get_or_create(&self, id: Uuid) -> SessionHandle {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions, now);

        let entry = sessions.entry(id).or_insert_with(|| {
            debug!(session_id = %id, "Creating session");
            SessionEntry {
                handle: Arc::new(Mutex::new(SessionController::new())),
                last_seen: now,
            }
        });
        entry.last_seen = now;
        entry.handle.clone()
    }

    /// Looks up a live session without creating one.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions, now);

        sessions.get_mut(&id).map(|entry| {
            entry.last_seen = now;
            entry.handle.clone()
        })
    }

    fn prune(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            info!(expired, "Dropped idle sessions");
        }
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
