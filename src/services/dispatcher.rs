use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::DispatchError;
use crate::services::difficulty::DifficultyLevel;

pub const SUMMARY_INSTRUCTION: &str =
    "Please provide a comprehensive summary of the following text:";

pub fn question_instruction(question: &str) -> String {
    format!(
        "Based on the following document, please answer this question: {}\n\nDocument content:",
        question
    )
}

/// A service that turns an ordered list of text parts into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn model(&self) -> &str;

    async fn generate(&self, parts: &[String]) -> Result<String, DispatchError>;
}

/// One outbound prompt, built fresh for each user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest<'a> {
    pub document_text: &'a str,
    pub task_instruction: &'a str,
    pub difficulty: DifficultyLevel,
}

impl<'a> PromptRequest<'a> {
    pub fn new(document_text: &'a str, task_instruction: &'a str, difficulty: DifficultyLevel) -> Self {
        Self {
            document_text,
            task_instruction,
            difficulty,
        }
    }

    pub fn composed_instruction(&self) -> String {
        self.difficulty.compose_instruction(self.task_instruction)
    }

    /// Document text first, then the composed instruction.
    pub fn parts(&self) -> Vec<String> {
        vec![self.document_text.to_string(), self.composed_instruction()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    max_delay: Duration,
}

impl RetryPolicy {
    const DEFAULT_DELAY: Duration = Duration::from_secs(1);

    pub fn none() -> Self {
        Self {
            max_retries: 0,
            max_delay: Duration::ZERO,
        }
    }

    /// A single retry after a rate-limit response, waiting at most `max_delay`.
    pub fn once_on_rate_limit(max_delay: Duration) -> Self {
        Self {
            max_retries: 1,
            max_delay,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn delay_for(&self, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or(Self::DEFAULT_DELAY).min(self.max_delay)
    }
}

pub struct PromptDispatcher {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl PromptDispatcher {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            generator,
            timeout,
            retry,
        }
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    pub async fn dispatch(
        &self,
        document_text: &str,
        task_instruction: &str,
        difficulty: DifficultyLevel,
    ) -> Result<String, DispatchError> {
        let request = PromptRequest::new(document_text, task_instruction, difficulty);
        let parts = request.parts();

        info!(
            model = self.model(),
            difficulty = %difficulty,
            document_length = document_text.len(),
            "Dispatching prompt to language model"
        );

        let mut attempt = 0;
        loop {
            match self.attempt(&parts).await {
                Ok(text) => {
                    debug!(response_length = text.len(), "Language model responded");
                    return Ok(text);
                }
                Err(DispatchError::RateLimited { retry_after }) if attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(retry_after);
                    warn!(
                        delay_ms = delay.as_millis() as u64,
                        "Language model rate limited, retrying once"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(error = %err, retryable = err.is_retryable(), "Dispatch failed");
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(&self, parts: &[String]) -> Result<String, DispatchError> {
        tokio::time::timeout(self.timeout, self.generator.generate(parts))
            .await
            .map_err(|_| DispatchError::Timeout)?
    }
}
