use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::middleware::RequestLimiter;
use crate::services::{GeminiClient, PdfProcessor, PromptDispatcher, RetryPolicy, SessionStore, TextGenerator};

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: PdfProcessor,
    pub dispatcher: Arc<PromptDispatcher>,
    pub sessions: SessionStore,
    pub limiter: Arc<RequestLimiter>,
    pub started_at: Instant,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        let client = GeminiClient::from_config(&config).context("Failed to build Gemini client")?;
        Ok(Self::with_generator(config, Arc::new(client)))
    }

    /// Builds the state around any [`TextGenerator`], e.g. a fake in tests.
    pub fn with_generator(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        let retry = if config.retry_on_rate_limit {
            RetryPolicy::once_on_rate_limit(config.max_retry_delay())
        } else {
            RetryPolicy::none()
        };
        let dispatcher = PromptDispatcher::new(generator, config.request_timeout(), retry);

        Self {
            sessions: SessionStore::new(config.session_ttl()),
            limiter: Arc::new(RequestLimiter::new(config.max_concurrent_requests)),
            extractor: PdfProcessor::new(),
            dispatcher: Arc::new(dispatcher),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}
