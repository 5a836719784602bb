pub mod difficulty;
pub mod dispatcher;
pub mod gemini_client;
pub mod pdf_processor;
pub mod session;

pub use difficulty::DifficultyLevel;
pub use dispatcher::{PromptDispatcher, PromptRequest, RetryPolicy, TextGenerator};
pub use gemini_client::GeminiClient;
pub use pdf_processor::{join_pages, ExtractionResult, PdfProcessor};
pub use session::{SessionController, SessionHandle, SessionStore};
