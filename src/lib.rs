//! SmartDoc
//!
//! Upload a PDF, extract its text, and ask a Gemini model for a summary or an
//! answer at one of three difficulty levels.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::create_router;
pub use state::AppState;
