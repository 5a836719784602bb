pub mod document;
pub mod health;
pub mod page;
pub mod prompt;

pub use document::*;
pub use health::*;
pub use page::*;
pub use prompt::*;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{logging_middleware, rate_limit_middleware, session_middleware};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/document",
            post(upload_handler)
                .get(document_status_handler)
                .delete(clear_document_handler),
        )
        .route("/document/binary", post(upload_binary_handler))
        .route("/summary", post(summary_handler))
        .route("/answer", post(answer_handler))
        .route("/difficulties", get(difficulties_handler))
        .layer(axum::middleware::from_fn(session_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(logging_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(state.config.max_file_size_bytes())),
        )
        .with_state(state)
}
