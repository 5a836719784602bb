use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartError,
        rejection::BytesRejection,
        Multipart, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::Json,
    Extension,
};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::middleware::SessionId;
use crate::models::{ApiResponse, DocumentData, DocumentStatus, ProcessedFile};
use crate::state::AppState;

/// Multipart upload with the PDF in the `file` field.
pub async fn upload_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<DocumentData>>> {
    info!(session_id = %session.0, "Starting document upload");

    let limit_mb = state.config.max_file_size_mb;
    let file = match extract_file_from_multipart(&mut multipart, limit_mb).await {
        Ok(file) => {
            info!(
                session_id = %session.0,
                file_name = %file.name,
                file_size = file.size,
                "File extracted from multipart form"
            );
            file
        }
        Err(e) => {
            error!(session_id = %session.0, error = %e, "Failed to extract file from multipart");
            return Err(e);
        }
    };

    store_document(&state, session, file).await
}

/// Raw `application/pdf` body upload.
pub async fn upload_binary_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<ApiResponse<DocumentData>>> {
    info!(session_id = %session.0, "Starting binary document upload");

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("");

    if !content_type.contains("application/pdf") {
        warn!(
            session_id = %session.0,
            content_type = content_type,
            "Invalid content type for binary upload"
        );
        return Err(AppError::InvalidContentType);
    }

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::BodyTooLarge {
                limit: state.config.max_file_size_mb,
            }
        } else {
            AppError::invalid_file(rejection.body_text())
        }
    })?;

    if body.is_empty() {
        warn!(session_id = %session.0, "Empty body received");
        return Err(AppError::MissingFile);
    }

    let file = ProcessedFile::new("uploaded.pdf", body).with_mime_type("application/pdf");
    store_document(&state, session, file).await
}

pub async fn document_status_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Json<DocumentStatus> {
    let document = match state.sessions.get(session.0).await {
        Some(handle) => {
            let controller = handle.lock().await;
            controller.document().map(|doc| doc.to_data())
        }
        None => None,
    };

    Json(DocumentStatus {
        loaded: document.is_some(),
        document,
    })
}

/// Ends the session, discarding its document.
pub async fn clear_document_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Json<DocumentStatus> {
    let removed = state.sessions.remove(session.0).await;
    info!(session_id = %session.0, removed, "Session ended");

    Json(DocumentStatus {
        loaded: false,
        document: None,
    })
}

async fn store_document(
    state: &AppState,
    session: SessionId,
    file: ProcessedFile,
) -> AppResult<Json<ApiResponse<DocumentData>>> {
    let start = Instant::now();

    let limit_bytes = state.config.max_file_size_bytes();
    if file.size > limit_bytes {
        warn!(
            session_id = %session.0,
            file_size = file.size,
            max_size = limit_bytes,
            "File size exceeds limit"
        );
        return Err(AppError::FileTooLarge {
            size: file.size / (1024 * 1024),
            limit: state.config.max_file_size_mb,
        });
    }

    if !file.is_pdf() {
        return Err(AppError::invalid_file("File is not a valid PDF document"));
    }

    let handle = state.sessions.get_or_create(session.0).await;
    let mut controller = handle.lock().await;

    let data = match controller.upload(&state.extractor, file).await {
        Ok(document) => document.to_data(),
        Err(e) => {
            error!(session_id = %session.0, error = %e, "Document extraction failed");
            return Err(e);
        }
    };

    let total_time = start.elapsed().as_millis() as u64;
    info!(
        session_id = %session.0,
        pages = data.pages,
        characters = data.characters,
        total_time_ms = total_time,
        "Document processed successfully"
    );

    Ok(Json(ApiResponse::new(data, total_time)))
}

fn multipart_error(err: MultipartError, context: &str, limit_mb: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::BodyTooLarge { limit: limit_mb }
    } else {
        AppError::invalid_file(format!("{}: {}", context, err))
    }
}

async fn extract_file_from_multipart(
    multipart: &mut Multipart,
    limit_mb: usize,
) -> AppResult<ProcessedFile> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to read multipart field", limit_mb))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("unknown.pdf").to_string();
        let content_type = field.content_type().map(|ct| ct.to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, "Failed to read file data", limit_mb))?;

        if data.is_empty() {
            return Err(AppError::invalid_file("File is empty"));
        }

        let mut file = ProcessedFile::new(file_name, data);
        if let Some(mime_type) = content_type {
            file = file.with_mime_type(mime_type);
        }

        tracing::debug!(
            "Extracted file: {} ({} bytes, type: {:?})",
            file.name,
            file.size,
            file.mime_type
        );

        return Ok(file);
    }

    Err(AppError::MissingFile)
}
