use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::AuthError;
use crate::collection::CollectionError;
use crate::contact::ContactError;
use crate::store::StoreError;
use crate::upload::UploadError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Contact(#[from] ContactError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

fn internal(context: &str, e: &dyn std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(e) => internal("Database error", e),
            AppError::Pool(e) => internal("Pool error", e),
            AppError::Internal(msg) => internal("Internal error", msg),
            AppError::Collection(e) => match e {
                CollectionError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                CollectionError::NotAPermutation => (StatusCode::BAD_REQUEST, e.to_string()),
                // The local view was already reloaded; tell the operator to retry.
                CollectionError::Resynced(inner) => {
                    tracing::error!("Reorder failed: {}", inner);
                    (
                        StatusCode::CONFLICT,
                        "Could not save the new order; the list was reloaded".to_string(),
                    )
                }
                CollectionError::Store(inner) => internal("Collection store error", inner),
            },
            AppError::Store(e) => match e {
                StoreError::ObjectNotFound(_) | StoreError::InvalidKey(_) => {
                    (StatusCode::NOT_FOUND, "Not found".to_string())
                }
                other => internal("Store error", other),
            },
            AppError::Upload(e) => match e {
                UploadError::NothingAccepted { rejected } => {
                    let body = json!({ "error": e.to_string(), "rejected": rejected });
                    return (StatusCode::BAD_REQUEST, Json(body)).into_response();
                }
            },
            AppError::Contact(e) => match e {
                ContactError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                ContactError::Database(inner) => internal("Database error", inner),
                ContactError::Pool(inner) => internal("Pool error", inner),
                _ => (StatusCode::BAD_REQUEST, e.to_string()),
            },
            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, e.to_string()),
                AuthError::WeakPassword => (StatusCode::BAD_REQUEST, e.to_string()),
                other => internal("Auth error", other),
            },
            AppError::Multipart(e) => (StatusCode::BAD_REQUEST, e.body_text()),
        };

        (status, message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
