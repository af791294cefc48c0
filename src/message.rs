use actix_multipart::MultipartError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::Display;
use serde_json::json;

use crate::db::RepositoryError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    #[display(fmt = "User")]
    User,
    #[display(fmt = "Folder")]
    Folder,
    #[display(fmt = "Photo")]
    Photo,
}

/// Every failure a handler can return. Rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    #[error("Given token not valid for any token type")]
    InvalidToken,

    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    #[error("{0} not found.")]
    NotFound(FileType),

    #[error("Photo not found in the specified folder.")]
    PhotoNotInFolder,

    #[error("Not found.")]
    UnknownResource,

    #[error("Upload exceeds the limit of {0} bytes.")]
    PayloadTooLarge(usize),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Token encoding failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Blocking task failed")]
    Blocking(#[from] actix_web::error::BlockingError),

    #[error("Application state is not configured")]
    MissingState,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn message(&self) -> String {
        if self.status_code().is_server_error() {
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            AppError::NotAuthenticated | AppError::InvalidToken | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound(_) | AppError::PhotoNotInFolder | AppError::UnknownResource => {
                StatusCode::NOT_FOUND
            }
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Repository(RepositoryError::UsernameTaken) => StatusCode::BAD_REQUEST,
            AppError::Repository(_)
            | AppError::Storage(_)
            | AppError::Hash(_)
            | AppError::Token(_)
            | AppError::Blocking(_)
            | AppError::MissingState => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        HttpResponse::build(status).json(json!({ "error": self.message() }))
    }
}
