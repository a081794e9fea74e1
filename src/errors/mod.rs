use std::io::Error as IoError;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub mod config;
pub mod repository;

pub use config::ConfigError;
pub use repository::RepositoryError;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum AppError {
    // Service-level domain errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Conflict error: {0}")]
    Conflict(String),
    #[error("Not found error: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Too many attempts: {0}")]
    TooManyAttempts(String),
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error("Store error: {0}")]
    Store(String),
    // Infrastructure/system errors
    #[error("Server error: {0}")]
    Server(#[from] IoError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Logger error: {0}")]
    Logger(String),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl AppError {
    /// Message safe to hand back to a caller
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::TooManyAttempts(msg)
            | AppError::MethodNotAllowed(msg) => msg.clone(),
            AppError::Store(_) | AppError::Database(_) => "Database error".to_string(),
            AppError::Server(_) | AppError::Config(_) | AppError::Logger(_) => {
                "Internal server error".to_string()
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::TooManyAttempts(_) => "BUDGET_EXCEEDED",
            AppError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            AppError::Store(_) | AppError::Database(_) => "STORE_ERROR",
            AppError::Server(_) | AppError::Config(_) | AppError::Logger(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            RepositoryError::InvalidData(msg) => AppError::Validation(msg),
            RepositoryError::Database(e) => {
                log::error!("Store failure: {}", e);
                AppError::Store(e.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Flatten field errors into a single string, short code first
        let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
        fields.sort_by_key(|(field, _)| field.to_string() != "short_code");

        let message = fields
            .iter()
            .flat_map(|(_, errs)| errs.iter())
            .map(|e| {
                e.message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect::<Vec<_>>()
            .join("; ");
        AppError::Validation(message)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::TooManyAttempts(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Store(_)
            | AppError::Server(_)
            | AppError::Config(_)
            | AppError::Logger(_)
            | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.status_code();
        HttpResponse::build(code).json(json!({
            "error": self.public_message(),
            "type": self.kind(),
            "status_code": code.as_u16(),
        }))
    }
}

/// An error on the customer path, reported together with the caller's
/// remaining attempt budget
#[derive(Debug, Error)]
#[error("{error}")]
pub struct BudgetedError {
    pub error: AppError,
    pub remaining: u32,
}

impl BudgetedError {
    pub fn new(error: AppError, remaining: u32) -> Self {
        Self { error, remaining }
    }
}

impl ResponseError for BudgetedError {
    fn status_code(&self) -> StatusCode {
        self.error.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.error.public_message(),
            "remaining": self.remaining,
        }))
    }
}
