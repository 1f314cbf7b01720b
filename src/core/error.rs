use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Validation errors for business rules (empty line items, non-positive
    /// amounts). Always rejected before any state mutation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rejected state-machine transitions. Carries the invoice's current
    /// status so the caller can reconcile.
    #[error("Invalid transition: {reason} (current status: {current})")]
    InvalidTransition { current: String, reason: String },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Optimistic-concurrency retries exhausted
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        let body = match self {
            AppError::InvalidTransition { current, reason } => serde_json::json!({
                "error": {
                    "message": format!("Invalid transition: {}", reason),
                    "current_status": current,
                    "code": status_code.as_u16(),
                }
            }),
            _ => serde_json::json!({
                "error": {
                    "message": self.to_string(),
                    "code": status_code.as_u16(),
                }
            }),
        };

        HttpResponse::build(status_code).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn invalid_transition(current: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::InvalidTransition {
            current: current.into(),
            reason: reason.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
