use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Email address is not verified")]
    EmailNotVerified,

    #[error("Watch not found")]
    WatchNotFound,

    #[error("Unknown store: {0}")] UnknownStore(String),

    #[error("Catalog provider error: {0}")] Provider(String),

    #[error("Notifier error: {0}")] Notifier(String),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message, field) = match self {
            AppError::Database(e) => ("DATABASE_ERROR", e.to_string(), None),
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone(), None),
            AppError::Unauthorized => ("UNAUTHORIZED", "Unauthorized".to_string(), None),
            AppError::EmailNotVerified =>
                (
                    "EMAIL_NOT_VERIFIED",
                    "Email address is not verified".to_string(),
                    Some("email".to_string()),
                ),
            AppError::WatchNotFound => ("WATCH_NOT_FOUND", "Watch not found".to_string(), None),
            AppError::UnknownStore(id) =>
                (
                    "UNKNOWN_STORE",
                    format!("Unknown store: {}", id),
                    Some("store_id".to_string()),
                ),
            AppError::Provider(msg) => ("PROVIDER_ERROR", msg.clone(), None),
            AppError::Notifier(msg) => ("NOTIFIER_ERROR", msg.clone(), None),
            AppError::Config(msg) => ("CONFIG_ERROR", msg.clone(), None),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone(), None),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::WatchNotFound => axum::http::StatusCode::NOT_FOUND,
            AppError::Unauthorized => axum::http::StatusCode::UNAUTHORIZED,
            AppError::EmailNotVerified => axum::http::StatusCode::FORBIDDEN,
            | AppError::InvalidInput(_)
            | AppError::UnknownStore(_) => {
                axum::http::StatusCode::BAD_REQUEST
            }
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
