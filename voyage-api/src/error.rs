use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use voyage_core::CoreError;

/// JSON error body. Only `error` is always present.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), message: None, status_code: None, detail: None }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn upstream(mut self, status_code: u16, detail: impl Into<String>) -> Self {
        self.status_code = Some(status_code);
        self.detail = Some(detail.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
    /// Status and body chosen by the handler.
    Described(StatusCode, ErrorBody),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, ErrorBody::new(msg)),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, ErrorBody::new(msg)),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg)),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, ErrorBody::new(msg)),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, ErrorBody::new(msg)),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new("Internal Server Error"))
            }
            AppError::Described(status, body) => {
                if status.is_server_error() {
                    tracing::error!("{}: {:?}", body.error, body.detail);
                }
                (status, body)
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(what) => AppError::NotFoundError(format!("{what} not found.")),
            CoreError::AlreadyExists(what) => AppError::ConflictError(format!("{what} already exists.")),
            CoreError::Validation(msg) => AppError::ValidationError(msg),
            CoreError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}
