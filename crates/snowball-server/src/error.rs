use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use snowball_core::EngineError;

#[derive(Debug)]
pub enum AppError {
    /// The arena update parsed but cannot be decided on.
    InvalidUpdate(EngineError),
    Unauthorized,
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUpdate(e) => write!(f, "{e}"),
            Self::Unauthorized => write!(f, "missing or invalid bearer token"),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        Self::InvalidUpdate(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidUpdate(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
