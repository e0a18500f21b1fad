use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Registry service error variants.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Missing or malformed input. Caller's fault, not retried.
    #[error("{0}")]
    Validation(String),
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("student {student_code} is already linked to another user")]
    AlreadyLinked { student_code: String },
    /// Document store failure, surfaced with the context added by the repository.
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl RegistryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyLinked { .. } => "ALREADY_LINKED",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::AlreadyLinked { .. } => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Store(ref e) = self {
            tracing::error!(error = format!("{e:#}"), kind = "STORE_ERROR", "store error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
