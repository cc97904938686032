use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quad_core::repository::StoreError;
use quad_events::EnrollmentError;
use quad_vendor::LifecycleError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Authentication(String),
    Authorization(String),
    Validation(String),
    NotFound(String),
    Conflict {
        code: &'static str,
        message: String,
    },
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg),
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Conflict { code, message } => (StatusCode::CONFLICT, code, message),
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "code": code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match &err {
            LifecycleError::NotFound(_) => Self::NotFound(err.to_string()),
            LifecycleError::Store(_) => Self::Internal(err.to_string()),
            _ => Self::Conflict {
                code: err.code(),
                message: err.to_string(),
            },
        }
    }
}

impl From<EnrollmentError> for AppError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::InvalidScore(_) => Self::Validation(err.to_string()),
            _ => Self::Conflict {
                code: err.code(),
                message: err.to_string(),
            },
        }
    }
}
