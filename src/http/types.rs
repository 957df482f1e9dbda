use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::TaskError;

#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(message) => Self { status: StatusCode::BAD_REQUEST, error: message },
            TaskError::NotFound => Self { status: StatusCode::NOT_FOUND, error: "task not found".into() },
            TaskError::Store(source) => {
                tracing::error!(error = %source, "store fault");
                Self { status: StatusCode::INTERNAL_SERVER_ERROR, error: "internal server error".into() }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, axum::Json(self)).into_response()
    }
}
