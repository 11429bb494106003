use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Every way the jobs endpoint can refuse or fail a request. The message is
/// the whole of what the caller gets to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    Unauthorized,
    MethodNotAllowed,
    MissingRequiredFields,
    FetchFailed,
    InsertFailed,
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MissingRequiredFields => StatusCode::BAD_REQUEST,
            ApiError::FetchFailed | ApiError::InsertFailed | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "Unauthorized",
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::MissingRequiredFields => {
                "Missing required fields: title, company, apply_url"
            }
            ApiError::FetchFailed => "Failed to fetch jobs",
            ApiError::InsertFailed => "Failed to insert job",
            ApiError::Internal => "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}
