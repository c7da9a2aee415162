use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::events::EventError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Couldn't find the desired event")]
    EventNotFound,
    #[error("Missing or invalid authorization")]
    Unauthorized,
}

impl ApiError {
    fn error_type(&self) -> &'static str {
        match self {
            ApiError::Event(EventError::ExpenseNotFound(_)) | ApiError::EventNotFound => "NotFound",
            ApiError::Event(_) => "ValidationError",
            ApiError::Store(_) => "StoreError",
            ApiError::Unauthorized => "Unauthorized",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Event(EventError::ExpenseNotFound(_)) | ApiError::EventNotFound => {
                StatusCode::NOT_FOUND
            }
            ApiError::Event(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.error_type(),
            "message": self.to_string()
        }))
    }
}
