use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::AuthError;
use crate::datasets::DatasetError;
use crate::tabular::InvalidFilter;

/// API error with HTTP status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            code: "BAD_REQUEST".to_string(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
            code: "UNAUTHORIZED".to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
            code: "FORBIDDEN".to_string(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            code: "NOT_FOUND".to_string(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            code: "INTERNAL_SERVER_ERROR".to_string(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "code": self.code,
            }
        }));

        let mut response = (self.status, body).into_response();
        // Bearer clients expect the challenge on every 401.
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Convert AuthError to ApiError
impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let constructor = match &e {
            AuthError::InvalidCredentials | AuthError::InvalidToken => ApiError::unauthorized,
            AuthError::EmailTaken | AuthError::WrongPassword | AuthError::UpdateFailed => {
                ApiError::bad_request
            }
            AuthError::UserNotFound => ApiError::not_found,
            AuthError::Forbidden => ApiError::forbidden,
            AuthError::Hash(_) | AuthError::Token(_) | AuthError::Catalog(_) => {
                ApiError::internal_error
            }
        };
        constructor(e.to_string())
    }
}

/// Convert DatasetError to ApiError
impl From<DatasetError> for ApiError {
    fn from(e: DatasetError) -> Self {
        let constructor = match &e {
            DatasetError::NotFound(_) => ApiError::not_found,
            DatasetError::InvalidFilename(_)
            | DatasetError::Admission(_)
            | DatasetError::Chart(_) => ApiError::bad_request,
            DatasetError::Parse(_) | DatasetError::Storage(_) | DatasetError::Catalog(_) => {
                ApiError::internal_error
            }
        };
        constructor(e.to_string())
    }
}

/// Convert InvalidFilter to ApiError
impl From<InvalidFilter> for ApiError {
    fn from(e: InvalidFilter) -> Self {
        ApiError::bad_request(e.to_string())
    }
}
