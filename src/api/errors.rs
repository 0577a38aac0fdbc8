use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::domain::repositories::RepositoryError;
use crate::services::ServiceError;

/// Challenge sent with every 401
pub const BASIC_CHALLENGE: &str = r#"Basic realm="soccer""#;

const VALIDATION_FAILED: &str = "Validation failed";
const UNEXPECTED: &str = "Unexpected server error";

/// A rejected body field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    pub field: String,
    pub rejected_value: Value,
    pub message: String,
}

/// A rejected query or path parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterViolation {
    pub property: String,
    pub invalid_value: Value,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetails {
    Fields(Vec<FieldViolation>),
    Violations(Vec<ParameterViolation>),
}

/// API error type with HTTP status code, message and optional violations
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<ErrorDetails>,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a 403 Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 500 Internal Server Error with the generic message
    pub fn internal_server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED)
    }

    /// 400 listing every invalid body field
    pub fn invalid_fields(fields: Vec<FieldViolation>) -> Self {
        Self {
            details: Some(ErrorDetails::Fields(fields)),
            ..Self::bad_request(VALIDATION_FAILED)
        }
    }

    /// 400 listing every invalid request parameter
    pub fn invalid_parameters(violations: Vec<ParameterViolation>) -> Self {
        Self {
            details: Some(ErrorDetails::Violations(violations)),
            ..Self::bad_request(VALIDATION_FAILED)
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    timestamp: DateTime<Utc>,
    status: u16,
    error: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldViolation]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<&'a [ParameterViolation]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (fields, violations) = match &self.details {
            Some(ErrorDetails::Fields(fields)) => (Some(fields.as_slice()), None),
            Some(ErrorDetails::Violations(violations)) => (None, Some(violations.as_slice())),
            None => (None, None),
        };

        let body = ErrorBody {
            timestamp: Utc::now(),
            status: self.status.as_u16(),
            error: self.status.canonical_reason().unwrap_or("Unknown"),
            message: &self.message,
            fields,
            violations,
        };

        let mut response = (self.status, Json(body)).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_CHALLENGE));
        }
        response
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        let message = error.to_string();
        match error {
            ServiceError::InvalidArgument(_)
            | ServiceError::Domain(_)
            | ServiceError::Repository(RepositoryError::UnknownSortProperty(_)) => {
                Self::bad_request(message)
            }
            ServiceError::TeamNotFound(_)
            | ServiceError::Repository(RepositoryError::TeamNotFound(_)) => Self::not_found(message),
            ServiceError::Repository(RepositoryError::Database(db)) => {
                tracing::error!(error = %db, "Database failure");
                Self::internal_server_error()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(inner) => Self::bad_request(inner.body_text()),
            other => {
                tracing::error!(error = %other.body_text(), "Path extraction failed");
                Self::internal_server_error()
            }
        }
    }
}
