use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::ServerConfig;
use crate::services::ServiceError;

/// Body of every error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_count: Option<usize>,
    pub timestamp: String,
}

/// Error returned by handlers and extractors; renders as an [`ErrorEnvelope`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    context: Option<Value>,
    product_count: Option<usize>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            context: None,
            product_count: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Map a service failure to its HTTP form. Infrastructure detail is logged and only
    /// echoed back in development.
    pub fn service(err: ServiceError, config: &ServerConfig) -> Self {
        match err {
            ServiceError::Unauthorized => Self::unauthorized(err.to_string()),
            ServiceError::Forbidden(message) => Self::new(StatusCode::FORBIDDEN, message),
            ServiceError::Form(message) | ServiceError::Conflict(message) => {
                Self::bad_request(message)
            }
            ServiceError::NotFound(message) => Self::new(StatusCode::NOT_FOUND, message),
            ServiceError::InUse { message, count } => Self {
                product_count: Some(count),
                ..Self::bad_request(message)
            },
            ServiceError::RateLimited(message) => Self::new(StatusCode::TOO_MANY_REQUESTS, message),
            ServiceError::NothingUploaded(failed) => Self::bad_request("No image could be uploaded")
                .with_context(json!({ "failed": failed })),
            ServiceError::Media(_) | ServiceError::Repository(_) => {
                log::error!("Request failed: {err}");
                let public = if matches!(err, ServiceError::Media(_)) {
                    Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Media service error")
                } else {
                    Self::internal()
                };
                if config.is_development() {
                    public.with_context(json!({ "detail": err.to_string() }))
                } else {
                    public
                }
            }
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: self.message.clone(),
            context: self.context.clone(),
            product_count: self.product_count,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(self.envelope())
    }
}
