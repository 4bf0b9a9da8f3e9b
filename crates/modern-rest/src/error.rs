//! Error types
//!
//! Declaration-time failures ([`EndpointMetadataError`]) are fatal during
//! `build`. Everything raised while serving a request is converted into a
//! response; only [`EndpointError`] escapes to the host framework.

use std::collections::HashMap;
use std::fmt;

use modern_rest_common::HttpStatus;
use modern_rest_validation::{ValidationErrors, Value};
use serde::Serialize;
use thiserror::Error;

/// Invalid endpoint, blueprint or controller declaration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct EndpointMetadataError(pub String);

impl EndpointMetadataError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Request components failed to parse or validate. Always a 400.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Request validation failed: {errors}")]
pub struct RequestSerializationError {
    pub errors: ValidationErrors,
}

impl RequestSerializationError {
    pub fn new(errors: ValidationErrors) -> Self {
        Self { errors }
    }

    pub fn status(&self) -> HttpStatus {
        HttpStatus::BAD_REQUEST
    }
}

/// Payload of a [`ResponseSerializationError`]: a message or structured errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Errors(Vec<serde_json::Value>),
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => write!(f, "{}", message),
            Self::Errors(errors) => write!(f, "{} validation error(s)", errors.len()),
        }
    }
}

/// A handler's output does not match the endpoint's declared responses.
///
/// Converted straight into a `{"detail": ...}` response; never retried
/// through the error handler chain.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Response validation failed: {detail}")]
pub struct ResponseSerializationError {
    pub detail: ErrorDetail,
    pub status: HttpStatus,
}

impl ResponseSerializationError {
    /// A 422 carrying a plain message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            detail: ErrorDetail::Message(message.into()),
            status: HttpStatus::UNPROCESSABLE_ENTITY,
        }
    }

    /// A 422 carrying structured validation errors
    pub fn validation(errors: &ValidationErrors) -> Self {
        Self {
            detail: ErrorDetail::Errors(errors.as_slice().iter().map(|e| e.to_json()).collect()),
            status: HttpStatus::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn with_status(mut self, status: HttpStatus) -> Self {
        self.status = status;
        self
    }

    /// `{"detail": ...}` payload
    pub fn payload(&self) -> Value {
        let detail = match &self.detail {
            ErrorDetail::Message(message) => Value::String(message.clone()),
            ErrorDetail::Errors(errors) => {
                Value::List(errors.iter().cloned().map(Value::from).collect())
            }
        };
        Value::Object(vec![("detail".to_string(), detail)])
    }
}

/// Controlled error returned by handler logic.
///
/// Converted directly into an error response with the given payload, status
/// and headers, bypassing the error handler chain.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("API error {status}: {payload}")]
pub struct ApiError {
    pub payload: Value,
    pub status: HttpStatus,
    pub headers: HashMap<String, String>,
}

impl ApiError {
    pub fn new(payload: impl Into<Value>, status: impl Into<HttpStatus>) -> Self {
        Self {
            payload: payload.into(),
            status: status.into(),
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Bytes could not be decoded by the serializer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to parse data: {0}")]
pub struct DataParsingError(pub String);

/// A value could not be encoded by the serializer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to serialize data: {0}")]
pub struct SerializationError(pub String);

/// Failure of a handler.
///
/// Any `std::error::Error` converts via `?`; `anyhow::Error` goes through
/// [`HandlerError::other`]. An [`ApiError`] becomes the controlled `Api`
/// variant either way.
#[derive(Debug)]
pub enum HandlerError {
    Api(ApiError),
    Unexpected(anyhow::Error),
}

impl HandlerError {
    pub fn other(error: anyhow::Error) -> Self {
        match error.downcast::<ApiError>() {
            Ok(api) => Self::Api(api),
            Err(error) => Self::Unexpected(error),
        }
    }
}

impl<E> From<E> for HandlerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::other(anyhow::Error::new(error))
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(api) => write!(f, "{}", api),
            Self::Unexpected(error) => write!(f, "{:#}", error),
        }
    }
}

/// Escapes to the host framework only when no error handler, including the
/// global one, produced a response.
#[derive(Error, Debug)]
pub enum EndpointError {
    #[error("Unhandled error in endpoint {endpoint}: {error:#}")]
    Unhandled { endpoint: String, error: anyhow::Error },

    #[error("Endpoint {0} is async and must be called with `call_async`")]
    AsyncEndpoint(String),
}
