//! modern-rest
//!
//! Typed request/response validation and API metadata for REST endpoints.
//!
//! Each endpoint declares the request components it accepts and the
//! responses it may return. The library parses and validates input before
//! the handler runs, validates whatever comes out, and routes failures
//! through a chain of error handlers. The same declarations produce OpenAPI
//! operations.
//!
//! # Architecture
//!
//! ```text
//! EndpointDefinition + payload
//!         │  Blueprint::build
//!         ▼
//! EndpointMetadata ──► ResponseValidator
//!         │
//!         ▼
//! Controller::dispatch ─► Endpoint ─► components ─► handler ─► validator
//!                                          │            │
//!                                          └─► error handler chain
//! ```
//!
//! # Example
//!
//! ```rust
//! use modern_rest::{
//!     Endpoint, EndpointDefinition, Handler, HttpRequest, HttpStatus, ModifyPayload, Reply,
//!     Returns, Settings, TypeDescriptor,
//! };
//!
//! let definition = EndpointDefinition::new(
//!     "POST",
//!     Returns::Data(TypeDescriptor::string()),
//!     Handler::from_sync(|_ctx| Ok(Reply::json(serde_json::json!("queued")))),
//! )
//! .modify(ModifyPayload::new().status_code(HttpStatus::ACCEPTED));
//!
//! let endpoint = Endpoint::standalone(definition, &Settings::default()).unwrap();
//! let response = endpoint.call(HttpRequest::new("POST", "/jobs")).unwrap();
//! assert_eq!(response.status, HttpStatus::ACCEPTED);
//! assert_eq!(&response.body[..], b"\"queued\"");
//! ```

pub mod components;
pub mod context;
pub mod controller;
pub mod endpoint;
pub mod error;
pub mod error_handler;
pub mod handler;
pub mod headers;
pub mod logging;
pub mod openapi;
pub mod payload;
pub mod response;
pub mod serializer;
pub mod settings;
pub mod validation;

pub use components::{Component, ComponentKind, ComponentParser};
pub use context::RequestContext;
pub use controller::{compose_blueprints, Blueprint, BlueprintConfig, Controller};
pub use endpoint::Endpoint;
pub use error::{
    ApiError, DataParsingError, EndpointError, EndpointMetadataError, HandlerError,
    RequestSerializationError, ResponseSerializationError, SerializationError,
};
pub use error_handler::{default_error_handler, ErrorHandler, GlobalErrorHandler};
pub use handler::{EndpointDefinition, Handler, Returns};
pub use headers::{HeaderSpec, NewHeader, ResponseHeader};
pub use payload::{Documentation, EndpointPayload, ModifyPayload, ValidatePayload};
pub use response::{Reply, ResponseModification, ResponseSpec};
pub use serializer::{JsonSerializer, Serializer};
pub use settings::{ExtraHeaders, Settings};
pub use validation::{EndpointMetadata, ResponseValidator};

pub use modern_rest_common::{HttpMethod, HttpRequest, HttpResponse, HttpStatus};
pub use modern_rest_validation::{TypeDescriptor, Value};
