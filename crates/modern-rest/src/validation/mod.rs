//! Declaration-time and response-time validation

pub mod metadata;
pub mod response;

pub use metadata::{build_metadata, merge_response, EndpointMetadata};
pub use response::ResponseValidator;
