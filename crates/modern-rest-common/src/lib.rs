//! Common HTTP primitives for modern-rest
//!
//! Plain request/response values exchanged with the host framework, plus
//! conversions to and from the `http` crate types.

pub mod error;
pub mod http;

pub use error::{CommonError, Result};
pub use crate::http::{HttpMethod, HttpRequest, HttpRequestLike, HttpResponse, HttpResponseLike, HttpStatus};
