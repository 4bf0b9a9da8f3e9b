//! Per-request context handed to handlers and error handlers

use std::collections::HashMap;
use std::sync::Arc;

use modern_rest_common::{HttpRequest, HttpResponse, HttpStatus};
use modern_rest_validation::Value;
use serde::de::DeserializeOwned;

use crate::components::ComponentKind;
use crate::error::{DataParsingError, SerializationError};
use crate::serializer::Serializer;

/// The request plus everything parsed from it.
///
/// Cheap to clone; async handlers take it by value.
#[derive(Clone)]
pub struct RequestContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    request: HttpRequest,
    parsed: HashMap<&'static str, Value>,
    serializer: Arc<dyn Serializer>,
}

impl RequestContext {
    pub fn new(
        request: HttpRequest,
        parsed: HashMap<&'static str, Value>,
        serializer: Arc<dyn Serializer>,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                request,
                parsed,
                serializer,
            }),
        }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.inner.request
    }

    pub fn serializer(&self) -> &dyn Serializer {
        self.inner.serializer.as_ref()
    }

    /// Parsed value stored under a context name such as `parsed_body`
    pub fn parsed(&self, context_name: &str) -> Option<&Value> {
        self.inner.parsed.get(context_name)
    }

    pub fn parsed_query(&self) -> Option<&Value> {
        self.parsed(ComponentKind::Query.context_name())
    }

    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed(ComponentKind::Body.context_name())
    }

    pub fn parsed_headers(&self) -> Option<&Value> {
        self.parsed(ComponentKind::Headers.context_name())
    }

    pub fn parsed_path(&self) -> Option<&Value> {
        self.parsed(ComponentKind::Path.context_name())
    }

    pub fn parsed_cookies(&self) -> Option<&Value> {
        self.parsed(ComponentKind::Cookies.context_name())
    }

    pub fn query<T: DeserializeOwned>(&self) -> Result<T, DataParsingError> {
        self.component(ComponentKind::Query)
    }

    pub fn body<T: DeserializeOwned>(&self) -> Result<T, DataParsingError> {
        self.component(ComponentKind::Body)
    }

    pub fn headers<T: DeserializeOwned>(&self) -> Result<T, DataParsingError> {
        self.component(ComponentKind::Headers)
    }

    pub fn path<T: DeserializeOwned>(&self) -> Result<T, DataParsingError> {
        self.component(ComponentKind::Path)
    }

    pub fn cookies<T: DeserializeOwned>(&self) -> Result<T, DataParsingError> {
        self.component(ComponentKind::Cookies)
    }

    fn component<T: DeserializeOwned>(&self, kind: ComponentKind) -> Result<T, DataParsingError> {
        let value = self.parsed(kind.context_name()).ok_or_else(|| {
            DataParsingError(format!("Component `{}` is not declared for this endpoint", kind))
        })?;
        value
            .deserialize_into()
            .map_err(|e| DataParsingError(format!("{}: {}", kind, e)))
    }

    /// Status used when a response is built without an explicit one
    pub fn default_status(&self) -> HttpStatus {
        if self.inner.request.method == "POST" {
            HttpStatus::CREATED
        } else {
            HttpStatus::OK
        }
    }

    /// Serializes `value` into a response with the method's default status
    pub fn to_response(&self, value: impl Into<Value>) -> Result<HttpResponse, SerializationError> {
        self.to_response_with(value, self.default_status(), std::iter::empty::<(String, String)>())
    }

    pub fn to_response_with<I, K, V>(
        &self,
        value: impl Into<Value>,
        status: HttpStatus,
        headers: I,
    ) -> Result<HttpResponse, SerializationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let serializer = self.serializer();
        let body = serializer.serialize(&value.into())?;
        let mut response = HttpResponse::new(body, status, headers);
        response.insert_header("content-type", serializer.content_type());
        Ok(response)
    }

    /// Error response carrying `payload`
    pub fn to_error<I, K, V>(
        &self,
        payload: impl Into<Value>,
        status: HttpStatus,
        headers: I,
    ) -> Result<HttpResponse, SerializationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.to_response_with(payload, status, headers)
    }
}
