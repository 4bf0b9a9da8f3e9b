//! Shared HTTP types for modern-rest.
//!
//! Header names are stored lowercased; lookups through the `*Like` traits are
//! case-insensitive.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::{CommonError, Result};

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
    Connect,
}

impl HttpMethod {
    /// Every method recognized without `allow_custom_http_methods`.
    pub const ALL: [HttpMethod; 9] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Head,
        Self::Options,
        Self::Trace,
        Self::Connect,
    ];

    /// Returns the method as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "TRACE" => Ok(Self::Trace),
            "CONNECT" => Ok(Self::Connect),
            _ => Err(format!("Invalid HTTP method: {}", s)),
        }
    }
}

/// HTTP status code wrapper with helper methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HttpStatus(pub u16);

impl HttpStatus {
    // Common status codes
    pub const OK: Self = Self(200);
    pub const CREATED: Self = Self(201);
    pub const ACCEPTED: Self = Self(202);
    pub const NO_CONTENT: Self = Self(204);
    pub const NOT_MODIFIED: Self = Self(304);
    pub const BAD_REQUEST: Self = Self(400);
    pub const UNAUTHORIZED: Self = Self(401);
    pub const PAYMENT_REQUIRED: Self = Self(402);
    pub const FORBIDDEN: Self = Self(403);
    pub const NOT_FOUND: Self = Self(404);
    pub const METHOD_NOT_ALLOWED: Self = Self(405);
    pub const CONFLICT: Self = Self(409);
    pub const GONE: Self = Self(410);
    pub const UNPROCESSABLE_ENTITY: Self = Self(422);
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);
    pub const BAD_GATEWAY: Self = Self(502);
    pub const SERVICE_UNAVAILABLE: Self = Self(503);

    /// Returns the status code as u16.
    pub fn code(&self) -> u16 {
        self.0
    }

    /// Returns true if this is a success status (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }

    /// Returns true if this is a client error status (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }

    /// Returns true if this is a server error status (5xx).
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0)
    }

    /// Returns true if this is a redirect status (3xx).
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.0)
    }

    /// Returns true if this is an informational status (1xx).
    pub fn is_informational(&self) -> bool {
        (100..200).contains(&self.0)
    }

    /// Returns false for statuses that must not carry a response body
    /// (1xx, 204 and 304).
    pub fn allows_body(&self) -> bool {
        !(self.is_informational() || *self == Self::NO_CONTENT || *self == Self::NOT_MODIFIED)
    }

    /// Canonical reason phrase, e.g. "Not Found" for 404.
    pub fn reason_phrase(&self) -> Option<&'static str> {
        ::http::StatusCode::from_u16(self.0)
            .ok()
            .and_then(|status| status.canonical_reason())
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for HttpStatus {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl From<HttpStatus> for u16 {
    fn from(status: HttpStatus) -> Self {
        status.0
    }
}

impl From<::http::StatusCode> for HttpStatus {
    fn from(status: ::http::StatusCode) -> Self {
        Self(status.as_u16())
    }
}

/// Trait for types that represent HTTP responses.
pub trait HttpResponseLike {
    /// Returns the HTTP status code.
    fn status_code(&self) -> u16;

    /// Returns the response headers, keyed by lowercased name.
    fn headers(&self) -> &HashMap<String, String>;

    /// Returns the response body as bytes.
    fn body_bytes(&self) -> &[u8];

    /// Returns true if this is a success response (2xx).
    fn is_success(&self) -> bool {
        HttpStatus(self.status_code()).is_success()
    }

    /// Gets a header value by name (case-insensitive).
    fn header(&self, name: &str) -> Option<&str> {
        self.headers()
            .get(&name.to_lowercase())
            .map(|s| s.as_str())
    }

    /// Returns the Content-Type header value.
    fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Trait for types that represent HTTP requests.
pub trait HttpRequestLike {
    /// Returns the request method name, uppercased. May be a custom method.
    fn method_name(&self) -> &str;

    /// Returns the request path without the query string.
    fn path(&self) -> &str;

    /// Returns the request headers, keyed by lowercased name.
    fn headers(&self) -> &HashMap<String, String>;

    /// Returns the request body as bytes.
    fn body_bytes(&self) -> &[u8];

    /// Parses the method name into a known [`HttpMethod`].
    fn method(&self) -> Option<HttpMethod> {
        self.method_name().parse().ok()
    }

    /// Gets a header value by name (case-insensitive).
    fn header(&self, name: &str) -> Option<&str> {
        self.headers()
            .get(&name.to_lowercase())
            .map(|s| s.as_str())
    }

    /// Returns the Content-Type header value.
    fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// A response as produced by handlers and returned to the host framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: HttpStatus,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Builds a response from body bytes, status and headers.
    pub fn new<I, K, V>(body: impl Into<Bytes>, status: impl Into<HttpStatus>, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            status: status.into(),
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.as_ref().to_lowercase(), value.into()))
                .collect(),
            body: body.into(),
        }
    }

    /// Response with an empty body and no headers.
    pub fn empty(status: impl Into<HttpStatus>) -> Self {
        Self {
            status: status.into(),
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Adds or replaces a header.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    pub fn insert_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_lowercase(), value.into());
    }

    /// Converts into an `http::Response`.
    pub fn into_http(self) -> Result<::http::Response<Bytes>> {
        let status = ::http::StatusCode::from_u16(self.status.0)
            .map_err(|_| CommonError::InvalidStatus(self.status.0))?;
        let mut builder = ::http::Response::builder().status(status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        Ok(builder.body(self.body)?)
    }
}

impl HttpResponseLike for HttpResponse {
    fn status_code(&self) -> u16 {
        self.status.0
    }

    fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    fn body_bytes(&self) -> &[u8] {
        &self.body
    }
}

impl TryFrom<HttpResponse> for ::http::Response<Bytes> {
    type Error = CommonError;

    fn try_from(response: HttpResponse) -> Result<Self> {
        response.into_http()
    }
}

impl TryFrom<::http::Response<Bytes>> for HttpResponse {
    type Error = CommonError;

    fn try_from(response: ::http::Response<Bytes>) -> Result<Self> {
        let (parts, body) = response.into_parts();
        Ok(Self {
            status: parts.status.into(),
            headers: collect_headers(&parts.headers)?,
            body,
        })
    }
}

/// An incoming request as handed over by the host framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Uppercased method name.
    pub method: String,
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: String,
    pub headers: HashMap<String, String>,
    /// Path parameters resolved by the host router.
    pub path_params: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpRequest {
    /// Creates a request; a `?query` suffix on `url` is split off.
    pub fn new(method: &str, url: &str) -> Self {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path.to_string(), query.to_string()),
            None => (url.to_string(), String::new()),
        };
        Self {
            method: method.to_uppercase(),
            path,
            query,
            headers: HashMap::new(),
            path_params: HashMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Decoded query string pairs, in order of appearance.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect()
    }

    /// Cookies from the `Cookie` header.
    pub fn cookies(&self) -> Vec<(String, String)> {
        let Some(raw) = self.header("cookie") else {
            return Vec::new();
        };
        raw.split(';')
            .filter_map(|part| {
                let (name, value) = part.trim().split_once('=')?;
                Some((name.trim().to_string(), decode_component(value.trim())))
            })
            .collect()
    }
}

impl HttpRequestLike for HttpRequest {
    fn method_name(&self) -> &str {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    fn body_bytes(&self) -> &[u8] {
        &self.body
    }
}

impl TryFrom<::http::Request<Bytes>> for HttpRequest {
    type Error = CommonError;

    fn try_from(request: ::http::Request<Bytes>) -> Result<Self> {
        let (parts, body) = request.into_parts();
        Ok(Self {
            method: parts.method.as_str().to_uppercase(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().unwrap_or_default().to_string(),
            headers: collect_headers(&parts.headers)?,
            path_params: HashMap::new(),
            body,
        })
    }
}

fn collect_headers(headers: &::http::HeaderMap) -> Result<HashMap<String, String>> {
    let mut collected = HashMap::with_capacity(headers.len());
    for (name, value) in headers {
        let value = value.to_str().map_err(|e| CommonError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        collected.insert(name.as_str().to_string(), value.to_string());
    }
    Ok(collected)
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
