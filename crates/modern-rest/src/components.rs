//! Request component parsers
//!
//! A component pulls one part of the request (query string, body, headers,
//! path parameters or cookies), coerces it and validates it against a
//! schema. Blueprints declare their components as an explicit list; each
//! parsed value lands in the [`RequestContext`](crate::RequestContext) under
//! the component's context name.

use std::fmt;

use modern_rest_common::{HttpRequest, HttpRequestLike, HttpStatus};
use modern_rest_validation::{
    apply_defaults, coerce_pairs, validate_with_context, ErrorType, TypeDescriptor,
    ValidationContext, ValidationError, ValidationErrors, Value,
};

use crate::error::RequestSerializationError;
use crate::response::ResponseSpec;
use crate::serializer::Serializer;

/// Part of the request a component reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Query,
    Body,
    Headers,
    Path,
    Cookies,
}

impl ComponentKind {
    /// Key of the parsed value in the request context
    pub fn context_name(&self) -> &'static str {
        match self {
            Self::Query => "parsed_query",
            Self::Body => "parsed_body",
            Self::Headers => "parsed_headers",
            Self::Path => "parsed_path",
            Self::Cookies => "parsed_cookies",
        }
    }

    /// First `loc` item of validation errors
    pub fn loc(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Body => "body",
            Self::Headers => "headers",
            Self::Path => "path",
            Self::Cookies => "cookies",
        }
    }

    /// OpenAPI `in` value, `None` for the body
    pub fn parameter_location(&self) -> Option<&'static str> {
        match self {
            Self::Query => Some("query"),
            Self::Headers => Some("header"),
            Self::Path => Some("path"),
            Self::Cookies => Some("cookie"),
            Self::Body => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.loc())
    }
}

/// Parses one request component into a validated value
pub trait ComponentParser: Send + Sync + fmt::Debug {
    fn kind(&self) -> ComponentKind;

    fn schema(&self) -> &TypeDescriptor;

    fn context_name(&self) -> &'static str {
        self.kind().context_name()
    }

    fn provide_context_data(
        &self,
        serializer: &dyn Serializer,
        request: &HttpRequest,
    ) -> Result<Value, RequestSerializationError>;

    /// Responses this component can cause on its own
    fn responses(&self, serializer: &dyn Serializer) -> Vec<ResponseSpec> {
        vec![ResponseSpec::new(
            serializer.error_model(),
            HttpStatus::BAD_REQUEST,
        )]
    }
}

/// Built-in parser for each [`ComponentKind`]
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    kind: ComponentKind,
    schema: TypeDescriptor,
}

impl Component {
    pub fn new(kind: ComponentKind, schema: TypeDescriptor) -> Self {
        Self { kind, schema }
    }

    pub fn query(schema: TypeDescriptor) -> Self {
        Self::new(ComponentKind::Query, schema)
    }

    pub fn body(schema: TypeDescriptor) -> Self {
        Self::new(ComponentKind::Body, schema)
    }

    pub fn headers(schema: TypeDescriptor) -> Self {
        Self::new(ComponentKind::Headers, schema)
    }

    pub fn path(schema: TypeDescriptor) -> Self {
        Self::new(ComponentKind::Path, schema)
    }

    pub fn cookies(schema: TypeDescriptor) -> Self {
        Self::new(ComponentKind::Cookies, schema)
    }

    fn parse_body(
        &self,
        serializer: &dyn Serializer,
        request: &HttpRequest,
    ) -> Result<Value, ValidationErrors> {
        let body = request.body_bytes();
        if body.is_empty() {
            return Ok(apply_defaults(Value::Null, &self.schema));
        }
        let value = serializer.deserialize(body).map_err(|e| {
            ValidationErrors::from(ValidationError::new(
                vec![self.kind.loc().into()],
                e.to_string(),
                ErrorType::JsonInvalid,
            ))
        })?;
        Ok(apply_defaults(value, &self.schema))
    }

    fn raw_pairs(&self, request: &HttpRequest) -> Vec<(String, String)> {
        match self.kind {
            ComponentKind::Query => request.query_pairs(),
            ComponentKind::Headers => request
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            ComponentKind::Path => request
                .path_params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            ComponentKind::Cookies => request.cookies(),
            ComponentKind::Body => Vec::new(),
        }
    }
}

impl ComponentParser for Component {
    fn kind(&self) -> ComponentKind {
        self.kind
    }

    fn schema(&self) -> &TypeDescriptor {
        &self.schema
    }

    fn provide_context_data(
        &self,
        serializer: &dyn Serializer,
        request: &HttpRequest,
    ) -> Result<Value, RequestSerializationError> {
        let value = match self.kind {
            ComponentKind::Body => self
                .parse_body(serializer, request)
                .map_err(RequestSerializationError::new)?,
            kind => coerce_pairs(
                &self.raw_pairs(request),
                &self.schema,
                kind == ComponentKind::Headers,
            ),
        };

        let mut ctx = ValidationContext::with_location(self.kind.loc());
        validate_with_context(&value, &self.schema, &mut ctx)
            .map_err(RequestSerializationError::new)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::JsonSerializer;
    use modern_rest_validation::FieldDescriptor;
    use serde_json::json;

    fn page_schema() -> TypeDescriptor {
        TypeDescriptor::object(vec![
            FieldDescriptor::new("limit", TypeDescriptor::int()),
            FieldDescriptor::new("tag", TypeDescriptor::list(TypeDescriptor::string()))
                .default_value(Value::List(vec![])),
        ])
    }

    #[test]
    fn test_query_coerces_strings() {
        let request = HttpRequest::new("GET", "/items?limit=10&tag=a&tag=b");
        let value = Component::query(page_schema())
            .provide_context_data(&JsonSerializer, &request)
            .unwrap();
        assert_eq!(
            serde_json::Value::from(value),
            json!({"limit": 10, "tag": ["a", "b"]})
        );
    }

    #[test]
    fn test_query_error_location() {
        let request = HttpRequest::new("GET", "/items?limit=ten");
        let error = Component::query(page_schema())
            .provide_context_data(&JsonSerializer, &request)
            .unwrap_err();
        assert_eq!(error.errors.as_slice()[0].loc_string(), "query.limit");
    }

    #[test]
    fn test_headers_match_case_insensitively() {
        let schema = TypeDescriptor::object(vec![FieldDescriptor::new(
            "X-Client",
            TypeDescriptor::string(),
        )]);
        let request = HttpRequest::new("GET", "/").with_header("x-client", "cli");
        let value = Component::headers(schema)
            .provide_context_data(&JsonSerializer, &request)
            .unwrap();
        assert_eq!(value.get("X-Client"), Some(&Value::from("cli")));
    }

    #[test]
    fn test_body_invalid_json() {
        let request = HttpRequest::new("POST", "/").with_body("{oops");
        let error = Component::body(page_schema())
            .provide_context_data(&JsonSerializer, &request)
            .unwrap_err();
        assert_eq!(error.errors.as_slice()[0].error_type, ErrorType::JsonInvalid);
        assert_eq!(error.errors.as_slice()[0].loc_string(), "body");
    }

    #[test]
    fn test_body_fills_defaults() {
        let request = HttpRequest::new("POST", "/").with_body(r#"{"limit": 3}"#);
        let value = Component::body(page_schema())
            .provide_context_data(&JsonSerializer, &request)
            .unwrap();
        assert_eq!(value.get("tag"), Some(&Value::List(vec![])));
    }

    #[test]
    fn test_path_and_cookies() {
        let schema = TypeDescriptor::object(vec![FieldDescriptor::new("id", TypeDescriptor::int())]);
        let request = HttpRequest::new("GET", "/users/7")
            .with_path_param("id", "7")
            .with_header("Cookie", "id=9; theme=dark");

        let path = Component::path(schema.clone())
            .provide_context_data(&JsonSerializer, &request)
            .unwrap();
        assert_eq!(path.get("id"), Some(&Value::Int(7)));

        let cookies = Component::cookies(schema)
            .provide_context_data(&JsonSerializer, &request)
            .unwrap();
        assert_eq!(cookies.get("id"), Some(&Value::Int(9)));
    }

    #[test]
    fn test_component_declares_bad_request() {
        let responses = Component::query(page_schema()).responses(&JsonSerializer);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].status_code, HttpStatus::BAD_REQUEST);
    }
}
