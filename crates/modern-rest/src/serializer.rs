//! Serialization backend
//!
//! The [`Serializer`] trait is the only seam between the endpoint pipeline
//! and a wire format. [`JsonSerializer`] is the default.

use bytes::Bytes;
use modern_rest_validation::{
    validate_with_context, FieldDescriptor, TypeDescriptor, ValidationContext, ValidationErrors,
    Value,
};

use crate::error::{DataParsingError, SerializationError};

/// Encodes, decodes and validates payloads for one content type
pub trait Serializer: Send + Sync {
    fn name(&self) -> &str;

    /// Value for the `Content-Type` header of serialized responses
    fn content_type(&self) -> &str;

    fn serialize(&self, value: &Value) -> Result<Bytes, SerializationError>;

    fn deserialize(&self, bytes: &[u8]) -> Result<Value, DataParsingError>;

    fn validate(&self, value: &Value, schema: &TypeDescriptor) -> Result<(), ValidationErrors> {
        validate_with_context(value, schema, &mut ValidationContext::new())
    }

    /// Schema of the payloads produced by [`Serializer::error_payload`] and
    /// by the default error handler.
    fn error_model(&self) -> TypeDescriptor {
        default_error_model()
    }

    /// `{"detail": [...]}` payload for validation failures
    fn error_payload(&self, errors: &ValidationErrors) -> Value {
        Value::Object(vec![(
            "detail".to_string(),
            errors.to_json().into(),
        )])
    }
}

/// `{"detail": list[{type, loc, msg}] | str}`
pub fn default_error_model() -> TypeDescriptor {
    let entry = TypeDescriptor::object(vec![
        FieldDescriptor::new("type", TypeDescriptor::string()),
        FieldDescriptor::new(
            "loc",
            TypeDescriptor::list(TypeDescriptor::union(vec![
                TypeDescriptor::string(),
                TypeDescriptor::int(),
            ])),
        ),
        FieldDescriptor::new("msg", TypeDescriptor::string()),
    ]);
    TypeDescriptor::object(vec![FieldDescriptor::new(
        "detail",
        TypeDescriptor::union(vec![TypeDescriptor::list(entry), TypeDescriptor::string()]),
    )])
}

/// JSON via `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn name(&self) -> &str {
        "json"
    }

    fn content_type(&self) -> &str {
        "application/json"
    }

    fn serialize(&self, value: &Value) -> Result<Bytes, SerializationError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| SerializationError(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value, DataParsingError> {
        serde_json::from_slice::<serde_json::Value>(bytes)
            .map(Value::from)
            .map_err(|e| DataParsingError(e.to_string()))
    }
}
