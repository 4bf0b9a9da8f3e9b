//! Core type system for validation
//!
//! This module defines the type descriptors and value types used for validation.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::constraints::{FieldDescriptor, ListConstraints, NumericConstraints, StringConstraints};

// ============================================================================
// Value Enum - Runtime values to be validated
// ============================================================================

/// Runtime value that can be validated
///
/// Objects keep their keys in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (i64)
    Int(i64),
    /// Float value (f64)
    Float(f64),
    /// String value
    String(String),
    /// List/Array of values
    List(Vec<Value>),
    /// Object/Dictionary (key-value pairs)
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Get human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up an object key. Returns `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Object(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Builds a value from any serializable type.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::from)
    }

    /// Deserializes this value into a concrete type.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::from(self.clone()))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Self::Float(_) => serializer.serialize_unit(),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in pairs {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

// ============================================================================
// TypeDescriptor - Type definitions for validation
// ============================================================================

/// Type descriptor for validation
///
/// Equality is structural: two descriptors built separately from the same
/// declarations compare equal.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    // ========================================================================
    // Primitive Types
    // ========================================================================
    /// String type with constraints (length, pattern)
    String(StringConstraints),

    /// Integer type with numeric constraints (i64)
    Int64(NumericConstraints<i64>),

    /// Float type with numeric constraints (f64). Integers are accepted.
    Float64(NumericConstraints<f64>),

    /// Boolean type
    Bool,

    /// Null type
    Null,

    // ========================================================================
    // Collection Types
    // ========================================================================
    /// List/Array type with item type and constraints
    List {
        items: Box<TypeDescriptor>,
        constraints: ListConstraints,
    },

    /// Tuple type (fixed-length ordered collection with specific types)
    Tuple { items: Vec<TypeDescriptor> },

    /// Object/Dictionary type with named fields
    Object {
        fields: Vec<FieldDescriptor>,
        /// Type for additional properties not in fields. `None` ignores them.
        additional: Option<Box<TypeDescriptor>>,
    },

    // ========================================================================
    // Special Types
    // ========================================================================
    /// Optional type (nullable)
    Optional(Box<TypeDescriptor>),

    /// Union type (value can be one of multiple types)
    Union {
        variants: Vec<TypeDescriptor>,
        nullable: bool,
    },

    /// Literal type (value must exactly match one of the literal values)
    Literal { values: Vec<Value> },

    // ========================================================================
    // Format Types (automatic string validation)
    // ========================================================================
    Email,
    Url,
    Uuid,
    /// ISO 8601 DateTime
    DateTime,
    /// YYYY-MM-DD
    Date,
    /// HH:MM:SS
    Time,

    /// Any type (no validation)
    Any,
}

impl TypeDescriptor {
    pub fn string() -> Self {
        Self::String(StringConstraints::default())
    }

    pub fn int() -> Self {
        Self::Int64(NumericConstraints::default())
    }

    pub fn float() -> Self {
        Self::Float64(NumericConstraints::default())
    }

    pub fn list(items: TypeDescriptor) -> Self {
        Self::List {
            items: Box::new(items),
            constraints: ListConstraints::default(),
        }
    }

    /// Object with the given fields; unknown keys are ignored.
    pub fn object(fields: Vec<FieldDescriptor>) -> Self {
        Self::Object {
            fields,
            additional: None,
        }
    }

    /// String-keyed map whose values all share one type.
    pub fn dict(values: TypeDescriptor) -> Self {
        Self::Object {
            fields: Vec::new(),
            additional: Some(Box::new(values)),
        }
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn union(variants: Vec<TypeDescriptor>) -> Self {
        Self::Union {
            variants,
            nullable: false,
        }
    }

    pub fn literal(values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::Literal {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Get human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int64(_) => "integer",
            Self::Float64(_) => "float",
            Self::Bool => "boolean",
            Self::Null => "null",
            Self::List { .. } => "array",
            Self::Tuple { .. } => "tuple",
            Self::Object { .. } => "object",
            Self::Optional(_) => "optional",
            Self::Union { .. } => "union",
            Self::Literal { .. } => "literal",
            Self::Email => "email",
            Self::Url => "url",
            Self::Uuid => "uuid",
            Self::DateTime => "datetime",
            Self::Date => "date",
            Self::Time => "time",
            Self::Any => "any",
        }
    }

    /// Object fields, looking through `Optional`.
    pub fn fields(&self) -> &[FieldDescriptor] {
        match self {
            Self::Object { fields, .. } => fields,
            Self::Optional(inner) => inner.fields(),
            _ => &[],
        }
    }
}

/// Compact, python-flavoured rendering used in declaration error messages.
impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(_) => write!(f, "str"),
            Self::Int64(_) => write!(f, "int"),
            Self::Float64(_) => write!(f, "float"),
            Self::Bool => write!(f, "bool"),
            Self::Null => write!(f, "None"),
            Self::List { items, .. } => write!(f, "list[{}]", items),
            Self::Tuple { items } => {
                write!(f, "tuple[")?;
                write_joined(f, items)?;
                write!(f, "]")
            }
            Self::Object { fields, additional } => {
                if fields.is_empty() {
                    if let Some(values) = additional {
                        return write!(f, "dict[str, {}]", values);
                    }
                }
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    let marker = if field.required { "" } else { "?" };
                    write!(f, "{}{}: {}", field.name, marker, field.type_desc)?;
                }
                write!(f, "}}")
            }
            Self::Optional(inner) => write!(f, "{} | None", inner),
            Self::Union { variants, nullable } => {
                for (i, variant) in variants.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", variant)?;
                }
                if *nullable {
                    write!(f, " | None")?;
                }
                Ok(())
            }
            Self::Literal { values } => {
                write!(f, "Literal[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            Self::Email => write!(f, "EmailStr"),
            Self::Url => write!(f, "HttpUrl"),
            Self::Uuid => write!(f, "UUID"),
            Self::DateTime => write!(f, "datetime"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::Any => write!(f, "Any"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypeDescriptor]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(rendered) => write!(f, "{}", rendered),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_type_name() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Int(42).type_name(), "integer");
        assert_eq!(Value::List(vec![]).type_name(), "array");
        assert_eq!(Value::Object(vec![]).type_name(), "object");
    }

    #[test]
    fn test_json_conversion() {
        let value: Value = json!({"b": 1, "a": [true, null, 1.5]}).into();
        let rendered = serde_json::to_string(&value).unwrap();
        // serde_json's default map sorts keys
        assert_eq!(rendered, r#"{"a":[true,null,1.5],"b":1}"#);
        assert_eq!(value.get("b"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_deserialize_into() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct User {
            name: String,
            age: i64,
        }

        let value: Value = json!({"name": "Ada", "age": 36}).into();
        let user: User = value.deserialize_into().unwrap();
        assert_eq!(user, User { name: "Ada".to_string(), age: 36 });
    }

    #[test]
    fn test_structural_equality() {
        let first = TypeDescriptor::list(TypeDescriptor::int());
        let second = TypeDescriptor::list(TypeDescriptor::int());
        assert_eq!(first, second);
        assert_ne!(first, TypeDescriptor::list(TypeDescriptor::string()));
    }

    #[test]
    fn test_descriptor_display() {
        let desc = TypeDescriptor::object(vec![
            FieldDescriptor::new("name", TypeDescriptor::string()),
            FieldDescriptor::new("tags", TypeDescriptor::list(TypeDescriptor::string())).optional(),
        ]);
        assert_eq!(desc.to_string(), "{name: str, tags?: list[str]}");
        assert_eq!(TypeDescriptor::optional(TypeDescriptor::int()).to_string(), "int | None");
        assert_eq!(TypeDescriptor::literal(["a", "b"]).to_string(), r#"Literal["a", "b"]"#);
    }
}
