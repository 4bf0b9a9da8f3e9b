//! Validation error types
//!
//! Errors are collected rather than returned on first failure, and render in
//! the pydantic-compatible `{"type", "loc", "msg"}` shape.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Validation Result
// ============================================================================

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationErrors>;

// ============================================================================
// Location
// ============================================================================

/// One step of an error location: an object key or a list index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocItem {
    Key(String),
    Index(usize),
}

impl fmt::Display for LocItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{}", key),
            Self::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for LocItem {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for LocItem {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for LocItem {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&LocItem> for serde_json::Value {
    fn from(item: &LocItem) -> Self {
        match item {
            LocItem::Key(key) => serde_json::Value::String(key.clone()),
            LocItem::Index(index) => serde_json::Value::from(*index),
        }
    }
}

// ============================================================================
// Validation Errors Collection
// ============================================================================

/// Collection of validation errors
#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("{} validation error(s)", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    /// Merge another ValidationErrors into this one
    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// Convert to Result - Ok if no errors, Err if there are errors
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn as_slice(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Prepends `prefix` to every error location, e.g. `["age"]` becomes
    /// `["body", "age"]`.
    pub fn with_loc_prefix(mut self, prefix: impl Into<LocItem>) -> Self {
        let prefix = prefix.into();
        for error in &mut self.errors {
            error.loc.insert(0, prefix.clone());
        }
        self
    }

    /// Renders as a JSON array of `{"type", "loc", "msg"}` objects.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.errors.iter().map(ValidationError::to_json).collect())
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self { errors: vec![error] }
    }
}

// ============================================================================
// Single Validation Error
// ============================================================================

/// A single validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Path to the offending value, outermost first
    pub loc: Vec<LocItem>,
    /// Human-readable error message
    pub msg: String,
    pub error_type: ErrorType,
}

impl ValidationError {
    pub fn new(loc: Vec<LocItem>, msg: impl Into<String>, error_type: ErrorType) -> Self {
        Self {
            loc,
            msg: msg.into(),
            error_type,
        }
    }

    /// Create a missing field error
    pub fn missing(loc: Vec<LocItem>) -> Self {
        Self::new(loc, "Field required", ErrorType::Missing)
    }

    /// Dotted location, e.g. `items.0.name`
    pub fn loc_string(&self) -> String {
        self.loc
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.error_type.as_str(),
            "loc": self.loc.iter().map(serde_json::Value::from).collect::<Vec<_>>(),
            "msg": self.msg,
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.loc_string(), self.msg, self.error_type)
    }
}

// ============================================================================
// Error Type Classification
// ============================================================================

/// Classification of validation errors, named after pydantic's error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Missing,
    NoneRequired,
    StringType,
    IntType,
    IntParsing,
    FloatType,
    BoolType,
    ListType,
    TupleType,
    DictType,
    StringTooShort,
    StringTooLong,
    StringPatternMismatch,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    MultipleOf,
    TooShort,
    TooLong,
    LiteralError,
    UnionError,
    /// Invalid format (e.g., invalid email, malformed UUID)
    FormatError,
    ValueError,
    /// Body bytes could not be decoded at all
    JsonInvalid,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::NoneRequired => "none_required",
            Self::StringType => "string_type",
            Self::IntType => "int_type",
            Self::IntParsing => "int_parsing",
            Self::FloatType => "float_type",
            Self::BoolType => "bool_type",
            Self::ListType => "list_type",
            Self::TupleType => "tuple_type",
            Self::DictType => "dict_type",
            Self::StringTooShort => "string_too_short",
            Self::StringTooLong => "string_too_long",
            Self::StringPatternMismatch => "string_pattern_mismatch",
            Self::GreaterThan => "greater_than",
            Self::GreaterThanEqual => "greater_than_equal",
            Self::LessThan => "less_than",
            Self::LessThanEqual => "less_than_equal",
            Self::MultipleOf => "multiple_of",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::LiteralError => "literal_error",
            Self::UnionError => "union_error",
            Self::FormatError => "format_error",
            Self::ValueError => "value_error",
            Self::JsonInvalid => "json_invalid",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Validation Context
// ============================================================================

/// Tracks the current location while walking nested structures
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub path: Vec<LocItem>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self { path: Vec::new() }
    }

    /// Context whose errors start at `location`, e.g. `"body"`
    pub fn with_location(location: impl Into<LocItem>) -> Self {
        Self {
            path: vec![location.into()],
        }
    }

    pub fn push(&mut self, item: impl Into<LocItem>) {
        self.path.push(item.into());
    }

    pub fn pop(&mut self) {
        self.path.pop();
    }

    /// Snapshot of the current location
    pub fn loc(&self) -> Vec<LocItem> {
        self.path.clone()
    }
}
