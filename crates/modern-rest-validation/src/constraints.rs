//! Constraint definitions for validation

use crate::types::{TypeDescriptor, Value};

/// String constraints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringConstraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Regex the whole value is searched against.
    pub pattern: Option<String>,
}

impl StringConstraints {
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// Numeric constraints (generic over i64 and f64)
#[derive(Debug, Clone, PartialEq)]
pub struct NumericConstraints<T> {
    pub minimum: Option<T>,
    pub maximum: Option<T>,
    pub exclusive_minimum: Option<T>,
    pub exclusive_maximum: Option<T>,
    pub multiple_of: Option<T>,
}

impl<T> Default for NumericConstraints<T> {
    fn default() -> Self {
        Self {
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            multiple_of: None,
        }
    }
}

impl<T> NumericConstraints<T> {
    pub fn minimum(mut self, value: T) -> Self {
        self.minimum = Some(value);
        self
    }

    pub fn maximum(mut self, value: T) -> Self {
        self.maximum = Some(value);
        self
    }

    pub fn exclusive_minimum(mut self, value: T) -> Self {
        self.exclusive_minimum = Some(value);
        self
    }

    pub fn exclusive_maximum(mut self, value: T) -> Self {
        self.exclusive_maximum = Some(value);
        self
    }

    pub fn multiple_of(mut self, value: T) -> Self {
        self.multiple_of = Some(value);
        self
    }
}

/// List constraints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListConstraints {
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
}

/// Field descriptor for object types
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Field type
    pub type_desc: TypeDescriptor,
    /// Whether the field is required
    pub required: bool,
    /// Default value when the field is absent
    pub default: Option<Value>,
    pub description: Option<String>,
    /// Name the field is read from and written to, e.g. `X-API-Token`
    pub alias: Option<String>,
}

impl FieldDescriptor {
    /// Create a new required field
    pub fn new(name: impl Into<String>, type_desc: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            type_desc,
            required: true,
            default: None,
            description: None,
            alias: None,
        }
    }

    /// Make field optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set default value (implies optional)
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The key this field is looked up by in input data
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}
