//! modern-rest validation
//!
//! Schema descriptions and the validation engine behind modern-rest's request
//! parsing and response checking.
//!
//! - [`TypeDescriptor`] describes the shape of a body, header map or query string.
//! - [`validate`] checks a [`Value`] against a descriptor and accumulates
//!   every failure as a pydantic-style `{type, loc, msg}` entry.
//! - [`coerce`] turns raw strings (query, path, headers, cookies) into typed
//!   values before validation.
//! - [`json_schema`] exports descriptors for API documentation.
//!
//! # Example
//!
//! ```rust
//! use modern_rest_validation::{validate, FieldDescriptor, TypeDescriptor, Value};
//!
//! let user = TypeDescriptor::object(vec![
//!     FieldDescriptor::new("name", TypeDescriptor::string()),
//!     FieldDescriptor::new("age", TypeDescriptor::int()),
//! ]);
//!
//! let value: Value = serde_json::json!({"name": "Ada", "age": 36}).into();
//! assert!(validate(&value, &user).is_ok());
//!
//! let invalid: Value = serde_json::json!({"name": "Ada", "age": "old"}).into();
//! let errors = validate(&invalid, &user).unwrap_err();
//! assert_eq!(errors.as_slice()[0].loc_string(), "age");
//! ```

pub mod coerce;
pub mod constraints;
pub mod errors;
pub mod formats;
pub mod json_schema;
pub mod types;
pub mod validators;

pub use coerce::{apply_defaults, coerce_pairs, coerce_str};
pub use constraints::{FieldDescriptor, ListConstraints, NumericConstraints, StringConstraints};
pub use errors::{ErrorType, LocItem, ValidationContext, ValidationError, ValidationErrors, ValidationResult};
pub use json_schema::to_json_schema;
pub use types::{TypeDescriptor, Value};
pub use validators::{validate, validate_value, validate_with_context};
