//! Core validation logic
//!
//! Walks a [`Value`] alongside its [`TypeDescriptor`] and accumulates errors
//! rather than stopping at the first failure.

use std::collections::HashSet;
use std::fmt::Display;

use regex::Regex;

use crate::constraints::{FieldDescriptor, ListConstraints, NumericConstraints, StringConstraints};
use crate::errors::{ErrorType, ValidationContext, ValidationError, ValidationErrors, ValidationResult};
use crate::formats;
use crate::types::{TypeDescriptor, Value};

// ============================================================================
// Public API
// ============================================================================

/// Validate a value against a type descriptor
///
/// ```
/// use modern_rest_validation::{validate, TypeDescriptor, Value};
///
/// let value = Value::String("user@example.com".to_string());
/// assert!(validate(&value, &TypeDescriptor::Email).is_ok());
/// ```
pub fn validate(value: &Value, type_desc: &TypeDescriptor) -> ValidationResult<()> {
    let mut ctx = ValidationContext::new();
    validate_with_context(value, type_desc, &mut ctx)
}

/// Validate starting from a caller-provided location
pub fn validate_with_context(
    value: &Value,
    type_desc: &TypeDescriptor,
    ctx: &mut ValidationContext,
) -> ValidationResult<()> {
    let mut errors = ValidationErrors::new();
    validate_value(value, type_desc, ctx, &mut errors);
    errors.into_result()
}

// ============================================================================
// Core Validation Function
// ============================================================================

/// Recursively validates `value`, pushing failures onto `errors`.
pub fn validate_value(
    value: &Value,
    type_desc: &TypeDescriptor,
    ctx: &mut ValidationContext,
    errors: &mut ValidationErrors,
) {
    match type_desc {
        TypeDescriptor::String(constraints) => validate_string(value, constraints, ctx, errors),
        TypeDescriptor::Int64(constraints) => validate_int64(value, constraints, ctx, errors),
        TypeDescriptor::Float64(constraints) => validate_float64(value, constraints, ctx, errors),
        TypeDescriptor::Bool => {
            if !matches!(value, Value::Bool(_)) {
                errors.add(ValidationError::new(
                    ctx.loc(),
                    "Input should be a valid boolean",
                    ErrorType::BoolType,
                ));
            }
        }
        TypeDescriptor::Null => {
            if !value.is_null() {
                errors.add(ValidationError::new(
                    ctx.loc(),
                    "Input should be None",
                    ErrorType::NoneRequired,
                ));
            }
        }
        TypeDescriptor::List { items, constraints } => {
            validate_list(value, items, constraints, ctx, errors)
        }
        TypeDescriptor::Tuple { items } => validate_tuple(value, items, ctx, errors),
        TypeDescriptor::Object { fields, additional } => {
            validate_object(value, fields, additional.as_deref(), ctx, errors)
        }
        TypeDescriptor::Optional(inner) => {
            if !value.is_null() {
                validate_value(value, inner, ctx, errors);
            }
        }
        TypeDescriptor::Union { variants, nullable } => {
            validate_union(value, variants, *nullable, ctx, errors)
        }
        TypeDescriptor::Literal { values } => validate_literal(value, values, ctx, errors),
        TypeDescriptor::Email => {
            validate_format(value, formats::is_email, "a valid email address", ctx, errors)
        }
        TypeDescriptor::Url => validate_format(value, formats::is_url, "a valid URL", ctx, errors),
        TypeDescriptor::Uuid => validate_format(value, formats::is_uuid, "a valid UUID", ctx, errors),
        TypeDescriptor::DateTime => {
            validate_format(value, formats::is_datetime, "a valid datetime", ctx, errors)
        }
        TypeDescriptor::Date => validate_format(value, formats::is_date, "a valid date", ctx, errors),
        TypeDescriptor::Time => validate_format(value, formats::is_time, "a valid time", ctx, errors),
        TypeDescriptor::Any => {}
    }
}

// ============================================================================
// Primitive Types
// ============================================================================

fn validate_string(
    value: &Value,
    constraints: &StringConstraints,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    let Value::String(s) = value else {
        errors.add(ValidationError::new(
            ctx.loc(),
            "Input should be a valid string",
            ErrorType::StringType,
        ));
        return;
    };

    let length = s.chars().count();
    if let Some(min) = constraints.min_length {
        if length < min {
            errors.add(ValidationError::new(
                ctx.loc(),
                format!("String should have at least {} characters", min),
                ErrorType::StringTooShort,
            ));
        }
    }
    if let Some(max) = constraints.max_length {
        if length > max {
            errors.add(ValidationError::new(
                ctx.loc(),
                format!("String should have at most {} characters", max),
                ErrorType::StringTooLong,
            ));
        }
    }
    if let Some(pattern) = &constraints.pattern {
        match Regex::new(pattern) {
            Ok(re) if re.is_match(s) => {}
            Ok(_) => errors.add(ValidationError::new(
                ctx.loc(),
                format!("String should match pattern '{}'", pattern),
                ErrorType::StringPatternMismatch,
            )),
            Err(e) => errors.add(ValidationError::new(
                ctx.loc(),
                format!("Invalid pattern '{}': {}", pattern, e),
                ErrorType::ValueError,
            )),
        }
    }
}

fn validate_int64(
    value: &Value,
    constraints: &NumericConstraints<i64>,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    let Value::Int(n) = value else {
        errors.add(ValidationError::new(
            ctx.loc(),
            "Input should be a valid integer",
            ErrorType::IntType,
        ));
        return;
    };

    validate_bounds(*n, constraints, ctx, errors);
    if let Some(multiple) = constraints.multiple_of {
        if multiple != 0 && n % multiple != 0 {
            errors.add(multiple_of_error(multiple, ctx));
        }
    }
}

fn validate_float64(
    value: &Value,
    constraints: &NumericConstraints<f64>,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    let n = match value {
        Value::Float(f) => *f,
        Value::Int(i) => *i as f64,
        _ => {
            errors.add(ValidationError::new(
                ctx.loc(),
                "Input should be a valid number",
                ErrorType::FloatType,
            ));
            return;
        }
    };

    validate_bounds(n, constraints, ctx, errors);
    if let Some(multiple) = constraints.multiple_of {
        if multiple != 0.0 && ((n / multiple).round() * multiple - n).abs() > f64::EPSILON * n.abs().max(1.0) {
            errors.add(multiple_of_error(multiple, ctx));
        }
    }
}

fn validate_bounds<T>(
    n: T,
    constraints: &NumericConstraints<T>,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) where
    T: PartialOrd + Display + Copy,
{
    if let Some(min) = constraints.minimum {
        if n < min {
            errors.add(ValidationError::new(
                ctx.loc(),
                format!("Input should be greater than or equal to {}", min),
                ErrorType::GreaterThanEqual,
            ));
        }
    }
    if let Some(max) = constraints.maximum {
        if n > max {
            errors.add(ValidationError::new(
                ctx.loc(),
                format!("Input should be less than or equal to {}", max),
                ErrorType::LessThanEqual,
            ));
        }
    }
    if let Some(min) = constraints.exclusive_minimum {
        if n <= min {
            errors.add(ValidationError::new(
                ctx.loc(),
                format!("Input should be greater than {}", min),
                ErrorType::GreaterThan,
            ));
        }
    }
    if let Some(max) = constraints.exclusive_maximum {
        if n >= max {
            errors.add(ValidationError::new(
                ctx.loc(),
                format!("Input should be less than {}", max),
                ErrorType::LessThan,
            ));
        }
    }
}

fn multiple_of_error(multiple: impl Display, ctx: &ValidationContext) -> ValidationError {
    ValidationError::new(
        ctx.loc(),
        format!("Input should be a multiple of {}", multiple),
        ErrorType::MultipleOf,
    )
}

// ============================================================================
// Collection Types
// ============================================================================

fn validate_list(
    value: &Value,
    item_type: &TypeDescriptor,
    constraints: &ListConstraints,
    ctx: &mut ValidationContext,
    errors: &mut ValidationErrors,
) {
    let Value::List(items) = value else {
        errors.add(ValidationError::new(
            ctx.loc(),
            "Input should be a valid list",
            ErrorType::ListType,
        ));
        return;
    };

    if let Some(min) = constraints.min_items {
        if items.len() < min {
            errors.add(ValidationError::new(
                ctx.loc(),
                format!("List should have at least {} items, not {}", min, items.len()),
                ErrorType::TooShort,
            ));
        }
    }
    if let Some(max) = constraints.max_items {
        if items.len() > max {
            errors.add(ValidationError::new(
                ctx.loc(),
                format!("List should have at most {} items, not {}", max, items.len()),
                ErrorType::TooLong,
            ));
        }
    }
    if constraints.unique_items {
        let mut seen = HashSet::new();
        for (i, item) in items.iter().enumerate() {
            if !seen.insert(item.to_string()) {
                errors.add(ValidationError::new(
                    ctx.loc(),
                    format!("List contains duplicate value at index {}", i),
                    ErrorType::ValueError,
                ));
            }
        }
    }

    for (i, item) in items.iter().enumerate() {
        ctx.push(i);
        validate_value(item, item_type, ctx, errors);
        ctx.pop();
    }
}

fn validate_tuple(
    value: &Value,
    item_types: &[TypeDescriptor],
    ctx: &mut ValidationContext,
    errors: &mut ValidationErrors,
) {
    let Value::List(items) = value else {
        errors.add(ValidationError::new(
            ctx.loc(),
            "Input should be a valid tuple",
            ErrorType::TupleType,
        ));
        return;
    };

    if items.len() != item_types.len() {
        let error_type = if items.len() < item_types.len() {
            ErrorType::TooShort
        } else {
            ErrorType::TooLong
        };
        errors.add(ValidationError::new(
            ctx.loc(),
            format!("Tuple should have exactly {} items, not {}", item_types.len(), items.len()),
            error_type,
        ));
        return;
    }

    for (i, (item, item_type)) in items.iter().zip(item_types).enumerate() {
        ctx.push(i);
        validate_value(item, item_type, ctx, errors);
        ctx.pop();
    }
}

fn validate_object(
    value: &Value,
    fields: &[FieldDescriptor],
    additional: Option<&TypeDescriptor>,
    ctx: &mut ValidationContext,
    errors: &mut ValidationErrors,
) {
    let Value::Object(pairs) = value else {
        errors.add(ValidationError::new(
            ctx.loc(),
            "Input should be a valid dictionary",
            ErrorType::DictType,
        ));
        return;
    };

    for field in fields {
        let key = field.key();
        match value.get(key) {
            Some(field_value) => {
                ctx.push(key);
                validate_value(field_value, &field.type_desc, ctx, errors);
                ctx.pop();
            }
            None if field.required => {
                ctx.push(key);
                errors.add(ValidationError::missing(ctx.loc()));
                ctx.pop();
            }
            None => {}
        }
    }

    if let Some(additional_type) = additional {
        let known: HashSet<&str> = fields.iter().map(FieldDescriptor::key).collect();
        for (key, val) in pairs {
            if !known.contains(key.as_str()) {
                ctx.push(key.as_str());
                validate_value(val, additional_type, ctx, errors);
                ctx.pop();
            }
        }
    }
}

// ============================================================================
// Special Types
// ============================================================================

fn validate_union(
    value: &Value,
    variants: &[TypeDescriptor],
    nullable: bool,
    ctx: &mut ValidationContext,
    errors: &mut ValidationErrors,
) {
    if value.is_null() && nullable {
        return;
    }

    for variant in variants {
        let mut attempt = ValidationErrors::new();
        let mut attempt_ctx = ctx.clone();
        validate_value(value, variant, &mut attempt_ctx, &mut attempt);
        if attempt.is_empty() {
            return;
        }
    }

    let names: Vec<String> = variants.iter().map(ToString::to_string).collect();
    errors.add(ValidationError::new(
        ctx.loc(),
        format!("Input should match one of: {}", names.join(", ")),
        ErrorType::UnionError,
    ));
}

fn validate_literal(
    value: &Value,
    allowed: &[Value],
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    if allowed.contains(value) {
        return;
    }
    let expected: Vec<String> = allowed.iter().map(ToString::to_string).collect();
    let expected = match expected.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => "nothing".to_string(),
    };
    errors.add(ValidationError::new(
        ctx.loc(),
        format!("Input should be {}", expected),
        ErrorType::LiteralError,
    ));
}

fn validate_format(
    value: &Value,
    check: fn(&str) -> bool,
    expected: &str,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    match value {
        Value::String(s) if check(s) => {}
        Value::String(_) => errors.add(ValidationError::new(
            ctx.loc(),
            format!("Input should be {}", expected),
            ErrorType::FormatError,
        )),
        _ => errors.add(ValidationError::new(
            ctx.loc(),
            "Input should be a valid string",
            ErrorType::StringType,
        )),
    }
}
