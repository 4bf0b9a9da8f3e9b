//! Lax coercion of string inputs
//!
//! Query strings, path parameters, headers and cookies arrive as text. These
//! helpers convert them into typed [`Value`]s guided by a descriptor, leaving
//! anything unconvertible as a string so validation reports it.

use crate::constraints::FieldDescriptor;
use crate::types::{TypeDescriptor, Value};
use crate::validators::validate;

/// Coerces one raw string according to `type_desc`.
///
/// ```
/// use modern_rest_validation::{coerce_str, TypeDescriptor, Value};
///
/// assert_eq!(coerce_str("10", &TypeDescriptor::int()), Value::Int(10));
/// assert_eq!(coerce_str("yes", &TypeDescriptor::Bool), Value::Bool(true));
/// assert_eq!(coerce_str("ten", &TypeDescriptor::int()), Value::from("ten"));
/// ```
pub fn coerce_str(raw: &str, type_desc: &TypeDescriptor) -> Value {
    match type_desc {
        TypeDescriptor::Int64(_) => raw
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or_else(|_| Value::from(raw)),
        TypeDescriptor::Float64(_) => match raw.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Value::Float(f),
            _ => Value::from(raw),
        },
        TypeDescriptor::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "t" | "y" => Value::Bool(true),
            "false" | "0" | "no" | "off" | "f" | "n" => Value::Bool(false),
            _ => Value::from(raw),
        },
        TypeDescriptor::Null if raw.is_empty() || raw == "null" => Value::Null,
        TypeDescriptor::Optional(inner) => coerce_str(raw, inner),
        TypeDescriptor::Union { variants, .. } => variants
            .iter()
            .map(|variant| (coerce_str(raw, variant), variant))
            .find(|(value, variant)| validate(value, variant).is_ok())
            .map(|(value, _)| value)
            .unwrap_or_else(|| Value::from(raw)),
        TypeDescriptor::Literal { values } => values
            .iter()
            .find(|literal| literal_matches(literal, raw))
            .cloned()
            .unwrap_or_else(|| Value::from(raw)),
        TypeDescriptor::List { items, .. } => Value::List(vec![coerce_str(raw, items)]),
        _ => Value::from(raw),
    }
}

fn literal_matches(literal: &Value, raw: &str) -> bool {
    match literal {
        Value::String(s) => s == raw,
        Value::Int(i) => raw.trim().parse::<i64>().is_ok_and(|n| n == *i),
        Value::Bool(b) => raw.eq_ignore_ascii_case(if *b { "true" } else { "false" }),
        Value::Null => raw == "null",
        other => other.to_string() == raw,
    }
}

/// Builds an object from repeated `(key, value)` string pairs.
///
/// Declared fields are looked up by [`FieldDescriptor::key`]; list-typed
/// fields collect every occurrence, others take the last one. Missing fields
/// with a default get it. Undeclared keys are kept only when the descriptor
/// allows additional properties or is not an object at all.
pub fn coerce_pairs(pairs: &[(String, String)], type_desc: &TypeDescriptor, case_insensitive: bool) -> Value {
    let matches_key = |candidate: &str, key: &str| {
        if case_insensitive {
            candidate.eq_ignore_ascii_case(key)
        } else {
            candidate == key
        }
    };

    let (fields, additional, keep_unknown) = match strip_optional(type_desc) {
        TypeDescriptor::Object { fields, additional } => {
            (fields.as_slice(), additional.as_deref(), additional.is_some())
        }
        _ => (&[][..], None, true),
    };

    let mut object: Vec<(String, Value)> = Vec::new();
    for field in fields {
        let raw: Vec<&str> = pairs
            .iter()
            .filter(|(k, _)| matches_key(k, field.key()))
            .map(|(_, v)| v.as_str())
            .collect();
        if let Some(value) = coerce_field(field, &raw) {
            object.push((field.key().to_string(), value));
        }
    }

    if keep_unknown {
        for (key, raw) in pairs {
            if fields.iter().any(|f| matches_key(key, f.key())) {
                continue;
            }
            let value = match additional {
                Some(desc) => coerce_str(raw, desc),
                None => Value::from(raw.as_str()),
            };
            match object.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = value,
                None => object.push((key.clone(), value)),
            }
        }
    }

    Value::Object(object)
}

fn coerce_field(field: &FieldDescriptor, raw: &[&str]) -> Option<Value> {
    if raw.is_empty() {
        return field.default.clone();
    }
    match strip_optional(&field.type_desc) {
        TypeDescriptor::List { items, .. } => {
            Some(Value::List(raw.iter().map(|r| coerce_str(r, items)).collect()))
        }
        desc => raw.last().map(|r| coerce_str(r, desc)),
    }
}

/// Fills absent top-level object fields that declare a default.
pub fn apply_defaults(value: Value, type_desc: &TypeDescriptor) -> Value {
    let Value::Object(mut pairs) = value else {
        return value;
    };
    for field in strip_optional(type_desc).fields() {
        if let Some(default) = &field.default {
            if !pairs.iter().any(|(k, _)| k == field.key()) {
                pairs.push((field.key().to_string(), default.clone()));
            }
        }
    }
    Value::Object(pairs)
}

fn strip_optional(type_desc: &TypeDescriptor) -> &TypeDescriptor {
    match type_desc {
        TypeDescriptor::Optional(inner) => strip_optional(inner),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_union_and_literal() {
        let desc = TypeDescriptor::union(vec![TypeDescriptor::int(), TypeDescriptor::Bool]);
        assert_eq!(coerce_str("3", &desc), Value::Int(3));
        assert_eq!(coerce_str("true", &desc), Value::Bool(true));

        let desc = TypeDescriptor::literal([1i64, 2i64]);
        assert_eq!(coerce_str("2", &desc), Value::Int(2));
        assert_eq!(coerce_str("3", &desc), Value::from("3"));
    }

    #[test]
    fn test_pairs_collects_lists_and_defaults() {
        let desc = TypeDescriptor::object(vec![
            FieldDescriptor::new("tag", TypeDescriptor::list(TypeDescriptor::string())),
            FieldDescriptor::new("limit", TypeDescriptor::int()).default_value(10i64),
            FieldDescriptor::new("page", TypeDescriptor::int()),
        ]);

        let value = coerce_pairs(&pairs(&[("tag", "a"), ("page", "1"), ("tag", "b"), ("page", "2")]), &desc, false);
        assert_eq!(
            value,
            Value::Object(vec![
                ("tag".to_string(), Value::List(vec![Value::from("a"), Value::from("b")])),
                ("limit".to_string(), Value::Int(10)),
                ("page".to_string(), Value::Int(2)),
            ])
        );
    }

    #[test]
    fn test_pairs_case_insensitive_alias() {
        let desc = TypeDescriptor::object(vec![
            FieldDescriptor::new("token", TypeDescriptor::string()).alias("X-API-Token"),
        ]);
        let value = coerce_pairs(&pairs(&[("x-api-token", "secret"), ("accept", "*/*")]), &desc, true);
        assert_eq!(value, Value::Object(vec![("X-API-Token".to_string(), Value::from("secret"))]));
    }

    #[test]
    fn test_apply_defaults() {
        let desc = TypeDescriptor::object(vec![
            FieldDescriptor::new("name", TypeDescriptor::string()),
            FieldDescriptor::new("active", TypeDescriptor::Bool).default_value(true),
        ]);
        let value = apply_defaults(Value::Object(vec![("name".to_string(), Value::from("a"))]), &desc);
        assert_eq!(value.get("active"), Some(&Value::Bool(true)));
    }
}
