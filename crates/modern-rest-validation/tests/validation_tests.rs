//! Validation tests over realistic request and response shapes

use modern_rest_validation::constraints::*;
use modern_rest_validation::types::*;
use modern_rest_validation::{
    coerce_pairs, to_json_schema, validate, validate_with_context, ErrorType, ValidationContext,
};
use serde_json::json;

fn user_model() -> TypeDescriptor {
    TypeDescriptor::object(vec![
        FieldDescriptor::new(
            "email",
            TypeDescriptor::Email,
        ),
        FieldDescriptor::new(
            "age",
            TypeDescriptor::Int64(NumericConstraints::default().minimum(0).maximum(150)),
        ),
        FieldDescriptor::new(
            "nickname",
            TypeDescriptor::String(StringConstraints::default().min_length(2).max_length(16)),
        )
        .optional(),
    ])
}

// ============================================================================
// String Validation Tests
// ============================================================================

#[test]
fn test_string_pattern() {
    let type_desc = TypeDescriptor::String(StringConstraints::default().pattern(r"^\d{3}-\d{4}$"));

    assert!(validate(&Value::from("123-4567"), &type_desc).is_ok());

    let errors = validate(&Value::from("abc-defg"), &type_desc).unwrap_err();
    assert_eq!(errors.as_slice()[0].error_type, ErrorType::StringPatternMismatch);
}

#[test]
fn test_string_length_counts_chars() {
    let type_desc = TypeDescriptor::String(StringConstraints::default().max_length(3));
    assert!(validate(&Value::from("äöü"), &type_desc).is_ok());
    assert!(validate(&Value::from("äöüß"), &type_desc).is_err());
}

// ============================================================================
// Object Validation Tests
// ============================================================================

#[test]
fn test_object_collects_every_error() {
    let value: Value = json!({"email": "nope", "age": 200, "nickname": "x"}).into();

    let errors = validate(&value, &user_model()).unwrap_err();
    let kinds: Vec<(String, ErrorType)> = errors
        .as_slice()
        .iter()
        .map(|e| (e.loc_string(), e.error_type))
        .collect();

    assert_eq!(
        kinds,
        vec![
            ("email".to_string(), ErrorType::FormatError),
            ("age".to_string(), ErrorType::LessThanEqual),
            ("nickname".to_string(), ErrorType::StringTooShort),
        ]
    );
}

#[test]
fn test_object_optional_field_may_be_absent() {
    let value: Value = json!({"email": "ada@example.com", "age": 36}).into();
    assert!(validate(&value, &user_model()).is_ok());
}

#[test]
fn test_object_wrong_type() {
    let errors = validate(&Value::List(vec![]), &user_model()).unwrap_err();
    assert_eq!(errors.as_slice()[0].error_type, ErrorType::DictType);
    assert!(errors.as_slice()[0].loc.is_empty());
}

#[test]
fn test_dict_additional_properties() {
    let type_desc = TypeDescriptor::dict(TypeDescriptor::int());
    assert!(validate(&json!({"a": 1, "b": 2}).into(), &type_desc).is_ok());

    let errors = validate(&json!({"a": 1, "b": "two"}).into(), &type_desc).unwrap_err();
    assert_eq!(errors.as_slice()[0].loc_string(), "b");
}

#[test]
fn test_context_location_prefix() {
    let mut ctx = ValidationContext::with_location("body");
    let value: Value = json!({"email": "ada@example.com"}).into();

    let errors = validate_with_context(&value, &user_model(), &mut ctx).unwrap_err();
    assert_eq!(
        errors.to_json(),
        json!([{"type": "missing", "loc": ["body", "age"], "msg": "Field required"}])
    );
}

// ============================================================================
// Collections and Special Types
// ============================================================================

#[test]
fn test_list_constraints() {
    let type_desc = TypeDescriptor::List {
        items: Box::new(TypeDescriptor::int()),
        constraints: ListConstraints {
            min_items: Some(1),
            max_items: Some(3),
            unique_items: true,
        },
    };

    assert!(validate(&json!([1, 2, 3]).into(), &type_desc).is_ok());
    assert!(validate(&json!([]).into(), &type_desc).is_err());
    assert!(validate(&json!([1, 2, 3, 4]).into(), &type_desc).is_err());
    assert!(validate(&json!([1, 1]).into(), &type_desc).is_err());
}

#[test]
fn test_tuple_length() {
    let type_desc = TypeDescriptor::Tuple {
        items: vec![TypeDescriptor::string(), TypeDescriptor::int()],
    };
    assert!(validate(&json!(["a", 1]).into(), &type_desc).is_ok());

    let errors = validate(&json!(["a"]).into(), &type_desc).unwrap_err();
    assert_eq!(errors.as_slice()[0].error_type, ErrorType::TooShort);
}

#[test]
fn test_optional_and_union() {
    let optional = TypeDescriptor::optional(TypeDescriptor::string());
    assert!(validate(&Value::Null, &optional).is_ok());
    assert!(validate(&Value::Int(1), &optional).is_err());

    let union = TypeDescriptor::Union {
        variants: vec![TypeDescriptor::int(), TypeDescriptor::string()],
        nullable: true,
    };
    assert!(validate(&Value::Null, &union).is_ok());
    assert!(validate(&Value::from("x"), &union).is_ok());

    let errors = validate(&Value::Bool(true), &union).unwrap_err();
    assert_eq!(errors.as_slice()[0].msg, "Input should match one of: int, str");
}

#[test]
fn test_null_descriptor() {
    assert!(validate(&Value::Null, &TypeDescriptor::Null).is_ok());
    let errors = validate(&Value::from(""), &TypeDescriptor::Null).unwrap_err();
    assert_eq!(errors.as_slice()[0].error_type, ErrorType::NoneRequired);
}

// ============================================================================
// Coercion feeding validation
// ============================================================================

#[test]
fn test_query_string_coercion_then_validation() {
    let type_desc = TypeDescriptor::object(vec![
        FieldDescriptor::new("limit", TypeDescriptor::Int64(NumericConstraints::default().maximum(100))),
        FieldDescriptor::new("active", TypeDescriptor::Bool).default_value(false),
    ]);

    let ok = coerce_pairs(&[("limit".to_string(), "20".to_string())], &type_desc, false);
    assert!(validate(&ok, &type_desc).is_ok());
    assert_eq!(ok.get("active"), Some(&Value::Bool(false)));

    let bad = coerce_pairs(&[("limit".to_string(), "many".to_string())], &type_desc, false);
    let errors = validate(&bad, &type_desc).unwrap_err();
    assert_eq!(errors.as_slice()[0].error_type, ErrorType::IntType);
}

#[test]
fn test_schema_export_for_model() {
    let schema = to_json_schema(&user_model());
    assert_eq!(schema["properties"]["email"], json!({"type": "string", "format": "email"}));
    assert_eq!(schema["required"], json!(["email", "age"]));
}
