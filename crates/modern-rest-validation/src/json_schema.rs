//! JSON Schema export
//!
//! Converts a [`TypeDescriptor`] into a JSON Schema (draft 2020-12, as used by
//! OpenAPI 3.1) document.

use serde_json::{json, Map, Value as Json};

use crate::types::TypeDescriptor;

/// Convert a TypeDescriptor to JSON Schema
pub fn to_json_schema(desc: &TypeDescriptor) -> Json {
    match desc {
        TypeDescriptor::String(constraints) => {
            let mut schema = typed("string");
            insert_opt(&mut schema, "minLength", constraints.min_length);
            insert_opt(&mut schema, "maxLength", constraints.max_length);
            insert_opt(&mut schema, "pattern", constraints.pattern.clone());
            Json::Object(schema)
        }

        TypeDescriptor::Int64(constraints) => {
            let mut schema = typed("integer");
            insert_opt(&mut schema, "minimum", constraints.minimum);
            insert_opt(&mut schema, "maximum", constraints.maximum);
            insert_opt(&mut schema, "exclusiveMinimum", constraints.exclusive_minimum);
            insert_opt(&mut schema, "exclusiveMaximum", constraints.exclusive_maximum);
            insert_opt(&mut schema, "multipleOf", constraints.multiple_of);
            Json::Object(schema)
        }

        TypeDescriptor::Float64(constraints) => {
            let mut schema = typed("number");
            insert_opt(&mut schema, "minimum", constraints.minimum);
            insert_opt(&mut schema, "maximum", constraints.maximum);
            insert_opt(&mut schema, "exclusiveMinimum", constraints.exclusive_minimum);
            insert_opt(&mut schema, "exclusiveMaximum", constraints.exclusive_maximum);
            insert_opt(&mut schema, "multipleOf", constraints.multiple_of);
            Json::Object(schema)
        }

        TypeDescriptor::Bool => json!({"type": "boolean"}),
        TypeDescriptor::Null => json!({"type": "null"}),

        TypeDescriptor::List { items, constraints } => {
            let mut schema = typed("array");
            schema.insert("items".to_string(), to_json_schema(items));
            insert_opt(&mut schema, "minItems", constraints.min_items);
            insert_opt(&mut schema, "maxItems", constraints.max_items);
            if constraints.unique_items {
                schema.insert("uniqueItems".to_string(), Json::Bool(true));
            }
            Json::Object(schema)
        }

        TypeDescriptor::Tuple { items } => json!({
            "type": "array",
            "prefixItems": items.iter().map(to_json_schema).collect::<Vec<_>>(),
            "minItems": items.len(),
            "maxItems": items.len(),
        }),

        TypeDescriptor::Object { fields, additional } => {
            let mut schema = typed("object");
            let mut properties = Map::new();
            let mut required = Vec::new();

            for field in fields {
                let mut property = to_json_schema(&field.type_desc);
                if let Json::Object(map) = &mut property {
                    if let Some(description) = &field.description {
                        map.insert("description".to_string(), json!(description));
                    }
                    if let Some(default) = &field.default {
                        map.insert("default".to_string(), Json::from(default.clone()));
                    }
                }
                properties.insert(field.key().to_string(), property);
                if field.required {
                    required.push(Json::String(field.key().to_string()));
                }
            }

            if !properties.is_empty() {
                schema.insert("properties".to_string(), Json::Object(properties));
            }
            if !required.is_empty() {
                schema.insert("required".to_string(), Json::Array(required));
            }
            if let Some(additional) = additional {
                schema.insert("additionalProperties".to_string(), to_json_schema(additional));
            }
            Json::Object(schema)
        }

        TypeDescriptor::Optional(inner) => json!({
            "anyOf": [to_json_schema(inner), {"type": "null"}],
        }),

        TypeDescriptor::Union { variants, nullable } => {
            let mut any_of: Vec<Json> = variants.iter().map(to_json_schema).collect();
            if *nullable {
                any_of.push(json!({"type": "null"}));
            }
            json!({"anyOf": any_of})
        }

        TypeDescriptor::Literal { values } => {
            let values: Vec<Json> = values.iter().cloned().map(Json::from).collect();
            match values.as_slice() {
                [single] => json!({"const": single}),
                _ => json!({"enum": values}),
            }
        }

        TypeDescriptor::Email => json!({"type": "string", "format": "email"}),
        TypeDescriptor::Url => json!({"type": "string", "format": "uri"}),
        TypeDescriptor::Uuid => json!({"type": "string", "format": "uuid"}),
        TypeDescriptor::DateTime => json!({"type": "string", "format": "date-time"}),
        TypeDescriptor::Date => json!({"type": "string", "format": "date"}),
        TypeDescriptor::Time => json!({"type": "string", "format": "time"}),
        TypeDescriptor::Any => json!({}),
    }
}

fn typed(schema_type: &str) -> Map<String, Json> {
    let mut schema = Map::new();
    schema.insert("type".to_string(), Json::String(schema_type.to_string()));
    schema
}

fn insert_opt<T: Into<Json>>(schema: &mut Map<String, Json>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        schema.insert(key.to_string(), value.into());
    }
}
