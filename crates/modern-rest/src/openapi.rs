//! OpenAPI 3.1 operations
//!
//! Collects OpenAPI operation objects from endpoint metadata. Building the
//! full document (routing, shared components) is left to the host.

use std::collections::BTreeMap;

use modern_rest_validation::{to_json_schema, TypeDescriptor};
use serde::{Deserialize, Serialize};

use crate::components::ComponentKind;
use crate::controller::Controller;
use crate::endpoint::Endpoint;
use crate::headers::ResponseHeader;
use crate::response::ResponseSpec;

/// OpenAPI 3.1 Specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl OpenApiSpec {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: "3.1.0".to_string(),
            info: Info {
                title: title.into(),
                version: version.into(),
                description: None,
            },
            servers: Vec::new(),
            paths: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.info.description = Some(desc.into());
        self
    }

    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description,
        });
        self
    }

    pub fn tag(mut self, name: impl Into<String>, description: Option<String>) -> Self {
        self.tags.push(Tag {
            name: name.into(),
            description,
        });
        self
    }

    /// Adds every endpoint of `controller` under `path`
    pub fn add_controller(&mut self, path: &str, controller: &Controller) {
        let item = self.paths.entry(path.to_string()).or_default();
        for (method, endpoint) in controller.endpoints() {
            item.set(method, collect_operation(endpoint));
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    /// Stores `operation` under `method`; custom methods have no slot and
    /// are dropped.
    pub fn set(&mut self, method: &str, operation: Operation) {
        let slot = match method.to_uppercase().as_str() {
            "GET" => &mut self.get,
            "POST" => &mut self.post,
            "PUT" => &mut self.put,
            "PATCH" => &mut self.patch,
            "DELETE" => &mut self.delete,
            "HEAD" => &mut self.head,
            "OPTIONS" => &mut self.options,
            "TRACE" => &mut self.trace,
            _ => return,
        };
        *slot = Some(operation);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none", rename = "operationId")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub security: Vec<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "externalDocs")]
    pub external_docs: Option<ExternalDocumentation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalDocumentation {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

impl ParameterLocation {
    fn from_kind(kind: ComponentKind) -> Option<Self> {
        match kind {
            ComponentKind::Query => Some(Self::Query),
            ComponentKind::Headers => Some(Self::Header),
            ComponentKind::Path => Some(Self::Path),
            ComponentKind::Cookies => Some(Self::Cookie),
            ComponentKind::Body => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    pub content: BTreeMap<String, MediaType>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub headers: BTreeMap<String, Header>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

/// Builds the OpenAPI operation describing `endpoint`
pub fn collect_operation(endpoint: &Endpoint) -> Operation {
    let metadata = endpoint.metadata();
    let content_type = endpoint.serializer().content_type();
    let docs = &metadata.docs;

    let mut operation = Operation {
        operation_id: docs.operation_id.clone(),
        summary: docs.summary.clone(),
        description: docs.description.clone(),
        tags: docs.tags.clone(),
        deprecated: docs.deprecated.then_some(true),
        security: docs.security.clone(),
        external_docs: docs.external_docs.as_ref().map(|docs| ExternalDocumentation {
            url: docs.url.clone(),
            description: docs.description.clone(),
        }),
        ..Operation::default()
    };

    for component in &metadata.component_parsers {
        let schema = component.schema();
        match ParameterLocation::from_kind(component.kind()) {
            Some(location) => operation.parameters.extend(collect_parameters(schema, location)),
            None => {
                operation.request_body = Some(RequestBody {
                    content: media(content_type, schema),
                    required: !matches!(schema, TypeDescriptor::Optional(_)),
                });
            }
        }
    }

    for (status, spec) in &metadata.responses {
        operation
            .responses
            .insert(status.to_string(), collect_response(spec, content_type));
    }
    operation
}

fn collect_parameters(schema: &TypeDescriptor, location: ParameterLocation) -> Vec<Parameter> {
    schema
        .fields()
        .iter()
        .map(|field| Parameter {
            name: field.key().to_string(),
            location,
            description: field.description.clone(),
            required: location == ParameterLocation::Path
                || (field.required && field.default.is_none()),
            schema: Some(to_json_schema(&field.type_desc)),
        })
        .collect()
}

fn collect_response(spec: &ResponseSpec, content_type: &str) -> Response {
    let headers = spec
        .headers
        .iter()
        .flatten()
        .filter_map(|(name, header)| match header {
            ResponseHeader::Spec(header) => Some((
                name.clone(),
                Header {
                    description: header.description.clone(),
                    required: header.required,
                    deprecated: header.deprecated.then_some(true),
                    example: header.example.clone(),
                    schema: header.schema.as_ref().map(to_json_schema),
                },
            )),
            ResponseHeader::New(_) => None,
        })
        .collect();

    Response {
        description: spec
            .status_code
            .reason_phrase()
            .unwrap_or("Response")
            .to_string(),
        headers,
        content: spec
            .return_type
            .as_ref()
            .map(|return_type| media(content_type, return_type)),
    }
}

fn media(content_type: &str, schema: &TypeDescriptor) -> BTreeMap<String, MediaType> {
    let mut content = BTreeMap::new();
    content.insert(
        content_type.to_string(),
        MediaType {
            schema: Some(to_json_schema(schema)),
        },
    );
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_creation() {
        let spec = OpenApiSpec::new("Test API", "1.0.0")
            .description("A test API")
            .server("https://api.example.com", Some("Production".to_string()));

        assert_eq!(spec.openapi, "3.1.0");
        assert_eq!(spec.info.title, "Test API");
        assert_eq!(spec.servers.len(), 1);
    }

    #[test]
    fn test_path_item_ignores_custom_methods() {
        let mut item = PathItem::default();
        item.set("get", Operation::default());
        item.set("PURGE", Operation::default());
        assert!(item.get.is_some());

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json.as_object().map(|o| o.len()), Some(1));
    }
}
