//! Blueprints and controllers
//!
//! A [`Blueprint`] is a reusable bundle of endpoints sharing components,
//! responses, a serializer and an error handler. A [`Controller`] composes
//! blueprints for one route and dispatches requests by HTTP method.
//!
//! # Example
//! ```rust
//! use modern_rest::{
//!     Blueprint, Component, Controller, EndpointDefinition, Handler, HttpRequest, Reply,
//!     Returns, Settings, TypeDescriptor,
//! };
//! use modern_rest_validation::FieldDescriptor;
//!
//! let settings = Settings::default();
//! let users = Blueprint::builder("users")
//!     .component(Component::query(TypeDescriptor::object(vec![
//!         FieldDescriptor::new("limit", TypeDescriptor::int()),
//!     ])))
//!     .endpoint(EndpointDefinition::new(
//!         "GET",
//!         Returns::Data(TypeDescriptor::list(TypeDescriptor::string())),
//!         Handler::from_sync(|_ctx| Ok(Reply::json(serde_json::json!(["ada"])))),
//!     ))
//!     .build(&settings)
//!     .unwrap();
//!
//! let controller = Controller::builder("users").blueprint(users).build().unwrap();
//! let response = controller.dispatch(HttpRequest::new("GET", "/users?limit=1")).unwrap();
//! assert_eq!(response.status.code(), 200);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use modern_rest_common::{HttpRequest, HttpRequestLike, HttpResponse, HttpStatus};
use modern_rest_validation::Value;
use tracing::debug;

use crate::components::ComponentParser;
use crate::endpoint::Endpoint;
use crate::error::{EndpointError, EndpointMetadataError};
use crate::error_handler::ErrorHandler;
use crate::handler::EndpointDefinition;
use crate::response::ResponseSpec;
use crate::serializer::{JsonSerializer, Serializer};
use crate::settings::Settings;
use crate::validation::merge_response;

/// Configuration a blueprint passes down to its endpoints
#[derive(Clone)]
pub struct BlueprintConfig {
    pub name: String,
    pub responses: Vec<ResponseSpec>,
    pub validate_responses: Option<bool>,
    /// Add responses declared by components, such as `400` for parse errors
    pub responses_from_components: bool,
    pub error_handler: Option<ErrorHandler>,
    pub components: Vec<Arc<dyn ComponentParser>>,
    pub serializer: Arc<dyn Serializer>,
}

impl Default for BlueprintConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            responses: Vec::new(),
            validate_responses: None,
            responses_from_components: true,
            error_handler: None,
            components: Vec::new(),
            serializer: Arc::new(JsonSerializer),
        }
    }
}

/// Endpoints sharing one configuration, keyed by HTTP method
#[derive(Clone)]
pub struct Blueprint {
    config: BlueprintConfig,
    endpoints: BTreeMap<String, Endpoint>,
}

impl Blueprint {
    pub fn builder(name: impl Into<String>) -> BlueprintBuilder {
        BlueprintBuilder {
            config: BlueprintConfig {
                name: name.into(),
                ..BlueprintConfig::default()
            },
            definitions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &BlueprintConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &BTreeMap<String, Endpoint> {
        &self.endpoints
    }

    pub fn endpoint(&self, method: &str) -> Option<&Endpoint> {
        self.endpoints.get(&method.to_uppercase())
    }
}

pub struct BlueprintBuilder {
    config: BlueprintConfig,
    definitions: Vec<EndpointDefinition>,
}

impl BlueprintBuilder {
    pub fn endpoint(mut self, definition: EndpointDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn component(mut self, component: impl ComponentParser + 'static) -> Self {
        self.config.components.push(Arc::new(component));
        self
    }

    pub fn response(mut self, spec: ResponseSpec) -> Self {
        self.config.responses.push(spec);
        self
    }

    pub fn validate_responses(mut self, enabled: bool) -> Self {
        self.config.validate_responses = Some(enabled);
        self
    }

    pub fn responses_from_components(mut self, enabled: bool) -> Self {
        self.config.responses_from_components = enabled;
        self
    }

    pub fn error_handler(mut self, handler: ErrorHandler) -> Self {
        self.config.error_handler = Some(handler);
        self
    }

    pub fn serializer(mut self, serializer: impl Serializer + 'static) -> Self {
        self.config.serializer = Arc::new(serializer);
        self
    }

    /// Validates the configuration and builds every endpoint
    pub fn build(self, settings: &Settings) -> Result<Blueprint, EndpointMetadataError> {
        let mut declared = BTreeMap::new();
        for spec in &self.config.responses {
            merge_response(&mut declared, spec.clone()).map_err(|e| {
                EndpointMetadataError::new(format!(
                    "Blueprint {} declares status_code={} twice: {}",
                    self.config.name, spec.status_code, e
                ))
            })?;
        }

        let mut endpoints = BTreeMap::new();
        for definition in self.definitions {
            let method = definition.method.to_uppercase();
            if endpoints.contains_key(&method) {
                return Err(EndpointMetadataError::new(format!(
                    "Blueprint {} defines {} more than once",
                    self.config.name, method
                )));
            }
            let endpoint = Endpoint::new(definition, &self.config, settings)?;
            endpoints.insert(method, endpoint);
        }

        if let Some(handler) = &self.config.error_handler {
            let owner = format!("Blueprint {}", self.config.name);
            for endpoint in endpoints.values() {
                check_handler_kind(&owner, endpoint.is_async(), handler)?;
            }
        }

        debug!(
            blueprint = %self.config.name,
            endpoints = endpoints.len(),
            "Built blueprint"
        );
        Ok(Blueprint {
            config: self.config,
            endpoints,
        })
    }
}

/// Dispatches requests for one route to the endpoint serving the method
#[derive(Clone)]
pub struct Controller {
    name: String,
    endpoints: BTreeMap<String, Endpoint>,
    error_handler: Option<ErrorHandler>,
    serializer: Arc<dyn Serializer>,
    is_async: bool,
}

impl Controller {
    pub fn builder(name: impl Into<String>) -> ControllerBuilder {
        ControllerBuilder {
            name: name.into(),
            blueprints: Vec::new(),
            error_handler: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoints(&self) -> &BTreeMap<String, Endpoint> {
        &self.endpoints
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Methods with an endpoint, in `Allow` header order
    pub fn allowed_methods(&self) -> Vec<&str> {
        self.endpoints.keys().map(String::as_str).collect()
    }

    pub fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, EndpointError> {
        match self.endpoints.get(request.method_name()) {
            Some(endpoint) => endpoint.handle(request, self.error_handler.as_ref()),
            None => Ok(self.method_not_allowed(&request)),
        }
    }

    pub async fn dispatch_async(&self, request: HttpRequest) -> Result<HttpResponse, EndpointError> {
        match self.endpoints.get(request.method_name()) {
            Some(endpoint) => endpoint.handle_async(request, self.error_handler.as_ref()).await,
            None => Ok(self.method_not_allowed(&request)),
        }
    }

    fn method_not_allowed(&self, request: &HttpRequest) -> HttpResponse {
        debug!(controller = %self.name, method = %request.method, "Method not allowed");
        let allowed = self.allowed_methods();
        let listed: Vec<String> = allowed.iter().map(|method| format!("'{}'", method)).collect();
        let payload = Value::Object(vec![(
            "detail".to_string(),
            Value::String(format!(
                "Method '{}' is not allowed, allowed: [{}]",
                request.method,
                listed.join(", ")
            )),
        )]);
        let body = self.serializer.serialize(&payload).unwrap_or_default();
        HttpResponse::new(
            body,
            HttpStatus::METHOD_NOT_ALLOWED,
            [
                ("content-type", self.serializer.content_type().to_string()),
                ("allow", allowed.join(", ")),
            ],
        )
    }
}

pub struct ControllerBuilder {
    name: String,
    blueprints: Vec<Blueprint>,
    error_handler: Option<ErrorHandler>,
}

impl ControllerBuilder {
    pub fn blueprint(mut self, blueprint: Blueprint) -> Self {
        self.blueprints.push(blueprint);
        self
    }

    pub fn error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    pub fn build(self) -> Result<Controller, EndpointMetadataError> {
        let mut endpoints: BTreeMap<String, Endpoint> = BTreeMap::new();
        let mut owners: BTreeMap<String, &str> = BTreeMap::new();
        for blueprint in &self.blueprints {
            for (method, endpoint) in &blueprint.endpoints {
                if let Some(owner) = owners.get(method) {
                    return Err(EndpointMetadataError::new(format!(
                        "Blueprints {} and {} both define {} in controller {}",
                        owner,
                        blueprint.name(),
                        method,
                        self.name
                    )));
                }
                owners.insert(method.clone(), blueprint.name());
                endpoints.insert(method.clone(), endpoint.clone());
            }
        }

        let is_async = self.check_endpoint_kinds(&endpoints)?;
        let serializer: Arc<dyn Serializer> = match self.blueprints.first() {
            Some(blueprint) => Arc::clone(&blueprint.config.serializer),
            None => Arc::new(JsonSerializer),
        };

        debug!(
            controller = %self.name,
            methods = ?endpoints.keys().collect::<Vec<_>>(),
            is_async,
            "Built controller"
        );
        Ok(Controller {
            name: self.name,
            endpoints,
            error_handler: self.error_handler,
            serializer,
            is_async,
        })
    }

    /// Endpoints must share one kind and error handlers must match it.
    /// Controllers without endpoints are not checked.
    fn check_endpoint_kinds(
        &self,
        endpoints: &BTreeMap<String, Endpoint>,
    ) -> Result<bool, EndpointMetadataError> {
        let Some(first) = endpoints.values().next() else {
            return Ok(false);
        };
        let is_async = first.is_async();
        if endpoints.values().any(|endpoint| endpoint.is_async() != is_async) {
            return Err(EndpointMetadataError::new(format!(
                "All endpoints in controller {} must either be all sync or all async",
                self.name
            )));
        }

        let handlers = self
            .blueprints
            .iter()
            .filter_map(|bp| {
                bp.config
                    .error_handler
                    .as_ref()
                    .map(|handler| (format!("Blueprint {}", bp.name()), handler))
            })
            .chain(
                self.error_handler
                    .as_ref()
                    .map(|handler| (format!("Controller {}", self.name), handler)),
            );
        for (owner, handler) in handlers {
            check_handler_kind(&owner, is_async, handler)?;
        }
        Ok(is_async)
    }
}

/// Blueprint and controller error handlers must share their endpoints' kind
fn check_handler_kind(
    owner: &str,
    is_async: bool,
    handler: &ErrorHandler,
) -> Result<(), EndpointMetadataError> {
    match (is_async, handler.is_async()) {
        (false, true) => Err(EndpointMetadataError::new(format!(
            "{} has an async error handler for sync endpoints. Use `handle_error` instead for sync endpoints.",
            owner
        ))),
        (true, false) => Err(EndpointMetadataError::new(format!(
            "{} has a sync error handler for async endpoints. Use `handle_async_error` instead for async endpoints.",
            owner
        ))),
        _ => Ok(()),
    }
}

/// Composes already built blueprints into one controller
pub fn compose_blueprints(
    name: impl Into<String>,
    blueprints: impl IntoIterator<Item = Blueprint>,
) -> Result<Controller, EndpointMetadataError> {
    blueprints
        .into_iter()
        .fold(Controller::builder(name), ControllerBuilder::blueprint)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Handler, Returns};
    use crate::response::Reply;
    use modern_rest_common::HttpResponseLike;
    use modern_rest_validation::TypeDescriptor;
    use serde_json::json;

    fn blueprint(name: &str, method: &str) -> Blueprint {
        Blueprint::builder(name)
            .endpoint(EndpointDefinition::new(
                method,
                Returns::Data(TypeDescriptor::string()),
                Handler::from_sync(|_| Ok(Reply::json(json!("ok")))),
            ))
            .build(&Settings::default())
            .unwrap()
    }

    #[test]
    fn test_duplicate_method_in_blueprint() {
        let error = Blueprint::builder("users")
            .endpoint(EndpointDefinition::new("GET", Returns::Nothing, Handler::from_sync(|_| Ok(Reply::json(json!(null))))))
            .endpoint(EndpointDefinition::new("get", Returns::Nothing, Handler::from_sync(|_| Ok(Reply::json(json!(null))))))
            .build(&Settings::default())
            .err()
            .unwrap();
        assert!(error.message().contains("defines GET more than once"));
    }

    #[test]
    fn test_method_overlap_between_blueprints() {
        let error = compose_blueprints("users", [blueprint("read", "GET"), blueprint("other", "GET")])
            .err()
            .unwrap();
        assert_eq!(
            error.message(),
            "Blueprints read and other both define GET in controller users"
        );
    }

    #[test]
    fn test_method_not_allowed() {
        let controller = compose_blueprints("users", [blueprint("read", "GET"), blueprint("write", "POST")]).unwrap();
        let response = controller.dispatch(HttpRequest::new("DELETE", "/users")).unwrap();

        assert_eq!(response.status, HttpStatus::METHOD_NOT_ALLOWED);
        assert_eq!(response.header("allow"), Some("GET, POST"));
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&response.body).unwrap(),
            json!({"detail": "Method 'DELETE' is not allowed, allowed: ['GET', 'POST']"})
        );
    }

    /// JSON with a vendor content type
    struct VendorJson;

    impl Serializer for VendorJson {
        fn name(&self) -> &str {
            "vendor-json"
        }

        fn content_type(&self) -> &str {
            "application/vnd.users+json"
        }

        fn serialize(&self, value: &Value) -> Result<bytes::Bytes, crate::error::SerializationError> {
            JsonSerializer.serialize(value)
        }

        fn deserialize(&self, bytes: &[u8]) -> Result<Value, crate::error::DataParsingError> {
            JsonSerializer.deserialize(bytes)
        }
    }

    #[test]
    fn test_method_not_allowed_uses_blueprint_serializer() {
        let users = Blueprint::builder("users")
            .serializer(VendorJson)
            .endpoint(EndpointDefinition::new(
                "GET",
                Returns::Data(TypeDescriptor::string()),
                Handler::from_sync(|_| Ok(Reply::json(json!("ok")))),
            ))
            .build(&Settings::default())
            .unwrap();
        let controller = compose_blueprints("users", [users]).unwrap();

        let response = controller.dispatch(HttpRequest::new("HEAD", "/users")).unwrap();
        assert_eq!(response.status, HttpStatus::METHOD_NOT_ALLOWED);
        assert_eq!(response.content_type(), Some("application/vnd.users+json"));
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&response.body).unwrap(),
            json!({"detail": "Method 'HEAD' is not allowed, allowed: ['GET']"})
        );
    }

    #[test]
    fn test_empty_controller_skips_checks() {
        let controller = Controller::builder("empty")
            .error_handler(ErrorHandler::from_async(|_, _, _| async { Err::<HttpResponse, _>(anyhow::anyhow!("unused")) }))
            .build()
            .unwrap();
        assert!(controller.endpoints().is_empty());
    }
}
