//! Endpoint runtime
//!
//! An [`Endpoint`] ties one handler to its metadata and response validator.
//! Every call goes through the same steps:
//!
//! 1. parse the declared request components into a [`RequestContext`]
//! 2. invoke the handler
//! 3. route failures to the error handler chain
//! 4. validate whatever response came out
//!
//! Endpoints hold no per-request state and are shared freely across threads.

use std::collections::HashMap;
use std::sync::Arc;

use modern_rest_common::{HttpRequest, HttpResponse, HttpStatus};
use modern_rest_validation::ValidationErrors;
use tracing::debug;

use crate::context::RequestContext;
use crate::controller::BlueprintConfig;
use crate::error::{
    ApiError, EndpointError, EndpointMetadataError, HandlerError, RequestSerializationError,
    ResponseSerializationError,
};
use crate::error_handler::{self, ErrorHandler, GlobalErrorHandler};
use crate::handler::{AsyncHandler, EndpointDefinition, Handler, SyncHandler};
use crate::response::Reply;
use crate::serializer::Serializer;
use crate::settings::Settings;
use crate::validation::{build_metadata, EndpointMetadata, ResponseValidator};

#[derive(Clone)]
pub struct Endpoint {
    inner: Arc<EndpointInner>,
}

struct EndpointInner {
    name: String,
    metadata: Arc<EndpointMetadata>,
    validator: ResponseValidator,
    serializer: Arc<dyn Serializer>,
    handler: Handler,
    blueprint_error_handler: Option<ErrorHandler>,
    global_error_handler: GlobalErrorHandler,
}

/// Result of running the handler, before validation
enum Outcome {
    Reply(Reply),
    Failed(anyhow::Error),
}

impl Endpoint {
    /// Builds the endpoint's metadata and wraps its handler.
    pub fn new(
        definition: EndpointDefinition,
        blueprint: &BlueprintConfig,
        settings: &Settings,
    ) -> Result<Self, EndpointMetadataError> {
        let metadata = Arc::new(build_metadata(&definition, blueprint, settings)?);
        let serializer = Arc::clone(&blueprint.serializer);
        debug!(
            endpoint = %definition.name,
            serializer = serializer.name(),
            is_async = definition.is_async(),
            "Created endpoint"
        );

        Ok(Self {
            inner: Arc::new(EndpointInner {
                name: definition.name,
                validator: ResponseValidator::new(Arc::clone(&metadata), Arc::clone(&serializer)),
                metadata,
                serializer,
                handler: definition.handler,
                blueprint_error_handler: blueprint.error_handler.clone(),
                global_error_handler: settings.global_error_handler.clone(),
            }),
        })
    }

    /// Endpoint outside of any blueprint
    pub fn standalone(
        definition: EndpointDefinition,
        settings: &Settings,
    ) -> Result<Self, EndpointMetadataError> {
        Self::new(definition, &BlueprintConfig::default(), settings)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn metadata(&self) -> &EndpointMetadata {
        &self.inner.metadata
    }

    pub fn is_async(&self) -> bool {
        self.inner.handler.is_async()
    }

    pub fn serializer(&self) -> &dyn Serializer {
        self.inner.serializer.as_ref()
    }

    pub fn validator(&self) -> &ResponseValidator {
        &self.inner.validator
    }

    pub(crate) fn global_error_handler(&self) -> &GlobalErrorHandler {
        &self.inner.global_error_handler
    }

    /// Error handlers tried before the global one, in order
    pub(crate) fn error_tiers<'a>(
        &'a self,
        controller: Option<&'a ErrorHandler>,
    ) -> Vec<(&'static str, &'a ErrorHandler)> {
        [
            ("endpoint", self.inner.metadata.error_handler.as_ref()),
            ("blueprint", self.inner.blueprint_error_handler.as_ref()),
            ("controller", controller),
        ]
        .into_iter()
        .filter_map(|(tier, handler)| handler.map(|handler| (tier, handler)))
        .collect()
    }

    /// Serves a request with a sync handler
    pub fn call(&self, request: HttpRequest) -> Result<HttpResponse, EndpointError> {
        self.handle(request, None)
    }

    /// Serves a request with either kind of handler
    pub async fn call_async(&self, request: HttpRequest) -> Result<HttpResponse, EndpointError> {
        self.handle_async(request, None).await
    }

    /// Sync call with a controller level error handler in the chain
    pub fn handle(
        &self,
        request: HttpRequest,
        controller: Option<&ErrorHandler>,
    ) -> Result<HttpResponse, EndpointError> {
        let Handler::Sync(handler) = &self.inner.handler else {
            return Err(EndpointError::AsyncEndpoint(self.inner.name.clone()));
        };

        let (ctx, parsed) = self.bind(request);
        let outcome = match parsed {
            Err(error) => Outcome::Failed(anyhow::Error::new(error)),
            Ok(()) => self.outcome(&ctx, handler.call(&ctx)),
        };

        match outcome {
            Outcome::Reply(reply) => Ok(self.finish(&ctx, reply)),
            Outcome::Failed(error) => {
                let response = error_handler::handle_sync(self, &ctx, controller, error)?;
                Ok(self.finish(&ctx, Reply::Response(response)))
            }
        }
    }

    /// Async call with a controller level error handler in the chain
    pub async fn handle_async(
        &self,
        request: HttpRequest,
        controller: Option<&ErrorHandler>,
    ) -> Result<HttpResponse, EndpointError> {
        let (ctx, parsed) = self.bind(request);
        let outcome = match parsed {
            Err(error) => Outcome::Failed(anyhow::Error::new(error)),
            Ok(()) => {
                let result = match &self.inner.handler {
                    Handler::Sync(handler) => handler.call(&ctx),
                    Handler::Async(handler) => handler.call(ctx.clone()).await,
                };
                self.outcome(&ctx, result)
            }
        };

        match outcome {
            Outcome::Reply(reply) => Ok(self.finish(&ctx, reply)),
            Outcome::Failed(error) => {
                let response = error_handler::handle_async(self, &ctx, controller, error).await?;
                Ok(self.finish(&ctx, Reply::Response(response)))
            }
        }
    }

    /// Parses every declared component; all failures are collected.
    fn bind(&self, request: HttpRequest) -> (RequestContext, Result<(), RequestSerializationError>) {
        let mut parsed = HashMap::new();
        let mut errors = ValidationErrors::new();
        for component in &self.inner.metadata.component_parsers {
            match component.provide_context_data(self.serializer(), &request) {
                Ok(value) => {
                    parsed.insert(component.context_name(), value);
                }
                Err(error) => errors.merge(error.errors),
            }
        }

        let ctx = RequestContext::new(request, parsed, Arc::clone(&self.inner.serializer));
        let result = errors.into_result().map_err(RequestSerializationError::new);
        (ctx, result)
    }

    fn outcome(&self, ctx: &RequestContext, result: Result<Reply, HandlerError>) -> Outcome {
        match result {
            Ok(reply) => Outcome::Reply(reply),
            Err(HandlerError::Api(api)) => Outcome::Reply(self.api_error_reply(ctx, api)),
            Err(HandlerError::Unexpected(error)) => Outcome::Failed(error),
        }
    }

    fn api_error_reply(&self, ctx: &RequestContext, api: ApiError) -> Reply {
        match ctx.to_error(api.payload, api.status, api.headers) {
            Ok(response) => Reply::Response(response),
            Err(error) => Reply::Response(self.detail_response(
                ResponseSerializationError::message(error.to_string())
                    .with_status(HttpStatus::INTERNAL_SERVER_ERROR),
            )),
        }
    }

    /// Runs the response validator; validation failures become responses.
    fn finish(&self, ctx: &RequestContext, reply: Reply) -> HttpResponse {
        match self.inner.validator.validate(reply) {
            Ok(response) => response,
            Err(error) => {
                debug!(
                    endpoint = %self.inner.name,
                    method = %ctx.request().method,
                    status = %error.status,
                    "Response failed validation"
                );
                self.detail_response(error)
            }
        }
    }

    fn detail_response(&self, error: ResponseSerializationError) -> HttpResponse {
        let serializer = self.serializer();
        let body = serializer.serialize(&error.payload()).unwrap_or_default();
        HttpResponse::new(body, error.status, [("content-type", serializer.content_type())])
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.inner.name)
            .field("method", &self.inner.metadata.method)
            .field("is_async", &self.is_async())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Returns;
    use crate::payload::ModifyPayload;
    use modern_rest_validation::TypeDescriptor;
    use serde_json::json;

    fn endpoint(definition: EndpointDefinition) -> Endpoint {
        Endpoint::standalone(definition, &Settings::default()).unwrap()
    }

    #[test]
    fn test_error_tiers_order() {
        let handler = ErrorHandler::from_sync(|_, _, _| anyhow::bail!("no"));
        let definition = EndpointDefinition::new(
            "GET",
            Returns::Nothing,
            Handler::from_sync(|_| Ok(Reply::json(json!(null)))),
        )
        .modify(ModifyPayload::new().error_handler(handler.clone()));
        let endpoint = endpoint(definition);

        let tiers: Vec<&str> = endpoint
            .error_tiers(Some(&handler))
            .into_iter()
            .map(|(tier, _)| tier)
            .collect();
        assert_eq!(tiers, vec!["endpoint", "controller"]);
    }

    #[test]
    fn test_sync_call_rejects_async_handler() {
        let definition = EndpointDefinition::new(
            "GET",
            Returns::Nothing,
            Handler::from_async(|_ctx| async { Ok::<_, HandlerError>(Reply::json(json!(null))) }),
        );
        let error = endpoint(definition).call(HttpRequest::new("GET", "/")).unwrap_err();
        assert!(matches!(error, EndpointError::AsyncEndpoint(_)));
    }

    #[test]
    fn test_api_error_must_be_declared() {
        let definition = EndpointDefinition::new(
            "GET",
            Returns::Data(TypeDescriptor::string()),
            Handler::from_sync(|_| Err(ApiError::new(json!({"detail": "nope"}), HttpStatus::FORBIDDEN).into())),
        );
        let response = endpoint(definition).call(HttpRequest::new("GET", "/")).unwrap();
        assert_eq!(response.status, HttpStatus::UNPROCESSABLE_ENTITY);
    }
}
