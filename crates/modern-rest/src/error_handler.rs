//! Error handler chain
//!
//! Failures that are not controlled [`ApiError`](crate::ApiError)s walk the
//! chain endpoint → blueprint → controller → global. Every tier returns
//! `anyhow::Result<HttpResponse>`; `Err` passes the failure to the next tier.
//! The global handler comes from [`Settings`](crate::Settings) and is always
//! sync.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use modern_rest_common::HttpResponse;
use tracing::{error, warn};

use crate::context::RequestContext;
use crate::endpoint::Endpoint;
use crate::error::{EndpointError, RequestSerializationError, ResponseSerializationError};

pub trait SyncErrorHandler: Send + Sync {
    fn handle(
        &self,
        ctx: &RequestContext,
        endpoint: &Endpoint,
        error: &anyhow::Error,
    ) -> anyhow::Result<HttpResponse>;
}

impl<F> SyncErrorHandler for F
where
    F: Fn(&RequestContext, &Endpoint, &anyhow::Error) -> anyhow::Result<HttpResponse> + Send + Sync,
{
    fn handle(
        &self,
        ctx: &RequestContext,
        endpoint: &Endpoint,
        error: &anyhow::Error,
    ) -> anyhow::Result<HttpResponse> {
        self(ctx, endpoint, error)
    }
}

#[async_trait]
pub trait AsyncErrorHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: RequestContext,
        endpoint: Endpoint,
        error: Arc<anyhow::Error>,
    ) -> anyhow::Result<HttpResponse>;
}

#[async_trait]
impl<F, Fut> AsyncErrorHandler for F
where
    F: Fn(RequestContext, Endpoint, Arc<anyhow::Error>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<HttpResponse>> + Send + 'static,
{
    async fn handle(
        &self,
        ctx: RequestContext,
        endpoint: Endpoint,
        error: Arc<anyhow::Error>,
    ) -> anyhow::Result<HttpResponse> {
        self(ctx, endpoint, error).await
    }
}

/// Endpoint, blueprint or controller level error handler
#[derive(Clone)]
pub enum ErrorHandler {
    Sync(Arc<dyn SyncErrorHandler>),
    Async(Arc<dyn AsyncErrorHandler>),
}

impl ErrorHandler {
    pub fn from_sync<F>(handler: F) -> Self
    where
        F: Fn(&RequestContext, &Endpoint, &anyhow::Error) -> anyhow::Result<HttpResponse>
            + Send
            + Sync
            + 'static,
    {
        Self::Sync(Arc::new(handler))
    }

    pub fn from_async<F, Fut>(handler: F) -> Self
    where
        F: Fn(RequestContext, Endpoint, Arc<anyhow::Error>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<HttpResponse>> + Send + 'static,
    {
        Self::Async(Arc::new(handler))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    /// Identity comparison: two handles to the same handler
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Sync(a), Self::Sync(b)) => Arc::ptr_eq(a, b),
            (Self::Async(a), Self::Async(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => write!(f, "ErrorHandler::Sync"),
            Self::Async(_) => write!(f, "ErrorHandler::Async"),
        }
    }
}

/// Last tier of the chain, configured in settings
#[derive(Clone)]
pub struct GlobalErrorHandler(pub Arc<dyn SyncErrorHandler>);

impl GlobalErrorHandler {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&RequestContext, &Endpoint, &anyhow::Error) -> anyhow::Result<HttpResponse>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(handler))
    }
}

impl Default for GlobalErrorHandler {
    fn default() -> Self {
        Self::new(default_error_handler)
    }
}

impl fmt::Debug for GlobalErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobalErrorHandler")
    }
}

/// Turns request and response validation failures into error responses and
/// re-raises everything else.
pub fn default_error_handler(
    ctx: &RequestContext,
    _endpoint: &Endpoint,
    error: &anyhow::Error,
) -> anyhow::Result<HttpResponse> {
    if let Some(request_error) = error.downcast_ref::<RequestSerializationError>() {
        let payload = ctx.serializer().error_payload(&request_error.errors);
        return Ok(ctx.to_error(payload, request_error.status(), no_headers())?);
    }
    if let Some(response_error) = error.downcast_ref::<ResponseSerializationError>() {
        return Ok(ctx.to_error(response_error.payload(), response_error.status, no_headers())?);
    }
    Err(anyhow::anyhow!("{:#}", error))
}

fn no_headers() -> std::iter::Empty<(String, String)> {
    std::iter::empty()
}

/// Runs the chain for a sync endpoint. Async tiers cannot run here and are
/// skipped.
pub(crate) fn handle_sync(
    endpoint: &Endpoint,
    ctx: &RequestContext,
    controller: Option<&ErrorHandler>,
    error: anyhow::Error,
) -> Result<HttpResponse, EndpointError> {
    for (tier, handler) in endpoint.error_tiers(controller) {
        match handler {
            ErrorHandler::Sync(handler) => match handler.handle(ctx, endpoint, &error) {
                Ok(response) => return Ok(response),
                Err(failure) => warn!(
                    endpoint = %endpoint.name(),
                    tier,
                    error = %failure,
                    "Error handler failed, trying the next one"
                ),
            },
            ErrorHandler::Async(_) => warn!(
                endpoint = %endpoint.name(),
                tier,
                "Skipping async error handler for sync endpoint"
            ),
        }
    }
    handle_global(endpoint, ctx, &error)
}

/// Runs the chain for an async endpoint. Sync tiers are called inline.
pub(crate) async fn handle_async(
    endpoint: &Endpoint,
    ctx: &RequestContext,
    controller: Option<&ErrorHandler>,
    error: anyhow::Error,
) -> Result<HttpResponse, EndpointError> {
    let error = Arc::new(error);
    for (tier, handler) in endpoint.error_tiers(controller) {
        let outcome = match handler {
            ErrorHandler::Sync(handler) => handler.handle(ctx, endpoint, &error),
            ErrorHandler::Async(handler) => {
                handler
                    .handle(ctx.clone(), endpoint.clone(), Arc::clone(&error))
                    .await
            }
        };
        match outcome {
            Ok(response) => return Ok(response),
            Err(failure) => warn!(
                endpoint = %endpoint.name(),
                tier,
                error = %failure,
                "Error handler failed, trying the next one"
            ),
        }
    }
    handle_global(endpoint, ctx, &error)
}

fn handle_global(
    endpoint: &Endpoint,
    ctx: &RequestContext,
    error: &anyhow::Error,
) -> Result<HttpResponse, EndpointError> {
    endpoint
        .global_error_handler()
        .0
        .handle(ctx, endpoint, error)
        .map_err(|failure| {
            error!(endpoint = %endpoint.name(), error = %failure, "Unhandled endpoint error");
            EndpointError::Unhandled {
                endpoint: endpoint.name().to_string(),
                error: failure,
            }
        })
}
