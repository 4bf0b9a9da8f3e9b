//! Handlers and endpoint definitions
//!
//! A handler is plain user code: sync handlers borrow the request context,
//! async handlers own a clone of it. Both return a [`Reply`] or a
//! [`HandlerError`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use modern_rest_validation::TypeDescriptor;

use crate::context::RequestContext;
use crate::error::HandlerError;
use crate::payload::EndpointPayload;
use crate::response::Reply;

/// Synchronous handler
pub trait SyncHandler: Send + Sync {
    fn call(&self, ctx: &RequestContext) -> Result<Reply, HandlerError>;
}

impl<F> SyncHandler for F
where
    F: Fn(&RequestContext) -> Result<Reply, HandlerError> + Send + Sync,
{
    fn call(&self, ctx: &RequestContext) -> Result<Reply, HandlerError> {
        self(ctx)
    }
}

/// Asynchronous handler
#[async_trait]
pub trait AsyncHandler: Send + Sync {
    async fn call(&self, ctx: RequestContext) -> Result<Reply, HandlerError>;
}

#[async_trait]
impl<F, Fut> AsyncHandler for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, HandlerError>> + Send + 'static,
{
    async fn call(&self, ctx: RequestContext) -> Result<Reply, HandlerError> {
        self(ctx).await
    }
}

#[derive(Clone)]
pub enum Handler {
    Sync(Arc<dyn SyncHandler>),
    Async(Arc<dyn AsyncHandler>),
}

impl Handler {
    pub fn from_sync<F>(handler: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<Reply, HandlerError> + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(handler))
    }

    pub fn from_async<F, Fut>(handler: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, HandlerError>> + Send + 'static,
    {
        Self::Async(Arc::new(handler))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => write!(f, "Handler::Sync"),
            Self::Async(_) => write!(f, "Handler::Async"),
        }
    }
}

/// What a handler declares it returns
#[derive(Debug, Clone, PartialEq)]
pub enum Returns {
    /// Complete `HttpResponse` objects
    Response,
    /// Raw data of the given shape
    Data(TypeDescriptor),
    /// Raw data that is always `null`
    Nothing,
}

/// A handler bound to an HTTP method, with its optional payload
#[derive(Debug, Clone)]
pub struct EndpointDefinition {
    pub name: String,
    pub method: String,
    pub returns: Returns,
    pub handler: Handler,
    pub payload: Option<EndpointPayload>,
}

impl EndpointDefinition {
    pub fn new(method: impl Into<String>, returns: Returns, handler: Handler) -> Self {
        let method = method.into();
        Self {
            name: method.to_lowercase(),
            method,
            returns,
            handler,
            payload: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attaches a `@validate` payload
    pub fn validate(mut self, payload: crate::payload::ValidatePayload) -> Self {
        self.payload = Some(EndpointPayload::Validate(payload));
        self
    }

    /// Attaches a `@modify` payload
    pub fn modify(mut self, payload: crate::payload::ModifyPayload) -> Self {
        self.payload = Some(EndpointPayload::Modify(payload));
        self
    }

    pub fn is_async(&self) -> bool {
        self.handler.is_async()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::JsonSerializer;
    use modern_rest_common::HttpRequest;
    use serde_json::json;
    use std::collections::HashMap;

    fn context() -> RequestContext {
        RequestContext::new(HttpRequest::new("GET", "/"), HashMap::new(), Arc::new(JsonSerializer))
    }

    #[test]
    fn test_sync_closure_handler() {
        let handler = Handler::from_sync(|_ctx| Ok(Reply::json(json!({"ok": true}))));
        assert!(!handler.is_async());
        match handler {
            Handler::Sync(inner) => assert!(inner.call(&context()).is_ok()),
            Handler::Async(_) => panic!("expected sync handler"),
        }
    }

    #[tokio::test]
    async fn test_async_closure_handler() {
        let handler = Handler::from_async(|ctx: RequestContext| async move {
            Ok::<_, HandlerError>(Reply::json(json!({"path": ctx.request().path.clone()})))
        });
        assert!(handler.is_async());
        match handler {
            Handler::Async(inner) => {
                let reply = inner.call(context()).await.unwrap();
                assert_eq!(reply, Reply::json(json!({"path": "/"})));
            }
            Handler::Sync(_) => panic!("expected async handler"),
        }
    }

    #[test]
    fn test_definition_defaults_name_to_method() {
        let definition = EndpointDefinition::new("GET", Returns::Nothing, Handler::from_sync(|_| Ok(Reply::json(json!(null)))));
        assert_eq!(definition.name, "get");
        assert!(definition.payload.is_none());
    }
}
