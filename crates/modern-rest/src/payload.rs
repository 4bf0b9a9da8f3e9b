//! Endpoint payloads
//!
//! A payload is the declaration attached to one endpoint: which responses it
//! may return, how raw data becomes a response, and its documentation.
//!
//! - [`ValidatePayload`]: the handler builds an `HttpResponse` itself and the
//!   payload lists every allowed [`ResponseSpec`].
//! - [`ModifyPayload`]: the handler returns raw data; the payload tweaks the
//!   status code and headers of the response built from it.

use std::collections::BTreeMap;

use modern_rest_common::HttpStatus;

use crate::error_handler::ErrorHandler;
use crate::headers::ResponseHeader;
use crate::response::ResponseSpec;

/// Link to external documentation of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalDocs {
    pub url: String,
    pub description: Option<String>,
}

/// OpenAPI fields of an endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub operation_id: Option<String>,
    pub deprecated: bool,
    /// Security requirements: scheme name to scopes
    pub security: Vec<BTreeMap<String, Vec<String>>>,
    pub external_docs: Option<ExternalDocs>,
}

/// Payload of an endpoint that returns `HttpResponse` objects
#[derive(Debug, Clone, Default)]
pub struct ValidatePayload {
    pub responses: Vec<ResponseSpec>,
    pub validate_responses: Option<bool>,
    pub error_handler: Option<ErrorHandler>,
    pub allow_custom_http_methods: bool,
    pub docs: Documentation,
}

/// Payload of an endpoint that returns raw data
#[derive(Debug, Clone, Default)]
pub struct ModifyPayload {
    pub status_code: Option<HttpStatus>,
    /// Headers added to every response; only `NewHeader` is accepted
    pub headers: Option<BTreeMap<String, ResponseHeader>>,
    pub extra_responses: Vec<ResponseSpec>,
    pub validate_responses: Option<bool>,
    pub error_handler: Option<ErrorHandler>,
    pub allow_custom_http_methods: bool,
    pub docs: Documentation,
}

/// Builder methods both payload kinds share
macro_rules! common_payload_builders {
    ($payload:ty) => {
        impl $payload {
            pub fn validate_responses(mut self, enabled: bool) -> Self {
                self.validate_responses = Some(enabled);
                self
            }

            pub fn error_handler(mut self, handler: ErrorHandler) -> Self {
                self.error_handler = Some(handler);
                self
            }

            pub fn allow_custom_http_methods(mut self) -> Self {
                self.allow_custom_http_methods = true;
                self
            }

            pub fn summary(mut self, summary: impl Into<String>) -> Self {
                self.docs.summary = Some(summary.into());
                self
            }

            pub fn description(mut self, description: impl Into<String>) -> Self {
                self.docs.description = Some(description.into());
                self
            }

            pub fn tag(mut self, tag: impl Into<String>) -> Self {
                self.docs.tags.push(tag.into());
                self
            }

            pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
                self.docs.operation_id = Some(operation_id.into());
                self
            }

            pub fn deprecated(mut self) -> Self {
                self.docs.deprecated = true;
                self
            }

            pub fn security<I, S>(mut self, scheme: impl Into<String>, scopes: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                let mut requirement = BTreeMap::new();
                requirement.insert(scheme.into(), scopes.into_iter().map(Into::into).collect());
                self.docs.security.push(requirement);
                self
            }

            pub fn external_docs(mut self, url: impl Into<String>, description: Option<String>) -> Self {
                self.docs.external_docs = Some(ExternalDocs {
                    url: url.into(),
                    description,
                });
                self
            }
        }
    };
}

common_payload_builders!(ValidatePayload);
common_payload_builders!(ModifyPayload);

impl ValidatePayload {
    pub fn new(responses: impl IntoIterator<Item = ResponseSpec>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn response(mut self, spec: ResponseSpec) -> Self {
        self.responses.push(spec);
        self
    }
}

impl ModifyPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_code(mut self, status: HttpStatus) -> Self {
        self.status_code = Some(status);
        self
    }

    pub fn header(mut self, name: impl Into<String>, header: impl Into<ResponseHeader>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), header.into());
        self
    }

    pub fn extra_response(mut self, spec: ResponseSpec) -> Self {
        self.extra_responses.push(spec);
        self
    }
}

/// The declaration attached to an endpoint, if any
#[derive(Debug, Clone)]
pub enum EndpointPayload {
    Validate(ValidatePayload),
    Modify(ModifyPayload),
}

impl EndpointPayload {
    pub fn error_handler(&self) -> Option<&ErrorHandler> {
        match self {
            Self::Validate(payload) => payload.error_handler.as_ref(),
            Self::Modify(payload) => payload.error_handler.as_ref(),
        }
    }

    pub fn validate_responses(&self) -> Option<bool> {
        match self {
            Self::Validate(payload) => payload.validate_responses,
            Self::Modify(payload) => payload.validate_responses,
        }
    }

    pub fn allow_custom_http_methods(&self) -> bool {
        match self {
            Self::Validate(payload) => payload.allow_custom_http_methods,
            Self::Modify(payload) => payload.allow_custom_http_methods,
        }
    }

    pub fn docs(&self) -> &Documentation {
        match self {
            Self::Validate(payload) => &payload.docs,
            Self::Modify(payload) => &payload.docs,
        }
    }
}

impl From<ValidatePayload> for EndpointPayload {
    fn from(payload: ValidatePayload) -> Self {
        Self::Validate(payload)
    }
}

impl From<ModifyPayload> for EndpointPayload {
    fn from(payload: ModifyPayload) -> Self {
        Self::Modify(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::NewHeader;
    use modern_rest_validation::TypeDescriptor;

    #[test]
    fn test_modify_payload_builder() {
        let payload = ModifyPayload::new()
            .status_code(HttpStatus::ACCEPTED)
            .header("X-Job", NewHeader::new("queued"))
            .summary("Queue a job")
            .tag("jobs")
            .security("bearer", ["jobs:write"]);

        assert_eq!(payload.status_code, Some(HttpStatus::ACCEPTED));
        assert_eq!(payload.headers.as_ref().map(|h| h.len()), Some(1));
        assert_eq!(payload.docs.tags, vec!["jobs"]);
        assert_eq!(payload.docs.security[0]["bearer"], vec!["jobs:write"]);
    }

    #[test]
    fn test_validate_payload_collects_responses() {
        let payload = ValidatePayload::new([ResponseSpec::new(TypeDescriptor::string(), HttpStatus::OK)])
            .response(ResponseSpec::new(None, HttpStatus::NO_CONTENT))
            .validate_responses(false);

        let payload = EndpointPayload::from(payload);
        assert_eq!(payload.validate_responses(), Some(false));
        match payload {
            EndpointPayload::Validate(inner) => assert_eq!(inner.responses.len(), 2),
            other => panic!("unexpected payload {:?}", other),
        }
    }
}
