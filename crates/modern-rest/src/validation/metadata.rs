//! Endpoint metadata
//!
//! [`build_metadata`] merges an endpoint's payload with its blueprint's
//! configuration and the global settings into one [`EndpointMetadata`].
//! Every declaration mistake is reported here, before any request is served.

use std::collections::BTreeMap;
use std::sync::Arc;

use modern_rest_common::{HttpMethod, HttpStatus};
use tracing::debug;

use crate::components::ComponentParser;
use crate::controller::BlueprintConfig;
use crate::error::EndpointMetadataError;
use crate::error_handler::ErrorHandler;
use crate::handler::{EndpointDefinition, Returns};
use crate::headers::ResponseHeader;
use crate::payload::{Documentation, EndpointPayload, ModifyPayload};
use crate::response::{ResponseModification, ResponseSpec};
use crate::settings::{ExtraHeaders, Settings};

/// Final, immutable description of one endpoint
#[derive(Debug, Clone)]
pub struct EndpointMetadata {
    pub responses: BTreeMap<HttpStatus, ResponseSpec>,
    pub validate_responses: bool,
    /// Uppercased; may be a custom method
    pub method: String,
    /// Present when the handler returns raw data
    pub modification: Option<ResponseModification>,
    pub error_handler: Option<ErrorHandler>,
    pub component_parsers: Vec<Arc<dyn ComponentParser>>,
    pub extra_response_headers: ExtraHeaders,
    pub is_async: bool,
    pub docs: Documentation,
}

impl PartialEq for EndpointMetadata {
    fn eq(&self, other: &Self) -> bool {
        let same_handler = match (&self.error_handler, &other.error_handler) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            (None, None) => true,
            _ => false,
        };
        let same_components = self.component_parsers.len() == other.component_parsers.len()
            && self
                .component_parsers
                .iter()
                .zip(&other.component_parsers)
                .all(|(a, b)| a.kind() == b.kind() && a.schema() == b.schema());

        same_handler
            && same_components
            && self.responses == other.responses
            && self.validate_responses == other.validate_responses
            && self.method == other.method
            && self.modification == other.modification
            && self.extra_response_headers == other.extra_response_headers
            && self.is_async == other.is_async
            && self.docs == other.docs
    }
}

impl EndpointMetadata {
    /// Status of responses built from raw data
    pub fn default_status(&self) -> Option<HttpStatus> {
        self.modification.as_ref().map(|m| m.status_code)
    }
}

/// Adds `spec` to `responses`; an equal spec under the same status is
/// dropped, a different one is an error.
pub fn merge_response(
    responses: &mut BTreeMap<HttpStatus, ResponseSpec>,
    spec: ResponseSpec,
) -> Result<(), EndpointMetadataError> {
    match responses.get(&spec.status_code) {
        Some(existing) if *existing != spec => Err(EndpointMetadataError::new(format!(
            "Response with status_code={} has different metadata: {} and {}",
            spec.status_code, existing, spec
        ))),
        Some(_) => Ok(()),
        None => {
            responses.insert(spec.status_code, spec);
            Ok(())
        }
    }
}

/// Builds the metadata of `definition` as declared inside `blueprint`.
pub fn build_metadata(
    definition: &EndpointDefinition,
    blueprint: &BlueprintConfig,
    settings: &Settings,
) -> Result<EndpointMetadata, EndpointMetadataError> {
    let payload = definition.payload.as_ref();
    let method = check_method(definition, payload)?;

    let inherited: Vec<&ResponseSpec> = settings.responses.iter().chain(&blueprint.responses).collect();
    for spec in &inherited {
        check_spec_headers(spec, &definition.name)?;
    }

    let mut responses = BTreeMap::new();
    for spec in &inherited {
        merge_response(&mut responses, (*spec).clone())?;
    }

    let modification = match (&definition.returns, payload) {
        (Returns::Response, Some(EndpointPayload::Validate(validate))) => {
            if validate.responses.is_empty() {
                return Err(EndpointMetadataError::new(format!(
                    "`@validate` on {} must list at least one `ResponseSpec`",
                    definition.name
                )));
            }
            for spec in &validate.responses {
                check_spec_headers(spec, &definition.name)?;
                merge_response(&mut responses, spec.clone())?;
            }
            None
        }
        (Returns::Response, Some(EndpointPayload::Modify(_))) => {
            return Err(EndpointMetadataError::new(format!(
                "{} returns `HttpResponse`, `@modify` can only be used with endpoints that return raw data, use `@validate` instead",
                definition.name
            )));
        }
        (Returns::Response, None) => {
            if inherited.is_empty() {
                return Err(EndpointMetadataError::new(format!(
                    "{} returns `HttpResponse` and declares no responses, use `@validate` to list them",
                    definition.name
                )));
            }
            None
        }
        (_, Some(EndpointPayload::Validate(_))) => {
            return Err(EndpointMetadataError::new(format!(
                "`@validate` is not allowed on {} because it returns raw data, use `@modify` instead",
                definition.name
            )));
        }
        (returns, payload) => {
            let empty = ModifyPayload::default();
            let modify = match payload {
                Some(EndpointPayload::Modify(modify)) => modify,
                _ => &empty,
            };
            let modification = build_modification(returns, &method, modify, &definition.name)?;
            merge_response(&mut responses, modification.to_spec())?;
            for spec in &modify.extra_responses {
                check_spec_headers(spec, &definition.name)?;
                merge_response(&mut responses, spec.clone())?;
            }
            Some(modification)
        }
    };

    if blueprint.responses_from_components {
        for component in &blueprint.components {
            for spec in component.responses(blueprint.serializer.as_ref()) {
                if !responses.contains_key(&spec.status_code) {
                    responses.insert(spec.status_code, spec);
                }
            }
        }
    }

    check_bodyless_statuses(&responses, &definition.name)?;
    check_error_handler_kind(definition, payload)?;

    let validate_responses = payload
        .and_then(EndpointPayload::validate_responses)
        .or(blueprint.validate_responses)
        .unwrap_or(settings.validate_responses);

    debug!(
        endpoint = %definition.name,
        method = %method,
        responses = responses.len(),
        validate_responses,
        "Built endpoint metadata"
    );

    Ok(EndpointMetadata {
        responses,
        validate_responses,
        method,
        modification,
        error_handler: payload.and_then(EndpointPayload::error_handler).cloned(),
        component_parsers: blueprint.components.clone(),
        extra_response_headers: settings.extra_response_headers,
        is_async: definition.is_async(),
        docs: payload.map(|p| p.docs().clone()).unwrap_or_default(),
    })
}

fn check_method(
    definition: &EndpointDefinition,
    payload: Option<&EndpointPayload>,
) -> Result<String, EndpointMetadataError> {
    let method = definition.method.to_uppercase();
    let allow_custom = payload.is_some_and(EndpointPayload::allow_custom_http_methods);
    if method.parse::<HttpMethod>().is_err() && !allow_custom {
        return Err(EndpointMetadataError::new(format!(
            "{} is not a valid HTTP method name for {}, set `allow_custom_http_methods` to use it",
            definition.method, definition.name
        )));
    }
    Ok(method)
}

fn check_spec_headers(spec: &ResponseSpec, endpoint: &str) -> Result<(), EndpointMetadataError> {
    let Some(headers) = &spec.headers else {
        return Ok(());
    };
    for (name, header) in headers {
        if let ResponseHeader::New(_) = header {
            return Err(EndpointMetadataError::new(format!(
                "Cannot use `NewHeader` for header {} in {} of {}, use `HeaderSpec` instead",
                name, spec, endpoint
            )));
        }
    }
    Ok(())
}

fn build_modification(
    returns: &Returns,
    method: &str,
    modify: &ModifyPayload,
    endpoint: &str,
) -> Result<ResponseModification, EndpointMetadataError> {
    let return_type = match returns {
        Returns::Data(return_type) => Some(return_type.clone()),
        _ => None,
    };

    let status_code = modify.status_code.unwrap_or(if return_type.is_none() {
        HttpStatus::NO_CONTENT
    } else if method == "POST" {
        HttpStatus::CREATED
    } else {
        HttpStatus::OK
    });

    let headers = match &modify.headers {
        None => None,
        Some(headers) => {
            let mut new_headers = BTreeMap::new();
            for (name, header) in headers {
                match header {
                    ResponseHeader::New(header) => {
                        new_headers.insert(name.clone(), header.clone());
                    }
                    ResponseHeader::Spec(_) => {
                        return Err(EndpointMetadataError::new(format!(
                            "Cannot use `HeaderSpec` for header {} in `@modify` of {}, use `NewHeader` instead",
                            name, endpoint
                        )));
                    }
                }
            }
            Some(new_headers)
        }
    };

    Ok(ResponseModification {
        return_type,
        status_code,
        headers,
    })
}

fn check_bodyless_statuses(
    responses: &BTreeMap<HttpStatus, ResponseSpec>,
    endpoint: &str,
) -> Result<(), EndpointMetadataError> {
    for spec in responses.values() {
        if !spec.status_code.allows_body() && spec.return_type.is_some() {
            return Err(EndpointMetadataError::new(format!(
                "{} of {} must have `None` return type, status {} cannot have a body",
                spec, endpoint, spec.status_code
            )));
        }
    }
    Ok(())
}

fn check_error_handler_kind(
    definition: &EndpointDefinition,
    payload: Option<&EndpointPayload>,
) -> Result<(), EndpointMetadataError> {
    let Some(handler) = payload.and_then(EndpointPayload::error_handler) else {
        return Ok(());
    };
    match (definition.is_async(), handler.is_async()) {
        (true, false) => Err(EndpointMetadataError::new(format!(
            "Cannot use sync `error_handler` with async endpoint {}",
            definition.name
        ))),
        (false, true) => Err(EndpointMetadataError::new(format!(
            "Cannot use async `error_handler` with sync endpoint {}",
            definition.name
        ))),
        _ => Ok(()),
    }
}
