//! Response validation
//!
//! Checks what a handler produced against the endpoint's declared responses
//! and turns raw data into a response.

use std::sync::Arc;

use modern_rest_common::{HttpResponse, HttpStatus};
use modern_rest_validation::{
    coerce_str, validate_with_context, ErrorType, TypeDescriptor, ValidationContext,
    ValidationError, ValidationErrors, Value,
};

use crate::error::ResponseSerializationError;
use crate::headers::ResponseHeader;
use crate::response::{Reply, ResponseSpec};
use crate::serializer::Serializer;
use crate::settings::ExtraHeaders;
use crate::validation::metadata::EndpointMetadata;

/// Headers any response may carry without declaring them
const IMPLICIT_HEADERS: [&str; 2] = ["content-type", "content-length"];

/// Validates the output of one endpoint
#[derive(Clone)]
pub struct ResponseValidator {
    metadata: Arc<EndpointMetadata>,
    serializer: Arc<dyn Serializer>,
}

impl ResponseValidator {
    pub fn new(metadata: Arc<EndpointMetadata>, serializer: Arc<dyn Serializer>) -> Self {
        Self {
            metadata,
            serializer,
        }
    }

    pub fn metadata(&self) -> &EndpointMetadata {
        &self.metadata
    }

    pub fn validate(&self, reply: Reply) -> Result<HttpResponse, ResponseSerializationError> {
        match reply {
            Reply::Data(value) => self.validate_data(value),
            Reply::Response(response) => self.validate_response(response),
        }
    }

    /// Validates raw data and builds the response described by the
    /// endpoint's modification.
    pub fn validate_data(&self, value: Value) -> Result<HttpResponse, ResponseSerializationError> {
        let Some(modification) = &self.metadata.modification else {
            return Err(ResponseSerializationError::message(
                "Endpoint returned raw data but it only declares `HttpResponse` results, use `@modify` for endpoints that return raw data",
            ));
        };

        if self.metadata.validate_responses {
            self.validate_body(&value, modification.return_type.as_ref())?;
        }

        let mut response = if modification.status_code.allows_body() {
            let body = self.serializer.serialize(&value).map_err(|e| {
                ResponseSerializationError::message(e.to_string())
                    .with_status(HttpStatus::INTERNAL_SERVER_ERROR)
            })?;
            HttpResponse::new(
                body,
                modification.status_code,
                [("content-type", self.serializer.content_type())],
            )
        } else {
            HttpResponse::empty(modification.status_code)
        };

        if let Some(headers) = &modification.headers {
            for (name, header) in headers {
                response.insert_header(name, header.value.clone());
            }
        }
        Ok(response)
    }

    /// Checks a response built by the handler or an error handler
    pub fn validate_response(
        &self,
        response: HttpResponse,
    ) -> Result<HttpResponse, ResponseSerializationError> {
        if !self.metadata.validate_responses {
            return Ok(response);
        }

        let Some(spec) = self.metadata.responses.get(&response.status) else {
            let allowed: Vec<String> = self
                .metadata
                .responses
                .keys()
                .map(|status| status.to_string())
                .collect();
            return Err(ResponseSerializationError::message(format!(
                "Returned status_code={} is not specified in the list of allowed status codes: [{}]",
                response.status,
                allowed.join(", ")
            )));
        };

        let value = if response.body.is_empty() {
            Value::Null
        } else {
            self.serializer.deserialize(&response.body).map_err(|e| {
                ResponseSerializationError::message(format!("Response body cannot be parsed: {}", e))
            })?
        };
        self.validate_body(&value, spec.return_type.as_ref())?;
        self.validate_headers(&response, spec)?;
        Ok(response)
    }

    fn validate_body(
        &self,
        value: &Value,
        return_type: Option<&TypeDescriptor>,
    ) -> Result<(), ResponseSerializationError> {
        let result = match return_type {
            Some(schema) => self.serializer.validate(value, schema),
            None if value.is_null() => Ok(()),
            None => Err(ValidationErrors::from(ValidationError::new(
                vec![],
                "Input should be None",
                ErrorType::NoneRequired,
            ))),
        };
        result.map_err(|errors| ResponseSerializationError::validation(&errors))
    }

    fn validate_headers(
        &self,
        response: &HttpResponse,
        spec: &ResponseSpec,
    ) -> Result<(), ResponseSerializationError> {
        let mut errors = ValidationErrors::new();
        let declared: Vec<(String, &ResponseHeader)> = spec
            .headers
            .iter()
            .flatten()
            .map(|(name, header)| (name.to_lowercase(), header))
            .collect();

        for (name, header) in &declared {
            let ResponseHeader::Spec(header) = header else {
                continue;
            };
            match response.headers.get(name) {
                None if header.required => errors.add(ValidationError::missing(vec![
                    "headers".into(),
                    name.clone().into(),
                ])),
                None => {}
                Some(raw) => {
                    if let Some(schema) = &header.schema {
                        let mut ctx = ValidationContext::with_location("headers");
                        ctx.push(name.clone());
                        if let Err(header_errors) =
                            validate_with_context(&coerce_str(raw, schema), schema, &mut ctx)
                        {
                            errors.merge(header_errors);
                        }
                    }
                }
            }
        }

        if self.metadata.extra_response_headers == ExtraHeaders::Forbid {
            let mut undeclared: Vec<&String> = response
                .headers
                .keys()
                .filter(|name| !IMPLICIT_HEADERS.contains(&name.as_str()))
                .filter(|name| !declared.iter().any(|(declared, _)| declared == *name))
                .collect();
            undeclared.sort();
            for name in undeclared {
                errors.add(ValidationError::new(
                    vec!["headers".into(), name.clone().into()],
                    "Header is not declared for this response",
                    ErrorType::ValueError,
                ));
            }
        }

        errors
            .into_result()
            .map_err(|errors| ResponseSerializationError::validation(&errors))
    }
}
