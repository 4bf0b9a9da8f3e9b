//! Declared response shapes and handler replies

use std::collections::BTreeMap;
use std::fmt;

use modern_rest_common::{HttpResponse, HttpStatus};
use modern_rest_validation::{TypeDescriptor, Value};

use crate::headers::{NewHeader, ResponseHeader};

/// One response an endpoint is allowed to return.
///
/// Identified by `status_code`. `return_type: None` means the body is empty
/// or `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpec {
    pub return_type: Option<TypeDescriptor>,
    pub status_code: HttpStatus,
    /// Header name (any case) to declaration
    pub headers: Option<BTreeMap<String, ResponseHeader>>,
}

impl ResponseSpec {
    pub fn new(return_type: impl Into<Option<TypeDescriptor>>, status_code: HttpStatus) -> Self {
        Self {
            return_type: return_type.into(),
            status_code,
            headers: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, header: impl Into<ResponseHeader>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), header.into());
        self
    }
}

impl fmt::Display for ResponseSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResponseSpec(return_type=")?;
        match &self.return_type {
            Some(return_type) => write!(f, "{}", return_type)?,
            None => write!(f, "None")?,
        }
        write!(f, ", status_code={}, headers=", self.status_code)?;
        match &self.headers {
            Some(headers) => {
                let names: Vec<&str> = headers.keys().map(String::as_str).collect();
                write!(f, "[{}]", names.join(", "))?;
            }
            None => write!(f, "None")?,
        }
        write!(f, ")")
    }
}

/// How raw data returned by a `@modify` handler becomes a response
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseModification {
    pub return_type: Option<TypeDescriptor>,
    pub status_code: HttpStatus,
    pub headers: Option<BTreeMap<String, NewHeader>>,
}

impl ResponseModification {
    /// The response this modification produces, with every added header
    /// declared as required.
    pub fn to_spec(&self) -> ResponseSpec {
        ResponseSpec {
            return_type: self.return_type.clone(),
            status_code: self.status_code,
            headers: self.headers.as_ref().map(|headers| {
                headers
                    .iter()
                    .map(|(name, header)| (name.clone(), ResponseHeader::Spec(header.to_spec())))
                    .collect()
            }),
        }
    }
}

/// A handler's successful outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Raw data, serialized according to the endpoint's modification
    Data(Value),
    /// A complete response, checked against the declared responses
    Response(HttpResponse),
}

impl Reply {
    /// Raw data from a `serde_json::Value`, handy with `json!`
    pub fn json(value: serde_json::Value) -> Self {
        Self::Data(value.into())
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Data(value)
    }
}

impl From<HttpResponse> for Reply {
    fn from(response: HttpResponse) -> Self {
        Self::Response(response)
    }
}
