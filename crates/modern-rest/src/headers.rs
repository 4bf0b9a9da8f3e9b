//! Response header declarations
//!
//! A [`HeaderSpec`] describes a header the handler itself sets on a response
//! object. A [`NewHeader`] is a header with a fixed value that the endpoint
//! adds to responses built from raw data.

use modern_rest_validation::TypeDescriptor;

/// Describes a header present on returned responses
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderSpec {
    pub required: bool,
    pub description: Option<String>,
    pub deprecated: bool,
    pub example: Option<String>,
    /// Optional schema the header value is coerced and validated against
    pub schema: Option<TypeDescriptor>,
}

impl Default for HeaderSpec {
    fn default() -> Self {
        Self {
            required: true,
            description: None,
            deprecated: false,
            example: None,
            schema: None,
        }
    }
}

impl HeaderSpec {
    /// A required header
    pub fn new() -> Self {
        Self::default()
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn schema(mut self, schema: TypeDescriptor) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// A header with a concrete value added by the endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct NewHeader {
    pub value: String,
    pub description: Option<String>,
    pub deprecated: bool,
    pub example: Option<String>,
}

impl NewHeader {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: None,
            deprecated: false,
            example: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// The equivalent declaration: always present, documented the same way
    pub fn to_spec(&self) -> HeaderSpec {
        HeaderSpec {
            required: true,
            description: self.description.clone(),
            deprecated: self.deprecated,
            example: self.example.clone().or_else(|| Some(self.value.clone())),
            schema: None,
        }
    }
}

/// Either kind of header declaration.
///
/// Response specs accept only `Spec`; `@modify` headers accept only `New`.
/// Building an endpoint rejects the other kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseHeader {
    Spec(HeaderSpec),
    New(NewHeader),
}

impl ResponseHeader {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Spec(_) => "HeaderSpec",
            Self::New(_) => "NewHeader",
        }
    }
}

impl From<HeaderSpec> for ResponseHeader {
    fn from(spec: HeaderSpec) -> Self {
        Self::Spec(spec)
    }
}

impl From<NewHeader> for ResponseHeader {
    fn from(header: NewHeader) -> Self {
        Self::New(header)
    }
}
