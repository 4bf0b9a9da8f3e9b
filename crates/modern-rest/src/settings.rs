//! Library settings
//!
//! Settings are built once and passed explicitly to
//! [`Blueprint::build`](crate::Blueprint) and friends.
//!
//! # Example
//! ```rust
//! use modern_rest::{ExtraHeaders, Settings};
//!
//! let settings = Settings::from_json(r#"{"validate_responses": false}"#).unwrap();
//! assert!(!settings.validate_responses);
//! assert_eq!(settings.extra_response_headers, ExtraHeaders::Forbid);
//! ```

use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::error_handler::GlobalErrorHandler;
use crate::response::ResponseSpec;

pub const ENV_VALIDATE_RESPONSES: &str = "MODERN_REST_VALIDATE_RESPONSES";
pub const ENV_EXTRA_RESPONSE_HEADERS: &str = "MODERN_REST_EXTRA_RESPONSE_HEADERS";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },
}

/// Treatment of response headers that no response spec declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraHeaders {
    #[default]
    Forbid,
    Allow,
}

impl FromStr for ExtraHeaders {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forbid" => Ok(Self::Forbid),
            "allow" => Ok(Self::Allow),
            other => Err(format!("unknown extra headers policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Check every response against the declared responses
    pub validate_responses: bool,
    pub extra_response_headers: ExtraHeaders,
    /// Responses every endpoint may return
    #[serde(skip)]
    pub responses: Vec<ResponseSpec>,
    #[serde(skip)]
    pub global_error_handler: GlobalErrorHandler,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            validate_responses: true,
            extra_response_headers: ExtraHeaders::Forbid,
            responses: Vec::new(),
            global_error_handler: GlobalErrorHandler::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Applies `MODERN_REST_*` environment variables on top of these settings
    pub fn with_env_overrides(self) -> Result<Self, SettingsError> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Same as [`Settings::with_env_overrides`] with a custom variable source
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_VALIDATE_RESPONSES) {
            self.validate_responses = match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(SettingsError::InvalidEnv {
                        name: ENV_VALIDATE_RESPONSES,
                        value,
                    })
                }
            };
        }
        if let Some(value) = lookup(ENV_EXTRA_RESPONSE_HEADERS) {
            self.extra_response_headers = value.parse().map_err(|_| SettingsError::InvalidEnv {
                name: ENV_EXTRA_RESPONSE_HEADERS,
                value,
            })?;
        }
        Ok(self)
    }

    pub fn validate_responses(mut self, enabled: bool) -> Self {
        self.validate_responses = enabled;
        self
    }

    pub fn extra_response_headers(mut self, policy: ExtraHeaders) -> Self {
        self.extra_response_headers = policy;
        self
    }

    pub fn response(mut self, spec: ResponseSpec) -> Self {
        self.responses.push(spec);
        self
    }

    pub fn global_error_handler(mut self, handler: GlobalErrorHandler) -> Self {
        self.global_error_handler = handler;
        self
    }
}
