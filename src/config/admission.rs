//! Request admission configuration

use axum::http::HeaderName;
use serde::Deserialize;

use super::error::ValidationError;
use super::node::NodeConfig;
use crate::adapters::http::admission::{HandlerOptions, DEFAULT_TOKEN_HEADER_NAME};

/// Admission policy configuration
///
/// Only the policies that make sense as plain values are configurable here;
/// everything else is set in code through `HandlerOptions::builder()`.
#[derive(Debug, Clone, Deserialize)]
pub struct AdmissionConfig {
    /// Header carrying the session token on requests and responses
    #[serde(default = "default_token_header_name")]
    pub token_header_name: String,

    /// Send token-less requests to the parent node instead of creating a
    /// session here
    #[serde(default)]
    pub redirect_new_requests: bool,
}

impl AdmissionConfig {
    /// Build the admission policies this configuration describes
    pub fn handler_options(&self) -> HandlerOptions {
        HandlerOptions::builder()
            .token_header_name(self.token_header_name.trim())
            .redirect_new_requests(self.redirect_new_requests)
            .build()
    }

    /// Validate admission configuration against the node it runs on
    pub fn validate(&self, node: &NodeConfig) -> Result<(), ValidationError> {
        let name = self.token_header_name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingRequired("ADMISSION__TOKEN_HEADER_NAME"));
        }
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            return Err(ValidationError::InvalidHeaderName(name.to_string()));
        }
        if self.redirect_new_requests && node.parent_host().is_none() {
            return Err(ValidationError::RedirectWithoutParent);
        }
        Ok(())
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            token_header_name: default_token_header_name(),
            redirect_new_requests: false,
        }
    }
}

fn default_token_header_name() -> String {
    DEFAULT_TOKEN_HEADER_NAME.to_string()
}
