//! # Provider Configuration
//!
//! The provider block accepts the service credentials and connection tuning. `auth_key`
//! and `endpoint` fall back to the environment when left out of configuration.

use crate::clients::ClientSettings;
use provider_framework::schema::{strip_nulls, Attribute, Schema, Validator};
use provider_framework::Diagnostics;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

pub const AUTH_KEY_ENV: &str = "PIPELINE_AUTH_KEY";
pub const ENDPOINT_ENV: &str = "PIPELINE_ENDPOINT";
pub const DEFAULT_TIMEOUT_SECONDS: i64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub auth_key: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub timeout_seconds: Option<i64>,
}

impl ProviderConfig {
    pub fn schema() -> Schema {
        Schema::new("Manage pipelines and their components.")
            .with_attribute(
                "auth_key",
                Attribute::optional_string()
                    .sensitive()
                    .described(format!("Service key for the API. Falls back to {AUTH_KEY_ENV}.")),
            )
            .with_attribute(
                "endpoint",
                Attribute::optional_string()
                    .described(format!("Base URL of the API. Falls back to {ENDPOINT_ENV}.")),
            )
            .with_attribute(
                "headers",
                Attribute::optional_string_map().described("Extra headers sent with every request."),
            )
            .with_attribute(
                "timeout_seconds",
                Attribute::optional_int64()
                    .with_default(DEFAULT_TIMEOUT_SECONDS)
                    .with_validator(Validator::Int64Between { min: 1, max: 600 })
                    .described("Per-request timeout."),
            )
    }

    /// Validates a provider configuration block and decodes it.
    pub fn from_value(value: &Value, diags: &mut Diagnostics) -> Option<Self> {
        let schema = Self::schema();
        let mut value = if value.is_null() {
            Value::Object(Default::default())
        } else {
            value.clone()
        };
        schema.validate(&value, diags);
        if diags.has_errors() {
            return None;
        }
        schema.apply_defaults(&mut value);
        match serde_json::from_value(strip_nulls(value)) {
            Ok(config) => Some(config),
            Err(e) => {
                diags.error("Invalid provider configuration", e.to_string());
                None
            }
        }
    }

    /// Resolves the configuration against the process environment.
    pub fn resolve(&self, diags: &mut Diagnostics) -> Option<ClientSettings> {
        self.resolve_with(|name| std::env::var(name).ok(), diags)
    }

    pub fn resolve_with<F>(&self, env: F, diags: &mut Diagnostics) -> Option<ClientSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_key = self
            .auth_key
            .clone()
            .or_else(|| env(AUTH_KEY_ENV))
            .filter(|key| !key.trim().is_empty());
        if auth_key.is_none() {
            diags.attribute_error(
                "auth_key",
                "Missing auth_key",
                format!("Set \"auth_key\" in the provider configuration or the {AUTH_KEY_ENV} environment variable."),
            );
        }

        let raw_endpoint = self.endpoint.clone().or_else(|| env(ENDPOINT_ENV));
        let endpoint = match raw_endpoint.as_deref().map(str::trim) {
            None | Some("") => {
                diags.attribute_error(
                    "endpoint",
                    "Missing endpoint",
                    format!("Set \"endpoint\" in the provider configuration or the {ENDPOINT_ENV} environment variable."),
                );
                None
            }
            Some(raw) => parse_endpoint(raw, diags),
        };

        let timeout_seconds = self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        let settings = ClientSettings {
            endpoint: endpoint?,
            auth_key: auth_key?,
            headers: self.headers.clone(),
            timeout: Duration::from_secs(timeout_seconds.max(1) as u64),
        };
        debug!(?settings, "Resolved provider configuration");
        Some(settings)
    }
}

fn parse_endpoint(raw: &str, diags: &mut Diagnostics) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Some(url),
        Ok(url) => {
            diags.attribute_error(
                "endpoint",
                "Invalid endpoint",
                format!("Expected an absolute http(s) URL, got scheme \"{}\" in \"{raw}\".", url.scheme()),
            );
            None
        }
        Err(e) => {
            diags.attribute_error(
                "endpoint",
                "Invalid endpoint",
                format!("\"{raw}\" is not a valid URL: {e}"),
            );
            None
        }
    }
}
