//! Destination kinds. The service calls these sinks.

use super::common::{
    aws_auth_attributes, broker_attributes, field_path, non_empty, one_of, sasl_attributes,
    AwsAuth, Broker, Sasl,
};
use super::{ComponentOptions, DestinationModel};
use provider_framework::schema::{attributes, Attribute, Validator};
use provider_framework::Diagnostics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type BlackholeDestination = DestinationModel<BlackholeOptions>;
pub type HttpDestination = DestinationModel<HttpDestinationOptions>;
pub type MezmoDestination = DestinationModel<MezmoOptions>;
pub type KafkaDestination = DestinationModel<KafkaDestinationOptions>;
pub type S3Destination = DestinationModel<S3DestinationOptions>;
pub type DatadogLogsDestination = DestinationModel<DatadogLogsOptions>;

fn http_url() -> Validator {
    Validator::Matches {
        pattern: "^https?://".to_string(),
        message: "must be an http(s) URL".to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlackholeOptions {}

impl ComponentOptions for BlackholeOptions {
    const NAME: &'static str = "blackhole";
    const API_TYPE: &'static str = "blackhole";
    const DESCRIPTION: &'static str = "Discard every event.";

    fn attributes() -> BTreeMap<String, Attribute> {
        BTreeMap::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpAuth {
    pub strategy: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpDestinationOptions {
    pub uri: String,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub compression: Option<String>,
    #[serde(default)]
    pub auth: Option<HttpAuth>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

impl ComponentOptions for HttpDestinationOptions {
    const NAME: &'static str = "http";
    const API_TYPE: &'static str = "http";
    const DESCRIPTION: &'static str = "Send events to an HTTP endpoint.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            ("uri", Attribute::required_string().with_validator(http_url())),
            (
                "encoding",
                Attribute::optional_string()
                    .with_default("json")
                    .with_validator(one_of(&["json", "ndjson", "text"])),
            ),
            (
                "compression",
                Attribute::optional_string()
                    .with_default("none")
                    .with_validator(one_of(&["none", "gzip"])),
            ),
            (
                "auth",
                Attribute::optional_object(attributes([
                    (
                        "strategy",
                        Attribute::required_string().with_validator(one_of(&["basic", "bearer", "none"])),
                    ),
                    ("user", Attribute::optional_string()),
                    ("password", Attribute::optional_string().sensitive()),
                    ("token", Attribute::optional_string().sensitive()),
                ])),
            ),
            ("headers", Attribute::optional_string_map()),
        ])
    }

    fn validate(&self, diags: &mut Diagnostics) {
        let Some(auth) = &self.auth else { return };
        let missing: &[&str] = match auth.strategy.as_str() {
            "basic" if auth.user.is_none() || auth.password.is_none() => &["user", "password"],
            "bearer" if auth.token.is_none() => &["token"],
            _ => &[],
        };
        if !missing.is_empty() {
            diags.attribute_error(
                "auth",
                "Missing required argument",
                format!(
                    "The \"{}\" auth strategy requires: {}.",
                    auth.strategy,
                    missing.join(", ")
                ),
            );
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MezmoOptions {
    #[serde(default)]
    pub host: Option<String>,
    pub ingestion_key: String,
    pub hostname: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub log_construction_scheme: Option<String>,
}

impl ComponentOptions for MezmoOptions {
    const NAME: &'static str = "mezmo";
    const API_TYPE: &'static str = "mezmo";
    const DESCRIPTION: &'static str = "Send events to Log Analysis.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            ("host", Attribute::optional_string().with_default("logs.mezmo.com")),
            (
                "ingestion_key",
                Attribute::required_string().sensitive().with_validator(non_empty()),
            ),
            ("hostname", Attribute::required_string().with_validator(non_empty())),
            ("tags", Attribute::optional_string_list().with_validator(Validator::UniqueValues)),
            ("app", Attribute::optional_string()),
            ("file", Attribute::optional_string()),
            (
                "log_construction_scheme",
                Attribute::optional_string()
                    .with_default("message_pass_through")
                    .with_validator(one_of(&["explicit", "message_pass_through"])),
            ),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KafkaDestinationOptions {
    pub brokers: Vec<Broker>,
    pub topic: String,
    #[serde(default)]
    pub event_key_field: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub compression: Option<String>,
    #[serde(default)]
    pub tls_enabled: Option<bool>,
    #[serde(default)]
    pub sasl: Option<Sasl>,
}

impl ComponentOptions for KafkaDestinationOptions {
    const NAME: &'static str = "kafka";
    const API_TYPE: &'static str = "kafka";
    const DESCRIPTION: &'static str = "Publish events to a Kafka topic.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            (
                "brokers",
                Attribute::required_object_list(broker_attributes())
                    .with_validator(Validator::SizeAtLeast(1)),
            ),
            ("topic", Attribute::required_string().with_validator(non_empty())),
            ("event_key_field", Attribute::optional_string().with_validator(field_path())),
            (
                "encoding",
                Attribute::optional_string()
                    .with_default("json")
                    .with_validator(one_of(&["json", "text"])),
            ),
            (
                "compression",
                Attribute::optional_string()
                    .with_default("none")
                    .with_validator(one_of(&["none", "gzip", "lz4", "snappy", "zstd"])),
            ),
            ("tls_enabled", Attribute::optional_bool().with_default(true)),
            ("sasl", Attribute::optional_object(sasl_attributes())),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3DestinationOptions {
    pub auth: AwsAuth,
    pub region: String,
    pub bucket: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub compression: Option<String>,
}

impl ComponentOptions for S3DestinationOptions {
    const NAME: &'static str = "s3";
    const API_TYPE: &'static str = "s3";
    const DESCRIPTION: &'static str = "Write batches of events to an S3 bucket.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            ("auth", Attribute::required_object(aws_auth_attributes())),
            ("region", Attribute::required_string().with_validator(non_empty())),
            ("bucket", Attribute::required_string().with_validator(non_empty())),
            ("prefix", Attribute::optional_string()),
            (
                "encoding",
                Attribute::optional_string()
                    .with_default("text")
                    .with_validator(one_of(&["json", "text"])),
            ),
            (
                "compression",
                Attribute::optional_string()
                    .with_default("none")
                    .with_validator(one_of(&["gzip", "none"])),
            ),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatadogLogsOptions {
    pub api_key: String,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub compression: Option<String>,
}

impl ComponentOptions for DatadogLogsOptions {
    const NAME: &'static str = "datadog_logs";
    const API_TYPE: &'static str = "datadog-logs";
    const DESCRIPTION: &'static str = "Send events to Datadog Logs.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            ("api_key", Attribute::required_string().sensitive().with_validator(non_empty())),
            (
                "site",
                Attribute::optional_string()
                    .with_default("us1")
                    .with_validator(one_of(&["us1", "us3", "us5", "eu1"])),
            ),
            (
                "compression",
                Attribute::optional_string()
                    .with_default("gzip")
                    .with_validator(one_of(&["gzip", "none"])),
            ),
        ])
    }
}
