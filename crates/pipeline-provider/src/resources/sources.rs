//! Source kinds.

use super::common::{
    aws_auth_attributes, broker_attributes, non_empty, one_of, sasl_attributes, AwsAuth, Broker,
    Sasl, DECODINGS,
};
use super::{ComponentOptions, Sharing, SourceModel, SourceOptions};
use provider_framework::schema::{attributes, Attribute, Validator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type HttpSource = SourceModel<HttpSourceOptions>;
pub type DemoSource = SourceModel<DemoSourceOptions>;
pub type KafkaSource = SourceModel<KafkaSourceOptions>;
pub type S3Source = SourceModel<S3SourceOptions>;
pub type AgentSource = SourceModel<AgentSourceOptions>;
pub type SplunkHecSource = SourceModel<SplunkHecSourceOptions>;
pub type FluentSource = SourceModel<FluentSourceOptions>;
pub type LogstashSource = SourceModel<LogstashSourceOptions>;

fn decoding() -> Attribute {
    Attribute::optional_string()
        .with_default("json")
        .with_validator(one_of(&DECODINGS))
        .described("How request bodies are decoded into events.")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpSourceOptions {
    #[serde(default)]
    pub decoding: Option<String>,
}

impl ComponentOptions for HttpSourceOptions {
    const NAME: &'static str = "http";
    const API_TYPE: &'static str = "http";
    const DESCRIPTION: &'static str = "Receive events over HTTP.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([("decoding", decoding())])
    }
}

impl SourceOptions for HttpSourceOptions {
    const SHARING: Sharing = Sharing::SharedWithGateway;
}

pub const DEMO_FORMATS: [&str; 8] = [
    "env_sensor",
    "financial",
    "nginx",
    "json",
    "apache_common",
    "apache_error",
    "bsd_syslog",
    "syslog",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemoSourceOptions {
    pub format: String,
}

impl ComponentOptions for DemoSourceOptions {
    const NAME: &'static str = "demo";
    const API_TYPE: &'static str = "demo-logs";
    const DESCRIPTION: &'static str = "Generate sample events in one of several formats.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([(
            "format",
            Attribute::required_string().with_validator(one_of(&DEMO_FORMATS)),
        )])
    }
}

impl SourceOptions for DemoSourceOptions {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KafkaSourceOptions {
    pub brokers: Vec<Broker>,
    pub topics: Vec<String>,
    pub group_id: String,
    #[serde(default)]
    pub tls_enabled: Option<bool>,
    #[serde(default)]
    pub sasl: Option<Sasl>,
    #[serde(default)]
    pub decoding: Option<String>,
}

impl ComponentOptions for KafkaSourceOptions {
    const NAME: &'static str = "kafka";
    const API_TYPE: &'static str = "kafka";
    const DESCRIPTION: &'static str = "Consume events from Kafka topics.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            (
                "brokers",
                Attribute::required_object_list(broker_attributes())
                    .with_validator(Validator::SizeAtLeast(1)),
            ),
            (
                "topics",
                Attribute::required_string_list()
                    .with_validator(Validator::SizeAtLeast(1))
                    .with_validator(Validator::UniqueValues),
            ),
            ("group_id", Attribute::required_string().with_validator(non_empty())),
            ("tls_enabled", Attribute::optional_bool().with_default(true)),
            ("sasl", Attribute::optional_object(sasl_attributes())),
            ("decoding", decoding()),
        ])
    }
}

impl SourceOptions for KafkaSourceOptions {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3SourceOptions {
    pub auth: AwsAuth,
    pub region: String,
    pub sqs_queue_url: String,
    #[serde(default)]
    pub compression: Option<String>,
}

impl ComponentOptions for S3SourceOptions {
    const NAME: &'static str = "s3";
    const API_TYPE: &'static str = "s3";
    const DESCRIPTION: &'static str = "Read objects from S3 as they are announced on an SQS queue.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            ("auth", Attribute::required_object(aws_auth_attributes())),
            ("region", Attribute::required_string().with_validator(non_empty())),
            (
                "sqs_queue_url",
                Attribute::required_string().with_validator(Validator::Matches {
                    pattern: "^https://sqs\\.".to_string(),
                    message: "must be an SQS queue URL".to_string(),
                }),
            ),
            (
                "compression",
                Attribute::optional_string()
                    .with_default("auto")
                    .with_validator(one_of(&["auto", "gzip", "none", "zstd"])),
            ),
        ])
    }
}

impl SourceOptions for S3SourceOptions {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentSourceOptions {}

impl ComponentOptions for AgentSourceOptions {
    const NAME: &'static str = "agent";
    const API_TYPE: &'static str = "agent";
    const DESCRIPTION: &'static str = "Receive events from the log agent.";

    fn attributes() -> BTreeMap<String, Attribute> {
        BTreeMap::new()
    }
}

impl SourceOptions for AgentSourceOptions {
    const SHARING: Sharing = Sharing::Shared;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplunkHecSourceOptions {}

impl ComponentOptions for SplunkHecSourceOptions {
    const NAME: &'static str = "splunk_hec";
    const API_TYPE: &'static str = "splunk-hec";
    const DESCRIPTION: &'static str = "Receive events sent to a Splunk HTTP Event Collector endpoint.";

    fn attributes() -> BTreeMap<String, Attribute> {
        BTreeMap::new()
    }
}

impl SourceOptions for SplunkHecSourceOptions {
    const SHARING: Sharing = Sharing::Shared;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FluentSourceOptions {
    #[serde(default)]
    pub decoding: Option<String>,
}

impl ComponentOptions for FluentSourceOptions {
    const NAME: &'static str = "fluent";
    const API_TYPE: &'static str = "fluent";
    const DESCRIPTION: &'static str = "Receive events from Fluentd or Fluent Bit.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([("decoding", decoding())])
    }
}

impl SourceOptions for FluentSourceOptions {
    const SHARING: Sharing = Sharing::Shared;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogstashSourceOptions {
    #[serde(default)]
    pub format: Option<String>,
}

impl ComponentOptions for LogstashSourceOptions {
    const NAME: &'static str = "logstash";
    const API_TYPE: &'static str = "logstash";
    const DESCRIPTION: &'static str = "Receive events from Logstash.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([(
            "format",
            Attribute::optional_string()
                .with_default("json")
                .with_validator(one_of(&["json", "text"])),
        )])
    }
}

impl SourceOptions for LogstashSourceOptions {
    const SHARING: Sharing = Sharing::Shared;
}
