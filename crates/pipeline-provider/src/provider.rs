//! # Pipeline Provider
//!
//! Entry point for a host: metadata, schemas, configuration, and a [`DynamicResource`]
//! for every resource type name.
//!
//! ## Registered resources
//!
//! | Category | Type name |
//! |----------|-----------|
//! | Pipeline | `pipeline_pipeline` |
//! | Shared source | `pipeline_shared_source` |
//! | Access key | `pipeline_access_key` |
//! | Sources | `pipeline_<kind>_source` |
//! | Processors | `pipeline_<kind>_processor` |
//! | Destinations | `pipeline_<kind>_destination` |
//! | Alerts | `pipeline_<kind>_alert` |

use crate::clients::{ApiStore, Client, HttpClient};
use crate::config::ProviderConfig;
use crate::resources::alerts::{AbsenceOptions, ChangeOptions, ThresholdOptions};
use crate::resources::destinations::{
    BlackholeOptions, DatadogLogsOptions, HttpDestinationOptions, KafkaDestinationOptions,
    MezmoOptions, S3DestinationOptions,
};
use crate::resources::processors::{
    CompactFieldsOptions, DedupeOptions, DropFieldsOptions, FilterOptions, FlattenFieldsOptions,
    ParseOptions, RouteOptions, SampleOptions, StringifyOptions, UnrollOptions,
};
use crate::resources::sources::{
    AgentSourceOptions, DemoSourceOptions, FluentSourceOptions, HttpSourceOptions,
    KafkaSourceOptions, LogstashSourceOptions, S3SourceOptions, SplunkHecSourceOptions,
};
use crate::resources::{
    AccessKeyModel, AlertModel, ComponentOptions, DestinationModel, PipelineModel, ProcessorModel,
    SharedSourceModel, SourceModel, SourceOptions,
};
use provider_framework::{
    validate_config, Diagnostics, DynamicResource, ResourceAdapter, ResourceModel, Schema, Store,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

pub const PROVIDER_TYPE_NAME: &str = "pipeline";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderMetadata {
    pub type_name: String,
    pub version: String,
    pub resources: Vec<String>,
}

struct Registration {
    type_name: String,
    schema: fn() -> Schema,
    validate: fn(&str, &Value, &mut Diagnostics),
    build: fn(String, ApiStore) -> Box<dyn DynamicResource>,
    #[cfg(test)]
    round_trip: fn(&Value) -> Result<(Value, Value), String>,
}

fn build<M>(type_name: String, store: ApiStore) -> Box<dyn DynamicResource>
where
    M: ResourceModel,
    ApiStore: Store<M::Api>,
{
    Box::new(ResourceAdapter::<M, ApiStore>::new(type_name, store))
}

fn register<M>(type_name: String) -> Registration
where
    M: ResourceModel,
    ApiStore: Store<M::Api>,
{
    Registration {
        type_name,
        schema: M::schema,
        validate: validate_config::<M>,
        build: build::<M>,
        #[cfg(test)]
        round_trip: tests::round_trip::<M>,
    }
}

fn source<K: SourceOptions>() -> Registration {
    register::<SourceModel<K>>(format!("{PROVIDER_TYPE_NAME}_{}_source", K::NAME))
}

fn processor<K: ComponentOptions>() -> Registration {
    register::<ProcessorModel<K>>(format!("{PROVIDER_TYPE_NAME}_{}_processor", K::NAME))
}

fn destination<K: ComponentOptions>() -> Registration {
    register::<DestinationModel<K>>(format!("{PROVIDER_TYPE_NAME}_{}_destination", K::NAME))
}

fn alert<K: ComponentOptions>() -> Registration {
    register::<AlertModel<K>>(format!("{PROVIDER_TYPE_NAME}_{}_alert", K::NAME))
}

fn registry() -> Vec<Registration> {
    vec![
        register::<PipelineModel>(format!("{PROVIDER_TYPE_NAME}_pipeline")),
        register::<SharedSourceModel>(format!("{PROVIDER_TYPE_NAME}_shared_source")),
        register::<AccessKeyModel>(format!("{PROVIDER_TYPE_NAME}_access_key")),
        source::<HttpSourceOptions>(),
        source::<DemoSourceOptions>(),
        source::<KafkaSourceOptions>(),
        source::<S3SourceOptions>(),
        source::<AgentSourceOptions>(),
        source::<SplunkHecSourceOptions>(),
        source::<FluentSourceOptions>(),
        source::<LogstashSourceOptions>(),
        processor::<FilterOptions>(),
        processor::<RouteOptions>(),
        processor::<DedupeOptions>(),
        processor::<SampleOptions>(),
        processor::<ParseOptions>(),
        processor::<DropFieldsOptions>(),
        processor::<StringifyOptions>(),
        processor::<CompactFieldsOptions>(),
        processor::<UnrollOptions>(),
        processor::<FlattenFieldsOptions>(),
        destination::<BlackholeOptions>(),
        destination::<HttpDestinationOptions>(),
        destination::<MezmoOptions>(),
        destination::<KafkaDestinationOptions>(),
        destination::<S3DestinationOptions>(),
        destination::<DatadogLogsOptions>(),
        alert::<ThresholdOptions>(),
        alert::<ChangeOptions>(),
        alert::<AbsenceOptions>(),
    ]
}

/// The provider. Resources can be validated before [`configure`](Self::configure) but
/// CRUD needs a client.
pub struct PipelineProvider {
    registry: Vec<Registration>,
    store: Option<ApiStore>,
}

impl Default for PipelineProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineProvider {
    pub fn new() -> Self {
        Self {
            registry: registry(),
            store: None,
        }
    }

    /// A provider that is already configured with `client`.
    pub fn with_client(client: Arc<dyn Client>) -> Self {
        Self {
            registry: registry(),
            store: Some(ApiStore::new(client)),
        }
    }

    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            resources: self.registry.iter().map(|r| r.type_name.clone()).collect(),
        }
    }

    pub fn schema(&self) -> Schema {
        ProviderConfig::schema()
    }

    pub fn resource_schemas(&self) -> BTreeMap<String, Schema> {
        self.registry
            .iter()
            .map(|r| (r.type_name.clone(), (r.schema)()))
            .collect()
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    /// Validates the provider block and builds the HTTP client from it.
    pub fn configure(&mut self, config: &Value, diags: &mut Diagnostics) -> Option<()> {
        let config = ProviderConfig::from_value(config, diags)?;
        let settings = config.resolve(diags)?;
        match HttpClient::new(&settings) {
            Ok(client) => {
                info!(endpoint = %settings.endpoint, "Provider configured");
                self.store = Some(ApiStore::new(Arc::new(client)));
                Some(())
            }
            Err(e) => {
                diags.error("Unable to create API client", e.to_string());
                None
            }
        }
    }

    fn registration(&self, type_name: &str, diags: &mut Diagnostics) -> Option<&Registration> {
        let found = self.registry.iter().find(|r| r.type_name == type_name);
        if found.is_none() {
            diags.error(
                "Unknown resource type",
                format!("The provider does not support resource type \"{type_name}\"."),
            );
        }
        found
    }

    pub fn validate_resource_config(&self, type_name: &str, config: &Value, diags: &mut Diagnostics) {
        if let Some(registration) = self.registration(type_name, diags) {
            (registration.validate)(type_name, config, diags);
        }
    }

    /// Attributes whose change between `prior` and `planned` forces replacement.
    pub fn plan_resource_change(
        &self,
        type_name: &str,
        prior: &Value,
        planned: &Value,
        diags: &mut Diagnostics,
    ) -> Option<Vec<String>> {
        let registration = self.registration(type_name, diags)?;
        Some((registration.schema)().replacement_paths(prior, planned))
    }

    /// The resource serving `type_name`, bound to the configured client.
    pub fn resource(&self, type_name: &str, diags: &mut Diagnostics) -> Option<Box<dyn DynamicResource>> {
        let registration = self.registration(type_name, diags)?;
        let Some(store) = &self.store else {
            diags.error(
                "Provider not configured",
                format!("Configure the provider before managing \"{type_name}\" resources."),
            );
            return None;
        };
        debug!(type_name, "Building resource");
        Some((registration.build)(registration.type_name.clone(), store.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_framework::ResourceKey;
    use serde_json::json;
    use std::collections::HashSet;

    /// Sends a create plan through `to_api` and writes the resulting API object into a
    /// fresh model at the same key. Returns both states without the server-assigned `id`.
    pub(super) fn round_trip<M: ResourceModel>(config: &Value) -> Result<(Value, Value), String> {
        let schema = M::schema();
        let mut plan = config.clone();
        schema.apply_defaults(&mut plan);
        let mut diags = Diagnostics::new();
        schema.validate(&plan, &mut diags);
        let model: M = serde_json::from_value(plan).map_err(|e| e.to_string())?;
        model.validate(&mut diags);
        let api = model.to_api(None, &mut diags);
        if diags.has_errors() {
            return Err(format!("{diags:?}"));
        }
        let api = api.ok_or("to_api returned nothing")?;

        let mut state = M::from_key(&ResourceKey::nested(model.parents(), "created"));
        state.apply_api(&api);

        let without_id = |model: &M| -> Result<Value, String> {
            let mut value = serde_json::to_value(model).map_err(|e| e.to_string())?;
            if let Some(object) = value.as_object_mut() {
                object.remove("id");
            }
            Ok(value)
        };
        Ok((without_id(&model)?, without_id(&state)?))
    }

    fn sample_configs() -> BTreeMap<&'static str, Value> {
        let brokers = json!([{"host": "kafka-1.internal", "port": 9092}]);
        let aws = json!({"access_key_id": "AKIAEXAMPLE", "secret_access_key": "s3cr3t"});
        let alert = |extra: Value| {
            let mut config = json!({
                "pipeline_id": "p1",
                "component_kind": "source",
                "component_id": "s1",
                "event_type": "log",
                "name": "ingest health",
                "severity": "WARNING",
                "subject": "Ingest",
                "body": "Check the ingest source",
                "window_duration_minutes": 15,
                "service": {"name": "webhook", "uri": "https://hooks.example.com/alerts"}
            });
            if let (Some(config), Some(extra)) = (config.as_object_mut(), extra.as_object()) {
                config.extend(extra.clone());
            }
            config
        };

        BTreeMap::from([
            ("pipeline_pipeline", json!({"title": "edge"})),
            (
                "pipeline_shared_source",
                json!({"title": "ingest", "description": "shared http", "type": "http"}),
            ),
            ("pipeline_access_key", json!({"title": "ci", "source_id": "ss1"})),
            (
                "pipeline_http_source",
                json!({
                    "pipeline_id": "p1", "title": "web", "description": "public ingest",
                    "decoding": "ndjson", "shared_source_id": "ss1", "capture_metadata": true,
                    "gateway_route_id": "route-1"
                }),
            ),
            ("pipeline_demo_source", json!({"pipeline_id": "p1", "format": "nginx"})),
            (
                "pipeline_kafka_source",
                json!({
                    "pipeline_id": "p1", "brokers": brokers, "topics": ["logs", "audit"],
                    "group_id": "pipeline", "sasl": {"username": "svc", "password": "pw"}
                }),
            ),
            (
                "pipeline_s3_source",
                json!({
                    "pipeline_id": "p1", "auth": aws, "region": "us-east-1",
                    "sqs_queue_url": "https://sqs.us-east-1.amazonaws.com/123/events",
                    "compression": "gzip"
                }),
            ),
            ("pipeline_agent_source", json!({"pipeline_id": "p1"})),
            (
                "pipeline_splunk_hec_source",
                json!({"pipeline_id": "p1", "capture_metadata": true}),
            ),
            ("pipeline_fluent_source", json!({"pipeline_id": "p1", "decoding": "text"})),
            ("pipeline_logstash_source", json!({"pipeline_id": "p1", "format": "text"})),
            (
                "pipeline_filter_processor",
                json!({
                    "pipeline_id": "p1", "inputs": ["s1"], "action": "allow",
                    "conditional": {
                        "expressions": [{"field": ".level", "operator": "equal", "value_string": "error"}],
                        "logical_operation": "OR"
                    }
                }),
            ),
            (
                "pipeline_route_processor",
                json!({
                    "pipeline_id": "p1", "inputs": ["s1"],
                    "conditionals": [{
                        "label": "server-errors",
                        "expressions": [{"field": ".status", "operator": "greater_or_equal", "value_number": 500.0}]
                    }]
                }),
            ),
            (
                "pipeline_dedupe_processor",
                json!({"pipeline_id": "p1", "inputs": ["s1"], "fields": [".message"], "number_of_events": 1000}),
            ),
            (
                "pipeline_sample_processor",
                json!({
                    "pipeline_id": "p1", "inputs": ["s1"], "rate": 10,
                    "always_include": {"expressions": [{"field": ".level", "operator": "exists"}]}
                }),
            ),
            (
                "pipeline_parse_processor",
                json!({
                    "pipeline_id": "p1", "inputs": ["s1"], "field": ".message",
                    "parser": "grok_parser", "pattern": "%{WORD:verb}", "target_field": ".parsed"
                }),
            ),
            (
                "pipeline_drop_fields_processor",
                json!({"pipeline_id": "p1", "inputs": ["s1"], "fields": [".secret"]}),
            ),
            ("pipeline_stringify_processor", json!({"pipeline_id": "p1", "inputs": ["s1"]})),
            (
                "pipeline_compact_fields_processor",
                json!({"pipeline_id": "p1", "inputs": ["s1"], "fields": [".payload"], "compact_array": false}),
            ),
            (
                "pipeline_unroll_processor",
                json!({"pipeline_id": "p1", "inputs": ["s1"], "field": ".items", "values_only": false}),
            ),
            (
                "pipeline_flatten_fields_processor",
                json!({"pipeline_id": "p1", "inputs": ["s1"], "fields": [".nested"], "delimiter": "."}),
            ),
            (
                "pipeline_blackhole_destination",
                json!({"pipeline_id": "p1", "inputs": ["t1"], "ack_enabled": false}),
            ),
            (
                "pipeline_http_destination",
                json!({
                    "pipeline_id": "p1", "inputs": ["t1"], "uri": "https://collector.example.com/ingest",
                    "encoding": "ndjson", "auth": {"strategy": "bearer", "token": "tkn"},
                    "headers": {"x-env": "prod"}
                }),
            ),
            (
                "pipeline_mezmo_destination",
                json!({
                    "pipeline_id": "p1", "inputs": ["t1"], "ingestion_key": "key",
                    "hostname": "edge-1", "tags": ["prod"], "app": "router"
                }),
            ),
            (
                "pipeline_kafka_destination",
                json!({
                    "pipeline_id": "p1", "inputs": ["t1"], "brokers": brokers, "topic": "events",
                    "event_key_field": ".id", "compression": "zstd"
                }),
            ),
            (
                "pipeline_s3_destination",
                json!({
                    "pipeline_id": "p1", "inputs": ["t1"], "auth": aws, "region": "eu-west-1",
                    "bucket": "archive", "prefix": "logs/"
                }),
            ),
            (
                "pipeline_datadog_logs_destination",
                json!({"pipeline_id": "p1", "inputs": ["t1"], "api_key": "dd-key", "site": "eu1"}),
            ),
            (
                "pipeline_threshold_alert",
                alert(json!({"operator": ">", "threshold": 100.0})),
            ),
            (
                "pipeline_change_alert",
                alert(json!({"operator": ">=", "percent_change": 25.5, "active": false})),
            ),
            ("pipeline_absence_alert", alert(json!({"inputs": ["s1"]}))),
        ])
    }

    #[test]
    fn test_every_resource_type_round_trips_through_api() {
        let samples = sample_configs();
        let registry = registry();
        assert_eq!(samples.len(), registry.len());

        for registration in &registry {
            let name = registration.type_name.as_str();
            let config = samples
                .get(name)
                .unwrap_or_else(|| panic!("no sample configuration for {name}"));
            let (planned, state) =
                (registration.round_trip)(config).unwrap_or_else(|e| panic!("{name}: {e}"));
            assert_eq!(planned, state, "{name}");
        }
    }

    #[test]
    fn test_registry_names_are_unique_and_prefixed() {
        let metadata = PipelineProvider::new().metadata();
        assert_eq!(metadata.type_name, "pipeline");
        assert_eq!(metadata.resources.len(), 30);
        let unique: HashSet<_> = metadata.resources.iter().collect();
        assert_eq!(unique.len(), metadata.resources.len());
        assert!(metadata.resources.iter().all(|r| r.starts_with("pipeline_")));
        for name in [
            "pipeline_pipeline",
            "pipeline_http_source",
            "pipeline_splunk_hec_source",
            "pipeline_flatten_fields_processor",
            "pipeline_datadog_logs_destination",
            "pipeline_absence_alert",
        ] {
            assert!(metadata.resources.iter().any(|r| r == name), "{name}");
        }
    }

    #[test]
    fn test_unknown_and_unconfigured_are_diagnostics() {
        let provider = PipelineProvider::new();
        let mut diags = Diagnostics::new();
        assert!(provider.resource("pipeline_nope", &mut diags).is_none());
        assert_eq!(diags.iter().next().unwrap().summary, "Unknown resource type");

        let mut diags = Diagnostics::new();
        assert!(provider.resource("pipeline_pipeline", &mut diags).is_none());
        assert_eq!(diags.iter().next().unwrap().summary, "Provider not configured");
    }

    #[test]
    fn test_validation_works_before_configure() {
        let provider = PipelineProvider::new();
        let mut diags = Diagnostics::new();
        provider.validate_resource_config("pipeline_pipeline", &json!({"title": ""}), &mut diags);
        assert_eq!(diags.iter().next().unwrap().summary, "Invalid Attribute Value Length");

        let mut diags = Diagnostics::new();
        let replace = provider
            .plan_resource_change(
                "pipeline_filter_processor",
                &json!({"pipeline_id": "p1"}),
                &json!({"pipeline_id": "p2"}),
                &mut diags,
            )
            .unwrap();
        assert_eq!(replace, vec!["pipeline_id"]);
    }

    #[test]
    fn test_configure_reports_missing_credentials() {
        let mut provider = PipelineProvider::new();
        let mut diags = Diagnostics::new();
        let configured = provider.configure(
            &json!({"auth_key": "k", "endpoint": "mailto:someone@example.com"}),
            &mut diags,
        );
        assert!(configured.is_none());
        assert!(!provider.is_configured());
        assert_eq!(diags.iter().next().unwrap().summary, "Invalid endpoint");
    }
}
