//! Envelope models for pipeline components.
//!
//! Each model owns the attributes every component of its category has (`id`,
//! `pipeline_id`, `title`, ...) and flattens a per-kind options struct next to them.

use super::{check_immutable, from_user_config, to_user_config, ComponentOptions, Sharing, SourceOptions};
use crate::model::{Sink, Source, Transform};
use provider_framework::schema::{attributes, Attribute, AttributeType, Schema, Validator};
use provider_framework::{Diagnostics, ResourceKey, ResourceModel};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

const CAPTURE_METADATA: &str = "capture_metadata";
const ACK_ENABLED: &str = "ack_enabled";

fn envelope_attributes() -> BTreeMap<String, Attribute> {
    attributes([
        ("id", Attribute::computed_string().described("Component id assigned by the service.")),
        (
            "pipeline_id",
            Attribute::required_string()
                .requires_replace()
                .described("Id of the pipeline the component belongs to."),
        ),
        (
            "title",
            Attribute::optional_string().with_validator(Validator::LengthBetween { min: 1, max: 256 }),
        ),
        ("description", Attribute::optional_string()),
        ("generation_id", Attribute::computed_int64()),
    ])
}

fn inputs_attribute() -> Attribute {
    Attribute::optional_string_list()
        .with_default(Vec::<Value>::new())
        .with_validator(Validator::UniqueValues)
        .described("Ids of the components feeding this one.")
}

/// Deserializes options back out of `user_config`, keeping the current ones on failure.
fn refresh_options<K: ComponentOptions>(current: &mut K, user_config: &Map<String, Value>) {
    match from_user_config::<K>(user_config) {
        Ok(options) => *current = options,
        Err(e) => warn!(kind = K::NAME, error = %e, "Cannot read user_config from API response"),
    }
}

fn pipeline_import_id(raw: &str) -> Result<ResourceKey, String> {
    ResourceKey::parse(raw, 1)
}

/// A pipeline source of kind `K`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceModel<K> {
    #[serde(default)]
    pub id: Option<String>,
    pub pipeline_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub generation_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_metadata: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_route_id: Option<String>,
    #[serde(flatten)]
    pub options: K,
}

impl<K: SourceOptions> ResourceModel for SourceModel<K> {
    type Api = Source;

    fn schema() -> Schema {
        let mut schema = Schema::new(K::DESCRIPTION)
            .with_attributes(envelope_attributes())
            .with_attributes(K::attributes());
        if K::SHARING != Sharing::None {
            schema = schema
                .with_attribute(
                    "shared_source_id",
                    Attribute::optional_computed(AttributeType::String)
                        .described("Shared source backing this source. Cannot be changed once set."),
                )
                .with_attribute(
                    CAPTURE_METADATA,
                    Attribute::optional_bool()
                        .with_default(false)
                        .described("Attach request metadata to each event."),
                );
        }
        if K::SHARING == Sharing::SharedWithGateway {
            schema = schema.with_attribute(
                "gateway_route_id",
                Attribute::optional_computed(AttributeType::String)
                    .described("Ingestion gateway route. Cannot be changed once set."),
            );
        }
        schema
    }

    fn to_api(&self, prior: Option<&Self>, diags: &mut Diagnostics) -> Option<Source> {
        if let Some(prior) = prior {
            check_immutable(
                "shared_source_id",
                prior.shared_source_id.as_deref(),
                self.shared_source_id.as_deref(),
                diags,
            );
            check_immutable(
                "gateway_route_id",
                prior.gateway_route_id.as_deref(),
                self.gateway_route_id.as_deref(),
                diags,
            );
            if diags.has_errors() {
                return None;
            }
        }

        let mut user_config = to_user_config(&self.options, diags)?;
        if K::SHARING != Sharing::None {
            user_config.insert(
                CAPTURE_METADATA.to_string(),
                Value::Bool(self.capture_metadata.unwrap_or(false)),
            );
        }

        Some(Source {
            id: prior.and_then(|p| p.id.clone()).unwrap_or_default(),
            kind: K::API_TYPE.to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            user_config,
            generation_id: prior.and_then(|p| p.generation_id),
            gateway_route_id: self
                .gateway_route_id
                .clone()
                .or_else(|| prior.and_then(|p| p.gateway_route_id.clone())),
            shared_source_id: self
                .shared_source_id
                .clone()
                .or_else(|| prior.and_then(|p| p.shared_source_id.clone())),
        })
    }

    fn apply_api(&mut self, api: &Source) {
        self.id = Some(api.id.clone());
        self.title = api.title.clone();
        self.description = api.description.clone();
        self.generation_id = api.generation_id;
        if K::SHARING != Sharing::None {
            self.shared_source_id = api.shared_source_id.clone();
            self.capture_metadata = Some(
                api.user_config
                    .get(CAPTURE_METADATA)
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            );
        }
        if K::SHARING == Sharing::SharedWithGateway {
            self.gateway_route_id = api.gateway_route_id.clone();
        }
        refresh_options(&mut self.options, &api.user_config);
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn parents(&self) -> Vec<String> {
        vec![self.pipeline_id.clone()]
    }

    fn parse_import_id(raw: &str) -> Result<ResourceKey, String> {
        pipeline_import_id(raw)
    }

    fn from_key(key: &ResourceKey) -> Self {
        Self {
            id: Some(key.id.clone()),
            pipeline_id: key.parent(0).unwrap_or_default().to_string(),
            ..Default::default()
        }
    }

    fn validate(&self, diags: &mut Diagnostics) {
        self.options.validate(diags);
    }
}

/// A processor of kind `K`, stored by the service as a transform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorModel<K> {
    #[serde(default)]
    pub id: Option<String>,
    pub pipeline_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub generation_id: Option<i64>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(flatten)]
    pub options: K,
}

impl<K: ComponentOptions> ResourceModel for ProcessorModel<K> {
    type Api = Transform;

    fn schema() -> Schema {
        Schema::new(K::DESCRIPTION)
            .with_attributes(envelope_attributes())
            .with_attribute("inputs", inputs_attribute())
            .with_attributes(K::attributes())
    }

    fn to_api(&self, prior: Option<&Self>, diags: &mut Diagnostics) -> Option<Transform> {
        Some(Transform {
            id: prior.and_then(|p| p.id.clone()).unwrap_or_default(),
            kind: K::API_TYPE.to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            user_config: to_user_config(&self.options, diags)?,
            inputs: self.inputs.clone(),
            generation_id: prior.and_then(|p| p.generation_id),
        })
    }

    fn apply_api(&mut self, api: &Transform) {
        self.id = Some(api.id.clone());
        self.title = api.title.clone();
        self.description = api.description.clone();
        self.generation_id = api.generation_id;
        self.inputs = api.inputs.clone();
        refresh_options(&mut self.options, &api.user_config);
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn parents(&self) -> Vec<String> {
        vec![self.pipeline_id.clone()]
    }

    fn parse_import_id(raw: &str) -> Result<ResourceKey, String> {
        pipeline_import_id(raw)
    }

    fn from_key(key: &ResourceKey) -> Self {
        Self {
            id: Some(key.id.clone()),
            pipeline_id: key.parent(0).unwrap_or_default().to_string(),
            ..Default::default()
        }
    }

    fn validate(&self, diags: &mut Diagnostics) {
        self.options.validate(diags);
    }
}

fn default_ack_enabled() -> bool {
    true
}

/// A destination of kind `K`, stored by the service as a sink.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationModel<K> {
    #[serde(default)]
    pub id: Option<String>,
    pub pipeline_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub generation_id: Option<i64>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default = "default_ack_enabled")]
    pub ack_enabled: bool,
    #[serde(flatten)]
    pub options: K,
}

impl<K: ComponentOptions> ResourceModel for DestinationModel<K> {
    type Api = Sink;

    fn schema() -> Schema {
        Schema::new(K::DESCRIPTION)
            .with_attributes(envelope_attributes())
            .with_attribute("inputs", inputs_attribute())
            .with_attribute(
                ACK_ENABLED,
                Attribute::optional_bool()
                    .with_default(true)
                    .described("Acknowledge events only once this destination has delivered them."),
            )
            .with_attributes(K::attributes())
    }

    fn to_api(&self, prior: Option<&Self>, diags: &mut Diagnostics) -> Option<Sink> {
        let mut user_config = to_user_config(&self.options, diags)?;
        user_config.insert(ACK_ENABLED.to_string(), Value::Bool(self.ack_enabled));
        Some(Sink {
            id: prior.and_then(|p| p.id.clone()).unwrap_or_default(),
            kind: K::API_TYPE.to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            user_config,
            inputs: self.inputs.clone(),
            generation_id: prior.and_then(|p| p.generation_id),
        })
    }

    fn apply_api(&mut self, api: &Sink) {
        self.id = Some(api.id.clone());
        self.title = api.title.clone();
        self.description = api.description.clone();
        self.generation_id = api.generation_id;
        self.inputs = api.inputs.clone();
        self.ack_enabled = api
            .user_config
            .get(ACK_ENABLED)
            .and_then(Value::as_bool)
            .unwrap_or(true);
        refresh_options(&mut self.options, &api.user_config);
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn parents(&self) -> Vec<String> {
        vec![self.pipeline_id.clone()]
    }

    fn parse_import_id(raw: &str) -> Result<ResourceKey, String> {
        pipeline_import_id(raw)
    }

    fn from_key(key: &ResourceKey) -> Self {
        Self {
            id: Some(key.id.clone()),
            pipeline_id: key.parent(0).unwrap_or_default().to_string(),
            ack_enabled: true,
            ..Default::default()
        }
    }

    fn validate(&self, diags: &mut Diagnostics) {
        self.options.validate(diags);
    }
}
