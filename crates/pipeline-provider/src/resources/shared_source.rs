use super::common::one_of;
use crate::model::SharedSource;
use provider_framework::schema::{Attribute, Schema, Validator};
use provider_framework::{Diagnostics, ResourceKey, ResourceModel};
use serde::{Deserialize, Serialize};

pub const SHARED_SOURCE_TYPES: [&str; 6] = [
    "http",
    "agent",
    "kinesis-firehose",
    "splunk-hec",
    "fluent",
    "logstash",
];

/// `pipeline_shared_source`: an ingestion endpoint that several pipelines' sources can use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedSourceModel {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResourceModel for SharedSourceModel {
    type Api = SharedSource;

    fn schema() -> Schema {
        Schema::new("A source endpoint that can be attached to many pipelines.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "title",
                Attribute::required_string()
                    .with_validator(Validator::LengthBetween { min: 1, max: 256 }),
            )
            .with_attribute("description", Attribute::optional_string())
            .with_attribute(
                "type",
                Attribute::required_string()
                    .requires_replace()
                    .with_validator(one_of(&SHARED_SOURCE_TYPES)),
            )
    }

    fn to_api(&self, prior: Option<&Self>, _diags: &mut Diagnostics) -> Option<SharedSource> {
        Some(SharedSource {
            id: prior.and_then(|p| p.id.clone()).unwrap_or_default(),
            title: self.title.clone(),
            description: self.description.clone(),
            kind: self.kind.clone(),
        })
    }

    fn apply_api(&mut self, api: &SharedSource) {
        self.id = Some(api.id.clone());
        self.title = api.title.clone();
        self.description = api.description.clone();
        self.kind = api.kind.clone();
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn from_key(key: &ResourceKey) -> Self {
        Self {
            id: Some(key.id.clone()),
            ..Default::default()
        }
    }
}
