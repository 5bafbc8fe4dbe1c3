//! Envelope model for alerts attached to a pipeline component.

use super::common::{alert_service_attributes, one_of, AlertService};
use super::{from_user_config, to_user_config, ComponentOptions};
use crate::model::Alert;
use provider_framework::schema::{attributes, Attribute, Schema, Validator};
use provider_framework::{Diagnostics, ResourceKey, ResourceModel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

pub const COMPONENT_KINDS: [&str; 3] = ["source", "transform", "sink"];

fn default_active() -> bool {
    true
}

/// Alert settings every alert kind shares; stored in `alert_config` next to the kind's
/// own options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct AlertSettings {
    #[serde(rename = "type")]
    kind: String,
    event_type: String,
    name: String,
    severity: String,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    window_duration_minutes: Option<i64>,
    service: AlertService,
}

/// An alert of kind `K`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertModel<K> {
    #[serde(default)]
    pub id: Option<String>,
    pub pipeline_id: String,
    pub component_kind: String,
    pub component_id: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub event_type: String,
    pub name: String,
    pub severity: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub window_duration_minutes: Option<i64>,
    pub service: AlertService,
    #[serde(flatten)]
    pub options: K,
}

fn envelope_attributes() -> BTreeMap<String, Attribute> {
    attributes([
        ("id", Attribute::computed_string()),
        ("pipeline_id", Attribute::required_string().requires_replace()),
        (
            "component_kind",
            Attribute::required_string()
                .requires_replace()
                .with_validator(one_of(&COMPONENT_KINDS)),
        ),
        ("component_id", Attribute::required_string().requires_replace()),
        (
            "inputs",
            Attribute::optional_string_list()
                .with_default(Vec::<Value>::new())
                .with_validator(Validator::UniqueValues),
        ),
        ("active", Attribute::optional_bool().with_default(true)),
        (
            "event_type",
            Attribute::required_string().with_validator(one_of(&["log", "metric"])),
        ),
        (
            "name",
            Attribute::required_string().with_validator(Validator::LengthBetween { min: 1, max: 256 }),
        ),
        (
            "severity",
            Attribute::required_string().with_validator(one_of(&["INFO", "WARNING", "ERROR"])),
        ),
        ("subject", Attribute::optional_string()),
        ("body", Attribute::optional_string()),
        (
            "window_duration_minutes",
            Attribute::optional_int64()
                .with_default(5)
                .with_validator(Validator::Int64Between { min: 1, max: 1440 }),
        ),
        ("service", Attribute::required_object(alert_service_attributes())),
    ])
}

impl<K: ComponentOptions> AlertModel<K> {
    fn settings(&self) -> AlertSettings {
        AlertSettings {
            kind: K::API_TYPE.to_string(),
            event_type: self.event_type.clone(),
            name: self.name.clone(),
            severity: self.severity.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
            window_duration_minutes: self.window_duration_minutes,
            service: self.service.clone(),
        }
    }
}

impl<K: ComponentOptions> ResourceModel for AlertModel<K> {
    type Api = Alert;

    fn schema() -> Schema {
        Schema::new(K::DESCRIPTION)
            .with_attributes(envelope_attributes())
            .with_attributes(K::attributes())
    }

    fn to_api(&self, prior: Option<&Self>, diags: &mut Diagnostics) -> Option<Alert> {
        let mut alert_config = to_user_config(&self.settings(), diags)?;
        alert_config.extend(to_user_config(&self.options, diags)?);
        Some(Alert {
            id: prior.and_then(|p| p.id.clone()).unwrap_or_default(),
            component_kind: self.component_kind.clone(),
            component_id: self.component_id.clone(),
            inputs: self.inputs.clone(),
            active: self.active,
            alert_config,
        })
    }

    fn apply_api(&mut self, api: &Alert) {
        self.id = Some(api.id.clone());
        self.component_kind = api.component_kind.clone();
        self.component_id = api.component_id.clone();
        self.inputs = api.inputs.clone();
        self.active = api.active;
        match from_user_config::<AlertSettings>(&api.alert_config) {
            Ok(settings) => {
                self.event_type = settings.event_type;
                self.name = settings.name;
                self.severity = settings.severity;
                self.subject = settings.subject;
                self.body = settings.body;
                self.window_duration_minutes = settings.window_duration_minutes;
                self.service = settings.service;
            }
            Err(e) => warn!(kind = K::NAME, error = %e, "Cannot read alert_config from API response"),
        }
        match from_user_config::<K>(&api.alert_config) {
            Ok(options) => self.options = options,
            Err(e) => warn!(kind = K::NAME, error = %e, "Cannot read alert options from API response"),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn parents(&self) -> Vec<String> {
        vec![
            self.pipeline_id.clone(),
            self.component_kind.clone(),
            self.component_id.clone(),
        ]
    }

    fn parse_import_id(raw: &str) -> Result<ResourceKey, String> {
        let key = ResourceKey::parse(raw, 3)?;
        match key.parent(1) {
            Some(kind) if COMPONENT_KINDS.contains(&kind) => Ok(key),
            other => Err(format!(
                "Expected the component kind to be one of {COMPONENT_KINDS:?}, got: {:?}",
                other.unwrap_or_default()
            )),
        }
    }

    fn from_key(key: &ResourceKey) -> Self {
        Self {
            id: Some(key.id.clone()),
            pipeline_id: key.parent(0).unwrap_or_default().to_string(),
            component_kind: key.parent(1).unwrap_or_default().to_string(),
            component_id: key.parent(2).unwrap_or_default().to_string(),
            active: true,
            ..Default::default()
        }
    }

    fn validate(&self, diags: &mut Diagnostics) {
        self.service.validate(diags);
        self.options.validate(diags);
    }
}
