use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An alert attached to one component of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub component_kind: String,
    pub component_id: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub alert_config: Map<String, Value>,
}

fn default_active() -> bool {
    true
}

/// The component an alert is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertTarget {
    pub pipeline_id: String,
    /// `source`, `transform` or `sink`.
    pub component_kind: String,
    pub component_id: String,
}
