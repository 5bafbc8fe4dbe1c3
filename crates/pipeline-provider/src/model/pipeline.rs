use serde::{Deserialize, Serialize};

/// A pipeline: the container every component lives in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Server timestamp of the last change.
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub origin: Option<String>,
}
