use serde::{Deserialize, Serialize};

/// A key granting ingestion access to a shared source.
///
/// The secret `key` is only present in the response to the create call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessKey {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    pub source_id: String,
    #[serde(default, skip_serializing)]
    pub key: Option<String>,
}
