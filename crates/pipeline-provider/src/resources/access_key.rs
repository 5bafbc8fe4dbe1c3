//! `pipeline_access_key`: a credential for sending data to a shared source.
//!
//! The secret is only returned by the create call, so state keeps the value it got then.
//! Keys are immutable: every configurable attribute forces replacement.

use crate::model::AccessKey;
use provider_framework::schema::{Attribute, Schema, Validator};
use provider_framework::{Diagnostics, ResourceKey, ResourceModel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessKeyModel {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub source_id: String,
    #[serde(default)]
    pub key: Option<String>,
}

impl ResourceModel for AccessKeyModel {
    type Api = AccessKey;

    fn schema() -> Schema {
        Schema::new("An ingestion key for a shared source.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "title",
                Attribute::required_string()
                    .requires_replace()
                    .with_validator(Validator::LengthBetween { min: 1, max: 256 }),
            )
            .with_attribute(
                "source_id",
                Attribute::required_string()
                    .requires_replace()
                    .described("Id of the shared source the key grants access to."),
            )
            .with_attribute(
                "key",
                Attribute::computed_string()
                    .sensitive()
                    .described("The secret. Only available after create."),
            )
    }

    fn to_api(&self, prior: Option<&Self>, diags: &mut Diagnostics) -> Option<AccessKey> {
        if prior.is_some() {
            diags.error(
                "Access keys cannot be updated",
                "Change the title or source_id to replace the access key instead.",
            );
            return None;
        }
        Some(AccessKey {
            id: String::new(),
            title: self.title.clone(),
            source_id: self.source_id.clone(),
            key: None,
        })
    }

    fn apply_api(&mut self, api: &AccessKey) {
        self.id = Some(api.id.clone());
        self.title = api.title.clone();
        self.source_id = api.source_id.clone();
        if api.key.is_some() {
            self.key = api.key.clone();
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_is_rejected() {
        let prior = AccessKeyModel {
            id: Some("ak1".into()),
            title: "ci".into(),
            source_id: "ss1".into(),
            key: Some("secret".into()),
        };
        let mut diags = Diagnostics::new();
        assert!(prior.to_api(Some(&prior), &mut diags).is_none());
        assert_eq!(diags.iter().next().unwrap().summary, "Access keys cannot be updated");
    }

    #[test]
    fn test_read_keeps_secret_from_create() {
        let mut state = AccessKeyModel {
            id: Some("ak1".into()),
            title: "ci".into(),
            source_id: "ss1".into(),
            key: Some("secret".into()),
        };
        state.apply_api(&AccessKey {
            id: "ak1".into(),
            title: "ci".into(),
            source_id: "ss1".into(),
            key: None,
        });
        assert_eq!(state.key.as_deref(), Some("secret"));
    }
}
