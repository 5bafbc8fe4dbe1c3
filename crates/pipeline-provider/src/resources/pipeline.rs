use crate::model::Pipeline;
use provider_framework::schema::{Attribute, Schema, Validator};
use provider_framework::{Diagnostics, ResourceKey, ResourceModel};
use serde::{Deserialize, Serialize};

/// `pipeline_pipeline`: the container for sources, processors and destinations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineModel {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
}

impl ResourceModel for PipelineModel {
    type Api = Pipeline;

    fn schema() -> Schema {
        Schema::new("A pipeline that routes events from sources through processors to destinations.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "title",
                Attribute::required_string()
                    .with_validator(Validator::LengthBetween { min: 1, max: 512 }),
            )
            .with_attribute(
                "updated_at",
                Attribute::computed_string().described("Time of the last change, set by the service."),
            )
            .with_attribute(
                "origin",
                Attribute::computed_string().described("Where the pipeline was created."),
            )
    }

    fn to_api(&self, prior: Option<&Self>, _diags: &mut Diagnostics) -> Option<Pipeline> {
        Some(Pipeline {
            id: prior.and_then(|p| p.id.clone()).unwrap_or_default(),
            title: Some(self.title.clone()),
            updated_at: None,
            origin: None,
        })
    }

    fn apply_api(&mut self, api: &Pipeline) {
        self.id = Some(api.id.clone());
        if let Some(title) = &api.title {
            self.title = title.clone();
        }
        self.updated_at = api.updated_at.clone();
        self.origin = api.origin.clone();
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
    fn test_update_sends_prior_id_and_keeps_server_fields() {
        let prior = PipelineModel {
            id: Some("p1".into()),
            title: "old".into(),
            updated_at: Some("2024-01-01T00:00:00Z".into()),
            origin: Some("terraform".into()),
        };
        let plan = PipelineModel {
            title: "new".into(),
            ..prior.clone()
        };
        let mut diags = Diagnostics::new();
        let api = plan.to_api(Some(&prior), &mut diags).unwrap();
        assert_eq!(api.id, "p1");
        assert_eq!(api.title.as_deref(), Some("new"));

        let mut state = plan.clone();
        state.apply_api(&Pipeline {
            updated_at: Some("2024-02-01T00:00:00Z".into()),
            origin: Some("terraform".into()),
            ..api
        });
        assert_eq!(state.title, "new");
        assert_eq!(state.updated_at.as_deref(), Some("2024-02-01T00:00:00Z"));
    }
}
