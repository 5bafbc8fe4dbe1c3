//! Adapts a [`Client`] to the framework's [`Store`] trait, one impl per API object.
//!
//! Keys follow the import id layout: components are keyed under their pipeline, alerts
//! under `pipeline/kind/component`.

use super::Client;
use crate::model::{AccessKey, Alert, AlertTarget, Pipeline, SharedSource, Sink, Source, Transform};
use async_trait::async_trait;
use provider_framework::{FrameworkError, ResourceKey, Store};
use std::sync::Arc;

/// A [`Store`] for every pipeline API object, backed by a shared [`Client`].
#[derive(Clone)]
pub struct ApiStore {
    client: Arc<dyn Client>,
}

impl ApiStore {
    pub fn new(client: Arc<dyn Client>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &dyn Client {
        self.client.as_ref()
    }
}

fn parent<'a>(parents: &'a [String], index: usize, what: &str) -> Result<&'a str, FrameworkError> {
    parents
        .get(index)
        .map(String::as_str)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| FrameworkError::InvalidKey(format!("missing {what}")))
}

fn alert_target(parents: &[String]) -> Result<AlertTarget, FrameworkError> {
    Ok(AlertTarget {
        pipeline_id: parent(parents, 0, "pipeline_id")?.to_string(),
        component_kind: parent(parents, 1, "component_kind")?.to_string(),
        component_id: parent(parents, 2, "component_id")?.to_string(),
    })
}

#[async_trait]
impl Store<Pipeline> for ApiStore {
    async fn create(&self, _parents: &[String], object: &Pipeline) -> Result<Pipeline, FrameworkError> {
        Ok(self.client.create_pipeline(object).await?)
    }

    async fn read(&self, key: &ResourceKey) -> Result<Pipeline, FrameworkError> {
        Ok(self.client.get_pipeline(&key.id).await?)
    }

    async fn update(&self, key: &ResourceKey, object: &Pipeline) -> Result<Pipeline, FrameworkError> {
        Ok(self.client.update_pipeline(&key.id, object).await?)
    }

    async fn delete(&self, key: &ResourceKey) -> Result<(), FrameworkError> {
        Ok(self.client.delete_pipeline(&key.id).await?)
    }
}

#[async_trait]
impl Store<Source> for ApiStore {
    async fn create(&self, parents: &[String], object: &Source) -> Result<Source, FrameworkError> {
        let pipeline_id = parent(parents, 0, "pipeline_id")?;
        Ok(self.client.create_source(pipeline_id, object).await?)
    }

    async fn read(&self, key: &ResourceKey) -> Result<Source, FrameworkError> {
        let pipeline_id = parent(&key.parents, 0, "pipeline_id")?;
        Ok(self.client.get_source(pipeline_id, &key.id).await?)
    }

    async fn update(&self, key: &ResourceKey, object: &Source) -> Result<Source, FrameworkError> {
        let pipeline_id = parent(&key.parents, 0, "pipeline_id")?;
        Ok(self.client.update_source(pipeline_id, &key.id, object).await?)
    }

    async fn delete(&self, key: &ResourceKey) -> Result<(), FrameworkError> {
        let pipeline_id = parent(&key.parents, 0, "pipeline_id")?;
        Ok(self.client.delete_source(pipeline_id, &key.id).await?)
    }
}

#[async_trait]
impl Store<Transform> for ApiStore {
    async fn create(&self, parents: &[String], object: &Transform) -> Result<Transform, FrameworkError> {
        let pipeline_id = parent(parents, 0, "pipeline_id")?;
        Ok(self.client.create_transform(pipeline_id, object).await?)
    }

    async fn read(&self, key: &ResourceKey) -> Result<Transform, FrameworkError> {
        let pipeline_id = parent(&key.parents, 0, "pipeline_id")?;
        Ok(self.client.get_transform(pipeline_id, &key.id).await?)
    }

    async fn update(&self, key: &ResourceKey, object: &Transform) -> Result<Transform, FrameworkError> {
        let pipeline_id = parent(&key.parents, 0, "pipeline_id")?;
        Ok(self.client.update_transform(pipeline_id, &key.id, object).await?)
    }

    async fn delete(&self, key: &ResourceKey) -> Result<(), FrameworkError> {
        let pipeline_id = parent(&key.parents, 0, "pipeline_id")?;
        Ok(self.client.delete_transform(pipeline_id, &key.id).await?)
    }
}

#[async_trait]
impl Store<Sink> for ApiStore {
    async fn create(&self, parents: &[String], object: &Sink) -> Result<Sink, FrameworkError> {
        let pipeline_id = parent(parents, 0, "pipeline_id")?;
        Ok(self.client.create_sink(pipeline_id, object).await?)
    }

    async fn read(&self, key: &ResourceKey) -> Result<Sink, FrameworkError> {
        let pipeline_id = parent(&key.parents, 0, "pipeline_id")?;
        Ok(self.client.get_sink(pipeline_id, &key.id).await?)
    }

    async fn update(&self, key: &ResourceKey, object: &Sink) -> Result<Sink, FrameworkError> {
        let pipeline_id = parent(&key.parents, 0, "pipeline_id")?;
        Ok(self.client.update_sink(pipeline_id, &key.id, object).await?)
    }

    async fn delete(&self, key: &ResourceKey) -> Result<(), FrameworkError> {
        let pipeline_id = parent(&key.parents, 0, "pipeline_id")?;
        Ok(self.client.delete_sink(pipeline_id, &key.id).await?)
    }
}

#[async_trait]
impl Store<Alert> for ApiStore {
    async fn create(&self, parents: &[String], object: &Alert) -> Result<Alert, FrameworkError> {
        let target = alert_target(parents)?;
        Ok(self.client.create_alert(&target, object).await?)
    }

    async fn read(&self, key: &ResourceKey) -> Result<Alert, FrameworkError> {
        let target = alert_target(&key.parents)?;
        Ok(self.client.get_alert(&target, &key.id).await?)
    }

    async fn update(&self, key: &ResourceKey, object: &Alert) -> Result<Alert, FrameworkError> {
        let target = alert_target(&key.parents)?;
        Ok(self.client.update_alert(&target, &key.id, object).await?)
    }

    async fn delete(&self, key: &ResourceKey) -> Result<(), FrameworkError> {
        let target = alert_target(&key.parents)?;
        Ok(self.client.delete_alert(&target, &key.id).await?)
    }
}

#[async_trait]
impl Store<SharedSource> for ApiStore {
    async fn create(
        &self,
        _parents: &[String],
        object: &SharedSource,
    ) -> Result<SharedSource, FrameworkError> {
        Ok(self.client.create_shared_source(object).await?)
    }

    async fn read(&self, key: &ResourceKey) -> Result<SharedSource, FrameworkError> {
        Ok(self.client.get_shared_source(&key.id).await?)
    }

    async fn update(
        &self,
        key: &ResourceKey,
        object: &SharedSource,
    ) -> Result<SharedSource, FrameworkError> {
        Ok(self.client.update_shared_source(&key.id, object).await?)
    }

    async fn delete(&self, key: &ResourceKey) -> Result<(), FrameworkError> {
        Ok(self.client.delete_shared_source(&key.id).await?)
    }
}

#[async_trait]
impl Store<AccessKey> for ApiStore {
    async fn create(&self, _parents: &[String], object: &AccessKey) -> Result<AccessKey, FrameworkError> {
        Ok(self.client.create_access_key(object).await?)
    }

    async fn read(&self, key: &ResourceKey) -> Result<AccessKey, FrameworkError> {
        Ok(self.client.get_access_key(&key.id).await?)
    }

    async fn update(&self, _key: &ResourceKey, _object: &AccessKey) -> Result<AccessKey, FrameworkError> {
        Err(FrameworkError::Unsupported(
            "Access keys cannot be updated".to_string(),
        ))
    }

    async fn delete(&self, key: &ResourceKey) -> Result<(), FrameworkError> {
        Ok(self.client.delete_access_key(&key.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_target_requires_all_parents() {
        let parents = vec!["p1".to_string(), "sink".to_string()];
        assert_eq!(
            alert_target(&parents),
            Err(FrameworkError::InvalidKey("missing component_id".into()))
        );

        let parents = vec!["p1".to_string(), "sink".to_string(), "k1".to_string()];
        let target = alert_target(&parents).unwrap();
        assert_eq!(target.component_kind, "sink");
        assert_eq!(target.component_id, "k1");
    }

    #[test]
    fn test_empty_parent_is_missing() {
        assert!(parent(&["".to_string()], 0, "pipeline_id").is_err());
    }
}
