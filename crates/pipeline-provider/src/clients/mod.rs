//! # Pipeline Service Clients
//!
//! [`Client`] is the seam between resources and the REST API. [`HttpClient`] is the real
//! implementation; [`ApiStore`] adapts any client to the framework's `Store` trait so the
//! generic adapter can drive it.

mod error;
mod http_client;
mod store;

pub use error::ClientError;
pub use http_client::{ClientSettings, HttpClient};
pub use store::ApiStore;

use crate::model::{AccessKey, Alert, AlertTarget, Pipeline, SharedSource, Sink, Source, Transform};
use async_trait::async_trait;

/// Operations offered by the pipeline service.
///
/// Component calls take the owning pipeline id first. Access keys cannot be updated.
#[async_trait]
pub trait Client: Send + Sync {
    async fn create_pipeline(&self, pipeline: &Pipeline) -> Result<Pipeline, ClientError>;
    async fn get_pipeline(&self, id: &str) -> Result<Pipeline, ClientError>;
    async fn update_pipeline(&self, id: &str, pipeline: &Pipeline) -> Result<Pipeline, ClientError>;
    async fn delete_pipeline(&self, id: &str) -> Result<(), ClientError>;

    async fn create_source(&self, pipeline_id: &str, source: &Source) -> Result<Source, ClientError>;
    async fn get_source(&self, pipeline_id: &str, id: &str) -> Result<Source, ClientError>;
    async fn update_source(
        &self,
        pipeline_id: &str,
        id: &str,
        source: &Source,
    ) -> Result<Source, ClientError>;
    async fn delete_source(&self, pipeline_id: &str, id: &str) -> Result<(), ClientError>;

    async fn create_transform(
        &self,
        pipeline_id: &str,
        transform: &Transform,
    ) -> Result<Transform, ClientError>;
    async fn get_transform(&self, pipeline_id: &str, id: &str) -> Result<Transform, ClientError>;
    async fn update_transform(
        &self,
        pipeline_id: &str,
        id: &str,
        transform: &Transform,
    ) -> Result<Transform, ClientError>;
    async fn delete_transform(&self, pipeline_id: &str, id: &str) -> Result<(), ClientError>;

    async fn create_sink(&self, pipeline_id: &str, sink: &Sink) -> Result<Sink, ClientError>;
    async fn get_sink(&self, pipeline_id: &str, id: &str) -> Result<Sink, ClientError>;
    async fn update_sink(&self, pipeline_id: &str, id: &str, sink: &Sink) -> Result<Sink, ClientError>;
    async fn delete_sink(&self, pipeline_id: &str, id: &str) -> Result<(), ClientError>;

    async fn create_alert(&self, target: &AlertTarget, alert: &Alert) -> Result<Alert, ClientError>;
    async fn get_alert(&self, target: &AlertTarget, id: &str) -> Result<Alert, ClientError>;
    async fn update_alert(
        &self,
        target: &AlertTarget,
        id: &str,
        alert: &Alert,
    ) -> Result<Alert, ClientError>;
    async fn delete_alert(&self, target: &AlertTarget, id: &str) -> Result<(), ClientError>;

    async fn create_shared_source(&self, source: &SharedSource) -> Result<SharedSource, ClientError>;
    async fn get_shared_source(&self, id: &str) -> Result<SharedSource, ClientError>;
    async fn update_shared_source(
        &self,
        id: &str,
        source: &SharedSource,
    ) -> Result<SharedSource, ClientError>;
    async fn delete_shared_source(&self, id: &str) -> Result<(), ClientError>;

    async fn create_access_key(&self, key: &AccessKey) -> Result<AccessKey, ClientError>;
    async fn get_access_key(&self, id: &str) -> Result<AccessKey, ClientError>;
    async fn delete_access_key(&self, id: &str) -> Result<(), ClientError>;
}
