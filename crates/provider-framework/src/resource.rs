//! # DynamicResource Trait
//!
//! Object-safe view of a resource over raw JSON values, so a provider can keep a single
//! registry of heterogeneous resources keyed by type name and dispatch lifecycle calls
//! coming from the host.

use crate::diagnostics::Diagnostics;
use crate::schema::Schema;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait DynamicResource: Send + Sync {
    /// Full type name, e.g. `pipeline_http_source`.
    fn type_name(&self) -> &str;

    fn schema(&self) -> Schema;

    /// Checks a configuration without touching the backend.
    fn validate(&self, config: &Value, diags: &mut Diagnostics);

    /// Attributes whose change forces the resource to be destroyed and created again.
    fn plan_update(&self, prior: &Value, planned: &Value) -> Vec<String>;

    async fn create(&self, plan: Value, diags: &mut Diagnostics) -> Option<Value>;

    /// `Some(None)` means the remote object is gone and the resource should leave state.
    async fn read(&self, state: Value, diags: &mut Diagnostics) -> Option<Option<Value>>;

    async fn update(&self, prior: Value, plan: Value, diags: &mut Diagnostics) -> Option<Value>;

    async fn delete(&self, state: Value, diags: &mut Diagnostics) -> Option<()>;

    async fn import_state(&self, id: &str, diags: &mut Diagnostics) -> Option<Value>;
}
