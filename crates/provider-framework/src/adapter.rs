//! # Generic Resource Adapter
//!
//! This module defines the `ResourceAdapter`, the CRUD shim that binds a [`ResourceModel`]
//! to a [`Store`]. It is written once and serves every resource type: sources, processors,
//! destinations, alerts, pipelines, access keys and shared sources all run through the
//! same lifecycle code.

use crate::diagnostics::Diagnostics;
use crate::error::FrameworkError;
use crate::model::{ResourceKey, ResourceModel};
use crate::resource::DynamicResource;
use crate::schema::Schema;
use crate::store::Store;
use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

/// The generic adapter that serves one resource type.
///
/// ## Operations
///
/// * **Create**:
///     1. Fills schema defaults into the plan and validates it. Computed attributes
///        must not be set.
///     2. Converts the plan with [`ResourceModel::to_api`] (no prior state).
///     3. Calls [`Store::create`] under the model's parents.
///     4. Writes the response back with [`ResourceModel::apply_api`].
///
/// * **Read**:
///     1. Looks the object up by the key stored in state.
///     2. A [`FrameworkError::NotFound`] removes the resource from state instead of failing,
///        so the next plan recreates it.
///
/// * **Update**:
///     1. Converts the plan with the prior state, which carries `id` and generation
///        counters forward and enforces immutable attributes.
///     2. Calls [`Store::update`] at the prior state's key.
///
/// * **Delete**:
///     1. Calls [`Store::delete`]. A not-found response means the object is already gone
///        and is not an error.
///
/// * **Import**:
///     1. Parses the import id into a [`ResourceKey`], reads the object and builds state
///        from it. A missing object is an error here.
pub struct ResourceAdapter<M: ResourceModel, S: Store<M::Api>> {
    type_name: String,
    store: S,
    _model: PhantomData<fn() -> M>,
}

impl<M: ResourceModel, S: Store<M::Api>> ResourceAdapter<M, S> {
    pub fn new(type_name: impl Into<String>, store: S) -> Self {
        Self {
            type_name: type_name.into(),
            store,
            _model: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn decode(&self, value: Value, what: &str, diags: &mut Diagnostics) -> Option<M> {
        match serde_json::from_value(value) {
            Ok(model) => Some(model),
            Err(e) => {
                diags.error(
                    format!("Invalid {what} for {}", self.type_name),
                    e.to_string(),
                );
                None
            }
        }
    }

    fn encode(&self, model: &M, diags: &mut Diagnostics) -> Option<Value> {
        match serde_json::to_value(model) {
            Ok(value) => Some(value),
            Err(e) => {
                diags.error(format!("Cannot encode state for {}", self.type_name), e.to_string());
                None
            }
        }
    }

    /// Defaults, schema validation and model validation for a plan. A create plan has no
    /// prior state, so it is held to the strict rules and cannot set computed attributes.
    fn prepare(&self, mut plan: Value, creating: bool, diags: &mut Diagnostics) -> Option<M> {
        let schema = M::schema();
        schema.apply_defaults(&mut plan);
        if creating {
            schema.validate(&plan, diags);
        } else {
            schema.validate_planned(&plan, diags);
        }
        if diags.has_errors() {
            return None;
        }
        let model = self.decode(plan, "plan", diags)?;
        model.validate(diags);
        if diags.has_errors() {
            return None;
        }
        Some(model)
    }

    fn report(&self, action: &str, error: &FrameworkError, diags: &mut Diagnostics) {
        warn!(type_name = %self.type_name, action, error = %error, "Backend call failed");
        diags.error(format!("Error {action} {}", self.type_name), error.to_string());
    }

    fn require_key(&self, model: &M, action: &str, diags: &mut Diagnostics) -> Option<ResourceKey> {
        let key = model.key();
        if key.is_none() {
            diags.error(
                format!("Error {action} {}", self.type_name),
                "The resource state has no id.",
            );
        }
        key
    }

    pub async fn create_model(&self, plan: M, diags: &mut Diagnostics) -> Option<M> {
        debug!(type_name = %self.type_name, ?plan, "Create");
        let api = plan.to_api(None, diags)?;
        if diags.has_errors() {
            return None;
        }
        match self.store.create(&plan.parents(), &api).await {
            Ok(created) => {
                let mut state = plan;
                state.apply_api(&created);
                info!(type_name = %self.type_name, id = state.id().unwrap_or_default(), "Created");
                Some(state)
            }
            Err(e) => {
                self.report("creating", &e, diags);
                None
            }
        }
    }

    pub async fn read_model(&self, state: M, diags: &mut Diagnostics) -> Option<Option<M>> {
        let key = self.require_key(&state, "reading", diags)?;
        debug!(type_name = %self.type_name, %key, "Read");
        match self.store.read(&key).await {
            Ok(api) => {
                let mut refreshed = state;
                refreshed.apply_api(&api);
                Some(Some(refreshed))
            }
            Err(e) if e.is_not_found() => {
                warn!(type_name = %self.type_name, %key, "Not found, removing from state");
                Some(None)
            }
            Err(e) => {
                self.report("reading", &e, diags);
                None
            }
        }
    }

    pub async fn update_model(&self, prior: M, plan: M, diags: &mut Diagnostics) -> Option<M> {
        let key = self.require_key(&prior, "updating", diags)?;
        debug!(type_name = %self.type_name, %key, ?plan, "Update");
        let api = plan.to_api(Some(&prior), diags)?;
        if diags.has_errors() {
            return None;
        }
        match self.store.update(&key, &api).await {
            Ok(updated) => {
                let mut state = plan;
                state.apply_api(&updated);
                info!(type_name = %self.type_name, %key, "Updated");
                Some(state)
            }
            Err(e) => {
                self.report("updating", &e, diags);
                None
            }
        }
    }

    pub async fn delete_model(&self, state: M, diags: &mut Diagnostics) -> Option<()> {
        let key = self.require_key(&state, "deleting", diags)?;
        debug!(type_name = %self.type_name, %key, "Delete");
        match self.store.delete(&key).await {
            Ok(()) => {
                info!(type_name = %self.type_name, %key, "Deleted");
                Some(())
            }
            Err(e) if e.is_not_found() => {
                info!(type_name = %self.type_name, %key, "Already deleted");
                Some(())
            }
            Err(e) => {
                self.report("deleting", &e, diags);
                None
            }
        }
    }

    pub async fn import_model(&self, raw_id: &str, diags: &mut Diagnostics) -> Option<M> {
        let key = match M::parse_import_id(raw_id) {
            Ok(key) => key,
            Err(detail) => {
                diags.error(format!("Invalid import id for {}", self.type_name), detail);
                return None;
            }
        };
        match self.store.read(&key).await {
            Ok(api) => {
                let mut state = M::from_key(&key);
                state.apply_api(&api);
                info!(type_name = %self.type_name, %key, "Imported");
                Some(state)
            }
            Err(e) if e.is_not_found() => {
                diags.error(
                    format!("Error importing {}", self.type_name),
                    format!("Cannot import non-existent remote object \"{key}\"."),
                );
                None
            }
            Err(e) => {
                self.report("importing", &e, diags);
                None
            }
        }
    }
}

/// Checks a user configuration for `M` without a backend: schema rules first, then the
/// model's own cross-attribute rules on the configuration with defaults filled in.
pub fn validate_config<M: ResourceModel>(type_name: &str, config: &Value, diags: &mut Diagnostics) {
    let schema = M::schema();
    schema.validate(config, diags);
    if diags.has_errors() {
        return;
    }
    let mut with_defaults = config.clone();
    schema.apply_defaults(&mut with_defaults);
    match serde_json::from_value::<M>(with_defaults) {
        Ok(model) => model.validate(diags),
        Err(e) => diags.error(format!("Invalid configuration for {type_name}"), e.to_string()),
    }
}

#[async_trait]
impl<M, S> DynamicResource for ResourceAdapter<M, S>
where
    M: ResourceModel,
    S: Store<M::Api>,
{
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> Schema {
        M::schema()
    }

    fn validate(&self, config: &Value, diags: &mut Diagnostics) {
        validate_config::<M>(&self.type_name, config, diags);
    }

    fn plan_update(&self, prior: &Value, planned: &Value) -> Vec<String> {
        M::schema().replacement_paths(prior, planned)
    }

    async fn create(&self, plan: Value, diags: &mut Diagnostics) -> Option<Value> {
        let plan = self.prepare(plan, true, diags)?;
        let state = self.create_model(plan, diags).await?;
        self.encode(&state, diags)
    }

    async fn read(&self, state: Value, diags: &mut Diagnostics) -> Option<Option<Value>> {
        let state = self.decode(state, "state", diags)?;
        match self.read_model(state, diags).await? {
            Some(refreshed) => self.encode(&refreshed, diags).map(Some),
            None => Some(None),
        }
    }

    async fn update(&self, prior: Value, plan: Value, diags: &mut Diagnostics) -> Option<Value> {
        let prior = self.decode(prior, "prior state", diags)?;
        let plan = self.prepare(plan, false, diags)?;
        let state = self.update_model(prior, plan, diags).await?;
        self.encode(&state, diags)
    }

    async fn delete(&self, state: Value, diags: &mut Diagnostics) -> Option<()> {
        let state = self.decode(state, "state", diags)?;
        self.delete_model(state, diags).await
    }

    async fn import_state(&self, id: &str, diags: &mut Diagnostics) -> Option<Value> {
        let state = self.import_model(id, diags).await?;
        self.encode(&state, diags)
    }
}
