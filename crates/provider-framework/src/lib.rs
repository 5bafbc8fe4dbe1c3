//! # Provider Framework
//!
//! Backend-agnostic building blocks for a declarative-resource provider: the pieces that
//! turn "plan in, state out" lifecycle calls into CRUD against a remote service.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into three layers:
//!
//! 1. **Model Layer** ([`ResourceModel`]) - the typed view of one resource type and its
//!    mapping to and from the backend object.
//! 2. **Lifecycle Layer** ([`ResourceAdapter`]) - Create/Read/Update/Delete/Import written
//!    once, including the "404 means gone" rules.
//! 3. **Backend Layer** ([`Store`]) - CRUD against the service, or against [`mock::MockStore`]
//!    in tests.
//!
//! [`DynamicResource`] erases the model type so a provider can keep every resource in one
//! registry keyed by type name. Failures never escape as `Err`: each operation pushes
//! [`Diagnostic`]s and returns `None`.
//!
//! ## Example
//!
//! ```rust
//! use provider_framework::mock::MockStore;
//! use provider_framework::schema::{Attribute, Schema};
//! use provider_framework::{Diagnostics, DynamicResource, ResourceAdapter, ResourceKey, ResourceModel};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Clone, Debug, Default, Serialize, Deserialize)]
//! struct Team { id: Option<String>, name: String }
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct ApiTeam { id: String, name: String }
//!
//! impl ResourceModel for Team {
//!     type Api = ApiTeam;
//!     fn schema() -> Schema {
//!         Schema::new("team")
//!             .with_attribute("id", Attribute::computed_string())
//!             .with_attribute("name", Attribute::required_string())
//!     }
//!     fn to_api(&self, prior: Option<&Self>, _: &mut Diagnostics) -> Option<ApiTeam> {
//!         let id = prior.and_then(|p| p.id.clone()).unwrap_or_default();
//!         Some(ApiTeam { id, name: self.name.clone() })
//!     }
//!     fn apply_api(&mut self, api: &ApiTeam) {
//!         self.id = Some(api.id.clone());
//!         self.name = api.name.clone();
//!     }
//!     fn id(&self) -> Option<&str> { self.id.as_deref() }
//!     fn from_key(key: &ResourceKey) -> Self { Self { id: Some(key.id.clone()), ..Default::default() } }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MockStore::new();
//!     store.expect_create().return_ok(ApiTeam { id: "t1".into(), name: "core".into() });
//!
//!     let adapter = ResourceAdapter::<Team, _>::new("example_team", store.clone());
//!     let mut diags = Diagnostics::new();
//!     let state = adapter.create(json!({ "name": "core" }), &mut diags).await.unwrap();
//!     assert_eq!(state["id"], "t1");
//!     store.verify();
//! }
//! ```

pub mod adapter;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod mock;
pub mod model;
pub mod resource;
pub mod schema;
pub mod store;

// Re-export core types for convenience
pub use adapter::{validate_config, ResourceAdapter};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::FrameworkError;
pub use model::{ResourceKey, ResourceModel};
pub use resource::DynamicResource;
pub use schema::{Attribute, AttributeType, Schema, Validator};
pub use store::Store;
