//! JSON request handling for the command-line host.
//!
//! A request names the values an operation needs; unused fields are ignored:
//!
//! ```json
//! {"provider": {"auth_key": "..."}, "config": {...}, "state": {...}, "prior": {...}, "id": "p1/s1"}
//! ```

use crate::provider::PipelineProvider;
use clap::ValueEnum;
use provider_framework::Diagnostics;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    /// Check `config` without calling the API.
    Validate,
    /// List attributes that force replacement between `prior` and `config`.
    Plan,
    Create,
    Read,
    Update,
    Delete,
    Import,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Request {
    pub provider: Value,
    pub config: Value,
    pub state: Value,
    pub prior: Value,
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Response {
    /// New state. `null` after delete, or after read when the object is gone.
    pub state: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_replace: Option<Vec<String>>,
    pub diagnostics: Diagnostics,
}

/// Runs one operation. The provider is configured from `request.provider` first unless
/// it already is.
pub async fn handle(
    provider: &mut PipelineProvider,
    operation: Operation,
    type_name: &str,
    request: Request,
) -> Response {
    let mut diags = Diagnostics::new();
    let mut response = Response::default();
    info!(?operation, type_name, "Handling request");

    match operation {
        Operation::Validate => {
            provider.validate_resource_config(type_name, &request.config, &mut diags);
        }
        Operation::Plan => {
            response.requires_replace =
                provider.plan_resource_change(type_name, &request.prior, &request.config, &mut diags);
        }
        Operation::Create
        | Operation::Read
        | Operation::Update
        | Operation::Delete
        | Operation::Import => {
            if provider.is_configured() || provider.configure(&request.provider, &mut diags).is_some() {
                if let Some(resource) = provider.resource(type_name, &mut diags) {
                    response.state = match operation {
                        Operation::Create => resource.create(request.config, &mut diags).await,
                        Operation::Read => resource.read(request.state, &mut diags).await.flatten(),
                        Operation::Update => {
                            resource.update(request.prior, request.config, &mut diags).await
                        }
                        Operation::Import => resource.import_state(&request.id, &mut diags).await,
                        _ => {
                            resource.delete(request.state, &mut diags).await;
                            None
                        }
                    };
                }
            }
        }
    }

    response.diagnostics = diags;
    response
}
