//! # Resources
//!
//! One [`ResourceModel`](provider_framework::ResourceModel) per resource type. Sources,
//! processors, destinations and alerts share an envelope model each (for example
//! [`SourceModel`]) that is generic over a per-kind options struct; the options struct
//! declares its own attributes and is stored in the API object's `user_config`.

pub mod access_key;
pub mod alert;
pub mod alerts;
pub mod common;
pub mod component;
pub mod destinations;
pub mod pipeline;
pub mod processors;
pub mod shared_source;
pub mod sources;

pub use access_key::AccessKeyModel;
pub use alert::AlertModel;
pub use component::{DestinationModel, ProcessorModel, SourceModel};
pub use pipeline::PipelineModel;
pub use shared_source::SharedSourceModel;

use provider_framework::schema::{strip_nulls, Attribute};
use provider_framework::Diagnostics;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Type-specific settings of one component kind.
pub trait ComponentOptions:
    Serialize + DeserializeOwned + Clone + Debug + Default + PartialEq + Send + Sync + 'static
{
    /// Resource name without prefix or category, e.g. `kafka`.
    const NAME: &'static str;
    /// Value of the API object's `type` field.
    const API_TYPE: &'static str;
    const DESCRIPTION: &'static str;

    fn attributes() -> BTreeMap<String, Attribute>;

    fn validate(&self, _diags: &mut Diagnostics) {}
}

/// Whether a source kind can be backed by a shared source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sharing {
    None,
    Shared,
    /// Shared, and also exposed through an ingestion gateway route.
    SharedWithGateway,
}

pub trait SourceOptions: ComponentOptions {
    const SHARING: Sharing = Sharing::None;
}

pub(crate) fn to_user_config<T: Serialize>(
    options: &T,
    diags: &mut Diagnostics,
) -> Option<Map<String, Value>> {
    match serde_json::to_value(options).map(strip_nulls) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            diags.error(
                "Cannot build user_config",
                format!("Expected an object, got: {other}"),
            );
            None
        }
        Err(e) => {
            diags.error("Cannot build user_config", e.to_string());
            None
        }
    }
}

pub(crate) fn from_user_config<T: DeserializeOwned>(
    config: &Map<String, Value>,
) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(config.clone()))
}

/// Rejects a change to an attribute the service fixes at creation time. A plan that leaves
/// the attribute unset keeps the prior value.
pub(crate) fn check_immutable(
    field: &str,
    prior: Option<&str>,
    planned: Option<&str>,
    diags: &mut Diagnostics,
) {
    if let Some(planned) = planned {
        if prior != Some(planned) {
            diags.attribute_error(
                field,
                format!("Cannot change \"{field}\""),
                format!("\"{field}\" cannot be changed after the resource has been created. Remove the resource and create it again."),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immutable_change_message() {
        let mut diags = Diagnostics::new();
        check_immutable("shared_source_id", Some("a"), Some("b"), &mut diags);
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.summary, "Cannot change \"shared_source_id\"");
        assert_eq!(
            diag.detail,
            "\"shared_source_id\" cannot be changed after the resource has been created. Remove the resource and create it again."
        );
        assert_eq!(diag.attribute.as_deref(), Some("shared_source_id"));
    }

    #[test]
    fn test_unset_or_equal_values_are_allowed() {
        let mut diags = Diagnostics::new();
        check_immutable("gateway_route_id", Some("a"), None, &mut diags);
        check_immutable("gateway_route_id", Some("a"), Some("a"), &mut diags);
        check_immutable("gateway_route_id", None, None, &mut diags);
        assert!(diags.is_empty());
    }
}
