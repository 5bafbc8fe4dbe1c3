//! # ResourceModel Trait
//!
//! The contract every resource type implements to be served by the generic
//! [`ResourceAdapter`](crate::ResourceAdapter). A model is the typed Terraform-side view of
//! a resource (one field per attribute); its associated [`ResourceModel::Api`] type is the
//! object the backend speaks.
//!
//! The adapter is written once against this trait. A model only supplies the four
//! per-type functions the lifecycle needs:
//!
//! - **plan → API** ([`ResourceModel::to_api`]), with the prior state on update,
//! - **API → state** ([`ResourceModel::apply_api`]),
//! - **id** ([`ResourceModel::id`]),
//! - **parent ids** ([`ResourceModel::parents`]), e.g. the owning pipeline.

use crate::diagnostics::Diagnostics;
use crate::schema::Schema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{self, Debug, Display};

/// Locates a remote object: the ids of its parents (outermost first) plus its own id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub parents: Vec<String>,
    pub id: String,
}

impl ResourceKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            parents: Vec::new(),
            id: id.into(),
        }
    }

    pub fn nested(parents: Vec<String>, id: impl Into<String>) -> Self {
        Self {
            parents,
            id: id.into(),
        }
    }

    pub fn parent(&self, index: usize) -> Option<&str> {
        self.parents.get(index).map(String::as_str)
    }

    /// Splits an import id of the form `a/b/.../id` into exactly `depth` parents plus an id.
    /// Empty, `.` and `..` segments are rejected.
    pub fn parse(raw: &str, depth: usize) -> Result<Self, String> {
        let invalid = || {
            format!(
                "Expected an import id with {} non-empty segment(s) separated by \"/\", got: \"{raw}\"",
                depth + 1
            )
        };
        let parts: Vec<&str> = raw.split('/').collect();
        if parts.len() != depth + 1 || parts.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid());
        }
        if let Some(dots) = parts.iter().find(|p| matches!(**p, "." | "..")) {
            return Err(format!("Import id segments cannot be \"{dots}\", got: \"{raw}\""));
        }
        let Some((id, parents)) = parts.split_last() else {
            return Err(invalid());
        };
        Ok(Self::nested(
            parents.iter().map(|p| p.to_string()).collect(),
            *id,
        ))
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for parent in &self.parents {
            write!(f, "{parent}/")?;
        }
        write!(f, "{}", self.id)
    }
}

/// Trait that any resource type must implement to be managed by `ResourceAdapter`.
///
/// Models round-trip through JSON (`Serialize + DeserializeOwned`) because plan and state
/// arrive from the host as JSON objects keyed by attribute name.
pub trait ResourceModel: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// The backend representation (e.g. a pipeline source).
    type Api: Debug + Send + Sync;

    fn schema() -> Schema;

    /// Converts a plan into the API object to send.
    ///
    /// `prior` is the last applied state on update and `None` on create. Implementations
    /// carry server-assigned fields (`id`, generation counters) forward from it and reject
    /// changes to attributes that are immutable after creation.
    fn to_api(&self, prior: Option<&Self>, diags: &mut Diagnostics) -> Option<Self::Api>;

    /// Writes the backend's view of the resource into this model.
    fn apply_api(&mut self, api: &Self::Api);

    fn id(&self) -> Option<&str>;

    /// Ids of the objects this resource lives under, outermost first.
    fn parents(&self) -> Vec<String> {
        Vec::new()
    }

    fn key(&self) -> Option<ResourceKey> {
        self.id()
            .filter(|id| !id.is_empty())
            .map(|id| ResourceKey::nested(self.parents(), id))
    }

    /// Parses the id given to `terraform import`.
    fn parse_import_id(raw: &str) -> Result<ResourceKey, String> {
        ResourceKey::parse(raw, 0)
    }

    /// An otherwise empty model located at `key`; `apply_api` fills in the rest on import.
    fn from_key(key: &ResourceKey) -> Self;

    /// Cross-attribute rules the schema cannot express.
    fn validate(&self, _diags: &mut Diagnostics) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_parents() {
        let key = ResourceKey::parse("p1/source/s1/a1", 3).unwrap();
        assert_eq!(key.parents, vec!["p1", "source", "s1"]);
        assert_eq!(key.id, "a1");
        assert_eq!(key.to_string(), "p1/source/s1/a1");
        assert_eq!(key.parent(1), Some("source"));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(ResourceKey::parse("only-id", 1).is_err());
        assert!(ResourceKey::parse("p1/..", 1).is_err());
        assert!(ResourceKey::parse("./s1", 1).is_err());
        assert!(ResourceKey::parse("..", 0).is_err());
        assert!(ResourceKey::parse("p1//s1", 2).is_err());
        assert!(ResourceKey::parse("p1/s1", 0).is_err());
        assert_eq!(ResourceKey::parse("abc", 0).unwrap(), ResourceKey::new("abc"));
    }
}
