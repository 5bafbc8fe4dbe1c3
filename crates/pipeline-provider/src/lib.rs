//! # Pipeline Provider
//!
//! Declarative resources for a pipeline-management service: pipelines, their sources,
//! processors, destinations and alerts, plus shared sources and access keys.
//!
//! - **[model]**: API objects as the service sends them.
//! - **[clients]**: the [`Client`](clients::Client) trait and its reqwest implementation.
//! - **[resources]**: one `ResourceModel` per resource type.
//! - **[provider]**: the registry a host talks to.
//! - **[host]**: JSON request handling for the command-line binary.

pub mod clients;
pub mod config;
pub mod host;
pub mod model;
pub mod provider;
pub mod resources;

pub use provider::PipelineProvider;
