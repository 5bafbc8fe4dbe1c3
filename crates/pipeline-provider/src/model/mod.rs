//! # API Data Types
//!
//! The objects the pipeline service speaks, as they appear on the wire. Components keep
//! their type-specific settings in a free-form `user_config` map; the envelope fields
//! (`id`, `type`, `title`, `description`, `inputs`, `generation_id`) are common.

pub mod access_key;
pub mod alert;
pub mod component;
pub mod pipeline;
pub mod shared_source;

pub use access_key::AccessKey;
pub use alert::{Alert, AlertTarget};
pub use component::{Sink, Source, Transform};
pub use pipeline::Pipeline;
pub use shared_source::SharedSource;
