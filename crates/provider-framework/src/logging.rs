//! # Observability & Tracing
//!
//! Structured logging for the provider, built on `tracing`.
//!
//! ## What Gets Traced
//!
//! - **Lifecycle outcomes** (`info`): `Created`, `Updated`, `Deleted`, `Imported`, with
//!   `type_name` and the resource key as fields.
//! - **Payloads** (`debug`): plans and keys at the start of each operation, and every
//!   diagnostic together with the source location that raised it.
//! - **Drift and failures** (`warn`): objects that disappeared remotely, backend errors.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info terraform-provider-pipeline schema
//! RUST_LOG=provider_framework=debug,pipeline_provider=debug terraform-provider-pipeline apply read pipeline_pipeline
//! ```
//!
//! Output goes to stderr: stdout belongs to whatever host drives the provider.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
