//! # terraform-provider-pipeline
//!
//! Command-line host for the provider. Schemas and metadata are printed as JSON;
//! `apply` reads a request from stdin and prints the resulting state and diagnostics.
//! Logs go to stderr and are filtered with `RUST_LOG`.

use clap::{Parser, Subcommand};
use pipeline_provider::host::{self, Operation, Request};
use pipeline_provider::PipelineProvider;
use provider_framework::logging::setup_tracing;
use serde_json::json;
use std::io::Read;
use tracing::error;

#[derive(Parser)]
#[command(name = "terraform-provider-pipeline", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the provider schema and every resource schema.
    Schema,
    /// Print the provider type name, version and resource type names.
    Metadata,
    /// Run one operation on a resource; the request is read from stdin.
    Apply {
        #[arg(value_enum)]
        operation: Operation,
        /// Resource type name, e.g. pipeline_http_source.
        type_name: String,
    },
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{rendered}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let cli = Cli::parse();
    let mut provider = PipelineProvider::new();

    match cli.command {
        Command::Schema => print_json(&json!({
            "provider": provider.schema(),
            "resources": provider.resource_schemas(),
        })),
        Command::Metadata => print_json(&provider.metadata()),
        Command::Apply {
            operation,
            type_name,
        } => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .map_err(|e| format!("Cannot read request: {e}"))?;
            let request: Request = if input.trim().is_empty() {
                Request::default()
            } else {
                serde_json::from_str(&input).map_err(|e| format!("Invalid request: {e}"))?
            };

            let response = host::handle(&mut provider, operation, &type_name, request).await;
            print_json(&response)?;

            let errors = response.diagnostics.errors().count();
            if errors > 0 {
                error!(errors, "Operation failed");
                return Err(format!("{type_name}: {errors} error(s)"));
            }
            Ok(())
        }
    }
}
