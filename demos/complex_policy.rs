//! Multi-module policy loaded from a definition
//!
//! The `access_check` definition combines a resource check and a permission
//! check into one access result.

use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use verdict_repository::{FileSystemRepository, Repository};
use verdict_sdk::{DecisionServiceBuilder, InputDocument, Outcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("verdict_sdk=info,verdict_runtime=info")),
        )
        .init();

    println!("=== Complex Policy Example ===\n");

    let repository = FileSystemRepository::new("policies")?;
    let (definition, _) = repository.load_policy("access_check").await?;
    println!(
        "Loaded definition '{}': {}\n",
        definition.id,
        definition.description.as_deref().unwrap_or("")
    );

    let service = DecisionServiceBuilder::from_definition(definition)
        .with_declared_permissions(["read", "write"])
        .with_repository_backend(Arc::new(repository))
        .build()
        .await?;

    println!("Modules: {}\n", service.module_names().join(", "));

    let cases = [
        ("read and write", json!(["read", "write"])),
        ("mixed case", json!(["READ", "Write"])),
        ("read only", json!(["read"])),
        ("nothing", json!([])),
    ];

    for (label, granted) in cases {
        let input = InputDocument::new()
            .with("source_uuid", "0FF8AFB4-55D2-4836-B17C-643AD59BBB2F")
            .with("source_slug", "some_slug")
            .with("user_permissions", granted);

        match service.decide_or_deny(&input) {
            Outcome::Decided { decision } => {
                println!("{}:", label);
                println!("  Allowed: {}", decision.is_allowed());
                if !decision.missing_permissions().is_empty() {
                    println!(
                        "  Missing permissions: {}",
                        decision.missing_permissions().as_slice().join(", ")
                    );
                }
            }
            Outcome::Denied { reason } => println!("{}: denied ({})", label, reason),
        }
    }

    Ok(())
}
