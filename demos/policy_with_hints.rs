//! Validation with remediation hints
//!
//! A failing validation result carries one diagnostic per mismatched field.

use tracing_subscriber::EnvFilter;
use verdict_sdk::{Decision, DecisionServiceBuilder, InputDocument, ResultShape};

const RESOURCE_UUID: &str = "0FF8AFB4-55D2-4836-B17C-643AD59BBB2F";

fn print_decision(label: &str, decision: &Decision) {
    println!("{}:", label);
    println!("  Allowed: {}", decision.is_allowed());
    for diagnostic in decision.diagnostics() {
        println!("  - {}", diagnostic.field);
        println!("      expected: {}", diagnostic.expected);
        println!("      actual:   {}", diagnostic.actual);
        println!("      hint:     {}", diagnostic.hint);
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("verdict_sdk=info,verdict_runtime=info")),
        )
        .init();

    println!("=== Policy With Hints Example ===\n");

    let service = DecisionServiceBuilder::new()
        .with_query("data.resource_check.resource_status")
        .with_shape(ResultShape::Validation)
        .add_file_module("resource_check", "policies/modules/resource_check.rego")
        .build()
        .await?;

    let valid = InputDocument::new()
        .with("source_uuid", RESOURCE_UUID)
        .with("source_slug", "some_slug");
    print_decision("Registered resource", &service.evaluate(&valid)?);

    let invalid = InputDocument::new()
        .with("source_uuid", "invalid_uuid")
        .with("source_slug", "other_slug");
    print_decision("Unknown resource", &service.evaluate(&invalid)?);

    Ok(())
}
