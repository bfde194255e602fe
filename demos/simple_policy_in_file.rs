//! Policy file example
//!
//! Run from the workspace root:
//!
//! ```text
//! cargo run --example simple_policy_in_file
//! ```

use tracing_subscriber::EnvFilter;
use verdict_sdk::{DecisionRequest, DecisionServiceBuilder, InputDocument, ResultShape};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("verdict_sdk=info,verdict_runtime=info")),
        )
        .init();

    println!("=== Policy File Example ===\n");

    let service = DecisionServiceBuilder::new()
        .with_query("data.authorization.allow")
        .with_shape(ResultShape::Verdict)
        .add_file_module("authorization", "policies/modules/authorization.rego")
        .build()
        .await?;

    println!("Decision service ready for {}\n", service.query_path());

    let request = DecisionRequest::new(
        InputDocument::new()
            .with("role", "manager")
            .with("experience_years", 7),
    )
    .with_metadata("request_id", "req-001");

    let response = service.decide(request)?;

    println!("Decision Results:");
    println!(
        "  Request ID: {}",
        response.metadata.get("request_id").map(String::as_str).unwrap_or("-")
    );
    println!("  Allowed: {}", response.decision.is_allowed());
    println!("  Processing Time: {}ms", response.processing_time_ms);

    Ok(())
}
