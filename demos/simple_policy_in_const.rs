//! Simple policy example
//!
//! This example demonstrates:
//! - Building a DecisionService from a rule module held in a constant
//! - Evaluating several inputs against one prepared query

use tracing_subscriber::EnvFilter;
use verdict_sdk::{DecisionServiceBuilder, InputDocument, ResultShape};

const AUTHORIZATION: &str = r#"
package authorization

import rego.v1

default allow := false

allow if input.role == "admin"

allow if {
    input.role == "manager"
    input.experience_years > 5
}
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("verdict_sdk=info,verdict_runtime=info")),
        )
        .init();

    println!("=== Simple Policy Example ===\n");

    let service = DecisionServiceBuilder::new()
        .with_query("data.authorization.allow")
        .with_shape(ResultShape::Verdict)
        .add_inline_module("authorization", AUTHORIZATION)
        .build()
        .await?;

    let cases = [
        ("admin", 0),
        ("manager", 8),
        ("manager", 2),
        ("guest", 20),
    ];

    for (role, years) in cases {
        let input = InputDocument::new()
            .with("role", role)
            .with("experience_years", years);
        let decision = service.evaluate(&input)?;
        println!(
            "  role={:<8} experience_years={:<3} allowed={}",
            role,
            years,
            decision.is_allowed()
        );
    }

    Ok(())
}
