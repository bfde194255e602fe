//! Templated policy example
//!
//! The resource identifier and required permissions are rendered into the
//! rule modules before compilation.

use serde_json::json;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use verdict_sdk::{
    DecisionServiceBuilder, InputDocument, PolicyTemplateData, RepositoryConfig, ResultShape,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("verdict_sdk=info,verdict_runtime=info")),
        )
        .init();

    println!("=== Templated Policy Example ===\n");

    let resource_uuid = Uuid::new_v4().to_string().to_uppercase();
    let data = PolicyTemplateData::new(&resource_uuid, "quarterly_report")
        .with_permissions(["create", "read", "update", "delete"]);

    let service = DecisionServiceBuilder::new()
        .with_repository(RepositoryConfig::file_system("policies"))
        .with_query("data.final_check.result")
        .with_shape(ResultShape::Access)
        .add_template_module("resource_check", "resource_check")
        .add_template_module("permission_check", "permission_check")
        .add_template_module("final_check", "final_check")
        .with_template_data(data)
        .build()
        .await?;

    println!("Resource: {}\n", resource_uuid);

    let input = InputDocument::new()
        .with("source_uuid", resource_uuid.as_str())
        .with("source_slug", "quarterly_report")
        .with("user_permissions", json!(["create", "read", "update"]));

    let decision = service.evaluate(&input)?;
    println!("Decision Results:");
    println!("  Allowed: {}", decision.is_allowed());
    println!("  Resource valid: {:?}", decision.resource_valid());
    println!("  Permissions granted: {:?}", decision.permissions_granted());
    println!(
        "  Missing permissions: {}",
        decision.missing_permissions().as_slice().join(", ")
    );

    println!("\nAs JSON:");
    println!("{}", serde_json::to_string_pretty(&decision)?);

    Ok(())
}
