//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use serde_json::json;
use std::path::PathBuf;
use verdict_sdk::{InputDocument, RepositoryConfig};

/// Identifier the fixture resource is registered with
pub const VALID_UUID: &str = "0FF8AFB4-55D2-4836-B17C-643AD59BBB2F";
pub const VALID_SLUG: &str = "some_slug";

/// Root of the fixture policies shipped with the workspace
pub fn policies_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../policies")
}

pub fn policies_repository() -> RepositoryConfig {
    RepositoryConfig::file_system(policies_dir().to_string_lossy().to_string())
}

/// Input naming a resource
pub fn resource_input(uuid: &str, slug: &str) -> InputDocument {
    InputDocument::new()
        .with("source_uuid", uuid)
        .with("source_slug", slug)
}

/// Input naming a resource and the caller's granted permissions
pub fn access_input(uuid: &str, slug: &str, granted: &[&str]) -> InputDocument {
    resource_input(uuid, slug).with("user_permissions", json!(granted))
}
