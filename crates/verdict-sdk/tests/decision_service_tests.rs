//! Decision service tests against the fixture policies

mod common;

use common::{access_input, policies_dir, policies_repository, resource_input, VALID_SLUG, VALID_UUID};
use serde_json::json;
use std::sync::Arc;
use verdict_repository::{FileSystemRepository, Repository};
use verdict_runtime::{CompileError, RuntimeError};
use verdict_sdk::{
    DecisionRequest, DecisionServiceBuilder, InputDocument, Outcome, PolicyTemplateData,
    ResultShape, SdkError,
};

fn crud_template_data(uuid: &str) -> PolicyTemplateData {
    PolicyTemplateData::new(uuid, VALID_SLUG).with_permissions(["create", "read", "update", "delete"])
}

async fn templated_access_service(uuid: &str) -> verdict_sdk::DecisionService {
    DecisionServiceBuilder::new()
        .with_repository(policies_repository())
        .with_query("data.final_check.result")
        .with_shape(ResultShape::Access)
        .add_template_module("resource_check", "resource_check")
        .add_template_module("permission_check", "permission_check")
        .add_template_module("final_check", "final_check")
        .with_template_data(crud_template_data(uuid))
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_valid_resource_is_allowed() {
    let service = DecisionServiceBuilder::new()
        .with_repository(policies_repository())
        .with_query("data.resource_check.resource_status")
        .with_shape(ResultShape::Validation)
        .add_file_module("resource_check", "modules/resource_check.rego")
        .build()
        .await
        .unwrap();

    let response = service
        .decide(DecisionRequest::new(resource_input(VALID_UUID, VALID_SLUG)).with_metadata("request_id", "r-1"))
        .unwrap();

    assert!(response.decision.is_allowed());
    assert!(response.decision.diagnostics().is_empty());
    assert_eq!(response.metadata.get("request_id").map(String::as_str), Some("r-1"));
}

#[tokio::test]
async fn test_invalid_uuid_is_denied_with_hint() {
    let service = DecisionServiceBuilder::new()
        .with_repository(policies_repository())
        .with_query("data.resource_check.resource_status")
        .with_shape(ResultShape::Validation)
        .add_file_module("resource_check", "modules/resource_check.rego")
        .build()
        .await
        .unwrap();

    let decision = service
        .evaluate(&resource_input("invalid_uuid", VALID_SLUG))
        .unwrap();

    assert!(!decision.is_allowed());
    let diagnostic = decision.diagnostic("source_uuid").unwrap();
    assert_eq!(diagnostic.actual, "invalid_uuid");
    assert!(!diagnostic.hint.is_empty());
    assert!(decision.diagnostic("source_slug").is_none());
}

#[tokio::test]
async fn test_missing_delete_permission() {
    let service = templated_access_service(VALID_UUID).await;

    let decision = service
        .evaluate(&access_input(VALID_UUID, VALID_SLUG, &["create", "read", "update"]))
        .unwrap();

    assert!(!decision.is_allowed());
    assert_eq!(decision.resource_valid(), Some(true));
    assert_eq!(decision.permissions_granted(), Some(false));
    assert_eq!(decision.missing_permissions(), &vec!["delete"]);
}

#[tokio::test]
async fn test_grants_match_case_insensitively() {
    let service = templated_access_service(VALID_UUID).await;

    let decision = service
        .evaluate(&access_input(
            VALID_UUID,
            VALID_SLUG,
            &["Create", "READ", "update", "Delete"],
        ))
        .unwrap();

    assert!(decision.is_allowed());
    assert!(decision.missing_permissions().is_empty());
}

#[tokio::test]
async fn test_missing_permissions_keep_declared_order() {
    let service = templated_access_service(VALID_UUID).await;

    let decision = service
        .evaluate(&access_input(VALID_UUID, VALID_SLUG, &["read"]))
        .unwrap();

    assert_eq!(
        decision.missing_permissions(),
        &vec!["create", "update", "delete"]
    );
}

#[tokio::test]
async fn test_generated_resource_id_is_rendered() {
    let generated = "5D1A2C3B-0000-4000-8000-00000000ABCD";
    let service = templated_access_service(generated).await;

    let granted = ["create", "read", "update", "delete"];
    assert!(service
        .evaluate(&access_input(generated, VALID_SLUG, &granted))
        .unwrap()
        .is_allowed());

    let stale = service
        .evaluate(&access_input(VALID_UUID, VALID_SLUG, &granted))
        .unwrap();
    assert!(!stale.is_allowed());
    assert_eq!(stale.resource_valid(), Some(false));
}

#[tokio::test]
async fn test_build_from_definition() {
    let repo = FileSystemRepository::new(policies_dir()).unwrap();
    let (definition, _) = repo.load_policy("templated_access_check").await.unwrap();

    let service = DecisionServiceBuilder::from_definition(definition)
        .with_repository_backend(Arc::new(repo))
        .build()
        .await
        .unwrap();

    assert_eq!(service.shape(), ResultShape::Access);
    let decision = service
        .evaluate(&access_input(VALID_UUID, VALID_SLUG, &["create", "read", "update"]))
        .unwrap();
    assert_eq!(decision.missing_permissions(), &vec!["delete"]);
}

#[tokio::test]
async fn test_authorization_definition_from_disk() {
    let repo = FileSystemRepository::new(policies_dir()).unwrap();
    let (definition, _) = repo.load_policy("authorization").await.unwrap();

    let service = DecisionServiceBuilder::from_definition(definition)
        .with_repository_backend(Arc::new(repo))
        .build()
        .await
        .unwrap();

    let manager = InputDocument::new()
        .with("role", "manager")
        .with("experience_years", 6);
    assert!(service.decide_or_deny(&manager).is_allowed());
    assert!(!service
        .decide_or_deny(&InputDocument::new().with("role", "intern"))
        .is_allowed());
}

#[tokio::test]
async fn test_undefined_result_is_denied() {
    let module = "package gate\n\nimport rego.v1\n\nallow if input.token == \"secret\"\n";
    let service = DecisionServiceBuilder::new()
        .with_query("data.gate.allow")
        .with_shape(ResultShape::Verdict)
        .add_inline_module("gate", module)
        .build()
        .await
        .unwrap();

    let err = service.evaluate(&InputDocument::new()).unwrap_err();
    assert!(err.is_empty_result());

    match service.decide_or_deny(&InputDocument::new()) {
        Outcome::Denied { reason } => assert!(reason.contains("data.gate.allow")),
        other => panic!("expected a denial, got {:?}", other),
    }
    assert!(service
        .decide_or_deny(&InputDocument::new().with("token", "secret"))
        .is_allowed());
}

#[tokio::test]
async fn test_missing_module_file_names_module() {
    let err = DecisionServiceBuilder::new()
        .with_repository(policies_repository())
        .with_query("data.final_check.result")
        .add_file_module("final_check", "modules/does_not_exist.rego")
        .build()
        .await
        .unwrap_err();

    match err {
        SdkError::Runtime(RuntimeError::ModuleLoad { module, .. }) => {
            assert_eq!(module, "final_check")
        }
        other => panic!("expected a module load error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_query_fails_at_build() {
    let err = DecisionServiceBuilder::new()
        .with_repository(policies_repository())
        .with_query("data.resource_check.does_not_exist")
        .add_file_module("resource_check", "modules/resource_check.rego")
        .build()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SdkError::Runtime(RuntimeError::Compile(CompileError::QueryPathNotFound { .. }))
    ));
}

#[tokio::test]
async fn test_template_rendering_failure_names_field() {
    let err = DecisionServiceBuilder::new()
        .with_repository(policies_repository())
        .with_query("data.resource_check.resource_status")
        .add_template_module("resource_check", "resource_check")
        .with_template_context(json!({"source_uuid": VALID_UUID}))
        .build()
        .await
        .unwrap_err();

    assert!(err.to_string().contains("source_slug"));
}

#[tokio::test]
async fn test_response_serializes_decision() {
    let service = templated_access_service(VALID_UUID).await;
    let response = service
        .decide(DecisionRequest::new(access_input(VALID_UUID, VALID_SLUG, &["read"])))
        .unwrap();

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["decision"]["allowed"], json!(false));
    assert_eq!(value["decision"]["permissions_granted"], json!(false));
    assert_eq!(
        value["decision"]["missing_permissions"],
        json!(["create", "update", "delete"])
    );
}

#[tokio::test]
async fn test_file_module_read_without_repository() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("limits.rego");
    tokio::fs::write(
        &path,
        "package limits\n\nimport rego.v1\n\ndefault within := false\n\nwithin if input.amount <= 100\n",
    )
    .await
    .unwrap();

    let service = DecisionServiceBuilder::new()
        .with_query("data.limits.within")
        .with_shape(ResultShape::Verdict)
        .add_file_module("limits", &path)
        .build()
        .await
        .unwrap();

    assert!(service
        .evaluate(&InputDocument::new().with("amount", 40))
        .unwrap()
        .is_allowed());
    assert!(!service
        .evaluate(&InputDocument::new().with("amount", 400))
        .unwrap()
        .is_allowed());
}

#[tokio::test]
async fn test_memory_repository_backend() {
    let repo = verdict_repository::MemoryRepository::new()
        .with_module(
            "modules/permission_check.rego",
            std::fs::read_to_string(policies_dir().join("modules/permission_check.rego")).unwrap(),
        )
        .with_template(
            "resource_check",
            std::fs::read_to_string(policies_dir().join("templates/resource_check.rego.tmpl"))
                .unwrap(),
        );

    let service = DecisionServiceBuilder::new()
        .with_repository_backend(Arc::new(repo))
        .with_query("data.permission_check.permissions_granted")
        .with_shape(ResultShape::Verdict)
        .add_file_module("permission_check", "modules/permission_check.rego")
        .add_template_module("resource_check", "resource_check")
        .with_template_data(PolicyTemplateData::new(VALID_UUID, VALID_SLUG))
        .build()
        .await
        .unwrap();

    assert_eq!(
        service.module_names(),
        &["permission_check".to_string(), "resource_check".to_string()]
    );
    assert!(service
        .evaluate(&access_input(VALID_UUID, VALID_SLUG, &["read", "write"]))
        .unwrap()
        .is_allowed());
    assert!(!service
        .evaluate(&access_input(VALID_UUID, VALID_SLUG, &["read"]))
        .unwrap()
        .is_allowed());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_service_shared_across_tasks() {
    let service = Arc::new(templated_access_service(VALID_UUID).await);

    let tasks: Vec<_> = (0..6)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let granted: &[&str] = if i % 2 == 0 {
                    &["create", "read", "update", "delete"]
                } else {
                    &["read"]
                };
                let decision = service
                    .evaluate(&access_input(VALID_UUID, VALID_SLUG, granted))
                    .unwrap();
                (i, decision)
            })
        })
        .collect();

    for task in tasks {
        let (i, decision) = task.await.unwrap();
        assert_eq!(decision.is_allowed(), i % 2 == 0);
    }
}

#[tokio::test]
async fn test_memory_repository_config() {
    let config = verdict_sdk::RepositoryConfig::memory().with_module(
        "modules/authorization.rego",
        "package authorization\n\nimport rego.v1\n\ndefault allow := false\n\nallow if input.role == \"admin\"\n",
    );

    let service = DecisionServiceBuilder::new()
        .with_repository(config)
        .with_query("data.authorization.allow")
        .with_shape(ResultShape::Verdict)
        .add_file_module("authorization", "modules/authorization.rego")
        .build()
        .await
        .unwrap();

    assert!(service
        .evaluate(&InputDocument::new().with("role", "admin"))
        .unwrap()
        .is_allowed());
}
