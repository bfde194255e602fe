//! End-to-end decision tests against the fixture policies

use serde::Serialize;
use serde_json::json;
use verdict_core::{
    InputDocument, ModuleSet, ModuleSetBuilder, ResultShape, RuleModuleSource, StaticModules,
};
use verdict_runtime::{CompileError, DecisionQuery, RuntimeError};
use verdict_template::{Renderer, TemplateRegistry};

const AUTHORIZATION: &str = include_str!("../../../policies/modules/authorization.rego");
const RESOURCE_CHECK: &str = include_str!("../../../policies/modules/resource_check.rego");
const PERMISSION_CHECK: &str = include_str!("../../../policies/modules/permission_check.rego");
const FINAL_CHECK: &str = include_str!("../../../policies/modules/final_check.rego");

const RESOURCE_TEMPLATE: &str =
    include_str!("../../../policies/templates/resource_check.rego.tmpl");
const PERMISSION_TEMPLATE: &str =
    include_str!("../../../policies/templates/permission_check.rego.tmpl");

const VALID_UUID: &str = "0FF8AFB4-55D2-4836-B17C-643AD59BBB2F";

#[derive(Serialize)]
struct PolicyData<'a> {
    source_uuid: &'a str,
    source_slug: &'a str,
    required_permissions: Vec<&'a str>,
}

fn loader() -> StaticModules {
    StaticModules::new()
        .with_module("modules/resource_check.rego", RESOURCE_CHECK)
        .with_module("modules/permission_check.rego", PERMISSION_CHECK)
        .with_module("modules/final_check.rego", FINAL_CHECK)
}

fn renderer() -> Renderer {
    Renderer::with_cache(
        TemplateRegistry::new()
            .with_template("resource_check", RESOURCE_TEMPLATE)
            .with_template("permission_check", PERMISSION_TEMPLATE),
    )
}

fn resource_input(uuid: &str, slug: &str) -> InputDocument {
    InputDocument::new()
        .with("source_uuid", uuid)
        .with("source_slug", slug)
}

#[test]
fn test_role_based_authorization() -> anyhow::Result<()> {
    let set = ModuleSet::new(
        vec![RuleModuleSource::inline("authorization", AUTHORIZATION)],
        "data.authorization.allow",
    )?;
    let prepared = DecisionQuery::new(set)
        .with_shape(ResultShape::Verdict)
        .prepare(&StaticModules::new(), &renderer())?;

    let admin = InputDocument::new().with("role", "admin");
    let senior = InputDocument::new()
        .with("role", "manager")
        .with("experience_years", 8);
    let junior = InputDocument::new()
        .with("role", "manager")
        .with("experience_years", 2);

    assert!(prepared.decide(&admin)?.is_allowed());
    assert!(prepared.decide(&senior)?.is_allowed());
    assert!(!prepared.decide(&junior)?.is_allowed());
    Ok(())
}

#[test]
fn test_valid_resource_passes() -> anyhow::Result<()> {
    let set = ModuleSetBuilder::new("data.resource_check.resource_status")?
        .add_file("resource_check", "modules/resource_check.rego")?
        .build()?;
    let prepared = DecisionQuery::new(set)
        .with_shape(ResultShape::Validation)
        .prepare(&loader(), &renderer())?;

    let decision = prepared.decide(&resource_input(VALID_UUID, "some_slug"))?;

    assert!(decision.is_allowed());
    assert!(decision.diagnostics().is_empty());
    Ok(())
}

#[test]
fn test_invalid_uuid_reports_diagnostic() -> anyhow::Result<()> {
    let set = ModuleSetBuilder::new("data.resource_check.resource_status")?
        .add_file("resource_check", "modules/resource_check.rego")?
        .build()?;
    let prepared = DecisionQuery::new(set)
        .with_shape(ResultShape::Validation)
        .prepare(&loader(), &renderer())?;

    let decision = prepared.decide(&resource_input("invalid_uuid", "some_slug"))?;

    assert!(!decision.is_allowed());
    assert_eq!(decision.diagnostics().len(), 1);
    let diagnostic = decision.diagnostic("source_uuid").unwrap();
    assert_eq!(diagnostic.expected, VALID_UUID);
    assert_eq!(diagnostic.actual, "invalid_uuid");
    assert!(!diagnostic.hint.is_empty());
    Ok(())
}

#[test]
fn test_templated_access_check_reports_missing_permission() -> anyhow::Result<()> {
    let data = PolicyData {
        source_uuid: VALID_UUID,
        source_slug: "some_slug",
        required_permissions: vec!["create", "read", "update", "delete"],
    };
    let set = ModuleSet::new(
        vec![
            RuleModuleSource::template("resource_check", "resource_check", &data)?,
            RuleModuleSource::template("permission_check", "permission_check", &data)?,
            RuleModuleSource::file("final_check", "modules/final_check.rego"),
        ],
        "data.final_check.result",
    )?;
    let prepared = DecisionQuery::new(set)
        .with_shape(ResultShape::Access)
        .with_declared_permissions(
            data.required_permissions
                .iter()
                .map(|p| p.to_string())
                .collect(),
        )
        .prepare(&loader(), &renderer())?;

    let input = resource_input(VALID_UUID, "some_slug")
        .with("user_permissions", json!(["create", "read", "update"]));
    let decision = prepared.decide(&input)?;

    assert!(!decision.is_allowed());
    assert_eq!(decision.resource_valid(), Some(true));
    assert_eq!(decision.permissions_granted(), Some(false));
    assert_eq!(decision.missing_permissions(), &vec!["delete"]);
    Ok(())
}

#[test]
fn test_permissions_match_case_insensitively() -> anyhow::Result<()> {
    let set = ModuleSet::new(
        vec![
            RuleModuleSource::file("resource_check", "modules/resource_check.rego"),
            RuleModuleSource::file("permission_check", "modules/permission_check.rego"),
            RuleModuleSource::file("final_check", "modules/final_check.rego"),
        ],
        "data.final_check.result",
    )?;
    let prepared = DecisionQuery::new(set)
        .with_shape(ResultShape::Access)
        .prepare(&loader(), &renderer())?;

    let input = resource_input(VALID_UUID, "some_slug")
        .with("user_permissions", json!(["READ", "Write"]));
    let decision = prepared.decide(&input)?;

    assert!(decision.is_allowed());
    assert!(decision.missing_permissions().is_empty());
    assert_eq!(decision.resource_valid(), Some(true));
    assert_eq!(decision.permissions_granted(), Some(true));
    Ok(())
}

#[test]
fn test_one_prepared_query_serves_many_inputs() -> anyhow::Result<()> {
    let set = ModuleSet::new(
        vec![RuleModuleSource::file("resource_check", "modules/resource_check.rego")],
        "data.resource_check.resource_status",
    )?;
    let prepared = DecisionQuery::new(set)
        .with_shape(ResultShape::Validation)
        .prepare(&loader(), &renderer())?;

    let bad = resource_input("nope", "wrong");
    let good = resource_input(VALID_UUID, "some_slug");

    let first = prepared.decide(&bad)?;
    assert_eq!(first.diagnostics().len(), 2);
    assert!(prepared.decide(&good)?.is_allowed());
    assert_eq!(prepared.decide(&bad)?, first);
    Ok(())
}

#[test]
fn test_conflicting_modules_fail_at_prepare() -> anyhow::Result<()> {
    let shadow = "package resource_check\n\nimport rego.v1\n\nexpected_uuid := \"other\"\n";
    let set = ModuleSet::new(
        vec![
            RuleModuleSource::file("resource_check", "modules/resource_check.rego"),
            RuleModuleSource::inline("shadow", shadow),
        ],
        "data.resource_check.resource_status",
    )?;

    let err = DecisionQuery::new(set)
        .prepare(&loader(), &renderer())
        .unwrap_err();

    match err {
        RuntimeError::Compile(CompileError::ConflictingDeclaration {
            rule,
            first_module,
            second_module,
            ..
        }) => {
            assert_eq!(rule, "resource_check.expected_uuid");
            assert_eq!(first_module, "resource_check");
            assert_eq!(second_module, "shadow");
        }
        other => panic!("expected a conflict, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_missing_template_field_fails_at_prepare() -> anyhow::Result<()> {
    let set = ModuleSet::new(
        vec![RuleModuleSource::template(
            "resource_check",
            "resource_check",
            &json!({"source_uuid": VALID_UUID}),
        )?],
        "data.resource_check.resource_status",
    )?;

    let err = DecisionQuery::new(set)
        .prepare(&loader(), &renderer())
        .unwrap_err();

    assert!(matches!(err, RuntimeError::Template { ref module, .. } if module == "resource_check"));
    assert!(err.to_string().contains("resource_check"));
    Ok(())
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_prepared_query_shared_across_threads() -> anyhow::Result<()> {
    assert_send_sync::<verdict_runtime::PreparedQuery>();

    let set = ModuleSet::new(
        vec![RuleModuleSource::file("resource_check", "modules/resource_check.rego")],
        "data.resource_check.resource_status",
    )?;
    let prepared = DecisionQuery::new(set)
        .with_shape(ResultShape::Validation)
        .prepare(&loader(), &renderer())?;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let prepared = &prepared;
                scope.spawn(move || {
                    let uuid = if i % 2 == 0 { VALID_UUID } else { "nope" };
                    (i, prepared.decide(&resource_input(uuid, "some_slug")))
                })
            })
            .collect();

        for handle in handles {
            let (i, decision) = handle.join().unwrap();
            let decision = decision.unwrap();
            assert_eq!(decision.is_allowed(), i % 2 == 0);
            assert_eq!(decision.diagnostics().len(), if i % 2 == 0 { 0 } else { 1 });
        }
    });
    Ok(())
}

#[test]
fn test_engine_analysis_errors_fail_at_prepare() -> anyhow::Result<()> {
    let modules = [
        "package p\n\nimport rego.v1\n\nallow if {\n\ty > 1\n}\n",
        "package p\n\nimport rego.v1\n\nallow if nope(input.x)\n",
        "package p\n\nimport rego.v1\n\nallow if data.p.allow\n",
    ];

    for text in modules {
        let set = ModuleSet::new(vec![RuleModuleSource::inline("p", text)], "data.p.allow")?;
        let err = DecisionQuery::new(set)
            .prepare(&StaticModules::new(), &renderer())
            .unwrap_err();

        assert!(
            matches!(err, RuntimeError::Compile(CompileError::EngineRejected { ref module, .. }) if module == "p"),
            "unexpected error for {:?}: {:?}",
            text,
            err
        );
    }
    Ok(())
}

#[test]
fn test_ref_head_rule_is_queryable() -> anyhow::Result<()> {
    let text = "package app\n\nimport rego.v1\n\nchecks.allow := true if input.user == \"alice\"\n";
    let set = ModuleSet::new(vec![RuleModuleSource::inline("app", text)], "data.app.checks.allow")?;
    let prepared = DecisionQuery::new(set)
        .with_shape(ResultShape::Verdict)
        .prepare(&StaticModules::new(), &renderer())?;

    assert!(prepared.decide(&InputDocument::new().with("user", "alice"))?.is_allowed());
    assert!(matches!(
        prepared.decide(&InputDocument::new().with("user", "bob")),
        Err(RuntimeError::EmptyResult { .. })
    ));
    Ok(())
}
