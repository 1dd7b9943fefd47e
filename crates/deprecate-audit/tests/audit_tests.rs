//! Audit of the shared fixture package

use deprecate_audit::{
    find_deprecated_callables, validate_deprecation_chains, AuditConfig, AuditError, AuditReport,
    ChainType, DeprecatedCallableInfo, Manifest, Member,
};
use deprecate_test_utils::fixtures::{self, Chains, Targets};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn by_function(found: Vec<DeprecatedCallableInfo>) -> HashMap<String, DeprecatedCallableInfo> {
    found.into_iter().map(|info| (info.function.clone(), info)).collect()
}

#[test]
fn degenerate_wrappers_are_classified() {
    let found = by_function(find_deprecated_callables(&fixtures::degenerate(&Targets::new()), false));
    assert_eq!(found.len(), 8);

    let flags = |name: &str| {
        let info = &found[name];
        (info.empty_mapping, info.self_reference, info.no_effect)
    };
    assert_eq!(flags("valid_deprecation"), (true, false, false));
    assert_eq!(flags("valid_self_deprecation"), (false, false, false));
    assert_eq!(flags("invalid_args_deprecation"), (false, false, false));
    assert_eq!(flags("empty_mapping_deprecation"), (true, false, true));
    assert_eq!(flags("identity_mapping_deprecation"), (false, false, true));
    assert_eq!(flags("all_identity_mapping_deprecation"), (false, false, true));
    assert_eq!(flags("partial_identity_mapping_deprecation"), (false, false, false));
    assert_eq!(flags("self_referencing_deprecation"), (false, true, true));

    assert_eq!(found["invalid_args_deprecation"].invalid_args, ["nonexistent_arg"]);
    assert_eq!(found["all_identity_mapping_deprecation"].identity_mapping, ["arg1", "arg2"]);
    assert_eq!(found["partial_identity_mapping_deprecation"].identity_mapping, ["arg1"]);
    assert!(found.values().all(|info| info.module == "fixtures.degenerate"));
}

#[test]
fn package_scan_walks_every_collection() {
    let package = fixtures::package();
    let shallow = find_deprecated_callables(&package, false);
    assert!(shallow.is_empty());

    let deep = find_deprecated_callables(&package, true);
    assert_eq!(deep.len(), 35);
    let misconfigured = deep.iter().filter(|info| info.module == "fixtures.misconfigured").count();
    assert_eq!(misconfigured, 4);

    let again = find_deprecated_callables(&package, true);
    let paths = |found: &[DeprecatedCallableInfo]| found.iter().map(DeprecatedCallableInfo::path).collect::<Vec<_>>();
    assert_eq!(paths(&deep), paths(&again));
}

#[test]
fn chains_are_detected_from_metadata_only() {
    let chains = Chains::new(&Targets::new());
    let found = validate_deprecation_chains(&chains.module(), true).unwrap();
    let summary: Vec<_> = found
        .iter()
        .map(|info| (info.function.as_str(), info.chain_type, info.chain_hops))
        .collect();
    assert_eq!(
        summary,
        [
            ("forwards_to_deprecated", Some(ChainType::Target), 1),
            ("forwards_to_renaming", Some(ChainType::Stacked), 1),
            ("stacked_renaming", Some(ChainType::Stacked), 1),
        ]
    );
}

#[test]
fn expiry_against_package_version() {
    let registry = fixtures::registry();
    let expired = registry.validate_deprecation_expiry("fixtures", None, true).unwrap();
    assert_eq!(
        expired,
        ["Callable `depr_sum_warn_only` was scheduled for removal in version 0.3 but still exists in version 0.3. \
          Please delete this deprecated code."]
    );

    let expired = registry
        .validate_deprecation_expiry("fixtures.deprecate", Some("0.4"), true)
        .unwrap();
    assert_eq!(expired.len(), 2);
    assert!(expired[1].starts_with("Callable `PastCls`"));

    registry.register_distribution("fixtures", "not a version");
    assert!(matches!(
        registry.validate_deprecation_expiry("fixtures", None, true),
        Err(AuditError::InvalidVersion { .. })
    ));
}

#[test]
fn report_over_fixture_package() {
    let registry = fixtures::registry();
    let report = AuditReport::run_path(&registry, "fixtures", &AuditConfig::default()).unwrap();
    assert_eq!(report.current_version.as_deref(), Some(fixtures::PACKAGE_VERSION));
    assert_eq!(report.callables.len(), 35);
    assert_eq!(report.chains.len(), 3);
    assert!(report.has_errors());

    let text = report.to_string();
    assert!(text.contains("  - fixtures.degenerate.invalid_args_deprecation: [\"nonexistent_arg\"]"));
    assert!(text.contains("    Reason: Self reference"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["chains"][0]["chain_type"], "target");
}

#[test]
fn manifest_round_trip_through_audit() {
    let manifest = Manifest::from_json_str(
        r#"{
            "versions": {"legacy": "2.0"},
            "modules": [
                {"name": "legacy", "functions": [
                    {"name": "new_api", "params": [{"name": "x"}]},
                    {"name": "mid_api", "params": [{"name": "x"}],
                     "deprecated": {"target": "legacy.new_api", "remove_in": "3.0"}},
                    {"name": "old_api", "params": [{"name": "y"}],
                     "deprecated": {"target": "legacy.mid_api", "remove_in": "2.0",
                                    "args_mapping": {"y": "x"}}},
                    {"name": "loop_api", "params": [{"name": "z"}],
                     "deprecated": {"target": "legacy.loop_api"}}
                ]}
            ]
        }"#,
    )
    .unwrap();
    let registry = manifest.into_registry().unwrap();

    let found = by_function(registry.find_deprecated_callables("legacy", true).unwrap());
    assert!(found["loop_api"].self_reference);
    assert!(found["loop_api"].no_effect);
    assert_eq!(found["old_api"].chain_type, Some(ChainType::Target));

    let expired = registry.validate_deprecation_expiry("legacy", None, true).unwrap();
    assert_eq!(expired.len(), 1);
    assert!(expired[0].contains("`old_api`"));

    let legacy = registry.import("legacy").unwrap();
    assert!(matches!(legacy.get("new_api"), Some(Member::Callable(c)) if !c.is_deprecated()));
}

#[test]
fn toml_manifest_file_with_classes_and_aliases() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shapes.toml");
    std::fs::write(
        &path,
        r#"
[versions]
shapes = "1.4"

[[modules]]
name = "shapes"

[[modules.classes]]
name = "Circle"
init = [{ name = "radius" }]

[[modules.classes]]
name = "Round"
init = [{ name = "r" }]
deprecated = { target = "shapes.Circle", remove_in = "1.4", args_mapping = { r = "radius" } }

[[modules]]
name = "shapes.compat"
aliases = { Round = "shapes.Round" }
"#,
    )
    .unwrap();

    let registry = Manifest::load(&path).unwrap().into_registry().unwrap();
    assert_eq!(registry.module_names(), ["shapes"]);

    let found = registry.find_deprecated_callables("shapes", true).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].function, "Round");
    assert!(found[0].invalid_args.is_empty());

    let expired = registry.validate_deprecation_expiry("shapes", None, true).unwrap();
    assert_eq!(expired.len(), 1);
    assert!(expired[0].contains("`Round`"));
}
