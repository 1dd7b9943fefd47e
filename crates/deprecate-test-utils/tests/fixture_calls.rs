//! Calling the fixture wrappers end to end

use deprecate_core::{catch_warnings, Arguments, WarningCategory};
use deprecate_test_utils::fixtures::{Chains, DeprecateCollection, Targets};
use deprecate_test_utils::{no_warning_call, NoWarningGuard};
use pretty_assertions::assert_eq;
use serde_json::json;

fn collection() -> DeprecateCollection {
    DeprecateCollection::new(&Targets::new())
}

#[test]
fn forwarding_merges_source_defaults() {
    let depr = collection();
    let (out, warnings) = catch_warnings(|| depr.depr_sum.call(&Arguments::new().arg(2)));
    assert_eq!(out.unwrap(), json!(7));
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].category, WarningCategory::Future);
    assert_eq!(
        warnings[0].message,
        "The `depr_sum` was deprecated since v0.1 in favor of `fixtures.targets.base_sum_kwargs`. \
         It will be removed in v0.5."
    );

    let out = no_warning_call(Some(WarningCategory::Future), None, || {
        depr.depr_sum.call(&Arguments::new().arg(1).arg(2))
    });
    assert_eq!(out.unwrap(), json!(3));
}

#[test]
fn warn_only_runs_own_body() {
    let depr = collection();
    let (out, warnings) = catch_warnings(|| depr.depr_sum_warn_only.call(&Arguments::new().arg(2)));
    assert_eq!(out.unwrap(), json!(7));
    assert_eq!(
        warnings[0].message,
        "The `depr_sum_warn_only` was deprecated since v0.2. It will be removed in v0.3."
    );
}

#[test]
fn warning_budget() {
    let depr = collection();
    let (_, warnings) = catch_warnings(|| {
        for _ in 0..3 {
            depr.depr_sum_calls_2.call(&Arguments::new().arg(1)).unwrap();
        }
    });
    assert_eq!(warnings.len(), 2);

    let (_, warnings) = catch_warnings(|| {
        for _ in 0..5 {
            depr.depr_sum_calls_inf.call(&Arguments::new().arg(1)).unwrap();
        }
    });
    assert_eq!(warnings.len(), 5);

    let guard = NoWarningGuard::new(None, None);
    assert_eq!(depr.depr_sum_no_stream.call(&Arguments::new().arg(1)).unwrap(), json!(6));
    guard.check();
}

#[test]
fn custom_template() {
    let depr = collection();
    let (_, warnings) = catch_warnings(|| depr.depr_sum_msg.call(&Arguments::new().arg(1)));
    assert_eq!(
        warnings[0].message,
        "v0.1: `depr_sum_msg` was deprecated, use `base_sum_kwargs`"
    );
}

#[test]
fn positional_and_default_forwarding() {
    let depr = collection();
    let (out, _) = catch_warnings(|| depr.depr_pow_args.call(&Arguments::new().arg(2).arg(3)));
    assert_eq!(out.unwrap(), json!(8.0));
    let (out, _) = catch_warnings(|| depr.depr_pow_mix.call(&Arguments::new().arg(2)));
    assert_eq!(out.unwrap(), json!(16.0));

    let (out, _) = catch_warnings(|| depr.depr_pow_wrong.call(&Arguments::new().arg(2)));
    assert!(out.unwrap_err().is_argument_mapping());
}

#[test]
fn argument_mapping_drop_and_extra() {
    let depr = collection();
    let (out, _) = catch_warnings(|| {
        depr.depr_accuracy_skip
            .call(&Arguments::new().kwarg("preds", json!([0, 1, 1, 2])))
    });
    assert_eq!(out.unwrap(), json!(1.0));

    let (out, _) = catch_warnings(|| depr.depr_accuracy_map.call(&Arguments::new().arg(json!([1, 1, 1, 2]))));
    assert_eq!(out.unwrap(), json!(0.75));

    let (out, _) = catch_warnings(|| {
        depr.depr_accuracy_extra
            .call(&Arguments::new().kwarg("y_pred", json!([0, 1, 1, 2])))
    });
    assert_eq!(out.unwrap(), json!(0.75));
}

#[test]
fn warn_only_ignores_mapping() {
    let depr = collection();
    let (out, _) = catch_warnings(|| depr.depr_pow_self.call(&Arguments::new().arg(2).arg(3).arg(4)));
    assert_eq!(out.unwrap(), json!(16.0));
}

#[test]
fn deprecated_class_builds_replacement() {
    let depr = collection();
    let (out, warnings) = catch_warnings(|| depr.past_cls.instantiate(&Arguments::new().arg(2)));
    assert_eq!(out.unwrap(), json!({"my_c": 2, "my_d": "efg"}));
    assert_eq!(
        warnings[0].message,
        "The `PastCls` was deprecated since v0.2 in favor of `fixtures.targets.NewCls`. \
         It will be removed in v0.4."
    );
}

#[test]
fn chained_wrappers_warn_per_layer() {
    let chains = Chains::new(&Targets::new());
    let (out, warnings) = catch_warnings(|| chains.caller_calls_deprecated.call(&Arguments::new().arg(1).arg(2)));
    assert_eq!(out.unwrap(), json!(3));
    assert_eq!(warnings.len(), 2);

    let (out, warnings) = catch_warnings(|| chains.forwards_to_deprecated.call(&Arguments::new().arg(1)));
    assert_eq!(out.unwrap(), json!(6));
    assert_eq!(warnings.len(), 2);

    let (out, warnings) = catch_warnings(|| {
        chains
            .forwards_to_renaming
            .call(&Arguments::new().kwarg("legacy_a", 3))
    });
    assert_eq!(out.unwrap(), json!(30));
    assert_eq!(warnings.len(), 2);
}
