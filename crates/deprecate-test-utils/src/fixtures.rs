//! Fixture modules shared by the workspace tests
//!
//! All live under the `fixtures` package:
//!
//! - `fixtures.targets`: replacement implementations
//! - `fixtures.deprecate`: forwarding wrappers in every configuration
//! - `fixtures.degenerate`: wrappers with zero or questionable effect
//! - `fixtures.chains`: wrappers that call or forward to other wrappers
//! - `fixtures.misconfigured`: only broken wrappers

use deprecate_audit::{Module, ModuleRegistry};
use deprecate_core::{
    deprecated, ArgMap, Arguments, BoundArguments, CallError, Callable, Class, DeferredTarget,
    Parameter, Signature, Stream, Target,
};
use serde_json::{json, Value};

pub const PACKAGE: &str = "fixtures";
pub const PACKAGE_VERSION: &str = "0.3";

/// Replacement implementations
#[derive(Debug, Clone)]
pub struct Targets {
    pub base_sum_kwargs: Callable,
    pub base_pow_args: Callable,
    pub accuracy_score: Callable,
    pub new_cls: Class,
}

impl Targets {
    pub fn new() -> Self {
        let module = "fixtures.targets";
        Self {
            base_sum_kwargs: Callable::builder("base_sum_kwargs")
                .module(module)
                .param(Parameter::optional("a", 0))
                .param(Parameter::optional("b", 3))
                .body(|args| Ok(json!(args.extract::<i64>("a")? + args.extract::<i64>("b")?))),
            base_pow_args: Callable::builder("base_pow_args")
                .module(module)
                .param(Parameter::required("a"))
                .param(Parameter::required("b"))
                .body(|args| Ok(json!(args.extract::<f64>("a")?.powf(args.extract::<f64>("b")?)))),
            accuracy_score: Callable::builder("accuracy_score")
                .module(module)
                .param(Parameter::required("y_true"))
                .param(Parameter::required("y_pred"))
                .body(accuracy),
            new_cls: Class::builder("NewCls")
                .module(module)
                .doc("Replacement class.")
                .init(
                    Signature::new([Parameter::required("c"), Parameter::optional("d", "abc")]),
                    |args| Ok(json!({ "my_c": args.get("c"), "my_d": args.get("d") })),
                )
                .build(),
        }
    }

    pub fn module(&self) -> Module {
        Module::builder("fixtures.targets")
            .function(self.base_sum_kwargs.clone())
            .function(self.base_pow_args.clone())
            .function(self.accuracy_score.clone())
            .class(self.new_cls.clone())
            .build()
    }
}

impl Default for Targets {
    fn default() -> Self {
        Self::new()
    }
}

fn accuracy(args: &BoundArguments) -> Result<Value, CallError> {
    let truth: Vec<Value> = args.extract("y_true")?;
    let predicted: Vec<Value> = args.extract("y_pred")?;
    if truth.len() != predicted.len() || truth.is_empty() {
        return Err(CallError::failed("y_true and y_pred must be non-empty and of equal length"));
    }
    let hits = truth.iter().zip(&predicted).filter(|(t, p)| t == p).count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = hits as f64 / truth.len() as f64;
    Ok(json!(ratio))
}

fn declared(module: &str, name: &str, params: impl IntoIterator<Item = Parameter>) -> Callable {
    Callable::builder(name)
        .module(module)
        .signature(Signature::new(params))
        .declared()
}

fn sum_params(b: i64) -> [Parameter; 2] {
    [Parameter::required("a"), Parameter::optional("b", b)]
}

/// Wrapper callables of `fixtures.deprecate`
#[derive(Debug, Clone)]
pub struct DeprecateCollection {
    pub depr_sum: Callable,
    pub depr_sum_warn_only: Callable,
    pub depr_sum_no_stream: Callable,
    pub depr_sum_calls_2: Callable,
    pub depr_sum_calls_inf: Callable,
    pub depr_sum_msg: Callable,
    pub depr_pow_args: Callable,
    pub depr_pow_mix: Callable,
    pub depr_pow_wrong: Callable,
    pub depr_accuracy_skip: Callable,
    pub depr_accuracy_map: Callable,
    pub depr_accuracy_extra: Callable,
    pub depr_pow_self: Callable,
    pub past_cls: Class,
}

impl DeprecateCollection {
    pub fn new(targets: &Targets) -> Self {
        let m = "fixtures.deprecate";
        let sum = || deprecated(&targets.base_sum_kwargs);
        let pow = || deprecated(&targets.base_pow_args);
        let accuracy = || deprecated(&targets.accuracy_score);

        let past_cls = Class::builder("PastCls")
            .module(m)
            .doc("Deprecated class.")
            .init_declared(Signature::new([Parameter::required("c"), Parameter::optional("d", "efg")]))
            .build();

        Self {
            depr_sum: sum()
                .deprecated_in("0.1")
                .remove_in("0.5")
                .wrap(&declared(m, "depr_sum", sum_params(5)))
                .unwrap(),
            depr_sum_warn_only: deprecated(Target::Absent)
                .deprecated_in("0.2")
                .remove_in("0.3")
                .wrap(
                    &Callable::builder("depr_sum_warn_only")
                        .module(m)
                        .signature(Signature::new(sum_params(5)))
                        .body(|args| Ok(json!(args.extract::<i64>("a")? + args.extract::<i64>("b")?))),
                )
                .unwrap(),
            depr_sum_no_stream: sum()
                .deprecated_in("0.1")
                .remove_in("0.6")
                .stream(Stream::Disabled)
                .wrap(&declared(m, "depr_sum_no_stream", sum_params(5)))
                .unwrap(),
            depr_sum_calls_2: sum()
                .deprecated_in("0.1")
                .remove_in("0.7")
                .num_warns(2)
                .wrap(&declared(m, "depr_sum_calls_2", sum_params(5)))
                .unwrap(),
            depr_sum_calls_inf: sum()
                .deprecated_in("0.1")
                .remove_in("0.7")
                .num_warns(-1)
                .wrap(&declared(m, "depr_sum_calls_inf", sum_params(5)))
                .unwrap(),
            depr_sum_msg: sum()
                .deprecated_in("0.1")
                .remove_in("0.5")
                .template("v{deprecated_in}: `{source_name}` was deprecated, use `{target_name}`")
                .wrap(&declared(m, "depr_sum_msg", sum_params(5)))
                .unwrap(),
            depr_pow_args: pow()
                .deprecated_in("1.0")
                .remove_in("1.3")
                .wrap(&declared(m, "depr_pow_args", [Parameter::required("a"), Parameter::required("b")]))
                .unwrap(),
            depr_pow_mix: pow()
                .deprecated_in("0.1")
                .remove_in("0.5")
                .wrap(&declared(m, "depr_pow_mix", [Parameter::required("a"), Parameter::optional("b", 4)]))
                .unwrap(),
            depr_pow_wrong: pow()
                .deprecated_in("0.1")
                .remove_in("0.5")
                .wrap(&declared(m, "depr_pow_wrong", [Parameter::required("a"), Parameter::optional("c", 4)]))
                .unwrap(),
            depr_accuracy_skip: accuracy()
                .arg("preds", "y_pred")
                .arg("yeah_arg", ArgMap::Drop)
                .wrap(&declared(
                    m,
                    "depr_accuracy_skip",
                    [
                        Parameter::required("preds"),
                        Parameter::optional("y_true", json!([0, 1, 1, 2])),
                        Parameter::optional("yeah_arg", 1.23),
                    ],
                ))
                .unwrap(),
            depr_accuracy_map: accuracy()
                .arg("preds", "y_pred")
                .arg("truth", "y_true")
                .wrap(&declared(
                    m,
                    "depr_accuracy_map",
                    [
                        Parameter::required("preds"),
                        Parameter::optional("truth", json!([0, 1, 1, 2])),
                    ],
                ))
                .unwrap(),
            depr_accuracy_extra: accuracy()
                .extra("y_pred", json!([0, 1, 1, 1]))
                .wrap(&declared(
                    m,
                    "depr_accuracy_extra",
                    [
                        Parameter::required("y_pred"),
                        Parameter::optional("y_true", json!([0, 1, 1, 2])),
                    ],
                ))
                .unwrap(),
            depr_pow_self: deprecated(Target::Absent)
                .deprecated_in("0.1")
                .remove_in("0.5")
                .arg("pow", "super_pow")
                .wrap(
                    &Callable::builder("depr_pow_self")
                        .module(m)
                        .param(Parameter::required("base"))
                        .param(Parameter::required("pow"))
                        .param(Parameter::required("super_pow"))
                        .body(|args| {
                            Ok(json!(args.extract::<f64>("base")?.powf(args.extract::<f64>("super_pow")?)))
                        }),
                )
                .unwrap(),
            past_cls: deprecated(Target::class(&targets.new_cls))
                .deprecated_in("0.2")
                .remove_in("0.4")
                .wrap_class(&past_cls)
                .unwrap(),
        }
    }

    pub fn module(&self) -> Module {
        Module::builder("fixtures.deprecate")
            .function(self.depr_sum.clone())
            .function(self.depr_sum_warn_only.clone())
            .function(self.depr_sum_no_stream.clone())
            .function(self.depr_sum_calls_2.clone())
            .function(self.depr_sum_calls_inf.clone())
            .function(self.depr_sum_msg.clone())
            .function(self.depr_pow_args.clone())
            .function(self.depr_pow_mix.clone())
            .function(self.depr_pow_wrong.clone())
            .function(self.depr_accuracy_skip.clone())
            .function(self.depr_accuracy_map.clone())
            .function(self.depr_accuracy_extra.clone())
            .function(self.depr_pow_self.clone())
            .class(self.past_cls.clone())
            .build()
    }
}

fn two_args(module: &str, name: &str) -> Callable {
    Callable::builder(name)
        .module(module)
        .param(Parameter::optional("arg1", 1))
        .param(Parameter::optional("arg2", 2))
        .body(|args| Ok(json!(args.extract::<i64>("arg1")? + args.extract::<i64>("arg2")?)))
}

fn self_deprecation(mapping: &[(&str, &str)]) -> deprecate_core::Deprecated {
    mapping.iter().fold(
        deprecated(Target::SelfReference).deprecated_in("0.1").remove_in("0.5"),
        |config, (source, mapped)| config.arg(*source, *mapped),
    )
}

/// Wrappers of `fixtures.degenerate`, by name
pub fn degenerate(targets: &Targets) -> Module {
    let m = "fixtures.degenerate";

    let valid = deprecated(&targets.base_sum_kwargs)
        .deprecated_in("0.1")
        .remove_in("0.5")
        .wrap(&declared(m, "valid_deprecation", sum_params(5)))
        .unwrap();
    let valid_self = self_deprecation(&[("old_arg", "new_arg")])
        .wrap(
            &Callable::builder("valid_self_deprecation")
                .module(m)
                .param(Parameter::optional("old_arg", 1))
                .param(Parameter::optional("new_arg", 2))
                .body(|args| Ok(args.get("new_arg").cloned().unwrap_or(Value::Null))),
        )
        .unwrap();
    let partial = self_deprecation(&[("arg1", "arg1"), ("arg2", "new_arg2")])
        .wrap(
            &Callable::builder("partial_identity_mapping_deprecation")
                .module(m)
                .param(Parameter::optional("arg1", 1))
                .param(Parameter::optional("arg2", 0))
                .param(Parameter::optional("new_arg2", 2))
                .body(|args| Ok(json!(args.extract::<i64>("arg1")? + args.extract::<i64>("new_arg2")?))),
        )
        .unwrap();

    let self_slot = DeferredTarget::new("fixtures.degenerate.self_referencing_deprecation");
    let self_referencing = deprecated(&self_slot)
        .deprecated_in("0.1")
        .remove_in("0.5")
        .arg("old_arg", "new_arg")
        .wrap(&declared(
            m,
            "self_referencing_deprecation",
            [Parameter::optional("old_arg", 1), Parameter::optional("new_arg", 2)],
        ))
        .unwrap();
    self_slot.bind(self_referencing.clone()).unwrap();

    misconfigured_members(Module::builder(m), m)
        .function(valid)
        .function(valid_self)
        .function(partial)
        .function(self_referencing)
        .build()
}

/// Only broken wrappers: `fixtures.misconfigured`
pub fn misconfigured() -> Module {
    let m = "fixtures.misconfigured";
    misconfigured_members(Module::builder(m), m).build()
}

fn misconfigured_members(builder: deprecate_audit::ModuleBuilder, m: &str) -> deprecate_audit::ModuleBuilder {
    let invalid = self_deprecation(&[("nonexistent_arg", "new_arg")])
        .wrap(&declared(m, "invalid_args_deprecation", [Parameter::optional("real_arg", 1)]))
        .unwrap();
    builder
        .function(invalid)
        .function(self_deprecation(&[]).wrap(&two_args(m, "empty_mapping_deprecation")).unwrap())
        .function(
            self_deprecation(&[("arg1", "arg1")])
                .wrap(&two_args(m, "identity_mapping_deprecation"))
                .unwrap(),
        )
        .function(
            self_deprecation(&[("arg1", "arg1"), ("arg2", "arg2")])
                .wrap(&two_args(m, "all_identity_mapping_deprecation"))
                .unwrap(),
        )
}

/// Wrappers of `fixtures.chains`
#[derive(Debug, Clone)]
pub struct Chains {
    pub deprecated_callee: Callable,
    pub deprecated_callee_no_target: Callable,
    pub deprecated_callee_with_args: Callable,
    pub caller_calls_deprecated: Callable,
    pub caller_no_deprecated_calls: Callable,
    pub forwards_to_deprecated: Callable,
    pub forwards_to_renaming: Callable,
    pub renaming_callee: Callable,
    pub stacked_renaming: Callable,
}

impl Chains {
    pub fn new(targets: &Targets) -> Self {
        let m = "fixtures.chains";
        let window = |config: deprecate_core::Deprecated| config.deprecated_in("1.0").remove_in("2.0");
        let caller_window = |config: deprecate_core::Deprecated| config.deprecated_in("1.5").remove_in("2.5");

        let deprecated_callee = window(deprecated(&targets.base_sum_kwargs))
            .wrap(&declared(m, "deprecated_callee", sum_params(5)))
            .unwrap();
        let deprecated_callee_no_target = window(deprecated(Target::Absent))
            .wrap(
                &Callable::builder("deprecated_callee_no_target")
                    .module(m)
                    .signature(Signature::new(sum_params(5)))
                    .body(|args| Ok(json!(args.extract::<i64>("a")? + args.extract::<i64>("b")? + 1))),
            )
            .unwrap();
        let deprecated_callee_with_args = window(deprecated(&targets.base_pow_args))
            .arg("old_arg", "a")
            .wrap(&declared(
                m,
                "deprecated_callee_with_args",
                [Parameter::required("old_arg"), Parameter::optional("b", 2)],
            ))
            .unwrap();

        let callee = deprecated_callee.clone();
        let caller_calls_deprecated = caller_window(deprecated(Target::Absent))
            .wrap(
                &Callable::builder("caller_calls_deprecated")
                    .module(m)
                    .signature(Signature::new(sum_params(5)))
                    .body(move |args| {
                        callee.call(&Arguments::new().arg(args.extract::<i64>("a")?).arg(args.extract::<i64>("b")?))
                    }),
            )
            .unwrap();
        let base = targets.base_sum_kwargs.clone();
        let caller_no_deprecated_calls = caller_window(deprecated(Target::Absent))
            .wrap(
                &Callable::builder("caller_no_deprecated_calls")
                    .module(m)
                    .signature(Signature::new(sum_params(3)))
                    .body(move |args| {
                        base.call(&Arguments::new().arg(args.extract::<i64>("a")?).arg(args.extract::<i64>("b")?))
                    }),
            )
            .unwrap();

        let forwards_to_deprecated = caller_window(deprecated(&deprecated_callee))
            .wrap(&declared(m, "forwards_to_deprecated", sum_params(5)))
            .unwrap();
        let renaming_callee = window(deprecated(Target::SelfReference))
            .arg("old_a", "a")
            .wrap(
                &Callable::builder("renaming_callee")
                    .module(m)
                    .param(Parameter::optional("old_a", 0))
                    .param(Parameter::optional("a", 0))
                    .body(|args| Ok(json!(args.extract::<i64>("a")? * 10))),
            )
            .unwrap();
        let forwards_to_renaming = caller_window(deprecated(&renaming_callee))
            .arg("legacy_a", "old_a")
            .wrap(&declared(m, "forwards_to_renaming", [Parameter::optional("legacy_a", 0)]))
            .unwrap();
        let stacked_renaming = caller_window(deprecated(Target::SelfReference))
            .arg("older_a", "old_a")
            .wrap(
                &window(deprecated(Target::SelfReference))
                    .arg("old_a", "a")
                    .wrap(
                        &Callable::builder("stacked_renaming")
                            .module(m)
                            .param(Parameter::optional("older_a", 0))
                            .param(Parameter::optional("old_a", 0))
                            .param(Parameter::optional("a", 0))
                            .body(|args| Ok(json!(args.extract::<i64>("a")?))),
                    )
                    .unwrap(),
            )
            .unwrap();

        Self {
            deprecated_callee,
            deprecated_callee_no_target,
            deprecated_callee_with_args,
            caller_calls_deprecated,
            caller_no_deprecated_calls,
            forwards_to_deprecated,
            forwards_to_renaming,
            renaming_callee,
            stacked_renaming,
        }
    }

    pub fn module(&self) -> Module {
        Module::builder("fixtures.chains")
            .function(self.deprecated_callee.clone())
            .function(self.deprecated_callee_no_target.clone())
            .function(self.deprecated_callee_with_args.clone())
            .function(self.caller_calls_deprecated.clone())
            .function(self.caller_no_deprecated_calls.clone())
            .function(self.forwards_to_deprecated.clone())
            .function(self.forwards_to_renaming.clone())
            .function(self.renaming_callee.clone())
            .function(self.stacked_renaming.clone())
            .build()
    }
}

/// The whole `fixtures` package with every collection as a submodule
pub fn package() -> Module {
    let targets = Targets::new();
    Module::builder(PACKAGE)
        .version(PACKAGE_VERSION)
        .submodule(targets.module())
        .submodule(DeprecateCollection::new(&targets).module())
        .submodule(degenerate(&targets))
        .submodule(Chains::new(&targets).module())
        .lazy_submodule("fixtures.misconfigured", || Ok(misconfigured()))
        .build()
}

/// Registry holding [`package`]
pub fn registry() -> ModuleRegistry {
    let registry = ModuleRegistry::new();
    registry.register(package());
    registry
}
