use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use bindguard_types::{
    CustomValidator, FuncValue, TypeParamDecl, TypeTag, ValidationError, ValidatorKind, Value,
};

use crate::bindings::BindingTable;
use crate::classify::classify;
use crate::model::{CallShape, SeqShape, TypeExpr, TypeParam};
use crate::policy::MatchConfig;

/// Recursive conformance check of a value against a type expression,
/// threading generic bindings through a per-call table.
///
/// The matcher is stateless apart from the borrowed table: it performs no
/// IO, never inspects the host, and never mutates the values it checks.
#[derive(Clone, Copy, Debug)]
pub struct Matcher {
    cfg: MatchConfig,
}

impl Matcher {
    pub fn new(cfg: MatchConfig) -> Self {
        Self { cfg }
    }

    pub fn check(
        &self,
        expr: &TypeExpr,
        value: &Value,
        binds: &mut BindingTable,
    ) -> Result<(), ValidationError> {
        match expr {
            TypeExpr::Unannotated => Ok(()),
            TypeExpr::Any => {
                if self.cfg.strict {
                    Err(ValidationError::StrictMode { at: String::new() })
                } else {
                    Ok(())
                }
            }
            TypeExpr::Concrete(tag) => check_concrete(tag, value),
            TypeExpr::Param(param) => check_param(param, value, binds),
            TypeExpr::Union(members) => self.check_union(members, value, binds),
            TypeExpr::Seq(shape) => self.check_seq(shape, value, binds),
            TypeExpr::Map(shape) => self.check_map(shape.as_ref(), value, binds),
            TypeExpr::Record(fields) => self.check_record(fields, value, binds),
            TypeExpr::Literals(allowed) => check_literals(allowed, value),
            TypeExpr::Callable(shape) => self.check_callable(shape.as_ref(), value),
            TypeExpr::Validator(v) => self.check_validator(v, value),
        }
    }

    /// Members in declared order, first success wins. Every failed attempt
    /// is rolled back before the next one so aborted branches cannot leave
    /// partial bindings behind.
    fn check_union(
        &self,
        members: &[TypeExpr],
        value: &Value,
        binds: &mut BindingTable,
    ) -> Result<(), ValidationError> {
        for member in members {
            let snapshot = binds.snapshot();
            match self.check(member, value, binds) {
                Ok(()) => return Ok(()),
                Err(_) => binds.restore(snapshot),
            }
        }
        let rendered = members
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(" | ");
        Err(ValidationError::failed(format!(
            "value {value} did not match any member of `{rendered}`"
        )))
    }

    fn check_seq(
        &self,
        shape: &SeqShape,
        value: &Value,
        binds: &mut BindingTable,
    ) -> Result<(), ValidationError> {
        let items = match value {
            Value::List(items) | Value::Tuple(items) => items,
            _ => {
                return Err(ValidationError::invalid_type(
                    TypeExpr::Seq(shape.clone()).to_string(),
                    value.to_string(),
                ));
            }
        };
        match shape {
            SeqShape::Homogeneous(elem) => {
                if self.cfg.performance {
                    return Ok(());
                }
                for (i, item) in items.iter().enumerate() {
                    self.check(elem, item, binds)
                        .map_err(|e| e.push_context(&format!("index {i}")))?;
                }
                Ok(())
            }
            SeqShape::Fixed(elems) => {
                if items.len() != elems.len() {
                    return Err(ValidationError::failed(format!(
                        "expected {} elements, got {}",
                        elems.len(),
                        items.len()
                    )));
                }
                if self.cfg.performance {
                    return Ok(());
                }
                for (i, (expr, item)) in elems.iter().zip(items).enumerate() {
                    self.check(expr, item, binds)
                        .map_err(|e| e.push_context(&format!("index {i}")))?;
                }
                Ok(())
            }
        }
    }

    fn check_map(
        &self,
        shape: Option<&crate::model::MapShape>,
        value: &Value,
        binds: &mut BindingTable,
    ) -> Result<(), ValidationError> {
        let Some(entries) = value.entries() else {
            return Err(ValidationError::invalid_type("dict", value.to_string()));
        };
        let Some(shape) = shape else {
            return Ok(());
        };
        if self.cfg.performance {
            return Ok(());
        }
        for (key, val) in entries {
            self.check(&shape.key, key, binds)
                .map_err(|e| e.push_context(&format!("key {key}")))?;
            self.check(&shape.value, val, binds)
                .map_err(|e| e.push_context(&format!("value for key {key}")))?;
        }
        Ok(())
    }

    fn check_record(
        &self,
        fields: &BTreeMap<String, TypeExpr>,
        value: &Value,
        binds: &mut BindingTable,
    ) -> Result<(), ValidationError> {
        if value.entries().is_none() {
            return Err(ValidationError::invalid_type("dict", value.to_string()));
        }
        for (name, expr) in fields {
            let Some(field) = value.field(name) else {
                return Err(ValidationError::failed(format!("missing field `{name}`")));
            };
            // Performance mode stops at outer shape: field presence only.
            if self.cfg.performance {
                continue;
            }
            self.check(expr, field, binds)
                .map_err(|e| e.push_context(&format!("field `{name}`")))?;
        }
        Ok(())
    }

    fn check_callable(
        &self,
        shape: Option<&CallShape>,
        value: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Func(func) = value else {
            return Err(ValidationError::invalid_type("func", value.to_string()));
        };
        let Some(shape) = shape else {
            return Ok(());
        };
        match &func.sig {
            None => {
                if func.is_anonymous() && !self.cfg.implied_lambdas {
                    Err(ValidationError::failed(
                        "anonymous callable carries no annotations; enable implied_lambdas \
                         or use a named function",
                    ))
                } else {
                    // A named callable without declared annotations is
                    // accepted on trust.
                    Ok(())
                }
            }
            Some(sig) => check_callable_sig(func, sig.params.as_slice(), &sig.ret, shape),
        }
    }

    fn check_validator(
        &self,
        validator: &CustomValidator,
        value: &Value,
    ) -> Result<(), ValidationError> {
        match &validator.kind {
            ValidatorKind::Predicate(predicate) => {
                // Failure boundary: a panicking predicate is a failed check,
                // never a propagated panic.
                let outcome = catch_unwind(AssertUnwindSafe(|| predicate(value)));
                match outcome {
                    Ok(true) => Ok(()),
                    Ok(false) => Err(predicate_failure(validator, value, None)),
                    Err(payload) => {
                        Err(predicate_failure(validator, value, panic_message(&payload)))
                    }
                }
            }
            ValidatorKind::AllOf(left, right) => {
                self.check_validator(left, value)?;
                self.check_validator(right, value)
            }
            ValidatorKind::AnyOf(left, right) => {
                if self.check_validator(left, value).is_ok() {
                    return Ok(());
                }
                if self.check_validator(right, value).is_ok() {
                    return Ok(());
                }
                Err(ValidationError::failed(format!(
                    "value {value} failed both branches of `{}`",
                    validator.label()
                )))
            }
        }
    }
}

fn check_concrete(want: &TypeTag, value: &Value) -> Result<(), ValidationError> {
    let conforms = match (want, value) {
        (TypeTag::Class(name), Value::Instance(class)) => class.is_subclass_of(name),
        _ => value.tag() == *want,
    };
    if conforms {
        Ok(())
    } else {
        Err(ValidationError::invalid_type(
            want.to_string(),
            value.to_string(),
        ))
    }
}

fn check_param(
    param: &TypeParam,
    value: &Value,
    binds: &mut BindingTable,
) -> Result<(), ValidationError> {
    if !param.constraints.is_empty() && !param.constraints.contains(&value.tag()) {
        let allowed = param
            .constraints
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" | ");
        return Err(ValidationError::invalid_type(
            format!("{} ({allowed})", param.name),
            value.to_string(),
        ));
    }
    binds.bind(&param.name, value)
}

fn check_literals(allowed: &[Value], value: &Value) -> Result<(), ValidationError> {
    if allowed.contains(value) {
        Ok(())
    } else {
        let rendered = allowed
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(ValidationError::failed(format!(
            "value {value} is not one of literal[{rendered}]"
        )))
    }
}

/// Match a candidate callable's own declared annotations against the
/// expected shape. The candidate is never invoked; its annotations are
/// classified here (with no type parameters in scope) and compared
/// structurally.
fn check_callable_sig(
    func: &FuncValue,
    params: &[bindguard_types::Annotation],
    ret: &bindguard_types::Annotation,
    shape: &CallShape,
) -> Result<(), ValidationError> {
    let empty: BTreeMap<String, TypeParamDecl> = BTreeMap::new();
    let describe = || func.name.as_deref().unwrap_or("<anonymous>").to_string();

    let candidate_params = params
        .iter()
        .map(|p| classify(p, &empty))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            ValidationError::failed(format!("callable `{}` has {e}", describe()))
        })?;
    let candidate_ret = classify(ret, &empty)
        .map_err(|e| ValidationError::failed(format!("callable `{}` has {e}", describe())))?;

    if candidate_params.len() != shape.params.len() {
        return Err(ValidationError::failed(format!(
            "callable `{}` takes {} parameters, expected {}",
            describe(),
            candidate_params.len(),
            shape.params.len()
        )));
    }
    for (i, (expected, actual)) in shape.params.iter().zip(&candidate_params).enumerate() {
        if !shape_compatible(expected, actual) {
            let func = describe();
            return Err(ValidationError::failed(format!(
                "callable `{func}` parameter {i} is `{actual}`, expected `{expected}`"
            )));
        }
    }
    if !shape_compatible(&shape.ret, &candidate_ret) {
        return Err(ValidationError::failed(format!(
            "callable `{}` returns `{candidate_ret}`, expected `{}`",
            describe(),
            shape.ret
        )));
    }
    Ok(())
}

/// Structural compatibility between two declared shapes (no values, no
/// bindings). `Any`, missing annotations, and type parameters act as
/// wildcards; everything else must line up recursively.
fn shape_compatible(expected: &TypeExpr, actual: &TypeExpr) -> bool {
    use TypeExpr::*;
    match (expected, actual) {
        (Any | Unannotated | Param(_), _) => true,
        (_, Any | Unannotated | Param(_)) => true,
        (Union(members), other) => members.iter().any(|m| shape_compatible(m, other)),
        (other, Union(members)) => members.iter().all(|m| shape_compatible(other, m)),
        (Concrete(a), Concrete(b)) => a == b,
        (Seq(SeqShape::Homogeneous(a)), Seq(SeqShape::Homogeneous(b))) => shape_compatible(a, b),
        (Seq(SeqShape::Fixed(a)), Seq(SeqShape::Fixed(b))) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| shape_compatible(x, y))
        }
        (Map(None), Map(_)) | (Map(_), Map(None)) => true,
        (Map(Some(a)), Map(Some(b))) => {
            shape_compatible(&a.key, &b.key) && shape_compatible(&a.value, &b.value)
        }
        (Record(a), Record(b)) => {
            a.len() == b.len()
                && a.iter().all(|(name, ea)| {
                    b.get(name).is_some_and(|eb| shape_compatible(ea, eb))
                })
        }
        (Literals(a), Literals(b)) => a == b,
        (Callable(None), Callable(_)) | (Callable(_), Callable(None)) => true,
        (Callable(Some(a)), Callable(Some(b))) => {
            a.params.len() == b.params.len()
                && a.params
                    .iter()
                    .zip(&b.params)
                    .all(|(x, y)| shape_compatible(x, y))
                && shape_compatible(&a.ret, &b.ret)
        }
        // Validator shapes are opaque; two validators are assumed compatible.
        (Validator(_), Validator(_)) => true,
        _ => false,
    }
}

fn predicate_failure(
    validator: &CustomValidator,
    value: &Value,
    panic_detail: Option<String>,
) -> ValidationError {
    if let Some(base) = &validator.base {
        let base_ok = match (base, value) {
            (TypeTag::Class(name), Value::Instance(class)) => class.is_subclass_of(name),
            _ => value.tag() == *base,
        };
        if !base_ok {
            return ValidationError::invalid_type(base.to_string(), value.to_string());
        }
    }
    let detail = match (panic_detail, &validator.message) {
        (Some(panic), _) => format!(
            "value {value} failed validator `{}`: {panic}",
            validator.label()
        ),
        (None, Some(message)) => format!("value {value} failed validation: {message}"),
        (None, None) => format!("value {value} failed validator `{}`", validator.label()),
    };
    ValidationError::failed(detail)
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MapShape;
    use crate::test_support::{expr_int, expr_param, expr_str, lenient, strict, table};
    use bindguard_types::{Annotation, ClassDef, FuncSig, validator};

    fn m() -> Matcher {
        Matcher::new(strict())
    }

    #[test]
    fn concrete_accepts_exact_runtime_type_only() {
        let mut binds = table(&[]);
        assert!(m().check(&expr_int(), &Value::Int(3), &mut binds).is_ok());

        let err = m()
            .check(&expr_int(), &Value::str("3"), &mut binds)
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType { .. }));

        // No numeric coercion in either direction.
        assert!(m().check(&expr_int(), &Value::Float(3.0), &mut binds).is_err());
        assert!(
            m().check(&TypeExpr::Concrete(TypeTag::Float), &Value::Int(3), &mut binds)
                .is_err()
        );
    }

    #[test]
    fn instances_satisfy_ancestor_class_annotations() {
        let animal = ClassDef::new("Animal");
        let dog = ClassDef::with_bases("Dog", vec![animal]);
        let value = Value::Instance(dog);
        let mut binds = table(&[]);

        let as_animal = TypeExpr::Concrete(TypeTag::Class("Animal".to_string()));
        let as_cat = TypeExpr::Concrete(TypeTag::Class("Cat".to_string()));
        assert!(m().check(&as_animal, &value, &mut binds).is_ok());
        assert!(m().check(&as_cat, &value, &mut binds).is_err());
    }

    #[test]
    fn unannotated_always_passes_but_any_respects_strict() {
        let mut binds = table(&[]);
        assert!(
            m().check(&TypeExpr::Unannotated, &Value::Int(1), &mut binds)
                .is_ok()
        );

        let err = m().check(&TypeExpr::Any, &Value::Int(1), &mut binds).unwrap_err();
        assert!(matches!(err, ValidationError::StrictMode { .. }));

        let relaxed = Matcher::new(lenient());
        assert!(relaxed.check(&TypeExpr::Any, &Value::Int(1), &mut binds).is_ok());
    }

    #[test]
    fn param_commits_then_requires_exact_type() {
        let mut binds = table(&["T"]);
        let t = expr_param("T", &[]);

        m().check(&t, &Value::Int(1), &mut binds).unwrap();
        m().check(&t, &Value::Int(2), &mut binds).unwrap();
        let err = m().check(&t, &Value::str("x"), &mut binds).unwrap_err();
        assert!(matches!(err, ValidationError::Binding { .. }));
    }

    #[test]
    fn constrained_param_rejects_outside_types_before_binding() {
        let mut binds = table(&["T"]);
        let t = expr_param("T", &[TypeTag::Int, TypeTag::Float]);

        m().check(&t, &Value::Int(1), &mut binds).unwrap();
        let err = m().check(&t, &Value::str("x"), &mut binds).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType { .. }));
        // The failed constraint check bound nothing.
        assert_eq!(binds.get("T").unwrap().instances.len(), 1);
    }

    #[test]
    fn union_takes_first_matching_member() {
        let mut binds = table(&["T"]);
        let expr = TypeExpr::Union(vec![expr_int(), expr_param("T", &[])]);

        // int branch wins, T stays unbound.
        m().check(&expr, &Value::Int(1), &mut binds).unwrap();
        assert_eq!(binds.committed("T"), None);

        // str falls through to the T branch.
        m().check(&expr, &Value::str("s"), &mut binds).unwrap();
        assert_eq!(binds.committed("T"), Some(&TypeTag::Str));
    }

    #[test]
    fn failed_union_branch_rolls_back_partial_bindings() {
        let mut binds = table(&["T"]);
        // First member binds T per element, then fails deep inside the
        // container; the partial T=int commit must not leak.
        let expr = TypeExpr::Union(vec![
            TypeExpr::Seq(SeqShape::Fixed(vec![expr_param("T", &[]), expr_int()])),
            TypeExpr::Concrete(TypeTag::List),
        ]);
        let value = Value::list(vec![Value::Int(1), Value::str("x")]);

        m().check(&expr, &value, &mut binds).unwrap();
        assert_eq!(binds.committed("T"), None);

        // An independent conflicting bind still works.
        m().check(&expr_param("T", &[]), &Value::str("s"), &mut binds)
            .unwrap();
        assert_eq!(binds.committed("T"), Some(&TypeTag::Str));
    }

    #[test]
    fn union_total_failure_restores_and_reports() {
        let mut binds = table(&["T"]);
        let expr = TypeExpr::Union(vec![
            TypeExpr::Seq(SeqShape::Homogeneous(Box::new(expr_param("T", &[])))),
            expr_int(),
        ]);
        // Heterogeneous list fails the first member after binding T,
        // and is no int either.
        let err = m()
            .check(
                &expr,
                &Value::list(vec![Value::Int(1), Value::str("x")]),
                &mut binds,
            )
            .unwrap_err();
        assert!(matches!(err, ValidationError::Failed { .. }));
        assert_eq!(binds.committed("T"), None);
    }

    #[test]
    fn homogeneous_sequence_names_offending_index() {
        let mut binds = table(&[]);
        let expr = TypeExpr::Seq(SeqShape::Homogeneous(Box::new(expr_int())));

        m().check(
            &expr,
            &Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            &mut binds,
        )
        .unwrap();
        // Vacuous pass on empty.
        m().check(&expr, &Value::list(vec![]), &mut binds).unwrap();

        let err = m()
            .check(
                &expr,
                &Value::list(vec![Value::Int(1), Value::str("x"), Value::Int(3)]),
                &mut binds,
            )
            .unwrap_err();
        assert!(err.to_string().contains("index 1"), "{err}");
    }

    #[test]
    fn fixed_sequence_requires_exact_length() {
        let mut binds = table(&[]);
        let expr = TypeExpr::Seq(SeqShape::Fixed(vec![expr_int(), expr_str()]));

        m().check(
            &expr,
            &Value::tuple(vec![Value::Int(1), Value::str("a")]),
            &mut binds,
        )
        .unwrap();

        let err = m()
            .check(&expr, &Value::tuple(vec![Value::Int(1)]), &mut binds)
            .unwrap_err();
        assert!(err.to_string().contains("expected 2 elements"), "{err}");
    }

    #[test]
    fn untyped_mapping_passes_typed_mapping_checks_entries() {
        let mut binds = table(&[]);
        let value = Value::map(vec![
            (Value::str("a"), Value::Int(1)),
            (Value::str("b"), Value::Int(2)),
        ]);

        m().check(&TypeExpr::Map(None), &value, &mut binds).unwrap();

        let typed = TypeExpr::Map(Some(MapShape {
            key: Box::new(expr_str()),
            value: Box::new(expr_int()),
        }));
        m().check(&typed, &value, &mut binds).unwrap();

        let bad = Value::map(vec![(Value::str("a"), Value::str("one"))]);
        let err = m().check(&typed, &bad, &mut binds).unwrap_err();
        assert!(err.to_string().contains("key \"a\""), "{err}");

        assert!(m().check(&typed, &Value::Int(1), &mut binds).is_err());
    }

    #[test]
    fn record_requires_every_declared_field() {
        let mut binds = table(&[]);
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), expr_str());
        fields.insert("age".to_string(), expr_int());
        let expr = TypeExpr::Record(fields);

        let ok = Value::map(vec![
            (Value::str("name"), Value::str("ada")),
            (Value::str("age"), Value::Int(36)),
            (Value::str("extra"), Value::Unit),
        ]);
        m().check(&expr, &ok, &mut binds).unwrap();

        let missing = Value::map(vec![(Value::str("name"), Value::str("ada"))]);
        let err = m().check(&expr, &missing, &mut binds).unwrap_err();
        assert!(err.to_string().contains("missing field `age`"), "{err}");

        let wrong = Value::map(vec![
            (Value::str("name"), Value::str("ada")),
            (Value::str("age"), Value::str("old")),
        ]);
        let err = m().check(&expr, &wrong, &mut binds).unwrap_err();
        assert!(err.to_string().contains("field `age`"), "{err}");
    }

    #[test]
    fn performance_mode_skips_deep_checks_only() {
        let cfg = MatchConfig {
            performance: true,
            ..strict()
        };
        let fast = Matcher::new(cfg);
        let mut binds = table(&[]);

        // Wrong element types pass once the outer shape is right.
        let seq = TypeExpr::Seq(SeqShape::Homogeneous(Box::new(expr_int())));
        fast.check(&seq, &Value::list(vec![Value::str("x")]), &mut binds)
            .unwrap();
        // Outer shape is still enforced.
        assert!(fast.check(&seq, &Value::Int(1), &mut binds).is_err());

        // Fixed arity still checks length.
        let fixed = TypeExpr::Seq(SeqShape::Fixed(vec![expr_int(), expr_int()]));
        assert!(
            fast.check(&fixed, &Value::tuple(vec![Value::Int(1)]), &mut binds)
                .is_err()
        );

        // Records still require field presence.
        let mut fields = BTreeMap::new();
        fields.insert("age".to_string(), expr_int());
        let record = TypeExpr::Record(fields);
        fast.check(
            &record,
            &Value::map(vec![(Value::str("age"), Value::str("old"))]),
            &mut binds,
        )
        .unwrap();
        assert!(fast.check(&record, &Value::map(vec![]), &mut binds).is_err());
    }

    #[test]
    fn literal_set_matches_by_equality() {
        let mut binds = table(&[]);
        let expr = TypeExpr::Literals(vec![Value::str("r"), Value::str("w"), Value::Int(0)]);

        m().check(&expr, &Value::str("w"), &mut binds).unwrap();
        m().check(&expr, &Value::Int(0), &mut binds).unwrap();
        assert!(m().check(&expr, &Value::str("x"), &mut binds).is_err());
        // Int 0 is allowed, float 0.0 is a different value.
        assert!(m().check(&expr, &Value::Float(0.0), &mut binds).is_err());
    }

    #[test]
    fn callable_shape_matches_declared_annotations() {
        let mut binds = table(&[]);
        let expected = TypeExpr::Callable(Some(CallShape {
            params: vec![expr_int()],
            ret: Box::new(expr_str()),
        }));

        let good = Value::Func(FuncValue::named(
            "render",
            Some(FuncSig::new(
                vec![Annotation::name("int")],
                Annotation::name("str"),
            )),
        ));
        m().check(&expected, &good, &mut binds).unwrap();

        let wrong_ret = Value::Func(FuncValue::named(
            "render",
            Some(FuncSig::new(
                vec![Annotation::name("int")],
                Annotation::name("bool"),
            )),
        ));
        let err = m().check(&expected, &wrong_ret, &mut binds).unwrap_err();
        assert!(err.to_string().contains("returns"), "{err}");

        let wrong_arity = Value::Func(FuncValue::named(
            "render",
            Some(FuncSig::new(vec![], Annotation::name("str"))),
        ));
        assert!(m().check(&expected, &wrong_arity, &mut binds).is_err());

        // Not a callable at all.
        assert!(m().check(&expected, &Value::Int(1), &mut binds).is_err());
    }

    #[test]
    fn anonymous_callables_require_implied_lambdas() {
        let mut binds = table(&[]);
        let expected = TypeExpr::Callable(Some(CallShape {
            params: vec![expr_int()],
            ret: Box::new(expr_int()),
        }));
        let lambda = Value::Func(FuncValue::anonymous());

        assert!(m().check(&expected, &lambda, &mut binds).is_err());

        let cfg = MatchConfig {
            implied_lambdas: true,
            ..strict()
        };
        Matcher::new(cfg).check(&expected, &lambda, &mut binds).unwrap();

        // A named function without annotations is accepted on trust.
        let bare = Value::Func(FuncValue::named("helper", None));
        m().check(&expected, &bare, &mut binds).unwrap();

        // A shapeless callable expression needs only an invocable value.
        m().check(&TypeExpr::Callable(None), &lambda, &mut binds)
            .unwrap();
    }

    #[test]
    fn predicate_failure_prefers_base_type_mismatch() {
        let mut binds = table(&[]);
        let is_even = validator(
            |v| matches!(v, Value::Int(i) if i % 2 == 0),
            Some(TypeTag::Int),
            Some("must be even"),
        )
        .named("is_even");
        let expr = TypeExpr::Validator(is_even);

        m().check(&expr, &Value::Int(4), &mut binds).unwrap();

        // Wrong base type reported as the stronger failure.
        let err = m().check(&expr, &Value::str("4"), &mut binds).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType { .. }));

        // Right base type, predicate false: message surfaces.
        let err = m().check(&expr, &Value::Int(3), &mut binds).unwrap_err();
        assert!(err.to_string().contains("must be even"), "{err}");
    }

    #[test]
    fn panicking_predicate_is_a_failed_check() {
        let mut binds = table(&[]);
        let boom = validator(|_| panic!("predicate exploded"), None, None).named("boom");
        let err = m()
            .check(&TypeExpr::Validator(boom), &Value::Int(1), &mut binds)
            .unwrap_err();
        assert!(err.to_string().contains("predicate exploded"), "{err}");
    }

    #[test]
    fn and_or_combinators_short_circuit() {
        let mut binds = table(&[]);
        let is_even = validator(
            |v| matches!(v, Value::Int(i) if i % 2 == 0),
            None,
            Some("must be even"),
        )
        .named("is_even");
        let is_positive = validator(
            |v| matches!(v, Value::Int(i) if *i > 0),
            None,
            Some("must be positive"),
        )
        .named("is_positive");

        let both = TypeExpr::Validator(is_even.clone().and(is_positive.clone()));
        m().check(&both, &Value::Int(4), &mut binds).unwrap();
        // -4: even passes, positive fails; its message is surfaced.
        let err = m().check(&both, &Value::Int(-4), &mut binds).unwrap_err();
        assert!(err.to_string().contains("must be positive"), "{err}");
        // 3: even fails first, short-circuit.
        let err = m().check(&both, &Value::Int(3), &mut binds).unwrap_err();
        assert!(err.to_string().contains("must be even"), "{err}");

        let either = TypeExpr::Validator(is_even.or(is_positive));
        m().check(&either, &Value::Int(3), &mut binds).unwrap();
        m().check(&either, &Value::Int(-4), &mut binds).unwrap();
        let err = m().check(&either, &Value::Int(-3), &mut binds).unwrap_err();
        assert!(err.to_string().contains("both branches"), "{err}");
    }

    #[test]
    fn nested_combinators_compose() {
        let mut binds = table(&[]);
        let small = validator(|v| matches!(v, Value::Int(i) if i.abs() < 10), None, None);
        let even = validator(|v| matches!(v, Value::Int(i) if i % 2 == 0), None, None);
        let positive = validator(|v| matches!(v, Value::Int(i) if *i > 0), None, None);

        // (even AND positive) OR small
        let expr = TypeExpr::Validator(even.and(positive).or(small));
        m().check(&expr, &Value::Int(4), &mut binds).unwrap();
        m().check(&expr, &Value::Int(-3), &mut binds).unwrap();
        assert!(m().check(&expr, &Value::Int(-12), &mut binds).is_err());
    }

    #[test]
    fn shape_compatibility_treats_wildcards_loosely() {
        assert!(shape_compatible(&TypeExpr::Any, &expr_int()));
        assert!(shape_compatible(&expr_int(), &TypeExpr::Unannotated));
        assert!(shape_compatible(
            &TypeExpr::Union(vec![expr_int(), expr_str()]),
            &expr_str()
        ));
        assert!(!shape_compatible(&expr_int(), &expr_str()));
        assert!(!shape_compatible(
            &TypeExpr::Seq(SeqShape::Homogeneous(Box::new(expr_int()))),
            &TypeExpr::Seq(SeqShape::Homogeneous(Box::new(expr_str())))
        ));
    }
}
