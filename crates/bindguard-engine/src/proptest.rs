//! Property-based tests for the matching engine.
//!
//! These tests use proptest to verify invariants around:
//! - Binding commit consistency (exact type, no widening)
//! - Transactional rollback of failed union branches
//! - Determinism of repeated matching

use proptest::prelude::*;

use bindguard_types::{TypeTag, ValidationError, Value};

use crate::bindings::BindingTable;
use crate::matcher::Matcher;
use crate::model::{SeqShape, TypeExpr, TypeParam};
use crate::policy::MatchConfig;

/// Strategy for primitive values (everything a binding can commit to
/// without class machinery).
fn arb_primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Unit),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<f64>().prop_filter("NaN breaks equality", |f| !f.is_nan()).prop_map(Value::Float),
        "[a-z]{0,8}".prop_map(Value::Str),
    ]
}

/// Strategy for short lists of primitives.
fn arb_primitive_list() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_primitive(), 0..6)
}

fn param_t() -> TypeExpr {
    TypeExpr::Param(TypeParam {
        name: "T".to_string(),
        constraints: vec![],
    })
}

fn fresh_table() -> BindingTable {
    BindingTable::new(["T".to_string()])
}

proptest! {
    /// Restoring a snapshot always returns the table to the exact state
    /// it was captured in, whatever happened in between.
    #[test]
    fn snapshot_restore_is_identity(before in arb_primitive_list(), after in arb_primitive_list()) {
        let mut table = fresh_table();
        for v in &before {
            // Only same-tag values bind; ignore conflicts here.
            let _ = table.bind("T", v);
        }
        let reference = table.clone();
        let snap = table.snapshot();

        for v in &after {
            let _ = table.bind("T", v);
        }
        table.restore(snap);

        prop_assert_eq!(table, reference);
    }

    /// Binding two values of the same runtime type always succeeds;
    /// two distinct runtime types always conflict.
    #[test]
    fn bind_commits_exactly_one_type(a in arb_primitive(), b in arb_primitive()) {
        let mut table = fresh_table();
        table.bind("T", &a).unwrap();

        let second = table.bind("T", &b);
        if a.tag() == b.tag() {
            prop_assert!(second.is_ok());
            prop_assert_eq!(table.get("T").unwrap().instances.len(), 2);
        } else {
            let is_binding_err = matches!(second, Err(ValidationError::Binding { .. }));
            prop_assert!(is_binding_err);
            // The failed bind recorded nothing.
            prop_assert_eq!(table.get("T").unwrap().instances.len(), 1);
        }
        prop_assert_eq!(table.committed("T"), Some(&a.tag()));
    }

    /// A union match that fails overall leaves the binding table exactly
    /// as it found it, even when members bind before failing.
    #[test]
    fn failed_union_leaves_no_residue(items in prop::collection::vec(arb_primitive(), 1..5)) {
        let matcher = Matcher::new(MatchConfig::default());
        let mut table = fresh_table();

        // Every member walks the list binding T per element; a list with
        // mixed tags fails all of them. `int` can never match a list.
        let expr = TypeExpr::Union(vec![
            TypeExpr::Seq(SeqShape::Homogeneous(Box::new(param_t()))),
            TypeExpr::Concrete(TypeTag::Int),
        ]);
        let value = Value::list(items.clone());

        let reference = table.clone();
        let outcome = matcher.check(&expr, &value, &mut table);

        let homogeneous = items.windows(2).all(|w| w[0].tag() == w[1].tag());
        if homogeneous {
            prop_assert!(outcome.is_ok());
        } else {
            prop_assert!(outcome.is_err());
            prop_assert_eq!(table, reference);
        }
    }

    /// Matching is deterministic: running the same check twice from the
    /// same starting state yields the same outcome and the same table.
    #[test]
    fn matching_is_deterministic(items in arb_primitive_list()) {
        let matcher = Matcher::new(MatchConfig::default());
        let expr = TypeExpr::Union(vec![
            TypeExpr::Seq(SeqShape::Homogeneous(Box::new(param_t()))),
            TypeExpr::Concrete(TypeTag::Str),
        ]);
        let value = Value::list(items);

        let mut first = fresh_table();
        let mut second = fresh_table();
        let r1 = matcher.check(&expr, &value, &mut first);
        let r2 = matcher.check(&expr, &value, &mut second);

        prop_assert_eq!(r1.is_ok(), r2.is_ok());
        prop_assert_eq!(first, second);
    }

    /// A union whose first member is the value's own concrete type always
    /// matches via that member and never touches the type parameter.
    #[test]
    fn first_syntactic_match_wins(v in arb_primitive()) {
        let matcher = Matcher::new(MatchConfig::default());
        let mut table = fresh_table();
        let expr = TypeExpr::Union(vec![TypeExpr::Concrete(v.tag()), param_t()]);

        matcher.check(&expr, &v, &mut table).unwrap();
        prop_assert_eq!(table.committed("T"), None);
    }
}
