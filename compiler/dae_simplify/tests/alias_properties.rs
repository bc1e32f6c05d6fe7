//! Property tests for alias elimination over random spanning trees of
//! `x[k] = ±x[parent]` equations.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use dae_ir::VarId;
use dae_model::{CompilerOptions, Model, Partition, Sign};
use dae_simplify::{detect_aliases, simplify, AliasRelation};
use proptest::prelude::*;

/// Hidden per-variable signs and, for every variable after the first, the
/// index of an earlier variable it is tied to.
fn tree_strategy() -> impl Strategy<Value = (Vec<bool>, Vec<usize>)> {
    (2usize..10).prop_flat_map(|n| {
        let signs = proptest::collection::vec(any::<bool>(), n);
        let parents = (1..n).map(|k| 0..k).collect::<Vec<_>>();
        (signs, parents)
    })
}

/// Sign relating two variables with hidden signs `a` and `b`.
fn relative(a: bool, b: bool) -> Sign {
    if a == b {
        Sign::Plus
    } else {
        Sign::Minus
    }
}

/// Every `x[k]` equals `signs[k] · t` for a common `t`.
fn tree_model(signs: &[bool], parents: &[usize]) -> (Model, Vec<VarId>) {
    let mut model = Model::new();
    let vars: Vec<VarId> = (0..signs.len())
        .map(|i| model.add_variable(format!("x{i}"), Partition::AlgState).unwrap())
        .collect();
    for (offset, &parent) in parents.iter().enumerate() {
        let k = offset + 1;
        let (child, other) = (model.var(vars[k]), model.var(vars[parent]));
        let eq = if signs[k] == signs[parent] {
            model.arena.sub(child, other)
        } else {
            model.arena.add(child, other)
        };
        model.add_equation(eq);
    }
    (model, vars)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn tree_collapses_to_first_variable((signs, parents) in tree_strategy()) {
        let (mut model, vars) = tree_model(&signs, &parents);
        let mut relation = AliasRelation::new();
        let eliminated = detect_aliases(&mut model, &mut relation).unwrap();

        prop_assert_eq!(eliminated, vars.len() - 1);
        prop_assert_eq!(model.alg_states(), &vars[..1]);
        prop_assert!(model.equations.is_empty());
        for (k, &var) in vars.iter().enumerate() {
            let (root, sign) = relation.resolve(var);
            prop_assert_eq!(root, vars[0]);
            prop_assert_eq!(sign, relative(signs[k], signs[0]));
        }
    }

    #[test]
    fn aliases_are_recorded_on_the_representative((signs, parents) in tree_strategy()) {
        let (mut model, vars) = tree_model(&signs, &parents);
        let report = simplify(&mut model, &CompilerOptions::all()).unwrap();

        let aliases = &model.variable(vars[0]).aliases;
        prop_assert_eq!(aliases.len(), vars.len() - 1);
        for alias in aliases {
            let k: usize = alias.name[1..].parse().unwrap();
            prop_assert_eq!(alias.sign, relative(signs[k], signs[0]));
        }
        prop_assert_eq!(report.relation.len(), vars.len() - 1);
    }
}
