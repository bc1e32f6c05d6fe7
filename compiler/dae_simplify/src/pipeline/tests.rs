use dae_ir::VarId;
use dae_model::Equation;
use pretty_assertions::assert_eq;

use super::*;

/// Aliases that only show up one at a time:
/// `x1 = x0`, then `x[k] - 2·x[k-1] + x[k-2] = 0` for `k = 2..=n`.
fn chain(n: usize) -> (Model, Vec<VarId>) {
    let mut model = Model::new();
    let vars: Vec<VarId> = (0..=n)
        .map(|i| {
            model
                .add_variable(format!("x{i}"), Partition::AlgState)
                .unwrap_or_else(|e| panic!("{e}"))
        })
        .collect();
    let leaves: Vec<_> = vars.iter().map(|&v| model.var(v)).collect();
    let first = model.arena.sub(leaves[1], leaves[0]);
    model.add_equation(first);
    let two = model.arena.num(2.0);
    for k in 2..=n {
        let twice = model.arena.mul(two, leaves[k - 1]);
        let head = model.arena.sub(leaves[k], twice);
        let eq = model.arena.add(head, leaves[k - 2]);
        model.add_equation(eq);
    }
    (model, vars)
}

fn reduction() -> CompilerOptions {
    CompilerOptions {
        detect_aliases: true,
        reduce_affine_expression: true,
        ..CompilerOptions::default()
    }
}

#[test]
fn default_options_leave_the_model_alone() {
    let (mut model, vars) = chain(3);
    let before = model.equations.clone();
    let report = simplify(&mut model, &CompilerOptions::default()).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(report.iterations, 0);
    assert_eq!(model.equations, before);
    assert_eq!(model.alg_states(), vars.as_slice());
}

#[test]
fn chain_of_hidden_aliases_converges_in_n_plus_one() {
    let (mut model, vars) = chain(3);
    let report = simplify(&mut model, &reduction()).unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(report.eliminated, 3);
    assert_eq!(report.iterations, 4);
    assert_eq!(model.alg_states(), &[vars[0]]);
    assert!(model.equations.is_empty());
    for &v in &vars[1..] {
        assert_eq!(report.relation.resolve(v).0, vars[0]);
    }
}

#[test]
fn bound_below_the_needed_count_fails() {
    let (mut model, _) = chain(3);
    let options = CompilerOptions {
        max_reduction_iterations: Some(3),
        ..reduction()
    };
    assert!(matches!(
        simplify(&mut model, &options),
        Err(SimplifyError::NonConvergentReduction { iterations: 3 })
    ));

    let (mut model, _) = chain(3);
    let options = CompilerOptions {
        max_reduction_iterations: Some(4),
        ..reduction()
    };
    assert!(simplify(&mut model, &options).is_ok());
}

#[test]
fn without_affine_reduction_hidden_aliases_stay() {
    let (mut model, vars) = chain(3);
    let options = CompilerOptions {
        detect_aliases: true,
        ..CompilerOptions::default()
    };
    let report = simplify(&mut model, &options).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(report.eliminated, 1);
    assert_eq!(report.iterations, 2);
    assert_eq!(model.alg_states(), &[vars[0], vars[2], vars[3]]);
    assert!(model
        .equations
        .iter()
        .all(|e| matches!(e, Equation::Scalar(_))));
}

#[test]
fn rerunning_the_pipeline_is_a_no_op() {
    let (mut model, _) = chain(2);
    // Keep one genuinely affine equation around so a block forms.
    let x0 = model.var(model.alg_states()[0]);
    let u = model
        .add_variable("u", Partition::Input)
        .unwrap_or_else(|e| panic!("{e}"));
    let ux = model.var(u);
    let extra = model.arena.sub(x0, ux);
    let extra_var = model
        .add_variable("w", Partition::AlgState)
        .unwrap_or_else(|e| panic!("{e}"));
    let wx = model.var(extra_var);
    let three = model.arena.num(3.0);
    let scaled = model.arena.mul(three, wx);
    let affine = model.arena.sub(scaled, extra);
    model.add_equation(affine);

    let first = simplify(&mut model, &reduction()).unwrap_or_else(|e| panic!("{e}"));
    let after_first = model.equations.clone();
    let states = model.alg_states().to_vec();

    let second = simplify(&mut model, &reduction()).unwrap_or_else(|e| panic!("{e}"));
    assert!(first.eliminated > 0);
    assert_eq!(second.eliminated, 0);
    assert_eq!(second.affine_rows, first.affine_rows);
    assert_eq!(model.equations, after_first);
    assert_eq!(model.alg_states(), states.as_slice());
}

#[test]
fn rerun_with_expansion_keeps_the_block_lowerable() {
    let mut model = Model::new();
    let x = model
        .add_variable("x", Partition::AlgState)
        .unwrap_or_else(|e| panic!("{e}"));
    let y = model
        .add_vector("y", Partition::AlgState, 2)
        .unwrap_or_else(|e| panic!("{e}"));
    let xx = model.var(x);
    let (y1, y2) = (model.arena.elem(y, 0), model.arena.elem(y, 1));
    let two = model.arena.num(2.0);
    let twice = model.arena.mul(two, xx);
    let first = model.arena.sub(y1, twice);
    let second = model.arena.add(y2, xx);
    let sine = model.arena.call(dae_ir::Func::Sin, xx);
    let third = model.arena.sub(sine, y2);
    for eq in [first, second, third] {
        model.add_equation(eq);
    }

    let affine_only = CompilerOptions {
        reduce_affine_expression: true,
        ..CompilerOptions::default()
    };
    let report = simplify(&mut model, &affine_only).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(report.affine_rows, 2);

    let report = simplify(&mut model, &CompilerOptions::all()).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(report.expanded, 1);
    assert_eq!(report.eliminated, 1);
    assert_eq!(report.affine_rows, 1);
    let names: Vec<&str> = model.alg_states().iter().map(|&v| model.name(v)).collect();
    assert_eq!(names, vec!["x", "y[1]"]);
    assert!(model.functions().is_ok());
}
