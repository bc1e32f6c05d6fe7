use dae_ir::VarId;
use pretty_assertions::assert_eq;

use super::*;

fn system(arena: &mut ExprArena) -> AffineSystem {
    let unknowns = vec![Slot::Scalar(VarId::new(0)), Slot::Scalar(VarId::new(1))];
    let mut system = AffineSystem::new(unknowns);
    let two = arena.num(2.0);
    let three = arena.num(3.0);
    system.push_row(&[two, ExprId::MINUS_ONE], ExprId::ZERO);
    system.push_row(&[ExprId::ZERO, ExprId::ONE], three);
    system
}

#[test]
fn shape_and_access() {
    let mut arena = ExprArena::new();
    let s = system(&mut arena);
    assert_eq!(s.rows(), 2);
    assert_eq!(s.cols(), 2);
    assert_eq!(s.coefficient(0, 1), ExprId::MINUS_ONE);
    assert_eq!(s.row(1), &[ExprId::ZERO, ExprId::ONE]);
    assert_eq!(Equation::Affine(s).residual_len(), 2);
}

#[test]
fn numeric_view_of_literal_system() {
    let mut arena = ExprArena::new();
    let s = system(&mut arena);
    let (a, b) = s.numeric(&arena).unwrap_or_else(|| panic!("literal system"));
    assert_eq!(a, vec![vec![2.0, -1.0], vec![0.0, 1.0]]);
    assert_eq!(b, vec![0.0, 3.0]);
}

#[test]
fn symbolic_entries_have_no_numeric_view() {
    let mut arena = ExprArena::new();
    let mut s = system(&mut arena);
    s.constants[0] = arena.var(VarId::new(9));
    assert!(s.numeric(&arena).is_none());
}

#[test]
fn scalar_expansion_evaluates_like_the_block() {
    let mut arena = ExprArena::new();
    let s = system(&mut arena);
    let rows = s.to_scalar_equations(&mut arena);
    let env = |slot: Slot| match slot {
        Slot::Scalar(v) if v == VarId::new(0) => 5.0,
        Slot::Scalar(_) => 7.0,
        _ => f64::NAN,
    };
    assert_eq!(arena.eval(rows[0], &env), 2.0 * 5.0 - 7.0);
    assert_eq!(arena.eval(rows[1], &env), 7.0 + 3.0);
}
