use pretty_assertions::assert_eq;

use crate::VarId;

use super::*;

fn slot(i: u32) -> Slot {
    Slot::Scalar(VarId::new(i))
}

#[test]
fn derivative_of_linear_term_is_its_coefficient() {
    let mut arena = ExprArena::new();
    let x = arena.var(VarId::new(0));
    let y = arena.var(VarId::new(1));
    let two = arena.num(2.0);
    let two_x = arena.mul(two, x);
    // y - 2x
    let e = arena.sub(y, two_x);

    let dx = arena.diff(e, slot(0));
    assert_eq!(arena.as_num(dx), Some(-2.0));
    let dy = arena.diff(e, slot(1));
    assert_eq!(dy, ExprId::ONE);
    let dz = arena.diff(e, slot(7));
    assert_eq!(dz, ExprId::ZERO);
}

#[test]
fn second_derivative_of_affine_expression_is_structurally_zero() {
    let mut arena = ExprArena::new();
    let x = arena.var(VarId::new(0));
    let p = arena.var(VarId::new(5));
    let sp = arena.call(Func::Sin, p);
    let e = arena.mul(sp, x);

    let dx = arena.diff(e, slot(0));
    assert_eq!(dx, sp);
    assert_eq!(arena.diff(dx, slot(0)), ExprId::ZERO);
}

#[test]
fn product_of_unknowns_has_mixed_second_derivative() {
    let mut arena = ExprArena::new();
    let x = arena.var(VarId::new(0));
    let y = arena.var(VarId::new(1));
    let e = arena.mul(x, y);

    let dx = arena.diff(e, slot(0));
    assert_eq!(dx, y);
    assert_eq!(arena.diff(dx, slot(1)), ExprId::ONE);
}

#[test]
fn chain_rule_matches_finite_difference() {
    let mut arena = ExprArena::new();
    let x = arena.var(VarId::new(0));
    let three = arena.num(3.0);
    let cube = arena.pow(x, three);
    let e_x = arena.call(Func::Exp, x);
    let quotient = arena.div(cube, e_x);
    let e = arena.call(Func::Atan, quotient);

    let d = arena.diff(e, slot(0));
    let at = |v: f64| move |_: Slot| v;
    let h = 1e-6;
    let numeric = (arena.eval(e, &at(0.7 + h)) - arena.eval(e, &at(0.7 - h))) / (2.0 * h);
    let symbolic = arena.eval(d, &at(0.7));
    assert!((numeric - symbolic).abs() < 1e-6, "{numeric} vs {symbolic}");
}

#[test]
fn abs_has_piecewise_constant_derivative() {
    let mut arena = ExprArena::new();
    let x = arena.var(VarId::new(0));
    let e = arena.call(Func::Abs, x);
    let d = arena.diff(e, slot(0));
    assert!(matches!(arena.kind(d), Expr::Call { func: Func::Sign, .. }));
    assert_eq!(arena.diff(d, slot(0)), ExprId::ZERO);
}

#[test]
fn free_slots_are_sorted_and_unique() {
    let mut arena = ExprArena::new();
    let x = arena.var(VarId::new(3));
    let y = arena.elem(VarId::new(1), 2);
    let t = arena.time();
    let xy = arena.mul(x, y);
    let tx = arena.add(t, x);
    let e = arena.add(xy, tx);

    assert_eq!(
        arena.free_slots(e),
        vec![
            Slot::Time,
            Slot::Scalar(VarId::new(3)),
            Slot::Element {
                var: VarId::new(1),
                index: 2
            },
        ]
    );
    assert!(arena.depends_on(e, |s| s == Slot::Time));
    assert!(!arena.depends_on(e, |s| s == slot(9)));
}
