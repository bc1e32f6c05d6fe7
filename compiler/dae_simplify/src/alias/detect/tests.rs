use dae_model::Attribute;
use pretty_assertions::assert_eq;

use super::*;

fn scalar(model: &mut Model, name: &str, partition: Partition) -> VarId {
    model
        .add_variable(name, partition)
        .unwrap_or_else(|e| panic!("{e}"))
}

#[test]
fn matcher_recognizes_signed_forms() {
    let mut arena = ExprArena::new();
    let (a, b) = (VarId::new(0), VarId::new(1));
    let xa = arena.var(a);
    let xb = arena.var(b);

    let diff = arena.sub(xa, xb);
    assert_eq!(match_alias(&arena, diff), Some((a, b, Sign::Plus)));

    let sum = arena.add(xa, xb);
    assert_eq!(match_alias(&arena, sum), Some((a, b, Sign::Minus)));

    let neg_b = arena.neg(xb);
    let raw = arena.intern(Expr::Binary {
        op: BinaryOp::Mul,
        left: ExprId::MINUS_ONE,
        right: xa,
    });
    let flipped = arena.intern(Expr::Binary {
        op: BinaryOp::Sub,
        left: raw,
        right: neg_b,
    });
    // -a - (-b) = 0  ⇒  a = b
    assert_eq!(match_alias(&arena, flipped), Some((a, b, Sign::Plus)));

    let two = arena.num(2.0);
    let scaled = arena.mul(two, xb);
    let not_alias = arena.sub(xa, scaled);
    assert_eq!(match_alias(&arena, not_alias), None);
}

#[test]
fn alias_is_eliminated_and_substituted() {
    let mut model = Model::new();
    let x = scalar(&mut model, "x", Partition::AlgState);
    let y = scalar(&mut model, "y", Partition::AlgState);
    let z = scalar(&mut model, "z", Partition::AlgState);
    let (xx, yx, zx) = (model.var(x), model.var(y), model.var(z));
    let alias = model.arena.add(yx, xx);
    let other = model.arena.mul(yx, zx);
    model.add_equation(alias);
    model.add_equation(other);

    let mut relation = AliasRelation::new();
    let eliminated = detect_aliases(&mut model, &mut relation).unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(eliminated, 1);
    assert_eq!(model.alg_states(), &[x, z]);
    assert_eq!(relation.resolve(y), (x, Sign::Minus));
    let neg_x = model.arena.neg(xx);
    let expected = model.arena.mul(neg_x, zx);
    assert_eq!(model.equations, vec![Equation::Scalar(expected)]);
    assert_eq!(
        model.variable(x).aliases.to_vec(),
        vec![AliasName {
            name: "y".to_owned(),
            sign: Sign::Minus,
        }]
    );
}

#[test]
fn protected_side_survives() {
    let mut model = Model::new();
    let a = scalar(&mut model, "a", Partition::AlgState);
    let u = scalar(&mut model, "u", Partition::Input);
    let (ax, ux) = (model.var(a), model.var(u));
    let eq = model.arena.sub(ax, ux);
    model.add_equation(eq);

    let mut relation = AliasRelation::new();
    detect_aliases(&mut model, &mut relation).unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(model.inputs(), &[u]);
    assert!(model.alg_states().is_empty());
    assert_eq!(relation.resolve(a), (u, Sign::Plus));
    assert!(model.equations.is_empty());
}

#[test]
fn two_protected_sides_keep_the_equation() {
    let mut model = Model::new();
    let s = scalar(&mut model, "s", Partition::State);
    let o = scalar(&mut model, "o", Partition::Output);
    let (sx, ox) = (model.var(s), model.var(o));
    let eq = model.arena.sub(ox, sx);
    model.add_equation(eq);

    let mut relation = AliasRelation::new();
    let eliminated = detect_aliases(&mut model, &mut relation).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(eliminated, 0);
    assert_eq!(model.equations, vec![Equation::Scalar(eq)]);
    assert!(relation.is_empty());
}

#[test]
fn kept_protected_equations_must_agree_in_sign() {
    let mut model = Model::new();
    let s1 = scalar(&mut model, "s1", Partition::State);
    let s2 = scalar(&mut model, "s2", Partition::State);
    let (x1, x2) = (model.var(s1), model.var(s2));
    let same = model.arena.sub(x1, x2);
    model.add_equation(same);
    model.add_equation(same);

    let mut relation = AliasRelation::new();
    assert_eq!(detect_aliases(&mut model, &mut relation), Ok(0));
    assert_eq!(model.equations.len(), 2);

    let opposite = model.arena.add(x1, x2);
    model.add_equation(opposite);
    assert_eq!(
        detect_aliases(&mut model, &mut relation),
        Err(SimplifyError::ConflictingAlias {
            first: "s1".to_owned(),
            second: "s2".to_owned(),
        })
    );
}

#[test]
fn protected_conflict_through_an_eliminated_alias() {
    let mut model = Model::new();
    let s1 = scalar(&mut model, "s1", Partition::State);
    let s2 = scalar(&mut model, "s2", Partition::State);
    let a = scalar(&mut model, "a", Partition::AlgState);
    let (x1, x2, ax) = (model.var(s1), model.var(s2), model.var(a));
    let tie = model.arena.sub(x1, x2);
    let alias = model.arena.sub(ax, x1);
    let flipped = model.arena.add(ax, x2);
    for eq in [tie, alias, flipped] {
        model.add_equation(eq);
    }

    let mut relation = AliasRelation::new();
    assert_eq!(
        detect_aliases(&mut model, &mut relation),
        Err(SimplifyError::ConflictingAlias {
            first: "a".to_owned(),
            second: "s2".to_owned(),
        })
    );
}

#[test]
fn parameters_never_alias() {
    let mut model = Model::new();
    let x = scalar(&mut model, "x", Partition::AlgState);
    let p = scalar(&mut model, "p", Partition::Parameter);
    let (xx, px) = (model.var(x), model.var(p));
    let eq = model.arena.sub(xx, px);
    model.add_equation(eq);

    let mut relation = AliasRelation::new();
    assert_eq!(detect_aliases(&mut model, &mut relation), Ok(0));
    assert_eq!(model.alg_states(), &[x]);
}

#[test]
fn conflicting_signs_are_reported() {
    let mut model = Model::new();
    let a = scalar(&mut model, "a", Partition::AlgState);
    let b = scalar(&mut model, "b", Partition::AlgState);
    let (ax, bx) = (model.var(a), model.var(b));
    let same = model.arena.sub(ax, bx);
    let opposite = model.arena.add(ax, bx);
    model.add_equation(same);
    model.add_equation(opposite);

    let mut relation = AliasRelation::new();
    assert_eq!(
        detect_aliases(&mut model, &mut relation),
        Err(SimplifyError::ConflictingAlias {
            first: "a".to_owned(),
            second: "b".to_owned(),
        })
    );
}

#[test]
fn metadata_merges_into_representative() {
    let mut model = Model::new();
    let x = scalar(&mut model, "x", Partition::AlgState);
    let y = scalar(&mut model, "y", Partition::AlgState);
    let (xx, yx) = (model.var(x), model.var(y));

    let ten = model.arena.num(10.0);
    let (neg_five, neg_one) = (model.arena.num(-5.0), model.arena.num(-1.0));
    let two = model.arena.num(2.0);
    let neg_three = model.arena.num(-3.0);

    model.variable_mut(x).attributes.max = Some(ten);
    // y = -x, so y in [-5, -1] means x in [1, 5].
    let y_attrs = &mut model.variable_mut(y).attributes;
    y_attrs.min = Some(neg_five);
    y_attrs.max = Some(neg_one);
    y_attrs.start = Some(two);
    y_attrs.nominal = Some(neg_three);
    y_attrs.set(Attribute::Fixed, Some(ExprId::ONE));

    let eq = model.arena.add(xx, yx);
    model.add_equation(eq);
    let mut relation = AliasRelation::new();
    detect_aliases(&mut model, &mut relation).unwrap_or_else(|e| panic!("{e}"));

    let attrs = model.variable(x).attributes;
    let lit = |e: Option<ExprId>| e.and_then(|e| model.arena.as_num(e));
    assert_eq!(lit(attrs.min), Some(1.0));
    assert_eq!(lit(attrs.max), Some(5.0));
    assert_eq!(lit(attrs.start), Some(-2.0));
    assert_eq!(lit(attrs.nominal), Some(3.0));
    assert_eq!(attrs.fixed, Some(ExprId::ONE));
}
