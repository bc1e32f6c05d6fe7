//! Structural alias detection.
//!
//! Matches equations of the form `±a ∓ ±b = 0` between two plain scalar
//! variables, unions their classes, drops the equation and substitutes
//! `sign · representative` for every eliminated variable across the model.
//!
//! # Eligibility
//!
//! Only algebraic states are eliminated. States, derivative states, inputs
//! and outputs are protected: they may represent a class but never leave
//! their partition. An equation between two protected classes is kept, but
//! kept equations that contradict each other in sign are still a conflict.
//! Constants, parameters, time and vector elements never match.
//!
//! # Representative
//!
//! The protected root of the two classes if there is one, otherwise the
//! root declared first (lowest [`VarId`]).

use dae_ir::{BinaryOp, Expr, ExprArena, ExprId, Func, Slot, Substitution, VarId};
use dae_model::{AliasName, Equation, Model, Partition, Sign};
use tracing::{debug, trace};

use super::{AliasRelation, SignConflict, Union};
use crate::error::{Result, SimplifyError};

/// Detect alias equations in `model`, recording them in `relation`.
///
/// Returns the number of variables eliminated.
pub fn detect_aliases(model: &mut Model, relation: &mut AliasRelation) -> Result<usize> {
    let mut consumed = vec![false; model.equations.len()];
    let mut merges: Vec<(VarId, VarId, Sign)> = Vec::new();
    // Equalities between protected classes stay as equations but must still
    // agree on sign.
    let mut kept = AliasRelation::new();

    for (index, equation) in model.equations.iter().enumerate() {
        let Equation::Scalar(expr) = *equation else {
            continue;
        };
        let Some((a, b, sign)) = match_alias(&model.arena, expr) else {
            continue;
        };
        if !participates(model, a) || !participates(model, b) {
            continue;
        }

        let (root_a, sign_a) = relation.find(a);
        let (root_b, sign_b) = relation.find(b);
        if root_a != root_b && is_protected(model, root_a) && is_protected(model, root_b) {
            trace!(
                equation = %model.render(expr),
                "alias between protected variables kept as equation",
            );
            let relative = sign_a * sign * sign_b;
            if kept.union(root_a, root_b, relative, VarId::min).is_err() {
                return Err(SimplifyError::ConflictingAlias {
                    first: model.name(a).to_owned(),
                    second: model.name(b).to_owned(),
                });
            }
            continue;
        }

        let keep = |x: VarId, y: VarId| match (is_protected(model, x), is_protected(model, y)) {
            (true, false) => x,
            (false, true) => y,
            _ => x.min(y),
        };
        match relation.union(a, b, sign, keep) {
            Ok(Union::Redundant) => {
                trace!(equation = %model.render(expr), "redundant alias consumed");
            }
            Ok(Union::Merged {
                representative,
                eliminated,
                sign,
            }) => {
                trace!(
                    eliminated = model.name(eliminated),
                    representative = model.name(representative),
                    %sign,
                    "alias",
                );
                merges.push((eliminated, representative, sign));
            }
            Err(SignConflict { first, second }) => {
                return Err(SimplifyError::ConflictingAlias {
                    first: model.name(first).to_owned(),
                    second: model.name(second).to_owned(),
                });
            }
        }
        consumed[index] = true;
    }

    if !consumed.iter().any(|&c| c) {
        return Ok(0);
    }

    let mut flags = consumed.into_iter();
    model
        .equations
        .retain(|_| !flags.next().unwrap_or(false));

    for &(eliminated, representative, sign) in &merges {
        absorb(model, representative, eliminated, sign);
    }

    let mut subst = Substitution::new();
    for &(eliminated, _, _) in &merges {
        let (root, sign) = relation.find(eliminated);
        let leaf = model.var(root);
        let replacement = match sign {
            Sign::Plus => leaf,
            Sign::Minus => model.arena.neg(leaf),
        };
        subst.insert(Slot::Scalar(eliminated), replacement);
    }
    model.substitute_everywhere(&subst);
    for &(eliminated, _, _) in &merges {
        model.eliminate(eliminated);
    }

    debug!(
        eliminated = merges.len(),
        remaining_equations = model.equations.len(),
        "alias detection",
    );
    Ok(merges.len())
}

fn participates(model: &Model, var: VarId) -> bool {
    let variable = model.variable(var);
    variable.is_scalar()
        && (variable.partition == Partition::AlgState || variable.partition.is_protected())
}

fn is_protected(model: &Model, var: VarId) -> bool {
    model.variable(var).partition.is_protected()
}

/// `(a, b, sign)` with `a = sign * b` if `expr = 0` states an alias.
pub(crate) fn match_alias(arena: &ExprArena, expr: ExprId) -> Option<(VarId, VarId, Sign)> {
    let (a, b, sign) = match *arena.kind(expr) {
        Expr::Neg(inner) => return match_alias(arena, inner),
        // sa·a - sb·b = 0  ⇒  a = sa·sb·b
        Expr::Binary {
            op: BinaryOp::Sub,
            left,
            right,
        } => {
            let (sa, a) = signed_var(arena, left)?;
            let (sb, b) = signed_var(arena, right)?;
            (a, b, sa * sb)
        }
        // sa·a + sb·b = 0  ⇒  a = -sa·sb·b
        Expr::Binary {
            op: BinaryOp::Add,
            left,
            right,
        } => {
            let (sa, a) = signed_var(arena, left)?;
            let (sb, b) = signed_var(arena, right)?;
            (a, b, (sa * sb).flip())
        }
        _ => return None,
    };
    (a != b).then_some((a, b, sign))
}

/// A scalar variable under any number of negations or unit factors.
fn signed_var(arena: &ExprArena, expr: ExprId) -> Option<(Sign, VarId)> {
    match *arena.kind(expr) {
        Expr::Sym(Slot::Scalar(var)) => Some((Sign::Plus, var)),
        Expr::Neg(inner) => signed_var(arena, inner).map(|(s, v)| (s.flip(), v)),
        Expr::Binary {
            op: BinaryOp::Mul,
            left,
            right,
        } => {
            let (factor, operand) = match (arena.as_num(left), arena.as_num(right)) {
                (Some(k), None) => (k, right),
                (None, Some(k)) => (k, left),
                _ => return None,
            };
            let (s, v) = signed_var(arena, operand)?;
            if factor == 1.0 {
                Some((s, v))
            } else if factor == -1.0 {
                Some((s.flip(), v))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Merge `eliminated`'s metadata and alias names into `representative`,
/// where `eliminated = sign * representative`.
fn absorb(model: &mut Model, representative: VarId, eliminated: VarId, sign: Sign) {
    let from = model.variable(eliminated).attributes;
    let mut into = model.variable(representative).attributes;
    let arena = &mut model.arena;

    let negate = |arena: &mut ExprArena, e: Option<ExprId>| e.map(|e| arena.neg(e));
    let (min, max) = match sign {
        Sign::Plus => (from.min, from.max),
        Sign::Minus => (negate(arena, from.max), negate(arena, from.min)),
    };
    into.min = tighter(arena, into.min, min, f64::max);
    into.max = tighter(arena, into.max, max, f64::min);

    if into.start.is_none() {
        into.start = match sign {
            Sign::Plus => from.start,
            Sign::Minus => negate(arena, from.start),
        };
    }
    if into.nominal.is_none() {
        into.nominal = from.nominal.map(|e| arena.call(Func::Abs, e));
    }
    into.fixed = either(arena, into.fixed, from.fixed);

    let name = model.name(eliminated).to_owned();
    let inherited = model.variable(eliminated).aliases.clone();
    let target = model.variable_mut(representative);
    target.attributes = into;
    target.aliases.push(AliasName { name, sign });
    target
        .aliases
        .extend(inherited.into_iter().map(|alias| AliasName {
            name: alias.name,
            sign: alias.sign * sign,
        }));
}

/// The tighter of two bounds under `pick`; symbolic pairs keep `current`.
fn tighter(
    arena: &mut ExprArena,
    current: Option<ExprId>,
    incoming: Option<ExprId>,
    pick: fn(f64, f64) -> f64,
) -> Option<ExprId> {
    match (current, incoming) {
        (None, bound) | (bound, None) => bound,
        (Some(a), Some(b)) => match (arena.as_num(a), arena.as_num(b)) {
            (Some(x), Some(y)) => Some(arena.num(pick(x, y))),
            _ => {
                trace!("symbolic bounds on both alias sides; keeping representative's");
                Some(a)
            }
        },
    }
}

/// Logical or of two `fixed` flags.
fn either(arena: &mut ExprArena, current: Option<ExprId>, incoming: Option<ExprId>) -> Option<ExprId> {
    match (current, incoming) {
        (None, flag) | (flag, None) => flag,
        (Some(a), Some(b)) => match (arena.as_num(a), arena.as_num(b)) {
            (Some(x), Some(y)) => Some(if x != 0.0 || y != 0.0 {
                ExprId::ONE
            } else {
                ExprId::ZERO
            }),
            _ => Some(a),
        },
    }
}

#[cfg(test)]
mod tests;
