//! Affine reduction.
//!
//! The unknowns are the scalar slots of the algebraic states, in partition
//! order. Every other symbol (states, inputs, parameters, constants, time)
//! is a coefficient. An equation mentioning an unknown is affine when every
//! second derivative with respect to the unknowns it mentions is
//! structurally zero; its row of `A` is then the first derivative with
//! respect to each unknown and its entry of `b` is the equation with the
//! unknowns set to zero.
//!
//! Structural zero relies on the folding constructors of the arena: a
//! coefficient that only happens to evaluate to zero does not count.

use dae_ir::{ExprId, Slot, Substitution};
use dae_model::{AffineSystem, Equation, Model, Partition};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{Result, SimplifyError};

/// Column layout of the algebraic unknowns.
struct Unknowns {
    slots: Vec<Slot>,
    column: FxHashMap<Slot, usize>,
}

impl Unknowns {
    fn of(model: &Model) -> Self {
        let slots = model.slots(Partition::AlgState);
        let column = slots.iter().enumerate().map(|(i, &s)| (s, i)).collect();
        Self { slots, column }
    }

    fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// One affine equation: `Σ coefficients[i]·unknowns[i] + constant`.
struct Row {
    coefficients: Vec<ExprId>,
    constant: ExprId,
}

/// Classify `expr`, returning its row if it is affine in the unknowns.
fn classify(model: &mut Model, unknowns: &Unknowns, expr: ExprId) -> Result<Option<Row>> {
    let mentioned: SmallVec<[usize; 4]> = model
        .arena
        .free_slots(expr)
        .into_iter()
        .filter_map(|slot| unknowns.column.get(&slot).copied())
        .collect();
    if mentioned.is_empty() {
        return Ok(None);
    }

    let mut coefficients = vec![ExprId::ZERO; unknowns.slots.len()];
    for &i in &mentioned {
        let first = model.arena.diff(expr, unknowns.slots[i]);
        for &j in &mentioned {
            let second = model.arena.diff(first, unknowns.slots[j]);
            if !model.arena.is_zero(second) {
                trace!(equation = %model.render(expr), "not affine");
                return Ok(None);
            }
        }
        coefficients[i] = first;
    }

    for &i in &mentioned {
        let reads_unknown = model
            .arena
            .free_slots(coefficients[i])
            .into_iter()
            .find(|slot| unknowns.column.contains_key(slot));
        if let Some(slot) = reads_unknown {
            return Err(SimplifyError::Classification {
                equation: model.render(expr),
                unknown: model.slot_name(slot),
            });
        }
    }

    let zero: Substitution = mentioned
        .iter()
        .map(|&i| (unknowns.slots[i], ExprId::ZERO))
        .collect();
    let constant = model.arena.substitute(expr, &zero);
    Ok(Some(Row {
        coefficients,
        constant,
    }))
}

/// Classify every scalar equation, indexed like `model.equations`.
fn classify_all(model: &mut Model, unknowns: &Unknowns) -> Result<Vec<Option<Row>>> {
    let scalars: Vec<Option<ExprId>> = model
        .equations
        .iter()
        .map(|equation| match equation {
            Equation::Scalar(expr) => Some(*expr),
            Equation::Affine(_) => None,
        })
        .collect();
    scalars
        .into_iter()
        .map(|expr| match expr {
            Some(expr) => classify(model, unknowns, expr),
            None => Ok(None),
        })
        .collect()
}

/// Replace every affine block with its scalar rows, in place.
///
/// Returns the number of blocks expanded.
pub fn expand_affine_blocks(model: &mut Model) -> usize {
    let mut expanded = 0;
    let equations = std::mem::take(&mut model.equations);
    let mut rebuilt = Vec::with_capacity(equations.len());
    for equation in equations {
        match equation {
            Equation::Scalar(_) => rebuilt.push(equation),
            Equation::Affine(system) => {
                expanded += 1;
                rebuilt.extend(
                    system
                        .to_scalar_equations(&mut model.arena)
                        .into_iter()
                        .map(Equation::Scalar),
                );
            }
        }
    }
    model.equations = rebuilt;
    expanded
}

/// Rewrite affine rows that state an alias into the structural form
/// `a ∓ b`, so the next alias detection round consumes them.
///
/// A row qualifies when it has exactly two nonzero coefficients, both
/// literals of equal magnitude over scalar unknowns, and a structurally
/// zero constant term. Returns the number of equations rewritten.
pub fn expose_row_aliases(model: &mut Model) -> Result<usize> {
    let unknowns = Unknowns::of(model);
    if unknowns.is_empty() {
        return Ok(0);
    }
    let rows = classify_all(model, &unknowns)?;

    let mut exposed = 0;
    for (index, row) in rows.into_iter().enumerate() {
        let Some(row) = row else { continue };
        if !model.arena.is_zero(row.constant) {
            continue;
        }
        let nonzero: SmallVec<[usize; 2]> = row
            .coefficients
            .iter()
            .enumerate()
            .filter(|(_, c)| !model.arena.is_zero(**c))
            .map(|(i, _)| i)
            .collect();
        let &[i, j] = nonzero.as_slice() else {
            continue;
        };
        let (Some(ci), Some(cj)) = (
            model.arena.as_num(row.coefficients[i]),
            model.arena.as_num(row.coefficients[j]),
        ) else {
            continue;
        };
        if ci.abs() != cj.abs() {
            continue;
        }
        let (Slot::Scalar(a), Slot::Scalar(b)) = (unknowns.slots[i], unknowns.slots[j]) else {
            continue;
        };

        let (xa, xb) = (model.var(a), model.var(b));
        // ci·a + cj·b = 0 with |ci| = |cj|
        let alias = if ci == cj {
            model.arena.add(xa, xb)
        } else {
            model.arena.sub(xa, xb)
        };
        let Equation::Scalar(current) = model.equations[index] else {
            continue;
        };
        if current != alias {
            trace!(
                from = %model.render(current),
                to = %model.render(alias),
                "row exposes alias",
            );
            model.equations[index] = Equation::Scalar(alias);
            exposed += 1;
        }
    }
    Ok(exposed)
}

/// Fold every affine equation into one [`Equation::Affine`] block placed
/// where the first of them stood.
///
/// Returns the number of rows in the block, zero if no equation is affine.
pub fn reduce_affine(model: &mut Model) -> Result<usize> {
    let unknowns = Unknowns::of(model);
    if unknowns.is_empty() {
        return Ok(0);
    }
    let rows = classify_all(model, &unknowns)?;

    let mut system = AffineSystem::new(unknowns.slots);
    let mut block_at = None;
    let equations = std::mem::take(&mut model.equations);
    let mut rebuilt = Vec::with_capacity(equations.len());
    for (equation, row) in equations.into_iter().zip(rows) {
        match row {
            Some(row) => {
                block_at.get_or_insert(rebuilt.len());
                system.push_row(&row.coefficients, row.constant);
            }
            None => rebuilt.push(equation),
        }
    }

    let folded = system.rows();
    let literal = system.numeric(&model.arena).is_some();
    if let Some(at) = block_at {
        rebuilt.insert(at, Equation::Affine(system));
    }
    model.equations = rebuilt;

    debug!(
        rows = folded,
        columns = unknowns.column.len(),
        literal,
        general = model.equations.len().saturating_sub(usize::from(folded > 0)),
        "affine reduction",
    );
    Ok(folded)
}
