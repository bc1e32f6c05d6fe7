//! Numeric equivalence oracle.
//!
//! Two models are equivalent when they have the same partition sizes and
//! their three evaluators agree on random inputs. The comparison is
//! positional: variable names are never matched, so a reduced model can be
//! checked against a hand-written reference with differently named
//! variables.
//!
//! Live models additionally compare residual row counts. Cached models do
//! not keep equations, so the count check is skipped when either side is
//! cached.

use dae_model::{CallError, Function, LowerError, ModelView, Partition};
use float_cmp::approx_eq;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

/// Default comparison tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Seed used by callers that have no reason to pick another.
pub const DEFAULT_SEED: u64 = 0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OracleError {
    #[error("partition `{partition}` has {left} variables on the left and {right} on the right")]
    CardinalityMismatch {
        partition: Partition,
        left: usize,
        right: usize,
    },
    #[error("{what} have {left} residual rows on the left and {right} on the right")]
    EquationCountMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },
    #[error("`{function}` {side} is {left:?} on the left and {right:?} on the right")]
    SparsityMismatch {
        function: &'static str,
        side: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("`{function}` differs at ({row}, {column}): {left} vs {right}")]
    ValueMismatch {
        function: &'static str,
        row: usize,
        column: usize,
        left: f64,
        right: f64,
    },
    #[error(transparent)]
    Lower(#[from] LowerError),
    #[error(transparent)]
    Call(#[from] CallError),
}

/// Check that `left` and `right` behave identically.
///
/// Inputs are drawn from `rng`, uniform in `[0, 1)` at every declared
/// nonzero input position. An output entry is compared when at least one
/// side is finite; it matches when the difference is within `tolerance`,
/// scaled by the larger magnitude once that exceeds one.
pub fn assert_model_equivalent_numeric(
    left: &impl ModelView,
    right: &impl ModelView,
    tolerance: f64,
    rng: &mut StdRng,
) -> Result<(), OracleError> {
    for partition in Partition::ORDERED {
        let (l, r) = (left.cardinality(partition), right.cardinality(partition));
        if l != r {
            return Err(OracleError::CardinalityMismatch {
                partition,
                left: l,
                right: r,
            });
        }
    }

    if let (Some(l), Some(r)) = (left.residual_counts(), right.residual_counts()) {
        if l.0 != r.0 {
            return Err(OracleError::EquationCountMismatch {
                what: "equations",
                left: l.0,
                right: r.0,
            });
        }
        if l.1 != r.1 {
            return Err(OracleError::EquationCountMismatch {
                what: "initial equations",
                left: l.1,
                right: r.1,
            });
        }
    }

    let left_functions = left.functions()?;
    let right_functions = right.functions()?;
    for ((name, a), (_, b)) in left_functions.iter().into_iter().zip(right_functions.iter()) {
        compare_function(name, a, b, tolerance, rng)?;
    }
    Ok(())
}

fn compare_function(
    name: &'static str,
    left: &Function,
    right: &Function,
    tolerance: f64,
    rng: &mut StdRng,
) -> Result<(), OracleError> {
    if left.input != right.input {
        return Err(OracleError::SparsityMismatch {
            function: name,
            side: "input",
            left: (left.input.rows, left.input.cols),
            right: (right.input.rows, right.input.cols),
        });
    }
    let (left_shape, right_shape) = (
        (left.output.rows, left.output.cols),
        (right.output.rows, right.output.cols),
    );
    if left_shape != right_shape {
        return Err(OracleError::SparsityMismatch {
            function: name,
            side: "output",
            left: left_shape,
            right: right_shape,
        });
    }

    let mut input = vec![0.0; left.n_in()];
    for &position in &left.input.nonzeros {
        input[position as usize] = rng.random::<f64>();
    }

    let a = left.call(&input)?;
    let b = right.call(&input)?;
    for (flat, (&x, &y)) in a.iter().zip(&b).enumerate() {
        if !x.is_finite() && !y.is_finite() {
            continue;
        }
        if !within_tolerance(x, y, tolerance) {
            let (row, column) = left.output.position(flat);
            return Err(OracleError::ValueMismatch {
                function: name,
                row,
                column,
                left: x,
                right: y,
            });
        }
    }

    debug!(function = name, entries = a.len(), "evaluators agree");
    Ok(())
}

/// Absolute tolerance below magnitude one, relative above.
pub fn within_tolerance(x: f64, y: f64, tolerance: f64) -> bool {
    if !x.is_finite() || !y.is_finite() {
        return false;
    }
    let scale = x.abs().max(y.abs()).max(1.0);
    approx_eq!(f64, x, y, epsilon = tolerance * scale, ulps = 4)
}
