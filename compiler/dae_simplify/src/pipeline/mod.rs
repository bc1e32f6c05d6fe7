//! The simplification driver.
//!
//! Runs the enabled passes in order and iterates alias detection with affine
//! row-alias exposure until an iteration changes nothing:
//!
//! ```text
//! expand_vectors → fold_constants → expand_affine_blocks
//!   → loop { detect_aliases; expose_row_aliases } → reduce_affine
//! ```
//!
//! The loop is bounded by `max_reduction_iterations`, by default the number
//! of algebraic slots plus one: every productive iteration removes at least
//! one algebraic state, and the last one confirms nothing is left.

use dae_model::{CompilerOptions, Model, Partition};
use tracing::debug;

use crate::affine::{expand_affine_blocks, expose_row_aliases, reduce_affine};
use crate::alias::{detect_aliases, AliasRelation};
use crate::error::{Result, SimplifyError};
use crate::expand::expand_vectors;
use crate::fold::fold_constants;

/// What a [`simplify`] run did.
#[derive(Clone, Debug, Default)]
pub struct Report {
    /// Vector variables expanded.
    pub expanded: usize,
    /// Constants and parameters substituted.
    pub folded: usize,
    /// Algebraic states eliminated as aliases.
    pub eliminated: usize,
    /// Rows in the affine block, zero if none was formed.
    pub affine_rows: usize,
    /// Alias/affine iterations run.
    pub iterations: usize,
    pub relation: AliasRelation,
}

/// Simplify `model` in place according to `options`.
pub fn simplify(model: &mut Model, options: &CompilerOptions) -> Result<Report> {
    let mut report = Report::default();
    if !options.any_enabled() {
        debug!("no passes enabled");
        return Ok(report);
    }

    if options.expand_vectors {
        report.expanded = expand_vectors(model)?;
    }
    report.folded = fold_constants(model, options);

    if options.detect_aliases || options.reduce_affine_expression {
        expand_affine_blocks(model);
    }

    if options.detect_aliases {
        let bound = options
            .max_reduction_iterations
            .unwrap_or_else(|| model.slots(Partition::AlgState).len() + 1);
        loop {
            if report.iterations == bound {
                return Err(SimplifyError::NonConvergentReduction { iterations: bound });
            }
            report.iterations += 1;

            let eliminated = detect_aliases(model, &mut report.relation)?;
            let exposed = if options.reduce_affine_expression {
                expose_row_aliases(model)?
            } else {
                0
            };
            debug!(
                iteration = report.iterations,
                eliminated, exposed, "reduction iteration",
            );
            report.eliminated += eliminated;
            if eliminated == 0 && exposed == 0 {
                break;
            }
        }
    }

    if options.reduce_affine_expression {
        report.affine_rows = reduce_affine(model)?;
    }

    debug!(
        expanded = report.expanded,
        folded = report.folded,
        eliminated = report.eliminated,
        affine_rows = report.affine_rows,
        iterations = report.iterations,
        "simplified model",
    );
    Ok(report)
}

#[cfg(test)]
mod tests;
