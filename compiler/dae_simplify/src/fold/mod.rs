//! Constant and parameter folding.
//!
//! A constant or parameter whose `value` attribute is known gets
//! substituted everywhere and leaves its partition. Literal values and
//! expression values are enabled separately per partition. Expression values
//! may reference constants (and, for parameters, other parameters); a
//! definition is only substituted once every candidate it references has
//! been, so definitions resolve in dependency order. Cyclic definitions are
//! never ready and stay in place.

use dae_ir::{Slot, Substitution, VarId};
use dae_model::{CompilerOptions, Model, Partition};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

#[derive(Copy, Clone)]
struct Candidate {
    var: VarId,
    partition: Partition,
}

/// Substitute known constants and parameters; returns how many were folded.
pub fn fold_constants(model: &mut Model, options: &CompilerOptions) -> usize {
    let mut pending = candidates(model, options);
    if pending.is_empty() {
        return 0;
    }

    let mut folded = 0;
    loop {
        let waiting: FxHashSet<VarId> = pending.iter().map(|c| c.var).collect();
        let mut subst = Substitution::new();
        let mut ready = Vec::new();

        pending.retain(|candidate| {
            let Some(value) = model.variable(candidate.var).attributes.value else {
                return false;
            };
            let resolvable = !model.arena.depends_on(value, |slot| match slot {
                Slot::Scalar(dep) => {
                    waiting.contains(&dep)
                        || !may_reference(candidate.partition, model.variable(dep).partition)
                }
                Slot::Time | Slot::Element { .. } => true,
            });
            if resolvable {
                subst.insert(Slot::Scalar(candidate.var), value);
                ready.push(candidate.var);
            }
            !resolvable
        });

        if ready.is_empty() {
            break;
        }
        model.substitute_everywhere(&subst);
        for &var in &ready {
            model.eliminate(var);
        }
        folded += ready.len();
    }

    for candidate in &pending {
        warn!(
            name = model.name(candidate.var),
            "definition is cyclic or reads a non-constant; not folded",
        );
    }
    debug!(folded, "constant folding");
    folded
}

/// Scalar constants and parameters with a `value` the options allow folding.
fn candidates(model: &Model, options: &CompilerOptions) -> Vec<Candidate> {
    let mut out = Vec::new();
    for (partition, values, expressions) in [
        (
            Partition::Constant,
            options.replace_constant_values,
            options.replace_constant_expressions,
        ),
        (
            Partition::Parameter,
            options.replace_parameter_values,
            options.replace_parameter_expressions,
        ),
    ] {
        for &var in model.partition(partition) {
            let variable = model.variable(var);
            let Some(value) = variable.attributes.value else {
                continue;
            };
            if !variable.is_scalar() {
                continue;
            }
            let literal = model.arena.as_num(value).is_some();
            if (literal && values) || (!literal && expressions) {
                out.push(Candidate { var, partition });
            }
        }
    }
    out
}

/// Whether a definition in `of` may read a variable in `dep`.
fn may_reference(of: Partition, dep: Partition) -> bool {
    match of {
        Partition::Constant => dep == Partition::Constant,
        Partition::Parameter => matches!(dep, Partition::Constant | Partition::Parameter),
        _ => false,
    }
}
