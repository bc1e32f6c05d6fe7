//! Vector expansion.
//!
//! Each vector variable `y` of length `n` becomes scalar variables
//! `y[1]`..`y[n]` in the same partition, at the position `y` held, with
//! `y`'s attributes. Element references `y[i]` in equations and metadata are
//! rewritten to the new scalars and `y` itself is eliminated. Affine block
//! columns over elements of `y` move to the new scalars. A derivative
//! vector of a state vector maps element-wise.

use dae_ir::{Slot, Substitution, VarId};
use dae_model::{Equation, Model, Partition, Variable};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::Result;

/// Expand every live vector variable; returns how many were expanded.
pub fn expand_vectors(model: &mut Model) -> Result<usize> {
    if !model.has_vectors() {
        return Ok(0);
    }
    let vectors: Vec<VarId> = Partition::ORDERED
        .iter()
        .flat_map(|&p| model.partition(p).iter().copied())
        .filter(|&v| !model.variable(v).is_scalar())
        .collect();

    let mut elements: FxHashMap<VarId, Vec<VarId>> = FxHashMap::default();
    let mut subst = Substitution::new();
    for &vector in &vectors {
        let source = model.variable(vector).clone();
        let mut anchor = vector;
        let mut ids = Vec::with_capacity(source.slot_count());
        for index in 0..source.shape.unwrap_or(0) {
            let mut element = Variable::new(
                format!("{}[{}]", source.name, index + 1),
                source.partition,
            );
            element.attributes = source.attributes;
            anchor = model.declare_after(anchor, element)?;
            ids.push(anchor);
            let leaf = model.var(anchor);
            subst.insert(Slot::Element { var: vector, index }, leaf);
        }
        elements.insert(vector, ids);
    }

    for &vector in &vectors {
        let Some(state) = model.variable(vector).derivative_of else {
            continue;
        };
        let Some(states) = elements.get(&state) else {
            continue;
        };
        for (&der, &state) in elements[&vector].iter().zip(states) {
            model.variable_mut(der).derivative_of = Some(state);
        }
    }

    model.substitute_everywhere(&subst);
    for equation in &mut model.equations {
        let Equation::Affine(system) = equation else {
            continue;
        };
        for unknown in &mut system.unknowns {
            if let Slot::Element { var, index } = *unknown {
                if let Some(&scalar) = elements.get(&var).and_then(|ids| ids.get(index as usize)) {
                    *unknown = Slot::Scalar(scalar);
                }
            }
        }
    }
    for &vector in &vectors {
        model.eliminate(vector);
    }

    debug!(
        vectors = vectors.len(),
        scalars = subst.len(),
        "vector expansion",
    );
    Ok(vectors.len())
}
