//! Uniform read access to live and cached models.

use std::borrow::Cow;

use crate::cache::CachedModel;
use crate::lower::{LowerError, ModelFunctions};
use crate::model::Model;
use crate::variable::Partition;

/// What the equivalence oracle needs from a model.
pub trait ModelView {
    /// Number of variables in `partition`.
    fn cardinality(&self, partition: Partition) -> usize;

    /// Residual row counts of `(equations, initial_equations)`. `None` when
    /// the form does not retain equations.
    fn residual_counts(&self) -> Option<(usize, usize)>;

    fn functions(&self) -> Result<Cow<'_, ModelFunctions>, LowerError>;
}

impl ModelView for Model {
    fn cardinality(&self, partition: Partition) -> usize {
        self.partition(partition).len()
    }

    fn residual_counts(&self) -> Option<(usize, usize)> {
        Some((self.residual_len(), self.initial_equations.len()))
    }

    fn functions(&self) -> Result<Cow<'_, ModelFunctions>, LowerError> {
        Model::functions(self).map(Cow::Owned)
    }
}

impl ModelView for CachedModel {
    fn cardinality(&self, partition: Partition) -> usize {
        self.names(partition).len()
    }

    fn residual_counts(&self) -> Option<(usize, usize)> {
        None
    }

    fn functions(&self) -> Result<Cow<'_, ModelFunctions>, LowerError> {
        Ok(Cow::Borrowed(&self.functions))
    }
}
