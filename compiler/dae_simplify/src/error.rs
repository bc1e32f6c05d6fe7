//! Errors raised by the simplification passes.

use dae_model::ModelError;

pub type Result<T> = std::result::Result<T, SimplifyError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimplifyError {
    /// Alias equations that require `first = second` and `first = -second`.
    #[error("conflicting aliases: `{first}` is both equal and opposite to `{second}`")]
    ConflictingAlias { first: String, second: String },

    #[error("alias/affine reduction did not converge within {iterations} iterations")]
    NonConvergentReduction { iterations: usize },

    /// An equation classified as affine has a coefficient that still reads
    /// one of the unknowns.
    #[error("equation `{equation}` is not affine: its coefficient depends on `{unknown}`")]
    Classification { equation: String, unknown: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}
