//! Model container for the DAE canonicalization backend.
//!
//! This crate provides:
//!
//! - **[`Model`]**: variables by partition, equations, initial equations and
//!   the expression arena they share
//! - **[`Equation`] / [`AffineSystem`]**: scalar residuals and the canonical
//!   `A·x + b = 0` block
//! - **[`CompilerOptions`]**: which simplification passes run
//! - **Lowering** ([`ModelFunctions`], [`Function`]): the three evaluators
//!   (`dae_residual`, `initial_residual`, `variable_metadata`), each a tape
//!   over one stacked input vector
//! - **[`CachedModel`]**: the persisted form, evaluators without equations
//! - **[`ModelView`]**: what live and cached models have in common
//!
//! The simplification passes themselves live in `dae_simplify`.

mod cache;
mod equation;
mod function;
mod lower;
mod model;
mod options;
mod variable;
mod view;

pub use cache::{CacheError, CachedModel, CachedPartition};
pub use equation::{AffineSystem, Equation};
pub use function::{CallError, Function, Op, Sparsity};
pub use lower::{LowerError, ModelFunctions, DAE_RESIDUAL, INITIAL_RESIDUAL, VARIABLE_METADATA};
pub use model::{Model, ModelError};
pub use options::{CompilerOptions, OptionsError};
pub use variable::{AliasName, Attribute, Attributes, Partition, Sign, Variable};
pub use view::ModelView;
