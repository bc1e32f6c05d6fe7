//! Symbolic expression graph for the DAE canonicalization backend.
//!
//! This crate is the shared substrate every pass builds on:
//! - [`ExprArena`]: hash-consed storage for scalar expressions
//! - [`Expr`]: the closed set of expression node kinds
//! - [`Slot`]: a scalar leaf (time, a scalar variable, or one element of a
//!   vector variable)
//! - Structural differentiation, substitution, evaluation and dependency
//!   queries over the arena
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: no `Box<Expr>`, children are [`ExprId`] indices
//! - **Share Everything**: structurally equal nodes get the same id, so
//!   structural equality is an integer compare
//! - **Fold Eagerly**: the smart constructors fold literals and drop additive
//!   and multiplicative identities, which is what makes "identically zero"
//!   a structural question
//!
//! Literals are stored as `u64` bits for `Hash` compatibility.

mod arena;
mod diff;
mod display;
mod eval;
mod expr;
mod ids;
mod subst;

pub use arena::ExprArena;
pub use display::ExprDisplay;
pub use expr::{BinaryOp, Expr, Func, Slot};
pub use ids::{ExprId, VarId};
pub use subst::Substitution;
