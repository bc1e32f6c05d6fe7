//! Index newtypes for the expression arena and the variable table.
//!
//! Both are plain `u32` indices. `ExprId` indexes an [`ExprArena`](crate::ExprArena);
//! `VarId` indexes the variable table owned by the model.

use std::fmt;

/// Index into an [`ExprArena`](crate::ExprArena).
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// The literal `0.0`, pre-interned by every arena.
    pub const ZERO: ExprId = ExprId(0);
    /// The literal `1.0`, pre-interned by every arena.
    pub const ONE: ExprId = ExprId(1);
    /// The literal `-1.0`, pre-interned by every arena.
    pub const MINUS_ONE: ExprId = ExprId(2);

    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// Identity of a declared variable.
///
/// Ids are allocated in declaration order and never reused, so comparing two
/// ids compares declaration order. Eliminated variables keep their id.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarId({})", self.0)
    }
}
