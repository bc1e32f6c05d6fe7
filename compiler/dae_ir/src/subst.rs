//! Slot substitution.
//!
//! Rebuilding goes through the folding constructors, so substituting a
//! literal for a leaf folds every expression above it that becomes constant.

use rustc_hash::FxHashMap;

use crate::{Expr, ExprArena, ExprId, Slot};

/// A mapping from slots to replacement expressions.
#[derive(Clone, Debug, Default)]
pub struct Substitution {
    map: FxHashMap<Slot, ExprId>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slot: Slot, replacement: ExprId) {
        self.map.insert(slot, replacement);
    }

    #[inline]
    pub fn get(&self, slot: Slot) -> Option<ExprId> {
        self.map.get(&slot).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

impl FromIterator<(Slot, ExprId)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (Slot, ExprId)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

impl ExprArena {
    /// Replace every leaf in `subst` and rebuild.
    ///
    /// Replacements are not themselves rewritten: the substitution is applied
    /// once, simultaneously.
    pub fn substitute(&mut self, expr: ExprId, subst: &Substitution) -> ExprId {
        if subst.is_empty() {
            return expr;
        }
        let mut memo = FxHashMap::default();
        self.substitute_memo(expr, subst, &mut memo)
    }

    /// Apply `subst` to every expression in `exprs`, sharing one memo table.
    pub fn substitute_all(&mut self, exprs: &mut [ExprId], subst: &Substitution) {
        if subst.is_empty() {
            return;
        }
        let mut memo = FxHashMap::default();
        for expr in exprs {
            *expr = self.substitute_memo(*expr, subst, &mut memo);
        }
    }

    fn substitute_memo(
        &mut self,
        expr: ExprId,
        subst: &Substitution,
        memo: &mut FxHashMap<ExprId, ExprId>,
    ) -> ExprId {
        if let Some(&done) = memo.get(&expr) {
            return done;
        }

        let result = match *self.kind(expr) {
            Expr::Num(_) => expr,
            Expr::Sym(slot) => subst.get(slot).unwrap_or(expr),
            Expr::Neg(operand) => {
                let o = self.substitute_memo(operand, subst, memo);
                self.neg(o)
            }
            Expr::Binary { op, left, right } => {
                let l = self.substitute_memo(left, subst, memo);
                let r = self.substitute_memo(right, subst, memo);
                self.binary(op, l, r)
            }
            Expr::Call { func, arg } => {
                let a = self.substitute_memo(arg, subst, memo);
                self.call(func, a)
            }
        };

        memo.insert(expr, result);
        result
    }
}
