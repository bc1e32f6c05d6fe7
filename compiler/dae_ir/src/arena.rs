//! Hash-consed expression arena.
//!
//! Every node is interned: pushing a node that already exists returns the
//! existing [`ExprId`]. Together with the folding smart constructors this
//! makes structural equality an id compare and structural zero a check
//! against [`ExprId::ZERO`].

use rustc_hash::FxHashMap;

use crate::{BinaryOp, Expr, ExprId, Func, Slot, VarId};

/// Arena of interned scalar expressions.
///
/// Nodes are never removed; rewriting passes build new nodes and drop
/// references to the old ones. Literals `0`, `1` and `-1` are pre-interned at
/// fixed ids so the hot identity checks need no lookup.
#[derive(Clone, Debug)]
pub struct ExprArena {
    nodes: Vec<Expr>,
    dedup: FxHashMap<Expr, ExprId>,
}

impl Default for ExprArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprArena {
    pub fn new() -> Self {
        let mut arena = Self {
            nodes: Vec::with_capacity(64),
            dedup: FxHashMap::default(),
        };
        let zero = arena.intern(Expr::num(0.0));
        let one = arena.intern(Expr::num(1.0));
        let minus_one = arena.intern(Expr::num(-1.0));
        debug_assert_eq!(zero, ExprId::ZERO);
        debug_assert_eq!(one, ExprId::ONE);
        debug_assert_eq!(minus_one, ExprId::MINUS_ONE);
        arena
    }

    /// Intern a node without simplification.
    pub fn intern(&mut self, node: Expr) -> ExprId {
        if let Some(&id) = self.dedup.get(&node) {
            return id;
        }
        let index = u32::try_from(self.nodes.len()).unwrap_or_else(|_| {
            panic!("expression arena exceeded u32::MAX nodes");
        });
        let id = ExprId::new(index);
        self.nodes.push(node);
        self.dedup.insert(node, id);
        id
    }

    /// Get the node for an id.
    #[inline]
    pub fn kind(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    /// Number of interned nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the identity literals are pre-interned.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The literal value of `id`, if it is a literal.
    #[inline]
    pub fn as_num(&self, id: ExprId) -> Option<f64> {
        self.kind(id).as_num()
    }

    #[inline]
    pub fn is_zero(&self, id: ExprId) -> bool {
        id == ExprId::ZERO
    }

    // Leaves

    pub fn num(&mut self, value: f64) -> ExprId {
        self.intern(Expr::num(value))
    }

    pub fn sym(&mut self, slot: Slot) -> ExprId {
        self.intern(Expr::Sym(slot))
    }

    pub fn var(&mut self, var: VarId) -> ExprId {
        self.sym(Slot::Scalar(var))
    }

    pub fn elem(&mut self, var: VarId, index: u32) -> ExprId {
        self.sym(Slot::Element { var, index })
    }

    pub fn time(&mut self) -> ExprId {
        self.sym(Slot::Time)
    }

    // Folding constructors

    pub fn neg(&mut self, operand: ExprId) -> ExprId {
        match *self.kind(operand) {
            Expr::Num(_) => {
                let value = self.as_num(operand).unwrap_or(f64::NAN);
                self.num(-value)
            }
            Expr::Neg(inner) => inner,
            _ => self.intern(Expr::Neg(operand)),
        }
    }

    pub fn add(&mut self, left: ExprId, right: ExprId) -> ExprId {
        if let Some(folded) = self.fold_literals(BinaryOp::Add, left, right) {
            return folded;
        }
        if self.is_zero(left) {
            return right;
        }
        if self.is_zero(right) {
            return left;
        }
        if let Expr::Neg(inner) = *self.kind(right) {
            return self.sub(left, inner);
        }
        if let Expr::Neg(inner) = *self.kind(left) {
            return self.sub(right, inner);
        }
        self.binary_node(BinaryOp::Add, left, right)
    }

    pub fn sub(&mut self, left: ExprId, right: ExprId) -> ExprId {
        if let Some(folded) = self.fold_literals(BinaryOp::Sub, left, right) {
            return folded;
        }
        if left == right {
            return ExprId::ZERO;
        }
        if self.is_zero(right) {
            return left;
        }
        if self.is_zero(left) {
            return self.neg(right);
        }
        if let Expr::Neg(inner) = *self.kind(right) {
            return self.add(left, inner);
        }
        self.binary_node(BinaryOp::Sub, left, right)
    }

    pub fn mul(&mut self, left: ExprId, right: ExprId) -> ExprId {
        if let Some(folded) = self.fold_literals(BinaryOp::Mul, left, right) {
            return folded;
        }
        if self.is_zero(left) || self.is_zero(right) {
            return ExprId::ZERO;
        }
        if left == ExprId::ONE {
            return right;
        }
        if right == ExprId::ONE {
            return left;
        }
        if left == ExprId::MINUS_ONE {
            return self.neg(right);
        }
        if right == ExprId::MINUS_ONE {
            return self.neg(left);
        }
        self.binary_node(BinaryOp::Mul, left, right)
    }

    pub fn div(&mut self, left: ExprId, right: ExprId) -> ExprId {
        if let Some(folded) = self.fold_literals(BinaryOp::Div, left, right) {
            return folded;
        }
        if self.is_zero(left) {
            return ExprId::ZERO;
        }
        if right == ExprId::ONE {
            return left;
        }
        if right == ExprId::MINUS_ONE {
            return self.neg(left);
        }
        self.binary_node(BinaryOp::Div, left, right)
    }

    pub fn pow(&mut self, base: ExprId, exponent: ExprId) -> ExprId {
        if let Some(folded) = self.fold_literals(BinaryOp::Pow, base, exponent) {
            return folded;
        }
        if self.is_zero(exponent) {
            return ExprId::ONE;
        }
        if exponent == ExprId::ONE {
            return base;
        }
        self.binary_node(BinaryOp::Pow, base, exponent)
    }

    /// Dispatch to the folding constructor for `op`.
    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        match op {
            BinaryOp::Add => self.add(left, right),
            BinaryOp::Sub => self.sub(left, right),
            BinaryOp::Mul => self.mul(left, right),
            BinaryOp::Div => self.div(left, right),
            BinaryOp::Pow => self.pow(left, right),
        }
    }

    pub fn call(&mut self, func: Func, arg: ExprId) -> ExprId {
        if let Some(value) = self.as_num(arg) {
            return self.num(func.apply(value));
        }
        self.intern(Expr::Call { func, arg })
    }

    /// Sum of a sequence, folding as it goes. Empty sums are zero.
    pub fn sum(&mut self, terms: impl IntoIterator<Item = ExprId>) -> ExprId {
        terms
            .into_iter()
            .fold(ExprId::ZERO, |acc, term| self.add(acc, term))
    }

    fn fold_literals(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> Option<ExprId> {
        let l = self.as_num(left)?;
        let r = self.as_num(right)?;
        Some(self.num(op.apply(l, r)))
    }

    fn binary_node(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.intern(Expr::Binary { op, left, right })
    }
}
