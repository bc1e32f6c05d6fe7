//! Structural differentiation.
//!
//! Derivatives are built with the folding constructors, so a derivative that
//! is identically zero by construction comes back as [`ExprId::ZERO`]. This is
//! what the affine classifier relies on: it never evaluates anything to decide
//! whether a second derivative vanishes.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{BinaryOp, Expr, ExprArena, ExprId, Func, Slot};

impl ExprArena {
    /// Differentiate `expr` with respect to `wrt`.
    pub fn diff(&mut self, expr: ExprId, wrt: Slot) -> ExprId {
        let mut memo = FxHashMap::default();
        self.diff_memo(expr, wrt, &mut memo)
    }

    fn diff_memo(
        &mut self,
        expr: ExprId,
        wrt: Slot,
        memo: &mut FxHashMap<ExprId, ExprId>,
    ) -> ExprId {
        if let Some(&done) = memo.get(&expr) {
            return done;
        }

        let result = match *self.kind(expr) {
            Expr::Num(_) => ExprId::ZERO,
            Expr::Sym(slot) => {
                if slot == wrt {
                    ExprId::ONE
                } else {
                    ExprId::ZERO
                }
            }
            Expr::Neg(operand) => {
                let d = self.diff_memo(operand, wrt, memo);
                self.neg(d)
            }
            Expr::Binary { op, left, right } => {
                let dl = self.diff_memo(left, wrt, memo);
                let dr = self.diff_memo(right, wrt, memo);
                self.diff_binary(op, left, right, dl, dr)
            }
            Expr::Call { func, arg } => {
                let da = self.diff_memo(arg, wrt, memo);
                if self.is_zero(da) {
                    ExprId::ZERO
                } else {
                    let outer = self.diff_func(func, arg);
                    self.mul(outer, da)
                }
            }
        };

        memo.insert(expr, result);
        result
    }

    fn diff_binary(
        &mut self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        dl: ExprId,
        dr: ExprId,
    ) -> ExprId {
        match op {
            BinaryOp::Add => self.add(dl, dr),
            BinaryOp::Sub => self.sub(dl, dr),
            // (f g)' = f' g + f g'
            BinaryOp::Mul => {
                let a = self.mul(dl, right);
                let b = self.mul(left, dr);
                self.add(a, b)
            }
            // (f / g)' = f' / g - f g' / g^2
            BinaryOp::Div => {
                let a = self.div(dl, right);
                let num = self.mul(left, dr);
                let den = self.mul(right, right);
                let b = self.div(num, den);
                self.sub(a, b)
            }
            BinaryOp::Pow => {
                if self.is_zero(dr) {
                    // (f^c)' = c f^(c-1) f'
                    let exponent = self.sub(right, ExprId::ONE);
                    let power = self.pow(left, exponent);
                    let scaled = self.mul(right, power);
                    self.mul(scaled, dl)
                } else {
                    // (f^g)' = f^g (g' ln f + g f' / f)
                    let power = self.pow(left, right);
                    let ln = self.call(Func::Log, left);
                    let a = self.mul(dr, ln);
                    let ratio = self.div(dl, left);
                    let b = self.mul(right, ratio);
                    let inner = self.add(a, b);
                    self.mul(power, inner)
                }
            }
        }
    }

    /// Outer derivative `f'(arg)` of an elementary function.
    fn diff_func(&mut self, func: Func, arg: ExprId) -> ExprId {
        match func {
            Func::Sin => self.call(Func::Cos, arg),
            Func::Cos => {
                let s = self.call(Func::Sin, arg);
                self.neg(s)
            }
            Func::Tan => {
                let c = self.call(Func::Cos, arg);
                let c2 = self.mul(c, c);
                self.div(ExprId::ONE, c2)
            }
            Func::Atan => {
                let sq = self.mul(arg, arg);
                let den = self.add(ExprId::ONE, sq);
                self.div(ExprId::ONE, den)
            }
            Func::Exp => self.call(Func::Exp, arg),
            Func::Log => self.div(ExprId::ONE, arg),
            Func::Sqrt => {
                let root = self.call(Func::Sqrt, arg);
                let two = self.num(2.0);
                let den = self.mul(two, root);
                self.div(ExprId::ONE, den)
            }
            Func::Tanh => {
                let t = self.call(Func::Tanh, arg);
                let t2 = self.mul(t, t);
                self.sub(ExprId::ONE, t2)
            }
            Func::Abs => self.call(Func::Sign, arg),
            Func::Sign => ExprId::ZERO,
        }
    }

    /// Every slot reachable from `expr`, in ascending slot order.
    pub fn free_slots(&self, expr: ExprId) -> Vec<Slot> {
        let mut seen = FxHashSet::default();
        let mut slots = Vec::new();
        let mut stack = vec![expr];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            match *self.kind(id) {
                Expr::Num(_) => {}
                Expr::Sym(slot) => slots.push(slot),
                Expr::Neg(operand) => stack.push(operand),
                Expr::Binary { left, right, .. } => {
                    stack.push(left);
                    stack.push(right);
                }
                Expr::Call { arg, .. } => stack.push(arg),
            }
        }
        slots.sort_unstable();
        slots.dedup();
        slots
    }

    /// Returns `true` if any slot reachable from `expr` satisfies `pred`.
    pub fn depends_on(&self, expr: ExprId, mut pred: impl FnMut(Slot) -> bool) -> bool {
        self.free_slots(expr).into_iter().any(&mut pred)
    }
}

#[cfg(test)]
mod tests;
