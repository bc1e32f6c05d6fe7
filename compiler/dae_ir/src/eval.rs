//! Direct evaluation of expressions.
//!
//! A reference interpreter over the arena. Evaluators that run many times
//! lower to a tape instead (see `dae_model::function`).

use rustc_hash::FxHashMap;

use crate::{Expr, ExprArena, ExprId, Slot};

impl ExprArena {
    /// Evaluate `expr`, reading leaves from `env`.
    pub fn eval(&self, expr: ExprId, env: &impl Fn(Slot) -> f64) -> f64 {
        let mut memo = FxHashMap::default();
        self.eval_memo(expr, env, &mut memo)
    }

    fn eval_memo(
        &self,
        expr: ExprId,
        env: &impl Fn(Slot) -> f64,
        memo: &mut FxHashMap<ExprId, f64>,
    ) -> f64 {
        if let Some(&value) = memo.get(&expr) {
            return value;
        }
        let value = match *self.kind(expr) {
            Expr::Num(bits) => f64::from_bits(bits),
            Expr::Sym(slot) => env(slot),
            Expr::Neg(operand) => -self.eval_memo(operand, env, memo),
            Expr::Binary { op, left, right } => {
                let l = self.eval_memo(left, env, memo);
                let r = self.eval_memo(right, env, memo);
                op.apply(l, r)
            }
            Expr::Call { func, arg } => func.apply(self.eval_memo(arg, env, memo)),
        };
        memo.insert(expr, value);
        value
    }
}
