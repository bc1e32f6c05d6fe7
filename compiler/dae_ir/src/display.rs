//! Human-readable rendering of expressions.

use std::fmt;

use crate::{BinaryOp, Expr, ExprArena, ExprId, Slot, VarId};

/// Borrowing formatter for one expression.
///
/// Created by [`ExprArena::display`]. Variable names come from the closure,
/// so the arena itself never needs to know about the variable table.
pub struct ExprDisplay<'a, F> {
    arena: &'a ExprArena,
    expr: ExprId,
    name_of: F,
}

impl ExprArena {
    pub fn display<F>(&self, expr: ExprId, name_of: F) -> ExprDisplay<'_, F>
    where
        F: Fn(VarId) -> String,
    {
        ExprDisplay {
            arena: self,
            expr,
            name_of,
        }
    }
}

fn precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Add | BinaryOp::Sub => 1,
        BinaryOp::Mul | BinaryOp::Div => 2,
        BinaryOp::Pow => 3,
    }
}

impl<F> ExprDisplay<'_, F>
where
    F: Fn(VarId) -> String,
{
    fn write(&self, f: &mut fmt::Formatter<'_>, id: ExprId, parent: u8) -> fmt::Result {
        match *self.arena.kind(id) {
            Expr::Num(bits) => {
                let value = f64::from_bits(bits);
                if value < 0.0 && parent > 0 {
                    write!(f, "({value})")
                } else {
                    write!(f, "{value}")
                }
            }
            Expr::Sym(Slot::Time) => f.write_str("time"),
            Expr::Sym(Slot::Scalar(var)) => f.write_str(&(self.name_of)(var)),
            Expr::Sym(Slot::Element { var, index }) => {
                write!(f, "{}[{}]", (self.name_of)(var), index + 1)
            }
            Expr::Neg(operand) => {
                f.write_str("-")?;
                self.write(f, operand, 4)
            }
            Expr::Binary { op, left, right } => {
                let prec = precedence(op);
                if prec < parent {
                    f.write_str("(")?;
                }
                self.write(f, left, prec)?;
                write!(f, " {} ", op.symbol())?;
                // Right operands of non-associative operators bind tighter.
                self.write(f, right, prec + 1)?;
                if prec < parent {
                    f.write_str(")")?;
                }
                Ok(())
            }
            Expr::Call { func, arg } => {
                write!(f, "{}(", func.name())?;
                self.write(f, arg, 0)?;
                f.write_str(")")
            }
        }
    }
}

impl<F> fmt::Display for ExprDisplay<'_, F>
where
    F: Fn(VarId) -> String,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, self.expr, 0)
    }
}
