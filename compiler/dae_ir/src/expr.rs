//! Expression node kinds.
//!
//! [`Expr`] is a closed enumeration: every pass matches it exhaustively, so
//! adding a node kind is a compile error everywhere it needs handling.

use crate::{ExprId, VarId};

/// A scalar leaf of the expression graph.
///
/// Vector variables are not scalars; their elements are addressed one at a
/// time through [`Slot::Element`] until vector expansion turns each element
/// into its own scalar variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Slot {
    /// The independent variable.
    Time,
    /// A scalar variable.
    Scalar(VarId),
    /// Element `index` (zero-based) of a vector variable.
    Element { var: VarId, index: u32 },
}

impl Slot {
    /// The variable this slot reads, if any.
    #[inline]
    pub fn var(self) -> Option<VarId> {
        match self {
            Slot::Time => None,
            Slot::Scalar(var) | Slot::Element { var, .. } => Some(var),
        }
    }
}

/// Binary arithmetic operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    #[inline]
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOp::Add => left + right,
            BinaryOp::Sub => left - right,
            BinaryOp::Mul => left * right,
            BinaryOp::Div => left / right,
            BinaryOp::Pow => left.powf(right),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

/// Elementary functions of one argument.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Atan,
    Exp,
    Log,
    Sqrt,
    Tanh,
    Abs,
    /// Piecewise constant: `-1`, `0` or `1`.
    Sign,
}

impl Func {
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Atan => x.atan(),
            Func::Exp => x.exp(),
            Func::Log => x.ln(),
            Func::Sqrt => x.sqrt(),
            Func::Tanh => x.tanh(),
            Func::Abs => x.abs(),
            Func::Sign => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Atan => "atan",
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Sqrt => "sqrt",
            Func::Tanh => "tanh",
            Func::Abs => "abs",
            Func::Sign => "sign",
        }
    }

    /// Look up a function by its surface name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "atan" => Func::Atan,
            "exp" => Func::Exp,
            "log" => Func::Log,
            "sqrt" => Func::Sqrt,
            "tanh" => Func::Tanh,
            "abs" => Func::Abs,
            "sign" => Func::Sign,
            _ => return None,
        })
    }
}

/// A node of the expression graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    /// Numeric literal, stored as `f64` bits.
    Num(u64),
    /// A scalar leaf.
    Sym(Slot),
    Neg(ExprId),
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Call {
        func: Func,
        arg: ExprId,
    },
}

impl Expr {
    /// Build a literal node. `-0.0` is normalized to `0.0` and every NaN to
    /// the canonical NaN so that equal values hash equally.
    #[inline]
    pub fn num(value: f64) -> Self {
        let value = if value == 0.0 {
            0.0
        } else if value.is_nan() {
            f64::NAN
        } else {
            value
        };
        Expr::Num(value.to_bits())
    }

    /// The literal value, if this is a literal.
    #[inline]
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Expr::Num(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }
}
