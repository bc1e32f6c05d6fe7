//! Lowered evaluators.
//!
//! A [`Function`] is a straight-line tape: one instruction per distinct
//! subexpression, operands referring to earlier instructions by position.
//! It takes one stacked input vector and produces one stacked output matrix
//! (row-major). Tapes are self-contained, which is what lets the cached model
//! drop the expression graph entirely.

use dae_ir::{BinaryOp, Func};

/// Error calling a [`Function`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("`{function}` expects {expected} inputs, got {found}")]
    InputSize {
        function: String,
        expected: usize,
        found: usize,
    },
    #[error("`{function}` instruction {position} reads operand {operand}, which is out of range")]
    Operand {
        function: String,
        position: usize,
        operand: u32,
    },
}

/// Shape and structural nonzero pattern of a dense-stored matrix.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Sparsity {
    pub rows: usize,
    pub cols: usize,
    /// Row-major positions that may hold a nonzero, ascending.
    pub nonzeros: Vec<u32>,
}

impl Sparsity {
    /// A column vector with every entry structurally nonzero.
    pub fn dense_column(rows: usize) -> Self {
        Self {
            rows,
            cols: 1,
            nonzeros: (0..rows as u32).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(row, col)` of a row-major position.
    #[inline]
    pub fn position(&self, flat: usize) -> (usize, usize) {
        if self.cols == 0 {
            return (flat, 0);
        }
        (flat / self.cols, flat % self.cols)
    }
}

/// One tape instruction.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Op {
    Const(f64),
    Input(u32),
    Neg(u32),
    Binary(BinaryOp, u32, u32),
    Call(Func, u32),
}

/// A compiled evaluator.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Function {
    pub name: String,
    pub input: Sparsity,
    pub output: Sparsity,
    pub(crate) ops: Vec<Op>,
    /// Tape position of each output entry, row-major.
    pub(crate) outputs: Vec<u32>,
}

impl Function {
    /// Number of stacked inputs.
    #[inline]
    pub fn n_in(&self) -> usize {
        self.input.len()
    }

    /// Tape length.
    pub fn instruction_count(&self) -> usize {
        self.ops.len()
    }

    /// Evaluate at `input`, returning the row-major output.
    pub fn call(&self, input: &[f64]) -> Result<Vec<f64>, CallError> {
        if input.len() != self.n_in() {
            return Err(CallError::InputSize {
                function: self.name.clone(),
                expected: self.n_in(),
                found: input.len(),
            });
        }

        let mut work: Vec<f64> = Vec::with_capacity(self.ops.len());
        for (position, op) in self.ops.iter().enumerate() {
            let read = |values: &[f64], operand: u32| {
                values
                    .get(operand as usize)
                    .copied()
                    .ok_or_else(|| CallError::Operand {
                        function: self.name.clone(),
                        position,
                        operand,
                    })
            };
            let value = match *op {
                Op::Const(value) => value,
                Op::Input(i) => read(input, i)?,
                Op::Neg(a) => -read(work.as_slice(), a)?,
                Op::Binary(op, a, b) => {
                    op.apply(read(work.as_slice(), a)?, read(work.as_slice(), b)?)
                }
                Op::Call(func, a) => func.apply(read(work.as_slice(), a)?),
            };
            work.push(value);
        }

        self.outputs
            .iter()
            .map(|&pos| {
                work.get(pos as usize).copied().ok_or_else(|| CallError::Operand {
                    function: self.name.clone(),
                    position: self.ops.len(),
                    operand: pos,
                })
            })
            .collect()
    }
}
