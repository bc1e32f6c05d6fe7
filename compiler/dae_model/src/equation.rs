//! Equations and the canonical affine block.

use dae_ir::{ExprArena, ExprId, Slot};

/// An equation of the model, required to equal zero.
#[derive(Clone, Debug, PartialEq)]
pub enum Equation {
    /// One scalar residual expression.
    Scalar(ExprId),
    /// `A·x + b = 0`, standing in for a group of scalar equations.
    Affine(AffineSystem),
}

impl Equation {
    /// Number of residual entries this equation contributes.
    #[inline]
    pub fn residual_len(&self) -> usize {
        match self {
            Equation::Scalar(_) => 1,
            Equation::Affine(system) => system.rows(),
        }
    }

    /// Every expression the equation holds, for rewriting passes.
    pub fn exprs_mut(&mut self) -> Vec<&mut ExprId> {
        match self {
            Equation::Scalar(expr) => vec![expr],
            Equation::Affine(system) => system
                .coefficients
                .iter_mut()
                .chain(system.constants.iter_mut())
                .collect(),
        }
    }
}

/// Canonical affine form `A·x + b = 0`.
///
/// `A` is dense, row-major, `rows × unknowns.len()`. Entries are expressions
/// so that coefficients depending on parameters or states survive without
/// numeric values; when everything is a literal, [`AffineSystem::numeric`]
/// returns plain matrices.
#[derive(Clone, Debug, PartialEq)]
pub struct AffineSystem {
    /// Column order of `A`: algebraic unknown slots in partition order.
    pub unknowns: Vec<Slot>,
    pub coefficients: Vec<ExprId>,
    pub constants: Vec<ExprId>,
}

impl AffineSystem {
    /// An empty system over `unknowns`.
    pub fn new(unknowns: Vec<Slot>) -> Self {
        Self {
            unknowns,
            coefficients: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Append one row. `row.len()` must equal the number of unknowns.
    pub fn push_row(&mut self, row: &[ExprId], constant: ExprId) {
        debug_assert_eq!(row.len(), self.unknowns.len(), "affine row width");
        self.coefficients.extend_from_slice(row);
        self.constants.push(constant);
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.constants.len()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.unknowns.len()
    }

    #[inline]
    pub fn coefficient(&self, row: usize, col: usize) -> ExprId {
        self.coefficients[row * self.cols() + col]
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[ExprId] {
        let cols = self.cols();
        &self.coefficients[row * cols..(row + 1) * cols]
    }

    #[inline]
    pub fn constant(&self, row: usize) -> ExprId {
        self.constants[row]
    }

    /// Literal `(A, b)` when every entry is a literal.
    pub fn numeric(&self, arena: &ExprArena) -> Option<(Vec<Vec<f64>>, Vec<f64>)> {
        let a = (0..self.rows())
            .map(|r| {
                self.row(r)
                    .iter()
                    .map(|&c| arena.as_num(c))
                    .collect::<Option<Vec<_>>>()
            })
            .collect::<Option<Vec<_>>>()?;
        let b = self
            .constants
            .iter()
            .map(|&c| arena.as_num(c))
            .collect::<Option<Vec<_>>>()?;
        Some((a, b))
    }

    /// Expand back into one scalar residual per row.
    pub fn to_scalar_equations(&self, arena: &mut ExprArena) -> Vec<ExprId> {
        let mut out = Vec::with_capacity(self.rows());
        for r in 0..self.rows() {
            let mut acc = self.constant(r);
            for (c, &slot) in self.unknowns.iter().enumerate() {
                let coeff = self.coefficient(r, c);
                if arena.is_zero(coeff) {
                    continue;
                }
                let x = arena.sym(slot);
                let term = arena.mul(coeff, x);
                acc = arena.add(term, acc);
            }
            out.push(acc);
        }
        out
    }
}

#[cfg(test)]
mod tests;
