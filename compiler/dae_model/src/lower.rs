//! Lowering a model to its three evaluators.
//!
//! # Layouts
//!
//! - `dae_residual`, `initial_residual`: input is
//!   `[time, states, der_states, alg_states, inputs, outputs, constants,
//!   parameters]`, one entry per scalar slot; output is one entry per
//!   residual row in equation order.
//! - `variable_metadata`: input is `[constants, parameters]`; output has one
//!   row per slot of every live partition (same order as the residual input,
//!   without time) and one column per [`Attribute`], NaN where unset.

use dae_ir::{BinaryOp, Expr, ExprArena, ExprId, Slot};
use rustc_hash::FxHashMap;

use crate::equation::Equation;
use crate::function::{Function, Op, Sparsity};
use crate::model::Model;
use crate::variable::{Attribute, Partition};

pub const DAE_RESIDUAL: &str = "dae_residual";
pub const INITIAL_RESIDUAL: &str = "initial_residual";
pub const VARIABLE_METADATA: &str = "variable_metadata";

/// Error lowering a model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LowerError {
    #[error("`{function}` reads `{name}`, which is not one of its inputs")]
    UnboundSlot {
        function: &'static str,
        name: String,
    },
}

/// The three evaluators of a model.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelFunctions {
    pub dae_residual: Function,
    pub initial_residual: Function,
    pub variable_metadata: Function,
}

impl ModelFunctions {
    /// All evaluators with their names, in a fixed order.
    pub fn iter(&self) -> [(&'static str, &Function); 3] {
        [
            (DAE_RESIDUAL, &self.dae_residual),
            (INITIAL_RESIDUAL, &self.initial_residual),
            (VARIABLE_METADATA, &self.variable_metadata),
        ]
    }
}

impl Model {
    /// Lower the model to its evaluators.
    pub fn functions(&self) -> Result<ModelFunctions, LowerError> {
        let mut residual_inputs = vec![Slot::Time];
        for partition in Partition::ORDERED {
            residual_inputs.extend(self.slots(partition));
        }
        let mut metadata_inputs = self.slots(Partition::Constant);
        metadata_inputs.extend(self.slots(Partition::Parameter));

        let dae_residual = self.lower_residual(DAE_RESIDUAL, &residual_inputs, &self.equations)?;
        let initial: Vec<Equation> = self
            .initial_equations
            .iter()
            .map(|&e| Equation::Scalar(e))
            .collect();
        let initial_residual = self.lower_residual(INITIAL_RESIDUAL, &residual_inputs, &initial)?;
        let variable_metadata = self.lower_metadata(&metadata_inputs)?;

        tracing::debug!(
            dae_ops = dae_residual.instruction_count(),
            initial_ops = initial_residual.instruction_count(),
            metadata_ops = variable_metadata.instruction_count(),
            arena_nodes = self.arena.len(),
            "lowered model functions",
        );

        Ok(ModelFunctions {
            dae_residual,
            initial_residual,
            variable_metadata,
        })
    }

    fn lower_residual(
        &self,
        name: &'static str,
        inputs: &[Slot],
        equations: &[Equation],
    ) -> Result<Function, LowerError> {
        let mut tape = TapeBuilder::new(self, name, inputs);
        let mut outputs = Vec::new();
        let mut nonzeros = Vec::new();

        for equation in equations {
            match equation {
                Equation::Scalar(expr) => {
                    if !self.arena.is_zero(*expr) {
                        nonzeros.push(outputs.len() as u32);
                    }
                    outputs.push(tape.lower(*expr)?);
                }
                Equation::Affine(system) => {
                    for r in 0..system.rows() {
                        let mut structural = !self.arena.is_zero(system.constant(r));
                        let mut acc = tape.lower(system.constant(r))?;
                        for (c, &slot) in system.unknowns.iter().enumerate() {
                            let coeff = system.coefficient(r, c);
                            if self.arena.is_zero(coeff) {
                                continue;
                            }
                            structural = true;
                            let x = tape.input(slot)?;
                            let term = if coeff == ExprId::ONE {
                                x
                            } else {
                                let k = tape.lower(coeff)?;
                                tape.push(Op::Binary(BinaryOp::Mul, k, x))
                            };
                            acc = tape.push(Op::Binary(BinaryOp::Add, acc, term));
                        }
                        if structural {
                            nonzeros.push(outputs.len() as u32);
                        }
                        outputs.push(acc);
                    }
                }
            }
        }

        let rows = outputs.len();
        Ok(tape.finish(
            Sparsity {
                rows,
                cols: 1,
                nonzeros,
            },
            outputs,
        ))
    }

    fn lower_metadata(&self, inputs: &[Slot]) -> Result<Function, LowerError> {
        let mut tape = TapeBuilder::new(self, VARIABLE_METADATA, inputs);
        let mut outputs = Vec::new();
        let mut nonzeros = Vec::new();
        let missing = tape.constant(f64::NAN);

        for partition in Partition::ORDERED {
            for slot in self.slots(partition) {
                let Some(var) = slot.var() else { continue };
                let attributes = self.variable(var).attributes;
                for attribute in Attribute::ALL {
                    match attributes.get(attribute) {
                        Some(expr) => {
                            if !self.arena.is_zero(expr) {
                                nonzeros.push(outputs.len() as u32);
                            }
                            outputs.push(tape.lower(expr)?);
                        }
                        None => {
                            nonzeros.push(outputs.len() as u32);
                            outputs.push(missing);
                        }
                    }
                }
            }
        }

        let cols = Attribute::ALL.len();
        let rows = outputs.len() / cols;
        Ok(tape.finish(
            Sparsity {
                rows,
                cols,
                nonzeros,
            },
            outputs,
        ))
    }

    /// Display name of a slot, `name[i]` for elements (one-based).
    pub fn slot_name(&self, slot: Slot) -> String {
        match slot {
            Slot::Time => "time".to_owned(),
            Slot::Scalar(var) => self.name(var).to_owned(),
            Slot::Element { var, index } => format!("{}[{}]", self.name(var), index + 1),
        }
    }
}

/// Builds a tape from arena expressions, sharing common subexpressions.
struct TapeBuilder<'m> {
    model: &'m Model,
    arena: &'m ExprArena,
    function: &'static str,
    input_count: usize,
    input_index: FxHashMap<Slot, u32>,
    ops: Vec<Op>,
    memo: FxHashMap<ExprId, u32>,
    inputs_loaded: FxHashMap<u32, u32>,
}

impl<'m> TapeBuilder<'m> {
    fn new(model: &'m Model, function: &'static str, inputs: &[Slot]) -> Self {
        Self {
            model,
            arena: &model.arena,
            function,
            input_count: inputs.len(),
            input_index: inputs
                .iter()
                .enumerate()
                .map(|(i, &s)| (s, i as u32))
                .collect(),
            ops: Vec::new(),
            memo: FxHashMap::default(),
            inputs_loaded: FxHashMap::default(),
        }
    }

    fn push(&mut self, op: Op) -> u32 {
        let pos = self.ops.len() as u32;
        self.ops.push(op);
        pos
    }

    fn constant(&mut self, value: f64) -> u32 {
        self.push(Op::Const(value))
    }

    /// Tape position holding the value of input `slot`.
    fn input(&mut self, slot: Slot) -> Result<u32, LowerError> {
        let Some(&index) = self.input_index.get(&slot) else {
            return Err(LowerError::UnboundSlot {
                function: self.function,
                name: self.model.slot_name(slot),
            });
        };
        if let Some(&pos) = self.inputs_loaded.get(&index) {
            return Ok(pos);
        }
        let pos = self.push(Op::Input(index));
        self.inputs_loaded.insert(index, pos);
        Ok(pos)
    }

    fn lower(&mut self, expr: ExprId) -> Result<u32, LowerError> {
        if let Some(&pos) = self.memo.get(&expr) {
            return Ok(pos);
        }
        let pos = match *self.arena.kind(expr) {
            Expr::Num(bits) => self.constant(f64::from_bits(bits)),
            Expr::Sym(slot) => self.input(slot)?,
            Expr::Neg(operand) => {
                let a = self.lower(operand)?;
                self.push(Op::Neg(a))
            }
            Expr::Binary { op, left, right } => {
                let a = self.lower(left)?;
                let b = self.lower(right)?;
                self.push(Op::Binary(op, a, b))
            }
            Expr::Call { func, arg } => {
                let a = self.lower(arg)?;
                self.push(Op::Call(func, a))
            }
        };
        self.memo.insert(expr, pos);
        Ok(pos)
    }

    fn finish(self, output: Sparsity, outputs: Vec<u32>) -> Function {
        Function {
            name: self.function.to_owned(),
            input: Sparsity::dense_column(self.input_count),
            output,
            ops: self.ops,
            outputs,
        }
    }
}
