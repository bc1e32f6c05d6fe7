//! The model container.
//!
//! Variables live in one table indexed by [`VarId`]; partitions are ordered
//! lists of ids into that table. Partition order is the evaluator layout
//! order, so every pass that edits a partition keeps the relative order of
//! the variables it does not touch.

use dae_ir::{ExprArena, ExprId, Slot, Substitution, VarId};
use rustc_hash::FxHashMap;

use crate::equation::Equation;
use crate::variable::{Partition, Variable};

/// Error building a model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("variable `{0}` is declared twice")]
    DuplicateVariable(String),
    #[error("`{0}` cannot be used as a partition list")]
    NotAPartition(Partition),
}

/// A DAE model: variables by partition, equations and initial equations.
///
/// A model owns its expression arena. Every pass takes `&mut Model`, so at
/// most one pass sees the model at a time.
#[derive(Clone, Debug, Default)]
pub struct Model {
    pub arena: ExprArena,
    variables: Vec<Variable>,
    partitions: [Vec<VarId>; 7],
    by_name: FxHashMap<String, VarId>,
    pub equations: Vec<Equation>,
    pub initial_equations: Vec<ExprId>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    // Declaration

    /// Declare a scalar variable at the end of `partition`.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        partition: Partition,
    ) -> Result<VarId, ModelError> {
        self.declare(Variable::new(name, partition))
    }

    /// Declare a vector variable of `len` elements at the end of `partition`.
    pub fn add_vector(
        &mut self,
        name: impl Into<String>,
        partition: Partition,
        len: u32,
    ) -> Result<VarId, ModelError> {
        let mut variable = Variable::new(name, partition);
        variable.shape = Some(len);
        self.declare(variable)
    }

    /// Declare a fully built variable at the end of its partition.
    pub fn declare(&mut self, variable: Variable) -> Result<VarId, ModelError> {
        let Some(index) = variable.partition.index() else {
            return Err(ModelError::NotAPartition(variable.partition));
        };
        if self.by_name.contains_key(&variable.name) {
            return Err(ModelError::DuplicateVariable(variable.name));
        }
        let id = VarId::new(u32::try_from(self.variables.len()).unwrap_or(u32::MAX));
        self.by_name.insert(variable.name.clone(), id);
        self.variables.push(variable);
        self.partitions[index].push(id);
        Ok(id)
    }

    /// Declare a variable directly after `anchor` in the anchor's partition.
    ///
    /// Used by vector expansion so element variables take the position of
    /// the vector they replace.
    pub fn declare_after(&mut self, anchor: VarId, variable: Variable) -> Result<VarId, ModelError> {
        let partition = variable.partition;
        let id = self.declare(variable)?;
        if let Some(index) = partition.index() {
            let list = &mut self.partitions[index];
            list.pop();
            let at = list.iter().position(|&v| v == anchor).map_or(list.len(), |p| p + 1);
            list.insert(at, id);
        }
        Ok(id)
    }

    pub fn add_equation(&mut self, expr: ExprId) {
        self.equations.push(Equation::Scalar(expr));
    }

    pub fn add_initial_equation(&mut self, expr: ExprId) {
        self.initial_equations.push(expr);
    }

    // Lookup

    #[inline]
    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.index()]
    }

    #[inline]
    pub fn variable_mut(&mut self, id: VarId) -> &mut Variable {
        &mut self.variables[id.index()]
    }

    /// Every variable ever declared, eliminated ones included.
    pub fn variables(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, v)| (VarId::new(i as u32), v))
    }

    pub fn lookup(&self, name: &str) -> Option<VarId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn name(&self, id: VarId) -> &str {
        &self.variables[id.index()].name
    }

    /// Expression leaf for a scalar variable.
    pub fn var(&mut self, id: VarId) -> ExprId {
        self.arena.var(id)
    }

    /// Render an expression with this model's variable names.
    pub fn render(&self, expr: ExprId) -> String {
        self.arena
            .display(expr, |v| self.name(v).to_owned())
            .to_string()
    }

    // Partitions

    /// The ordered variable list of `partition`. Empty for `Eliminated`.
    pub fn partition(&self, partition: Partition) -> &[VarId] {
        partition
            .index()
            .map_or(&[][..], |index| &self.partitions[index])
    }

    /// Replace the variable list of `partition`.
    ///
    /// Variables listed move into `partition`; variables previously in it
    /// and not listed become [`Partition::Eliminated`].
    pub fn set_partition(&mut self, partition: Partition, ids: Vec<VarId>) -> Result<(), ModelError> {
        let Some(index) = partition.index() else {
            return Err(ModelError::NotAPartition(partition));
        };
        for id in std::mem::take(&mut self.partitions[index]) {
            self.variables[id.index()].partition = Partition::Eliminated;
        }
        for &id in &ids {
            let previous = self.variables[id.index()].partition;
            if let Some(prev_index) = previous.index() {
                self.partitions[prev_index].retain(|&v| v != id);
            }
            self.variables[id.index()].partition = partition;
        }
        self.partitions[index] = ids;
        Ok(())
    }

    /// Remove `id` from its partition, keeping the order of the rest.
    pub fn eliminate(&mut self, id: VarId) {
        let variable = &mut self.variables[id.index()];
        if let Some(index) = variable.partition.index() {
            variable.partition = Partition::Eliminated;
            self.partitions[index].retain(|&v| v != id);
        }
    }

    pub fn states(&self) -> &[VarId] {
        self.partition(Partition::State)
    }

    pub fn der_states(&self) -> &[VarId] {
        self.partition(Partition::DerState)
    }

    pub fn alg_states(&self) -> &[VarId] {
        self.partition(Partition::AlgState)
    }

    pub fn inputs(&self) -> &[VarId] {
        self.partition(Partition::Input)
    }

    pub fn outputs(&self) -> &[VarId] {
        self.partition(Partition::Output)
    }

    pub fn constants(&self) -> &[VarId] {
        self.partition(Partition::Constant)
    }

    pub fn parameters(&self) -> &[VarId] {
        self.partition(Partition::Parameter)
    }

    /// Scalar slots of `partition`, vector variables expanded in place.
    pub fn slots(&self, partition: Partition) -> Vec<Slot> {
        let mut slots = Vec::new();
        for &id in self.partition(partition) {
            match self.variable(id).shape {
                None => slots.push(Slot::Scalar(id)),
                Some(n) => slots.extend((0..n).map(|index| Slot::Element { var: id, index })),
            }
        }
        slots
    }

    /// Returns `true` if any live variable is a vector.
    pub fn has_vectors(&self) -> bool {
        Partition::ORDERED
            .iter()
            .flat_map(|&p| self.partition(p))
            .any(|&id| !self.variable(id).is_scalar())
    }

    // Equations

    /// Total residual entries of the equations.
    pub fn residual_len(&self) -> usize {
        self.equations.iter().map(Equation::residual_len).sum()
    }

    /// Apply `subst` to every equation, initial equation and metadata
    /// expression of every live variable.
    pub fn substitute_everywhere(&mut self, subst: &Substitution) {
        if subst.is_empty() {
            return;
        }
        let mut exprs: Vec<ExprId> = Vec::new();

        for equation in &mut self.equations {
            exprs.extend(equation.exprs_mut().into_iter().map(|e| *e));
        }
        exprs.extend_from_slice(&self.initial_equations);
        for partition in &self.partitions {
            for &id in partition {
                let mut attrs = self.variables[id.index()].attributes;
                exprs.extend(attrs.exprs_mut().map(|e| *e));
            }
        }

        self.arena.substitute_all(&mut exprs, subst);

        let mut rewritten = exprs.into_iter();
        let mut next = || rewritten.next().unwrap_or(ExprId::ZERO);
        for equation in &mut self.equations {
            for e in equation.exprs_mut() {
                *e = next();
            }
        }
        for e in &mut self.initial_equations {
            *e = next();
        }
        for partition in &self.partitions {
            for &id in partition {
                for e in self.variables[id.index()].attributes.exprs_mut() {
                    *e = next();
                }
            }
        }
    }
}
