//! JSON model documents.
//!
//! A document lists variables per partition, in declaration order, and
//! equations as expression trees:
//!
//! ```json
//! {
//!   "alg_states": [{ "name": "x" }, { "name": "y", "shape": 3 }],
//!   "equations": [{ "op": "-", "args": ["y[1]", "x"] }]
//! }
//! ```
//!
//! Expression nodes are numbers, booleans (`fixed` flags), references
//! (`"x"`, `"y[2]"` one-based, `"time"`) or operator nodes with `op` one of
//! `+ - * / ^` or an elementary function name.

use std::path::Path;

use dae_ir::{BinaryOp, ExprId, Func, VarId};
use dae_model::{Attribute, CompilerOptions, Model, ModelError, OptionsError, Partition};
use rustc_hash::FxHashMap;

/// Error loading a model document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid model document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("`{name}` has no element {index}")]
    ElementOutOfRange { name: String, index: u32 },
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),
    #[error("`{op}` takes {expected} arguments, got {found}")]
    Arity {
        op: String,
        expected: &'static str,
        found: usize,
    },
}

/// An expression tree as written in a document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ExprNode {
    Num(f64),
    Bool(bool),
    Ref(String),
    Op { op: String, args: Vec<ExprNode> },
}

/// One declared variable.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VariableDecl {
    pub name: String,
    pub shape: Option<u32>,
    pub derivative_of: Option<String>,
    pub value: Option<ExprNode>,
    pub start: Option<ExprNode>,
    pub min: Option<ExprNode>,
    pub max: Option<ExprNode>,
    pub nominal: Option<ExprNode>,
    pub fixed: Option<ExprNode>,
}

impl VariableDecl {
    fn attribute(&self, attribute: Attribute) -> Option<&ExprNode> {
        match attribute {
            Attribute::Value => self.value.as_ref(),
            Attribute::Start => self.start.as_ref(),
            Attribute::Min => self.min.as_ref(),
            Attribute::Max => self.max.as_ref(),
            Attribute::Nominal => self.nominal.as_ref(),
            Attribute::Fixed => self.fixed.as_ref(),
        }
    }
}

/// A whole model document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ModelDocument {
    pub states: Vec<VariableDecl>,
    pub der_states: Vec<VariableDecl>,
    pub alg_states: Vec<VariableDecl>,
    pub inputs: Vec<VariableDecl>,
    pub outputs: Vec<VariableDecl>,
    pub constants: Vec<VariableDecl>,
    pub parameters: Vec<VariableDecl>,
    pub equations: Vec<ExprNode>,
    pub initial_equations: Vec<ExprNode>,
    /// Compiler options by name.
    pub options: FxHashMap<String, bool>,
}

impl ModelDocument {
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    fn partition(&self, partition: Partition) -> &[VariableDecl] {
        match partition {
            Partition::State => &self.states,
            Partition::DerState => &self.der_states,
            Partition::AlgState => &self.alg_states,
            Partition::Input => &self.inputs,
            Partition::Output => &self.outputs,
            Partition::Constant => &self.constants,
            Partition::Parameter => &self.parameters,
            Partition::Eliminated => &[],
        }
    }

    /// Options written in the document.
    pub fn compiler_options(&self) -> Result<CompilerOptions, LoadError> {
        let mut flags: Vec<(&str, bool)> = self
            .options
            .iter()
            .map(|(name, &enabled)| (name.as_str(), enabled))
            .collect();
        flags.sort_unstable();
        Ok(CompilerOptions::from_flags(flags)?)
    }

    /// Build the in-memory model.
    pub fn to_model(&self) -> Result<Model, LoadError> {
        let mut model = Model::new();

        for partition in Partition::ORDERED {
            for decl in self.partition(partition) {
                match decl.shape {
                    Some(len) => model.add_vector(decl.name.clone(), partition, len)?,
                    None => model.add_variable(decl.name.clone(), partition)?,
                };
            }
        }

        for partition in Partition::ORDERED {
            for decl in self.partition(partition) {
                let id = lookup(&model, &decl.name)?;
                if let Some(state) = &decl.derivative_of {
                    let state = lookup(&model, state)?;
                    model.variable_mut(id).derivative_of = Some(state);
                }
                for attribute in Attribute::ALL {
                    if let Some(node) = decl.attribute(attribute) {
                        let expr = build(&mut model, node)?;
                        model.variable_mut(id).attributes.set(attribute, Some(expr));
                    }
                }
            }
        }

        for node in &self.equations {
            let expr = build(&mut model, node)?;
            model.add_equation(expr);
        }
        for node in &self.initial_equations {
            let expr = build(&mut model, node)?;
            model.add_initial_equation(expr);
        }
        Ok(model)
    }
}

fn lookup(model: &Model, name: &str) -> Result<VarId, LoadError> {
    model
        .lookup(name)
        .ok_or_else(|| LoadError::UnknownVariable(name.to_owned()))
}

/// Resolve a reference: a declared name first, then `name[i]` into a vector.
fn reference(model: &mut Model, name: &str) -> Result<ExprId, LoadError> {
    if name == "time" {
        return Ok(model.arena.time());
    }
    if let Some(id) = model.lookup(name) {
        return Ok(model.var(id));
    }
    let element = name
        .strip_suffix(']')
        .and_then(|rest| rest.rsplit_once('['))
        .and_then(|(base, index)| Some((base, index.parse::<u32>().ok()?)));
    let Some((base, index)) = element else {
        return Err(LoadError::UnknownVariable(name.to_owned()));
    };
    let id = lookup(model, base)?;
    match model.variable(id).shape {
        Some(len) if (1..=len).contains(&index) => Ok(model.arena.elem(id, index - 1)),
        _ => Err(LoadError::ElementOutOfRange {
            name: base.to_owned(),
            index,
        }),
    }
}

fn build(model: &mut Model, node: &ExprNode) -> Result<ExprId, LoadError> {
    match node {
        ExprNode::Num(value) => Ok(model.arena.num(*value)),
        ExprNode::Bool(flag) => Ok(if *flag { ExprId::ONE } else { ExprId::ZERO }),
        ExprNode::Ref(name) => reference(model, name),
        ExprNode::Op { op, args } => {
            let args = args
                .iter()
                .map(|arg| build(model, arg))
                .collect::<Result<Vec<_>, _>>()?;
            apply(model, op, &args)
        }
    }
}

fn apply(model: &mut Model, op: &str, args: &[ExprId]) -> Result<ExprId, LoadError> {
    let arity = |expected: &'static str| LoadError::Arity {
        op: op.to_owned(),
        expected,
        found: args.len(),
    };
    let arena = &mut model.arena;
    match (op, args) {
        ("+", _) => Ok(arena.sum(args.iter().copied())),
        ("*", [first, rest @ ..]) => Ok(rest.iter().fold(*first, |acc, &x| arena.mul(acc, x))),
        ("*", []) => Err(arity("at least 1")),
        ("-", &[operand]) => Ok(arena.neg(operand)),
        ("-", &[left, right]) => Ok(arena.sub(left, right)),
        ("-", _) => Err(arity("1 or 2")),
        ("/", &[left, right]) => Ok(arena.binary(BinaryOp::Div, left, right)),
        ("^", &[left, right]) => Ok(arena.binary(BinaryOp::Pow, left, right)),
        ("/" | "^", _) => Err(arity("2")),
        (name, args) => {
            let func = Func::from_name(name).ok_or_else(|| LoadError::UnknownOperator(name.to_owned()))?;
            match args {
                &[arg] => Ok(arena.call(func, arg)),
                _ => Err(arity("1")),
            }
        }
    }
}

#[cfg(test)]
mod tests;
