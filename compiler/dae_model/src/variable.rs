//! Variables, partitions and metadata attributes.

use std::fmt;
use std::ops::Mul;

use dae_ir::{ExprId, VarId};
use smallvec::SmallVec;

/// The role a variable plays in the DAE.
///
/// A variable is in exactly one partition at a time. [`Partition::Eliminated`]
/// holds algebraic states that alias detection collapsed into another
/// variable; eliminated variables keep their id but appear in no partition
/// list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Partition {
    State,
    DerState,
    AlgState,
    Input,
    Output,
    Constant,
    Parameter,
    Eliminated,
}

impl Partition {
    /// Every live partition, in the order evaluator layouts use.
    pub const ORDERED: [Partition; 7] = [
        Partition::State,
        Partition::DerState,
        Partition::AlgState,
        Partition::Input,
        Partition::Output,
        Partition::Constant,
        Partition::Parameter,
    ];

    /// Position in [`Partition::ORDERED`], `None` for `Eliminated`.
    #[inline]
    pub fn index(self) -> Option<usize> {
        match self {
            Partition::State => Some(0),
            Partition::DerState => Some(1),
            Partition::AlgState => Some(2),
            Partition::Input => Some(3),
            Partition::Output => Some(4),
            Partition::Constant => Some(5),
            Partition::Parameter => Some(6),
            Partition::Eliminated => None,
        }
    }

    /// Variables in these partitions form the model's external contract and
    /// are never eliminated by alias detection.
    #[inline]
    pub fn is_protected(self) -> bool {
        matches!(
            self,
            Partition::State | Partition::DerState | Partition::Input | Partition::Output
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Partition::State => "states",
            Partition::DerState => "der_states",
            Partition::AlgState => "alg_states",
            Partition::Input => "inputs",
            Partition::Output => "outputs",
            Partition::Constant => "constants",
            Partition::Parameter => "parameters",
            Partition::Eliminated => "eliminated",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Relative sign of an alias.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    #[inline]
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Sign::Plus => Sign::Minus,
            Sign::Minus => Sign::Plus,
        }
    }
}

impl Mul for Sign {
    type Output = Sign;

    #[inline]
    fn mul(self, rhs: Sign) -> Sign {
        if self == rhs {
            Sign::Plus
        } else {
            Sign::Minus
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sign::Plus => "+",
            Sign::Minus => "-",
        })
    }
}

/// Metadata attribute kinds, in evaluator column order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    Value,
    Start,
    Min,
    Max,
    Nominal,
    Fixed,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Value,
        Attribute::Start,
        Attribute::Min,
        Attribute::Max,
        Attribute::Nominal,
        Attribute::Fixed,
    ];
}

/// Optional metadata expressions of a variable.
///
/// Expressions may reference constants and parameters. `fixed` evaluates to
/// `1.0` or `0.0`. For vector variables every element shares the attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    pub value: Option<ExprId>,
    pub start: Option<ExprId>,
    pub min: Option<ExprId>,
    pub max: Option<ExprId>,
    pub nominal: Option<ExprId>,
    pub fixed: Option<ExprId>,
}

impl Attributes {
    #[inline]
    pub fn get(&self, attribute: Attribute) -> Option<ExprId> {
        match attribute {
            Attribute::Value => self.value,
            Attribute::Start => self.start,
            Attribute::Min => self.min,
            Attribute::Max => self.max,
            Attribute::Nominal => self.nominal,
            Attribute::Fixed => self.fixed,
        }
    }

    #[inline]
    pub fn set(&mut self, attribute: Attribute, expr: Option<ExprId>) {
        let field = match attribute {
            Attribute::Value => &mut self.value,
            Attribute::Start => &mut self.start,
            Attribute::Min => &mut self.min,
            Attribute::Max => &mut self.max,
            Attribute::Nominal => &mut self.nominal,
            Attribute::Fixed => &mut self.fixed,
        };
        *field = expr;
    }

    /// Mutable references to every set attribute, for rewriting passes.
    pub fn exprs_mut(&mut self) -> impl Iterator<Item = &mut ExprId> {
        [
            &mut self.value,
            &mut self.start,
            &mut self.min,
            &mut self.max,
            &mut self.nominal,
            &mut self.fixed,
        ]
        .into_iter()
        .flatten()
    }
}

/// A name absorbed into a representative by alias detection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasName {
    pub name: String,
    /// `eliminated = sign * representative`.
    pub sign: Sign,
}

/// A declared variable.
#[derive(Clone, Debug)]
pub struct Variable {
    pub name: String,
    pub partition: Partition,
    /// Element count of a vector variable; `None` for scalars.
    pub shape: Option<u32>,
    pub attributes: Attributes,
    /// For derivative states: the state being differentiated.
    pub derivative_of: Option<VarId>,
    /// Names collapsed into this variable.
    pub aliases: SmallVec<[AliasName; 2]>,
}

impl Variable {
    pub fn new(name: impl Into<String>, partition: Partition) -> Self {
        Self {
            name: name.into(),
            partition,
            shape: None,
            attributes: Attributes::default(),
            derivative_of: None,
            aliases: SmallVec::new(),
        }
    }

    /// Number of scalar slots this variable occupies.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.shape.map_or(1, |n| n as usize)
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_none()
    }
}
