//! Alias relation: union-find with sign over variable ids.
//!
//! Every variable links to a parent with a relative sign,
//! `var = sign * parent`. Roots link to themselves with [`Sign::Plus`].
//! [`AliasRelation::find`] compresses paths, so after a lookup every
//! variable on the path links straight to its representative with the
//! composed sign.
//!
//! The relation does not know about partitions: callers pick which root
//! survives a union (see [`detect_aliases`] for the tie-break).

mod detect;

use dae_ir::VarId;
use dae_model::Sign;

pub use detect::detect_aliases;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Link {
    parent: VarId,
    sign: Sign,
}

/// Outcome of [`AliasRelation::union`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Union {
    /// Both variables already shared a class with a consistent sign.
    Redundant,
    /// `eliminated = sign * representative`; `eliminated` is no longer a root.
    Merged {
        representative: VarId,
        eliminated: VarId,
        sign: Sign,
    },
}

/// `first = second` and `first = -second` were both requested.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SignConflict {
    pub first: VarId,
    pub second: VarId,
}

/// Equivalence classes of variables up to sign.
#[derive(Clone, Debug, Default)]
pub struct AliasRelation {
    links: Vec<Link>,
}

impl AliasRelation {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure(&mut self, var: VarId) {
        let needed = var.index() + 1;
        if self.links.len() < needed {
            let start = self.links.len();
            self.links.extend((start..needed).map(|i| Link {
                parent: VarId::new(i as u32),
                sign: Sign::Plus,
            }));
        }
    }

    /// Representative of `var` and the sign with `var = sign * representative`.
    ///
    /// Compresses the path from `var` to its root.
    pub fn find(&mut self, var: VarId) -> (VarId, Sign) {
        let Some(link) = self.links.get(var.index()).copied() else {
            return (var, Sign::Plus);
        };
        if link.parent == var {
            return (var, Sign::Plus);
        }
        let (root, parent_sign) = self.find(link.parent);
        let sign = link.sign * parent_sign;
        self.links[var.index()] = Link { parent: root, sign };
        (root, sign)
    }

    /// Like [`find`](Self::find), without compressing.
    pub fn resolve(&self, var: VarId) -> (VarId, Sign) {
        let mut current = var;
        let mut sign = Sign::Plus;
        while let Some(link) = self.links.get(current.index()) {
            if link.parent == current {
                break;
            }
            sign = sign * link.sign;
            current = link.parent;
        }
        (current, sign)
    }

    /// Record `a = sign * b`.
    ///
    /// `keep` receives the two distinct roots and returns the one that
    /// stays representative.
    pub fn union(
        &mut self,
        a: VarId,
        b: VarId,
        sign: Sign,
        keep: impl FnOnce(VarId, VarId) -> VarId,
    ) -> Result<Union, SignConflict> {
        self.ensure(a);
        self.ensure(b);
        let (root_a, sign_a) = self.find(a);
        let (root_b, sign_b) = self.find(b);
        // a = sign_a·root_a, b = sign_b·root_b, a = sign·b
        //   ⇒ root_a = (sign_a·sign·sign_b)·root_b
        let relative = sign_a * sign * sign_b;

        if root_a == root_b {
            return if relative == Sign::Plus {
                Ok(Union::Redundant)
            } else {
                Err(SignConflict {
                    first: a,
                    second: b,
                })
            };
        }

        let representative = keep(root_a, root_b);
        let eliminated = if representative == root_a {
            root_b
        } else {
            root_a
        };
        self.links[eliminated.index()] = Link {
            parent: representative,
            sign: relative,
        };
        Ok(Union::Merged {
            representative,
            eliminated,
            sign: relative,
        })
    }

    /// Returns `true` if `var` stands for itself.
    pub fn is_representative(&self, var: VarId) -> bool {
        !matches!(self.links.get(var.index()), Some(link) if link.parent != var)
    }

    /// Number of aliased (non-representative) variables.
    pub fn len(&self) -> usize {
        (0..self.links.len())
            .filter(|&i| !self.is_representative(VarId::new(i as u32)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
