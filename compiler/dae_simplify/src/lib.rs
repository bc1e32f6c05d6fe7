//! Simplification passes for DAE models.
//!
//! Passes run in a fixed order over one `&mut Model`:
//!
//! 1. **Vector expansion** ([`expand_vectors`]): vector variables become
//!    scalar element variables in place.
//! 2. **Folding** ([`fold_constants`]): constants and parameters with known
//!    values are substituted and removed.
//! 3. **Alias detection** ([`detect_aliases`]): `a = ±b` equations collapse
//!    their two variables into one representative ([`AliasRelation`]).
//! 4. **Affine reduction** ([`reduce_affine`]): equations affine in the
//!    algebraic unknowns fold into one `A·x + b = 0` block.
//!
//! Steps 3 and 4 iterate: affine classification can expose aliases the
//! structural matcher misses (`x - 2y + y`), which feed the next round of
//! alias detection. [`simplify`] drives the whole sequence.

mod affine;
mod alias;
mod error;
mod expand;
mod fold;
mod pipeline;

pub use affine::{expand_affine_blocks, expose_row_aliases, reduce_affine};
pub use alias::{detect_aliases, AliasRelation, SignConflict, Union};
pub use error::{Result, SimplifyError};
pub use expand::expand_vectors;
pub use fold::fold_constants;
pub use pipeline::{simplify, Report};
