//! The substitution model edited by callers between scanning and rewriting.

mod hint;
pub mod substitution;

pub use hint::*;
pub use substitution::*;
