//! Refactoring engine.
//!
//! A source file is scanned into lines of literals, the literals are turned
//! into [`model::Substitution`]s the caller edits, and a [`session`] turns the
//! edited model into one [`change::CompositeChange`] over the source file, the
//! resource file and the accessor class.

pub mod accessor;
pub mod cache;
pub mod change;
pub mod edit;
mod error;
pub mod escape;
pub mod file_scanner;
pub mod model;
pub mod parsers;
pub mod properties;
pub mod rewrite;
pub mod scan;
pub mod session;
pub mod store;

pub use error::NlsError;
