//! Edits derived from the substitution model.

pub mod properties;
pub mod source;

pub use properties::{PropertiesUpdate, properties_update};
pub use source::{KEY_PLACEHOLDER, SourceRewriteOptions, import_edit, source_edits, split_pattern};
