//! Lexical scanning: string literals grouped per line, with their tags.

mod scanner;
pub mod tags;
pub mod tokens;

pub use scanner::*;
pub use tags::{DEFAULT_TAG_POSTFIX, DEFAULT_TAG_PREFIX, TagFormat, TagMarker};
pub use tokens::{AccessorCall, ImportBinding};
