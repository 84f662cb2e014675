//! nlsctl - string externalization for JavaScript and TypeScript
//!
//! nlsctl moves string literals of a source file into a `.properties`
//! resource file and replaces them with references to an accessor class,
//! inlines them again, or tags them as intentionally inline. Every
//! refactoring is previewed as a set of file changes before it is written.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Refactoring engine (scan, model, rewrite, change)
//! - `issues`: Issue type definitions for the `check` command
//! - `status`: Validation results of a refactoring session
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod status;
pub mod utils;
