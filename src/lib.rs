//! scxml2jani assembles statecharts, already translated into JANI automata,
//! into a single JANI model written in standard JANI.
//!
//! The heavy lifting happens in two library crates:
//!
//! - `jani_core`: the JANI data model and the normalization of expressions;
//! - `jani_compose`: the assembly of automata into a model.

mod cli;

pub use cli::Cli;
pub use jani_compose;
pub use jani_core;
