//! Data model of JANI automata networks, as produced by the translation of statecharts,
//! and normalization of their expressions into the operator set natively supported by JANI.
//!
//! The model is built around [`Expression`], a closed tree of literals, identifiers,
//! operators and array values.
//! Automata, variables and properties are (de)serializable into the JANI JSON schema
//! through `serde`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod model;
mod normalize;

pub use model::*;
pub use normalize::{NormalizationError, normalize, normalize_expression};
