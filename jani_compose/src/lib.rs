//! Assembly of JANI models out of statecharts.
//!
//! Each statechart is translated into an automaton by a [`Translator`],
//! which records the events the automaton exchanges in a shared [`EventRegistry`].
//! The [`Assembler`] then collects the automata into a single [`jani_core::Model`],
//! synthesizes the synchronizations implementing the events,
//! prunes the ones that have no effect,
//! and expands random choices into probabilistic destinations.
//!
//! [`Assembler::convert`] also adds properties to the model and normalizes its expressions,
//! producing a model in standard JANI.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod assembler;
mod events;
mod json;
mod prune;
mod random;
mod sync;
mod translator;

pub use assembler::{Assembler, ComposeError, ConfigurationError, convert};
pub use events::{
    EventEntry, EventRegistry, receive_action, received_event, send_action, sent_event,
};
pub use json::{JsonStatechart, JsonTranslator};
pub use prune::prune_self_loops;
pub use random::{ExpansionError, RANDOM_EXPANSION_CAP, expand_random_choices};
pub use sync::{SyncSummary, synthesize_syncs};
pub use translator::{SourceLocator, StatechartHandle, TranslationError, Translator};
