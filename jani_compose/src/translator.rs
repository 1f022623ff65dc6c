use crate::EventRegistry;
use jani_core::Automaton;
use std::fmt;
use thiserror::Error;

/// Where a statechart comes from, e.g. its file path.
/// Only used to report errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocator(String);

impl SourceLocator {
    /// A locator with the given description.
    pub fn new(locator: impl Into<String>) -> Self {
        SourceLocator(locator.into())
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A statechart ready to be translated into an automaton.
pub trait StatechartHandle {
    /// Whether the statechart only uses plain constructs,
    /// i.e., higher-level constructs have already been resolved.
    fn is_plain(&self) -> bool;

    /// The statechart's name, which becomes the automaton's name.
    fn name(&self) -> &str;

    /// Where the statechart comes from.
    fn source_locator(&self) -> &SourceLocator;
}

/// Error reported by a [`Translator`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{locator}: {message}")]
pub struct TranslationError {
    /// where the error was found
    pub locator: SourceLocator,
    /// what went wrong
    pub message: String,
}

impl TranslationError {
    /// A translation error found at `locator`.
    pub fn new(locator: SourceLocator, message: impl Into<String>) -> Self {
        TranslationError {
            locator,
            message: message.into(),
        }
    }
}

/// Translates statecharts into automata.
pub trait Translator {
    /// The statecharts this translator works on.
    type Handle: StatechartHandle;

    /// Translates a statechart into an automaton,
    /// recording in `events` the events the automaton sends and receives.
    ///
    /// Arrays of the automaton can hold at most `max_array_size` elements per dimension.
    fn translate(
        &self,
        handle: &Self::Handle,
        events: &mut EventRegistry,
        max_array_size: usize,
    ) -> Result<Automaton, TranslationError>;
}
