use super::Identifier;
use serde::{Deserialize, Serialize};

/// Automata composition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Composition {
    /// the automata taking part in the composition
    pub elements: Vec<Element>,
    /// the synchronisation vectors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub syncs: Vec<Sync>,
    /// an optional comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Composition {
    /// Index of the element instantiating the given automaton.
    pub fn element_index(&self, automaton: &str) -> Option<usize> {
        self.elements
            .iter()
            .position(|element| element.automaton == automaton)
    }
}

/// An automaton instance of the composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Element {
    /// the name of an automaton
    pub automaton: Identifier,
    /// a set of action names on which to make the automaton input-enabled
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_enable: Vec<Identifier>,
}

/// A synchronisation vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Sync {
    /// a list of action names or null, same length as elements
    pub synchronise: Vec<Option<Identifier>>,
    /// an action name, the result of the synchronisation; if omitted, it is the silent action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Identifier>,
    /// an optional comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Sync {
    /// Whether no element takes part in the synchronisation.
    pub fn is_empty(&self) -> bool {
        self.synchronise.iter().all(Option::is_none)
    }
}
