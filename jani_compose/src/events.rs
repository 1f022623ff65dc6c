use jani_core::Identifier;
use log::trace;
use std::collections::{BTreeMap, BTreeSet};

const SEND_SUFFIX: &str = "_on_send";
const RECEIVE_SUFFIX: &str = "_on_receive";

/// Label of the edges sending the given event.
pub fn send_action(event: &str) -> Identifier {
    format!("{event}{SEND_SUFFIX}")
}

/// Label of the edges receiving the given event.
pub fn receive_action(event: &str) -> Identifier {
    format!("{event}{RECEIVE_SUFFIX}")
}

/// The event sent by edges with the given label, if it is a send label.
pub fn sent_event(action: &str) -> Option<&str> {
    action.strip_suffix(SEND_SUFFIX)
}

/// The event received by edges with the given label, if it is a receive label.
pub fn received_event(action: &str) -> Option<&str> {
    action.strip_suffix(RECEIVE_SUFFIX)
}

/// The automata sending and receiving an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventEntry {
    /// automata sending the event
    pub senders: BTreeSet<Identifier>,
    /// automata receiving the event
    pub receivers: BTreeSet<Identifier>,
}

/// Table of the events exchanged by the automata of a model.
///
/// It is filled while translating the statecharts one at a time,
/// and consumed when synthesizing the synchronizations.
/// Entries are only ever added, and are kept sorted,
/// so the outcome does not depend on the order of translation.
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    events: BTreeMap<Identifier, EventEntry>,
}

impl EventRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `automaton` sends `event`.
    pub fn add_sender(&mut self, event: &str, automaton: &str) {
        trace!("'{automaton}' sends event '{event}'");
        self.events
            .entry(event.to_owned())
            .or_default()
            .senders
            .insert(automaton.to_owned());
    }

    /// Records that `automaton` receives `event`.
    pub fn add_receiver(&mut self, event: &str, automaton: &str) {
        trace!("'{automaton}' receives event '{event}'");
        self.events
            .entry(event.to_owned())
            .or_default()
            .receivers
            .insert(automaton.to_owned());
    }

    /// Gets the entry of an event.
    pub fn get(&self, event: &str) -> Option<&EventEntry> {
        self.events.get(event)
    }

    /// Iterates over the events, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &EventEntry)> {
        self.events.iter()
    }

    /// Number of known events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event is known.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl IntoIterator for EventRegistry {
    type Item = (Identifier, EventEntry);
    type IntoIter = std::collections::btree_map::IntoIter<Identifier, EventEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_labels() {
        assert_eq!(send_action("tick"), "tick_on_send");
        assert_eq!(receive_action("tick"), "tick_on_receive");
        assert_eq!(sent_event("tick_on_send"), Some("tick"));
        assert_eq!(received_event("tick_on_receive"), Some("tick"));
        assert_eq!(sent_event("tick_on_receive"), None);
        assert_eq!(received_event("step"), None);
    }

    #[test]
    fn registration_order_is_irrelevant() {
        let mut first = EventRegistry::new();
        first.add_sender("b", "X");
        first.add_receiver("a", "Y");
        first.add_sender("a", "Z");
        first.add_sender("a", "X");
        let mut second = EventRegistry::new();
        second.add_sender("a", "X");
        second.add_sender("a", "Z");
        second.add_receiver("a", "Y");
        second.add_sender("b", "X");
        second.add_sender("b", "X");
        assert_eq!(
            first.clone().into_iter().collect::<Vec<_>>(),
            second.into_iter().collect::<Vec<_>>()
        );
        assert_eq!(first.len(), 2);
        let a = first.get("a").unwrap();
        assert_eq!(Vec::from_iter(a.senders.iter().map(String::as_str)), ["X", "Z"]);
        assert_eq!(Vec::from_iter(a.receivers.iter().map(String::as_str)), ["Y"]);
    }
}
