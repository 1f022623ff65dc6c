//! Synthesis of the synchronizations implementing the events exchanged by automata.
//!
//! An event `e` is sent by edges labelled `e_on_send` and received by edges labelled `e_on_receive`.
//! Each sending automaton synchronizes with all the receiving ones,
//! which must always be able to take the event: in locations where a receiver
//! does not handle it, the event is discarded through a self-loop.

use crate::{ConfigurationError, EventRegistry, receive_action, send_action};
use jani_core::{Automaton, Destination, Edge, Element, Expression, Guard, Identifier, Model, Sync};
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// What the synthesis added to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// the synchronized actions (sending and receiving events)
    pub actions: BTreeSet<Identifier>,
}

/// Builds the model's composition and the synchronizations implementing the events in the registry,
/// which is consumed.
///
/// Fails if the registry references automata not in the model.
pub fn synthesize_syncs(
    model: &mut Model,
    events: EventRegistry,
) -> Result<SyncSummary, ConfigurationError> {
    info!(target: "assembler", "synthesizing synchronizations for {} events", events.len());
    model.system.elements = model
        .automata
        .iter()
        .map(|automaton| Element {
            automaton: automaton.name.clone(),
            input_enable: Vec::new(),
        })
        .collect();
    let mut summary = SyncSummary::default();

    for (event, entry) in events {
        let element_index = |automaton: &Identifier| {
            model
                .system
                .element_index(automaton)
                .ok_or_else(|| ConfigurationError::UnknownAutomaton {
                    event: event.clone(),
                    automaton: automaton.clone(),
                })
        };
        let senders = entry
            .senders
            .iter()
            .map(|sender| element_index(sender).map(|idx| (sender, idx)))
            .collect::<Result<Vec<_>, _>>()?;
        let receivers = entry
            .receivers
            .iter()
            .map(|receiver| element_index(receiver).map(|idx| (receiver, idx)))
            .collect::<Result<Vec<_>, _>>()?;
        if senders.is_empty() {
            warn!("event '{event}' is received but never sent");
            continue;
        }
        if receivers.is_empty() {
            warn!("event '{event}' is sent but never received");
        }

        let send = send_action(&event);
        let receive = receive_action(&event);
        model.add_action(&send);
        model.add_action(&event);
        summary.actions.insert(send.clone());
        if !receivers.is_empty() {
            model.add_action(&receive);
            summary.actions.insert(receive.clone());
        }

        for (receiver, _) in &receivers {
            let automaton = model
                .automaton_mut(receiver)
                .expect("elements are built from the model's automata");
            input_enable(automaton, &receive);
        }

        for &(sender, sender_idx) in &senders {
            let mut synchronise = vec![None; model.system.elements.len()];
            synchronise[sender_idx] = Some(send.clone());
            for &(receiver, receiver_idx) in &receivers {
                if receiver == sender {
                    debug!("'{sender}' does not receive its own event '{event}'");
                } else {
                    synchronise[receiver_idx] = Some(receive.clone());
                }
            }
            model.system.syncs.push(Sync {
                synchronise,
                result: Some(event.clone()),
                comment: None,
            });
        }
    }
    Ok(summary)
}

// Adds self-loops discarding the event in every location where the automaton would not take it.
fn input_enable(automaton: &mut Automaton, action: &str) {
    let mut discards = Vec::new();
    for location in &automaton.locations {
        let mut guards = Vec::new();
        let mut always_enabled = false;
        for edge in automaton
            .edges_with_action(action)
            .filter(|edge| edge.location == location.name)
        {
            match edge.guard_exp() {
                Some(guard) if !guard.is_true() => guards.push(guard.clone()),
                _ => always_enabled = true,
            }
        }
        if always_enabled {
            continue;
        }
        let guard = guards
            .into_iter()
            .reduce(Expression::or)
            .map(|handled| Guard::from(Expression::not(handled)));
        discards.push(Edge {
            location: location.name.clone(),
            action: Some(action.to_owned()),
            guard,
            destinations: vec![Destination::new(location.name.clone())],
            comment: None,
        });
    }
    debug!(
        "'{}' discards '{action}' from {} locations",
        automaton.name,
        discards.len()
    );
    automaton.edges.extend(discards);
}
