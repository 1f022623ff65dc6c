//! Removal of synchronized self-loops that never change the state of the model.
//!
//! An automaton is *inert* on a synchronized action when it can always take that action
//! (from every location, without guard) and doing so changes neither its location nor its variables.
//! Such an automaton has no say in the synchronization, so it is dropped from it
//! together with the edges labelled by the action.

use crate::SyncSummary;
use jani_core::{Automaton, Edge, Expression, Identifier, Model, Value};
use log::{debug, info};

/// Drops inert automata from the synchronizations on the synthesized actions,
/// then drops synchronizations left without participants.
/// Variables are never removed.
pub fn prune_self_loops(model: &mut Model, summary: &SyncSummary) {
    let mut inert: Vec<(usize, &Identifier)> = Vec::new();
    for action in &summary.actions {
        for automaton in model
            .automata
            .iter()
            .filter(|automaton| is_inert(automaton, action))
        {
            if let Some(idx) = model.system.element_index(&automaton.name) {
                debug!("'{}' is inert on '{action}'", automaton.name);
                inert.push((idx, action));
            }
        }
    }

    for &(idx, action) in &inert {
        let name = &model.system.elements[idx].automaton;
        if let Some(automaton) = model
            .automata
            .iter_mut()
            .find(|automaton| automaton.name == *name)
        {
            automaton
                .edges
                .retain(|edge| edge.action.as_ref() != Some(action));
        }
        for sync in &mut model.system.syncs {
            if sync.synchronise[idx].as_ref() == Some(action) {
                sync.synchronise[idx] = None;
            }
        }
    }

    let syncs = model.system.syncs.len();
    model.system.syncs.retain(|sync| !sync.is_empty());
    info!(
        target: "assembler",
        "pruned {} inert participants and {} synchronizations",
        inert.len(),
        syncs - model.system.syncs.len()
    );
}

fn is_inert(automaton: &Automaton, action: &str) -> bool {
    automaton.has_action(action)
        && automaton.edges_with_action(action).all(is_noop_self_loop)
        && automaton.locations.iter().all(|location| {
            automaton.edges_with_action(action).any(|edge| {
                edge.location == location.name && edge.guard_exp().is_none_or(Expression::is_true)
            })
        })
}

fn is_noop_self_loop(edge: &Edge) -> bool {
    edge.destinations.iter().all(|destination| {
        destination.location == edge.location
            && destination
                .probability
                .as_ref()
                .is_none_or(|probability| is_unit_weight(&probability.exp))
            && destination
                .assignments
                .iter()
                .all(|assignment| assignment.is_identity())
    })
}

// Weight 1, either as an integer or as a real.
fn is_unit_weight(exp: &Expression) -> bool {
    match exp.as_literal() {
        Some(Value::Int(1)) => true,
        Some(Value::Real(weight)) => weight.0 == 1.0,
        _ => false,
    }
}
