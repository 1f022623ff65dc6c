//! Statecharts already translated into JANI automata, stored as JSON files.
//!
//! A file holds an object with the statechart's `name`, whether it is `plain` (default `true`)
//! and the translated `automaton` in the JANI schema.
//! Arrays are given no capacity in the JANI schema, so the translator attaches one to them.
//! Their initial length is read from an `av` initial value,
//! unless the automaton declares the length variables itself.

use crate::{
    EventRegistry, SourceLocator, StatechartHandle, TranslationError, Translator, received_event,
    sent_event,
};
use anyhow::Context;
use jani_core::{ArrayInfo, Automaton, ExprKind, length_var_name};
use log::{debug, info};
use serde::Deserialize;
use std::{fs::File, path::Path};

#[derive(Deserialize)]
struct StatechartFile {
    name: String,
    #[serde(default = "plain_by_default")]
    plain: bool,
    automaton: Automaton,
}

fn plain_by_default() -> bool {
    true
}

/// A translated statechart loaded from JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonStatechart {
    name: String,
    plain: bool,
    locator: SourceLocator,
    automaton: Automaton,
}

impl JsonStatechart {
    /// Loads a statechart from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        info!(target: "parser", "parsing statechart file '{}'", path.display());
        let reader = File::open(path)
            .with_context(|| format!("failed to create reader from file '{}'", path.display()))?;
        let file: StatechartFile = serde_json::from_reader(reader)
            .with_context(|| format!("failed to parse statechart in '{}'", path.display()))?;
        Ok(Self::from_file(
            file,
            SourceLocator::new(path.display().to_string()),
        ))
    }

    /// Parses a statechart from a JSON string, coming from `locator`.
    pub fn parse(json: &str, locator: SourceLocator) -> serde_json::Result<Self> {
        serde_json::from_str(json).map(|file| Self::from_file(file, locator))
    }

    fn from_file(file: StatechartFile, locator: SourceLocator) -> Self {
        JsonStatechart {
            name: file.name,
            plain: file.plain,
            locator,
            automaton: file.automaton,
        }
    }
}

impl StatechartHandle for JsonStatechart {
    fn is_plain(&self) -> bool {
        self.plain
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn source_locator(&self) -> &SourceLocator {
        &self.locator
    }
}

/// Translator of [`JsonStatechart`]s, whose automata are already translated.
///
/// Events are recognized from the edges' action labels:
/// `e_on_send` sends event `e` and `e_on_receive` receives it.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTranslator;

impl Translator for JsonTranslator {
    type Handle = JsonStatechart;

    fn translate(
        &self,
        handle: &JsonStatechart,
        events: &mut EventRegistry,
        max_array_size: usize,
    ) -> Result<Automaton, TranslationError> {
        let error = |message: String| TranslationError::new(handle.locator.clone(), message);
        let mut automaton = handle.automaton.clone();
        if automaton.name != handle.name {
            return Err(error(format!(
                "automaton is named '{}' instead of '{}'",
                automaton.name, handle.name
            )));
        }
        for location in automaton.edges.iter().flat_map(|edge| {
            std::iter::once(&edge.location)
                .chain(edge.destinations.iter().map(|dest| &dest.location))
        }) {
            if !automaton.locations.iter().any(|l| l.name == *location) {
                return Err(error(format!("unknown location '{location}'")));
            }
        }

        let arrays = automaton
            .variables
            .iter()
            .filter(|var| var.is_array() && var.array_info.is_none())
            .map(|var| {
                let literal = matches!(
                    var.initial_value.as_ref().map(|exp| exp.kind()),
                    Some(ExprKind::ArrayValue(_))
                );
                (var.name.clone(), var.r#type.dimensions(), literal)
            })
            .collect::<Vec<_>>();
        for (name, dimensions, literal) in arrays {
            let declared_lengths = (1..=dimensions)
                .all(|d| automaton.variables.contains(&length_var_name(&name, d)));
            if !literal && !declared_lengths {
                return Err(error(format!(
                    "array '{name}' is neither initialized with an array value nor declares its length variables"
                )));
            }
            debug!("array '{name}' has capacity {max_array_size} over {dimensions} dimensions");
            let info = ArrayInfo {
                capacities: vec![max_array_size; dimensions],
            };
            automaton
                .variables
                .set_array_info(&name, info)
                .map_err(|err| error(err.to_string()))?;
        }

        for action in automaton.edges.iter().filter_map(|edge| edge.action.as_deref()) {
            if let Some(event) = sent_event(action) {
                events.add_sender(event, &automaton.name);
            } else if let Some(event) = received_event(action) {
                events.add_receiver(event, &automaton.name);
            }
        }
        Ok(automaton)
    }
}
