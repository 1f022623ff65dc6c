use crate::{
    EventRegistry, ExpansionError, RANDOM_EXPANSION_CAP, SourceLocator, StatechartHandle,
    TranslationError, Translator, expand_random_choices, prune_self_loops, synthesize_syncs,
};
use jani_core::{
    Model, ModelError, ModelFeature, ModelType, NormalizationError, Property, normalize,
};
use log::{error, info};
use thiserror::Error;

/// Errors due to inputs that cannot be assembled into a model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The statechart still uses higher-level constructs.
    #[error("statechart '{name}' is not plain: higher-level constructs have to be resolved first")]
    NotPlain {
        /// the statechart's name
        name: String,
    },
    /// Two statecharts translate to automata with the same name.
    #[error("automaton '{name}' is defined more than once")]
    DuplicateAutomaton {
        /// the automaton's name
        name: String,
    },
    /// An event is exchanged by an automaton that is not part of the model.
    #[error("event '{event}' references unknown automaton '{automaton}'")]
    UnknownAutomaton {
        /// the event
        event: String,
        /// the automaton's name
        automaton: String,
    },
}

impl From<ModelError> for ConfigurationError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::DuplicateAutomaton(name) => ConfigurationError::DuplicateAutomaton { name },
        }
    }
}

/// Errors raised while building a model out of statecharts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// The inputs cannot be assembled.
    #[error("configuration error")]
    Configuration(#[from] ConfigurationError),
    /// A statechart could not be translated.
    #[error("failed to translate model '{model}' from {locator}")]
    Translation {
        /// the statechart's name
        model: String,
        /// where the statechart comes from
        locator: SourceLocator,
        /// the translator's error
        #[source]
        source: TranslationError,
    },
    /// Randomized assignments could not be expanded.
    #[error("failed to expand randomized assignments")]
    Expansion(#[from] ExpansionError),
    /// The assembled model could not be normalized.
    #[error("failed to normalize model")]
    Normalization(#[from] NormalizationError),
}

/// Builds a JANI model out of a set of statecharts, using a [`Translator`] to turn each of them into an automaton.
///
/// Events exchanged by the statecharts become synchronizations between their automata.
/// The assembler holds no state between calls.
#[derive(Debug, Clone)]
pub struct Assembler<T: Translator> {
    translator: T,
    model_name: String,
    model_type: ModelType,
}

impl<T: Translator> Assembler<T> {
    /// Default name of assembled models.
    pub const DEFAULT_MODEL_NAME: &'static str = "model";

    /// Creates an assembler using the given translator.
    pub fn new(translator: T) -> Self {
        Assembler {
            translator,
            model_name: Self::DEFAULT_MODEL_NAME.to_owned(),
            model_type: ModelType::Mdp,
        }
    }

    /// Sets the name of assembled models.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Sets the type of assembled models.
    pub fn with_model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }

    /// Translates every input and assembles the resulting automata into a single model.
    ///
    /// Arrays can hold at most `max_array_size` elements per dimension.
    /// Every action labelling an edge is declared in the model.
    /// Expressions are not normalized: see [`Self::convert`].
    pub fn assemble(
        &self,
        inputs: &[T::Handle],
        max_array_size: usize,
    ) -> Result<Model, ComposeError> {
        info!(target: "assembler", "assembling {} statecharts into model '{}'", inputs.len(), self.model_name);
        let mut model = Model::new(self.model_name.clone());
        model.model_type = self.model_type;
        model.add_feature(ModelFeature::Arrays);
        model.add_feature(ModelFeature::TrigonometricFunctions);
        let mut events = EventRegistry::new();

        for input in inputs {
            if !input.is_plain() {
                return Err(ConfigurationError::NotPlain {
                    name: input.name().to_owned(),
                }
                .into());
            }
            let automaton = self
                .translator
                .translate(input, &mut events, max_array_size)
                .map_err(|err| {
                    error!(
                        "failed to translate model '{}' from {}: {err}",
                        input.name(),
                        input.source_locator()
                    );
                    ComposeError::Translation {
                        model: input.name().to_owned(),
                        locator: input.source_locator().clone(),
                        source: err,
                    }
                })?;
            info!(target: "assembler", "translated '{}' into automaton '{}'", input.name(), automaton.name);
            for action in automaton.edges.iter().filter_map(|edge| edge.action.as_deref()) {
                model.add_action(action);
            }
            model
                .add_automaton(automaton)
                .map_err(ConfigurationError::from)?;
        }

        let summary = synthesize_syncs(&mut model, events)?;
        prune_self_loops(&mut model, &summary);
        expand_random_choices(&mut model, RANDOM_EXPANSION_CAP)?;
        Ok(model)
    }

    /// Assembles the inputs into a model, adds the given properties, and normalizes the model's expressions.
    pub fn convert(
        &self,
        inputs: &[T::Handle],
        max_array_size: usize,
        properties: impl IntoIterator<Item = Property>,
    ) -> Result<Model, ComposeError> {
        let mut model = self.assemble(inputs, max_array_size)?;
        model.properties.extend(properties);
        normalize(&mut model)?;
        info!(
            target: "assembler",
            "model '{}' has {} automata, {} synchronizations and {} properties",
            model.name,
            model.automata.len(),
            model.system.syncs.len(),
            model.properties.len()
        );
        Ok(model)
    }
}

/// Assembles the inputs with the given translator, adds the properties and normalizes the resulting model.
///
/// Shorthand for [`Assembler::convert`] with a default assembler.
pub fn convert<T: Translator>(
    translator: T,
    inputs: &[T::Handle],
    max_array_size: usize,
    properties: impl IntoIterator<Item = Property>,
) -> Result<Model, ComposeError> {
    Assembler::new(translator).convert(inputs, max_array_size, properties)
}
