use log::debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

mod automaton;
mod composition;
mod expression;
mod jani_type;
mod property;
mod variable;

pub use automaton::*;
pub use composition::*;
pub use expression::*;
pub use jani_type::*;
pub use property::*;
pub use variable::*;

/// Names of constants, variables, automata, locations and actions.
pub type Identifier = String;

/// Errors raised while building a [`Model`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// An automaton with the same name is already part of the model.
    #[error("automaton '{0}' is already part of the model")]
    DuplicateAutomaton(Identifier),
}

/// A JANI model: a network of automata sharing global variables,
/// together with the properties to check on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Model {
    /// the jani-model version of this model
    pub jani_version: u8,
    /// the name of the model (e.g. the name of the underlying model file)
    pub name: String,
    /// the model's type
    #[serde(rename = "type")]
    pub model_type: ModelType,
    /// extended jani-model features defined elsewhere that are used by this model
    #[serde(default)]
    pub features: Vec<ModelFeature>,
    /// the model's actions
    #[serde(default)]
    pub actions: Vec<Action>,
    /// the model's global variables
    #[serde(default)]
    pub variables: VariableRegistry,
    /// the model's automata, with unique names
    pub automata: Vec<Automaton>,
    /// the model's automata network composition expression
    pub system: Composition,
    /// the properties to check
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Model {
    /// Version of the JANI format the model adheres to.
    pub const JANI_VERSION: u8 = 1;

    /// An empty MDP model.
    pub fn new(name: impl Into<String>) -> Self {
        Model {
            jani_version: Self::JANI_VERSION,
            name: name.into(),
            model_type: ModelType::Mdp,
            features: Vec::new(),
            actions: Vec::new(),
            variables: VariableRegistry::new(),
            automata: Vec::new(),
            system: Composition::default(),
            properties: Vec::new(),
        }
    }

    /// Adds a feature, unless already present.
    pub fn add_feature(&mut self, feature: ModelFeature) {
        if !self.features.contains(&feature) {
            self.features.push(feature);
        }
    }

    /// Adds an action, unless already present.
    pub fn add_action(&mut self, name: &str) {
        if !self.actions.iter().any(|action| action.name == name) {
            self.actions.push(Action {
                name: name.to_owned(),
                comment: None,
            });
        }
    }

    /// Adds an automaton to the model.
    ///
    /// Fails if an automaton with the same name is already part of the model.
    pub fn add_automaton(&mut self, automaton: Automaton) -> Result<(), ModelError> {
        if self.automaton(&automaton.name).is_some() {
            return Err(ModelError::DuplicateAutomaton(automaton.name));
        }
        debug!("add automaton '{}' to model '{}'", automaton.name, self.name);
        self.automata.push(automaton);
        Ok(())
    }

    /// Gets the automaton with the given name.
    pub fn automaton(&self, name: &str) -> Option<&Automaton> {
        self.automata.iter().find(|automaton| automaton.name == name)
    }

    /// Gets the automaton with the given name, mutably.
    pub fn automaton_mut(&mut self, name: &str) -> Option<&mut Automaton> {
        self.automata
            .iter_mut()
            .find(|automaton| automaton.name == name)
    }
}

/// An action label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// the action's name, unique among all actions
    pub name: Identifier,
    /// an optional comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Extended jani-model features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelFeature {
    /// support for array types, defined in the Extensions section
    Arrays,
    /// support for complex datatypes, defined in the Extensions section
    Datatypes,
    /// support for some derived operators in expressions, defined in the Extensions section
    DerivedOperators,
    /// support for priorities on edges, defined in the Extensions section
    EdgePriorities,
    /// support for functions, defined in the Extensions section
    Functions,
    /// support for hyperbolic functions, defined in the Extensions section
    HyperbolicFunctions,
    /// support for named subexpressions, defined in the Extensions section
    NamedExpressions,
    /// support for nondeterministic selection in expressions, defined in the Extensions section
    NondetSelection,
    /// support for accumulating rewards when leaving a state, defined in the Extensions section
    StateExitRewards,
    /// support for multi-objective tradeoff properties, defined in the Extensions section
    TradeoffProperties,
    /// support for trigonometric functions, defined in the Extensions section
    TrigonometricFunctions,
}

/// Types of models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelType {
    /// LTS: a labelled transition system (or Kripke structure or finite state automaton) (untimed)
    Lts,
    /// DTMC: a discrete-time Markov chain (untimed)
    Dtmc,
    /// CTMC: a continuous-time Markov chain (timed)
    Ctmc,
    /// MDP: a discrete-time Markov decision process (untimed)
    Mdp,
    /// CTMDP: a continuous-time Markov decision process (timed)
    Ctmdp,
    /// MA: a Markov automaton (timed)
    Ma,
    /// TA: a timed automaton (timed)
    Ta,
    /// PTA: a probabilistic timed automaton (timed)
    Pta,
    /// STA: a stochastic timed automaton (timed)
    Sta,
    /// HA: a hybrid automaton (timed)
    Ha,
    /// PHA: a probabilistic hybrid automaton (timed)
    Pha,
    /// SHA: a stochastic hybrid automaton (timed)
    Sha,
}

impl FromStr for ModelType {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duplicate_automata() {
        let mut model = Model::new("m");
        model.add_automaton(Automaton::new("A", "idle")).unwrap();
        assert_eq!(
            model.add_automaton(Automaton::new("A", "other")),
            Err(ModelError::DuplicateAutomaton("A".to_owned()))
        );
        assert_eq!(model.automata.len(), 1);
    }

    #[test]
    fn features_and_actions_are_sets() {
        let mut model = Model::new("m");
        model.add_feature(ModelFeature::Arrays);
        model.add_feature(ModelFeature::TrigonometricFunctions);
        model.add_feature(ModelFeature::Arrays);
        assert_eq!(
            model.features,
            [ModelFeature::Arrays, ModelFeature::TrigonometricFunctions]
        );
        model.add_action("ev_on_send");
        model.add_action("ev_on_send");
        assert_eq!(model.actions.len(), 1);
    }

    #[test]
    fn model_type_from_str() {
        assert_eq!("dtmc".parse::<ModelType>().unwrap(), ModelType::Dtmc);
        assert_eq!("MDP".parse::<ModelType>().unwrap(), ModelType::Mdp);
        assert!("markov".parse::<ModelType>().is_err());
    }

    #[test]
    fn jani_shape() {
        let mut model = Model::new("shape");
        model.add_feature(ModelFeature::Arrays);
        let mut automaton = Automaton::new("A", "idle");
        automaton
            .variables
            .declare(Variable::new("x", BasicType::Int.into(), Some(Expression::literal(0))))
            .unwrap();
        automaton.edges.push(Edge {
            location: "idle".to_owned(),
            action: Some("tick".to_owned()),
            guard: Some(Expression::literal(true).into()),
            destinations: vec![Destination {
                location: "idle".to_owned(),
                probability: None,
                assignments: vec![Assignment::new(
                    Expression::identifier("x"),
                    Expression::literal(1),
                )],
                comment: None,
            }],
            comment: None,
        });
        model.add_automaton(automaton).unwrap();
        model.system.elements.push(Element {
            automaton: "A".to_owned(),
            input_enable: Vec::new(),
        });
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(
            json,
            json!({
                "jani-version": 1,
                "name": "shape",
                "type": "mdp",
                "features": ["arrays"],
                "actions": [],
                "variables": [],
                "automata": [{
                    "name": "A",
                    "variables": [{"name": "x", "type": "int", "initial-value": 0}],
                    "locations": [{"name": "idle"}],
                    "initial-locations": ["idle"],
                    "edges": [{
                        "location": "idle",
                        "action": "tick",
                        "guard": {"exp": true},
                        "destinations": [{
                            "location": "idle",
                            "assignments": [{"ref": "x", "value": 1}]
                        }]
                    }]
                }],
                "system": {"elements": [{"automaton": "A"}]},
                "properties": []
            })
        );
        let parsed: Model = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, model);
    }
}
