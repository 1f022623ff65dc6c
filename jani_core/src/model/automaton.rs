use super::{Expression, Identifier, VariableRegistry};
use serde::{Deserialize, Serialize};

/// All expressions and assignments inside an automaton can only reference its own local
/// variables and the global variables of the enclosing model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Automaton {
    /// the name of the automaton, unique among all automata
    pub name: Identifier,
    /// the local variables of the automaton
    #[serde(default)]
    pub variables: VariableRegistry,
    /// the locations that make up the automaton; at least one
    pub locations: Vec<Location>,
    /// the automaton's initial locations
    pub initial_locations: Vec<Identifier>,
    /// the edges connecting the locations
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// an optional comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Automaton {
    /// An automaton with a single, initial location and nothing else.
    pub fn new(name: impl Into<Identifier>, initial_location: impl Into<Identifier>) -> Self {
        let initial_location = initial_location.into();
        Automaton {
            name: name.into(),
            variables: VariableRegistry::new(),
            locations: vec![Location::new(initial_location.clone())],
            initial_locations: vec![initial_location],
            edges: Vec::new(),
            comment: None,
        }
    }

    /// Iterates over the edges labelled with the given action.
    pub fn edges_with_action<'a>(&'a self, action: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .iter()
            .filter(move |edge| edge.action.as_deref() == Some(action))
    }

    /// Whether some edge is labelled with the given action.
    pub fn has_action(&self, action: &str) -> bool {
        self.edges_with_action(action).next().is_some()
    }
}

/// A location of an automaton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Location {
    /// the name of the location, unique among all locations of this automaton
    pub name: Identifier,
    /// an optional comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Location {
    /// A location with the given name.
    pub fn new(name: impl Into<Identifier>) -> Self {
        Location {
            name: name.into(),
            comment: None,
        }
    }
}

/// An edge of an automaton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Edge {
    /// the edge's source location
    pub location: Identifier,
    /// the edge's action label; if omitted, the label is the silent action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Identifier>,
    /// the edge's guard; if omitted, it is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<Guard>,
    /// the destinations of the edge, at least one
    pub destinations: Vec<Destination>,
    /// an optional comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Edge {
    /// The guard expression, if any.
    pub fn guard_exp(&self) -> Option<&Expression> {
        self.guard.as_ref().map(|guard| &guard.exp)
    }
}

/// The guard of an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Guard {
    /// the guard expression, type bool
    pub exp: Expression,
    /// an optional comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl From<Expression> for Guard {
    fn from(exp: Expression) -> Self {
        Guard { exp, comment: None }
    }
}

/// A destination of an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Destination {
    /// the destination's target location
    pub location: Identifier,
    /// the destination's probability (or weight); if omitted, it is 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<Probability>,
    /// the set of assignments to execute atomically
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignments: Vec<Assignment>,
    /// an optional comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Destination {
    /// A destination with weight 1 and no assignments.
    pub fn new(location: impl Into<Identifier>) -> Self {
        Destination {
            location: location.into(),
            probability: None,
            assignments: Vec::new(),
            comment: None,
        }
    }
}

/// The probability (or weight) of a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Probability {
    /// the probability expression, type real; note that this may evaluate to zero
    pub exp: Expression,
    /// an optional comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl From<Expression> for Probability {
    fn from(exp: Expression) -> Self {
        Probability { exp, comment: None }
    }
}

/// An assignment executed when reaching a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Assignment {
    /// what to assign to: a variable name or an array access
    #[serde(rename = "ref")]
    pub target: Expression,
    /// the new value to assign to the variable; must be of the variable's type
    pub value: Expression,
    /// an optional comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Assignment {
    /// Assignment of `value` to `target`.
    pub fn new(target: Expression, value: Expression) -> Self {
        Assignment {
            target,
            value,
            comment: None,
        }
    }

    /// Whether the assignment leaves the target unchanged, i.e., it is `x := x`.
    pub fn is_identity(&self) -> bool {
        self.target == self.value
    }
}
