//! Expansion of randomized assignments into probabilistic destinations.
//!
//! JANI models only admit sampling from distributions in assignment values.
//! Since model checkers handle discrete probabilistic choice much better,
//! each destination assigning sampled values is replaced by one destination per outcome,
//! with the destination's weight split evenly among them.

use jani_core::{Automaton, Destination, ExprKind, Expression, Op, Probability, Value};
use log::{debug, info};
use thiserror::Error;

/// Maximum number of outcomes a single distribution is expanded into.
pub const RANDOM_EXPANSION_CAP: usize = 100;

/// Errors raised while expanding randomized assignments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExpansionError {
    /// The distribution cannot be expanded.
    #[error("unsupported distribution '{0}'")]
    UnsupportedDistribution(String),
    /// The distribution's arguments are not literal bounds `lo ≤ hi`.
    #[error("distribution '{0}' needs two literal bounds, the first not greater than the second")]
    BadArguments(String),
    /// Sampling appears somewhere else than as the whole value of an assignment.
    #[error("sampling from a distribution is only supported as the value of an assignment")]
    NestedSampling,
    /// The destination's outcomes are too many to be counted.
    #[error("destination has too many combined outcomes")]
    TooManyOutcomes,
    /// Error found in an automaton.
    #[error("in automaton '{automaton}'")]
    InAutomaton {
        /// the automaton's name
        automaton: String,
        /// the error
        #[source]
        source: Box<ExpansionError>,
    },
}

/// Expands every sampling assignment in the model's automata,
/// with distributions producing at most `cap` outcomes.
pub fn expand_random_choices(
    model: &mut jani_core::Model,
    cap: usize,
) -> Result<(), ExpansionError> {
    let mut expanded = 0;
    for automaton in &mut model.automata {
        expanded += expand_automaton(automaton, cap).map_err(|err| {
            ExpansionError::InAutomaton {
                automaton: automaton.name.clone(),
                source: Box::new(err),
            }
        })?;
    }
    info!(target: "assembler", "expanded {expanded} randomized destinations");
    Ok(())
}

fn expand_automaton(automaton: &mut Automaton, cap: usize) -> Result<usize, ExpansionError> {
    let mut expanded = 0;
    for edge in &mut automaton.edges {
        if edge.guard_exp().is_some_and(samples) {
            return Err(ExpansionError::NestedSampling);
        }
        let mut destinations = Vec::with_capacity(edge.destinations.len());
        for destination in std::mem::take(&mut edge.destinations) {
            let outcomes = expand_destination(destination, cap)?;
            if outcomes.len() > 1 {
                expanded += 1;
            }
            destinations.extend(outcomes);
        }
        edge.destinations = destinations;
    }
    if expanded > 0 {
        debug!("'{}': expanded {expanded} destinations", automaton.name);
    }
    Ok(expanded)
}

fn expand_destination(
    destination: Destination,
    cap: usize,
) -> Result<Vec<Destination>, ExpansionError> {
    if destination
        .probability
        .as_ref()
        .is_some_and(|probability| samples(&probability.exp))
    {
        return Err(ExpansionError::NestedSampling);
    }
    let mut choices = Vec::new();
    for (idx, assignment) in destination.assignments.iter().enumerate() {
        if samples(&assignment.target) {
            return Err(ExpansionError::NestedSampling);
        }
        match assignment.value.kind() {
            ExprKind::Distribution { name, args } => {
                choices.push((idx, outcomes(name, args, cap)?));
            }
            _ if samples(&assignment.value) => return Err(ExpansionError::NestedSampling),
            _ => {}
        }
    }
    if choices.is_empty() {
        return Ok(vec![destination]);
    }

    let total = outcome_count(choices.iter().map(|(_, outcomes)| outcomes.len()))
        .ok_or(ExpansionError::TooManyOutcomes)?;
    let (weight, comment) = match destination.probability.clone() {
        Some(Probability { exp, comment }) => (exp, comment),
        None => (Expression::literal(1), None),
    };
    let probability = Probability {
        exp: Expression::binary(Op::Divide, weight, Expression::literal(total)),
        comment,
    };
    let mut expanded = vec![Destination {
        probability: Some(probability),
        ..destination
    }];
    for (idx, outcomes) in choices {
        expanded = expanded
            .into_iter()
            .flat_map(|destination| {
                outcomes.iter().map(move |value| {
                    let mut destination = destination.clone();
                    destination.assignments[idx].value = value.clone();
                    destination
                })
            })
            .collect();
    }
    Ok(expanded)
}

// Number of combinations of the given outcomes, if it fits a JANI integer.
fn outcome_count(outcomes: impl IntoIterator<Item = usize>) -> Option<i64> {
    outcomes
        .into_iter()
        .try_fold(1usize, usize::checked_mul)
        .and_then(|total| i64::try_from(total).ok())
}

// Whether the expression samples from a distribution anywhere.
fn samples(exp: &Expression) -> bool {
    match exp.kind() {
        ExprKind::Distribution { .. } => true,
        ExprKind::Literal(_) | ExprKind::Identifier(_) => false,
        ExprKind::ArrayValue(elements) => elements.iter().any(samples),
        ExprKind::Operator { operands, .. } => operands.iter().any(|(_, operand)| samples(operand)),
    }
}

fn outcomes(
    name: &str,
    args: &[Expression],
    cap: usize,
) -> Result<Vec<Expression>, ExpansionError> {
    let bad_arguments = || ExpansionError::BadArguments(name.to_owned());
    let [lo, hi] = args else {
        return Err(bad_arguments());
    };
    match name {
        "DiscreteUniform" => {
            let (Some(Value::Int(lo)), Some(Value::Int(hi))) = (lo.as_literal(), hi.as_literal())
            else {
                return Err(bad_arguments());
            };
            if lo > hi {
                return Err(bad_arguments());
            }
            Ok(spaced_integers(*lo, *hi, cap)
                .into_iter()
                .map(Expression::literal)
                .collect())
        }
        "Uniform" => {
            let (Some(lo), Some(hi)) = (as_real(lo), as_real(hi)) else {
                return Err(bad_arguments());
            };
            if lo > hi {
                return Err(bad_arguments());
            }
            Ok(spaced_reals(lo, hi, cap)
                .into_iter()
                .map(Expression::literal)
                .collect())
        }
        _ => Err(ExpansionError::UnsupportedDistribution(name.to_owned())),
    }
}

fn as_real(exp: &Expression) -> Option<f64> {
    match exp.as_literal()? {
        Value::Int(int) => Some(*int as f64),
        Value::Real(real) => Some(real.0),
        Value::Bool(_) | Value::Constant(_) => None,
    }
}

// All integers in `lo..=hi`, or `cap` of them evenly spaced including both ends.
fn spaced_integers(lo: i64, hi: i64, cap: usize) -> Vec<i64> {
    let span = i128::from(hi) - i128::from(lo);
    let cap = cap.max(1) as i128;
    if span < cap {
        (lo..=hi).collect()
    } else if cap == 1 {
        vec![lo]
    } else {
        let steps = cap - 1;
        (0..cap)
            // rounds `i * span / steps` to the nearest integer
            .map(|i| (i128::from(lo) + (2 * i * span + steps) / (2 * steps)) as i64)
            .collect()
    }
}

// `cap` evenly spaced reals from `lo` to `hi`, both included.
fn spaced_reals(lo: f64, hi: f64, cap: usize) -> Vec<f64> {
    if cap <= 1 || lo == hi {
        return vec![lo];
    }
    let steps = (cap - 1) as f64;
    (0..cap)
        .map(|i| {
            if i == cap - 1 {
                hi
            } else {
                lo + (hi - lo) * (i as f64) / steps
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jani_core::{Assignment, Edge, Model};

    fn model(destination: Destination, guard: Option<Expression>) -> Model {
        let mut automaton = Automaton::new("A", "l");
        automaton.edges.push(Edge {
            location: "l".to_owned(),
            action: None,
            guard: guard.map(Into::into),
            destinations: vec![destination],
            comment: None,
        });
        let mut model = Model::new("m");
        model.add_automaton(automaton).unwrap();
        model
    }

    fn sampling(values: Vec<(&str, Expression)>) -> Destination {
        let mut destination = Destination::new("l");
        destination.assignments = values
            .into_iter()
            .map(|(var, value)| Assignment::new(Expression::identifier(var), value))
            .collect();
        destination
    }

    fn discrete(lo: i64, hi: i64) -> Expression {
        Expression::distribution(
            "DiscreteUniform",
            vec![Expression::literal(lo), Expression::literal(hi)],
        )
    }

    fn expanded(model: &Model) -> &[Destination] {
        &model.automata[0].edges[0].destinations
    }

    fn values(destinations: &[Destination], idx: usize) -> Vec<Value> {
        destinations
            .iter()
            .map(|destination| *destination.assignments[idx].value.as_literal().unwrap())
            .collect()
    }

    #[test]
    fn discrete_uniform() {
        let mut model = model(sampling(vec![("x", discrete(1, 3))]), None);
        expand_random_choices(&mut model, RANDOM_EXPANSION_CAP).unwrap();
        let destinations = expanded(&model);
        assert_eq!(
            values(destinations, 0),
            [Value::Int(1), Value::Int(2), Value::Int(3)]
        );
        let third = Expression::binary(Op::Divide, Expression::literal(1), Expression::literal(3));
        for destination in destinations {
            assert_eq!(destination.probability.as_ref().unwrap().exp, third);
            assert_eq!(destination.location, "l");
        }
    }

    #[test]
    fn capped_discrete_uniform() {
        let mut model = model(sampling(vec![("x", discrete(0, 1000))]), None);
        expand_random_choices(&mut model, RANDOM_EXPANSION_CAP).unwrap();
        let values = values(expanded(&model), 0);
        assert_eq!(values.len(), RANDOM_EXPANSION_CAP);
        assert_eq!(values.first(), Some(&Value::Int(0)));
        assert_eq!(values.last(), Some(&Value::Int(1000)));
        assert!(values.windows(2).all(|pair| pair[0] != pair[1]));
        assert_eq!(spaced_integers(0, 4, 3), [0, 2, 4]);
        assert_eq!(spaced_integers(0, 9, 4), [0, 3, 6, 9]);
    }

    #[test]
    fn uniform() {
        let uniform = Expression::distribution(
            "Uniform",
            vec![Expression::literal(0), Expression::literal(1.0)],
        );
        let mut model = model(sampling(vec![("x", uniform)]), None);
        expand_random_choices(&mut model, 5).unwrap();
        assert_eq!(
            values(expanded(&model), 0),
            [0.0, 0.25, 0.5, 0.75, 1.0].map(Value::from)
        );
    }

    #[test]
    fn weights_are_split_over_outcomes() {
        let mut destination = sampling(vec![
            ("x", discrete(0, 1)),
            ("y", Expression::literal(true)),
            ("z", discrete(5, 6)),
        ]);
        destination.probability = Some(Probability::from(Expression::literal(0.5)));
        let mut model = model(destination, None);
        expand_random_choices(&mut model, RANDOM_EXPANSION_CAP).unwrap();
        let destinations = expanded(&model);
        assert_eq!(destinations.len(), 4);
        assert_eq!(values(destinations, 0), [0, 0, 1, 1].map(Value::Int));
        assert_eq!(values(destinations, 2), [5, 6, 5, 6].map(Value::Int));
        let weight = Expression::binary(
            Op::Divide,
            Expression::literal(0.5),
            Expression::literal(4),
        );
        assert!(destinations.iter().all(|destination| {
            destination.probability.as_ref().unwrap().exp == weight
                && destination.assignments[1].value == Expression::literal(true)
        }));
    }

    #[test]
    fn deterministic_destinations_are_untouched() {
        let destination = sampling(vec![("x", Expression::literal(1))]);
        let mut model = model(destination.clone(), None);
        expand_random_choices(&mut model, RANDOM_EXPANSION_CAP).unwrap();
        assert_eq!(expanded(&model), [destination]);
    }

    #[test]
    fn rejections() {
        let cases = [
            (
                sampling(vec![("x", Expression::distribution("Normal", vec![
                    Expression::literal(0),
                    Expression::literal(1),
                ]))]),
                None,
                ExpansionError::UnsupportedDistribution("Normal".to_owned()),
            ),
            (
                sampling(vec![("x", Expression::distribution("DiscreteUniform", vec![
                    Expression::identifier("lo"),
                    Expression::literal(1),
                ]))]),
                None,
                ExpansionError::BadArguments("DiscreteUniform".to_owned()),
            ),
            (
                sampling(vec![("x", discrete(3, 1))]),
                None,
                ExpansionError::BadArguments("DiscreteUniform".to_owned()),
            ),
            (
                sampling(vec![(
                    "x",
                    Expression::binary(Op::Plus, Expression::literal(1), discrete(0, 1)),
                )]),
                None,
                ExpansionError::NestedSampling,
            ),
            (
                sampling(Vec::new()),
                Some(Expression::equal(Expression::identifier("x"), discrete(0, 1))),
                ExpansionError::NestedSampling,
            ),
        ];
        for (destination, guard, err) in cases {
            let mut model = model(destination, guard);
            assert_eq!(
                expand_random_choices(&mut model, RANDOM_EXPANSION_CAP),
                Err(ExpansionError::InAutomaton {
                    automaton: "A".to_owned(),
                    source: Box::new(err)
                })
            );
        }
    }

    #[test]
    fn outcome_count_overflow() {
        assert_eq!(outcome_count([6, RANDOM_EXPANSION_CAP]), Some(600));
        assert_eq!(outcome_count([usize::MAX, 2]), None);
    }
}
