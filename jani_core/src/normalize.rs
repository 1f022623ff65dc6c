//! Rewriting of model expressions into the operator set supported by standard JANI.
//!
//! At the moment the only rewrite is the expansion of equality between an array variable
//! and an array value into the conjunction of the comparison of the array's active length
//! and of the comparison of each active element.
//! Arrays are stored in fixed-capacity backing storage, so whatever lies beyond the
//! active length must never be compared.

use crate::{ExprKind, Expression, Identifier, Model, Op, Scope, Value, length_var_name};
use log::{debug, trace};
use thiserror::Error;

/// Errors raised by normalization.
///
/// They all signal a model that violates the contract of the translation producing it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizationError {
    /// An array appears as operand of an operator that is neither equality nor array access.
    #[error("array operands can only be used in comparisons, found one under operator {0:?}")]
    ArrayOperand(Op),
    /// Equality between multi-dimensional arrays.
    #[error("comparing multi-dimensional arrays is unsupported ('{name}' has {dimensions} dimensions)")]
    MultiDimensionalArray {
        /// the array variable
        name: Identifier,
        /// its number of dimensions
        dimensions: usize,
    },
    /// An array value compared with an array has non-literal elements.
    #[error("array comparisons with computed element values are unsupported")]
    NonLiteralArrayElement,
    /// The length variable of an array is not in scope.
    #[error("length variable '{length}' of array '{array}' not found")]
    MissingLengthVariable {
        /// the array variable
        array: Identifier,
        /// the name of the missing length variable
        length: Identifier,
    },
    /// An array-typed variable carries no array metadata.
    #[error("array variable '{0}' has no array info")]
    MissingArrayInfo(Identifier),
    /// The compared variable is not in scope.
    #[error("variable '{0}' not found")]
    UnknownVariable(Identifier),
    /// The compared variable is not an array.
    #[error("variable '{0}' is not an array")]
    NotAnArray(Identifier),
    /// Array equality is only supported between an array variable and an array value.
    #[error("array equality requires an array variable and an array value")]
    UnsupportedArrayComparison,
    /// Error raised while normalizing an automaton.
    #[error("failed normalizing automaton '{automaton}'")]
    InAutomaton {
        /// the automaton's name
        automaton: Identifier,
        /// the originating error
        #[source]
        source: Box<NormalizationError>,
    },
    /// Error raised while normalizing a property.
    #[error("failed normalizing property '{property}'")]
    InProperty {
        /// the property's name
        property: Identifier,
        /// the originating error
        #[source]
        source: Box<NormalizationError>,
    },
}

impl NormalizationError {
    /// The error that originated the failure, stripped of the context it was raised in.
    pub fn cause(&self) -> &NormalizationError {
        match self {
            NormalizationError::InAutomaton { source, .. }
            | NormalizationError::InProperty { source, .. } => source.cause(),
            err => err,
        }
    }
}

/// Replaces every guard, destination probability and assignment value of the model's automata,
/// and every operand of the model's properties, with its normalized form.
///
/// Automata expressions are resolved against the automaton's local variables and the global ones,
/// property expressions against the global variables only.
pub fn normalize(model: &mut Model) -> Result<(), NormalizationError> {
    debug!("normalizing expressions of model '{}'", model.name);
    let globals = &model.variables;
    for automaton in &mut model.automata {
        let scope = Scope::local(globals, &automaton.variables);
        let name = &automaton.name;
        let in_automaton = |err| NormalizationError::InAutomaton {
            automaton: name.clone(),
            source: Box::new(err),
        };
        for edge in &mut automaton.edges {
            if let Some(guard) = edge.guard.as_mut() {
                guard.exp = normalize_expression(&guard.exp, &scope).map_err(in_automaton)?;
            }
            for destination in &mut edge.destinations {
                if let Some(probability) = destination.probability.as_mut() {
                    probability.exp =
                        normalize_expression(&probability.exp, &scope).map_err(in_automaton)?;
                }
                for assignment in &mut destination.assignments {
                    assignment.value =
                        normalize_expression(&assignment.value, &scope).map_err(in_automaton)?;
                }
            }
        }
    }
    let scope = Scope::global(globals);
    for property in &mut model.properties {
        let in_property = |err| NormalizationError::InProperty {
            property: property.name.clone(),
            source: Box::new(err),
        };
        let expression = match property.expression.as_operator() {
            Some((op, _)) => {
                let operands = property
                    .operands()
                    .iter()
                    .map(|(role, operand)| {
                        normalize_expression(operand, &scope).map(|operand| (role.clone(), operand))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(in_property)?;
                Expression::operator(op, operands)
                    .with_comment(property.expression.comment().map(ToOwned::to_owned))
            }
            None => normalize_expression(&property.expression, &scope).map_err(in_property)?,
        };
        property.expression = expression;
    }
    Ok(())
}

/// Builds the normalized form of an expression, resolving identifiers in the given scope.
///
/// The comment of each rewritten node is carried over to its replacement.
pub fn normalize_expression(
    expression: &Expression,
    scope: &Scope,
) -> Result<Expression, NormalizationError> {
    let comment = expression.comment().map(ToOwned::to_owned);
    match expression.kind() {
        ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::ArrayValue(_) => {
            Ok(expression.clone())
        }
        ExprKind::Distribution { name, args } => {
            let args = args
                .iter()
                .map(|arg| normalize_expression(arg, scope))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expression::distribution(name.clone(), args).with_comment(comment))
        }
        ExprKind::Operator { op, operands } => {
            // The array operand of an array access is the only legitimate use of an array
            // besides comparisons.
            let has_array_operand = operands.iter().any(|(role, operand)| {
                !(*op == Op::ArrayAccess && role == "exp") && is_array(operand, scope)
            });
            if has_array_operand {
                if *op != Op::Eq {
                    return Err(NormalizationError::ArrayOperand(*op));
                }
                return expand_array_equality(operands, scope).map(|exp| exp.with_comment(comment));
            }
            let operands = operands
                .iter()
                .map(|(role, operand)| {
                    normalize_expression(operand, scope).map(|operand| (role.clone(), operand))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expression::operator(*op, operands).with_comment(comment))
        }
    }
}

fn is_array(expression: &Expression, scope: &Scope) -> bool {
    match expression.kind() {
        ExprKind::ArrayValue(_) => true,
        ExprKind::Identifier(name) => scope.get(name).is_some_and(|var| var.is_array()),
        _ => false,
    }
}

// Turns `array = [v0, ..., vn]` into `array_length_1 = n+1 ∧ v0 = array[0] ∧ ... ∧ vn = array[n]`,
// left-associated.
fn expand_array_equality(
    operands: &[(String, Expression)],
    scope: &Scope,
) -> Result<Expression, NormalizationError> {
    let mut array = None;
    let mut elements = None;
    for (_, operand) in operands {
        match operand.kind() {
            ExprKind::Identifier(name) => {
                let variable = scope
                    .get(name)
                    .ok_or_else(|| NormalizationError::UnknownVariable(name.clone()))?;
                if !variable.is_array() {
                    return Err(NormalizationError::NotAnArray(name.clone()));
                }
                let info = variable
                    .array_info
                    .as_ref()
                    .ok_or_else(|| NormalizationError::MissingArrayInfo(name.clone()))?;
                if info.dimensions() != 1 {
                    return Err(NormalizationError::MultiDimensionalArray {
                        name: name.clone(),
                        dimensions: info.dimensions(),
                    });
                }
                let length = length_var_name(name, 1);
                if scope.get(&length).is_none() {
                    return Err(NormalizationError::MissingLengthVariable {
                        array: name.clone(),
                        length,
                    });
                }
                if array.replace((name, length)).is_some() {
                    return Err(NormalizationError::UnsupportedArrayComparison);
                }
            }
            ExprKind::ArrayValue(values) => {
                if elements.replace(values).is_some() {
                    return Err(NormalizationError::UnsupportedArrayComparison);
                }
            }
            _ => return Err(NormalizationError::UnsupportedArrayComparison),
        }
    }
    let (Some((array, length)), Some(elements)) = (array, elements) else {
        return Err(NormalizationError::UnsupportedArrayComparison);
    };
    if elements.iter().any(|element| element.as_literal().is_none()) {
        return Err(NormalizationError::NonLiteralArrayElement);
    }
    trace!("expanding comparison of array '{array}' with {} elements", elements.len());
    let seed = Expression::equal(
        Expression::identifier(length),
        Expression::literal(Value::Int(elements.len() as i64)),
    );
    let expanded = elements
        .iter()
        .enumerate()
        .fold(seed, |conjunction, (idx, element)| {
            Expression::and(
                conjunction,
                Expression::equal(
                    element.clone(),
                    Expression::array_access(
                        Expression::identifier(array.as_str()),
                        Expression::literal(Value::Int(idx as i64)),
                    ),
                ),
            )
        });
    Ok(expanded)
}
