use super::{ExprKind, Expression, Identifier, JaniType};
use log::trace;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while declaring variables.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A variable with the same name is already declared.
    #[error("variable '{0}' is already declared")]
    Duplicate(Identifier),
    /// No variable with such name is declared.
    #[error("variable '{0}' is not declared")]
    Unknown(Identifier),
    /// The variable does not have an array type.
    #[error("variable '{0}' is not an array")]
    NotAnArray(Identifier),
    /// The array metadata does not match the variable's type.
    #[error("array '{name}' has {declared} dimensions, but {given} capacities were given")]
    DimensionMismatch {
        /// the array's name
        name: Identifier,
        /// dimensions of the array's type
        declared: usize,
        /// number of capacities provided
        given: usize,
    },
    /// The initial value of an array holds more elements than the array's capacity.
    #[error("array '{name}' is initialized with {length} elements along dimension {dimension}, but its capacity is {capacity}")]
    CapacityExceeded {
        /// the array's name
        name: Identifier,
        /// the dimension, counting from 1
        dimension: usize,
        /// number of elements in the initial value
        length: usize,
        /// capacity of the dimension
        capacity: usize,
    },
}

/// Name of the variable tracking the active length of the `dimension`-th dimension
/// (counting from 1) of the array `array`.
pub fn length_var_name(array: &str, dimension: usize) -> Identifier {
    format!("{array}_length_{dimension}")
}

/// Layout of an array variable: its backing storage has a fixed capacity per dimension,
/// while the active length of each dimension is tracked by a companion variable
/// (see [`length_var_name`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayInfo {
    /// capacity of each dimension, outermost first
    pub capacities: Vec<usize>,
}

impl ArrayInfo {
    /// Number of dimensions of the array.
    pub fn dimensions(&self) -> usize {
        self.capacities.len()
    }
}

/// A variable declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Variable {
    /// the variable's name, unique among all constants and global variables
    /// as well as among local variables if the variable is declared within an automaton
    pub name: Identifier,
    /// the variable's type
    pub r#type: JaniType,
    /// transient variable if present and true
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub transient: bool,
    /// if omitted: any value allowed by type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<Expression>,
    /// an optional comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// array layout, present only on array variables (not part of the JANI schema)
    #[serde(skip)]
    pub array_info: Option<ArrayInfo>,
}

impl Variable {
    /// A non-transient variable of the given type, with optional initial value.
    pub fn new(
        name: impl Into<Identifier>,
        r#type: JaniType,
        initial_value: Option<Expression>,
    ) -> Self {
        Variable {
            name: name.into(),
            r#type,
            transient: false,
            initial_value,
            comment: None,
            array_info: None,
        }
    }

    /// Whether the variable has an array type.
    pub fn is_array(&self) -> bool {
        self.r#type.is_array()
    }
}

/// Table of the variables declared in a scope, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
    indexes: HashMap<Identifier, usize>,
}

impl VariableRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new variable, as is.
    ///
    /// Fails if a variable with the same name is already declared.
    /// Array variables should be declared through [`Self::declare_array`] or completed through
    /// [`Self::set_array_info`], which also declare their length variables.
    pub fn declare(&mut self, variable: Variable) -> Result<(), RegistryError> {
        if self.indexes.contains_key(&variable.name) {
            return Err(RegistryError::Duplicate(variable.name));
        }
        trace!("declare variable '{}'", variable.name);
        self.indexes.insert(variable.name.clone(), self.variables.len());
        self.variables.push(variable);
        Ok(())
    }

    /// Declares an array variable with elements of type `base`
    /// and one dimension for each of the given capacities,
    /// together with its length variables.
    pub fn declare_array(
        &mut self,
        name: impl Into<Identifier>,
        base: JaniType,
        capacities: Vec<usize>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let r#type = capacities.iter().fold(base, |t, _| JaniType::array(t));
        self.declare(Variable::new(name.clone(), r#type, None))?;
        self.set_array_info(&name, ArrayInfo { capacities })
    }

    /// Attaches array metadata to an already-declared array variable,
    /// declaring the missing length variables.
    ///
    /// Length variables start at the length of the array's initial value, if that is an array value,
    /// and at 0 otherwise.
    pub fn set_array_info(&mut self, name: &str, info: ArrayInfo) -> Result<(), RegistryError> {
        let idx = *self
            .indexes
            .get(name)
            .ok_or_else(|| RegistryError::Unknown(name.to_owned()))?;
        let variable = &mut self.variables[idx];
        if !variable.is_array() {
            return Err(RegistryError::NotAnArray(name.to_owned()));
        }
        let declared = variable.r#type.dimensions();
        if declared != info.dimensions() {
            return Err(RegistryError::DimensionMismatch {
                name: name.to_owned(),
                declared,
                given: info.dimensions(),
            });
        }
        let lengths = initial_lengths(variable.initial_value.as_ref(), declared);
        for (idx, (&length, &capacity)) in lengths.iter().zip(&info.capacities).enumerate() {
            if length > capacity {
                return Err(RegistryError::CapacityExceeded {
                    name: name.to_owned(),
                    dimension: idx + 1,
                    length,
                    capacity,
                });
            }
        }
        let capacities = info.capacities.clone();
        variable.array_info = Some(info);
        self.declare_length_vars(name, &capacities, &lengths)
    }

    fn declare_length_vars(
        &mut self,
        array: &str,
        capacities: &[usize],
        lengths: &[usize],
    ) -> Result<(), RegistryError> {
        for (idx, (capacity, length)) in capacities.iter().zip(lengths).enumerate() {
            let length_var = length_var_name(array, idx + 1);
            if !self.contains(&length_var) {
                let capacity = i64::try_from(*capacity).unwrap_or(i64::MAX);
                let length = i64::try_from(*length).unwrap_or(i64::MAX);
                self.declare(Variable::new(
                    length_var,
                    JaniType::bounded_int(0, capacity),
                    Some(Expression::literal(length)),
                ))?;
            }
        }
        Ok(())
    }

    /// Gets the variable with the given name.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.indexes.get(name).map(|idx| &self.variables[*idx])
    }

    /// Whether a variable with the given name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    /// Iterates over the variables in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    /// Number of declared variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether no variable is declared.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

// Length of each dimension of an array value: the longest array value found at that depth.
fn initial_lengths(initial_value: Option<&Expression>, dimensions: usize) -> Vec<usize> {
    let mut lengths = Vec::with_capacity(dimensions);
    let mut level = initial_value.into_iter().collect::<Vec<_>>();
    for _ in 0..dimensions {
        let mut length = 0;
        let mut next = Vec::new();
        for exp in level {
            if let ExprKind::ArrayValue(elements) = exp.kind() {
                length = length.max(elements.len());
                next.extend(elements);
            }
        }
        lengths.push(length);
        level = next;
    }
    lengths
}

impl Serialize for VariableRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.variables.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VariableRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut registry = VariableRegistry::new();
        for variable in Vec::<Variable>::deserialize(deserializer)? {
            registry.declare(variable).map_err(de::Error::custom)?;
        }
        Ok(registry)
    }
}

/// Read-only view of the variables visible from some point of a model:
/// the local variables of an automaton, if any, and the global variables.
///
/// Names are assumed to be unique across the two registries.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    local: Option<&'a VariableRegistry>,
    global: &'a VariableRegistry,
}

impl<'a> Scope<'a> {
    /// Scope containing only global variables.
    pub fn global(global: &'a VariableRegistry) -> Self {
        Scope {
            local: None,
            global,
        }
    }

    /// Scope of an automaton with the given local variables.
    pub fn local(global: &'a VariableRegistry, local: &'a VariableRegistry) -> Self {
        Scope {
            local: Some(local),
            global,
        }
    }

    /// Resolves a variable name.
    pub fn get(&self, name: &str) -> Option<&'a Variable> {
        self.local
            .and_then(|local| local.get(name))
            .or_else(|| self.global.get(name))
    }
}
