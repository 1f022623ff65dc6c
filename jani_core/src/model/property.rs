use super::{Expression, Identifier};
use serde::{Deserialize, Serialize};

/// A property to check on the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Property {
    /// the property's name, unique among all the properties of the model
    pub name: Identifier,
    /// the property expression, usually a `filter`
    pub expression: Expression,
    /// an optional comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Property {
    /// The operands of the top-level property operator, by role.
    pub fn operands(&self) -> &[(String, Expression)] {
        self.expression
            .as_operator()
            .map(|(_, operands)| operands)
            .unwrap_or_default()
    }
}
