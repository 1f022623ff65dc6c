use super::Expression;
use serde::{Deserialize, Serialize};

/// Basic types.
/// In JANI, all requirements like "y must be of type x" are to be interpreted
/// as "type x must be assignable from y's type".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BasicType {
    /// assignable from bool
    Bool,
    /// numeric; assignable from int and bounded int
    Int,
    /// numeric; assignable from all numeric types
    Real,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum BoundedKind {
    Bounded,
}

/// Numeric if base is numeric; lower-bound or upper-bound or both must be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct BoundedType {
    kind: BoundedKind,
    /// the type being bounded
    pub base: BasicType,
    /// smallest value allowed by the type; constant expression of the base type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<Expression>,
    /// largest value allowed by the type; constant expression of the base type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ArrayKind {
    Array,
}

/// Arrays of elements of the base type (arrays extension).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ArrayType {
    kind: ArrayKind,
    /// the type of the array's elements
    pub base: Box<JaniType>,
}

/// Variable types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JaniType {
    /// a basic type
    Basic(BasicType),
    /// a bounded numeric type
    Bounded(BoundedType),
    /// an array type
    Array(ArrayType),
}

impl JaniType {
    /// Integer type bounded by the given (inclusive) limits.
    pub fn bounded_int(lower: i64, upper: i64) -> Self {
        JaniType::Bounded(BoundedType {
            kind: BoundedKind::Bounded,
            base: BasicType::Int,
            lower_bound: Some(Expression::literal(lower)),
            upper_bound: Some(Expression::literal(upper)),
        })
    }

    /// Array type with the given element type.
    pub fn array(base: JaniType) -> Self {
        JaniType::Array(ArrayType {
            kind: ArrayKind::Array,
            base: Box::new(base),
        })
    }

    /// Whether the type is an array type.
    pub fn is_array(&self) -> bool {
        matches!(self, JaniType::Array(_))
    }

    /// Number of nested array levels: 0 for scalars, 1 for vectors, and so on.
    pub fn dimensions(&self) -> usize {
        match self {
            JaniType::Array(array) => 1 + array.base.dimensions(),
            _ => 0,
        }
    }
}

impl From<BasicType> for JaniType {
    fn from(basic: BasicType) -> Self {
        JaniType::Basic(basic)
    }
}
