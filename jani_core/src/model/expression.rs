use super::Identifier;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser::SerializeMap};
use serde_json::{Map, Value as Json};
use thiserror::Error;

/// Errors found while reading an [`Expression`] from its JSON representation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The JSON value cannot represent an expression.
    #[error("JSON value `{0}` is not an expression")]
    NotAnExpression(String),
    /// The object has no `op`, `constant` or `distribution` key.
    #[error("expression object has no `op` key")]
    MissingOp,
    /// The operator is not part of the supported JANI operators.
    #[error("unknown operator `{0}`")]
    UnknownOp(String),
    /// The mathematical constant is unknown.
    #[error("unknown constant `{0}`")]
    UnknownConstant(String),
    /// An entry has the wrong shape.
    #[error("malformed `{0}` entry")]
    Malformed(&'static str),
}

/// Mathematical constants that cannot be expressed with numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    /// Euler's number; type real
    Euler,
    /// π; type real
    Pi,
}

impl Constant {
    fn symbol(self) -> &'static str {
        match self {
            Constant::Euler => "e",
            Constant::Pi => "π",
        }
    }
}

/// Literal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    /// Boolean value; has type bool
    Bool(bool),
    /// Integer value; has type int
    Int(i64),
    /// Real value; has type real
    Real(OrderedFloat<f64>),
    /// Mathematical constant; has type real
    Constant(Constant),
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(OrderedFloat(value))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Real(r) => serializer.serialize_f64(r.0),
            Value::Constant(c) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("constant", c.symbol())?;
                map.end()
            }
        }
    }
}

/// The operators of the JANI expression language (with the derived-operators,
/// trigonometric-functions and arrays extensions) and of its property language.
///
/// Array values (`av`) are not an operator: they are represented by [`ExprKind::ArrayValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Op {
    /// if-then-else, operands `if`, `then`, `else`
    Ite,
    /// disjunction, operands `left`, `right`
    #[serde(rename = "∨")]
    Or,
    /// conjunction, operands `left`, `right`
    #[serde(rename = "∧")]
    And,
    /// negation, operand `exp`
    #[serde(rename = "¬")]
    Not,
    /// implication, operands `left`, `right`
    #[serde(rename = "⇒")]
    Implies,
    /// equality, operands `left`, `right`
    #[serde(rename = "=")]
    Eq,
    /// disequality, operands `left`, `right`
    #[serde(rename = "≠")]
    Neq,
    #[serde(rename = "<")]
    #[allow(missing_docs)]
    Less,
    #[serde(rename = "≤")]
    #[allow(missing_docs)]
    Leq,
    #[serde(rename = ">")]
    #[allow(missing_docs)]
    Greater,
    #[serde(rename = "≥")]
    #[allow(missing_docs)]
    Geq,
    #[serde(rename = "+")]
    #[allow(missing_docs)]
    Plus,
    #[serde(rename = "-")]
    #[allow(missing_docs)]
    Minus,
    #[serde(rename = "*")]
    #[allow(missing_docs)]
    Times,
    #[serde(rename = "%")]
    #[allow(missing_docs)]
    Modulo,
    #[serde(rename = "/")]
    #[allow(missing_docs)]
    Divide,
    #[allow(missing_docs)]
    Pow,
    #[allow(missing_docs)]
    Log,
    #[allow(missing_docs)]
    Floor,
    #[allow(missing_docs)]
    Ceil,
    #[allow(missing_docs)]
    Abs,
    #[allow(missing_docs)]
    Sgn,
    #[allow(missing_docs)]
    Min,
    #[allow(missing_docs)]
    Max,
    /// truncation towards zero
    Trc,
    #[allow(missing_docs)]
    Sin,
    #[allow(missing_docs)]
    Cos,
    #[allow(missing_docs)]
    Tan,
    /// array access, operands `exp` (the array) and `index`
    #[serde(rename = "aa")]
    ArrayAccess,
    /// array constructor, operands `var`, `length` and `exp`
    #[serde(rename = "ac")]
    ArrayConstructor,
    /// property filter, operands `fun`, `values`, `states`
    Filter,
    #[serde(rename = "Pmin")]
    #[allow(missing_docs)]
    Pmin,
    #[serde(rename = "Pmax")]
    #[allow(missing_docs)]
    Pmax,
    #[serde(rename = "Emin")]
    #[allow(missing_docs)]
    Emin,
    #[serde(rename = "Emax")]
    #[allow(missing_docs)]
    Emax,
    #[serde(rename = "Smin")]
    #[allow(missing_docs)]
    Smin,
    #[serde(rename = "Smax")]
    #[allow(missing_docs)]
    Smax,
    #[serde(rename = "U")]
    #[allow(missing_docs)]
    Until,
    #[serde(rename = "W")]
    #[allow(missing_docs)]
    WeakUntil,
    #[serde(rename = "F")]
    #[allow(missing_docs)]
    Eventually,
    #[serde(rename = "G")]
    #[allow(missing_docs)]
    Always,
    #[serde(rename = "∃")]
    #[allow(missing_docs)]
    Exists,
    #[serde(rename = "∀")]
    #[allow(missing_docs)]
    Forall,
    /// the set of initial states, no operands
    Initial,
    #[allow(missing_docs)]
    Deadlock,
    #[allow(missing_docs)]
    Timelock,
}

/// The shape of an [`Expression`] node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// constant value
    Literal(Value),
    /// constant or variable reference
    Identifier(Identifier),
    /// operator applied to named operands, in order
    Operator {
        /// the operator
        op: Op,
        /// operands, each with the role it plays for `op` (`left`, `right`, `exp`, ...)
        operands: Vec<(String, Expression)>,
    },
    /// array value (`av`), listing the array's elements
    ArrayValue(Vec<Expression>),
    /// sampling from a probability distribution
    Distribution {
        /// the distribution's name, e.g. `DiscreteUniform`
        name: String,
        /// the distribution's parameters
        args: Vec<Expression>,
    },
}

/// An expression of the JANI language.
///
/// Expressions are immutable trees: rewriting one builds a new tree.
/// Each node may carry a comment, which is kept for traceability
/// but is ignored when comparing expressions.
#[derive(Debug, Clone)]
pub struct Expression {
    kind: ExprKind,
    comment: Option<String>,
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Expression {}

impl From<ExprKind> for Expression {
    fn from(kind: ExprKind) -> Self {
        Expression {
            kind,
            comment: None,
        }
    }
}

impl Expression {
    /// A literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        ExprKind::Literal(value.into()).into()
    }

    /// A reference to a constant or variable.
    pub fn identifier(name: impl Into<Identifier>) -> Self {
        ExprKind::Identifier(name.into()).into()
    }

    /// An operator applied to the given operands, listed as `(role, operand)` pairs.
    pub fn operator<R: Into<String>>(
        op: Op,
        operands: impl IntoIterator<Item = (R, Expression)>,
    ) -> Self {
        ExprKind::Operator {
            op,
            operands: operands
                .into_iter()
                .map(|(role, operand)| (role.into(), operand))
                .collect(),
        }
        .into()
    }

    /// An array value with the given elements.
    pub fn array_value(elements: Vec<Expression>) -> Self {
        ExprKind::ArrayValue(elements).into()
    }

    /// Sampling from the named distribution.
    pub fn distribution(name: impl Into<String>, args: Vec<Expression>) -> Self {
        ExprKind::Distribution {
            name: name.into(),
            args,
        }
        .into()
    }

    /// Binary operator with `left` and `right` operands.
    pub fn binary(op: Op, left: Expression, right: Expression) -> Self {
        Self::operator(op, [("left", left), ("right", right)])
    }

    /// `left = right`
    pub fn equal(left: Expression, right: Expression) -> Self {
        Self::binary(Op::Eq, left, right)
    }

    /// `left ∧ right`
    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary(Op::And, left, right)
    }

    /// `left ∨ right`
    pub fn or(left: Expression, right: Expression) -> Self {
        Self::binary(Op::Or, left, right)
    }

    /// `¬exp`
    pub fn not(exp: Expression) -> Self {
        Self::operator(Op::Not, [("exp", exp)])
    }

    /// `array[index]`
    pub fn array_access(array: Expression, index: Expression) -> Self {
        Self::operator(Op::ArrayAccess, [("exp", array), ("index", index)])
    }

    /// Replaces the comment of the expression.
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// The shape of the expression's root node.
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// The comment attached to the expression's root node.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// The literal value, if the expression is a literal.
    pub fn as_literal(&self) -> Option<&Value> {
        match &self.kind {
            ExprKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// The referenced name, if the expression is an identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// The operator and its operands, if the expression is an operator node.
    pub fn as_operator(&self) -> Option<(Op, &[(String, Expression)])> {
        match &self.kind {
            ExprKind::Operator { op, operands } => Some((*op, operands)),
            _ => None,
        }
    }

    /// The operand playing the given role, if any.
    pub fn operand(&self, role: &str) -> Option<&Expression> {
        self.as_operator().and_then(|(_, operands)| {
            operands
                .iter()
                .find_map(|(r, operand)| (r == role).then_some(operand))
        })
    }

    /// Whether the expression is the literal `true`.
    pub fn is_true(&self) -> bool {
        matches!(self.kind, ExprKind::Literal(Value::Bool(true)))
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::literal(value)
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // JANI has no room for comments on bare values and names.
        match &self.kind {
            ExprKind::Literal(value) => value.serialize(serializer),
            ExprKind::Identifier(name) => serializer.serialize_str(name),
            ExprKind::Operator { op, operands } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("op", op)?;
                for (role, operand) in operands {
                    map.serialize_entry(role, operand)?;
                }
                if let Some(ref comment) = self.comment {
                    map.serialize_entry("comment", comment)?;
                }
                map.end()
            }
            ExprKind::ArrayValue(elements) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("op", "av")?;
                map.serialize_entry("elements", elements)?;
                if let Some(ref comment) = self.comment {
                    map.serialize_entry("comment", comment)?;
                }
                map.end()
            }
            ExprKind::Distribution { name, args } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("distribution", name)?;
                map.serialize_entry("args", args)?;
                if let Some(ref comment) = self.comment {
                    map.serialize_entry("comment", comment)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        Expression::try_from(json).map_err(de::Error::custom)
    }
}

impl TryFrom<Json> for Expression {
    type Error = FormatError;

    fn try_from(json: Json) -> Result<Self, Self::Error> {
        match json {
            Json::Bool(b) => Ok(Expression::literal(b)),
            Json::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::from))
                .map(Expression::literal)
                .ok_or_else(|| FormatError::NotAnExpression(n.to_string())),
            Json::String(name) => Ok(Expression::identifier(name)),
            Json::Object(object) => from_object(object),
            other => Err(FormatError::NotAnExpression(other.to_string())),
        }
    }
}

fn from_object(object: Map<String, Json>) -> Result<Expression, FormatError> {
    let mut comment = None;
    let mut op = None;
    let mut constant = None;
    let mut distribution = None;
    let mut entries = Vec::new();
    for (key, value) in object {
        match key.as_str() {
            "comment" => comment = Some(into_string(value, "comment")?),
            "op" => op = Some(into_string(value, "op")?),
            "constant" => constant = Some(into_string(value, "constant")?),
            "distribution" => distribution = Some(into_string(value, "distribution")?),
            _ => entries.push((key, value)),
        }
    }

    let expression = if let Some(constant) = constant {
        let constant = match constant.as_str() {
            "e" => Constant::Euler,
            "π" => Constant::Pi,
            _ => return Err(FormatError::UnknownConstant(constant)),
        };
        Expression::literal(Value::Constant(constant))
    } else if let Some(name) = distribution {
        let args = take_list(&mut entries, "args")?;
        Expression::distribution(name, args)
    } else if let Some(op) = op {
        if op == "av" {
            Expression::array_value(take_list(&mut entries, "elements")?)
        } else {
            let op = serde_json::from_value::<Op>(Json::String(op.clone()))
                .map_err(|_| FormatError::UnknownOp(op))?;
            let operands = entries
                .into_iter()
                .map(|(role, operand)| Expression::try_from(operand).map(|operand| (role, operand)))
                .collect::<Result<Vec<_>, _>>()?;
            Expression::operator(op, operands)
        }
    } else {
        return Err(FormatError::MissingOp);
    };
    Ok(expression.with_comment(comment))
}

fn into_string(json: Json, key: &'static str) -> Result<String, FormatError> {
    match json {
        Json::String(s) => Ok(s),
        _ => Err(FormatError::Malformed(key)),
    }
}

fn take_list(
    entries: &mut Vec<(String, Json)>,
    key: &'static str,
) -> Result<Vec<Expression>, FormatError> {
    let idx = entries
        .iter()
        .position(|(k, _)| k == key)
        .ok_or(FormatError::Malformed(key))?;
    match entries.remove(idx).1 {
        Json::Array(items) => items.into_iter().map(Expression::try_from).collect(),
        _ => Err(FormatError::Malformed(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn comments_do_not_affect_equality() {
        let plain = Expression::equal(Expression::identifier("x"), Expression::literal(1));
        let commented = plain.clone().with_comment(Some("from guard".to_owned()));
        assert_eq!(plain, commented);
        assert_eq!(commented.comment(), Some("from guard"));
        assert_eq!(plain.comment(), None);
    }

    #[test]
    fn operand_roles() {
        let access =
            Expression::array_access(Expression::identifier("arr"), Expression::literal(2));
        assert_eq!(access.as_operator().map(|(op, _)| op), Some(Op::ArrayAccess));
        assert_eq!(access.operand("exp").and_then(Expression::as_identifier), Some("arr"));
        assert_eq!(access.operand("index").and_then(Expression::as_literal), Some(&Value::Int(2)));
        assert!(access.operand("left").is_none());
    }

    #[test]
    fn parse_jani_operators() {
        let json = json!({
            "op": "∧",
            "left": {"op": "=", "left": "x", "right": 3},
            "right": {"op": "¬", "exp": true},
            "comment": "guard of t0"
        });
        let exp: Expression = serde_json::from_value(json).unwrap();
        let expected = Expression::and(
            Expression::equal(Expression::identifier("x"), Expression::literal(3)),
            Expression::not(Expression::literal(true)),
        );
        assert_eq!(exp, expected);
        assert_eq!(exp.comment(), Some("guard of t0"));
    }

    #[test]
    fn parse_array_value_and_constants() {
        let json = json!({"op": "av", "elements": [1, 2.5, {"constant": "π"}]});
        let exp: Expression = serde_json::from_value(json).unwrap();
        assert_eq!(
            exp.kind(),
            &ExprKind::ArrayValue(vec![
                Expression::literal(1),
                Expression::literal(2.5),
                Expression::literal(Value::Constant(Constant::Pi)),
            ])
        );
    }

    #[test]
    fn parse_distribution() {
        let json = json!({"distribution": "DiscreteUniform", "args": [0, 4]});
        let exp: Expression = serde_json::from_value(json).unwrap();
        assert_eq!(
            exp,
            Expression::distribution(
                "DiscreteUniform",
                vec![Expression::literal(0), Expression::literal(4)]
            )
        );
    }

    #[test]
    fn reject_unknown_operator() {
        let err = Expression::try_from(json!({"op": "xor", "left": true, "right": false}))
            .expect_err("xor is not a JANI operator");
        assert_eq!(err, FormatError::UnknownOp("xor".to_owned()));
        assert_eq!(
            Expression::try_from(json!({"left": 1})).expect_err("no op"),
            FormatError::MissingOp
        );
    }

    #[test]
    fn serialize_keeps_roles_and_comment() {
        let exp = Expression::array_access(Expression::identifier("arr"), Expression::literal(0))
            .with_comment(Some("arr[0]".to_owned()));
        let json = serde_json::to_value(&exp).unwrap();
        assert_eq!(
            json,
            json!({"op": "aa", "exp": "arr", "index": 0, "comment": "arr[0]"})
        );
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["op", "exp", "index", "comment"]);
    }
}
