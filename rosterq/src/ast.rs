//! AST for roster filter expressions

use serde::{Deserialize, Serialize};

/// One condition triple in a conjunctive filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Field the condition applies to.
    pub field: String,
    /// Comparison operator.
    pub op: Operator,
    /// Right-hand literal.
    pub value: Literal,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: Operator, value: Literal) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }
}

/// Comparison operators supported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `in [..]` - value is one of the listed literals
    In,
    /// `not in [..]`
    NotIn,
    /// `contains` - an array field holds the literal
    Contains,
    /// `like` - string pattern with `%` (any run) and `_` (any char)
    Like,
}

impl Operator {
    /// The surface syntax for this operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::Contains => "contains",
            Operator::Like => "like",
        }
    }
}

/// Literal values on the right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Literal>),
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Int(i)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}
