//! Canonical query AST.
//!
//! A query is a flat sequence of [`Node`]s alternating expressions (atoms and
//! groups) with boolean operators. There is no precedence: evaluation order is the
//! textual order, exactly as parenthesized.

use serde::{Deserialize, Serialize};

/// One element of a canonical query sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Node {
    /// A single field comparison.
    Atom(Atom),
    /// A boolean connective between two expressions.
    Operator(BoolOp),
    /// A parenthesized sub-sequence.
    Group(Vec<Node>),
}

/// A field/operator/value comparison, the leaf of the query language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atom {
    pub field: String,
    pub operator: AtomOp,
    /// One value, or `[lower, upper]` for [`AtomOp::Between`].
    #[serde(rename = "value")]
    pub values: Vec<String>,
}

impl Atom {
    /// `field = value`
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::single(field, AtomOp::Eq, value)
    }

    /// `field > value`
    pub fn greater_than(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::single(field, AtomOp::Gt, value)
    }

    /// `field < value`
    pub fn less_than(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::single(field, AtomOp::Lt, value)
    }

    /// `field BETWEEN lower AND upper`, bounds kept in the given order.
    pub fn between(
        field: impl Into<String>,
        lower: impl Into<String>,
        upper: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: AtomOp::Between,
            values: vec![lower.into(), upper.into()],
        }
    }

    fn single(field: impl Into<String>, operator: AtomOp, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            values: vec![value.into()],
        }
    }
}

/// Comparison operator of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "BETWEEN")]
    Between,
}

impl AtomOp {
    /// Number of values an atom with this operator carries.
    pub fn arity(self) -> usize {
        match self {
            AtomOp::Between => 2,
            AtomOp::Eq | AtomOp::Gt | AtomOp::Lt => 1,
        }
    }
}

impl std::fmt::Display for AtomOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomOp::Eq => write!(f, "="),
            AtomOp::Gt => write!(f, ">"),
            AtomOp::Lt => write!(f, "<"),
            AtomOp::Between => write!(f, "BETWEEN"),
        }
    }
}

/// Canonical boolean connective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolOp {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    #[serde(rename = "AND NOT")]
    AndNot,
    // The grammar never produces a bare NOT; kept for a future unary form.
    #[serde(rename = "NOT")]
    Not,
}

impl BoolOp {
    /// Canonicalize a boolean keyword, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "and" => Some(BoolOp::And),
            "or" => Some(BoolOp::Or),
            "andnot" => Some(BoolOp::AndNot),
            "not" => Some(BoolOp::Not),
            _ => None,
        }
    }
}

impl std::fmt::Display for BoolOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoolOp::And => write!(f, "AND"),
            BoolOp::Or => write!(f, "OR"),
            BoolOp::AndNot => write!(f, "AND NOT"),
            BoolOp::Not => write!(f, "NOT"),
        }
    }
}
