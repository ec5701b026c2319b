//! FILENAME: query/src/ast.rs
//! PURPOSE: Parsed form of a query tag.

use cloud_engine::Value;
use std::fmt;

/// What a tag reads from its cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// The value at one point, materializing it if absent.
    Value,
    /// The sum of every point passing the criteria.
    Total,
}

impl TagKind {
    /// Maps a tag name to its kind. Both the long and short spellings are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cloud_value" | "value" => Some(TagKind::Value),
            "cloud_total" | "total" => Some(TagKind::Total),
            _ => None,
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKind::Value => write!(f, "cloud_value"),
            TagKind::Total => write!(f, "cloud_total"),
        }
    }
}

/// Right-hand side of a criterion.
#[derive(Debug, Clone, PartialEq)]
pub enum OperandExpr {
    Literal(Value),
    /// Resolved against the render context.
    Variable(String),
    List(Vec<OperandExpr>),
}

/// `key=operand`; for totals the key may carry a lookup (`region__in`).
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub key: String,
    pub operand: OperandExpr,
}

impl Criterion {
    pub fn new(key: impl Into<String>, operand: OperandExpr) -> Self {
        Criterion {
            key: key.into(),
            operand,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryTag {
    pub kind: TagKind,
    pub cloud: String,
    pub criteria: Vec<Criterion>,
    /// Set by a trailing `as name`.
    pub bind_as: Option<String>,
}
