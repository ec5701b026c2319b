//! FILENAME: engine/src/error.rs

use thiserror::Error;

use crate::value::CoordinateTuple;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CloudError {
    #[error("Coordinate tuple has {actual} components, expected {expected}")]
    Shape { expected: usize, actual: usize },

    #[error("Coordinates must be given either positionally or by name, not both")]
    AmbiguousArguments,

    #[error("Duplicate axis name: {0}")]
    DuplicateAxis(String),

    #[error("Row has no field '{field}' for axis '{axis}'")]
    MissingField { axis: String, field: String },

    #[error("Field '{field}' for axis '{axis}' is a list or object and cannot be a coordinate")]
    UnhashableField { axis: String, field: String },

    #[error("Unknown axis in filter: {0}")]
    UnknownAxis(String),

    #[error("Unknown lookup in filter: {0}")]
    UnknownLookup(String),

    #[error("Non-numeric value at {coordinates:?}")]
    NotNumeric { coordinates: CoordinateTuple },

    #[error("Invalid operand for lookup '{lookup}': {message}")]
    InvalidOperand { lookup: String, message: String },

    #[error("Invalid cloud definition: {0}")]
    Definition(String),

    #[error("Cloud lock poisoned")]
    Poisoned,
}

pub type CloudResult<T> = Result<T, CloudError>;
