//! FILENAME: query/src/error.rs

use crate::parser::ParseError;
use cloud_engine::CloudError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Cloud error: {0}")]
    Cloud(#[from] CloudError),

    #[error("No cloud registered under '{0}'")]
    UnknownCloud(String),

    #[error("Variable '{0}' is not defined in the render context")]
    UndefinedVariable(String),

    #[error("Lookup '{0}' is only allowed in total tags")]
    LookupNotAllowed(String),

    #[error("Invalid criterion '{key}': {message}")]
    InvalidCriterion { key: String, message: String },
}

pub type QueryResult<T> = Result<T, QueryError>;
