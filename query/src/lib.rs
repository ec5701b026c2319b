//! FILENAME: query/src/lib.rs
//! PURPOSE: Library root for cloud query tags.
//! CONTEXT: Exposes the lexer, parser and renderer that turn a tag such as
//! `cloud_total sales region__in=("EU", "US") as eu_us` into a value read
//! from a named cloud.
//!
//! PIPELINE: Tag String --> Lexer --> Tokens --> Parser --> QueryTag --> Renderer
//!
//! SUPPORTED TAGS:
//! - Point values: cloud_value sales region="EU" year=2020
//! - Filtered totals: cloud_total sales region__in=("EU", "US")
//! - Context variables as operands: cloud_value sales region=current_region
//! - Result binding: ... as name

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod token;


pub use ast::{Criterion, OperandExpr, QueryTag, TagKind};
pub use error::{QueryError, QueryResult};
pub use lexer::Lexer;
pub use parser::{parse, ParseError, ParseResult, Parser};
pub use render::{execute, Renderer, TagOutput, Variables};
pub use token::Token;
