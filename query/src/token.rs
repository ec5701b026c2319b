//! FILENAME: query/src/token.rs
//! PURPOSE: Token definitions for the query tag lexer.

/// Tokens recognized by the tag lexer.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // Literals
    Integer(i64),
    Number(f64),
    String(String),
    Boolean(bool),
    None,
    /// Tag names, cloud names, criterion keys and context variables.
    Identifier(String),

    // Delimiters
    Equals,
    LParen,
    RParen,
    Comma,

    // Special
    EOF,
    Illegal(char),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Integer(n) => write!(f, "{}", n),
            Token::Number(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Boolean(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Token::None => write!(f, "None"),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Equals => write!(f, "="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::EOF => write!(f, "EOF"),
            Token::Illegal(c) => write!(f, "ILLEGAL({})", c),
        }
    }
}
