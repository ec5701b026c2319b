//! FILENAME: query/src/parser.rs
//! PURPOSE: Recursive descent parser that turns tag tokens into a QueryTag.
//! CONTEXT: Second stage of tag parsing. Criterion keys are kept verbatim;
//! splitting `axis__lookup` happens at render time against the cloud.
//!
//! GRAMMAR:
//!   tag       --> KIND IDENTIFIER criterion* ("as" IDENTIFIER)?
//!   criterion --> IDENTIFIER "=" operand
//!   operand   --> STRING | INTEGER | NUMBER | BOOLEAN | "None" | IDENTIFIER
//!               | "(" operand ("," operand)* ","? ")"

use crate::ast::{Criterion, OperandExpr, QueryTag, TagKind};
use crate::lexer::Lexer;
use crate::token::Token;
use cloud_engine::Value;

/// Parser errors with descriptive messages.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    /// One token of lookahead, needed to tell `as name` from a criterion keyed `as`.
    peek_token: Token,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        let peek_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
            peek_token,
        }
    }

    /// Parses the entire input as a single tag.
    pub fn parse(&mut self) -> ParseResult<QueryTag> {
        if self.current_token == Token::EOF {
            return Err(ParseError::new("Empty tag"));
        }

        let kind = match &self.current_token {
            Token::Identifier(name) => TagKind::from_name(name)
                .ok_or_else(|| ParseError::new(format!("Unknown tag '{}'", name)))?,
            other => {
                return Err(ParseError::new(format!("Expected tag name, got {}", other)));
            }
        };
        self.advance();

        let cloud = self.expect_identifier("cloud name")?;

        let mut criteria = Vec::new();
        let mut bind_as = None;
        while self.current_token != Token::EOF {
            if self.is_binding() {
                self.advance();
                bind_as = Some(self.expect_identifier("variable name after 'as'")?);
                break;
            }
            criteria.push(self.parse_criterion()?);
        }

        if self.current_token != Token::EOF {
            return Err(ParseError::new(format!(
                "Unexpected token after binding: {}",
                self.current_token
            )));
        }

        Ok(QueryTag {
            kind,
            cloud,
            criteria,
            bind_as,
        })
    }

    fn advance(&mut self) {
        self.current_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.current_token == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "Expected {}, got {}",
                expected, self.current_token
            )))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> ParseResult<String> {
        match self.current_token.clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(ParseError::new(format!("Expected {}, got {}", what, other))),
        }
    }

    fn is_binding(&self) -> bool {
        matches!(&self.current_token, Token::Identifier(word) if word == "as")
            && self.peek_token != Token::Equals
    }

    fn parse_criterion(&mut self) -> ParseResult<Criterion> {
        let key = self.expect_identifier("criterion key")?;
        self.expect(Token::Equals)?;
        let operand = self.parse_operand()?;
        Ok(Criterion::new(key, operand))
    }

    fn parse_operand(&mut self) -> ParseResult<OperandExpr> {
        let operand = match self.current_token.clone() {
            Token::String(s) => OperandExpr::Literal(Value::Text(s)),
            Token::Integer(n) => OperandExpr::Literal(Value::Int(n)),
            Token::Number(n) => OperandExpr::Literal(Value::number(n)),
            Token::Boolean(b) => OperandExpr::Literal(Value::Bool(b)),
            Token::None => OperandExpr::Literal(Value::None),
            Token::Identifier(name) => OperandExpr::Variable(name),
            Token::LParen => {
                self.advance();
                return self.parse_list();
            }
            other => {
                return Err(ParseError::new(format!("Expected operand, got {}", other)));
            }
        };
        self.advance();
        Ok(operand)
    }

    /// Parses the items of a parenthesized list; the opening paren is consumed.
    fn parse_list(&mut self) -> ParseResult<OperandExpr> {
        let mut items = Vec::new();
        if self.current_token == Token::RParen {
            return Err(ParseError::new("Empty operand list"));
        }

        loop {
            items.push(self.parse_operand()?);
            match self.current_token {
                Token::Comma => {
                    self.advance();
                    if self.current_token == Token::RParen {
                        self.advance();
                        break;
                    }
                }
                Token::RParen => {
                    self.advance();
                    break;
                }
                ref other => {
                    return Err(ParseError::new(format!(
                        "Expected ',' or ')' in operand list, got {}",
                        other
                    )));
                }
            }
        }

        Ok(OperandExpr::List(items))
    }
}

/// Convenience function to parse a tag string.
pub fn parse(input: &str) -> ParseResult<QueryTag> {
    let mut parser = Parser::new(input);
    parser.parse()
}
