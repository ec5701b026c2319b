//! FILENAME: query/src/lexer.rs
//! PURPOSE: Scans a raw tag string and produces a stream of Tokens.
//! CONTEXT: First stage of tag parsing. Handles whitespace, integer and
//! decimal literals (with a leading minus), single- or double-quoted strings,
//! and identifiers. Identifiers may contain '.' so context variables such as
//! `row.region` stay one token.

use crate::token::Token;
use std::iter::Peekable;
use std::str::Chars;

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    /// Advances the lexer and returns the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.input.next() {
            Some('=') => Token::Equals,
            Some('(') => Token::LParen,
            Some(')') => Token::RParen,
            Some(',') => Token::Comma,

            Some(quote @ ('"' | '\'')) => self.read_string(quote),

            Some('-') => match self.input.peek() {
                Some(&ch) if ch.is_ascii_digit() || ch == '.' => {
                    self.input.next();
                    self.read_number(ch, true)
                }
                _ => Token::Illegal('-'),
            },

            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.read_number(ch, false),

            Some(ch) if is_letter(ch) => self.read_identifier(ch),

            None => Token::EOF,

            Some(ch) => Token::Illegal(ch),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.input.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.input.next();
        }
    }

    /// Reads a string closed by `quote`. A backslash escapes the next character.
    /// An unclosed string is `Illegal(quote)`.
    fn read_string(&mut self, quote: char) -> Token {
        let mut result = String::new();
        while let Some(ch) = self.input.next() {
            if ch == quote {
                return Token::String(result);
            }
            if ch == '\\' {
                if let Some(escaped) = self.input.next() {
                    result.push(escaped);
                }
                continue;
            }
            result.push(ch);
        }
        Token::Illegal(quote)
    }

    fn read_number(&mut self, first_char: char, negative: bool) -> Token {
        let mut number_str = String::new();
        if negative {
            number_str.push('-');
        }
        number_str.push(first_char);
        let mut has_dot = first_char == '.';

        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_digit() {
                number_str.push(ch);
                self.input.next();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                number_str.push(ch);
                self.input.next();
            } else {
                break;
            }
        }

        if !has_dot {
            if let Ok(n) = number_str.parse::<i64>() {
                return Token::Integer(n);
            }
        }
        match number_str.parse::<f64>() {
            Ok(n) => Token::Number(n),
            // e.g. just "."
            Err(_) => Token::Illegal(first_char),
        }
    }

    fn read_identifier(&mut self, first_char: char) -> Token {
        let mut ident = String::from(first_char);

        while let Some(&ch) = self.input.peek() {
            if is_letter(ch) || ch.is_ascii_digit() || ch == '.' {
                ident.push(ch);
                self.input.next();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "True" => Token::Boolean(true),
            "False" => Token::Boolean(false),
            "None" => Token::None,
            _ => Token::Identifier(ident),
        }
    }
}

/// Returns true if `ch` can start an identifier.
fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}
