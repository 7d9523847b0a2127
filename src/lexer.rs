//! A tokenizer for arithmetic expressions over integers.
//!
//! ```
//! use formlang::lexer::{ArithmeticLexer, TokenKind};
//!
//! let tokens = ArithmeticLexer::new().ignore_whitespace(true).tokenize("(12 + 3) * 4").unwrap();
//! assert_eq!(tokens.len(), 7);
//! assert_eq!(tokens[1].kind, TokenKind::Number);
//! assert_eq!(tokens[1].value, "12");
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::{Itertools, PeekingNext};
use thiserror::Error;

/// The kind of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A run of decimal digits
    Number,
    /// One of `+ - * /`
    Operator,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// A run of whitespace. Only produced if whitespace is not ignored.
    Whitespace,
}

/// A lexeme together with its kind and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was recognized
    pub kind: TokenKind,
    /// The text of the token
    pub value: String,
    /// Byte offset of the first character
    pub position: usize,
}

impl Token {
    fn new<S: Into<String>>(kind: TokenKind, value: S, position: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "[{:?}: {:?}, position: {}]", self.kind, self.value, self.position)
    }
}

/// Errors raised by the [`ArithmeticLexer`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    /// A character that starts no token
    #[error("Invalid character '{character}' at position {position}")]
    InvalidCharacter {
        /// The offending character
        character: char,
        /// Its byte offset
        position: usize,
    },

    /// A `)` without a matching `(`
    #[error("Unmatched ')' at position {0}")]
    UnmatchedParen(usize),

    /// The input ended while parentheses were still open
    #[error("{open} unclosed parentheses at position {position}")]
    UnclosedParen {
        /// Number of `(` without a matching `)`
        open: usize,
        /// Length of the input
        position: usize,
    },
}

/// Splits arithmetic expressions into [`Token`]s and checks that parentheses are balanced.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticLexer {
    ignore_whitespace: bool,
}

fn lex_run<I, F>(chars: &mut I, pred: F) -> String
where
    I: PeekingNext<Item = (usize, char)>,
    F: Fn(char) -> bool,
{
    chars.peeking_take_while(|&(_, c)| pred(c)).map(|(_, c)| c).collect()
}

impl ArithmeticLexer {
    /// Create a lexer that emits whitespace tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop whitespace instead of emitting [`TokenKind::Whitespace`] tokens.
    pub fn ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }

    /// Tokenize `input`.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut chars = input.char_indices().peekable();
        let mut depth = 0usize;

        while let Some(&(position, c)) = chars.peek() {
            if c.is_ascii_digit() {
                let value = lex_run(&mut chars, |c| c.is_ascii_digit());
                tokens.push(Token::new(TokenKind::Number, value, position));
            } else if c.is_whitespace() {
                let value = lex_run(&mut chars, char::is_whitespace);

                if !self.ignore_whitespace {
                    tokens.push(Token::new(TokenKind::Whitespace, value, position));
                }
            } else {
                chars.next();

                let kind = match c {
                    '+' | '-' | '*' | '/' => TokenKind::Operator,
                    '(' => {
                        depth += 1;
                        TokenKind::LeftParen
                    },
                    ')' => {
                        if depth == 0 {
                            return Err(LexError::UnmatchedParen(position));
                        }
                        depth -= 1;
                        TokenKind::RightParen
                    },
                    _ => {
                        return Err(LexError::InvalidCharacter {
                            character: c,
                            position,
                        })
                    },
                };

                tokens.push(Token::new(kind, c, position));
            }
        }

        if depth > 0 {
            return Err(LexError::UnclosedParen {
                open: depth,
                position: input.len(),
            });
        }

        Ok(tokens)
    }
}
