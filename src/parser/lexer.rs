//! Lexer (tokenizer) for Mima assembly source
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the
//! assembler. Newlines are significant (the grammar is line-oriented), so
//! they are emitted as tokens rather than skipped; `;` comments run to the
//! end of the line.

use std::fmt;

/// A position in the source text (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        SourceLocation { line, column }
    }
}

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that assembly errors can
/// report an accurate line without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Label, mnemonic or directive name
    Ident(String, SourceLocation),
    /// Decimal or `0x` hexadecimal literal, possibly negative
    Number(i32, SourceLocation),
    /// `:` after a label
    Colon(SourceLocation),
    /// `*` of a location-counter directive
    Star(SourceLocation),
    /// `=` of a location-counter directive
    Eq(SourceLocation),
    /// End of a source line
    Newline(SourceLocation),
    /// End of input
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::Ident(_, loc)
            | Token::Number(_, loc)
            | Token::Colon(loc)
            | Token::Star(loc)
            | Token::Eq(loc)
            | Token::Newline(loc)
            | Token::Eof(loc) => *loc,
        }
    }
}

/// Lexer error type
#[derive(Debug)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lex error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Tokenizer over the full source text.
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = matches!(token, Token::Eof(_));
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_blanks_and_comments();

        let loc = SourceLocation::new(self.line, self.column);
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::Eof(loc)),
        };

        match c {
            '\n' => {
                self.bump();
                Ok(Token::Newline(loc))
            }
            ':' => {
                self.bump();
                Ok(Token::Colon(loc))
            }
            '*' => {
                self.bump();
                Ok(Token::Star(loc))
            }
            '=' => {
                self.bump();
                Ok(Token::Eq(loc))
            }
            c if c.is_ascii_digit() || c == '-' => self.lex_number(loc),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.lex_ident(loc)),
            c => Err(LexError {
                message: format!("unexpected character '{}'", c),
                location: loc,
            }),
        }
    }

    /// Skip spaces, tabs, carriage returns and `;` comments, but not newlines.
    fn skip_blanks_and_comments(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                ';' => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_number(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let negative = self.peek() == Some('-');
        if negative {
            self.bump();
        }

        let hex = self.peek() == Some('0') && matches!(self.peek_at(1), Some('x') | Some('X'));
        if hex {
            self.bump();
            self.bump();
        }

        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                digits.push(c);
                self.bump();
            } else {
                break;
            }
        }

        let radix = if hex { 16 } else { 10 };
        let parsed = i64::from_str_radix(&digits.replace('_', ""), radix);
        match parsed {
            Ok(magnitude) if magnitude <= i32::MAX as i64 => {
                let value = if negative { -magnitude } else { magnitude } as i32;
                Ok(Token::Number(value, loc))
            }
            _ => Err(LexError {
                message: format!("malformed number '{}'", digits),
                location: loc,
            }),
        }
    }

    fn lex_ident(&mut self, loc: SourceLocation) -> Token {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Token::Ident(name, loc)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn bump(&mut self) {
        if let Some(c) = self.chars.get(self.position) {
            if *c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize().expect("lexing failed")
    }

    #[test]
    fn test_basic_line() {
        let toks = tokens("START: LDV 5\n");
        assert!(matches!(&toks[0], Token::Ident(name, _) if name == "START"));
        assert!(matches!(toks[1], Token::Colon(_)));
        assert!(matches!(&toks[2], Token::Ident(name, _) if name == "LDV"));
        assert!(matches!(toks[3], Token::Number(5, _)));
        assert!(matches!(toks[4], Token::Newline(_)));
        assert!(matches!(toks[5], Token::Eof(_)));
    }

    #[test]
    fn test_hex_and_negative_numbers() {
        let toks = tokens("0x1F -42 -0x10");
        assert!(matches!(toks[0], Token::Number(0x1F, _)));
        assert!(matches!(toks[1], Token::Number(-42, _)));
        assert!(matches!(toks[2], Token::Number(-16, _)));
    }

    #[test]
    fn test_comments_are_skipped() {
        let toks = tokens("HALT ; stop here\n; full-line comment\n");
        assert!(matches!(&toks[0], Token::Ident(name, _) if name == "HALT"));
        assert!(matches!(toks[1], Token::Newline(_)));
        assert!(matches!(toks[2], Token::Newline(_)));
        assert!(matches!(toks[3], Token::Eof(_)));
    }

    #[test]
    fn test_locations_track_lines() {
        let toks = tokens("A\nB\n");
        assert_eq!(toks[0].location().line, 1);
        assert_eq!(toks[2].location().line, 2);
    }

    #[test]
    fn test_origin_directive_tokens() {
        let toks = tokens("* = 0x100\n");
        assert!(matches!(toks[0], Token::Star(_)));
        assert!(matches!(toks[1], Token::Eq(_)));
        assert!(matches!(toks[2], Token::Number(0x100, _)));
    }

    #[test]
    fn test_malformed_number_rejected() {
        assert!(Lexer::new("12ab").tokenize().is_err());
        assert!(Lexer::new("0xZZ").tokenize().is_err());
    }
}
