//! Tokenizer shared by the XDL and JSON parsers.
//!
//! The [`Lexer`] turns UTF-8 text into a stream of [`Spanned`] tokens, each
//! carrying the byte offset where it starts. Whitespace is skipped in both
//! grammars; `//` line comments and `/* */` block comments only in XDL.
//! Keywords (`Y`, `N`, `NUL`, `true`, `NaN`, ...) are plain identifiers here;
//! the parser decides what they mean from their position.
//!
//! ```rust
//! use serde_xdl::lexer::{Lexer, Token};
//! use serde_xdl::Syntax;
//!
//! let tokens: Vec<Token> = Lexer::new("A{x=1.5} // tail", Syntax::Xdl)
//!     .map(|t| t.unwrap().token)
//!     .collect();
//! assert_eq!(
//!     tokens,
//!     vec![
//!         Token::Ident("A".to_string()),
//!         Token::LBrace,
//!         Token::Ident("x".to_string()),
//!         Token::Equals,
//!         Token::Number(1.5),
//!         Token::RBrace,
//!     ]
//! );
//! ```

use crate::{Error, Result, Syntax};

/// A lexical token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Equals,
    Comma,
    Colon,
    /// Quoted string with escapes already resolved.
    Str(String),
    Number(f64),
    /// Bare identifier: tag, key or keyword.
    Ident(String),
}

impl Token {
    /// Short human-readable description used in error messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::Equals => "'='",
            Token::Comma => "','",
            Token::Colon => "':'",
            Token::Str(_) => "string",
            Token::Number(_) => "number",
            Token::Ident(_) => "identifier",
        }
    }
}

/// A token and the byte offset where it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

/// Returns `true` if `s` can be written as a bare XDL identifier.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Tokenizer over a borrowed string.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    syntax: Syntax,
    failed: bool,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str, syntax: Syntax) -> Self {
        Lexer {
            input,
            position: 0,
            syntax,
            failed: false,
        }
    }

    /// Byte offset of the next unread character.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.position += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            while self.peek_char().is_some_and(char::is_whitespace) {
                self.next_char();
            }
            if self.syntax != Syntax::Xdl {
                return Ok(());
            }
            let rest = self.rest();
            if rest.starts_with("//") {
                self.position += rest.find('\n').unwrap_or(rest.len());
            } else if let Some(body) = rest.strip_prefix("/*") {
                match body.find("*/") {
                    Some(end) => self.position += 2 + end + 2,
                    None => {
                        return Err(Error::unexpected_eof(
                            self.input.len(),
                            "end of block comment",
                        ))
                    }
                }
            } else {
                return Ok(());
            }
        }
    }

    /// Returns `true` if the next character after trivia is `expected`.
    ///
    /// Never fails and never consumes anything when the answer is `false`, so
    /// text that will not be parsed is left untokenized.
    pub fn next_is(&mut self, expected: char) -> bool {
        let start = self.position;
        let found = self.skip_trivia().is_ok() && self.peek_char() == Some(expected);
        if !found {
            self.position = start;
        }
        found
    }

    /// Reads the next token, `Ok(None)` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Spanned>> {
        self.skip_trivia()?;
        let offset = self.position;
        let Some(ch) = self.peek_char() else {
            return Ok(None);
        };

        let token = match ch {
            '{' | '}' | '[' | ']' | '(' | ')' | '=' | ',' | ':' => {
                self.next_char();
                match ch {
                    '{' => Token::LBrace,
                    '}' => Token::RBrace,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '=' => Token::Equals,
                    ',' => Token::Comma,
                    _ => Token::Colon,
                }
            }
            '"' => {
                self.next_char();
                Token::Str(self.lex_string()?)
            }
            '-' | '+' | '0'..='9' => Token::Number(self.lex_number()?),
            c if c.is_ascii_alphabetic() || c == '_' => Token::Ident(self.lex_ident().to_string()),
            _ => return Err(Error::syntax(offset, "unexpected character")),
        };

        Ok(Some(Spanned { token, offset }))
    }

    fn lex_ident(&mut self) -> &'a str {
        let start = self.position;
        while self
            .peek_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.next_char();
        }
        &self.input[start..self.position]
    }

    fn lex_digits(&mut self) -> usize {
        let start = self.position;
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.next_char();
        }
        self.position - start
    }

    fn lex_number(&mut self) -> Result<f64> {
        let start = self.position;
        let negative = self.eat('-');
        if !negative && self.eat('+') && self.syntax == Syntax::Json {
            return Err(Error::syntax(start, "leading '+' is not valid JSON"));
        }

        if self.syntax == Syntax::Xdl && self.peek_char().is_some_and(|c| c.is_ascii_alphabetic())
        {
            return match self.lex_ident() {
                "Infinity" if negative => Ok(f64::NEG_INFINITY),
                "Infinity" => Ok(f64::INFINITY),
                _ => Err(Error::syntax(start, "invalid number")),
            };
        }

        let int_start = self.position;
        let int_digits = self.lex_digits();
        if int_digits == 0 {
            return Err(Error::syntax(start, "expected digits"));
        }
        if self.syntax == Syntax::Json && int_digits > 1 && self.input[int_start..].starts_with('0')
        {
            return Err(Error::syntax(start, "leading zeros are not valid JSON"));
        }

        if self.eat('.') && self.lex_digits() == 0 {
            return Err(Error::syntax(self.position, "expected digits after '.'"));
        }

        if self.eat('e') || self.eat('E') {
            if !self.eat('+') {
                self.eat('-');
            }
            if self.lex_digits() == 0 {
                return Err(Error::syntax(self.position, "expected exponent digits"));
            }
        }

        // str::parse is locale independent: '.' is always the radix point.
        self.input[start..self.position]
            .parse::<f64>()
            .map_err(|_| Error::syntax(start, "invalid number"))
    }

    fn lex_string(&mut self) -> Result<String> {
        let mut result = String::new();

        loop {
            let at = self.position;
            let ch = self
                .next_char()
                .ok_or_else(|| Error::unexpected_eof(at, "closing quote"))?;
            match ch {
                '"' => return Ok(result),
                '\\' => {
                    let escaped = self
                        .next_char()
                        .ok_or_else(|| Error::unexpected_eof(self.position, "escape sequence"))?;
                    match escaped {
                        '"' => result.push('"'),
                        '\\' => result.push('\\'),
                        '/' => result.push('/'),
                        'n' => result.push('\n'),
                        'r' => result.push('\r'),
                        't' => result.push('\t'),
                        'b' => result.push('\u{0008}'),
                        'f' => result.push('\u{000C}'),
                        '0' if self.syntax == Syntax::Xdl => result.push('\0'),
                        'u' => result.push(self.lex_unicode_escape(at)?),
                        other => {
                            if self.syntax == Syntax::Json {
                                return Err(Error::syntax(at, "invalid escape sequence"));
                            }
                            // Unknown escape - preserve literally
                            result.push('\\');
                            result.push(other);
                        }
                    }
                }
                c if c < '\u{20}' && self.syntax == Syntax::Json => {
                    return Err(Error::syntax(at, "control character in string"));
                }
                c => result.push(c),
            }
        }
    }

    fn lex_hex4(&mut self, at: usize) -> Result<u32> {
        let rest = self.rest();
        let hex = rest
            .get(..4)
            .filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| {
                Error::syntax(
                    at,
                    "invalid unicode escape sequence (expected 4 hex digits)",
                )
            })?;
        let code = u32::from_str_radix(hex, 16)
            .map_err(|_| Error::syntax(at, "invalid hex in unicode escape"))?;
        self.position += 4;
        Ok(code)
    }

    fn lex_unicode_escape(&mut self, at: usize) -> Result<char> {
        let high = self.lex_hex4(at)?;
        let code = if (0xD800..0xDC00).contains(&high) {
            if !(self.eat('\\') && self.eat('u')) {
                return Err(Error::syntax(at, "unpaired surrogate in unicode escape"));
            }
            let low = self.lex_hex4(at)?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(Error::syntax(at, "invalid low surrogate in unicode escape"));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };
        char::from_u32(code).ok_or_else(|| Error::syntax(at, "invalid unicode code point"))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Spanned>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_token().transpose();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}
