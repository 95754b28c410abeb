// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filter language tokenizer.

use crate::ExprError;
use crate::lex::{is_ident_start, scan_ident, scan_number};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident,
    LBrace,
    RBrace,
    LParen,
    RParen,
    /// Unescaped string literal contents.
    Str(String),
    Number(f64),
    /// One of `= != <> > >= < <= ~ ~*`; the symbol is the token text.
    Op,
    Comma,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token<'a> {
    pub(crate) kind: TokenKind,
    /// Source lexeme (empty for end-of-input).
    pub(crate) text: &'a str,
    /// Byte offset of the lexeme.
    pub(crate) offset: usize,
}

impl Token<'_> {
    pub(crate) fn is_op(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Op && self.text == symbol
    }

    pub(crate) fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => String::from("end of input"),
            _ => format!("'{}'", self.text),
        }
    }
}

const TWO_CHAR_OPS: [&str; 5] = [">=", "<=", "!=", "<>", "~*"];

/// Splits filter text into tokens, always terminated by an end-of-input token.
pub(crate) fn tokenize(src: &str) -> Result<Vec<Token<'_>>, ExprError> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while let Some(c) = src[i..].chars().next() {
        if c.is_whitespace() {
            i += c.len_utf8();
            continue;
        }
        let start = i;
        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '\'' => {
                let (value, end) = read_string(src, start)?;
                tokens.push(Token {
                    kind: TokenKind::Str(value),
                    text: &src[start..end],
                    offset: start,
                });
                i = end;
                continue;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let (value, end) = scan_number(src, start)?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    text: &src[start..end],
                    offset: start,
                });
                i = end;
                continue;
            }
            c if is_ident_start(c) => {
                let end = scan_ident(src, start);
                tokens.push(Token {
                    kind: TokenKind::Ident,
                    text: &src[start..end],
                    offset: start,
                });
                i = end;
                continue;
            }
            _ => {
                let rest = &src[start..];
                let len = if TWO_CHAR_OPS.iter().any(|op| rest.starts_with(op)) {
                    2
                } else if matches!(c, '=' | '<' | '>' | '~') {
                    1
                } else {
                    return Err(ExprError::syntax(
                        format!("unexpected character '{c}'"),
                        start,
                    ));
                };
                tokens.push(Token {
                    kind: TokenKind::Op,
                    text: &src[start..start + len],
                    offset: start,
                });
                i = start + len;
                continue;
            }
        };
        i += c.len_utf8();
        tokens.push(Token {
            kind,
            text: &src[start..i],
            offset: start,
        });
    }
    tokens.push(Token {
        kind: TokenKind::Eof,
        text: "",
        offset: src.len(),
    });
    Ok(tokens)
}

/// Reads a single-quoted string starting at the opening quote; `''` is an escaped quote.
///
/// Returns the unescaped value and the offset just past the closing quote.
fn read_string(src: &str, start: usize) -> Result<(String, usize), ExprError> {
    let mut out = String::new();
    let mut chars = src[start + 1..].char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\'' {
            if matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
                out.push('\'');
                continue;
            }
            return Ok((out, start + 1 + i + 1));
        }
        out.push(c);
    }
    Err(ExprError::syntax("unclosed string literal", start))
}
