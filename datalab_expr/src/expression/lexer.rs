// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arithmetic language tokenizer.

use super::{Function, Operator};
use crate::ExprError;
use crate::lex::{is_ident_start, scan_ident, scan_number};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Lexeme {
    Num(f64),
    Id(String),
    Fn(Function),
    Op(Operator),
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) lexeme: Lexeme,
    pub(crate) offset: usize,
}

pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>, ExprError> {
    if src.trim().is_empty() {
        return Err(ExprError::syntax("empty expression", 0));
    }
    let mut tokens = Vec::new();
    let mut i = 0;
    while let Some(c) = src[i..].chars().next() {
        if c.is_whitespace() {
            i += c.len_utf8();
            continue;
        }
        let start = i;
        let (lexeme, end) = match c {
            '{' => {
                let (name, end) = read_braced(src, start)?;
                (Lexeme::Id(name), end)
            }
            c if c.is_ascii_digit() || c == '.' => {
                let (value, end) = scan_number(src, start)?;
                (Lexeme::Num(value), end)
            }
            c if is_ident_start(c) => {
                let end = scan_ident(src, start);
                let word = &src[start..end];
                let lexeme = match Function::from_name(word) {
                    Some(f) => Lexeme::Fn(f),
                    None => Lexeme::Id(String::from(word)),
                };
                (lexeme, end)
            }
            '(' => (Lexeme::LParen, start + 1),
            ')' => (Lexeme::RParen, start + 1),
            ',' => (Lexeme::Comma, start + 1),
            _ => {
                let rest = &src[start..];
                let Some(op) = Operator::ALL
                    .iter()
                    .filter(|op| rest.starts_with(op.symbol()))
                    .max_by_key(|op| op.symbol().len())
                else {
                    let message = if matches!(c, '=' | '!' | '&' | '|') {
                        format!("unexpected operator '{c}'")
                    } else {
                        format!("unexpected character '{c}'")
                    };
                    return Err(ExprError::syntax(message, start));
                };
                (Lexeme::Op(*op), start + op.symbol().len())
            }
        };
        tokens.push(Token {
            lexeme,
            offset: start,
        });
        i = end;
    }
    Ok(tokens)
}

/// Reads `{ raw text }` starting at the opening brace; the name is everything up to the
/// first `}`, trimmed.
fn read_braced(src: &str, start: usize) -> Result<(String, usize), ExprError> {
    let Some(len) = src[start + 1..].find('}') else {
        return Err(ExprError::syntax("unclosed '{' in column reference", start));
    };
    let name = src[start + 1..start + 1 + len].trim();
    if name.is_empty() {
        return Err(ExprError::syntax("empty column reference", start));
    }
    Ok((String::from(name), start + len + 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn lexemes(src: &str) -> Vec<Lexeme> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.lexeme)
            .collect()
    }

    #[test]
    fn operators_prefer_the_longest_symbol() {
        assert_eq!(
            lexemes("a>=1&&b!=2"),
            vec![
                Lexeme::Id("a".into()),
                Lexeme::Op(Operator::Ge),
                Lexeme::Num(1.0),
                Lexeme::Op(Operator::And),
                Lexeme::Id("b".into()),
                Lexeme::Op(Operator::Ne),
                Lexeme::Num(2.0),
            ]
        );
    }

    #[test]
    fn braced_names_are_raw_and_trimmed() {
        assert_eq!(
            lexemes("{ Price (USD) } * 2"),
            vec![
                Lexeme::Id("Price (USD)".into()),
                Lexeme::Op(Operator::Mul),
                Lexeme::Num(2.0),
            ]
        );
    }

    #[test]
    fn function_names_are_case_sensitive() {
        assert_eq!(lexemes("sqrt")[0], Lexeme::Fn(Function::Sqrt));
        assert_eq!(lexemes("SQRT")[0], Lexeme::Id("SQRT".into()));
        assert_eq!(lexemes("sqrtx")[0], Lexeme::Id("sqrtx".into()));
    }

    #[test]
    fn minus_after_number_is_an_operator() {
        assert_eq!(
            lexemes("2-1"),
            vec![
                Lexeme::Num(2.0),
                Lexeme::Op(Operator::Sub),
                Lexeme::Num(1.0)
            ]
        );
    }

    #[test]
    fn syntax_errors() {
        for (src, offset) in [
            ("", 0),
            ("   ", 0),
            ("a = b", 2),
            ("!a", 0),
            ("a & b", 2),
            ("a | b", 2),
            ("a # b", 2),
            ("{open", 0),
            ("1 + {  }", 4),
        ] {
            let err = tokenize(src).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Syntax, "{src:?}");
            assert_eq!(err.offset(), Some(offset), "{src:?}");
        }
    }
}
