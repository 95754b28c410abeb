// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recursive-descent parser for the filter language.
//!
//! Precedence, lowest first: `OR`, `AND`, `NOT`, then a single comparison-level operator
//! (`BETWEEN`, `LIKE`/`ILIKE`, `~`/`~*`, or one of `= != <> > >= < <=`).
//!
//! Keywords are plain identifiers compared case-insensitively, so a column named `not`
//! cannot be referenced bare; it needs braces (`{not}`).
//!
//! Nesting through parentheses and `NOT` is limited to `MAX_DEPTH` levels; `AND`/`OR` chains
//! are built as balanced trees.

use super::lexer::{Token, TokenKind};
use super::{CompareOp, FilterNode};
use crate::ExprError;

/// Maximum nesting of parentheses and `NOT` in one filter.
pub(crate) const MAX_DEPTH: usize = 256;

pub(crate) struct Parser<'t, 'src> {
    tokens: &'t [Token<'src>],
    pos: usize,
    depth: usize,
}

impl<'t, 'src> Parser<'t, 'src> {
    /// `tokens` must end with an end-of-input token, as produced by the tokenizer.
    pub(crate) fn new(tokens: &'t [Token<'src>]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    pub(crate) fn parse(mut self) -> Result<FilterNode, ExprError> {
        let root = self.parse_or()?;
        let tk = self.peek();
        if tk.kind != TokenKind::Eof {
            return Err(ExprError::parse(
                format!("unexpected trailing input {}", tk.describe()),
                tk.offset,
            ));
        }
        Ok(root)
    }

    fn peek(&self) -> &'t Token<'src> {
        // The tokenizer always terminates the stream with `Eof`, and `next` never steps past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, ahead: usize) -> Option<&'t Token<'src>> {
        self.tokens.get(self.pos + ahead)
    }

    fn next(&mut self) -> &'t Token<'src> {
        let tk = self.peek();
        if tk.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tk
    }

    fn is_keyword(&self, word: &str) -> bool {
        is_keyword(self.peek(), word)
    }

    fn expect_keyword(&mut self, word: &str) -> Result<(), ExprError> {
        if self.is_keyword(word) {
            self.next();
            return Ok(());
        }
        let tk = self.peek();
        Err(ExprError::parse(
            format!("expected {word} but got {}", tk.describe()),
            tk.offset,
        ))
    }

    fn enter(&mut self, offset: usize) -> Result<(), ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::parse("filter nested too deeply", offset));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_or(&mut self) -> Result<FilterNode, ExprError> {
        let mut operands = vec![self.parse_and()?];
        while self.is_keyword("OR") {
            self.next();
            operands.push(self.parse_and()?);
        }
        Ok(balance(operands, |left, right| FilterNode::Or { left, right }))
    }

    fn parse_and(&mut self) -> Result<FilterNode, ExprError> {
        let mut operands = vec![self.parse_not()?];
        while self.is_keyword("AND") {
            self.next();
            operands.push(self.parse_not()?);
        }
        Ok(balance(operands, |left, right| FilterNode::And { left, right }))
    }

    fn parse_not(&mut self) -> Result<FilterNode, ExprError> {
        if self.is_keyword("NOT") {
            let tk = self.next();
            self.enter(tk.offset)?;
            let expr = self.parse_not()?;
            self.depth -= 1;
            return Ok(FilterNode::Not {
                expr: Box::new(expr),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<FilterNode, ExprError> {
        let left = self.parse_primary()?;

        let negated_between = self.is_keyword("NOT")
            && self.peek_at(1).is_some_and(|tk| is_keyword(tk, "BETWEEN"));
        if self.is_keyword("BETWEEN") || negated_between {
            let not = negated_between;
            if not {
                self.next();
            }
            self.expect_keyword("BETWEEN")?;
            let low = self.parse_primary()?;
            self.expect_keyword("AND")?;
            let high = self.parse_primary()?;
            return Ok(FilterNode::Between {
                not,
                target: Box::new(left),
                low: Box::new(low),
                high: Box::new(high),
            });
        }

        if self.is_keyword("LIKE") || self.is_keyword("ILIKE") || self.is_keyword("NOT") {
            let not = self.is_keyword("NOT");
            if not {
                self.next();
            }
            let ilike = self.is_keyword("ILIKE");
            if ilike {
                self.next();
            } else {
                self.expect_keyword("LIKE")?;
            }
            let pattern = self.parse_primary()?;
            return Ok(FilterNode::Like {
                ilike,
                not,
                value: Box::new(left),
                pattern: Box::new(pattern),
            });
        }

        let tk = self.peek();
        if tk.is_op("~") || tk.is_op("~*") {
            self.next();
            let pattern = self.parse_primary()?;
            return Ok(FilterNode::Regex {
                case_insensitive: tk.text == "~*",
                value: Box::new(left),
                pattern: Box::new(pattern),
            });
        }

        if tk.kind == TokenKind::Op {
            let op = match tk.text {
                "=" => CompareOp::Eq,
                "!=" | "<>" => CompareOp::Ne,
                ">" => CompareOp::Gt,
                ">=" => CompareOp::Ge,
                "<" => CompareOp::Lt,
                "<=" => CompareOp::Le,
                _ => {
                    return Err(ExprError::parse(
                        format!("unexpected operator {}", tk.describe()),
                        tk.offset,
                    ));
                }
            };
            self.next();
            let right = self.parse_primary()?;
            return Ok(FilterNode::Cmp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<FilterNode, ExprError> {
        let tk = self.next();
        match &tk.kind {
            TokenKind::LParen => {
                self.enter(tk.offset)?;
                let expr = self.parse_or()?;
                self.depth -= 1;
                let close = self.next();
                if close.kind != TokenKind::RParen {
                    return Err(ExprError::parse(
                        format!("expected ')' but got {}", close.describe()),
                        close.offset,
                    ));
                }
                Ok(expr)
            }
            TokenKind::Number(v) => Ok(FilterNode::LitNum(*v)),
            TokenKind::Str(s) => Ok(FilterNode::LitStr(s.clone())),
            TokenKind::LBrace => self.parse_braced_name(tk.offset),
            TokenKind::Ident => {
                let word = tk.text;
                Ok(if word.eq_ignore_ascii_case("TRUE") {
                    FilterNode::LitNum(1.0)
                } else if word.eq_ignore_ascii_case("FALSE") {
                    FilterNode::LitNum(0.0)
                } else if word.eq_ignore_ascii_case("NULL") {
                    FilterNode::LitStr(String::new())
                } else {
                    FilterNode::Id(String::from(word))
                })
            }
            _ => Err(ExprError::parse(
                format!("unexpected token {}", tk.describe()),
                tk.offset,
            )),
        }
    }

    /// Collects everything up to the matching `}` as a column name, lexemes joined by single
    /// spaces.
    fn parse_braced_name(&mut self, open_offset: usize) -> Result<FilterNode, ExprError> {
        let mut name = String::new();
        loop {
            let tk = self.next();
            let part = match &tk.kind {
                TokenKind::RBrace => break,
                TokenKind::Eof => {
                    return Err(ExprError::syntax("unclosed '{' in column reference", open_offset));
                }
                TokenKind::LBrace => {
                    return Err(ExprError::parse("unexpected '{' in column reference", tk.offset));
                }
                TokenKind::Str(s) => s.as_str(),
                _ => tk.text,
            };
            if !name.is_empty() {
                name.push(' ');
            }
            name.push_str(part);
        }
        if name.is_empty() {
            return Err(ExprError::parse("empty column reference", open_offset));
        }
        Ok(FilterNode::Id(name))
    }
}

/// Joins a chain of `AND` or `OR` operands into a balanced tree, keeping operand order.
///
/// Both operators are associative, so the tree shape does not change the result, and a long
/// chain stays `log2(n)` deep.
fn balance(
    mut operands: Vec<FilterNode>,
    join: fn(Box<FilterNode>, Box<FilterNode>) -> FilterNode,
) -> FilterNode {
    while operands.len() > 1 {
        let mut next = Vec::with_capacity(operands.len().div_ceil(2));
        let mut iter = operands.into_iter();
        while let Some(left) = iter.next() {
            next.push(match iter.next() {
                Some(right) => join(Box::new(left), Box::new(right)),
                None => left,
            });
        }
        operands = next;
    }
    // Never empty: callers push at least one operand.
    operands.pop().unwrap_or(FilterNode::LitNum(0.0))
}

fn is_keyword(tk: &Token<'_>, word: &str) -> bool {
    tk.kind == TokenKind::Ident && tk.text.eq_ignore_ascii_case(word)
}
