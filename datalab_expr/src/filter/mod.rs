// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SQL-like filter predicates.
//!
//! Supported surface:
//! - logical `AND`, `OR`, `NOT` and parentheses,
//! - comparisons `= != <> > >= < <=`,
//! - `[NOT] BETWEEN a AND b` (inclusive),
//! - `[NOT] LIKE` / `ILIKE` with `%` and `_` wildcards,
//! - regex match `~ 'pattern'` (case-sensitive) and `~* 'pattern'` (case-insensitive),
//! - literals: numbers, single-quoted strings (`''` escapes a quote), `TRUE`, `FALSE`, `NULL`,
//! - column references: bare identifiers (`Sales`) or braces (`{Unit Price}`).

use std::borrow::Cow;

use datalab_core::RowAccess;

use crate::ExprError;

mod eval;
mod lexer;
mod parser;
mod pattern;

use pattern::PatternCache;

/// Comparison operators of [`FilterNode::Cmp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=` or `<>`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl CompareOp {
    /// Returns the canonical symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }

    fn test<T: PartialOrd + ?Sized>(self, a: &T, b: &T) -> bool {
        match self {
            Self::Eq => a == b,
            Self::Ne => a != b,
            Self::Gt => a > b,
            Self::Ge => a >= b,
            Self::Lt => a < b,
            Self::Le => a <= b,
        }
    }
}

/// A node of a parsed filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// `left OR right`
    Or {
        /// Left operand.
        left: Box<FilterNode>,
        /// Right operand, evaluated only when the left side is falsy.
        right: Box<FilterNode>,
    },
    /// `left AND right`
    And {
        /// Left operand.
        left: Box<FilterNode>,
        /// Right operand, evaluated only when the left side is truthy.
        right: Box<FilterNode>,
    },
    /// `NOT expr`
    Not {
        /// Negated operand.
        expr: Box<FilterNode>,
    },
    /// A binary comparison.
    Cmp {
        /// Operator.
        op: CompareOp,
        /// Left operand.
        left: Box<FilterNode>,
        /// Right operand.
        right: Box<FilterNode>,
    },
    /// `target [NOT] BETWEEN low AND high`
    Between {
        /// Whether the result is negated.
        not: bool,
        /// Tested value.
        target: Box<FilterNode>,
        /// Inclusive lower bound.
        low: Box<FilterNode>,
        /// Inclusive upper bound.
        high: Box<FilterNode>,
    },
    /// `value [NOT] LIKE|ILIKE pattern`
    Like {
        /// `ILIKE` (case-insensitive).
        ilike: bool,
        /// Whether the result is negated.
        not: bool,
        /// Tested value.
        value: Box<FilterNode>,
        /// SQL `LIKE` pattern.
        pattern: Box<FilterNode>,
    },
    /// `value ~ pattern` or `value ~* pattern`
    Regex {
        /// `~*` (case-insensitive).
        case_insensitive: bool,
        /// Tested value.
        value: Box<FilterNode>,
        /// Regular expression.
        pattern: Box<FilterNode>,
    },
    /// Column reference.
    Id(String),
    /// Numeric literal (also `TRUE` / `FALSE`).
    LitNum(f64),
    /// String literal (also `NULL`, which is the empty string).
    LitStr(String),
}

impl FilterNode {
    /// Text of a literal node, as the evaluator would render it.
    pub(crate) fn literal_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::LitStr(s) => Some(Cow::Borrowed(s)),
            Self::LitNum(v) => Some(Cow::Owned(v.to_string())),
            _ => None,
        }
    }
}

/// A compiled filter predicate.
///
/// Compile once with [`compile_filter`], then evaluate against any number of rows. The value
/// is immutable and can be shared across threads.
#[derive(Debug, Clone)]
pub struct ParsedFilter {
    root: FilterNode,
    source: String,
    patterns: PatternCache,
}

impl ParsedFilter {
    /// Returns the root of the predicate tree.
    pub fn root(&self) -> &FilterNode {
        &self.root
    }

    /// Returns the source text this filter was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns `true` if `row` satisfies the predicate.
    pub fn matches(&self, row: &(impl RowAccess + ?Sized)) -> bool {
        eval::Evaluator::new(&self.patterns, row).test(&self.root)
    }
}

impl PartialEq for ParsedFilter {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.source == other.source
    }
}

/// Compiles filter text into a reusable [`ParsedFilter`].
pub fn compile_filter(text: &str) -> Result<ParsedFilter, ExprError> {
    let tokens = lexer::tokenize(text)?;
    let root = parser::Parser::new(&tokens).parse()?;
    let patterns = PatternCache::build(&root);
    tracing::trace!(source = text, "compiled filter");
    Ok(ParsedFilter {
        root,
        source: String::from(text),
        patterns,
    })
}

/// Evaluates a compiled filter against a row.
pub fn evaluate_filter(filter: &ParsedFilter, row: &(impl RowAccess + ?Sized)) -> bool {
    filter.matches(row)
}
