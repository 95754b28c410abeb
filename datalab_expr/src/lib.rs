// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expression languages over DataLab rows.
//!
//! Two small languages share one coercion model:
//!
//! - [`filter`]: SQL-like boolean predicates used to keep or drop rows
//!   (`Region = 'West' AND {Unit Price} BETWEEN 10 AND 20`).
//! - [`expression`]: arithmetic used for computed fields and conditional styles
//!   (`({A} + {B}) * 2`, `max(Sales, 0) / 100`).
//!
//! Both compile once into an immutable form ([`ParsedFilter`], [`ParsedExpression`]) that is
//! evaluated against any number of rows. Rows are anything implementing
//! [`RowAccess`](datalab_core::RowAccess).
//!
//! Compile-time problems surface as [`ExprError`] with the byte offset of the offending input.
//! Evaluation does not fail on bad data: an invalid regex is "no match" and a non-numeric cell is
//! `NaN`.
//!
//! ```
//! use datalab_core::Row;
//! use datalab_expr::{compile_filter, try_evaluate};
//!
//! let row = Row::new().with("Region", "West").with("Sales", 250.0);
//! let filter = compile_filter("Region = 'West' AND Sales > 100").unwrap();
//! assert!(filter.matches(&row));
//! assert_eq!(try_evaluate("{Sales} / 100", &row).value, Some(2.5));
//! ```

mod error;
mod lex;
mod scalar;
mod validate;

pub mod expression;
pub mod filter;

pub use error::{ErrorKind, ExprError};
pub use expression::{
    Dialect, Function, Operator, ParsedExpression, RpnToken, compile_expression,
    compile_expression_with, evaluate_expression,
};
pub use filter::{CompareOp, FilterNode, ParsedFilter, compile_filter, evaluate_filter};
pub use scalar::{Scalar, numeric_value};
pub use validate::{
    DEFAULT_PREVIEW_CAP, ExpressionCheck, FilterCheck, MatchCount, count_matches, try_evaluate,
    try_filter,
};
