// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Table transforms for DataLab.
//!
//! This crate provides:
//! - a small transform IR ([`Transform`]) for row filters, row averages, computed fields and
//!   table appends,
//! - a full-recompute executor ([`Program`] / [`CompiledProgram`]) that compiles every
//!   expression once before touching rows, and
//! - conditional styles ([`ConditionalStyles`]) that map rows to visual overrides.
//!
//! ```
//! use datalab_core::{Row, Table};
//! use datalab_transforms::{Program, Transform};
//!
//! let base = Table::new("sales.csv", vec!["Region".into(), "Sales".into()])
//!     .unwrap()
//!     .with_rows(vec![
//!         Row::new().with("Region", "West").with("Sales", 120.0),
//!         Row::new().with("Region", "East").with("Sales", 80.0),
//!     ]);
//! let out = Program::new()
//!     .with(Transform::filter("Sales > 100"))
//!     .with(Transform::compute("Hundreds", "{Sales} / 100"))
//!     .apply(&base)
//!     .unwrap();
//! assert_eq!(out.row_count(), 1);
//! assert_eq!(out.name, "sales.csv | Where: Sales > 100 + Hundreds = {Sales} / 100");
//! ```

mod program;
mod style;
mod transform;


pub use program::{CompiledProgram, ExecutionError, Program};
pub use style::{ConditionalStyles, StyleError, StyleOverride, StyleRule};
pub use transform::{FilterOp, FilterValue, Transform, summarize_transforms};
