// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row and table model for DataLab.
//!
//! This crate provides:
//! - [`CellValue`], the closed set of scalar types a table cell can hold,
//! - [`Row`], an ordered column-name to cell mapping with indexed lookup,
//! - [`RowAccess`], the read-only view the expression engine evaluates against, and
//! - [`Table`], an owned table (`name`, ordered `headers`, `rows`) used by the transform pipeline.
//!
//! Parsing files into tables is out of scope; callers build rows directly.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod cell;
mod row;
mod table;

pub use cell::{CellValue, parse_number};
pub use row::{Row, RowAccess};
pub use table::{Table, TableError};
