// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned table representation used by the transform pipeline.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashSet;

use crate::{CellValue, Row};

/// Errors returned when building a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The header list is empty.
    EmptyHeaders,
    /// A header name appears more than once.
    DuplicateHeader(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHeaders => f.write_str("table has no headers"),
            Self::DuplicateHeader(name) => write!(f, "duplicate header '{name}'"),
        }
    }
}

impl core::error::Error for TableError {}

/// An owned table: a display name, ordered unique headers, and rows.
///
/// Rows are not required to carry every header; a missing cell reads as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Display name (typically the source file name, plus a transform summary).
    pub name: String,
    /// Column names, in display order.
    pub headers: Vec<String>,
    /// Row data.
    pub rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table with the given headers.
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Result<Self, TableError> {
        if headers.is_empty() {
            return Err(TableError::EmptyHeaders);
        }
        if let Some(dup) = first_duplicate(&headers) {
            return Err(TableError::DuplicateHeader(dup.clone()));
        }
        Ok(Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        })
    }

    /// Replaces the rows of this table.
    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns a header index for a column name, if present.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Appends `column` to the headers if it is not already present.
    ///
    /// Returns `true` if the header was added.
    pub fn ensure_column(&mut self, column: &str) -> bool {
        if self.column_index(column).is_some() {
            return false;
        }
        self.headers.push(String::from(column));
        true
    }

    /// Gets the numeric view of a cell if both the row and the cell exist.
    pub fn f64(&self, row: usize, column: &str) -> Option<f64> {
        self.rows.get(row)?.get(column)?.as_f64()
    }

    /// Returns a copy of `row` laid out in header order, filling absent cells with `Null`.
    ///
    /// Cells for columns not in the headers are dropped.
    pub fn normalize_row(&self, row: &Row) -> Row {
        let mut out = Row::with_capacity(self.headers.len());
        for h in &self.headers {
            let v = row.get(h).cloned().unwrap_or(CellValue::Null);
            out.insert(h.clone(), v);
        }
        out
    }
}

fn first_duplicate(headers: &[String]) -> Option<&String> {
    let mut seen = HashSet::with_capacity(headers.len());
    headers.iter().find(|h| !seen.insert(h.as_str()))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| String::from(*s)).collect()
    }

    #[test]
    fn new_rejects_empty_and_duplicate_headers() {
        assert_eq!(Table::new("t", vec![]), Err(TableError::EmptyHeaders));
        assert_eq!(
            Table::new("t", headers(&["a", "b", "a"])),
            Err(TableError::DuplicateHeader(String::from("a")))
        );
    }

    #[test]
    fn new_keeps_unique_headers_and_push_row_appends() {
        let mut t = Table::new("t", headers(&["b", "a"])).unwrap();
        assert_eq!(t.headers, headers(&["b", "a"]));
        assert_eq!(t.row_count(), 0);
        t.push_row(Row::new().with("a", 1.0));
        t.push_row(Row::new().with("b", CellValue::Null));
        assert_eq!(t.row_count(), 2);
        assert!(t.rows[1].get("b").is_some_and(CellValue::is_null));
        assert!(!t.rows[0].get("a").is_some_and(CellValue::is_null));
    }

    #[test]
    fn normalize_row_fills_nulls_in_header_order() {
        let t = Table::new("t", headers(&["a", "b", "c"])).unwrap();
        let row = Row::new().with("c", 3.0).with("x", "dropped").with("a", "1");
        let n = t.normalize_row(&row);
        let cols: Vec<&str> = n.columns().collect();
        assert_eq!(cols, vec!["a", "b", "c"]);
        assert_eq!(n.get("b"), Some(&CellValue::Null));
        assert!(n.get("x").is_none(), "columns outside the headers are dropped");
    }

    #[test]
    fn ensure_column_appends_once() {
        let mut t = Table::new("t", headers(&["a"])).unwrap();
        assert!(t.ensure_column("avg"));
        assert!(!t.ensure_column("avg"));
        assert_eq!(t.headers, headers(&["a", "avg"]));
    }

    #[test]
    fn f64_reads_numeric_view() {
        let t = Table::new("t", headers(&["a"]))
            .unwrap()
            .with_rows(vec![Row::new().with("a", "2.5"), Row::new().with("a", "n/a")]);
        assert_eq!(t.f64(0, "a"), Some(2.5));
        assert_eq!(t.f64(1, "a"), None);
        assert_eq!(t.f64(2, "a"), None);
    }
}
