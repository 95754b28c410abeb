// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rows and the read-only row view used during evaluation.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::BuildHasher;

use hashbrown::HashMap;

use crate::CellValue;

/// Read-only access to the cells of a single row, keyed by exact column name.
///
/// The expression engine only ever reads through this trait; it never mutates a row.
pub trait RowAccess {
    /// Returns the cell stored under `column`, if present.
    fn cell(&self, column: &str) -> Option<&CellValue>;
}

/// An ordered mapping from column name to cell.
///
/// Column order is insertion order. Lookups go through a hash index.
#[derive(Clone, Debug, Default)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
    index: HashMap<String, usize>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty row with room for `capacity` columns.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Sets `column` to `value`, returning the previous value.
    ///
    /// Replacing an existing column keeps its position.
    pub fn insert(
        &mut self,
        column: impl Into<String>,
        value: impl Into<CellValue>,
    ) -> Option<CellValue> {
        let column = column.into();
        let value = value.into();
        if let Some(&i) = self.index.get(column.as_str()) {
            return Some(core::mem::replace(&mut self.cells[i].1, value));
        }
        self.index.insert(column.clone(), self.cells.len());
        self.cells.push((column, value));
        None
    }

    /// Builder-style [`Row::insert`].
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Returns the cell stored under `column`.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        let &i = self.index.get(column)?;
        self.cells.get(i).map(|(_, v)| v)
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over `(column, cell)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl RowAccess for Row {
    fn cell(&self, column: &str) -> Option<&CellValue> {
        self.get(column)
    }
}

impl<S: BuildHasher> RowAccess for HashMap<String, CellValue, S> {
    fn cell(&self, column: &str) -> Option<&CellValue> {
        self.get(column)
    }
}

impl RowAccess for BTreeMap<String, CellValue> {
    fn cell(&self, column: &str) -> Option<&CellValue> {
        self.get(column)
    }
}

#[cfg(feature = "std")]
impl<S: BuildHasher> RowAccess for std::collections::HashMap<String, CellValue, S> {
    fn cell(&self, column: &str) -> Option<&CellValue> {
        self.get(column)
    }
}
