// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar cell values.

extern crate alloc;

use alloc::string::{String, ToString};
use core::fmt;

/// A single table cell.
///
/// Uploaded data arrives mostly as text; numeric, boolean and date cells come from typed
/// sources or from computed columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    /// An absent value.
    #[default]
    Null,
    /// A numeric value (may be non-finite).
    Number(f64),
    /// A boolean value.
    Boolean(bool),
    /// A text value.
    Text(String),
    /// A timestamp in milliseconds since the Unix epoch.
    Date(i64),
}

impl CellValue {
    /// Returns `true` for [`CellValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the numeric view of this cell, if it has one.
    ///
    /// Numbers are returned as is (including `NaN`), booleans map to `1`/`0`, dates to their
    /// epoch milliseconds, and text to its parsed value when it is a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Number(v) => Some(*v),
            Self::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Date(ms) => Some(*ms as f64),
            Self::Text(s) => parse_number(s),
        }
    }

    /// Returns the text rendering of this cell (`Null` renders as the empty string).
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Number(v) => write!(f, "{v}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
            Self::Date(ms) => write!(f, "{ms}"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Parses text as a finite number.
///
/// Surrounding whitespace is ignored. Empty text and non-finite results (`inf`, `NaN`,
/// overflowing exponents) are rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let v: f64 = trimmed.parse().ok()?;
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn text_parses_to_finite_numbers_only() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1e999"), None);
        assert_eq!(parse_number("five"), None);
    }

    #[test]
    fn numeric_view_covers_booleans_and_dates() {
        assert_eq!(CellValue::Boolean(true).as_f64(), Some(1.0));
        assert_eq!(CellValue::Boolean(false).as_f64(), Some(0.0));
        assert_eq!(CellValue::Date(86_400_000).as_f64(), Some(86_400_000.0));
        assert_eq!(CellValue::Null.as_f64(), None);
        assert!(CellValue::Number(f64::NAN).as_f64().unwrap().is_nan());
    }

    #[test]
    fn numbers_render_without_trailing_zero() {
        assert_eq!(CellValue::Number(5.0).to_text(), "5");
        assert_eq!(CellValue::Number(1.5).to_text(), "1.5");
        assert_eq!(CellValue::Null.to_text(), "");
        assert_eq!(CellValue::from(Some("x")).to_text(), "x");
        assert_eq!(CellValue::from(None::<f64>), CellValue::Null);
    }
}
