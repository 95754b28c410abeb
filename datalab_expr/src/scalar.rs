// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coercion of cells into the two-variant comparison value.

use std::borrow::Cow;

use datalab_core::CellValue;

/// A coerced value: every literal, column lookup and sub-result reduces to one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A number.
    Num(f64),
    /// A string.
    Str(String),
}

impl Scalar {
    /// Coerces a looked-up cell the way the filter language does.
    ///
    /// Numeric cells stay numeric (even `NaN`), absent and `Null` cells become the empty
    /// string, and everything else is numeric when it converts to a finite number.
    pub fn from_cell(cell: Option<&CellValue>) -> Self {
        match cell {
            None | Some(CellValue::Null) => Self::Str(String::new()),
            Some(CellValue::Number(v)) => Self::Num(*v),
            Some(other) => match other.as_f64() {
                Some(v) if v.is_finite() => Self::Num(v),
                _ => Self::Str(other.to_text()),
            },
        }
    }

    pub(crate) fn from_bool(b: bool) -> Self {
        Self::Num(if b { 1.0 } else { 0.0 })
    }

    /// `Num` is truthy iff non-zero and not `NaN`; `Str` iff non-empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Num(v) => is_truthy_f64(*v),
            Self::Str(s) => !s.is_empty(),
        }
    }

    /// Returns the number if this is a finite `Num`.
    pub fn finite(&self) -> Option<f64> {
        match self {
            Self::Num(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Returns the string rendering used for lexicographic comparison and pattern matching.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Num(v) => Cow::Owned(v.to_string()),
            Self::Str(s) => Cow::Borrowed(s),
        }
    }
}

pub(crate) fn is_truthy_f64(v: f64) -> bool {
    v != 0.0 && !v.is_nan()
}

/// Coerces a looked-up cell the way the arithmetic language does.
///
/// Absent, `Null`, empty and non-numeric text cells all become `NaN`.
pub fn numeric_value(cell: Option<&CellValue>) -> f64 {
    cell.and_then(CellValue::as_f64).unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_coercion_prefers_numbers() {
        assert_eq!(Scalar::from_cell(Some(&CellValue::from("5"))), Scalar::Num(5.0));
        assert_eq!(
            Scalar::from_cell(Some(&CellValue::from("five"))),
            Scalar::Str("five".into())
        );
        assert_eq!(Scalar::from_cell(Some(&CellValue::Boolean(true))), Scalar::Num(1.0));
        assert_eq!(Scalar::from_cell(Some(&CellValue::Date(10))), Scalar::Num(10.0));
        assert_eq!(Scalar::from_cell(None), Scalar::Str(String::new()));
        assert_eq!(Scalar::from_cell(Some(&CellValue::Null)), Scalar::Str(String::new()));
        assert_eq!(Scalar::from_cell(Some(&CellValue::from(""))), Scalar::Str(String::new()));
    }

    #[test]
    fn null_differs_between_languages() {
        assert_eq!(Scalar::from_cell(None), Scalar::Str(String::new()));
        assert!(numeric_value(None).is_nan());
        assert!(numeric_value(Some(&CellValue::from(""))).is_nan());
        assert_eq!(numeric_value(Some(&CellValue::Number(0.0))), 0.0);
    }

    #[test]
    fn truthiness() {
        assert!(Scalar::Num(2.0).is_truthy());
        assert!(!Scalar::Num(0.0).is_truthy());
        assert!(!Scalar::Num(f64::NAN).is_truthy());
        assert!(Scalar::Str("x".into()).is_truthy());
        assert!(!Scalar::Str(String::new()).is_truthy());
    }
}
