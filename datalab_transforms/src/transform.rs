// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform IR types.

use std::fmt::Write as _;

use datalab_core::Table;

/// Operators for [`Transform::FilterRows`].
///
/// Cells and values are compared as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    /// Cell equals the value.
    Eq,
    /// Cell differs from the value.
    Neq,
    /// Cell contains the value as a substring.
    Contains,
    /// Cell equals one of the values.
    In,
}

impl FilterOp {
    /// Returns the short name used in summaries.
    pub fn name(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Contains => "contains",
            Self::In => "in",
        }
    }
}

/// Right-hand side of a [`Transform::FilterRows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// A single value. For [`FilterOp::In`] it is split on `,` and each part trimmed.
    One(String),
    /// A list of values; only meaningful for [`FilterOp::In`].
    Many(Vec<String>),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::One(String::from(value))
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(String::from).collect())
    }
}

/// A table transform. Transforms run in order, each over the previous output.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Keep rows whose cell in `column` satisfies a text comparison.
    FilterRows {
        /// Column to read.
        column: String,
        /// Comparison.
        op: FilterOp,
        /// Value(s) to compare against.
        value: FilterValue,
        /// Compare without lower-casing both sides.
        case_sensitive: bool,
    },
    /// Keep rows matching a filter-language predicate.
    FilterExpr {
        /// Predicate source text.
        expression: String,
    },
    /// Write the mean of the numeric cells among `columns` to `out_column`.
    ///
    /// The output is `Null` when none of the cells are numeric.
    RowAverage {
        /// Columns to average.
        columns: Vec<String>,
        /// Output column; appended to the headers if new.
        out_column: String,
    },
    /// Write an arithmetic expression's value to the `name` column.
    ///
    /// Non-finite results are written as `Null`.
    Compute {
        /// Output column; appended to the headers if new.
        name: String,
        /// Expression source text.
        expression: String,
    },
    /// Append the rows of another table, taking the union of both header lists.
    Append {
        /// Table to append.
        other: Table,
    },
}

impl Transform {
    /// A case-insensitive [`Transform::FilterRows`].
    pub fn filter_rows(
        column: impl Into<String>,
        op: FilterOp,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self::FilterRows {
            column: column.into(),
            op,
            value: value.into(),
            case_sensitive: false,
        }
    }

    /// A [`Transform::FilterExpr`].
    pub fn filter(expression: impl Into<String>) -> Self {
        Self::FilterExpr {
            expression: expression.into(),
        }
    }

    /// A [`Transform::RowAverage`].
    pub fn row_average<I, S>(columns: I, out_column: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RowAverage {
            columns: columns.into_iter().map(Into::into).collect(),
            out_column: out_column.into(),
        }
    }

    /// A [`Transform::Compute`].
    pub fn compute(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::Compute {
            name: name.into(),
            expression: expression.into(),
        }
    }

    /// A [`Transform::Append`].
    pub fn append(other: Table) -> Self {
        Self::Append { other }
    }

    /// Sets `case_sensitive` on a [`Transform::FilterRows`]; other transforms are unchanged.
    #[must_use]
    pub fn case_sensitive(mut self, value: bool) -> Self {
        if let Self::FilterRows { case_sensitive, .. } = &mut self {
            *case_sensitive = value;
        }
        self
    }

    /// Returns the short human-readable label used in table names.
    pub fn label(&self) -> String {
        match self {
            Self::FilterRows {
                column, op, value, ..
            } => {
                let value = match value {
                    FilterValue::One(v) => json_quote(v),
                    FilterValue::Many(vs) => format!("[{}]", vs.join(", ")),
                };
                format!("Filter: {column} {} {value}", op.name())
            }
            Self::FilterExpr { expression } => format!("Where: {expression}"),
            Self::RowAverage {
                columns,
                out_column,
            } => format!("RowAvg({}) -> {out_column}", columns.join(",")),
            Self::Compute { name, expression } => format!("{name} = {expression}"),
            Self::Append { other } => format!("Append({})", other.name),
        }
    }
}

/// Joins transform labels with `" + "`; empty for no transforms.
pub fn summarize_transforms(transforms: &[Transform]) -> String {
    transforms
        .iter()
        .map(Transform::label)
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Quotes a string the way a JSON encoder would.
fn json_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if u32::from(c) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
