// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Non-failing wrappers for validating user input while it is being typed.

use datalab_core::RowAccess;

use crate::{ExprError, compile_expression, compile_filter};

/// Rows examined by [`count_matches`] when previewing a filter.
pub const DEFAULT_PREVIEW_CAP: usize = 5000;

/// Outcome of [`try_filter`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCheck {
    /// The filter compiled and evaluated against the sample row.
    pub ok: bool,
    /// Why the filter was rejected.
    pub error: Option<ExprError>,
}

/// Outcome of [`try_evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionCheck {
    /// The result, or `None` when it is not finite or the expression is invalid.
    pub value: Option<f64>,
    /// Why the expression was rejected.
    pub error: Option<ExprError>,
}

/// Outcome of [`count_matches`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCount {
    /// The filter compiled.
    pub ok: bool,
    /// Matching rows among those examined; `0` when the filter is invalid.
    pub count: usize,
    /// Why the filter was rejected.
    pub error: Option<ExprError>,
}

/// Checks that `text` compiles as a filter.
///
/// Filter evaluation cannot fail once compiled, so `row` is not evaluated; it is taken to
/// keep the signature in line with [`try_evaluate`].
pub fn try_filter(text: &str, _row: &(impl RowAccess + ?Sized)) -> FilterCheck {
    match compile_filter(text) {
        Ok(_) => FilterCheck {
            ok: true,
            error: None,
        },
        Err(err) => FilterCheck {
            ok: false,
            error: Some(err),
        },
    }
}

/// Compiles `text` and evaluates it against `row`.
///
/// Non-finite results (`NaN`, infinities) are reported as `None` without an error.
pub fn try_evaluate(text: &str, row: &(impl RowAccess + ?Sized)) -> ExpressionCheck {
    match compile_expression(text).and_then(|expr| expr.evaluate(row)) {
        Ok(value) => ExpressionCheck {
            value: value.is_finite().then_some(value),
            error: None,
        },
        Err(err) => ExpressionCheck {
            value: None,
            error: Some(err),
        },
    }
}

/// Counts rows matching a filter, examining at most `cap` rows from the front of `rows`.
///
/// The filter is compiled once.
pub fn count_matches<R: RowAccess>(rows: &[R], text: &str, cap: usize) -> MatchCount {
    let filter = match compile_filter(text) {
        Ok(filter) => filter,
        Err(err) => {
            return MatchCount {
                ok: false,
                count: 0,
                error: Some(err),
            };
        }
    };
    let count = rows
        .iter()
        .take(cap)
        .filter(|row| filter.matches(*row))
        .count();
    if rows.len() > cap {
        tracing::debug!(examined = cap, total = rows.len(), "filter preview capped");
    }
    MatchCount {
        ok: true,
        count,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use datalab_core::{CellValue, Row};

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn try_filter_reports_compile_errors() {
        let row = Row::new().with("A", 1.0);
        assert_eq!(
            try_filter("A > 0", &row),
            FilterCheck {
                ok: true,
                error: None
            }
        );
        let check = try_filter("A >", &row);
        assert!(!check.ok);
        assert_eq!(check.error.map(|e| e.kind()), Some(ErrorKind::Parse));
        let check = try_filter("A = 'x", &row);
        assert_eq!(check.error.map(|e| e.kind()), Some(ErrorKind::Syntax));
    }

    #[test]
    fn deeply_nested_filters_are_rejected_not_fatal() {
        let row = Row::new();
        let nots = format!("{}1", "NOT ".repeat(10_000));
        let parens = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        for text in [nots, parens] {
            let check = try_filter(&text, &row);
            assert!(!check.ok);
            assert_eq!(check.error.map(|e| e.kind()), Some(ErrorKind::Parse));
            assert!(!count_matches(&[Row::new()], &text, 1).ok);
        }
        let chain = vec!["{x} = 1"; 20_000].join(" OR ");
        assert_eq!(count_matches(&[Row::new().with("x", 1.0)], &chain, 1).count, 1);
    }

    #[test]
    fn try_evaluate_hides_non_finite_results() {
        let row = Row::new().with("A", 1.0).with("B", 0.0);
        assert_eq!(try_evaluate("{A}/{B}", &row).value, None);
        assert_eq!(try_evaluate("{A}/{B}", &row).error, None);
        assert_eq!(try_evaluate("A + 1", &row).value, Some(2.0));
        assert_eq!(try_evaluate("ln(B)", &row).value, None, "-inf is not finite");
        let check = try_evaluate("A +", &row);
        assert_eq!(check.value, None);
        assert!(check.error.is_some(), "invalid text carries an error");
    }

    #[test]
    fn count_matches_respects_cap() {
        let rows: Vec<Row> = (0..10).map(|i| Row::new().with("n", f64::from(i))).collect();
        let all = count_matches(&rows, "n >= 5", DEFAULT_PREVIEW_CAP);
        assert_eq!(
            all,
            MatchCount {
                ok: true,
                count: 5,
                error: None
            }
        );
        assert_eq!(count_matches(&rows, "n >= 5", 7).count, 2);
        assert_eq!(count_matches(&rows, "n >= 5", 0).count, 0);
        let bad = count_matches(&rows, "n >=", 7);
        assert!(!bad.ok);
        assert_eq!(bad.count, 0);
    }

    #[test]
    fn end_to_end_filter_and_compute() {
        let rows = [
            Row::new().with("Region", "West").with("Sales", 100.0),
            Row::new().with("Region", "East").with("Sales", 200.0),
            Row::new().with("Region", "West").with("Sales", 50.0),
        ];
        let filter = compile_filter("Region = 'West' AND Sales >= 60").unwrap();
        let kept: Vec<&Row> = rows.iter().filter(|r| filter.matches(*r)).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].get("Sales"), Some(&CellValue::Number(100.0)));

        let expr = compile_expression("{Sales} / 100").unwrap();
        let values: Vec<f64> = rows[..2]
            .iter()
            .map(|r| expr.evaluate(r).unwrap())
            .collect();
        assert_eq!(values, [1.0, 2.0]);
    }
}
