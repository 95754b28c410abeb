// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! RPN stack machine.

use datalab_core::RowAccess;
use smallvec::SmallVec;

use super::RpnToken;
use crate::ExprError;
use crate::scalar::numeric_value;

pub(super) fn evaluate<R: RowAccess + ?Sized>(rpn: &[RpnToken], row: &R) -> Result<f64, ExprError> {
    let mut stack: SmallVec<[f64; 16]> = SmallVec::new();
    for token in rpn {
        match token {
            RpnToken::Num(v) => stack.push(*v),
            RpnToken::Id(name) => stack.push(numeric_value(row.cell(name))),
            RpnToken::Op(op) => {
                let (Some(b), Some(a)) = (stack.pop(), stack.pop()) else {
                    return Err(underflow(op.symbol()));
                };
                stack.push(op.apply(a, b));
            }
            RpnToken::Fn(func) => {
                let Some(start) = stack.len().checked_sub(func.arity()) else {
                    return Err(underflow(func.name()));
                };
                let value = func.apply(&stack[start..]);
                stack.truncate(start);
                stack.push(value);
            }
        }
    }
    match stack.as_slice() {
        [value] => Ok(*value),
        rest => Err(ExprError::evaluation(format!(
            "expected one result but {} values remain",
            rest.len()
        ))),
    }
}

fn underflow(what: &str) -> ExprError {
    ExprError::evaluation(format!("stack underflow at '{what}'"))
}

#[cfg(test)]
mod tests {
    use datalab_core::{CellValue, Row};

    use super::*;
    use crate::expression::{Operator, compile_expression};
    use crate::{Dialect, ErrorKind, compile_expression_with};

    fn eval(src: &str, row: &Row) -> f64 {
        compile_expression(src).unwrap().evaluate(row).unwrap()
    }

    fn ab(a: f64, b: f64) -> Row {
        Row::new().with("A", a).with("B", b)
    }

    #[test]
    fn precedence_examples() {
        let row = ab(1.0, 3.0);
        assert_eq!(eval("{A} + {B} * 2", &row), 7.0);
        assert_eq!(eval("({A} + {B}) * 2", &row), 8.0);
        assert_eq!(eval("2^3^2", &row), 512.0);
        assert_eq!(eval("A + B * 2", &row), 7.0);
    }

    #[test]
    fn unary_minus() {
        let row = ab(4.0, 3.0);
        assert_eq!(eval("-A", &row), -4.0);
        assert_eq!(eval("2 * -3", &row), -6.0);
        assert_eq!(eval("-2 ^ 2", &row), -4.0);
        assert_eq!(eval("2 ^ -1", &row), 0.5);
        assert_eq!(eval("- -A", &row), 4.0);
        assert_eq!(eval("B - -A", &row), 7.0);
        assert_eq!(eval("+A", &row), 4.0);
    }

    #[test]
    fn division_by_zero_is_nan() {
        assert!(eval("{A} / {B}", &ab(1.0, 0.0)).is_nan());
        assert!(eval("0 / 0", &Row::new()).is_nan());
    }

    #[test]
    fn missing_and_non_numeric_cells_are_nan() {
        let row = Row::new()
            .with("empty", "")
            .with("text", "abc")
            .with("padded", " 12 ")
            .with("null", CellValue::Null)
            .with("zero", 0.0);
        assert!(eval("missing + 1", &row).is_nan());
        assert!(eval("empty + 1", &row).is_nan());
        assert!(eval("text + 1", &row).is_nan());
        assert!(eval("null + 1", &row).is_nan());
        assert_eq!(eval("padded + 1", &row), 13.0);
        assert_eq!(eval("zero + 1", &row), 1.0);
    }

    #[test]
    fn functions_and_extended_operators() {
        let row = ab(-9.0, 100.0);
        assert_eq!(eval("sqrt(abs(A))", &row), 3.0);
        assert!((eval("log(B)", &row) - 2.0).abs() < 1e-12);
        assert_eq!(eval("max(A, B) - min(A, B)", &row), 109.0);
        assert!(eval("min(A, missing)", &row).is_nan());
        assert_eq!(eval("A < 0 && B > 50", &row), 1.0);
        assert_eq!(eval("A > 0 || B == 100", &row), 1.0);
        assert_eq!(eval("(A != A) + (B >= 100)", &row), 1.0);
    }

    #[test]
    fn booleans_and_dates_are_numeric() {
        let row = Row::new()
            .with("flag", true)
            .with("when", CellValue::Date(86_400_000));
        assert_eq!(eval("flag * 10", &row), 10.0);
        assert_eq!(eval("when / 86400000", &row), 1.0);
    }

    #[test]
    fn arithmetic_dialect_evaluates_the_same() {
        let row = ab(2.0, 5.0);
        let strict = compile_expression_with("A * (B - 1) ^ 2", Dialect::Arithmetic).unwrap();
        let extended = compile_expression("A * (B - 1) ^ 2").unwrap();
        assert_eq!(strict.evaluate(&row), extended.evaluate(&row));
        assert_eq!(strict.evaluate(&row), Ok(32.0));
    }

    #[test]
    fn compile_once_evaluate_many() {
        let expr = compile_expression("{Sales} / 100").unwrap();
        let rows = [
            Row::new().with("Sales", 100.0),
            Row::new().with("Sales", 200.0),
        ];
        let once: Vec<f64> = rows.iter().map(|r| expr.evaluate(r).unwrap()).collect();
        let each: Vec<f64> = rows.iter().map(|r| eval("{Sales} / 100", r)).collect();
        assert_eq!(once, [1.0, 2.0]);
        assert_eq!(once, each);
    }

    #[test]
    fn malformed_rpn_is_an_evaluation_error() {
        let row = Row::new();
        let err = evaluate(&[RpnToken::Op(Operator::Add)], &row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Evaluation);
        assert_eq!(err.to_string(), "expression error: stack underflow at '+'");

        let err = evaluate(&[RpnToken::Num(1.0), RpnToken::Num(2.0)], &row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Evaluation);

        let err = evaluate(&[], &row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Evaluation);
    }

    #[test]
    fn rows_can_be_plain_maps() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(String::from("x"), CellValue::from(2.5));
        assert_eq!(compile_expression("x * 2").unwrap().evaluate(&map), Ok(5.0));
    }
}
