// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lexing helpers shared by the filter and expression tokenizers.

use crate::ExprError;

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Scans an identifier starting at `start`; returns the end offset.
pub(crate) fn scan_ident(src: &str, start: usize) -> usize {
    src[start..]
        .char_indices()
        .find(|&(_, c)| !is_ident_continue(c))
        .map_or(src.len(), |(i, _)| start + i)
}

/// Scans a numeric literal starting at `start` (a digit or `.`).
///
/// Accepts digits with at most one decimal point and an optional `e[+-]digits` exponent.
/// Returns the value and the end offset.
pub(crate) fn scan_number(src: &str, start: usize) -> Result<(f64, usize), ExprError> {
    let bytes = src.as_bytes();
    let mut end = start;
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return Err(ExprError::syntax(
            format!("invalid number '{}'", &src[start..end]),
            start,
        ));
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end == exp_digits_start {
            return Err(ExprError::syntax(
                format!("invalid number '{}'", &src[start..exp_end]),
                start,
            ));
        }
        end = exp_end;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        return Err(ExprError::syntax(
            format!("invalid number '{}.'", &src[start..end]),
            start,
        ));
    }
    let raw = &src[start..end];
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok((v, end)),
        _ => Err(ExprError::syntax(format!("invalid number '{raw}'"), start)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_with_fraction_and_exponent() {
        assert_eq!(scan_number("12", 0).unwrap(), (12.0, 2));
        assert_eq!(scan_number("3.25)", 0).unwrap(), (3.25, 4));
        assert_eq!(scan_number(".5", 0).unwrap(), (0.5, 2));
        assert_eq!(scan_number("1e3", 0).unwrap(), (1000.0, 3));
        assert_eq!(scan_number("2.5E-1+", 0).unwrap(), (0.25, 6));
        assert_eq!(scan_number("2-1", 0).unwrap(), (2.0, 1));
    }

    #[test]
    fn malformed_numbers_are_syntax_errors() {
        for src in [".", "1e", "1e+", "1.2.3", "1e999"] {
            let err = scan_number(src, 0).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::Syntax, "{src}");
        }
    }

    #[test]
    fn identifiers_stop_at_non_word_characters() {
        assert_eq!(scan_ident("Sales > 5", 0), 5);
        assert_eq!(scan_ident("a_1", 0), 3);
        assert_eq!(scan_ident("x{", 0), 1);
    }
}
