// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Infix tokens to RPN.

use smallvec::SmallVec;

use super::lexer::{Lexeme, Token};
use super::{Dialect, Function, Operator, RpnToken};
use crate::ExprError;

/// Binds tighter than `*` and `/`, looser than `^`.
const NEG_PRECEDENCE: u8 = 5;

#[derive(Debug, Clone, Copy)]
enum Pending {
    Op(Operator),
    /// Prefix minus; its `0` operand is already in the output.
    Neg,
    /// An open parenthesis, possibly the argument list of a function.
    Group {
        func: Option<Function>,
        commas: usize,
        offset: usize,
    },
}

impl Pending {
    /// Returns the operator this entry emits and its binding strength.
    fn operator(self) -> Option<(Operator, u8)> {
        match self {
            Self::Op(op) => Some((op, op.precedence())),
            Self::Neg => Some((Operator::Sub, NEG_PRECEDENCE)),
            Self::Group { .. } => None,
        }
    }
}

pub(crate) struct ShuntingYard<'t> {
    tokens: &'t [Token],
    dialect: Dialect,
    end: usize,
    output: Vec<RpnToken>,
    stack: SmallVec<[Pending; 16]>,
    /// True where the grammar needs a value next: at the start and after an operator, `(` or `,`.
    expect_operand: bool,
}

impl<'t> ShuntingYard<'t> {
    /// `end` is the source length, used to position errors at end of input.
    pub(crate) fn new(tokens: &'t [Token], dialect: Dialect, end: usize) -> Self {
        Self {
            tokens,
            dialect,
            end,
            output: Vec::with_capacity(tokens.len()),
            stack: SmallVec::new(),
            expect_operand: true,
        }
    }

    pub(crate) fn run(mut self) -> Result<Vec<RpnToken>, ExprError> {
        let tokens = self.tokens;
        let mut pos = 0;
        while let Some(token) = tokens.get(pos) {
            pos += 1;
            match &token.lexeme {
                Lexeme::Num(v) => self.operand(RpnToken::Num(*v), token)?,
                Lexeme::Id(name) => self.operand(RpnToken::Id(name.clone()), token)?,
                Lexeme::Fn(func) => {
                    self.require_operand(token)?;
                    match tokens.get(pos) {
                        Some(next) if next.lexeme == Lexeme::LParen => pos += 1,
                        other => {
                            return Err(ExprError::parse(
                                format!("expected '(' after '{}'", func.name()),
                                other.map_or(self.end, |t| t.offset),
                            ));
                        }
                    }
                    self.stack.push(Pending::Group {
                        func: Some(*func),
                        commas: 0,
                        offset: token.offset,
                    });
                }
                Lexeme::LParen => {
                    self.require_operand(token)?;
                    self.stack.push(Pending::Group {
                        func: None,
                        commas: 0,
                        offset: token.offset,
                    });
                }
                Lexeme::RParen => self.close_group(token)?,
                Lexeme::Comma => self.comma(token)?,
                Lexeme::Op(op) => self.operator(*op, token)?,
            }
        }
        if self.expect_operand {
            return Err(ExprError::parse("unexpected end of expression", self.end));
        }
        while let Some(entry) = self.stack.pop() {
            match entry.operator() {
                Some((op, _)) => self.output.push(RpnToken::Op(op)),
                None => {
                    let offset = match entry {
                        Pending::Group { offset, .. } => offset,
                        _ => self.end,
                    };
                    return Err(ExprError::parse("mismatched '('", offset));
                }
            }
        }
        check_depth(&self.output)?;
        Ok(self.output)
    }

    fn operand(&mut self, rpn: RpnToken, token: &Token) -> Result<(), ExprError> {
        self.require_operand(token)?;
        self.output.push(rpn);
        self.expect_operand = false;
        Ok(())
    }

    fn require_operand(&self, token: &Token) -> Result<(), ExprError> {
        if self.expect_operand {
            Ok(())
        } else {
            Err(ExprError::parse(
                format!("expected an operator before {}", describe(token)),
                token.offset,
            ))
        }
    }

    fn operator(&mut self, op: Operator, token: &Token) -> Result<(), ExprError> {
        if self.expect_operand {
            return match op {
                Operator::Add => Ok(()),
                Operator::Sub => {
                    self.output.push(RpnToken::Num(0.0));
                    self.stack.push(Pending::Neg);
                    Ok(())
                }
                _ => Err(ExprError::parse(
                    format!("expected a value before '{}'", op.symbol()),
                    token.offset,
                )),
            };
        }
        if self.dialect == Dialect::Arithmetic && op.is_extended() {
            return Err(ExprError::parse(
                format!(
                    "operator '{}' is not available in arithmetic expressions",
                    op.symbol()
                ),
                token.offset,
            ));
        }
        let prec = op.precedence();
        while let Some((top, top_prec)) = self.stack.last().and_then(|e| e.operator()) {
            if top_prec > prec || (top_prec == prec && !op.is_right_assoc()) {
                self.stack.pop();
                self.output.push(RpnToken::Op(top));
            } else {
                break;
            }
        }
        self.stack.push(Pending::Op(op));
        self.expect_operand = true;
        Ok(())
    }

    /// Pops operators down to the innermost open group, leaving the group on the stack.
    fn unwind_to_group(&mut self) -> Option<&mut Pending> {
        while let Some(entry) = self.stack.last().copied() {
            match entry.operator() {
                Some((op, _)) => {
                    self.stack.pop();
                    self.output.push(RpnToken::Op(op));
                }
                None => break,
            }
        }
        self.stack.last_mut()
    }

    fn comma(&mut self, token: &Token) -> Result<(), ExprError> {
        if self.expect_operand {
            return Err(ExprError::parse("expected a value before ','", token.offset));
        }
        match self.unwind_to_group() {
            Some(Pending::Group {
                func: Some(_),
                commas,
                ..
            }) => *commas += 1,
            _ => return Err(ExprError::parse("unexpected ','", token.offset)),
        }
        self.expect_operand = true;
        Ok(())
    }

    fn close_group(&mut self, token: &Token) -> Result<(), ExprError> {
        if self.expect_operand {
            return Err(ExprError::parse("expected a value before ')'", token.offset));
        }
        let Some(Pending::Group {
            func,
            commas,
            offset,
        }) = self.unwind_to_group().copied()
        else {
            return Err(ExprError::parse("mismatched ')'", token.offset));
        };
        self.stack.pop();
        if let Some(func) = func {
            let args = commas + 1;
            if args != func.arity() {
                return Err(ExprError::parse(
                    format!(
                        "'{}' takes {} argument{} but got {args}",
                        func.name(),
                        func.arity(),
                        if func.arity() == 1 { "" } else { "s" },
                    ),
                    offset,
                ));
            }
            self.output.push(RpnToken::Fn(func));
        }
        Ok(())
    }
}

fn describe(token: &Token) -> String {
    match &token.lexeme {
        Lexeme::Num(v) => format!("number {v}"),
        Lexeme::Id(name) => format!("column '{name}'"),
        Lexeme::Fn(func) => format!("'{}'", func.name()),
        Lexeme::Op(op) => format!("'{}'", op.symbol()),
        Lexeme::LParen => String::from("'('"),
        Lexeme::RParen => String::from("')'"),
        Lexeme::Comma => String::from("','"),
    }
}

/// Simulates the evaluator's stack depth; the sequence must reduce to exactly one value.
fn check_depth(rpn: &[RpnToken]) -> Result<(), ExprError> {
    let mut depth = 0_usize;
    for token in rpn {
        let pops = match token {
            RpnToken::Num(_) | RpnToken::Id(_) => 0,
            RpnToken::Op(_) => 2,
            RpnToken::Fn(func) => func.arity(),
        };
        depth = depth
            .checked_sub(pops)
            .ok_or_else(|| ExprError::parse("malformed expression", None))?
            + 1;
    }
    if depth == 1 {
        Ok(())
    } else {
        Err(ExprError::parse("malformed expression", None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::expression::lexer::tokenize;

    fn rpn(src: &str) -> String {
        let tokens = tokenize(src).unwrap();
        let out = ShuntingYard::new(&tokens, Dialect::Extended, src.len())
            .run()
            .unwrap();
        out.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn parse_err(src: &str, dialect: Dialect) -> ExprError {
        let tokens = tokenize(src).unwrap();
        ShuntingYard::new(&tokens, dialect, src.len())
            .run()
            .unwrap_err()
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(rpn("A + B * 2"), "A B 2 * +");
        assert_eq!(rpn("(A + B) * 2"), "A B + 2 *");
        assert_eq!(rpn("2 ^ 3 ^ 2"), "2 3 2 ^ ^");
        assert_eq!(rpn("8 - 4 - 2"), "8 4 - 2 -");
        assert_eq!(rpn("a > 1 && b < 2 || c"), "a 1 > b 2 < && c ||");
    }

    #[test]
    fn unary_minus_binds_between_product_and_power() {
        assert_eq!(rpn("-A"), "0 A -");
        assert_eq!(rpn("2 * -3"), "2 0 3 - *");
        assert_eq!(rpn("-2 ^ 2"), "0 2 2 ^ -");
        assert_eq!(rpn("2 ^ -1"), "2 0 1 - ^");
        assert_eq!(rpn("-2 * 3"), "0 2 - 3 *");
        assert_eq!(rpn("+A"), "A");
        assert_eq!(rpn("min(-1, 2)"), "0 1 - 2 min");
    }

    #[test]
    fn functions_emit_after_their_arguments() {
        assert_eq!(rpn("sqrt(A + 1)"), "A 1 + sqrt");
        assert_eq!(rpn("max(A, B * 2) + 1"), "A B 2 * max 1 +");
        assert_eq!(rpn("abs(min(a, b))"), "a b min abs");
    }

    #[test]
    fn structural_errors_are_positioned() {
        let cases = [
            ("(1 + 2", 0),
            ("1 + 2)", 5),
            ("1 +", 3),
            ("* 2", 0),
            ("2 3", 2),
            ("2 (3)", 2),
            ("1, 2", 1),
            ("(1, 2)", 2),
            ("sqrt 4", 5),
            ("sqrt", 4),
            ("()", 1),
            ("min(1, )", 7),
        ];
        for (src, offset) in cases {
            let err = parse_err(src, Dialect::Extended);
            assert_eq!(err.kind(), ErrorKind::Parse, "{src:?}: {err}");
            assert_eq!(err.offset(), Some(offset), "{src:?}: {err}");
        }
    }

    #[test]
    fn arity_is_checked_at_the_closing_paren() {
        let err = parse_err("min(1)", Dialect::Extended);
        assert_eq!(err.to_string(), "'min' takes 2 arguments but got 1 at offset 0");
        let err = parse_err("1 + sqrt(1, 2)", Dialect::Extended);
        assert_eq!(err.to_string(), "'sqrt' takes 1 argument but got 2 at offset 4");
        let err = parse_err("max(1, 2, 3)", Dialect::Extended);
        assert_eq!(err.offset(), Some(0));
    }

    #[test]
    fn arithmetic_dialect_rejects_extended_operators() {
        for (src, offset) in [("a > 1", 2), ("a && b", 2), ("1 + (a == b)", 7)] {
            let err = parse_err(src, Dialect::Arithmetic);
            assert_eq!(err.kind(), ErrorKind::Parse, "{src:?}");
            assert_eq!(err.offset(), Some(offset), "{src:?}");
        }
    }
}
