// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arithmetic expressions for computed fields and conditional styles.
//!
//! Expressions are compiled once to reverse Polish notation with a shunting-yard pass and
//! then evaluated per row on a small value stack. Columns are referenced by bare identifier
//! (`Sales`) or with braces (`{Unit Price}`); missing and non-numeric cells evaluate to `NaN`.
//!
//! Unary minus binds tighter than `*` and `/` but looser than `^`: `2*-3` is `-6`, `2^-1` is
//! `0.5` and `-2^2` is `-4`. This differs from parsers that read a leading `-` as a binary
//! minus at `+`/`-` precedence, where the first two give `-3` and `0`.
//!
//! ```
//! use datalab_core::Row;
//! use datalab_expr::compile_expression;
//!
//! let expr = compile_expression("{A} + {B} * 2").unwrap();
//! let row = Row::new().with("A", 1.0).with("B", 3.0);
//! assert_eq!(expr.evaluate(&row), Ok(7.0));
//! ```

use std::fmt;

use datalab_core::RowAccess;

use crate::ExprError;
use crate::scalar::is_truthy_f64;

mod eval;
mod lexer;
mod shunting_yard;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`; division by zero yields `NaN`.
    Div,
    /// `^`, right associative.
    Pow,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl Operator {
    /// Every operator, in no particular order.
    pub const ALL: [Self; 13] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Pow,
        Self::Gt,
        Self::Lt,
        Self::Ge,
        Self::Le,
        Self::Eq,
        Self::Ne,
        Self::And,
        Self::Or,
    ];

    /// Returns the source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Pow => 6,
            Self::Mul | Self::Div => 4,
            Self::Add | Self::Sub => 3,
            Self::Gt | Self::Lt | Self::Ge | Self::Le | Self::Eq | Self::Ne => 2,
            Self::And => 1,
            Self::Or => 0,
        }
    }

    /// Returns `true` for `^`.
    pub fn is_right_assoc(self) -> bool {
        self == Self::Pow
    }

    /// Returns `true` for comparison and logical operators, which [`Dialect::Arithmetic`]
    /// rejects.
    pub fn is_extended(self) -> bool {
        self.precedence() <= 2
    }

    /// Applies the operator; comparisons and logical operators yield `1` or `0`.
    pub fn apply(self, a: f64, b: f64) -> f64 {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => {
                if b == 0.0 {
                    f64::NAN
                } else {
                    a / b
                }
            }
            Self::Pow => {
                if b.is_nan() {
                    f64::NAN
                } else {
                    a.powf(b)
                }
            }
            Self::Gt => flag(a > b),
            Self::Lt => flag(a < b),
            Self::Ge => flag(a >= b),
            Self::Le => flag(a <= b),
            Self::Eq => flag(a == b),
            Self::Ne => flag(a != b),
            Self::And => flag(is_truthy_f64(a) && is_truthy_f64(b)),
            Self::Or => flag(is_truthy_f64(a) || is_truthy_f64(b)),
        }
    }
}

/// Built-in functions. Names are case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    /// Base-10 logarithm.
    Log,
    /// Natural logarithm.
    Ln,
    /// Square root.
    Sqrt,
    /// Absolute value.
    Abs,
    /// Smaller of two values; `NaN` if either is `NaN`.
    Min,
    /// Larger of two values; `NaN` if either is `NaN`.
    Max,
}

impl Function {
    /// Looks up a function by its exact name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "log" => Self::Log,
            "ln" => Self::Ln,
            "sqrt" => Self::Sqrt,
            "abs" => Self::Abs,
            "min" => Self::Min,
            "max" => Self::Max,
            _ => return None,
        })
    }

    /// Returns the source name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Ln => "ln",
            Self::Sqrt => "sqrt",
            Self::Abs => "abs",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Number of arguments.
    pub fn arity(self) -> usize {
        match self {
            Self::Min | Self::Max => 2,
            _ => 1,
        }
    }

    /// Applies the function; returns `NaN` if `args` does not match the arity.
    pub fn apply(self, args: &[f64]) -> f64 {
        match (self, args) {
            (Self::Log, [x]) => x.log10(),
            (Self::Ln, [x]) => x.ln(),
            (Self::Sqrt, [x]) => x.sqrt(),
            (Self::Abs, [x]) => x.abs(),
            (Self::Min, [a, b]) if a.is_nan() || b.is_nan() => f64::NAN,
            (Self::Min, [a, b]) => a.min(*b),
            (Self::Max, [a, b]) if a.is_nan() || b.is_nan() => f64::NAN,
            (Self::Max, [a, b]) => a.max(*b),
            _ => f64::NAN,
        }
    }
}

/// One step of a compiled expression.
#[derive(Debug, Clone, PartialEq)]
pub enum RpnToken {
    /// Push a literal.
    Num(f64),
    /// Push a column value.
    Id(String),
    /// Pop two values, push the result.
    Op(Operator),
    /// Pop the function's arguments, push the result.
    Fn(Function),
}

impl fmt::Display for RpnToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(v) => write!(f, "{v}"),
            Self::Id(name) => f.write_str(name),
            Self::Op(op) => f.write_str(op.symbol()),
            Self::Fn(func) => f.write_str(func.name()),
        }
    }
}

/// Operator set accepted by the compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `+ - * / ^` and functions only.
    Arithmetic,
    /// Arithmetic plus comparisons (`> < >= <= == !=`) and `&&` / `||`.
    #[default]
    Extended,
}

/// A compiled arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpression {
    rpn: Vec<RpnToken>,
    source: String,
    dialect: Dialect,
}

impl ParsedExpression {
    /// Returns the compiled postfix sequence.
    pub fn rpn(&self) -> &[RpnToken] {
        &self.rpn
    }

    /// Returns the source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the dialect this expression was compiled with.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Iterates the column names the expression reads, in order of first use.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        let mut seen: Vec<&str> = Vec::new();
        self.rpn.iter().filter_map(move |t| match t {
            RpnToken::Id(name) if !seen.contains(&name.as_str()) => {
                seen.push(name);
                Some(name.as_str())
            }
            _ => None,
        })
    }

    /// Evaluates the expression against a row.
    ///
    /// Fails only if the postfix sequence is malformed, which cannot happen for an expression
    /// produced by [`compile_expression`].
    pub fn evaluate(&self, row: &(impl RowAccess + ?Sized)) -> Result<f64, ExprError> {
        eval::evaluate(&self.rpn, row)
    }
}

/// Compiles an expression with the default [`Dialect::Extended`] operator set.
pub fn compile_expression(text: &str) -> Result<ParsedExpression, ExprError> {
    compile_expression_with(text, Dialect::default())
}

/// Compiles an expression with an explicit operator set.
pub fn compile_expression_with(text: &str, dialect: Dialect) -> Result<ParsedExpression, ExprError> {
    let tokens = lexer::tokenize(text)?;
    let rpn = shunting_yard::ShuntingYard::new(&tokens, dialect, text.len()).run()?;
    tracing::trace!(source = text, ?dialect, steps = rpn.len(), "compiled expression");
    Ok(ParsedExpression {
        rpn,
        source: String::from(text),
        dialect,
    })
}

/// Evaluates a compiled expression against a row.
pub fn evaluate_expression(
    expr: &ParsedExpression,
    row: &(impl RowAccess + ?Sized),
) -> Result<f64, ExprError> {
    expr.evaluate(row)
}
