// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Program compilation and full-recompute execution.

use datalab_core::{CellValue, Row, Table};
use datalab_expr::{ExprError, ParsedExpression, ParsedFilter, compile_expression, compile_filter};
use hashbrown::HashSet;

use crate::transform::{FilterOp, FilterValue, Transform, summarize_transforms};

/// Errors returned when compiling or running a [`Program`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// The expression text of a transform did not compile.
    #[error("transform {index} does not compile: {source}")]
    Compile {
        /// Position of the transform in the program.
        index: usize,
        /// The compile error.
        source: ExprError,
    },
}

/// An ordered list of transforms over a single base table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    transforms: Vec<Transform>,
}

impl Program {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transform.
    pub fn push(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    /// Appends a transform, builder style.
    #[must_use]
    pub fn with(mut self, transform: Transform) -> Self {
        self.push(transform);
        self
    }

    /// Returns the transforms in execution order.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Returns the `" + "`-joined transform labels.
    pub fn summary(&self) -> String {
        summarize_transforms(&self.transforms)
    }

    /// Compiles every expression in the program once.
    pub fn compile(&self) -> Result<CompiledProgram, ExecutionError> {
        let steps = self
            .transforms
            .iter()
            .enumerate()
            .map(|(index, t)| {
                Step::compile(t).map_err(|source| ExecutionError::Compile { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CompiledProgram {
            steps,
            summary: self.summary(),
        })
    }

    /// Compiles the program and runs it over `base`.
    pub fn apply(&self, base: &Table) -> Result<Table, ExecutionError> {
        Ok(self.compile()?.apply(base))
    }
}

/// A [`Program`] whose expressions have been compiled; reusable across base tables.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    steps: Vec<Step>,
    summary: String,
}

impl CompiledProgram {
    /// Returns the `" + "`-joined transform labels.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Runs every transform in order over a copy of `base`.
    ///
    /// The output is named `"{base} | {summary}"` unless the program is empty.
    pub fn apply(&self, base: &Table) -> Table {
        let mut cur = base.clone();
        for (index, step) in self.steps.iter().enumerate() {
            let before = cur.row_count();
            step.run(&mut cur);
            tracing::debug!(index, before, after = cur.row_count(), "applied transform");
        }
        if !self.summary.is_empty() {
            cur.name = format!("{} | {}", base.name, self.summary);
        }
        cur
    }
}

#[derive(Debug, Clone)]
enum Step {
    FilterRows {
        column: String,
        matcher: TextMatcher,
    },
    FilterExpr(ParsedFilter),
    RowAverage {
        columns: Vec<String>,
        out_column: String,
    },
    Compute {
        name: String,
        expr: ParsedExpression,
    },
    Append(Table),
}

impl Step {
    fn compile(t: &Transform) -> Result<Self, ExprError> {
        Ok(match t {
            Transform::FilterRows {
                column,
                op,
                value,
                case_sensitive,
            } => Self::FilterRows {
                column: column.clone(),
                matcher: TextMatcher::new(*op, value, *case_sensitive),
            },
            Transform::FilterExpr { expression } => Self::FilterExpr(compile_filter(expression)?),
            Transform::RowAverage {
                columns,
                out_column,
            } => Self::RowAverage {
                columns: columns.clone(),
                out_column: out_column.clone(),
            },
            Transform::Compute { name, expression } => Self::Compute {
                name: name.clone(),
                expr: compile_expression(expression)?,
            },
            Transform::Append { other } => Self::Append(other.clone()),
        })
    }

    fn run(&self, table: &mut Table) {
        match self {
            Self::FilterRows { column, matcher } => {
                table.rows.retain(|row| matcher.matches(row.get(column)));
            }
            Self::FilterExpr(filter) => table.rows.retain(|row| filter.matches(row)),
            Self::RowAverage {
                columns,
                out_column,
            } => {
                table.ensure_column(out_column);
                for row in &mut table.rows {
                    let avg = row_average(row, columns);
                    row.insert(out_column.clone(), CellValue::from(avg));
                }
            }
            Self::Compute { name, expr } => {
                table.ensure_column(name);
                for (i, row) in table.rows.iter_mut().enumerate() {
                    let value = match expr.evaluate(&*row) {
                        Ok(v) if v.is_finite() => CellValue::Number(v),
                        Ok(_) => CellValue::Null,
                        Err(err) => {
                            tracing::warn!(row = i, column = %name, %err, "computed field failed");
                            CellValue::Null
                        }
                    };
                    row.insert(name.clone(), value);
                }
            }
            Self::Append(other) => append(table, other),
        }
    }
}

/// Pre-normalised right-hand side of a [`Transform::FilterRows`].
#[derive(Debug, Clone)]
struct TextMatcher {
    op: FilterOp,
    case_sensitive: bool,
    needle: String,
    set: HashSet<String>,
}

impl TextMatcher {
    fn new(op: FilterOp, value: &FilterValue, case_sensitive: bool) -> Self {
        let norm = |s: &str| normalize(s, case_sensitive);
        let (needle, set) = match (op, value) {
            (FilterOp::In, FilterValue::One(v)) => {
                (String::new(), v.split(',').map(|p| norm(p.trim())).collect())
            }
            (FilterOp::In, FilterValue::Many(vs)) => {
                (String::new(), vs.iter().map(|v| norm(v.as_str())).collect())
            }
            (_, FilterValue::One(v)) => (norm(v.as_str()), HashSet::new()),
            (_, FilterValue::Many(vs)) => (norm(vs.join(",").as_str()), HashSet::new()),
        };
        Self {
            op,
            case_sensitive,
            needle,
            set,
        }
    }

    fn matches(&self, cell: Option<&CellValue>) -> bool {
        let text = cell.map(CellValue::to_text).unwrap_or_default();
        let text = normalize(&text, self.case_sensitive);
        match self.op {
            FilterOp::Eq => text == self.needle,
            FilterOp::Neq => text != self.needle,
            FilterOp::Contains => text.contains(self.needle.as_str()),
            FilterOp::In => self.set.contains(&text),
        }
    }
}

fn normalize(s: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        String::from(s)
    } else {
        s.to_lowercase()
    }
}

/// Mean of the numeric cells among `columns`, or `None` when there are none.
fn row_average(row: &Row, columns: &[String]) -> Option<f64> {
    let (sum, count) = columns
        .iter()
        .filter_map(|c| row.get(c)?.as_f64())
        .fold((0.0, 0_u32), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / f64::from(count))
}

/// Unions the headers (left order, then new right headers) and normalises both row sets.
fn append(table: &mut Table, other: &Table) {
    for h in &other.headers {
        table.ensure_column(h);
    }
    let mut rows = Vec::with_capacity(table.rows.len() + other.rows.len());
    rows.extend(table.rows.iter().map(|r| table.normalize_row(r)));
    rows.extend(other.rows.iter().map(|r| table.normalize_row(r)));
    table.rows = rows;
}
