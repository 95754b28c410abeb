// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conditional styling: per-row visual overrides driven by expressions.

use datalab_core::RowAccess;
use datalab_expr::{ExprError, ParsedExpression, compile_expression};

/// A conditional style rule. When `expression` is truthy for a row, the set fields apply.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    /// Stable rule id.
    pub id: String,
    /// Arithmetic expression; truthy means non-zero and not `NaN`.
    pub expression: String,
    /// Fill color override.
    pub color: Option<String>,
    /// Stroke color override.
    pub stroke: Option<String>,
    /// Mark size override.
    pub size: Option<f64>,
    /// Label override.
    pub label: Option<String>,
}

impl StyleRule {
    /// Creates a rule with no overrides set.
    pub fn new(id: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expression: expression.into(),
            color: None,
            stroke: None,
            size: None,
            label: None,
        }
    }

    /// Sets the fill color override.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the stroke color override.
    #[must_use]
    pub fn with_stroke(mut self, stroke: impl Into<String>) -> Self {
        self.stroke = Some(stroke.into());
        self
    }

    /// Sets the size override.
    #[must_use]
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the label override.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// The merged overrides of every rule matching a row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleOverride {
    /// Fill color.
    pub color: Option<String>,
    /// Stroke color.
    pub stroke: Option<String>,
    /// Mark size.
    pub size: Option<f64>,
    /// Label.
    pub label: Option<String>,
}

impl StyleOverride {
    /// Returns `true` if no field is overridden.
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.stroke.is_none() && self.size.is_none() && self.label.is_none()
    }

    fn merge(&mut self, rule: &StyleRule) {
        if let Some(c) = &rule.color {
            self.color = Some(c.clone());
        }
        if let Some(s) = &rule.stroke {
            self.stroke = Some(s.clone());
        }
        if rule.size.is_some() {
            self.size = rule.size;
        }
        if let Some(l) = &rule.label {
            self.label = Some(l.clone());
        }
    }
}

/// Error returned when a [`StyleRule`] expression does not compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("style rule '{rule}' does not compile: {source}")]
pub struct StyleError {
    /// Id of the offending rule.
    pub rule: String,
    /// The compile error.
    pub source: ExprError,
}

/// Compiled conditional style rules, in priority order (later rules win).
#[derive(Debug, Clone, Default)]
pub struct ConditionalStyles {
    rules: Vec<(StyleRule, ParsedExpression)>,
}

impl ConditionalStyles {
    /// Compiles every rule's expression once.
    pub fn compile(rules: impl IntoIterator<Item = StyleRule>) -> Result<Self, StyleError> {
        let rules = rules
            .into_iter()
            .map(|rule| match compile_expression(&rule.expression) {
                Ok(expr) => Ok((rule, expr)),
                Err(source) => Err(StyleError {
                    rule: rule.id,
                    source,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Merges the overrides of every matching rule; later rules override earlier fields.
    pub fn resolve(&self, row: &(impl RowAccess + ?Sized)) -> StyleOverride {
        let mut out = StyleOverride::default();
        for (rule, _) in self.matches(row) {
            out.merge(rule);
        }
        out
    }

    /// Returns the ids of the rules matching `row`, in rule order.
    pub fn matching<'a>(&'a self, row: &(impl RowAccess + ?Sized)) -> Vec<&'a str> {
        self.matches(row).map(|(rule, _)| rule.id.as_str()).collect()
    }

    fn matches<'a, 'r, R: RowAccess + ?Sized>(
        &'a self,
        row: &'r R,
    ) -> impl Iterator<Item = &'a (StyleRule, ParsedExpression)> {
        self.rules.iter().filter(move |(rule, expr)| match expr.evaluate(row) {
            Ok(v) => v != 0.0 && !v.is_nan(),
            Err(err) => {
                tracing::warn!(rule = %rule.id, %err, "style rule failed; treating as no match");
                false
            }
        })
    }
}
