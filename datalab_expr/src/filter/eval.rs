// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filter evaluation.

use datalab_core::RowAccess;

use super::pattern::{PatternCache, PatternKind};
use super::{CompareOp, FilterNode};
use crate::Scalar;

pub(super) struct Evaluator<'a, R: RowAccess + ?Sized> {
    patterns: &'a PatternCache,
    row: &'a R,
}

impl<'a, R: RowAccess + ?Sized> Evaluator<'a, R> {
    pub(super) fn new(patterns: &'a PatternCache, row: &'a R) -> Self {
        Self { patterns, row }
    }

    pub(super) fn test(&self, node: &FilterNode) -> bool {
        self.value(node).is_truthy()
    }

    /// Reduces a node to a coerced value; predicate nodes yield `Num(1)` or `Num(0)`.
    fn value(&self, node: &FilterNode) -> Scalar {
        match node {
            FilterNode::LitNum(v) => Scalar::Num(*v),
            FilterNode::LitStr(s) => Scalar::Str(s.clone()),
            FilterNode::Id(name) => Scalar::from_cell(self.row.cell(name)),
            FilterNode::Cmp { op, left, right } => {
                Scalar::from_bool(compare(*op, &self.value(left), &self.value(right)))
            }
            FilterNode::Between {
                not,
                target,
                low,
                high,
            } => {
                let r = between(&self.value(target), &self.value(low), &self.value(high));
                Scalar::from_bool(r != *not)
            }
            FilterNode::Like {
                ilike,
                not,
                value,
                pattern,
            } => {
                let ok = self.pattern_match(PatternKind::Like, *ilike, value, pattern);
                Scalar::from_bool(ok != *not)
            }
            FilterNode::Regex {
                case_insensitive,
                value,
                pattern,
            } => Scalar::from_bool(self.pattern_match(
                PatternKind::Regex,
                *case_insensitive,
                value,
                pattern,
            )),
            FilterNode::And { left, right } => {
                Scalar::from_bool(self.test(left) && self.test(right))
            }
            FilterNode::Or { left, right } => Scalar::from_bool(self.test(left) || self.test(right)),
            FilterNode::Not { expr } => Scalar::from_bool(!self.test(expr)),
        }
    }

    fn pattern_match(
        &self,
        kind: PatternKind,
        case_insensitive: bool,
        value: &FilterNode,
        pattern: &FilterNode,
    ) -> bool {
        let haystack = self.value(value);
        let pattern = self.value(pattern);
        self.patterns
            .is_match(kind, &pattern.as_text(), case_insensitive, &haystack.as_text())
    }
}

/// Numeric comparison when both sides are finite numbers, lexicographic otherwise.
fn compare(op: CompareOp, a: &Scalar, b: &Scalar) -> bool {
    if let (Some(a), Some(b)) = (a.finite(), b.finite()) {
        return op.test(&a, &b);
    }
    op.test(&*a.as_text(), &*b.as_text())
}

/// Inclusive range test; numeric only when all three values are finite numbers.
fn between(target: &Scalar, low: &Scalar, high: &Scalar) -> bool {
    if let (Some(t), Some(lo), Some(hi)) = (target.finite(), low.finite(), high.finite()) {
        return t >= lo && t <= hi;
    }
    let t = target.as_text();
    t >= low.as_text() && t <= high.as_text()
}
