// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `LIKE` translation and regex compilation for pattern nodes.

use hashbrown::{Equivalent, HashMap};
use regex::{Regex, RegexBuilder};

use super::FilterNode;

/// Which operator a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum PatternKind {
    /// SQL `LIKE` / `ILIKE` pattern, translated before compiling.
    Like,
    /// Raw regex for `~` / `~*`.
    Regex,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PatternKey {
    kind: PatternKind,
    case_insensitive: bool,
    text: String,
}

/// Borrowed form of [`PatternKey`]; field order and types hash identically.
#[derive(Hash)]
struct PatternRef<'a> {
    kind: PatternKind,
    case_insensitive: bool,
    text: &'a str,
}

impl Equivalent<PatternKey> for PatternRef<'_> {
    fn equivalent(&self, key: &PatternKey) -> bool {
        self.kind == key.kind
            && self.case_insensitive == key.case_insensitive
            && self.text == key.text
    }
}

/// Translates a SQL `LIKE` pattern into an anchored regex source.
///
/// `%` matches any run of characters and `_` any single character; everything else is literal.
pub(crate) fn like_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('^');
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '%' | '_' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '%' { ".*" } else { "." });
            }
            c => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}

/// Compiles a pattern, returning `None` when it is not a valid regex.
pub(crate) fn compile_pattern(
    kind: PatternKind,
    text: &str,
    case_insensitive: bool,
) -> Option<Regex> {
    let translated;
    let source = match kind {
        PatternKind::Like => {
            translated = like_to_regex(text);
            translated.as_str()
        }
        PatternKind::Regex => text,
    };
    match RegexBuilder::new(source)
        .case_insensitive(case_insensitive)
        .build()
    {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::debug!(pattern = source, %err, "regex failed to compile; treating as no match");
            None
        }
    }
}

/// Regexes for the literal patterns of a filter, compiled once at filter compile time.
///
/// Patterns that failed to compile are cached as `None`. Column-valued patterns are not
/// known until evaluation and are compiled per row.
#[derive(Debug, Clone, Default)]
pub(crate) struct PatternCache {
    entries: HashMap<PatternKey, Option<Regex>>,
}

impl PatternCache {
    pub(crate) fn build(root: &FilterNode) -> Self {
        let mut cache = Self::default();
        cache.collect(root);
        cache
    }

    fn collect(&mut self, node: &FilterNode) {
        match node {
            FilterNode::Or { left, right }
            | FilterNode::And { left, right }
            | FilterNode::Cmp { left, right, .. } => {
                self.collect(left);
                self.collect(right);
            }
            FilterNode::Not { expr } => self.collect(expr),
            FilterNode::Between {
                target, low, high, ..
            } => {
                self.collect(target);
                self.collect(low);
                self.collect(high);
            }
            FilterNode::Like {
                ilike,
                value,
                pattern,
                ..
            } => {
                self.collect(value);
                self.collect_pattern(PatternKind::Like, *ilike, pattern);
            }
            FilterNode::Regex {
                case_insensitive,
                value,
                pattern,
            } => {
                self.collect(value);
                self.collect_pattern(PatternKind::Regex, *case_insensitive, pattern);
            }
            FilterNode::Id(_) | FilterNode::LitNum(_) | FilterNode::LitStr(_) => {}
        }
    }

    fn collect_pattern(&mut self, kind: PatternKind, case_insensitive: bool, pattern: &FilterNode) {
        let Some(text) = pattern.literal_text() else {
            self.collect(pattern);
            return;
        };
        let key = PatternKey {
            kind,
            case_insensitive,
            text: text.into_owned(),
        };
        if !self.entries.contains_key(&key) {
            let re = compile_pattern(kind, &key.text, case_insensitive);
            self.entries.insert(key, re);
        }
    }

    /// Tests `haystack` against a pattern, using the cached regex when there is one.
    pub(crate) fn is_match(
        &self,
        kind: PatternKind,
        text: &str,
        case_insensitive: bool,
        haystack: &str,
    ) -> bool {
        let key = PatternRef {
            kind,
            case_insensitive,
            text,
        };
        match self.entries.get(&key) {
            Some(cached) => cached.as_ref().is_some_and(|re| re.is_match(haystack)),
            None => compile_pattern(kind, text, case_insensitive)
                .is_some_and(|re| re.is_match(haystack)),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_translation_escapes_metacharacters() {
        assert_eq!(like_to_regex("Chi%"), "^Chi.*$");
        assert_eq!(like_to_regex("a_c"), "^a.c$");
        assert_eq!(like_to_regex("1.5%"), r"^1\.5.*$");
        assert_eq!(like_to_regex("(x)"), r"^\(x\)$");
        assert_eq!(like_to_regex(""), "^$");
    }

    #[test]
    fn invalid_regex_never_matches() {
        assert!(compile_pattern(PatternKind::Regex, "(unclosed", false).is_none());
        let cache = PatternCache::default();
        assert!(!cache.is_match(PatternKind::Regex, "(unclosed", false, "(unclosed"));
    }

    #[test]
    fn like_metacharacters_are_literal() {
        let re = compile_pattern(PatternKind::Like, "(unclosed%", false).unwrap();
        assert!(re.is_match("(unclosed paren"));
    }

    #[test]
    fn cache_keys_on_kind_and_case_flag() {
        let root = FilterNode::Or {
            left: Box::new(FilterNode::Like {
                ilike: true,
                not: false,
                value: Box::new(FilterNode::Id("c".into())),
                pattern: Box::new(FilterNode::LitStr("chi%".into())),
            }),
            right: Box::new(FilterNode::Regex {
                case_insensitive: false,
                value: Box::new(FilterNode::Id("c".into())),
                pattern: Box::new(FilterNode::LitStr("chi%".into())),
            }),
        };
        let cache = PatternCache::build(&root);
        assert_eq!(cache.len(), 2);
        assert!(cache.is_match(PatternKind::Like, "chi%", true, "Chicago"));
        assert!(!cache.is_match(PatternKind::Like, "chi%", false, "Chicago"));
        // As a raw regex `%` is a literal, and the match is unanchored.
        assert!(cache.is_match(PatternKind::Regex, "chi%", false, "xchi%"));
        assert!(!cache.is_match(PatternKind::Regex, "chi%", false, "xchi"));
        assert!(!cache.is_match(PatternKind::Regex, "chi%", false, "Chicago"));
    }
}
