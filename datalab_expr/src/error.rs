// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types shared by both languages.

/// Coarse classification of an [`ExprError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Tokenizer-level failure (unexpected character, unclosed string or brace, bad number).
    Syntax,
    /// Grammar-level failure (unexpected token, unmatched parenthesis, missing keyword).
    Parse,
    /// Internal invariant violation during evaluation.
    Evaluation,
}

/// Errors produced while compiling or evaluating an expression.
///
/// Syntax and parse errors are user-facing and carry the byte offset of the offending input.
/// Evaluation errors indicate a malformed compiled form and are unreachable for input that
/// compiled successfully.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// Tokenizer-level failure.
    #[error("{message} at offset {offset}")]
    Syntax {
        /// Human-readable description.
        message: String,
        /// Byte offset into the source text.
        offset: usize,
    },
    /// Grammar-level failure.
    #[error("{message}{}", at_offset(.offset))]
    Parse {
        /// Human-readable description.
        message: String,
        /// Byte offset into the source text, when one token is to blame.
        offset: Option<usize>,
    },
    /// Invariant violation during evaluation.
    #[error("expression error: {message}")]
    Evaluation {
        /// Human-readable description.
        message: String,
    },
}

fn at_offset(offset: &Option<usize>) -> String {
    offset.map_or_else(String::new, |o| format!(" at offset {o}"))
}

impl ExprError {
    pub(crate) fn syntax(message: impl Into<String>, offset: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            offset,
        }
    }

    pub(crate) fn parse(message: impl Into<String>, offset: impl Into<Option<usize>>) -> Self {
        Self::Parse {
            message: message.into(),
            offset: offset.into(),
        }
    }

    pub(crate) fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Evaluation { .. } => ErrorKind::Evaluation,
        }
    }

    /// Returns the byte offset the error points at, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Syntax { offset, .. } => Some(*offset),
            Self::Parse { offset, .. } => *offset,
            Self::Evaluation { .. } => None,
        }
    }
}
