//! Error types for lexing and parsing Bloch source.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classification shared by every error the front end reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Malformed characters or literals.
    Lexical,
    /// Malformed syntax.
    Parse,
    /// Well-formed input that violates a program-level rule.
    Semantic,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Lexical => write!(f, "Lexical"),
            ErrorCategory::Parse => write!(f, "Parse"),
            ErrorCategory::Semantic => write!(f, "Semantic"),
        }
    }
}

/// Errors produced while turning source text into a [`Program`](crate::ast::Program).
///
/// Positions are 1-based and point at the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// The lexer rejected part of the input.
    #[error("Lexical error at {line}:{column}: {message}")]
    Lexical {
        line: usize,
        column: usize,
        message: String,
    },

    /// The parser rejected the token stream.
    #[error("Parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
}

impl SyntaxError {
    pub(crate) fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        SyntaxError::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    pub(crate) fn lexical(line: usize, column: usize, message: impl Into<String>) -> Self {
        SyntaxError::Lexical {
            line,
            column,
            message: message.into(),
        }
    }

    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyntaxError::Lexical { .. } => ErrorCategory::Lexical,
            SyntaxError::Parse { .. } => ErrorCategory::Parse,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            SyntaxError::Lexical { line, .. } | SyntaxError::Parse { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            SyntaxError::Lexical { column, .. } | SyntaxError::Parse { column, .. } => *column,
        }
    }

    /// The human-readable message without the position prefix.
    pub fn message(&self) -> &str {
        match self {
            SyntaxError::Lexical { message, .. } | SyntaxError::Parse { message, .. } => message,
        }
    }
}

/// Result type for lexing and parsing operations.
pub type ParseResult<T> = Result<T, SyntaxError>;
