//! Error types for semantic passes.

use bloch_syntax::ErrorCategory;
use bloch_syntax::ast::Position;
use thiserror::Error;

/// Errors raised while folding array sizes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SemaError {
    #[error(
        "Semantic error at {line}:{column}: array size must be a compile-time constant 'int' (e.g. a final int)"
    )]
    NonConstantArraySize { line: usize, column: usize },

    #[error("Semantic error at {line}:{column}: array size must be non-negative")]
    NegativeArraySize {
        line: usize,
        column: usize,
        value: i64,
    },

    #[error("Semantic error at {line}:{column}: division by zero in constant expression")]
    DivisionByZero { line: usize, column: usize },

    #[error("Semantic error at {line}:{column}: modulo by zero in constant expression")]
    ModuloByZero { line: usize, column: usize },
}

impl SemaError {
    pub(crate) fn non_constant(pos: Position) -> Self {
        SemaError::NonConstantArraySize {
            line: pos.line,
            column: pos.column,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Semantic
    }

    pub fn line(&self) -> usize {
        match self {
            SemaError::NonConstantArraySize { line, .. }
            | SemaError::NegativeArraySize { line, .. }
            | SemaError::DivisionByZero { line, .. }
            | SemaError::ModuloByZero { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            SemaError::NonConstantArraySize { column, .. }
            | SemaError::NegativeArraySize { column, .. }
            | SemaError::DivisionByZero { column, .. }
            | SemaError::ModuloByZero { column, .. } => *column,
        }
    }
}

/// Result type for semantic passes.
pub type SemaResult<T> = Result<T, SemaError>;
