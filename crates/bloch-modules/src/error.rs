//! Error types for module loading.

use std::path::{Path, PathBuf};

use bloch_syntax::{ErrorCategory, SyntaxError};
use thiserror::Error;

/// Errors raised while resolving and merging a Bloch program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModuleError {
    /// A loaded file failed to lex or parse.
    #[error("{source} in '{}'", path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },

    /// A file could not be read or canonicalized.
    #[error("Semantic error: failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No search location contains the imported module.
    #[error("Semantic error at {line}:{column}: import '{import}' not found")]
    UnresolvedImport {
        import: String,
        importer: PathBuf,
        line: usize,
        column: usize,
    },

    /// A module imports itself, directly or transitively.
    #[error("Semantic error: import cycle detected: {}", display_cycle(cycle))]
    ImportCycle { cycle: Vec<PathBuf> },

    #[error("Semantic error: No 'main' function found across imported modules")]
    NoMain,

    /// Reported at the second `main` encountered in load order.
    #[error(
        "Semantic error at {line}:{column}: Multiple 'main' functions found across imported modules"
    )]
    MultipleMain { line: usize, column: usize },

    /// `@shots(N)` on `main` is zero or does not fit a shot count.
    #[error("Semantic error at {line}:{column}: invalid shots value '{value}'")]
    InvalidShots {
        value: String,
        line: usize,
        column: usize,
    },
}

fn display_cycle(cycle: &[PathBuf]) -> String {
    cycle
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl ModuleError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ModuleError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Category of this error. Only syntax failures are not semantic.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ModuleError::Syntax { source, .. } => source.category(),
            _ => ErrorCategory::Semantic,
        }
    }

    /// 1-based line, when the error points into a source file.
    pub fn line(&self) -> Option<usize> {
        match self {
            ModuleError::Syntax { source, .. } => Some(source.line()),
            ModuleError::UnresolvedImport { line, .. }
            | ModuleError::MultipleMain { line, .. }
            | ModuleError::InvalidShots { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// 1-based column, when the error points into a source file.
    pub fn column(&self) -> Option<usize> {
        match self {
            ModuleError::Syntax { source, .. } => Some(source.column()),
            ModuleError::UnresolvedImport { column, .. }
            | ModuleError::MultipleMain { column, .. }
            | ModuleError::InvalidShots { column, .. } => Some(*column),
            _ => None,
        }
    }

    /// The file the error was found in, if known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ModuleError::Syntax { path, .. } | ModuleError::Io { path, .. } => Some(path),
            ModuleError::UnresolvedImport { importer, .. } => Some(importer),
            _ => None,
        }
    }
}

/// Result type for module loading.
pub type ModuleResult<T> = Result<T, ModuleError>;
