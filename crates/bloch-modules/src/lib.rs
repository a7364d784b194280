//! Module resolution for Bloch
//!
//! Loads an entry file, follows its `import` declarations depth-first and
//! merges every module into one [`Program`](bloch_syntax::ast::Program).
//! Modules are merged dependencies first, so an imported module's classes,
//! functions and top-level statements precede those of its importer.
//!
//! # Example
//!
//! ```rust,no_run
//! use bloch_modules::{ModuleLoader, SearchPaths};
//!
//! let paths = SearchPaths::from_env().with_user_path("lib");
//! let mut loader = ModuleLoader::new(paths);
//! let program = loader.load("src/main.bloch").unwrap();
//!
//! assert!(program.imports.is_empty());
//! assert!(program.function("main").is_some());
//! ```

mod error;
mod loader;
mod search;

pub use error::{ModuleError, ModuleResult};
pub use loader::{ModuleLoader, SOURCE_EXTENSION};
pub use search::{BLOCH_PATH_ENV, BLOCH_STDLIB_PATH_ENV, SearchPaths};

use std::path::Path;

use bloch_syntax::ast::Program;

/// Load `entry` with search paths taken from the environment.
pub fn load_program(entry: impl AsRef<Path>) -> ModuleResult<Program> {
    ModuleLoader::new(SearchPaths::from_env()).load(entry)
}
