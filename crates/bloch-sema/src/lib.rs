//! Semantic groundwork for Bloch
//!
//! Provides the nested-scope [`SymbolTable`] that binding passes build on,
//! and the [`ArraySizeFolder`] that resolves array sizes written as
//! constant expressions.
//!
//! # Example
//!
//! ```rust
//! use bloch_sema::fold_array_sizes;
//! use bloch_syntax::ast::{StatementKind, Type};
//! use bloch_syntax::parse_source;
//!
//! let mut program = parse_source("final int N = 3; qubit[N + 1] reg;").unwrap();
//! fold_array_sizes(&mut program).unwrap();
//!
//! let StatementKind::VariableDeclaration(reg) = &program.statements[1].kind else {
//!     unreachable!()
//! };
//! assert!(matches!(reg.ty, Type::Array { size: Some(4), .. }));
//! ```

mod consts;
mod error;
mod symbols;

pub use consts::{ArraySizeFolder, fold_array_sizes};
pub use error::{SemaError, SemaResult};
pub use symbols::{SymbolInfo, SymbolTable, ValueType};
