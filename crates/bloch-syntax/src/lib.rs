//! Front end for the Bloch language
//!
//! This crate turns Bloch source text into a [`Program`](ast::Program): a
//! `logos` lexer produces positioned tokens and a recursive-descent parser
//! builds the tree. Parsing stops at the first error.
//!
//! # Supported Constructs
//!
//! | Construct | Example |
//! |-----------|---------|
//! | Imports | `import std.gates;` |
//! | Variables | `final int N = 4;`, `@tracked qubit a, b;` |
//! | Arrays | `qubit[N * 2] reg;`, `bit[] out = {0b, 1b};` |
//! | Functions | `@quantum function flip(qubit q) -> bit { ... }` |
//! | Classes | `abstract class Gate extends base.Op { ... }` |
//! | Control flow | `if`, `for`, `while`, statement-level `c ? s1 : s2` |
//! | Quantum statements | `reset q;`, `measure q;`, `echo(x);` |
//!
//! # Example
//!
//! ```rust
//! use bloch_syntax::ast::StatementKind;
//! use bloch_syntax::parse_source;
//!
//! let source = r#"
//!     @quantum
//!     function main() -> bit {
//!         qubit q;
//!         return measure q;
//!     }
//!     qubit a, b;
//! "#;
//!
//! let program = parse_source(source).unwrap();
//! assert_eq!(program.functions.len(), 1);
//! assert_eq!(program.statements.len(), 2);
//! assert!(matches!(
//!     program.statements[0].kind,
//!     StatementKind::VariableDeclaration(_)
//! ));
//! ```

pub mod ast;
mod error;
mod lexer;
mod parser;
mod token;

pub use error::{ErrorCategory, ParseResult, SyntaxError};
pub use lexer::tokenize;
pub use parser::parse;
pub use token::{Token, TokenKind};

/// Tokenize and parse `source` in one step.
pub fn parse_source(source: &str) -> ParseResult<ast::Program> {
    parse(tokenize(source)?)
}
