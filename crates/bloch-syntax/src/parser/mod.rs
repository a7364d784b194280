//! Recursive-descent parser for Bloch.
//!
//! Parsing stops at the first error; there is no recovery and no partial
//! tree is returned.

mod declaration;
mod expression;
mod statement;
mod types;

use tracing::debug;

use crate::ast::{ImportDeclaration, Position, Program};
use crate::error::{ParseResult, SyntaxError};
use crate::token::{Token, TokenKind};

/// Parse a token stream into a [`Program`].
///
/// The stream should end with an `Eof` token; one is appended if missing.
pub fn parse(tokens: Vec<Token>) -> ParseResult<Program> {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program()?;
    debug!(
        imports = program.imports.len(),
        classes = program.classes.len(),
        functions = program.functions.len(),
        statements = program.statements.len(),
        "parsed program"
    );
    Ok(program)
}

/// Deepest allowed nesting of statements and expressions.
const MAX_NESTING: usize = 128;

/// Parser state.
pub(super) struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    depth: usize,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token::eof(line, column));
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Current token. Past the end this keeps returning the `Eof` token.
    pub(super) fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    /// Kind of the token after the current one.
    pub(super) fn peek_next_kind(&self) -> TokenKind {
        self.peek_kind_at(1)
    }

    pub(super) fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Advance and return the consumed token.
    pub(super) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Check if the current token has the given kind.
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consume the current token if it has the given kind.
    pub(super) fn consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect a specific token, failing with `message` at the current position.
    pub(super) fn expect(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    /// Position of the current token.
    pub(super) fn position(&self) -> Position {
        let token = self.peek();
        Position::new(token.line, token.column)
    }

    /// Parse error at the current token.
    pub(super) fn error(&self, message: impl Into<String>) -> SyntaxError {
        let token = self.peek();
        SyntaxError::parse(token.line, token.column, message)
    }

    /// Run `f` one nesting level deeper, failing once the limit is reached.
    pub(super) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(format!(
                "Nesting too deep (more than {MAX_NESTING} levels)"
            )));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Parse the entire program.
    fn parse_program(&mut self) -> ParseResult<Program> {
        let mut program = Program::new();

        while !self.is_at_end() {
            if self.check(TokenKind::Import) {
                program.imports.push(self.parse_import()?);
            } else if self.check(TokenKind::Static)
                || self.check(TokenKind::Abstract)
                || self.check(TokenKind::Class)
            {
                program.classes.push(self.parse_class()?);
            } else if self.check(TokenKind::Function) || self.check_function_annotation() {
                program.functions.push(self.parse_function()?);
            } else {
                program.statements.extend(self.parse_statement()?);
            }
        }

        Ok(program)
    }

    /// Parse `import a.b.C;`.
    fn parse_import(&mut self) -> ParseResult<ImportDeclaration> {
        let keyword = self.expect(TokenKind::Import, "Expected 'import'")?;
        let path = self.parse_qualified_name()?;
        self.expect(TokenKind::Semicolon, "Expected ';' after import statement")?;
        Ok(ImportDeclaration {
            path,
            pos: Position::new(keyword.line, keyword.column),
        })
    }

    /// Parse a dotted name such as `pkg.sub.Name`.
    pub(super) fn parse_qualified_name(&mut self) -> ParseResult<Vec<String>> {
        let first = self.expect(TokenKind::Identifier, "Expected identifier")?;
        let mut parts = vec![first.text];
        while self.consume(TokenKind::Dot) {
            let part = self.expect(TokenKind::Identifier, "Expected identifier after '.'")?;
            parts.push(part.text);
        }
        Ok(parts)
    }
}
