//! Type parsing for Bloch.

use super::Parser;
use crate::ast::{Annotation, Expression, Type};
use crate::error::{ParseResult, SyntaxError};
use crate::token::TokenKind;

impl Parser {
    /// Parse a type, including a single optional array suffix on primitives.
    pub(super) fn parse_type(&mut self) -> ParseResult<Type> {
        let pos = self.position();
        let kind = self.peek().kind;
        let base = match kind {
            TokenKind::Void => {
                self.advance();
                Type::Void
            }
            _ if kind.is_primitive_type() => Type::primitive(self.advance().text),
            TokenKind::Identifier => {
                return Ok(Type::Named {
                    parts: self.parse_qualified_name()?,
                });
            }
            _ => return Err(self.error("Expected type")),
        };

        if !self.consume(TokenKind::LBracket) {
            return Ok(base);
        }

        let (size, size_expression) = self.parse_array_size()?;
        self.expect(TokenKind::RBracket, "Expected ']' after '[' in array type")?;
        if base == Type::Void {
            return Err(self.error("array element type cannot be 'void'"));
        }

        Ok(Type::Array {
            element: Box::new(base),
            size,
            size_expression: size_expression.map(Box::new),
            pos,
        })
    }

    /// Parse what sits between `[` and `]` of an array type.
    fn parse_array_size(&mut self) -> ParseResult<(Option<usize>, Option<Expression>)> {
        let kind = self.peek().kind;
        match kind {
            TokenKind::RBracket => Ok((None, None)),
            TokenKind::IntegerLiteral if self.peek_next_kind() == TokenKind::RBracket => {
                let token = self.peek().clone();
                let size = token.text.parse::<usize>().map_err(|_| {
                    SyntaxError::parse(
                        token.line,
                        token.column,
                        "Invalid integer size in array type",
                    )
                })?;
                self.advance();
                Ok((Some(size), None))
            }
            TokenKind::IntegerLiteral | TokenKind::Identifier | TokenKind::LParen => {
                Ok((None, Some(self.parse_expression()?)))
            }
            _ => Err(self.error("Expected integer literal or constant expression for array size")),
        }
    }

    /// Whether the upcoming tokens start a typed declaration.
    ///
    /// Primitive and `void` keywords always do. An identifier does when it is
    /// a (possibly dotted) name immediately followed by another identifier,
    /// as in `Point p` or `geo.Point p`.
    pub(super) fn is_type_ahead(&self) -> bool {
        let kind = self.peek().kind;
        if kind == TokenKind::Void || kind.is_primitive_type() {
            return true;
        }
        if kind != TokenKind::Identifier {
            return false;
        }

        let mut offset = 0;
        while self.peek_kind_at(offset + 1) == TokenKind::Dot
            && self.peek_kind_at(offset + 2) == TokenKind::Identifier
        {
            offset += 2;
        }
        self.peek_kind_at(offset + 1) == TokenKind::Identifier
    }

    /// Deep-copy a declared type for a desugared sibling declaration.
    ///
    /// Only primitive, array and void types are copied; user types never
    /// appear in multi-declarations.
    pub(super) fn clone_type(&self, ty: &Type) -> ParseResult<Type> {
        match ty {
            Type::Primitive { name } => Ok(Type::primitive(name.clone())),
            Type::Void => Ok(Type::Void),
            Type::Array {
                element,
                size,
                size_expression,
                pos,
            } => Ok(Type::Array {
                element: Box::new(self.clone_type(element)?),
                size: *size,
                size_expression: size_expression.clone(),
                pos: *pos,
            }),
            Type::Named { parts } => Err(self.error(format!(
                "cannot duplicate user type '{}' in a multi-declaration",
                parts.join(".")
            ))),
        }
    }

    pub(super) fn clone_annotations(annotations: &[Annotation]) -> Vec<Annotation> {
        annotations.to_vec()
    }
}
