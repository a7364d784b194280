//! Expression parsing for Bloch.

use super::Parser;
use crate::ast::{
    BinaryOp, Expression, ExpressionKind, LiteralKind, Position, PostfixOp, UnaryOp,
};
use crate::error::{ParseResult, SyntaxError};
use crate::token::{Token, TokenKind};

/// Binary operator levels from loosest to tightest binding.
const BINARY_LEVELS: &[&[(TokenKind, BinaryOp)]] = &[
    &[(TokenKind::PipePipe, BinaryOp::Or)],
    &[(TokenKind::AmpersandAmpersand, BinaryOp::And)],
    &[(TokenKind::Pipe, BinaryOp::BitOr)],
    &[(TokenKind::Caret, BinaryOp::BitXor)],
    &[(TokenKind::Ampersand, BinaryOp::BitAnd)],
    &[
        (TokenKind::EqualEqual, BinaryOp::Eq),
        (TokenKind::BangEqual, BinaryOp::NotEq),
    ],
    &[
        (TokenKind::Less, BinaryOp::Lt),
        (TokenKind::Greater, BinaryOp::Gt),
        (TokenKind::LessEqual, BinaryOp::LtEq),
        (TokenKind::GreaterEqual, BinaryOp::GtEq),
    ],
    &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
    &[
        (TokenKind::Star, BinaryOp::Mul),
        (TokenKind::Slash, BinaryOp::Div),
        (TokenKind::Percent, BinaryOp::Mod),
    ],
];

fn token_pos(token: &Token) -> Position {
    Position::new(token.line, token.column)
}

impl Parser {
    /// Parse an expression.
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.nested(Self::parse_assignment_expression)
    }

    /// Parse a right-associative assignment.
    ///
    /// The target is parsed as an ordinary expression first and then
    /// reinterpreted: a variable, an index or a member access.
    fn parse_assignment_expression(&mut self) -> ParseResult<Expression> {
        let target = self.parse_binary(0)?;
        if !self.check(TokenKind::Equals) {
            return Ok(target);
        }
        let equals = self.advance();

        let pos = target.pos;
        let kind = match target.kind {
            ExpressionKind::Variable { name } => ExpressionKind::Assignment {
                name,
                value: Box::new(self.parse_expression()?),
            },
            ExpressionKind::Index { collection, index } => ExpressionKind::ArrayAssignment {
                collection,
                index,
                value: Box::new(self.parse_expression()?),
            },
            ExpressionKind::MemberAccess { object, member } => ExpressionKind::MemberAssignment {
                object,
                member,
                value: Box::new(self.parse_expression()?),
            },
            _ => {
                return Err(SyntaxError::parse(
                    equals.line,
                    equals.column,
                    "Invalid assignment target",
                ));
            }
        };
        Ok(Expression::new(kind, pos))
    }

    /// Parse one left-associative binary level.
    fn parse_binary(&mut self, level: usize) -> ParseResult<Expression> {
        let Some(operators) = BINARY_LEVELS.get(level) else {
            return self.parse_unary();
        };

        let mut left = self.parse_binary(level + 1)?;
        loop {
            let current = self.peek().kind;
            let Some(&(_, op)) = operators.iter().find(|(kind, _)| *kind == current) else {
                break;
            };
            let operator = self.advance();
            let right = self.parse_binary(level + 1)?;
            left = Expression::new(
                ExpressionKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                token_pos(&operator),
            );
        }
        Ok(left)
    }

    /// Parse unary expression.
    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let kind = self.peek().kind;
        let op = match kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            _ => return self.parse_call(),
        };
        let operator = self.advance();
        let operand = self.nested(Self::parse_unary)?;
        Ok(Expression::new(
            ExpressionKind::Unary {
                op,
                operand: Box::new(operand),
            },
            token_pos(&operator),
        ))
    }

    /// Parse a primary followed by any chain of calls, indexes, member
    /// accesses and postfix increments.
    fn parse_call(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;

        loop {
            let kind = self.peek().kind;
            expr = match kind {
                TokenKind::LParen => {
                    self.advance();
                    let arguments = self.parse_argument_list()?;
                    self.expect(TokenKind::RParen, "Expected ')' after arguments")?;
                    let pos = expr.pos;
                    Expression::new(
                        ExpressionKind::Call {
                            callee: Box::new(expr),
                            arguments,
                        },
                        pos,
                    )
                }
                TokenKind::LBracket => {
                    let bracket = self.advance();
                    let index = self.parse_expression()?;
                    if is_negative_literal(&index) {
                        return Err(SyntaxError::parse(
                            bracket.line,
                            bracket.column,
                            "array index must be non-negative",
                        ));
                    }
                    self.expect(TokenKind::RBracket, "Expected ']' after index expression")?;
                    Expression::new(
                        ExpressionKind::Index {
                            collection: Box::new(expr),
                            index: Box::new(index),
                        },
                        token_pos(&bracket),
                    )
                }
                TokenKind::Dot => {
                    let dot = self.advance();
                    let member =
                        self.expect(TokenKind::Identifier, "Expected member name after '.'")?;
                    Expression::new(
                        ExpressionKind::MemberAccess {
                            object: Box::new(expr),
                            member: member.text,
                        },
                        token_pos(&dot),
                    )
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let operator = self.advance();
                    let op = if operator.kind == TokenKind::PlusPlus {
                        PostfixOp::Increment
                    } else {
                        PostfixOp::Decrement
                    };
                    Expression::new(
                        ExpressionKind::Postfix {
                            op,
                            operand: Box::new(expr),
                        },
                        token_pos(&operator),
                    )
                }
                _ => break,
            };
        }

        Ok(expr)
    }

    /// Parse primary expression.
    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let token = self.peek().clone();
        let pos = token_pos(&token);

        let literal = match token.kind {
            TokenKind::IntegerLiteral => Some(LiteralKind::Int),
            TokenKind::FloatLiteral => Some(LiteralKind::Float),
            TokenKind::BitLiteral => Some(LiteralKind::Bit),
            TokenKind::StringLiteral => Some(LiteralKind::String),
            TokenKind::CharLiteral => Some(LiteralKind::Char),
            _ => None,
        };
        if let Some(kind) = literal {
            self.advance();
            return Ok(Expression::new(
                ExpressionKind::Literal {
                    value: token.text,
                    kind,
                },
                pos,
            ));
        }

        let kind = match token.kind {
            TokenKind::Null => {
                self.advance();
                ExpressionKind::Null
            }
            TokenKind::This => {
                self.advance();
                ExpressionKind::This
            }
            TokenKind::Super => {
                self.advance();
                ExpressionKind::Super
            }
            TokenKind::Measure => {
                self.advance();
                ExpressionKind::Measure(Box::new(self.parse_expression()?))
            }
            TokenKind::New => {
                self.advance();
                let class_type = self.parse_type()?;
                self.expect(
                    TokenKind::LParen,
                    "Expected '(' after type in 'new' expression",
                )?;
                let arguments = self.parse_argument_list()?;
                self.expect(TokenKind::RParen, "Expected ')' after arguments")?;
                ExpressionKind::New {
                    class_type,
                    arguments,
                }
            }
            TokenKind::Identifier => {
                self.advance();
                ExpressionKind::Variable { name: token.text }
            }
            TokenKind::LBrace => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(TokenKind::RBrace) {
                    elements.push(self.parse_expression()?);
                    while self.consume(TokenKind::Comma) {
                        elements.push(self.parse_expression()?);
                    }
                }
                self.expect(TokenKind::RBrace, "Expected '}' after array literal")?;
                ExpressionKind::ArrayLiteral { elements }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "Expected ')' after expression")?;
                ExpressionKind::Parenthesized(Box::new(inner))
            }
            _ => return Err(self.error("Expected expression")),
        };
        Ok(Expression::new(kind, pos))
    }

    /// Parse a comma-separated argument list up to (not including) `)`.
    fn parse_argument_list(&mut self) -> ParseResult<Vec<Expression>> {
        if self.check(TokenKind::RParen) {
            return Ok(vec![]);
        }
        let mut arguments = vec![self.parse_expression()?];
        while self.consume(TokenKind::Comma) {
            arguments.push(self.parse_expression()?);
        }
        Ok(arguments)
    }
}

/// Literal negative index: a negative integer literal, or unary minus on an
/// integer literal with a nonzero digit. `-0` is allowed.
fn is_negative_literal(index: &Expression) -> bool {
    match &index.kind {
        ExpressionKind::Literal {
            value,
            kind: LiteralKind::Int,
        } => value.starts_with('-'),
        ExpressionKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } => matches!(
            &operand.kind,
            ExpressionKind::Literal { value, kind: LiteralKind::Int }
                if value.bytes().any(|b| matches!(b, b'1'..=b'9'))
        ),
        _ => false,
    }
}
