//! Statement parsing for Bloch.

use super::Parser;
use super::declaration::AnnotationSite;
use crate::ast::{Block, Position, Statement, StatementKind, Type, VariableDeclaration};
use crate::error::{ParseResult, SyntaxError};
use crate::token::TokenKind;

impl Parser {
    /// Parse a statement.
    ///
    /// Usually yields one statement. A multi-declaration such as
    /// `qubit a, b, c;` yields one declaration per name, in source order.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Vec<Statement>> {
        self.nested(Self::parse_statement_body)
    }

    fn parse_statement_body(&mut self) -> ParseResult<Vec<Statement>> {
        if self.check(TokenKind::LBrace) {
            let block = self.parse_block()?;
            let pos = block.pos;
            return Ok(vec![Statement::new(StatementKind::Block(block), pos)]);
        }

        let is_final = self.consume(TokenKind::Final);
        if self.check(TokenKind::At) || self.is_type_ahead() {
            return self.parse_variable_declaration(None, is_final, true);
        }
        if is_final {
            return Err(self.error("Expected variable type after 'final'"));
        }

        let kind = self.peek().kind;
        let statement = match kind {
            TokenKind::Return => self.parse_return()?,
            TokenKind::If => self.parse_if()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::Echo => self.parse_echo()?,
            TokenKind::Reset => self.parse_reset()?,
            TokenKind::Measure => self.parse_measure()?,
            TokenKind::Identifier if self.peek_next_kind() == TokenKind::Equals => {
                self.parse_assignment()?
            }
            _ => self.parse_expression_or_ternary()?,
        };
        Ok(vec![statement])
    }

    /// Parse a statement that must not expand into several.
    fn parse_single_statement(&mut self) -> ParseResult<Statement> {
        let pos = self.position();
        let mut statements = self.parse_statement()?;
        if statements.len() != 1 {
            return Err(SyntaxError::parse(
                pos.line,
                pos.column,
                "Multiple declarations not allowed in this context",
            ));
        }
        Ok(statements.remove(0))
    }

    /// Parse `{ ... }`.
    pub(super) fn parse_block(&mut self) -> ParseResult<Block> {
        let lbrace = self.expect(TokenKind::LBrace, "Expected '{' to start block")?;
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            statements.extend(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace, "Expected '}' to end block")?;
        Ok(Block {
            statements,
            pos: Position::new(lbrace.line, lbrace.column),
        })
    }

    /// Parse a variable declaration after an optional `final`.
    ///
    /// `pre_parsed` carries a type the caller already consumed. Extra names
    /// after a comma are only accepted for uninitialised `qubit`
    /// declarations and only when `allow_multiple` is set.
    pub(super) fn parse_variable_declaration(
        &mut self,
        pre_parsed: Option<Type>,
        is_final: bool,
        allow_multiple: bool,
    ) -> ParseResult<Vec<Statement>> {
        let annotations = self.parse_annotations(AnnotationSite::Variable)?;
        let is_tracked = annotations.iter().any(|a| a.name == "tracked");

        let ty = match pre_parsed {
            Some(ty) => ty,
            None => self.parse_type()?,
        };

        let name = self.expect(TokenKind::Identifier, "Expected variable name")?;
        let initializer = if self.consume(TokenKind::Equals) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let mut extra = Vec::new();
        while self.consume(TokenKind::Comma) {
            if !allow_multiple {
                return Err(self.error("Multiple declarations not allowed in this context"));
            }
            if !ty.is_qubit() {
                return Err(self.error("only 'qubit' may be multi-declared"));
            }
            if initializer.is_some() {
                return Err(self.error("Cannot initialise multiple qubit declarations"));
            }
            let sibling = self.expect(TokenKind::Identifier, "Expected variable name after ','")?;
            extra.push(Statement::new(
                StatementKind::VariableDeclaration(VariableDeclaration {
                    name: sibling.text,
                    ty: self.clone_type(&ty)?,
                    initializer: None,
                    annotations: Self::clone_annotations(&annotations),
                    is_final,
                    is_tracked,
                }),
                Position::new(sibling.line, sibling.column),
            ));
        }

        self.expect(TokenKind::Semicolon, "expected ';' after declaration")?;

        let mut statements = Vec::with_capacity(extra.len() + 1);
        statements.push(Statement::new(
            StatementKind::VariableDeclaration(VariableDeclaration {
                name: name.text,
                ty,
                initializer,
                annotations,
                is_final,
                is_tracked,
            }),
            Position::new(name.line, name.column),
        ));
        statements.extend(extra);
        Ok(statements)
    }

    /// Parse `return [expr];`.
    fn parse_return(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance();
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon, "Expected ';' after return value")?;
        Ok(Statement::new(
            StatementKind::Return(value),
            Position::new(keyword.line, keyword.column),
        ))
    }

    /// Parse if statement.
    fn parse_if(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance();
        self.expect(TokenKind::LParen, "Expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "Expected ')' after condition")?;

        let then_branch = self.parse_block()?;
        let else_branch = if self.consume(TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Statement::new(
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            },
            Position::new(keyword.line, keyword.column),
        ))
    }

    /// Parse for loop.
    fn parse_for(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance();
        self.expect(TokenKind::LParen, "Expected '(' after 'for'")?;

        let initializer = if self.consume(TokenKind::Semicolon) {
            None
        } else {
            let is_final = self.consume(TokenKind::Final);
            if self.is_type_ahead() {
                let ty = self.parse_type()?;
                let mut declared = self.parse_variable_declaration(Some(ty), is_final, false)?;
                Some(Box::new(declared.remove(0)))
            } else if is_final {
                return Err(self.error("Expected variable type after 'final'"));
            } else {
                Some(Box::new(self.parse_expression_statement()?))
            }
        };

        let condition = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "Expected ';' after loop condition")?;
        let increment = self.parse_expression()?;
        self.expect(TokenKind::RParen, "Expected ')' after for clause")?;
        let body = self.parse_block()?;

        Ok(Statement::new(
            StatementKind::For {
                initializer,
                condition,
                increment,
                body,
            },
            Position::new(keyword.line, keyword.column),
        ))
    }

    /// Parse while loop.
    fn parse_while(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance();
        self.expect(TokenKind::LParen, "Expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "Expected ')' after condition")?;
        let body = self.parse_block()?;
        Ok(Statement::new(
            StatementKind::While { condition, body },
            Position::new(keyword.line, keyword.column),
        ))
    }

    /// Parse `echo(expr);`.
    fn parse_echo(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance();
        self.expect(TokenKind::LParen, "Expected '(' after 'echo'")?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::RParen, "Expected ')' after echo argument")?;
        self.expect(TokenKind::Semicolon, "Expected ';' after echo statement")?;
        Ok(Statement::new(
            StatementKind::Echo(value),
            Position::new(keyword.line, keyword.column),
        ))
    }

    /// Parse `reset q;`.
    fn parse_reset(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance();
        let target = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "Expected ';' after reset target")?;
        Ok(Statement::new(
            StatementKind::Reset(target),
            Position::new(keyword.line, keyword.column),
        ))
    }

    /// Parse `measure q;`.
    fn parse_measure(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance();
        let qubit = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "Expected ';' after measure target")?;
        Ok(Statement::new(
            StatementKind::Measure(qubit),
            Position::new(keyword.line, keyword.column),
        ))
    }

    /// Parse `name = expr;`.
    fn parse_assignment(&mut self) -> ParseResult<Statement> {
        let name = self.expect(TokenKind::Identifier, "Expected variable name in assignment")?;
        self.expect(TokenKind::Equals, "Expected '=' in assignment")?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "Expected ';' after assignment")?;
        Ok(Statement::new(
            StatementKind::Assignment {
                name: name.text,
                value,
            },
            Position::new(name.line, name.column),
        ))
    }

    /// Parse `expr;` or the statement-level ternary `cond ? stmt : stmt`.
    fn parse_expression_or_ternary(&mut self) -> ParseResult<Statement> {
        let pos = self.position();
        let expression = self.parse_expression()?;

        if self.consume(TokenKind::Question) {
            let then_branch = self.parse_single_statement()?;
            self.expect(TokenKind::Colon, "Expected ':' after true branch")?;
            let else_branch = self.parse_single_statement()?;
            return Ok(Statement::new(
                StatementKind::Ternary {
                    condition: expression,
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                },
                pos,
            ));
        }

        self.expect(TokenKind::Semicolon, "Expected ';' after expression")?;
        Ok(Statement::new(StatementKind::Expression(expression), pos))
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let pos = self.position();
        let expression = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "Expected ';' after expression")?;
        Ok(Statement::new(StatementKind::Expression(expression), pos))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{ExpressionKind, LiteralKind, Program, StatementKind, Type};
    use crate::error::ParseResult;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn parse_str(source: &str) -> ParseResult<Program> {
        parse(tokenize(source)?)
    }

    fn declaration(program: &Program, i: usize) -> &crate::ast::VariableDeclaration {
        match &program.statements[i].kind {
            StatementKind::VariableDeclaration(v) => v,
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_declaration() {
        let program = parse_str("int x;").unwrap();
        assert_eq!(program.statements.len(), 1);
        let v = declaration(&program, 0);
        assert_eq!(v.name, "x");
        assert_eq!(v.ty, Type::primitive("int"));
        assert!(v.initializer.is_none());
        assert!(!v.is_final);
    }

    #[test]
    fn test_final_declaration_with_initializer() {
        let program = parse_str("final int x = 10;").unwrap();
        let v = declaration(&program, 0);
        assert!(v.is_final);
        assert_eq!(v.ty, Type::primitive("int"));
        let init = v.initializer.as_ref().unwrap();
        assert_eq!(
            init.kind,
            ExpressionKind::Literal {
                value: "10".into(),
                kind: LiteralKind::Int
            }
        );
    }

    #[test]
    fn test_qubit_multi_declaration() {
        let program = parse_str("qubit q, r;").unwrap();
        assert_eq!(program.statements.len(), 2);
        assert_eq!(declaration(&program, 0).name, "q");
        assert_eq!(declaration(&program, 1).name, "r");
        assert!(declaration(&program, 1).ty.is_qubit());
        assert_eq!(program.statements[1].pos.column, 10);
    }

    #[test]
    fn test_tracked_multi_declaration_copies_annotations() {
        let program = parse_str("@tracked qubit a, b, c;").unwrap();
        assert_eq!(program.statements.len(), 3);
        for i in 0..3 {
            let v = declaration(&program, i);
            assert!(v.is_tracked);
            assert_eq!(v.annotations.len(), 1);
            assert_eq!(v.annotations[0].name, "tracked");
        }
    }

    #[test]
    fn test_multi_declaration_expands_inside_blocks() {
        let program = parse_str("function main() -> void { qubit a, b; echo(a); }").unwrap();
        let body = &program.functions[0].body.statements;
        assert_eq!(body.len(), 3);
        assert!(matches!(body[2].kind, StatementKind::Echo(_)));
    }

    #[test]
    fn test_non_qubit_multi_declaration_fails() {
        let err = parse_str("int a, b;").unwrap_err();
        assert_eq!(err.message(), "only 'qubit' may be multi-declared");
    }

    #[test]
    fn test_initialised_qubit_multi_declaration_fails() {
        let err = parse_str("qubit a = q, b;").unwrap_err();
        assert_eq!(err.message(), "Cannot initialise multiple qubit declarations");
    }

    #[test]
    fn test_multi_declaration_in_for_initializer_fails() {
        let err = parse_str("for (qubit a, b; i < 3; i++) { }").unwrap_err();
        assert_eq!(err.message(), "Multiple declarations not allowed in this context");
    }

    #[test]
    fn test_missing_name_after_comma() {
        let err = parse_str("qubit a, ;").unwrap_err();
        assert_eq!(err.message(), "Expected variable name after ','");
    }

    #[test]
    fn test_final_without_type_fails() {
        let err = parse_str("final x = 3;").unwrap_err();
        assert_eq!(err.message(), "Expected variable type after 'final'");
    }

    #[test]
    fn test_invalid_variable_annotation() {
        let err = parse_str("function main() -> void { @quantum int x; }").unwrap_err();
        assert_eq!(
            err.message(),
            "\"@quantum\" is not a valid Bloch variable annotation"
        );
    }

    #[test]
    fn test_if_else_requires_blocks() {
        let program = parse_str("if (x > 1) { echo(x); } else { echo(0); }").unwrap();
        let StatementKind::If { else_branch, .. } = &program.statements[0].kind else {
            panic!("expected if");
        };
        assert!(else_branch.is_some());

        let err = parse_str("if (x) echo(x);").unwrap_err();
        assert_eq!(err.message(), "Expected '{' to start block");
    }

    #[test]
    fn test_for_loop_parts() {
        let program = parse_str("for (int i = 0; i < 4; i++) { echo(i); }").unwrap();
        let StatementKind::For {
            initializer,
            condition,
            increment,
            body,
        } = &program.statements[0].kind
        else {
            panic!("expected for");
        };
        assert!(matches!(
            initializer.as_deref().map(|s| &s.kind),
            Some(StatementKind::VariableDeclaration(_))
        ));
        assert!(matches!(condition.kind, ExpressionKind::Binary { .. }));
        assert!(matches!(increment.kind, ExpressionKind::Postfix { .. }));
        assert_eq!(body.statements.len(), 1);
    }

    #[test]
    fn test_for_with_expression_and_empty_initializer() {
        let program = parse_str("for (i = 0; i < 2; i++) { } for (; i < 4; i++) { }").unwrap();
        let StatementKind::For { initializer, .. } = &program.statements[0].kind else {
            panic!("expected for");
        };
        assert!(matches!(
            initializer.as_deref().map(|s| &s.kind),
            Some(StatementKind::Expression(_))
        ));
        let StatementKind::For { initializer, .. } = &program.statements[1].kind else {
            panic!("expected for");
        };
        assert!(initializer.is_none());
    }

    #[test]
    fn test_keyword_statements_carry_keyword_position() {
        let program = parse_str("qubit q;\n  reset q;\n  measure q;\n  echo(\"hi\");").unwrap();
        assert!(matches!(program.statements[1].kind, StatementKind::Reset(_)));
        assert_eq!(
            (program.statements[1].pos.line, program.statements[1].pos.column),
            (2, 3)
        );
        assert!(matches!(program.statements[2].kind, StatementKind::Measure(_)));
        assert_eq!(program.statements[3].pos.line, 4);
    }

    #[test]
    fn test_assignment_statement() {
        let program = parse_str("x = 1 + 2;").unwrap();
        let StatementKind::Assignment { name, value } = &program.statements[0].kind else {
            panic!("expected assignment statement");
        };
        assert_eq!(name, "x");
        assert!(matches!(value.kind, ExpressionKind::Binary { .. }));
    }

    #[test]
    fn test_ternary_statement_branches_are_statements() {
        let program = parse_str("x > 0 ? echo(1); : echo(2);").unwrap();
        let StatementKind::Ternary {
            then_branch,
            else_branch,
            ..
        } = &program.statements[0].kind
        else {
            panic!("expected ternary statement");
        };
        assert!(matches!(then_branch.kind, StatementKind::Echo(_)));
        assert!(matches!(else_branch.kind, StatementKind::Echo(_)));
    }

    #[test]
    fn test_ternary_requires_colon() {
        let err = parse_str("x ? echo(1); echo(2);").unwrap_err();
        assert_eq!(err.message(), "Expected ':' after true branch");
    }

    #[test]
    fn test_expression_statement_requires_semicolon() {
        let err = parse_str("f(1)").unwrap_err();
        assert_eq!(err.message(), "Expected ';' after expression");
    }

    #[test]
    fn test_named_type_declaration() {
        let program = parse_str("geo.Point p = new geo.Point(1, 2);").unwrap();
        let v = declaration(&program, 0);
        assert_eq!(
            v.ty,
            Type::Named {
                parts: vec!["geo".into(), "Point".into()]
            }
        );
        assert!(matches!(
            v.initializer.as_ref().map(|e| &e.kind),
            Some(ExpressionKind::New { .. })
        ));
    }

    #[test]
    fn test_deeply_nested_blocks_fail_cleanly() {
        let source = format!("{}{}", "{".repeat(1000), "}".repeat(1000));
        let err = parse_str(&source).unwrap_err();
        assert!(err.message().starts_with("Nesting too deep"));

        let source = format!("{}{}", "{".repeat(50), "}".repeat(50));
        assert_eq!(parse_str(&source).unwrap().statements.len(), 1);
    }

    #[test]
    fn test_return_without_value() {
        let program = parse_str("function f() -> void { return; }").unwrap();
        assert!(matches!(
            program.functions[0].body.statements[0].kind,
            StatementKind::Return(None)
        ));
    }
}
