//! Constant folding of array sizes.
//!
//! Array types written with a size expression (`qubit[N * 2]`) get their
//! `size` filled in from compile-time constant integers. A constant is an
//! integer literal, a `final int` whose initializer is itself constant, or
//! parentheses, unary `-`/`~` and the arithmetic and bitwise binary
//! operators applied to constants.

use bloch_syntax::ast::{
    BinaryOp, Block, ClassDeclaration, ClassMember, Expression, ExpressionKind,
    FunctionDeclaration, Parameter, Program, Statement, StatementKind, Type, UnaryOp,
    VariableDeclaration,
};
use tracing::{debug, instrument, trace};

use crate::error::{SemaError, SemaResult};
use crate::symbols::{SymbolInfo, SymbolTable, ValueType};

/// Walks a program and folds every array size expression.
#[derive(Debug, Default)]
pub struct ArraySizeFolder {
    symbols: SymbolTable,
    folded: usize,
}

impl ArraySizeFolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbols left after the last fold. Only the global scope remains open.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Fold all array sizes in `program` in place.
    ///
    /// Top-level statements are visited first so global constants are
    /// visible inside classes and functions.
    #[instrument(skip_all)]
    pub fn fold_program(&mut self, program: &mut Program) -> SemaResult<()> {
        self.symbols = SymbolTable::new();
        self.folded = 0;
        self.symbols.begin_scope();

        for class in &program.classes {
            self.symbols
                .declare_symbol(class.name.clone(), SymbolInfo::type_name(class.name.clone()));
        }
        for statement in &mut program.statements {
            self.fold_statement(statement)?;
        }
        for class in &mut program.classes {
            self.fold_class(class)?;
        }
        for function in &mut program.functions {
            self.fold_function(function)?;
        }

        debug!(folded = self.folded, "folded array sizes");
        Ok(())
    }

    /// Run `f` inside a fresh scope.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> SemaResult<T>) -> SemaResult<T> {
        self.symbols.begin_scope();
        let result = f(self);
        self.symbols.end_scope();
        result
    }

    fn fold_class(&mut self, class: &mut ClassDeclaration) -> SemaResult<()> {
        self.scoped(|this| {
            for member in &mut class.members {
                if let ClassMember::Field(field) = member {
                    this.fold_type(&mut field.ty)?;
                    this.declare(&field.name, field.is_final, &field.ty);
                    if field.is_final {
                        this.record_constant(&field.name, &field.ty, field.initializer.as_ref())?;
                    }
                }
            }

            for member in &mut class.members {
                match member {
                    ClassMember::Field(_) => {}
                    ClassMember::Method(method) => {
                        this.fold_type(&mut method.return_type)?;
                        let body = method.body.as_mut();
                        this.fold_callable(&mut method.params, body)?;
                    }
                    ClassMember::Constructor(ctor) => {
                        let body = ctor.body.as_mut();
                        this.fold_callable(&mut ctor.params, body)?;
                    }
                    ClassMember::Destructor(dtor) => {
                        if let Some(body) = dtor.body.as_mut() {
                            this.fold_block(body)?;
                        }
                    }
                }
            }
            Ok(())
        })
    }

    fn fold_function(&mut self, function: &mut FunctionDeclaration) -> SemaResult<()> {
        self.fold_type(&mut function.return_type)?;
        self.fold_callable(&mut function.params, Some(&mut function.body))
    }

    /// Parameters share a scope that encloses the body's own scope.
    fn fold_callable(
        &mut self,
        params: &mut [Parameter],
        body: Option<&mut Block>,
    ) -> SemaResult<()> {
        self.scoped(|this| {
            for param in params.iter_mut() {
                this.fold_type(&mut param.ty)?;
                this.declare(&param.name, false, &param.ty);
            }
            match body {
                Some(body) => this.fold_block(body),
                None => Ok(()),
            }
        })
    }

    fn fold_block(&mut self, block: &mut Block) -> SemaResult<()> {
        self.scoped(|this| {
            for statement in &mut block.statements {
                this.fold_statement(statement)?;
            }
            Ok(())
        })
    }

    fn fold_statement(&mut self, statement: &mut Statement) -> SemaResult<()> {
        match &mut statement.kind {
            StatementKind::VariableDeclaration(var) => self.fold_variable(var),
            StatementKind::Block(block) => self.fold_block(block),
            StatementKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.fold_block(then_branch)?;
                match else_branch {
                    Some(block) => self.fold_block(block),
                    None => Ok(()),
                }
            }
            StatementKind::For {
                initializer, body, ..
            } => self.scoped(|this| {
                if let Some(init) = initializer {
                    this.fold_statement(init)?;
                }
                this.fold_block(body)
            }),
            StatementKind::While { body, .. } => self.fold_block(body),
            StatementKind::Ternary {
                then_branch,
                else_branch,
                ..
            } => {
                self.scoped(|this| this.fold_statement(then_branch))?;
                self.scoped(|this| this.fold_statement(else_branch))
            }
            _ => Ok(()),
        }
    }

    fn fold_variable(&mut self, var: &mut VariableDeclaration) -> SemaResult<()> {
        self.fold_type(&mut var.ty)?;
        self.declare(&var.name, var.is_final, &var.ty);
        if var.is_final {
            self.record_constant(&var.name, &var.ty, var.initializer.as_ref())?;
        }
        Ok(())
    }

    fn declare(&mut self, name: &str, is_final: bool, ty: &Type) {
        let info = match ty {
            Type::Named { parts } => match parts.last() {
                Some(class) => SymbolInfo::class_value(is_final, class.clone()),
                None => SymbolInfo::new(is_final, ValueType::Unknown),
            },
            _ => SymbolInfo::new(is_final, ValueType::of(ty)),
        };
        self.symbols.declare_symbol(name, info);
    }

    /// Remember the value of a `final int` with a constant initializer.
    fn record_constant(
        &mut self,
        name: &str,
        ty: &Type,
        initializer: Option<&Expression>,
    ) -> SemaResult<()> {
        let is_int = matches!(ty, Type::Primitive { name: prim } if prim == "int");
        if let (true, Some(init)) = (is_int, initializer) {
            if let Some(value) = self.eval(init)? {
                trace!(name, value, "recorded constant");
                self.symbols.set_const_int(name, value);
            }
        }
        Ok(())
    }

    fn fold_type(&mut self, ty: &mut Type) -> SemaResult<()> {
        let Type::Array {
            size,
            size_expression: Some(expr),
            pos,
            ..
        } = ty
        else {
            return Ok(());
        };

        let value = self
            .eval(expr)?
            .ok_or_else(|| SemaError::non_constant(expr.pos))?;
        if value < 0 {
            return Err(SemaError::NegativeArraySize {
                line: expr.pos.line,
                column: expr.pos.column,
                value,
            });
        }
        let n = usize::try_from(value).map_err(|_| SemaError::non_constant(expr.pos))?;
        trace!(line = pos.line, column = pos.column, size = n, "folded array size");
        *size = Some(n);
        self.folded += 1;
        Ok(())
    }

    /// Value of `expr` if it is a constant integer expression.
    ///
    /// Overflow makes an expression non-constant. Division or modulo by a
    /// constant zero is an error.
    fn eval(&self, expr: &Expression) -> SemaResult<Option<i64>> {
        let value = match &expr.kind {
            ExpressionKind::Literal { .. } => expr.as_int_literal(),
            ExpressionKind::Variable { name } => {
                let is_const_int = self.symbols.is_final(name)
                    && self.symbols.type_of(name) == Some(ValueType::Int);
                if is_const_int {
                    self.symbols.const_int(name)
                } else {
                    None
                }
            }
            ExpressionKind::Parenthesized(inner) => self.eval(inner)?,
            ExpressionKind::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                match op {
                    UnaryOp::Neg => operand.and_then(i64::checked_neg),
                    UnaryOp::BitNot => operand.map(|v| !v),
                    UnaryOp::Not => None,
                }
            }
            ExpressionKind::Binary { op, left, right } => {
                let (Some(l), Some(r)) = (self.eval(left)?, self.eval(right)?) else {
                    return Ok(None);
                };
                match op {
                    BinaryOp::Add => l.checked_add(r),
                    BinaryOp::Sub => l.checked_sub(r),
                    BinaryOp::Mul => l.checked_mul(r),
                    BinaryOp::Div if r == 0 => {
                        return Err(SemaError::DivisionByZero {
                            line: expr.pos.line,
                            column: expr.pos.column,
                        });
                    }
                    BinaryOp::Div => l.checked_div(r),
                    BinaryOp::Mod if r == 0 => {
                        return Err(SemaError::ModuloByZero {
                            line: expr.pos.line,
                            column: expr.pos.column,
                        });
                    }
                    BinaryOp::Mod => l.checked_rem(r),
                    BinaryOp::BitAnd => Some(l & r),
                    BinaryOp::BitOr => Some(l | r),
                    BinaryOp::BitXor => Some(l ^ r),
                    _ => None,
                }
            }
            _ => None,
        };
        Ok(value)
    }
}

/// Fold every array size in `program` with a fresh folder.
pub fn fold_array_sizes(program: &mut Program) -> SemaResult<()> {
    ArraySizeFolder::new().fold_program(program)
}
