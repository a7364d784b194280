//! Abstract Syntax Tree for Bloch.
//!
//! The tree is strictly owned: every child belongs to exactly one parent and
//! nothing points back up. Statements and expressions carry the 1-based
//! position of the token that introduced them.

use serde::{Deserialize, Serialize};

/// A 1-based source position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A parsed source file, or after module resolution the whole program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub imports: Vec<ImportDeclaration>,
    pub classes: Vec<ClassDeclaration>,
    pub functions: Vec<FunctionDeclaration>,
    pub statements: Vec<Statement>,
    /// Whether `main` requested an explicit shot count.
    pub has_shots: bool,
    /// How many times `main` is executed. `1` unless `@shots(N)` says otherwise.
    pub shot_count: u32,
}

impl Program {
    pub fn new() -> Self {
        Self {
            imports: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            statements: Vec::new(),
            has_shots: false,
            shot_count: 1,
        }
    }

    /// Look up a free function by name.
    pub fn function(&self, name: &str) -> Option<&FunctionDeclaration> {
        self.functions.iter().find(|f| f.name == name)
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

/// `import pkg.Module;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDeclaration {
    pub path: Vec<String>,
    pub pos: Position,
}

impl ImportDeclaration {
    /// The import path joined with dots, as written in source.
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// `@name` or `@name(value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    pub value: Option<String>,
    pub pos: Position,
}

/// A typed function, method or constructor parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
    pub pos: Position,
}

/// A free function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Type,
    pub body: Block,
    pub annotations: Vec<Annotation>,
    pub has_quantum_annotation: bool,
    pub has_shots_annotation: bool,
    pub pos: Position,
}

impl FunctionDeclaration {
    /// Raw value of the `@shots(N)` annotation, if present.
    pub fn shots_value(&self) -> Option<&str> {
        self.annotations
            .iter()
            .find(|a| a.name == "shots")
            .and_then(|a| a.value.as_deref())
    }
}

/// Member visibility inside a class body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

/// `[static] [abstract] class Name [extends Base] { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub name: String,
    pub is_static: bool,
    pub is_abstract: bool,
    /// Qualified name of the base class.
    pub base: Option<Vec<String>>,
    pub members: Vec<ClassMember>,
    pub pos: Position,
}

/// A member of a class body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassMember {
    Field(FieldDeclaration),
    Method(MethodDeclaration),
    Constructor(ConstructorDeclaration),
    Destructor(DestructorDeclaration),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    pub ty: Type,
    pub initializer: Option<Expression>,
    pub annotations: Vec<Annotation>,
    pub visibility: Visibility,
    pub is_final: bool,
    pub is_static: bool,
    pub is_tracked: bool,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Type,
    /// `None` for a bodiless `virtual` method.
    pub body: Option<Block>,
    pub annotations: Vec<Annotation>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub has_quantum_annotation: bool,
    pub has_shots_annotation: bool,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDeclaration {
    pub params: Vec<Parameter>,
    /// `None` for `= default`.
    pub body: Option<Block>,
    pub is_default: bool,
    pub visibility: Visibility,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestructorDeclaration {
    /// `None` for `= default`.
    pub body: Option<Block>,
    pub is_default: bool,
    pub visibility: Visibility,
    pub pos: Position,
}

/// A type as written in source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    /// `int`, `float`, `string`, `char`, `qubit` or `bit`.
    Primitive { name: String },

    /// `T[]`, `T[N]` or `T[expr]`.
    Array {
        element: Box<Type>,
        /// Fixed size; `None` when unspecified or not yet folded.
        size: Option<usize>,
        /// Constant expression awaiting folding.
        size_expression: Option<Box<Expression>>,
        /// Where the element type starts.
        pos: Position,
    },

    Void,

    /// A user type such as `pkg.Point`.
    Named { parts: Vec<String> },
}

impl Type {
    pub fn primitive(name: impl Into<String>) -> Self {
        Type::Primitive { name: name.into() }
    }

    /// Whether this is exactly the primitive `qubit`.
    pub fn is_qubit(&self) -> bool {
        matches!(self, Type::Primitive { name } if name == "qubit")
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Primitive { name } => write!(f, "{name}"),
            Type::Array { element, size, .. } => match size {
                Some(n) => write!(f, "{element}[{n}]"),
                None => write!(f, "{element}[]"),
            },
            Type::Void => write!(f, "void"),
            Type::Named { parts } => write!(f, "{}", parts.join(".")),
        }
    }
}

/// `{ ... }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub pos: Position,
}

/// A variable declaration statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub name: String,
    pub ty: Type,
    pub initializer: Option<Expression>,
    pub annotations: Vec<Annotation>,
    pub is_final: bool,
    pub is_tracked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub pos: Position,
}

impl Statement {
    pub fn new(kind: StatementKind, pos: Position) -> Self {
        Self { kind, pos }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    Block(Block),

    VariableDeclaration(VariableDeclaration),

    /// `return [expr];`
    Return(Option<Expression>),

    /// `if (cond) { ... } [else { ... }]`
    If {
        condition: Expression,
        then_branch: Block,
        else_branch: Option<Block>,
    },

    /// `for (init; cond; step) { ... }`
    For {
        initializer: Option<Box<Statement>>,
        condition: Expression,
        increment: Expression,
        body: Block,
    },

    /// `while (cond) { ... }`
    While { condition: Expression, body: Block },

    /// `echo(expr);`
    Echo(Expression),

    /// `reset q;`
    Reset(Expression),

    /// `measure q;`
    Measure(Expression),

    /// `name = expr;`
    Assignment { name: String, value: Expression },

    /// `expr;`
    Expression(Expression),

    /// `cond ? stmt : stmt` where both branches are full statements.
    Ternary {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Box<Statement>,
    },
}

/// Kind tag of a literal expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Int,
    Float,
    Bit,
    String,
    Char,
}

impl LiteralKind {
    /// Canonical type name of the literal.
    pub fn type_name(self) -> &'static str {
        match self {
            LiteralKind::Int => "int",
            LiteralKind::Float => "float",
            LiteralKind::Bit => "bit",
            LiteralKind::String => "string",
            LiteralKind::Char => "char",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

impl PostfixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PostfixOp::Increment => "++",
            PostfixOp::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub pos: Position,
}

impl Expression {
    pub fn new(kind: ExpressionKind, pos: Position) -> Self {
        Self { kind, pos }
    }

    /// Integer value of an `int` literal, if this is one.
    pub fn as_int_literal(&self) -> Option<i64> {
        match &self.kind {
            ExpressionKind::Literal {
                value,
                kind: LiteralKind::Int,
            } => value.parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    /// Literal with its raw source text.
    Literal { value: String, kind: LiteralKind },

    Null,

    Variable { name: String },

    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },

    Postfix {
        op: PostfixOp,
        operand: Box<Expression>,
    },

    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },

    Index {
        collection: Box<Expression>,
        index: Box<Expression>,
    },

    ArrayLiteral { elements: Vec<Expression> },

    Parenthesized(Box<Expression>),

    /// `measure q` used as a value.
    Measure(Box<Expression>),

    Assignment {
        name: String,
        value: Box<Expression>,
    },

    ArrayAssignment {
        collection: Box<Expression>,
        index: Box<Expression>,
        value: Box<Expression>,
    },

    MemberAccess {
        object: Box<Expression>,
        member: String,
    },

    MemberAssignment {
        object: Box<Expression>,
        member: String,
        value: Box<Expression>,
    },

    /// `new Type(args)`
    New {
        class_type: Type,
        arguments: Vec<Expression>,
    },

    This,

    Super,
}
