//! Nested-scope symbol table.
//!
//! Scopes form a stack. Declarations always land in the innermost scope and
//! lookups walk from the innermost scope outwards, so an inner declaration
//! shadows an outer one with the same name until its scope ends.
//!
//! ```
//! use bloch_sema::{SymbolTable, ValueType};
//!
//! let mut table = SymbolTable::new();
//! table.begin_scope();
//! table.declare("x", false, ValueType::Int);
//! table.begin_scope();
//! table.declare("x", false, ValueType::Float);
//! assert_eq!(table.type_of("x"), Some(ValueType::Float));
//! table.end_scope();
//! assert_eq!(table.type_of("x"), Some(ValueType::Int));
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use bloch_syntax::ast::Type;

/// Value category of a symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Int,
    Float,
    String,
    Char,
    Qubit,
    Bit,
    Void,
    /// Class-typed or otherwise unclassified.
    #[default]
    Unknown,
}

impl ValueType {
    /// Map a primitive type spelling to its value type.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "int" => ValueType::Int,
            "float" => ValueType::Float,
            "string" => ValueType::String,
            "char" => ValueType::Char,
            "qubit" => ValueType::Qubit,
            "bit" => ValueType::Bit,
            "void" => ValueType::Void,
            _ => ValueType::Unknown,
        }
    }

    /// Value type of a declared type. Arrays report their element type.
    pub fn of(ty: &Type) -> Self {
        match ty {
            Type::Primitive { name } => Self::from_type_name(name),
            Type::Array { element, .. } => Self::of(element),
            Type::Void => ValueType::Void,
            Type::Named { .. } => ValueType::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Char => "char",
            ValueType::Qubit => "qubit",
            ValueType::Bit => "bit",
            ValueType::Void => "void",
            ValueType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the table knows about one declared name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub is_final: bool,
    pub ty: ValueType,
    /// Folded value of a `final int` with a constant initializer.
    pub const_int: Option<i64>,
    /// Class of a class-typed symbol.
    pub class_name: Option<String>,
    /// The name denotes a type (a class) rather than a value.
    pub is_type_name: bool,
}

impl SymbolInfo {
    pub fn new(is_final: bool, ty: ValueType) -> Self {
        Self {
            is_final,
            ty,
            ..Self::default()
        }
    }

    /// Symbol for a value of class `class_name`.
    pub fn class_value(is_final: bool, class_name: impl Into<String>) -> Self {
        Self {
            is_final,
            class_name: Some(class_name.into()),
            ..Self::default()
        }
    }

    /// Symbol naming the class `class_name` itself.
    pub fn type_name(class_name: impl Into<String>) -> Self {
        Self {
            is_final: true,
            class_name: Some(class_name.into()),
            is_type_name: true,
            ..Self::default()
        }
    }
}

/// Stack of name-to-symbol scopes.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    scopes: Vec<FxHashMap<String, SymbolInfo>>,
}

impl SymbolTable {
    /// Create a table with no open scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn begin_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Close the innermost scope. Does nothing when no scope is open.
    pub fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declare `name` in the innermost scope, replacing any entry it already
    /// holds there. Does nothing when no scope is open.
    pub fn declare(&mut self, name: impl Into<String>, is_final: bool, ty: ValueType) {
        self.declare_symbol(name, SymbolInfo::new(is_final, ty));
    }

    /// Like [`declare`](Self::declare) with a fully specified entry.
    pub fn declare_symbol(&mut self, name: impl Into<String>, info: SymbolInfo) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), info);
        }
    }

    /// Nearest visible entry for `name`.
    pub fn lookup(&self, name: &str) -> Option<&SymbolInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Whether the nearest `name` is final. Undeclared names are not.
    pub fn is_final(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|s| s.is_final)
    }

    pub fn type_of(&self, name: &str) -> Option<ValueType> {
        self.lookup(name).map(|s| s.ty)
    }

    pub fn class_name(&self, name: &str) -> Option<&str> {
        self.lookup(name).and_then(|s| s.class_name.as_deref())
    }

    pub fn is_type_name(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|s| s.is_type_name)
    }

    pub fn const_int(&self, name: &str) -> Option<i64> {
        self.lookup(name).and_then(|s| s.const_int)
    }

    /// Record a constant value on the nearest existing entry for `name`.
    /// Unknown names are ignored.
    pub fn set_const_int(&mut self, name: &str, value: i64) {
        if let Some(info) = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
        {
            info.const_int = Some(value);
        }
    }
}
