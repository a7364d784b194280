//! Token model for Bloch.

use logos::{Lexer, Logos};

/// Why the lexer rejected a slice of input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    UnexpectedCharacter,
    FloatSuffix,
    BitDigits,
    UnterminatedString,
    UnterminatedChar,
}

impl LexErrorKind {
    pub(crate) fn message(&self, slice: &str) -> String {
        match self {
            LexErrorKind::UnexpectedCharacter => {
                let c = slice.chars().next().unwrap_or_default();
                format!("Unexpected character '{c}'")
            }
            LexErrorKind::FloatSuffix => "float literals must end with 'f'".into(),
            LexErrorKind::BitDigits => "bit literals must be 0b or 1b".into(),
            LexErrorKind::UnterminatedString => "unterminated string literal".into(),
            LexErrorKind::UnterminatedChar => "unterminated char literal".into(),
        }
    }
}

fn float_suffix(lex: &mut Lexer<TokenKind>) -> Result<(), LexErrorKind> {
    if lex.slice().ends_with('f') {
        Ok(())
    } else {
        Err(LexErrorKind::FloatSuffix)
    }
}

fn bit_digits(lex: &mut Lexer<TokenKind>) -> Result<(), LexErrorKind> {
    match lex.slice() {
        "0b" | "1b" => Ok(()),
        _ => Err(LexErrorKind::BitDigits),
    }
}

fn string_end(lex: &mut Lexer<TokenKind>) -> Result<(), LexErrorKind> {
    let s = lex.slice();
    if s.len() >= 2 && s.ends_with('"') {
        Ok(())
    } else {
        Err(LexErrorKind::UnterminatedString)
    }
}

fn char_end(lex: &mut Lexer<TokenKind>) -> Result<(), LexErrorKind> {
    let s = lex.slice();
    if s.chars().count() == 3 && s.ends_with('\'') {
        Ok(())
    } else {
        Err(LexErrorKind::UnterminatedChar)
    }
}

/// Token kinds for Bloch.
///
/// `Eof` is never produced by the scanner itself; [`tokenize`](crate::tokenize)
/// appends it so the parser always sees an explicit end marker.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // Primitive types
    #[token("int")]
    Int,
    #[token("float")]
    Float,
    #[token("string")]
    String,
    #[token("char")]
    Char,
    #[token("qubit")]
    Qubit,
    #[token("bit")]
    Bit,
    #[token("void")]
    Void,

    // Keywords
    #[token("function")]
    Function,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("measure")]
    Measure,
    #[token("final")]
    Final,
    #[token("reset")]
    Reset,
    #[token("default")]
    Default,
    #[token("echo")]
    Echo,
    #[token("null")]
    Null,

    // Annotation names
    #[token("quantum")]
    Quantum,
    #[token("tracked")]
    Tracked,
    #[token("shots")]
    Shots,

    // Class system
    #[token("class")]
    Class,
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("static")]
    Static,
    #[token("extends")]
    Extends,
    #[token("abstract")]
    Abstract,
    #[token("virtual")]
    Virtual,
    #[token("override")]
    Override,
    #[token("super")]
    Super,
    #[token("this")]
    This,
    #[token("import")]
    Import,
    #[token("new")]
    New,
    #[token("constructor")]
    Constructor,
    #[token("destructor")]
    Destructor,

    // Literals
    #[regex(r"[0-9]+")]
    IntegerLiteral,
    #[regex(r"[0-9]+\.[0-9]*f?", float_suffix)]
    #[regex(r"[0-9]+f")]
    FloatLiteral,
    #[regex(r"[0-9]+b", bit_digits)]
    BitLiteral,
    #[regex(r#""[^"]*"?"#, string_end)]
    StringLiteral,
    #[regex(r"'[^'\n]?'?", char_end)]
    CharLiteral,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    // Operators
    #[token("=")]
    Equals,
    #[token("==")]
    EqualEqual,
    #[token("!")]
    Bang,
    #[token("!=")]
    BangEqual,
    #[token("+")]
    Plus,
    #[token("++")]
    PlusPlus,
    #[token("-")]
    Minus,
    #[token("--")]
    MinusMinus,
    #[token("->")]
    Arrow,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("&")]
    Ampersand,
    #[token("&&")]
    AmpersandAmpersand,
    #[token("|")]
    Pipe,
    #[token("||")]
    PipePipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("?")]
    Question,

    // Punctuation
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("@")]
    At,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    Eof,
}

impl TokenKind {
    /// Whether this kind spells one of the primitive type names.
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Float
                | TokenKind::String
                | TokenKind::Char
                | TokenKind::Qubit
                | TokenKind::Bit
        )
    }

    fn describe(self) -> &'static str {
        match self {
            TokenKind::Int => "int",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::Char => "char",
            TokenKind::Qubit => "qubit",
            TokenKind::Bit => "bit",
            TokenKind::Void => "void",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Measure => "measure",
            TokenKind::Final => "final",
            TokenKind::Reset => "reset",
            TokenKind::Default => "default",
            TokenKind::Echo => "echo",
            TokenKind::Null => "null",
            TokenKind::Quantum => "quantum",
            TokenKind::Tracked => "tracked",
            TokenKind::Shots => "shots",
            TokenKind::Class => "class",
            TokenKind::Public => "public",
            TokenKind::Private => "private",
            TokenKind::Protected => "protected",
            TokenKind::Static => "static",
            TokenKind::Extends => "extends",
            TokenKind::Abstract => "abstract",
            TokenKind::Virtual => "virtual",
            TokenKind::Override => "override",
            TokenKind::Super => "super",
            TokenKind::This => "this",
            TokenKind::Import => "import",
            TokenKind::New => "new",
            TokenKind::Constructor => "constructor",
            TokenKind::Destructor => "destructor",
            TokenKind::IntegerLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::BitLiteral => "bit literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::CharLiteral => "char literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Equals => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::Bang => "!",
            TokenKind::BangEqual => "!=",
            TokenKind::Plus => "+",
            TokenKind::PlusPlus => "++",
            TokenKind::Minus => "-",
            TokenKind::MinusMinus => "--",
            TokenKind::Arrow => "->",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Ampersand => "&",
            TokenKind::AmpersandAmpersand => "&&",
            TokenKind::Pipe => "|",
            TokenKind::PipePipe => "||",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::At => "@",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Eof => "end of file",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// A token with its raw text and 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// End-of-stream marker at the given position.
    pub fn eof(line: usize, column: usize) -> Self {
        Self::new(TokenKind::Eof, "", line, column)
    }
}
