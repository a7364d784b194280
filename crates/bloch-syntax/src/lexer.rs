//! Lexer for Bloch.

use logos::Logos;

use crate::error::{ParseResult, SyntaxError};
use crate::token::{Token, TokenKind};

/// Maps byte offsets to 1-based line/column pairs.
struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            source,
            line_starts,
        }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let column = self.source[start..offset].chars().count() + 1;
        (line + 1, column)
    }
}

/// Tokenize Bloch source text.
///
/// The returned stream always ends with a [`TokenKind::Eof`] token. Scanning
/// stops at the first malformed lexeme.
pub fn tokenize(source: &str) -> ParseResult<Vec<Token>> {
    let index = LineIndex::new(source);
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (line, column) = index.position(span.start);
        match result {
            Ok(kind) => tokens.push(Token::new(kind, lexer.slice(), line, column)),
            Err(kind) => {
                return Err(SyntaxError::lexical(
                    line,
                    column,
                    kind.message(lexer.slice()),
                ));
            }
        }
    }

    let (line, column) = index.position(source.len());
    tokens.push(Token::eof(line, column));
    Ok(tokens)
}
