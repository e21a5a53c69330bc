use derive_more::Constructor;
use std::fmt::{Display, Formatter};

/// Token kinds produced by the tokenizer.
///
/// Only the literal kinds can become tree leaves; the structural kinds are
/// consumed by the parser while it assembles objects, arrays and fields.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TokenKind {
    Null,
    Bool,
    Long,
    Double,
    Hex,
    Octal,
    UnquotedLiteralValue,
    QuotedLiteralValue,
    TripleQuotedLiteralValue,
    Whitespace,
    StartOfObject,
    EndOfObject,
    StartOfArray,
    EndOfArray,
    Assign,
    PlusEqualAssign,
    Comma,
    SubstitutionStart,
    Include,
    Comment,
    EndOfLine,
    EndOfFile,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Null => "null",
            TokenKind::Bool => "bool",
            TokenKind::Long => "long",
            TokenKind::Double => "double",
            TokenKind::Hex => "hex",
            TokenKind::Octal => "octal",
            TokenKind::UnquotedLiteralValue => "unquoted_literal",
            TokenKind::QuotedLiteralValue => "quoted_literal",
            TokenKind::TripleQuotedLiteralValue => "triple_quoted_literal",
            TokenKind::Whitespace => "whitespace",
            TokenKind::StartOfObject => "start_of_object",
            TokenKind::EndOfObject => "end_of_object",
            TokenKind::StartOfArray => "start_of_array",
            TokenKind::EndOfArray => "end_of_array",
            TokenKind::Assign => "assign",
            TokenKind::PlusEqualAssign => "plus_equal_assign",
            TokenKind::Comma => "comma",
            TokenKind::SubstitutionStart => "substitution_start",
            TokenKind::Include => "include",
            TokenKind::Comment => "comment",
            TokenKind::EndOfLine => "end_of_line",
            TokenKind::EndOfFile => "end_of_file",
        }
    }
}

/// A `(kind, raw text)` pair handed over by the tokenizer.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Constructor)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn unquoted(value: impl Into<String>) -> Self {
        Token::new(TokenKind::UnquotedLiteralValue, value.into())
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Token::new(TokenKind::QuotedLiteralValue, value.into())
    }

    pub fn whitespace(value: impl Into<String>) -> Self {
        Token::new(TokenKind::Whitespace, value.into())
    }

    pub fn long(value: i64) -> Self {
        Token::new(TokenKind::Long, value.to_string())
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.kind.name(), self.value)
    }
}
