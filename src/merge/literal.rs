use std::fmt::{Display, Formatter};

use derive_more::Constructor;

use crate::error::Error;
use crate::merge::document::HoconType;
use crate::raw::token::{Token, TokenKind};

pub(crate) const NULL_LITERAL: &str = "null";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum LiteralKind {
    Null,
    Bool,
    Long,
    Double,
    Hex,
    Octal,
    UnquotedString,
    QuotedString,
    TripleQuotedString,
    Whitespace,
}

impl LiteralKind {
    /// The coarse type seen by merge and resolution.
    pub fn coarse_type(&self) -> HoconType {
        match self {
            LiteralKind::Bool => HoconType::Boolean,
            LiteralKind::Long | LiteralKind::Double | LiteralKind::Hex | LiteralKind::Octal => {
                HoconType::Number
            }
            LiteralKind::Null
            | LiteralKind::UnquotedString
            | LiteralKind::QuotedString
            | LiteralKind::TripleQuotedString
            | LiteralKind::Whitespace => HoconType::String,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LiteralKind::Null => "null",
            LiteralKind::Bool => "bool",
            LiteralKind::Long => "long",
            LiteralKind::Double => "double",
            LiteralKind::Hex => "hex",
            LiteralKind::Octal => "octal",
            LiteralKind::UnquotedString => "unquoted_string",
            LiteralKind::QuotedString => "quoted_string",
            LiteralKind::TripleQuotedString => "triple_quoted_string",
            LiteralKind::Whitespace => "whitespace",
        }
    }
}

impl TryFrom<TokenKind> for LiteralKind {
    type Error = Error;

    fn try_from(value: TokenKind) -> Result<Self, Self::Error> {
        let kind = match value {
            TokenKind::Null => LiteralKind::Null,
            TokenKind::Bool => LiteralKind::Bool,
            TokenKind::Long => LiteralKind::Long,
            TokenKind::Double => LiteralKind::Double,
            TokenKind::Hex => LiteralKind::Hex,
            TokenKind::Octal => LiteralKind::Octal,
            TokenKind::UnquotedLiteralValue => LiteralKind::UnquotedString,
            TokenKind::QuotedLiteralValue => LiteralKind::QuotedString,
            TokenKind::TripleQuotedLiteralValue => LiteralKind::TripleQuotedString,
            TokenKind::Whitespace => LiteralKind::Whitespace,
            other => {
                return Err(Error::UnknownVariant(format!(
                    "token literal type `{}`",
                    other.name()
                )));
            }
        };
        Ok(kind)
    }
}

/// An immutable scalar leaf.
///
/// Quoting only changes [`Literal::raw`]; the logical text returned by
/// [`Literal::get_string`] is the same for every string kind.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Constructor)]
pub struct Literal {
    kind: LiteralKind,
    text: String,
}

impl Literal {
    pub fn from_token(token: &Token) -> crate::Result<Self> {
        let kind = LiteralKind::try_from(token.kind)?;
        let text = match kind {
            LiteralKind::Null => NULL_LITERAL.to_string(),
            _ => token.value.clone(),
        };
        Ok(Literal::new(kind, text))
    }

    pub fn null() -> Self {
        Literal::new(LiteralKind::Null, NULL_LITERAL.to_string())
    }

    pub fn boolean(b: bool) -> Self {
        Literal::new(LiteralKind::Bool, b.to_string())
    }

    pub fn long(i: i64) -> Self {
        Literal::new(LiteralKind::Long, i.to_string())
    }

    pub fn double(f: f64) -> Self {
        Literal::new(LiteralKind::Double, f.to_string())
    }

    pub fn unquoted(s: impl Into<String>) -> Self {
        Literal::new(LiteralKind::UnquotedString, s.into())
    }

    pub fn quoted(s: impl Into<String>) -> Self {
        Literal::new(LiteralKind::QuotedString, s.into())
    }

    pub fn triple_quoted(s: impl Into<String>) -> Self {
        Literal::new(LiteralKind::TripleQuotedString, s.into())
    }

    pub fn whitespace(s: impl Into<String>) -> Self {
        Literal::new(LiteralKind::Whitespace, s.into())
    }

    pub fn kind(&self) -> LiteralKind {
        self.kind
    }

    pub fn ty(&self) -> HoconType {
        self.kind.coarse_type()
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == LiteralKind::Whitespace
    }

    pub fn is_null(&self) -> bool {
        self.kind == LiteralKind::Null
    }

    /// The logical value, `None` for `null`.
    pub fn value(&self) -> Option<&str> {
        match self.kind {
            LiteralKind::Null => None,
            _ => Some(&self.text),
        }
    }

    /// The text this literal contributes to a string concatenation.
    pub fn get_string(&self) -> &str {
        &self.text
    }

    pub fn raw(&self) -> String {
        match self.kind {
            LiteralKind::QuotedString => format!("\"{}\"", self.text),
            LiteralKind::TripleQuotedString => format!("\"\"\"{}\"\"\"", self.text),
            _ => self.text.clone(),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw())
    }
}
