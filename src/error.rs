use std::fmt::{Display, Formatter};

use itertools::Itertools;

/// Why a substitution could not be resolved once the fixed point was reached.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UnresolvedReason {
    /// Nothing exists at the referenced path.
    Missing,
    /// The target exists but depends on a value that never became available.
    Circular,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Unresolved {
    pub substitution: String,
    pub field: String,
    pub reason: UnresolvedReason,
}

impl Display for Unresolved {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            UnresolvedReason::Missing => {
                write!(f, "{} at `{}` not found", self.substitution, self.field)
            }
            UnresolvedReason::Circular => {
                write!(f, "{} at `{}` is circular", self.substitution, self.field)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot read `{actual}` as `{expected}` at `{path}`")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
        path: String,
    },
    #[error("Unsupported mutation: {0}")]
    UnsupportedMutation(&'static str),
    #[error("Unknown variant: {0}")]
    UnknownVariant(String),
    #[error("Field key must not be empty")]
    InvalidKey,
    #[error("Path `{0}` not found")]
    PathNotFound(String),
    #[error("Invalid path expression: {0}")]
    InvalidPathExpression(&'static str),
    #[error("Self-referencing substitution {0} may not be used inside an array")]
    SelfReferenceInArray(String),
    #[error("Unresolved substitutions: {}", .0.iter().join(", "))]
    UnresolvedSubstitutions(Vec<Unresolved>),
    #[error("Nesting depth exceeded the limit of {max_depth} levels")]
    RecursionDepthExceeded { max_depth: usize },
    #[error("Value still depends on an unresolved substitution")]
    ResolveNotComplete,
    #[error("{0}")]
    DeserializeError(String),
    #[error("{0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl Error {
    /// Structural errors come from misuse of the tree API rather than from
    /// configuration data, and are raised at the point of the call.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::TypeMismatch { .. }
                | Error::UnsupportedMutation(_)
                | Error::UnknownVariant(_)
                | Error::InvalidKey
        )
    }
}

impl serde::de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Self::DeserializeError(msg.to_string())
    }
}
