use crate::error::Error;
use derive_more::{Deref, DerefMut};
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// An ordered sequence of key segments identifying a location in a document.
///
/// Two paths are equal when their segments are equal element-wise and in order.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Deref, DerefMut)]
pub struct Path(Vec<String>);

impl Path {
    pub fn new<I, V>(segments: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Path(segments.into_iter().map(Into::into).collect())
    }

    pub fn root() -> Self {
        Path(vec![])
    }

    /// Parses a dotted path expression such as `a.b.c`.
    pub fn with_paths(paths: impl AsRef<str>) -> crate::Result<Self> {
        let trimmed = paths.as_ref().trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidPathExpression("path is empty"));
        }
        if trimmed.starts_with('.') {
            return Err(Error::InvalidPathExpression("leading period '.' not allowed"));
        }
        if trimmed.ends_with('.') {
            return Err(Error::InvalidPathExpression("trailing period '.' not allowed"));
        }
        if trimmed.contains("..") {
            return Err(Error::InvalidPathExpression("adjacent periods '..' not allowed"));
        }
        Ok(Path::new(trimmed.split('.')))
    }

    /// Builds the path of a child named `key` below `self`.
    pub fn join(&self, key: impl Into<String>) -> Path {
        let mut child = self.clone();
        child.0.push(key.into());
        child
    }

    pub fn key(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(Path(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Returns true when `self` lies strictly below `parent`.
    pub fn is_child_of(&self, parent: &Path) -> bool {
        self.len() > parent.len() && self.starts_with(parent)
    }

    /// The segments remaining after removing `count` leading segments.
    pub fn sub_path(&self, count: usize) -> Path {
        Path(self.0.iter().skip(count).cloned().collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("."))
    }
}

impl From<&str> for Path {
    fn from(value: &str) -> Self {
        Path::new(value.split('.'))
    }
}

impl From<Vec<String>> for Path {
    fn from(value: Vec<String>) -> Self {
        Path(value)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Path;
    use crate::error::Error;

    #[rstest]
    #[case("a", &["a"])]
    #[case("a.b.c", &["a", "b", "c"])]
    #[case("  foo.bar  ", &["foo", "bar"])]
    fn test_with_paths(#[case] expr: &str, #[case] expected: &[&str]) -> crate::Result<()> {
        let path = Path::with_paths(expr)?;
        assert_eq!(path, Path::new(expected.iter().copied()));
        Ok(())
    }

    #[rstest]
    #[case("")]
    #[case(".a")]
    #[case("a.")]
    #[case("a..b")]
    fn test_invalid_paths(#[case] expr: &str) {
        let error = Path::with_paths(expr).unwrap_err();
        assert!(matches!(error, Error::InvalidPathExpression(_)));
    }

    #[test]
    fn test_relations() {
        let parent = Path::from("a.b");
        let child = parent.join("c");
        assert_eq!(child.to_string(), "a.b.c");
        assert!(child.is_child_of(&parent));
        assert!(!parent.is_child_of(&parent));
        assert!(parent.starts_with(&parent));
        assert_eq!(child.sub_path(2), Path::from("c"));
        assert_eq!(child.parent(), Some(parent));
        assert_eq!(child.key(), Some("c"));
        assert_eq!(Path::root().parent(), None);
    }
}
