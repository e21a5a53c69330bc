use std::fmt::{Display, Formatter};

use crate::merge::document::{Document, Element, NodeId};
use crate::path::Path;

/// A `${path}` reference embedded as a value fragment.
///
/// `removed` is set when a later scalar or array assignment shadows the
/// value holding this substitution, so it no longer has to resolve.
/// `resolved` points at the value the reference resolved to.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Substitution {
    pub(crate) path: Path,
    pub(crate) optional: bool,
    pub(crate) removed: bool,
    pub(crate) resolved: Option<NodeId>,
}

impl Substitution {
    pub fn new(path: Path, optional: bool) -> Self {
        Self {
            path,
            optional,
            removed: false,
            resolved: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn resolved(&self) -> Option<NodeId> {
        self.resolved
    }
}

impl Display for Substitution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "${{")?;
        if self.optional {
            write!(f, "?")?;
        }
        write!(f, "{}", self.path)?;
        write!(f, "}}")?;
        Ok(())
    }
}

impl Document {
    pub fn new_substitution(&mut self, parent: Option<NodeId>, path: Path, optional: bool) -> NodeId {
        self.alloc(parent, Element::Substitution(Substitution::new(path, optional)))
    }

    /// Every substitution at or below `id`, in document order. Field
    /// histories are searched entirely, shadowed entries included.
    pub(crate) fn collect_substitutions(&self, id: NodeId, substitutions: &mut Vec<NodeId>) {
        match self.element(id) {
            Element::Substitution(_) => substitutions.push(id),
            Element::Object(object) => {
                for field in object.fields.values() {
                    self.collect_substitutions(*field, substitutions);
                }
                for component in &object.components {
                    self.collect_substitutions(*component, substitutions);
                }
            }
            Element::Array(array) => {
                for element in &array.elements {
                    self.collect_substitutions(*element, substitutions);
                }
            }
            Element::Value(value) => {
                for fragment in &value.fragments {
                    self.collect_substitutions(*fragment, substitutions);
                }
            }
            Element::Field(field) => {
                for entry in &field.history {
                    self.collect_substitutions(*entry, substitutions);
                }
            }
            Element::Literal(_) | Element::Empty => {}
        }
    }

    pub(crate) fn mark_removed(&mut self, substitution: NodeId) {
        if let Element::Substitution(s) = self.element_mut(substitution)
            && s.resolved.is_none()
        {
            s.removed = true;
        }
    }
}
