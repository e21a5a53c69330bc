use tracing::trace;

use crate::error::Error;
use crate::merge::document::{Document, Element, HoconType, NodeId};
use crate::merge::view::ValueView;

/// One assignment: an ordered list of fragments whose type is derived.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Value {
    pub(crate) fragments: Vec<NodeId>,
}

impl Value {
    pub fn fragments(&self) -> &[NodeId] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl Document {
    /// Appends `fragment` to `value` and re-parents it there.
    pub fn value_add(&mut self, value: NodeId, fragment: NodeId) -> crate::Result<()> {
        match self.element(value) {
            Element::Value(_) => {}
            Element::Empty => {
                return Err(Error::UnsupportedMutation(
                    "cannot add a fragment to an empty value",
                ));
            }
            _ => return Err(self.mismatch(value, "value")),
        }
        match self.element(fragment) {
            Element::Object(_)
            | Element::Array(_)
            | Element::Literal(_)
            | Element::Substitution(_) => {}
            other => {
                return Err(Error::UnknownVariant(format!(
                    "value fragment `{}`",
                    other.kind()
                )));
            }
        }
        self.set_parent(fragment, Some(value));
        if let Element::Value(v) = self.element_mut(value) {
            v.fragments.push(fragment);
        }
        Ok(())
    }

    pub fn value_add_range(
        &mut self,
        value: NodeId,
        fragments: impl IntoIterator<Item = NodeId>,
    ) -> crate::Result<()> {
        for fragment in fragments {
            self.value_add(value, fragment)?;
        }
        Ok(())
    }

    /// Builds a value holding `fragments` in order.
    pub fn value_of(
        &mut self,
        parent: Option<NodeId>,
        fragments: impl IntoIterator<Item = NodeId>,
    ) -> crate::Result<NodeId> {
        let value = self.new_value(parent);
        self.value_add_range(value, fragments)?;
        Ok(value)
    }

    /// The logical string of a scalar element. Empty values read as `""`.
    pub fn get_string(&self, id: NodeId) -> crate::Result<String> {
        let Some(view) = self.element_view(id) else {
            return Ok(String::new());
        };
        match self.view_type(&view) {
            HoconType::Empty => Ok(String::new()),
            HoconType::Object | HoconType::Array => Err(self.view_mismatch(&view, "string")),
            HoconType::Boolean | HoconType::Number | HoconType::String => {
                self.fragments_string(self.view_fragments(&view))
            }
        }
    }

    /// The element values of an array-typed element, concatenating every
    /// array fragment. Empty values read as `[]`.
    pub fn get_array(&self, id: NodeId) -> crate::Result<Vec<NodeId>> {
        let Some(view) = self.element_view(id) else {
            return Ok(vec![]);
        };
        match self.view_type(&view) {
            HoconType::Empty => Ok(vec![]),
            HoconType::Array => self.fragments_array(self.view_fragments(&view)),
            _ => Err(self.view_mismatch(&view, "array")),
        }
    }

    /// The object an object-typed element stands for.
    ///
    /// A single object fragment is returned as is. Several fragments yield
    /// a new merged object over them, which allocates one node and copies
    /// nothing. An empty element yields a new object without fields. Writes
    /// through a merged object reach its last component.
    pub fn get_object(&mut self, id: NodeId) -> crate::Result<NodeId> {
        let Some(view) = self.element_view(id) else {
            return Ok(self.new_object(Some(id)));
        };
        let mut objects = vec![];
        self.fragments_objects(self.view_fragments(&view), &mut objects);
        match self.view_type(&view) {
            // A pending substitution hides the type, but objects assigned
            // alongside it can still be written to.
            HoconType::Object | HoconType::Empty if !objects.is_empty() => {
                if let [object] = objects.as_slice() {
                    return Ok(*object);
                }
                let parent = match &view {
                    ValueView::Node(node) => *node,
                    ValueView::Synthetic { owner, .. } => {
                        let field = self.as_field(*owner)?;
                        field.history.last().copied().unwrap_or(*owner)
                    }
                };
                trace!("merging {} objects of {}", objects.len(), parent);
                self.new_merged_object(Some(parent), objects)
            }
            HoconType::Empty => Ok(self.new_object(Some(view.owner()))),
            _ => Err(self.view_mismatch(&view, "object")),
        }
    }

    /// Source text of an element, quoting included.
    pub fn raw(&self, id: NodeId) -> String {
        self.display(id).to_string()
    }

    pub(crate) fn view_mismatch(&self, view: &ValueView, expected: &'static str) -> Error {
        Error::TypeMismatch {
            expected,
            actual: self.view_type(view).name(),
            path: self.path_of(view.owner()).to_string(),
        }
    }
}
