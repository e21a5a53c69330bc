use crate::error::Error;
use crate::merge::document::{Document, Element, NodeId};

/// An ordered list of element values. Arrays have no keys.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Array {
    pub(crate) elements: Vec<NodeId>,
}

impl Array {
    pub fn elements(&self) -> &[NodeId] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Document {
    /// Appends an element to `array`. Bare fragments are wrapped in a value.
    pub fn array_push(&mut self, array: NodeId, element: NodeId) -> crate::Result<()> {
        if !matches!(self.element(array), Element::Array(_)) {
            return Err(self.mismatch(array, "array"));
        }
        let element = match self.element(element) {
            Element::Value(_) | Element::Empty => element,
            Element::Object(_) | Element::Array(_) | Element::Literal(_) | Element::Substitution(_) => {
                self.value_of(None, [element])?
            }
            Element::Field(_) => {
                return Err(Error::UnknownVariant("array element `field`".to_string()));
            }
        };
        self.set_parent(element, Some(array));
        if let Element::Array(a) = self.element_mut(array) {
            a.elements.push(element);
        }
        Ok(())
    }
}
