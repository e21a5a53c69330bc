use std::fmt::{Display, Formatter};

use tracing::trace;

use crate::error::Error;
use crate::merge::array::Array;
use crate::merge::field::Field;
use crate::merge::literal::Literal;
use crate::merge::object::Object;
use crate::merge::substitution::Substitution;
use crate::merge::value::Value;
use crate::path::Path;
use crate::raw::token::Token;

/// Stable index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub(crate) usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The coarse type visible to merge and resolution, independent of quoting.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum HoconType {
    Object,
    Array,
    Boolean,
    Number,
    String,
    Empty,
}

impl HoconType {
    pub fn name(&self) -> &'static str {
        match self {
            HoconType::Object => "object",
            HoconType::Array => "array",
            HoconType::Boolean => "boolean",
            HoconType::Number => "number",
            HoconType::String => "string",
            HoconType::Empty => "empty",
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            HoconType::Boolean | HoconType::Number | HoconType::String
        )
    }
}

impl Display for HoconType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Object(Object),
    Array(Array),
    Literal(Literal),
    Substitution(Substitution),
    Value(Value),
    /// Placeholder value that carries no fragments.
    Empty,
    Field(Field),
}

impl Element {
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Object(object) if object.is_merged() => "merged_object",
            Element::Object(_) => "object",
            Element::Array(_) => "array",
            Element::Literal(_) => "literal",
            Element::Substitution(_) => "substitution",
            Element::Value(_) => "value",
            Element::Empty => "empty",
            Element::Field(_) => "field",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) element: Element,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn element(&self) -> &Element {
        &self.element
    }
}

/// Arena that owns every node of one configuration tree.
///
/// Children are owned through the id lists stored in their parent element;
/// the `parent` link of a node is a lookup aid only. Nodes detached by a
/// history pop or a root replacement stay allocated until the document is
/// dropped.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document whose root value holds a single empty object.
    pub fn new() -> Self {
        let mut document = Document {
            nodes: vec![Node {
                parent: None,
                element: Element::Value(Value::default()),
            }],
            root: NodeId(0),
        };
        let object = document.alloc(Some(document.root), Element::Object(Object::default()));
        if let Element::Value(value) = &mut document.nodes[0].element {
            value.fragments.push(object);
        }
        document
    }

    /// The root value.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The object held by the root value.
    pub fn root_object(&self) -> crate::Result<NodeId> {
        let value = self.as_value(self.root)?;
        value
            .fragments
            .iter()
            .copied()
            .find(|id| matches!(self.element(*id), Element::Object(_)))
            .ok_or(Error::TypeMismatch {
                expected: "object",
                actual: "value",
                path: String::new(),
            })
    }

    /// Makes `object` the only fragment of the root value.
    pub fn replace_root_object(&mut self, object: NodeId) -> crate::Result<()> {
        self.as_object(object)?;
        let root = self.root;
        self.as_value(root)?;
        let previous = match self.element_mut(root) {
            Element::Value(value) => std::mem::take(&mut value.fragments),
            _ => vec![],
        };
        for fragment in previous {
            self.set_parent(fragment, None);
        }
        self.value_add(root, object)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.nodes[id.0].element
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.nodes[id.0].element
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.nodes[id.0].parent = parent;
    }

    pub(crate) fn alloc(&mut self, parent: Option<NodeId>, element: Element) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { parent, element });
        id
    }

    pub fn new_object(&mut self, parent: Option<NodeId>) -> NodeId {
        self.alloc(parent, Element::Object(Object::default()))
    }

    pub fn new_array(&mut self, parent: Option<NodeId>) -> NodeId {
        self.alloc(parent, Element::Array(Array::default()))
    }

    pub fn new_value(&mut self, parent: Option<NodeId>) -> NodeId {
        self.alloc(parent, Element::Value(Value::default()))
    }

    pub fn new_empty(&mut self, parent: Option<NodeId>) -> NodeId {
        self.alloc(parent, Element::Empty)
    }

    pub fn new_literal(&mut self, parent: Option<NodeId>, literal: Literal) -> NodeId {
        self.alloc(parent, Element::Literal(literal))
    }

    /// Literal factory over tokenizer output.
    pub fn literal_from_token(
        &mut self,
        parent: Option<NodeId>,
        token: &Token,
    ) -> crate::Result<NodeId> {
        let literal = Literal::from_token(token)?;
        trace!("literal from token {}: {}", token, literal);
        Ok(self.new_literal(parent, literal))
    }

    /// The path of the nearest field at or above `id`; the root path for
    /// nodes that are not inside any field.
    pub fn path_of(&self, id: NodeId) -> Path {
        let mut keys = vec![];
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if let Element::Field(field) = &node.element {
                keys.push(field.key.clone());
            }
            current = node.parent;
        }
        keys.reverse();
        Path::from(keys)
    }

    /// Returns true when `ancestor` is `id` itself or one of its parents.
    pub(crate) fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.parent(node_id);
        }
        false
    }

    pub(crate) fn mismatch(&self, id: NodeId, expected: &'static str) -> Error {
        Error::TypeMismatch {
            expected,
            actual: self.element(id).kind(),
            path: self.path_of(id).to_string(),
        }
    }

    pub fn as_object(&self, id: NodeId) -> crate::Result<&Object> {
        match self.element(id) {
            Element::Object(object) => Ok(object),
            _ => Err(self.mismatch(id, "object")),
        }
    }

    pub(crate) fn as_object_mut(&mut self, id: NodeId) -> crate::Result<&mut Object> {
        if !matches!(self.element(id), Element::Object(_)) {
            return Err(self.mismatch(id, "object"));
        }
        match self.element_mut(id) {
            Element::Object(object) => Ok(object),
            _ => unreachable!("element was checked to be an object"),
        }
    }

    pub fn as_array(&self, id: NodeId) -> crate::Result<&Array> {
        match self.element(id) {
            Element::Array(array) => Ok(array),
            _ => Err(self.mismatch(id, "array")),
        }
    }

    pub fn as_value(&self, id: NodeId) -> crate::Result<&Value> {
        match self.element(id) {
            Element::Value(value) => Ok(value),
            _ => Err(self.mismatch(id, "value")),
        }
    }

    pub fn as_field(&self, id: NodeId) -> crate::Result<&Field> {
        match self.element(id) {
            Element::Field(field) => Ok(field),
            _ => Err(self.mismatch(id, "field")),
        }
    }

    pub(crate) fn as_field_mut(&mut self, id: NodeId) -> crate::Result<&mut Field> {
        if !matches!(self.element(id), Element::Field(_)) {
            return Err(self.mismatch(id, "field"));
        }
        match self.element_mut(id) {
            Element::Field(field) => Ok(field),
            _ => unreachable!("element was checked to be a field"),
        }
    }

    pub fn as_substitution(&self, id: NodeId) -> crate::Result<&Substitution> {
        match self.element(id) {
            Element::Substitution(substitution) => Ok(substitution),
            _ => Err(self.mismatch(id, "substitution")),
        }
    }

    pub(crate) fn as_substitution_mut(&mut self, id: NodeId) -> crate::Result<&mut Substitution> {
        if !matches!(self.element(id), Element::Substitution(_)) {
            return Err(self.mismatch(id, "substitution"));
        }
        match self.element_mut(id) {
            Element::Substitution(substitution) => Ok(substitution),
            _ => unreachable!("element was checked to be a substitution"),
        }
    }

    /// Formats the subtree rooted at `id`, mainly for trace output.
    pub fn display(&self, id: NodeId) -> Displayed<'_> {
        Displayed { document: self, id }
    }

    fn write_element(&self, f: &mut Formatter<'_>, id: NodeId) -> std::fmt::Result {
        match self.element(id) {
            Element::Object(object) if object.is_merged() => {
                for (index, component) in object.components.iter().enumerate() {
                    if index != 0 {
                        write!(f, " ")?;
                    }
                    self.write_element(f, *component)?;
                }
                Ok(())
            }
            Element::Object(object) => {
                write!(f, "{{")?;
                for (index, (key, field)) in object.fields.iter().enumerate() {
                    if index != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    self.write_element(f, *field)?;
                }
                write!(f, "}}")
            }
            Element::Array(array) => {
                write!(f, "[")?;
                for (index, element) in array.elements.iter().enumerate() {
                    if index != 0 {
                        write!(f, ", ")?;
                    }
                    self.write_element(f, *element)?;
                }
                write!(f, "]")
            }
            Element::Literal(literal) => write!(f, "{}", literal),
            Element::Substitution(substitution) => match substitution.resolved {
                Some(resolved) => self.write_element(f, resolved),
                None => write!(f, "{}", substitution),
            },
            Element::Value(value) => {
                for fragment in &value.fragments {
                    self.write_element(f, *fragment)?;
                }
                Ok(())
            }
            Element::Empty => Ok(()),
            Element::Field(field) => match field.history.last() {
                Some(last) => self.write_element(f, *last),
                None => Ok(()),
            },
        }
    }
}

pub struct Displayed<'a> {
    document: &'a Document,
    id: NodeId,
}

impl Display for Displayed<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.document.write_element(f, self.id)
    }
}
