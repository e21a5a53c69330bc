use indexmap::IndexSet;

use crate::error::Error;
use crate::merge::document::{Document, Element, HoconType, NodeId};

/// A read-only handle on a value.
///
/// Collapsing a field history usually yields one of the stored values, but
/// a trailing run of object assignments merges into a value made of all of
/// their fragments. That value is never stored in the document.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ValueView {
    /// A stored node. Fragment elements (objects, arrays, literals and
    /// substitutions) stand for a value made of themselves.
    Node(NodeId),
    Synthetic {
        owner: NodeId,
        fragments: Vec<NodeId>,
    },
}

impl ValueView {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            ValueView::Node(id) => Some(*id),
            ValueView::Synthetic { .. } => None,
        }
    }

    /// The node this view belongs to: the stored node itself, or the field
    /// whose history produced the synthetic value.
    pub fn owner(&self) -> NodeId {
        match self {
            ValueView::Node(id) => *id,
            ValueView::Synthetic { owner, .. } => *owner,
        }
    }
}

/// Ordered component objects read as one merged object, lowest priority first.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct ObjectView {
    pub(crate) components: Vec<NodeId>,
}

impl ObjectView {
    pub fn components(&self) -> &[NodeId] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum SubstitutionState {
    /// Not resolved yet and still able to shadow what surrounds it.
    Pending,
    Resolved(NodeId),
    /// Resolved to nothing, or shadowed before it could be resolved.
    Transparent,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum Lookup {
    Found(ValueView),
    Pending,
    Missing,
}

impl Document {
    /// The value an element currently stands for. Fields answer with their
    /// collapsed history, which is `None` while they have no assignment.
    pub fn element_view(&self, id: NodeId) -> Option<ValueView> {
        match self.element(id) {
            Element::Field(_) => self.current_value(id),
            _ => Some(ValueView::Node(id)),
        }
    }

    pub(crate) fn view_fragments<'a>(&'a self, view: &'a ValueView) -> &'a [NodeId] {
        match view {
            ValueView::Node(id) => match self.element(*id) {
                Element::Value(value) => &value.fragments,
                Element::Empty | Element::Field(_) => &[],
                Element::Object(_)
                | Element::Array(_)
                | Element::Literal(_)
                | Element::Substitution(_) => std::slice::from_ref(id),
            },
            ValueView::Synthetic { fragments, .. } => fragments,
        }
    }

    /// Fragments of a stored value node; empty for anything else.
    pub(crate) fn node_fragments(&self, id: NodeId) -> &[NodeId] {
        match self.element(id) {
            Element::Value(value) => &value.fragments,
            _ => &[],
        }
    }

    pub(crate) fn substitution_state(&self, id: NodeId) -> SubstitutionState {
        match self.element(id) {
            Element::Substitution(substitution) => match substitution.resolved {
                Some(resolved) if matches!(self.element(resolved), Element::Empty) => {
                    SubstitutionState::Transparent
                }
                Some(resolved) => SubstitutionState::Resolved(resolved),
                None if substitution.removed => SubstitutionState::Transparent,
                None => SubstitutionState::Pending,
            },
            _ => SubstitutionState::Transparent,
        }
    }

    pub(crate) fn fragments_pending(&self, fragments: &[NodeId]) -> bool {
        fragments.iter().any(|id| match self.element(*id) {
            Element::Substitution(_) => self.substitution_state(*id) == SubstitutionState::Pending,
            Element::Value(value) => self.fragments_pending(&value.fragments),
            _ => false,
        })
    }

    /// Derives the coarse type of a fragment sequence.
    ///
    /// Any object fragment makes the whole sequence an object. Otherwise the
    /// first significant fragment decides; whitespace and transparent
    /// substitutions are skipped. A pending substitution makes the type
    /// `Empty` because nothing about the value is known yet.
    pub(crate) fn fragments_type(&self, fragments: &[NodeId]) -> HoconType {
        if self.fragments_pending(fragments) {
            return HoconType::Empty;
        }
        let mut first = None;
        for id in fragments {
            let ty = match self.element(*id) {
                Element::Object(_) => return HoconType::Object,
                Element::Array(_) => HoconType::Array,
                Element::Literal(literal) if literal.is_whitespace() => continue,
                Element::Literal(literal) => literal.ty(),
                Element::Substitution(_) => match self.substitution_state(*id) {
                    SubstitutionState::Resolved(resolved) => {
                        match self.fragments_type(self.node_fragments(resolved)) {
                            HoconType::Object => return HoconType::Object,
                            HoconType::Empty => continue,
                            ty => ty,
                        }
                    }
                    SubstitutionState::Pending | SubstitutionState::Transparent => continue,
                },
                Element::Value(value) => match self.fragments_type(&value.fragments) {
                    HoconType::Object => return HoconType::Object,
                    HoconType::Empty => continue,
                    ty => ty,
                },
                Element::Empty | Element::Field(_) => continue,
            };
            first.get_or_insert(ty);
        }
        first.unwrap_or(HoconType::Empty)
    }

    pub fn view_type(&self, view: &ValueView) -> HoconType {
        self.fragments_type(self.view_fragments(view))
    }

    pub fn view_is_pending(&self, view: &ValueView) -> bool {
        self.fragments_pending(self.view_fragments(view))
    }

    /// Empty because nothing was assigned, not because something is pending.
    pub fn view_is_vacant(&self, view: &ValueView) -> bool {
        let fragments = self.view_fragments(view);
        !self.fragments_pending(fragments) && self.fragments_type(fragments) == HoconType::Empty
    }

    /// The coarse type of any element.
    pub fn element_type(&self, id: NodeId) -> crate::Result<HoconType> {
        let ty = match self.element(id) {
            Element::Object(_) => HoconType::Object,
            Element::Array(_) => HoconType::Array,
            Element::Literal(literal) => literal.ty(),
            Element::Field(_) => match self.current_value(id) {
                Some(view) => self.view_type(&view),
                None => HoconType::Empty,
            },
            Element::Substitution(_) | Element::Value(_) | Element::Empty => {
                self.view_type(&ValueView::Node(id))
            }
        };
        Ok(ty)
    }

    pub(crate) fn fragments_string(&self, fragments: &[NodeId]) -> crate::Result<String> {
        let mut string = String::new();
        for id in fragments {
            match self.element(*id) {
                Element::Literal(literal) => string.push_str(literal.get_string()),
                Element::Substitution(_) => {
                    if let SubstitutionState::Resolved(resolved) = self.substitution_state(*id) {
                        let resolved_fragments = self.node_fragments(resolved);
                        let ty = self.fragments_type(resolved_fragments);
                        if matches!(ty, HoconType::Object | HoconType::Array) {
                            return Err(Error::TypeMismatch {
                                expected: "string",
                                actual: ty.name(),
                                path: self.path_of(*id).to_string(),
                            });
                        }
                        string.push_str(&self.fragments_string(resolved_fragments)?);
                    }
                }
                Element::Value(value) => string.push_str(&self.fragments_string(&value.fragments)?),
                Element::Object(_) | Element::Array(_) => {
                    return Err(self.mismatch(*id, "string"));
                }
                Element::Empty | Element::Field(_) => {}
            }
        }
        Ok(string)
    }

    pub(crate) fn fragments_array(&self, fragments: &[NodeId]) -> crate::Result<Vec<NodeId>> {
        let mut elements = vec![];
        for id in fragments {
            match self.element(*id) {
                Element::Array(array) => elements.extend(array.elements.iter().copied()),
                Element::Literal(literal) if literal.is_whitespace() => {}
                Element::Substitution(_) => {
                    if let SubstitutionState::Resolved(resolved) = self.substitution_state(*id) {
                        elements.extend(self.fragments_array(self.node_fragments(resolved))?);
                    }
                }
                Element::Value(value) => elements.extend(self.fragments_array(&value.fragments)?),
                Element::Empty => {}
                Element::Object(_) | Element::Literal(_) | Element::Field(_) => {
                    return Err(self.mismatch(*id, "array"));
                }
            }
        }
        Ok(elements)
    }

    pub(crate) fn fragments_objects(&self, fragments: &[NodeId], objects: &mut Vec<NodeId>) {
        for id in fragments {
            match self.element(*id) {
                Element::Object(object) if object.is_merged() => {
                    self.fragments_objects(&object.components, objects)
                }
                Element::Object(_) => objects.push(*id),
                Element::Substitution(_) => {
                    if let SubstitutionState::Resolved(resolved) = self.substitution_state(*id) {
                        self.fragments_objects(self.node_fragments(resolved), objects);
                    }
                }
                Element::Value(value) => self.fragments_objects(&value.fragments, objects),
                _ => {}
            }
        }
    }

    /// Reads an object-typed view as a merged object without allocating.
    pub fn object_view(&self, view: &ValueView) -> crate::Result<ObjectView> {
        match self.view_type(view) {
            HoconType::Object => {
                let mut components = vec![];
                self.fragments_objects(self.view_fragments(view), &mut components);
                Ok(ObjectView { components })
            }
            HoconType::Empty => Ok(ObjectView::default()),
            ty => Err(Error::TypeMismatch {
                expected: "object",
                actual: ty.name(),
                path: self.path_of(view.owner()).to_string(),
            }),
        }
    }

    /// Keys of every component in first-seen order.
    pub fn object_view_keys(&self, view: &ObjectView) -> Vec<String> {
        let mut keys = IndexSet::new();
        for component in &view.components {
            if let Element::Object(object) = self.element(*component) {
                keys.extend(object.fields.keys().map(String::as_str));
            }
        }
        keys.into_iter().map(str::to_string).collect()
    }

    pub(crate) fn object_view_fields(&self, view: &ObjectView, key: &str) -> Vec<NodeId> {
        view.components
            .iter()
            .filter_map(|component| match self.element(*component) {
                Element::Object(object) => object.fields.get(key).copied(),
                _ => None,
            })
            .collect()
    }

    /// The collapsed value under `key`, treating the histories of every
    /// component field as one history in component order.
    pub fn object_view_get(&self, view: &ObjectView, key: &str) -> Option<ValueView> {
        let fields = self.object_view_fields(view, key);
        let owner = *fields.last()?;
        let history: Vec<NodeId> = fields
            .iter()
            .filter_map(|field| match self.element(*field) {
                Element::Field(field) => Some(field.history.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect();
        self.collapse_history(owner, &history)
    }

    /// Follows `path` through object views starting at `view`.
    pub(crate) fn lookup(&self, view: &ValueView, path: &[String]) -> Lookup {
        let mut current = view.clone();
        for segment in path {
            if self.view_is_pending(&current) {
                return Lookup::Pending;
            }
            if self.view_type(&current) != HoconType::Object {
                return Lookup::Missing;
            }
            let Ok(object) = self.object_view(&current) else {
                return Lookup::Missing;
            };
            match self.object_view_get(&object, segment) {
                Some(next) => current = next,
                None => return Lookup::Missing,
            }
        }
        if self.view_is_pending(&current) {
            Lookup::Pending
        } else if self.view_type(&current) == HoconType::Empty {
            Lookup::Missing
        } else {
            Lookup::Found(current)
        }
    }

    /// True when a pending substitution is reachable anywhere below `view`.
    pub(crate) fn view_has_pending(
        &self,
        view: &ValueView,
        depth: usize,
        max_depth: usize,
    ) -> crate::Result<bool> {
        if depth > max_depth {
            return Err(Error::RecursionDepthExceeded { max_depth });
        }
        let fragments = self.view_fragments(view);
        if self.fragments_pending(fragments) {
            return Ok(true);
        }
        match self.fragments_type(fragments) {
            HoconType::Object => {
                let object = self.object_view(view)?;
                for key in self.object_view_keys(&object) {
                    if let Some(child) = self.object_view_get(&object, &key)
                        && self.view_has_pending(&child, depth + 1, max_depth)?
                    {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            HoconType::Array => {
                for element in self.fragments_array(fragments)? {
                    if self.view_has_pending(&ValueView::Node(element), depth + 1, max_depth)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    /// Structural equality: same coarse type and same logical content.
    /// Empty values equal each other regardless of where they live.
    pub fn views_equal(
        &self,
        left: &ValueView,
        other: &Document,
        right: &ValueView,
    ) -> crate::Result<bool> {
        let ty = self.view_type(left);
        if ty != other.view_type(right) {
            return Ok(false);
        }
        match ty {
            HoconType::Empty => Ok(true),
            HoconType::Object => {
                let left = self.object_view(left)?;
                let right = other.object_view(right)?;
                self.object_views_equal(&left, other, &right)
            }
            HoconType::Array => {
                let left = self.fragments_array(self.view_fragments(left))?;
                let right = other.fragments_array(other.view_fragments(right))?;
                if left.len() != right.len() {
                    return Ok(false);
                }
                for (l, r) in left.iter().zip(right.iter()) {
                    if !self.views_equal(&ValueView::Node(*l), other, &ValueView::Node(*r))? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            HoconType::Boolean | HoconType::Number | HoconType::String => {
                let left = self.fragments_string(self.view_fragments(left))?;
                let right = other.fragments_string(other.view_fragments(right))?;
                Ok(left == right)
            }
        }
    }

    fn object_views_equal(
        &self,
        left: &ObjectView,
        other: &Document,
        right: &ObjectView,
    ) -> crate::Result<bool> {
        let left_keys = self.object_view_keys(left);
        let right_keys = other.object_view_keys(right);
        if left_keys.len() != right_keys.len() {
            return Ok(false);
        }
        for key in &left_keys {
            match (self.object_view_get(left, key), other.object_view_get(right, key)) {
                (Some(l), Some(r)) => {
                    if !self.views_equal(&l, other, &r)? {
                        return Ok(false);
                    }
                }
                (None, None) => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Structural equality of any two elements, possibly from different
    /// documents. Fields additionally compare their paths.
    pub fn elements_equal(
        &self,
        left: NodeId,
        other: &Document,
        right: NodeId,
    ) -> crate::Result<bool> {
        if let (Element::Field(_), Element::Field(_)) = (self.element(left), other.element(right))
            && self.path_of(left) != other.path_of(right)
        {
            return Ok(false);
        }
        match (self.element_view(left), other.element_view(right)) {
            (Some(l), Some(r)) => self.views_equal(&l, other, &r),
            (None, None) => Ok(true),
            (Some(view), None) => Ok(self.view_type(&view) == HoconType::Empty),
            (None, Some(view)) => Ok(other.view_type(&view) == HoconType::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Lookup, ValueView};
    use crate::config_options::MAX_DEPTH;
    use crate::merge::document::{Document, HoconType};
    use crate::merge::literal::Literal;
    use crate::path::Path;

    #[test]
    fn test_literal_view_stands_for_itself() -> crate::Result<()> {
        let mut doc = Document::new();
        let literal = doc.new_literal(None, Literal::long(3));
        let view = ValueView::Node(literal);
        assert_eq!(doc.view_type(&view), HoconType::Number);
        assert_eq!(doc.get_string(literal)?, "3");
        Ok(())
    }

    #[test]
    fn test_lookup_through_objects() -> crate::Result<()> {
        let mut doc = Document::new();
        let root = doc.root_object()?;
        doc.insert_value(root, "a", &crate::hocon!({ b: { c: 1 } }))?;
        let root_view = ValueView::Node(doc.root());
        let found = doc.lookup(&root_view, Path::from("a.b.c").segments());
        let Lookup::Found(view) = found else {
            panic!("expected a.b.c to be found, got {:?}", found);
        };
        assert_eq!(doc.fragments_string(doc.view_fragments(&view))?, "1");
        assert_eq!(
            doc.lookup(&root_view, Path::from("a.x").segments()),
            Lookup::Missing
        );
        assert_eq!(
            doc.lookup(&root_view, Path::from("a.b.c.d").segments()),
            Lookup::Missing
        );
        Ok(())
    }

    #[test]
    fn test_lookup_stops_at_pending() -> crate::Result<()> {
        let mut doc = Document::new();
        let root = doc.root_object()?;
        let field = doc.get_or_create_key(root, "a")?;
        let value = doc.new_value(None);
        let substitution = doc.new_substitution(None, Path::from("b"), false);
        doc.value_add(value, substitution)?;
        doc.set_value(field, value)?;
        let root_view = ValueView::Node(doc.root());
        assert_eq!(
            doc.lookup(&root_view, Path::from("a.x").segments()),
            Lookup::Pending
        );
        assert!(doc.view_has_pending(&root_view, 0, MAX_DEPTH)?);
        Ok(())
    }
}
