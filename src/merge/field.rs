use tracing::{enabled, trace, Level};

use crate::error::Error;
use crate::merge::document::{Document, Element, HoconType, NodeId};
use crate::merge::view::ValueView;

/// A key of an object together with every value ever assigned to it.
///
/// The current value is derived from the history on each read, see
/// [`Document::current_value`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Field {
    pub(crate) key: String,
    pub(crate) history: Vec<NodeId>,
}

impl Field {
    pub fn new(key: impl Into<String>) -> crate::Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::InvalidKey);
        }
        Ok(Self {
            key,
            history: vec![],
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn history(&self) -> &[NodeId] {
        &self.history
    }

    pub fn has_old_values(&self) -> bool {
        self.history.len() > 1
    }
}

impl Document {
    pub fn new_field(
        &mut self,
        parent: Option<NodeId>,
        key: impl Into<String>,
    ) -> crate::Result<NodeId> {
        let field = Field::new(key)?;
        Ok(self.alloc(parent, Element::Field(field)))
    }

    pub fn has_old_values(&self, field: NodeId) -> crate::Result<bool> {
        Ok(self.as_field(field)?.has_old_values())
    }

    /// The collapsed current value of a field, `None` before the first
    /// assignment.
    pub fn current_value(&self, field: NodeId) -> Option<ValueView> {
        match self.element(field) {
            Element::Field(f) => self.collapse_history(field, &f.history),
            _ => None,
        }
    }

    /// Reduces a history to the value it currently stands for.
    ///
    /// A last entry that is not an object shadows everything before it.
    /// Otherwise the trailing run of object and empty entries since the last
    /// scalar or array assignment merges into one value.
    pub(crate) fn collapse_history(&self, owner: NodeId, history: &[NodeId]) -> Option<ValueView> {
        let last = *history.last()?;
        if self.view_type(&ValueView::Node(last)) != HoconType::Object {
            return Some(ValueView::Node(last));
        }
        let mut run = vec![];
        for entry in history {
            match self.view_type(&ValueView::Node(*entry)) {
                HoconType::Object | HoconType::Empty => run.push(*entry),
                _ => run.clear(),
            }
        }
        Some(self.run_view(owner, &run))
    }

    fn run_view(&self, owner: NodeId, run: &[NodeId]) -> ValueView {
        match run {
            [single] => ValueView::Node(*single),
            _ => {
                let fragments = run
                    .iter()
                    .flat_map(|entry| self.node_fragments(*entry).iter().copied())
                    .collect();
                ValueView::Synthetic { owner, fragments }
            }
        }
    }

    /// Appends an assignment to the history of `field`.
    ///
    /// Any assignment without object content shadows the older entries for
    /// good, so their unresolved substitutions that the new value does not
    /// carry over are marked removed. Object assignments merge instead, and
    /// an assignment reading the field's own older value keeps them.
    pub fn set_value(&mut self, field: NodeId, value: NodeId) -> crate::Result<()> {
        self.as_field(field)?;
        let value = match self.element(value) {
            Element::Value(_) | Element::Empty => value,
            Element::Object(_) | Element::Array(_) | Element::Literal(_) | Element::Substitution(_) => {
                self.value_of(None, [value])?
            }
            Element::Field(_) => {
                return Err(Error::UnknownVariant("field value `field`".to_string()));
            }
        };
        let mut objects = vec![];
        self.fragments_objects(self.node_fragments(value), &mut objects);
        let mut preserved = vec![];
        self.collect_substitutions(value, &mut preserved);
        let location = self.path_of(field);
        let reads_older = preserved.iter().any(|id| match self.element(*id) {
            Element::Substitution(substitution) => substitution.path.starts_with(&location),
            _ => false,
        });
        if objects.is_empty() && !reads_older {
            let mut shadowed = vec![];
            for entry in &self.as_field(field)?.history {
                self.collect_substitutions(*entry, &mut shadowed);
            }
            for substitution in shadowed {
                if !preserved.contains(&substitution) {
                    trace!("{} shadowed by {}", self.display(substitution), self.display(value));
                    self.mark_removed(substitution);
                }
            }
        }
        self.set_parent(value, Some(field));
        self.as_field_mut(field)?.history.push(value);
        if enabled!(Level::TRACE) {
            trace!("set `{}` = {}", self.path_of(field), self.display(value));
        }
        Ok(())
    }

    /// Drops the latest assignment. The first assignment is never removed.
    pub fn restore_old_value(&mut self, field: NodeId) -> crate::Result<Option<NodeId>> {
        let f = self.as_field_mut(field)?;
        if !f.has_old_values() {
            return Ok(None);
        }
        let popped = f.history.pop();
        if let Some(popped) = popped {
            trace!("restore `{}`, dropped {}", self.path_of(field), popped);
            self.set_parent(popped, None);
        }
        Ok(popped)
    }

    /// The value `field` had before the assignment containing `marker`.
    ///
    /// Object assignments before the marker merge as in the collapse rule;
    /// without such a run the entry right before the marker is returned,
    /// and nothing when the marker sits in the first entry.
    pub fn older_value_than(&self, field: NodeId, marker: NodeId) -> crate::Result<Option<ValueView>> {
        let history = &self.as_field(field)?.history;
        Ok(self.older_in_history(field, history, marker))
    }

    /// Like [`Document::older_value_than`], with the same-key fields of the
    /// objects merged below the one holding `field` read as earlier history.
    pub(crate) fn older_value_in_chain(
        &self,
        field: NodeId,
        marker: NodeId,
    ) -> crate::Result<Option<ValueView>> {
        let this = self.as_field(field)?;
        let mut history = vec![];
        if let Some(object) = self.parent(field) {
            for lower in self.lower_components(object) {
                if let Some(lower) = self.get_field(lower, &this.key)? {
                    history.extend_from_slice(&self.as_field(lower)?.history);
                }
            }
        }
        history.extend_from_slice(&this.history);
        Ok(self.older_in_history(field, &history, marker))
    }

    /// Objects merged with `object` at lower priority: earlier components of
    /// the merged object or earlier object fragments of the value holding it.
    fn lower_components(&self, object: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(object) else {
            return vec![];
        };
        let siblings = match self.element(parent) {
            Element::Object(merged) => &merged.components,
            Element::Value(value) => &value.fragments,
            _ => return vec![],
        };
        let Some(index) = siblings.iter().position(|sibling| *sibling == object) else {
            return vec![];
        };
        let mut lower = vec![];
        self.fragments_objects(&siblings[..index], &mut lower);
        lower
    }

    fn older_in_history(&self, owner: NodeId, history: &[NodeId], marker: NodeId) -> Option<ValueView> {
        let mut run = vec![];
        let mut index = 0;
        while index < history.len() {
            let entry = history[index];
            if self.is_ancestor(entry, marker) {
                break;
            }
            match self.view_type(&ValueView::Node(entry)) {
                HoconType::Object => run.push(entry),
                HoconType::Boolean | HoconType::Number | HoconType::String | HoconType::Array => {
                    run.clear()
                }
                HoconType::Empty => {}
            }
            index += 1;
        }
        if run.is_empty() {
            return index.checked_sub(1).map(|previous| ValueView::Node(history[previous]));
        }
        Some(self.run_view(owner, &run))
    }

    /// Makes sure the current value of `field` is an object by assigning a
    /// new empty object when it is not.
    pub fn ensure_field_is_object(&mut self, field: NodeId) -> crate::Result<()> {
        if self.element_type(field)? == HoconType::Object {
            return Ok(());
        }
        let value = self.new_value(Some(field));
        let object = self.new_object(Some(value));
        self.value_add(value, object)?;
        self.as_field_mut(field)?.history.push(value);
        Ok(())
    }

    /// Undoes assignments that came to nothing.
    ///
    /// When the current value is empty and not waiting on a substitution,
    /// the enclosing object drops those assignments, removing the key when
    /// no assignment is left.
    pub fn resolve_value(&mut self, field: NodeId) -> crate::Result<()> {
        let vacant = match self.current_value(field) {
            Some(view) => self.view_is_vacant(&view),
            None => true,
        };
        if !vacant {
            return Ok(());
        }
        match self.parent(field) {
            Some(object) if matches!(self.element(object), Element::Object(_)) => {
                self.resolve_field(object, field)
            }
            _ => Ok(()),
        }
    }
}
