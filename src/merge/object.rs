use indexmap::IndexMap;
use tracing::{Level, enabled, instrument, trace};

use crate::error::Error;
use crate::merge::document::{Document, Element, HoconType, NodeId};
use crate::merge::view::ObjectView;
use crate::path::Path;

/// One `{...}` scope: fields in insertion order, one per key.
///
/// An object with `components` is a merged object, a live view over those
/// component objects, see [`Document::new_merged_object`].
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Object {
    pub(crate) fields: IndexMap<String, NodeId>,
    pub(crate) components: Vec<NodeId>,
}

impl Object {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_merged(&self) -> bool {
        !self.components.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn fields(&self) -> &IndexMap<String, NodeId> {
        &self.fields
    }

    pub fn components(&self) -> &[NodeId] {
        &self.components
    }
}

impl Document {
    /// The field under `key`; for a merged object, the one of the highest
    /// priority component that has the key.
    pub fn get_field(&self, object: NodeId, key: &str) -> crate::Result<Option<NodeId>> {
        let this = self.as_object(object)?;
        if !this.is_merged() {
            return Ok(this.fields.get(key).copied());
        }
        let field = self
            .object_components(object)
            .into_iter()
            .rev()
            .find_map(|component| match self.element(component) {
                Element::Object(component) => component.fields.get(key).copied(),
                _ => None,
            });
        Ok(field)
    }

    /// Returns the field under `key`, creating an unassigned one if needed.
    /// Merged objects create the field in their last component.
    pub fn get_or_create_key(&mut self, object: NodeId, key: &str) -> crate::Result<NodeId> {
        let target = self.writable_component(object)?;
        if let Some(field) = self.as_object(target)?.fields.get(key).copied() {
            return Ok(field);
        }
        let field = self.new_field(Some(target), key)?;
        self.as_object_mut(target)?.fields.insert(key.to_string(), field);
        Ok(field)
    }

    /// Read-only lookup of the field at `path` below `object`.
    ///
    /// Intermediate values are read through their collapsed object view, so
    /// merged assignments are searched as one object. The field returned is
    /// the one of highest priority, so assigning to it changes what the
    /// path reads.
    pub fn traverse_path(&self, object: NodeId, path: &Path) -> crate::Result<NodeId> {
        let Some((last, intermediate)) = path.segments().split_last() else {
            return Err(Error::InvalidPathExpression("path is empty"));
        };
        let not_found = || Error::PathNotFound(path.to_string());
        self.as_object(object)?;
        let mut view = ObjectView {
            components: self.object_components(object),
        };
        for segment in intermediate {
            let value = self.object_view_get(&view, segment).ok_or_else(not_found)?;
            if self.view_type(&value) != HoconType::Object {
                return Err(not_found());
            }
            view = self.object_view(&value)?;
        }
        self.object_view_fields(&view, last)
            .last()
            .copied()
            .ok_or_else(not_found)
    }

    /// Like [`Document::traverse_path`], but creates missing fields and
    /// turns non-object intermediate fields into objects.
    pub fn traverse_path_or_create(&mut self, object: NodeId, path: &Path) -> crate::Result<NodeId> {
        let Some((last, intermediate)) = path.segments().split_last() else {
            return Err(Error::InvalidPathExpression("path is empty"));
        };
        let mut current = object;
        for segment in intermediate {
            let field = self.get_or_create_key(current, segment)?;
            self.ensure_field_is_object(field)?;
            current = self.object_for_write(field)?;
        }
        self.get_or_create_key(current, last)
    }

    /// The object that receives new keys written below `field`: the last
    /// object of its current value. Nothing is allocated when one exists.
    fn object_for_write(&mut self, field: NodeId) -> crate::Result<NodeId> {
        if let Some(view) = self.current_value(field) {
            let mut objects = vec![];
            self.fragments_objects(self.view_fragments(&view), &mut objects);
            if let Some(last) = objects.last() {
                return Ok(*last);
            }
        }
        self.get_object(field)
    }

    /// Installs `field` under `key`, replacing any previous field without
    /// touching its history.
    pub fn set_field(&mut self, object: NodeId, key: &str, field: NodeId) -> crate::Result<()> {
        self.as_field(field)?;
        let target = self.writable_component(object)?;
        self.set_parent(field, Some(target));
        self.as_field_mut(field)?.key = key.to_string();
        self.as_object_mut(target)?.fields.insert(key.to_string(), field);
        Ok(())
    }

    /// Removes `key`; a merged object removes it from every component and
    /// returns the field of highest priority.
    pub fn remove_field(&mut self, object: NodeId, key: &str) -> crate::Result<Option<NodeId>> {
        self.as_object(object)?;
        let mut removed = None;
        for component in self.object_components(object) {
            if let Some(field) = self.as_object_mut(component)?.fields.shift_remove(key) {
                self.set_parent(field, None);
                removed = Some(field);
            }
        }
        Ok(removed)
    }

    /// Merges `other` into `object`.
    ///
    /// Keys only present in `other` are copied over. For shared keys the
    /// history of the other field is appended to the local one, so nested
    /// objects merge and scalars or arrays from `other` shadow local values.
    /// A merged object instead takes a copy of `other` as its new last
    /// component.
    pub fn merge(&mut self, object: NodeId, other: NodeId) -> crate::Result<()> {
        self.merge_object(object, None, other)
    }

    /// [`Document::merge`] with `other` read from another document.
    pub fn merge_from(&mut self, object: NodeId, src: &Document, other: NodeId) -> crate::Result<()> {
        self.merge_object(object, Some(src), other)
    }

    #[instrument(level = Level::TRACE, skip(self, src))]
    fn merge_object(
        &mut self,
        object: NodeId,
        src: Option<&Document>,
        other: NodeId,
    ) -> crate::Result<()> {
        if !self.as_object(object)?.is_merged() {
            return self.merge_fields(object, src, other);
        }
        let component = self.clone_from(src, other, None);
        // The value a merged object was read from must see the new component.
        let owner = self.parent(object).filter(|parent| match self.element(*parent) {
            Element::Value(value) => !value.fragments.contains(&object),
            _ => false,
        });
        match owner {
            Some(value) => self.value_add(value, component)?,
            None => self.set_parent(component, Some(object)),
        }
        self.as_object_mut(object)?.components.push(component);
        trace!("appended component {} to {}", component, object);
        Ok(())
    }

    pub(crate) fn merge_fields(
        &mut self,
        object: NodeId,
        src: Option<&Document>,
        other: NodeId,
    ) -> crate::Result<()> {
        let source = src.unwrap_or(&*self);
        let mut incoming: Vec<(String, NodeId, Vec<NodeId>)> = vec![];
        for component in source.object_components(other) {
            for (key, field) in &source.as_object(component)?.fields {
                let history = source.as_field(*field)?.history.clone();
                incoming.push((key.clone(), *field, history));
            }
        }
        for (key, other_field, history) in incoming {
            match self.get_field(object, &key)? {
                Some(local) => {
                    for entry in history {
                        let value = self.clone_from(src, entry, None);
                        self.set_value(local, value)?;
                    }
                }
                None => {
                    let field = self.clone_from(src, other_field, Some(object));
                    self.as_object_mut(object)?.fields.insert(key.clone(), field);
                }
            }
            if enabled!(Level::TRACE) {
                trace!("merged `{}` into {}", key, object);
            }
        }
        Ok(())
    }

    /// Drops assignments of `field` that came to nothing, then removes the
    /// field from `object` when it is left without a value.
    pub(crate) fn resolve_field(&mut self, object: NodeId, field: NodeId) -> crate::Result<()> {
        loop {
            let vacant = match self.current_value(field) {
                Some(view) => self.view_is_vacant(&view),
                None => true,
            };
            if !vacant {
                return Ok(());
            }
            if !self.has_old_values(field)? {
                break;
            }
            if let Some(popped) = self.restore_old_value(field)? {
                let mut substitutions = vec![];
                self.collect_substitutions(popped, &mut substitutions);
                for substitution in substitutions {
                    self.mark_removed(substitution);
                }
            }
        }
        let key = self.as_field(field)?.key.clone();
        if self.get_field(object, &key)? == Some(field) {
            trace!("remove empty field `{}`", self.path_of(field));
            self.remove_field(object, &key)?;
        }
        Ok(())
    }
}
