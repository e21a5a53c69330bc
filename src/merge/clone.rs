use indexmap::IndexMap;

use crate::merge::array::Array;
use crate::merge::document::{Document, Element, NodeId};
use crate::merge::field::Field;
use crate::merge::object::Object;
use crate::merge::substitution::Substitution;
use crate::merge::value::Value;
use crate::merge::view::{ObjectView, ValueView};

impl Document {
    /// Deep copies `id` under `parent`. The copy shares no node with the
    /// source; a merged object is copied as a plain object whose fields
    /// hold the histories of every component in order.
    pub fn clone_node(&mut self, id: NodeId, parent: Option<NodeId>) -> NodeId {
        self.clone_from(None, id, parent)
    }

    /// Deep copies `id` of another document into this one.
    pub fn import(&mut self, src: &Document, id: NodeId, parent: Option<NodeId>) -> NodeId {
        self.clone_from(Some(src), id, parent)
    }

    pub(crate) fn clone_from(
        &mut self,
        src: Option<&Document>,
        id: NodeId,
        parent: Option<NodeId>,
    ) -> NodeId {
        let element = match src {
            Some(src) => src.element(id).clone(),
            None => self.element(id).clone(),
        };
        let copy = self.alloc(parent, Element::Empty);
        let element = match element {
            Element::Object(object) if object.is_merged() => {
                let source = src.unwrap_or(&*self);
                let view = ObjectView {
                    components: source.object_components(id),
                };
                let merged: Vec<(String, Vec<NodeId>)> = source
                    .object_view_keys(&view)
                    .into_iter()
                    .map(|key| {
                        let history = source
                            .object_view_fields(&view, &key)
                            .iter()
                            .filter_map(|field| match source.element(*field) {
                                Element::Field(field) => Some(field.history.iter().copied()),
                                _ => None,
                            })
                            .flatten()
                            .collect();
                        (key, history)
                    })
                    .collect();
                let mut fields = IndexMap::with_capacity(merged.len());
                for (key, history) in merged {
                    let field = self.alloc(Some(copy), Element::Empty);
                    let history = self.clone_all(src, &history, field);
                    *self.element_mut(field) = Element::Field(Field {
                        key: key.clone(),
                        history,
                    });
                    fields.insert(key, field);
                }
                Element::Object(Object {
                    fields,
                    components: vec![],
                })
            }
            Element::Object(object) => {
                let mut fields = IndexMap::with_capacity(object.fields.len());
                for (key, field) in object.fields {
                    fields.insert(key, self.clone_from(src, field, Some(copy)));
                }
                Element::Object(Object {
                    fields,
                    components: vec![],
                })
            }
            Element::Array(array) => Element::Array(Array {
                elements: self.clone_all(src, &array.elements, copy),
            }),
            Element::Value(value) => Element::Value(Value {
                fragments: self.clone_all(src, &value.fragments, copy),
            }),
            Element::Field(field) => Element::Field(Field {
                history: self.clone_all(src, &field.history, copy),
                key: field.key,
            }),
            Element::Substitution(substitution) => {
                let resolved = substitution
                    .resolved
                    .map(|resolved| self.clone_from(src, resolved, Some(copy)));
                Element::Substitution(Substitution {
                    resolved,
                    ..substitution
                })
            }
            element @ (Element::Literal(_) | Element::Empty) => element,
        };
        *self.element_mut(copy) = element;
        copy
    }

    fn clone_all(&mut self, src: Option<&Document>, ids: &[NodeId], parent: NodeId) -> Vec<NodeId> {
        ids.iter()
            .map(|id| self.clone_from(src, *id, Some(parent)))
            .collect()
    }

    /// Stores a copy of what `view` stands for as a new value under `parent`.
    pub fn materialize_view(&mut self, view: &ValueView, parent: Option<NodeId>) -> crate::Result<NodeId> {
        if let ValueView::Node(id) = view
            && matches!(self.element(*id), Element::Value(_) | Element::Empty)
        {
            return Ok(self.clone_node(*id, parent));
        }
        let fragments = self.view_fragments(view).to_vec();
        let value = self.new_value(parent);
        for fragment in fragments {
            let copy = self.clone_node(fragment, None);
            self.value_add(value, copy)?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::hocon;
    use crate::merge::document::Document;
    use crate::merge::literal::Literal;
    use crate::path::Path;

    #[test]
    fn test_clone_is_independent() -> crate::Result<()> {
        let mut doc = Document::new();
        let root = doc.root_object()?;
        doc.insert_value(root, "a", &hocon!({ x: 1, list: [1, 2] }))?;
        let copy = doc.clone_node(root, None);
        assert_ne!(copy, root);
        assert!(doc.elements_equal(root, &doc, copy)?);

        let x = doc.traverse_path(copy, &Path::from("a.x"))?;
        let changed = doc.new_literal(None, Literal::long(9));
        doc.set_value(x, changed)?;
        assert!(!doc.elements_equal(root, &doc, copy)?);
        assert_eq!(doc.freeze(root)?, hocon!({ a: { x: 1, list: [1, 2] } }));
        assert_eq!(doc.freeze(copy)?, hocon!({ a: { x: 9, list: [1, 2] } }));
        Ok(())
    }

    #[test]
    fn test_clone_reparents() -> crate::Result<()> {
        let mut doc = Document::new();
        let root = doc.root_object()?;
        doc.insert_value(root, "a", &hocon!({ x: 1 }))?;
        let holder = doc.new_value(None);
        let copy = doc.clone_node(root, Some(holder));
        assert_eq!(doc.parent(copy), Some(holder));
        let a = doc.get_field(copy, "a")?.expect("cloned field");
        assert_eq!(doc.parent(a), Some(copy));
        assert_eq!(doc.path_of(doc.traverse_path(copy, &Path::from("a.x"))?), Path::from("a.x"));
        Ok(())
    }

    #[test]
    fn test_import_from_other_document() -> crate::Result<()> {
        let mut src = Document::new();
        let src_root = src.root_object()?;
        src.insert_value(src_root, "name", &hocon!("source"))?;
        let mut doc = Document::new();
        let imported = doc.import(&src, src_root, None);
        assert!(doc.elements_equal(imported, &src, src_root)?);
        assert_eq!(doc.freeze(imported)?, hocon!({ name: "source" }));
        Ok(())
    }

    #[test]
    fn test_merged_object_clones_to_plain_object() -> crate::Result<()> {
        let mut doc = Document::new();
        let low = doc.new_object(None);
        doc.insert_value(low, "a", &hocon!(1))?;
        let high = doc.new_object(None);
        doc.insert_value(high, "b", &hocon!(2))?;
        doc.insert_value(high, "a", &hocon!(3))?;
        let merged = doc.new_merged_object(None, vec![low, high])?;
        let copy = doc.clone_node(merged, None);
        assert!(!doc.as_object(copy)?.is_merged());
        assert_eq!(doc.freeze(copy)?, hocon!({ a: 3, b: 2 }));
        let a = doc.get_field(copy, "a")?.expect("copied field");
        assert_eq!(doc.as_field(a)?.history().len(), 2);

        doc.insert_value(low, "c", &hocon!(4))?;
        assert_eq!(doc.freeze(merged)?, hocon!({ a: 3, c: 4, b: 2 }));
        assert_eq!(doc.freeze(copy)?, hocon!({ a: 3, b: 2 }));
        Ok(())
    }
}
