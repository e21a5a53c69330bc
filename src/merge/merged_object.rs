use tracing::{Level, enabled, trace};

use crate::error::Error;
use crate::merge::document::{Document, Element, NodeId};
use crate::merge::object::Object;

impl Document {
    /// Creates a merged object over `components`, lowest priority first.
    ///
    /// The merged object stores no fields of its own. Reads go through its
    /// components, so later changes to any component are visible. New keys
    /// are created in the last component and merging another object appends
    /// it as a new component.
    pub fn new_merged_object(
        &mut self,
        parent: Option<NodeId>,
        components: Vec<NodeId>,
    ) -> crate::Result<NodeId> {
        if components.is_empty() {
            return Err(Error::UnsupportedMutation(
                "a merged object needs at least one component",
            ));
        }
        for component in &components {
            self.as_object(*component)?;
        }
        let merged = self.alloc(
            parent,
            Element::Object(Object {
                components,
                ..Default::default()
            }),
        );
        if enabled!(Level::TRACE) {
            trace!("merged object {} over {}", merged, self.display(merged));
        }
        Ok(merged)
    }

    /// The plain objects `object` reads from, lowest priority first.
    ///
    /// Nested merged objects are expanded; a plain object reads from itself.
    pub fn object_components(&self, object: NodeId) -> Vec<NodeId> {
        let mut components = vec![];
        self.fragments_objects(std::slice::from_ref(&object), &mut components);
        components
    }

    /// The component that receives writes made through `object`.
    pub(crate) fn writable_component(&self, object: NodeId) -> crate::Result<NodeId> {
        let last = self.as_object(object)?.components.last().copied();
        match last {
            Some(last) => self.writable_component(last),
            None => Ok(object),
        }
    }
}
#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::hocon;
    use crate::merge::document::{Document, HoconType, NodeId};
    use crate::merge::literal::Literal;
    use crate::path::Path;

    fn components(doc: &mut Document) -> crate::Result<(NodeId, NodeId)> {
        let low = doc.new_object(None);
        doc.insert_value(low, "a", &hocon!({ x: 1 }))?;
        doc.insert_value(low, "b", &hocon!("low"))?;
        let high = doc.new_object(None);
        doc.insert_value(high, "a", &hocon!({ y: 2 }))?;
        doc.insert_value(high, "b", &hocon!("high"))?;
        Ok((low, high))
    }

    #[test]
    fn test_merged_view() -> crate::Result<()> {
        let mut doc = Document::new();
        let (low, high) = components(&mut doc)?;
        let merged = doc.new_merged_object(None, vec![low, high])?;
        assert!(doc.as_object(merged)?.is_merged());
        assert_eq!(
            doc.freeze(merged)?,
            hocon!({ a: { x: 1, y: 2 }, b: "high" })
        );
        Ok(())
    }

    #[test]
    fn test_created_keys_land_in_last_component() -> crate::Result<()> {
        let mut doc = Document::new();
        let (low, high) = components(&mut doc)?;
        let merged = doc.new_merged_object(None, vec![low, high])?;
        let field = doc.get_or_create_key(merged, "c")?;
        assert_eq!(doc.parent(field), Some(high));
        assert_eq!(doc.get_field(merged, "c")?, Some(field));
        assert_eq!(doc.get_field(low, "c")?, None);
        Ok(())
    }

    #[test]
    fn test_writes_through_merged_object_are_visible() -> crate::Result<()> {
        let mut doc = Document::new();
        let low = doc.new_object(None);
        doc.insert_value(low, "a", &hocon!(1))?;
        let high = doc.new_object(None);
        doc.insert_value(high, "b", &hocon!(2))?;
        let merged = doc.new_merged_object(None, vec![low, high])?;

        let c = doc.get_or_create_key(merged, "c")?;
        let three = doc.new_literal(None, Literal::long(3));
        doc.set_value(c, three)?;
        let found = doc.traverse_path(merged, &Path::from("c"))?;
        assert_eq!(doc.get_string(found)?, "3");

        let a = doc.traverse_path(merged, &Path::from("a"))?;
        let nine = doc.new_literal(None, Literal::long(9));
        doc.set_value(a, nine)?;
        assert_eq!(doc.freeze(merged)?, hocon!({ a: 9, b: 2, c: 3 }));

        let d = doc.traverse_path_or_create(merged, &Path::from("d.e"))?;
        let four = doc.new_literal(None, Literal::long(4));
        doc.set_value(d, four)?;
        assert_eq!(doc.get_string(doc.traverse_path(merged, &Path::from("d.e"))?)?, "4");
        assert_eq!(doc.freeze(high)?, hocon!({ b: 2, c: 3, d: { e: 4 } }));
        Ok(())
    }

    #[test]
    fn test_component_mutation_is_visible() -> crate::Result<()> {
        let mut doc = Document::new();
        let (low, high) = components(&mut doc)?;
        let merged = doc.new_merged_object(None, vec![low, high])?;
        doc.insert_value(low, "d", &hocon!(4))?;
        let d = doc.traverse_path(merged, &Path::from("d"))?;
        assert_eq!(doc.get_string(d)?, "4");
        doc.insert_value(high, "a", &hocon!({ z: 3 }))?;
        assert_eq!(
            doc.freeze(merged)?,
            hocon!({ a: { x: 1, y: 2, z: 3 }, b: "high", d: 4 })
        );
        Ok(())
    }

    #[test]
    fn test_merge_appends_component() -> crate::Result<()> {
        let mut doc = Document::new();
        let root = doc.root_object()?;
        let (low, high) = components(&mut doc)?;
        let field = doc.get_or_create_key(root, "cfg")?;
        let value = doc.value_of(None, [low, high])?;
        doc.set_value(field, value)?;
        let merged = doc.get_object(field)?;
        assert_eq!(doc.parent(merged), Some(value));

        let extra = doc.new_object(None);
        doc.insert_value(extra, "b", &hocon!("extra"))?;
        doc.merge(merged, extra)?;
        assert_eq!(doc.as_object(merged)?.components().len(), 3);
        assert_eq!(doc.get_string(doc.traverse_path(merged, &Path::from("b"))?)?, "extra");
        let b = doc.traverse_path(root, &Path::from("cfg.b"))?;
        assert_eq!(doc.get_string(b)?, "extra");
        assert_eq!(doc.element_type(field)?, HoconType::Object);
        assert_eq!(doc.freeze(extra)?, hocon!({ b: "extra" }));
        Ok(())
    }

    #[test]
    fn test_remove_field_from_every_component() -> crate::Result<()> {
        let mut doc = Document::new();
        let (low, high) = components(&mut doc)?;
        let merged = doc.new_merged_object(None, vec![low, high])?;
        let top = doc.get_field(high, "b")?;
        assert_eq!(doc.remove_field(merged, "b")?, top);
        assert_eq!(doc.get_field(merged, "b")?, None);
        assert_eq!(doc.freeze(merged)?, hocon!({ a: { x: 1, y: 2 } }));
        Ok(())
    }

    #[test]
    fn test_needs_components() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.new_merged_object(None, vec![]),
            Err(Error::UnsupportedMutation(_))
        ));
    }
}
