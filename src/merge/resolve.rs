use std::collections::HashMap;

use tracing::{Level, debug, enabled, instrument, span, trace};

use crate::config_options::MAX_DEPTH;
use crate::error::{Error, Unresolved, UnresolvedReason};
use crate::merge::document::{Document, Element, NodeId};
use crate::merge::view::{Lookup, ObjectView, SubstitutionState, ValueView};
use crate::path::Path;

#[derive(Debug, Clone, Eq, PartialEq)]
enum Attempt {
    Resolved(ValueView),
    /// The target exists but still waits on another substitution.
    NotReady,
    Missing,
}

impl Document {
    /// Resolves every substitution of the document to a fixed point.
    ///
    /// Each pass tries every pending substitution once. Resolution stops when
    /// a pass resolves nothing or after `max_passes` passes. Substitutions
    /// still pending in the visible tree are then reported together.
    pub fn resolve(&mut self, max_passes: usize) -> crate::Result<()> {
        self.resolve_with_depth(max_passes, MAX_DEPTH)
    }

    /// [`Document::resolve`] with values nested deeper than `max_depth`
    /// rejected while they are searched.
    #[instrument(level = Level::DEBUG, skip(self))]
    pub fn resolve_with_depth(&mut self, max_passes: usize, max_depth: usize) -> crate::Result<()> {
        let mut substitutions = vec![];
        self.collect_substitutions(self.root(), &mut substitutions);
        debug!("found {} substitutions", substitutions.len());
        let mut missing: HashMap<NodeId, bool> = HashMap::new();
        for pass in 0..max_passes {
            let span = span!(Level::TRACE, "resolve_pass", pass);
            let _enter = span.enter();
            let mut progress = false;
            for substitution in substitutions.iter().copied() {
                if self.substitution_state(substitution) != SubstitutionState::Pending {
                    continue;
                }
                let optional = self.as_substitution(substitution)?.optional;
                let attempt = self.attempt(substitution, max_depth)?;
                trace!("{} -> {:?}", self.display(substitution), attempt);
                match attempt {
                    Attempt::Resolved(view) => {
                        let resolved = self.materialize_view(&view, Some(substitution))?;
                        self.as_substitution_mut(substitution)?.resolved = Some(resolved);
                        if enabled!(Level::TRACE) {
                            trace!("resolved {} to {}", self.path_of(substitution), self.display(resolved));
                        }
                        progress = true;
                    }
                    Attempt::Missing if optional => {
                        let empty = self.new_empty(Some(substitution));
                        self.as_substitution_mut(substitution)?.resolved = Some(empty);
                        if let Some((field, _)) = self.enclosing_fields(substitution).first().copied()
                        {
                            self.resolve_value(field)?;
                        }
                        progress = true;
                    }
                    Attempt::Missing => {
                        missing.insert(substitution, true);
                    }
                    Attempt::NotReady => {
                        missing.insert(substitution, false);
                    }
                }
            }
            if !progress {
                debug!("fixed point reached after {} passes", pass + 1);
                break;
            }
        }
        let mut pending = vec![];
        self.collect_pending(self.node_fragments(self.root()), &mut pending, 0, max_depth)?;
        if pending.is_empty() {
            return Ok(());
        }
        let unresolved = pending
            .into_iter()
            .map(|substitution| Unresolved {
                substitution: self.display(substitution).to_string(),
                field: self.path_of(substitution).to_string(),
                reason: match missing.get(&substitution) {
                    Some(false) => UnresolvedReason::Circular,
                    _ => UnresolvedReason::Missing,
                },
            })
            .collect();
        Err(Error::UnresolvedSubstitutions(unresolved))
    }

    /// Enclosing fields of `id` from the innermost outwards, each paired
    /// with whether an array lies between `id` and that field.
    fn enclosing_fields(&self, id: NodeId) -> Vec<(NodeId, bool)> {
        let mut fields = vec![];
        let mut in_array = false;
        let mut current = self.parent(id);
        while let Some(node) = current {
            match self.element(node) {
                Element::Array(_) => in_array = true,
                Element::Field(_) => fields.push((node, in_array)),
                _ => {}
            }
            current = self.parent(node);
        }
        fields
    }

    fn attempt(&self, substitution: NodeId, max_depth: usize) -> crate::Result<Attempt> {
        let path = self.as_substitution(substitution)?.path.clone();
        let fields = self.enclosing_fields(substitution);
        let location = fields
            .first()
            .map(|(field, _)| self.path_of(*field))
            .unwrap_or_default();
        let self_referencing = !location.is_empty()
            && (location.starts_with(&path) || path.starts_with(&location));
        if !self_referencing {
            let root = ValueView::Node(self.root());
            return self.ready(self.lookup(&root, path.segments()), max_depth);
        }
        // A reference to the value being assigned reads the value the
        // enclosing field had before this assignment.
        for (field, in_array) in fields {
            let field_path = self.path_of(field);
            if !path.starts_with(&field_path) {
                continue;
            }
            if in_array {
                return Err(Error::SelfReferenceInArray(format!(
                    "{} at `{}`",
                    self.display(substitution),
                    location
                )));
            }
            let Some(older) = self.older_value_in_chain(field, substitution)? else {
                continue;
            };
            match self.lookup(&older, &path.segments()[field_path.len()..]) {
                Lookup::Missing => continue,
                found => return self.ready(found, max_depth),
            }
        }
        Ok(Attempt::Missing)
    }

    fn ready(&self, lookup: Lookup, max_depth: usize) -> crate::Result<Attempt> {
        match lookup {
            Lookup::Found(view) => {
                if self.view_has_pending(&view, 0, max_depth)? {
                    Ok(Attempt::NotReady)
                } else {
                    Ok(Attempt::Resolved(view))
                }
            }
            Lookup::Pending => Ok(Attempt::NotReady),
            Lookup::Missing => Ok(Attempt::Missing),
        }
    }

    /// Pending substitutions reachable from the current values below
    /// `fragments`. Shadowed history entries are not visited.
    fn collect_pending(
        &self,
        fragments: &[NodeId],
        pending: &mut Vec<NodeId>,
        depth: usize,
        max_depth: usize,
    ) -> crate::Result<()> {
        if depth > max_depth {
            return Err(Error::RecursionDepthExceeded { max_depth });
        }
        let mut objects = vec![];
        self.fragments_objects(fragments, &mut objects);
        if !objects.is_empty() {
            let view = ObjectView {
                components: objects,
            };
            for key in self.object_view_keys(&view) {
                if let Some(child) = self.object_view_get(&view, &key) {
                    self.collect_pending(self.view_fragments(&child), pending, depth + 1, max_depth)?;
                }
            }
        }
        for id in fragments {
            match self.element(*id) {
                Element::Substitution(_) => {
                    if self.substitution_state(*id) == SubstitutionState::Pending
                        && !pending.contains(id)
                    {
                        pending.push(*id);
                    }
                }
                Element::Array(array) => {
                    for element in &array.elements {
                        self.collect_pending(
                            self.node_fragments(*element),
                            pending,
                            depth + 1,
                            max_depth,
                        )?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Substitution paths that are still pending anywhere in the visible tree.
    pub fn pending_substitutions(&self) -> crate::Result<Vec<Path>> {
        let mut pending = vec![];
        self.collect_pending(self.node_fragments(self.root()), &mut pending, 0, MAX_DEPTH)?;
        pending
            .into_iter()
            .map(|substitution| Ok(self.as_substitution(substitution)?.path.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::config_options::MAX_RESOLVE_PASSES;
    use crate::error::{Error, UnresolvedReason};
    use crate::hocon;
    use crate::merge::document::{Document, NodeId};
    use crate::merge::literal::Literal;
    use crate::path::Path;

    fn assign(doc: &mut Document, path: &str, fragments: Vec<NodeId>) -> crate::Result<NodeId> {
        let root = doc.root_object()?;
        let field = doc.traverse_path_or_create(root, &Path::from(path))?;
        let value = doc.value_of(None, fragments)?;
        doc.set_value(field, value)?;
        Ok(field)
    }

    fn literal(doc: &mut Document, literal: Literal) -> NodeId {
        doc.new_literal(None, literal)
    }

    fn reference(doc: &mut Document, path: &str) -> NodeId {
        doc.new_substitution(None, Path::from(path), false)
    }

    fn optional(doc: &mut Document, path: &str) -> NodeId {
        doc.new_substitution(None, Path::from(path), true)
    }

    #[test]
    fn test_self_reference_appends() -> crate::Result<()> {
        let mut doc = Document::new();
        let one = literal(&mut doc, Literal::long(1));
        let x = assign(&mut doc, "x", vec![one])?;
        let own = reference(&mut doc, "x");
        let two = literal(&mut doc, Literal::unquoted("2"));
        assign(&mut doc, "x", vec![own, two])?;

        let older = doc.older_value_than(x, own)?.expect("older value");
        assert_eq!(doc.fragments_string(doc.view_fragments(&older))?, "1");
        doc.resolve(MAX_RESOLVE_PASSES)?;
        assert_eq!(doc.get_string(x)?, "12");
        assert_eq!(doc.freeze_root()?, hocon!({ x: "12" }));
        Ok(())
    }

    #[test]
    fn test_chained_references() -> crate::Result<()> {
        let mut doc = Document::new();
        let to_b = reference(&mut doc, "b");
        assign(&mut doc, "a", vec![to_b])?;
        let to_c = reference(&mut doc, "c.value");
        assign(&mut doc, "b", vec![to_c])?;
        let one = literal(&mut doc, Literal::long(1));
        assign(&mut doc, "c.value", vec![one])?;
        doc.resolve(MAX_RESOLVE_PASSES)?;
        assert_eq!(doc.freeze_root()?, hocon!({ a: 1, b: 1, c: { value: 1 } }));
        Ok(())
    }

    #[test]
    fn test_object_reference_and_merge() -> crate::Result<()> {
        let mut doc = Document::new();
        let root = doc.root_object()?;
        doc.insert_value(root, "base", &hocon!({ host: "localhost", port: 80 }))?;
        let base = reference(&mut doc, "base");
        assign(&mut doc, "server", vec![base])?;
        let port = literal(&mut doc, Literal::long(8080));
        assign(&mut doc, "server.port", vec![port])?;
        doc.resolve(MAX_RESOLVE_PASSES)?;
        assert_eq!(
            doc.freeze_root()?,
            hocon!({
                base: { host: "localhost", port: 80 },
                server: { host: "localhost", port: 8080 }
            })
        );
        Ok(())
    }

    #[test]
    fn test_array_append() -> crate::Result<()> {
        let mut doc = Document::new();
        let root = doc.root_object()?;
        doc.insert_value(root, "list", &hocon!([1, 2]))?;
        let own = reference(&mut doc, "list");
        let array = doc.new_array(None);
        let three = literal(&mut doc, Literal::long(3));
        doc.array_push(array, three)?;
        assign(&mut doc, "list", vec![own, array])?;
        doc.resolve(MAX_RESOLVE_PASSES)?;
        assert_eq!(doc.freeze_root()?, hocon!({ list: [1, 2, 3] }));
        Ok(())
    }

    #[test]
    fn test_sibling_reference_inside_object() -> crate::Result<()> {
        let mut doc = Document::new();
        let root = doc.root_object()?;
        doc.insert_value(root, "a", &hocon!({ x: 1 }))?;
        let two = literal(&mut doc, Literal::long(2));
        assign(&mut doc, "a.x", vec![two])?;
        let to_x = reference(&mut doc, "a.x");
        assign(&mut doc, "a.y", vec![to_x])?;
        doc.resolve(MAX_RESOLVE_PASSES)?;
        assert_eq!(doc.freeze_root()?, hocon!({ a: { x: 2, y: 2 } }));
        Ok(())
    }

    #[test]
    fn test_unresolved_path_reported_once() -> crate::Result<()> {
        let mut doc = Document::new();
        let one = literal(&mut doc, Literal::long(1));
        assign(&mut doc, "present", vec![one])?;
        let missing = reference(&mut doc, "nowhere");
        assign(&mut doc, "a", vec![missing])?;
        let error = doc.resolve(MAX_RESOLVE_PASSES).unwrap_err();
        let Error::UnresolvedSubstitutions(unresolved) = &error else {
            panic!("unexpected error {error}");
        };
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].substitution, "${nowhere}");
        assert_eq!(unresolved[0].field, "a");
        assert_eq!(unresolved[0].reason, UnresolvedReason::Missing);
        assert!(error.to_string().contains("nowhere"));
        assert!(!error.is_structural());
        Ok(())
    }

    #[test]
    fn test_all_unresolved_reported_together() -> crate::Result<()> {
        let mut doc = Document::new();
        let to_b = reference(&mut doc, "b");
        assign(&mut doc, "a", vec![to_b])?;
        let to_a = reference(&mut doc, "a");
        assign(&mut doc, "b", vec![to_a])?;
        let nothing = reference(&mut doc, "nothing");
        assign(&mut doc, "c", vec![nothing])?;
        let Err(Error::UnresolvedSubstitutions(unresolved)) = doc.resolve(MAX_RESOLVE_PASSES) else {
            panic!("expected unresolved substitutions");
        };
        let reasons: Vec<(String, UnresolvedReason)> = unresolved
            .into_iter()
            .map(|u| (u.field, u.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("a".to_string(), UnresolvedReason::Circular),
                ("b".to_string(), UnresolvedReason::Circular),
                ("c".to_string(), UnresolvedReason::Missing),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_optional_missing_undoes_assignment() -> crate::Result<()> {
        let mut doc = Document::new();
        let one = literal(&mut doc, Literal::long(1));
        assign(&mut doc, "kept", vec![one])?;
        let maybe = optional(&mut doc, "nowhere");
        assign(&mut doc, "kept", vec![maybe])?;
        let gone = optional(&mut doc, "nowhere");
        assign(&mut doc, "gone", vec![gone])?;
        doc.resolve(MAX_RESOLVE_PASSES)?;
        let root = doc.root_object()?;
        assert_eq!(doc.get_field(root, "gone")?, None);
        assert_eq!(doc.freeze_root()?, hocon!({ kept: 1 }));
        Ok(())
    }

    #[test]
    fn test_self_reference_in_array() -> crate::Result<()> {
        let mut doc = Document::new();
        let root = doc.root_object()?;
        doc.insert_value(root, "list", &hocon!([1]))?;
        let own = reference(&mut doc, "list");
        let array = doc.new_array(None);
        doc.array_push(array, own)?;
        assign(&mut doc, "list", vec![array])?;
        let error = doc.resolve(MAX_RESOLVE_PASSES).unwrap_err();
        assert!(matches!(error, Error::SelfReferenceInArray(_)));
        Ok(())
    }

    #[test]
    fn test_shadowed_substitution_is_ignored() -> crate::Result<()> {
        let mut doc = Document::new();
        let missing = reference(&mut doc, "nowhere");
        assign(&mut doc, "a", vec![missing])?;
        let five = literal(&mut doc, Literal::long(5));
        assign(&mut doc, "a", vec![five])?;
        doc.resolve(MAX_RESOLVE_PASSES)?;
        assert_eq!(doc.freeze_root()?, hocon!({ a: 5 }));
        Ok(())
    }

    #[test]
    fn test_reference_shadowing_pending_reference() -> crate::Result<()> {
        let mut doc = Document::new();
        let root = doc.root_object()?;
        doc.insert_value(root, "b", &hocon!({ y: 1 }))?;
        let missing = reference(&mut doc, "missing");
        assign(&mut doc, "a", vec![missing])?;
        let to_b = reference(&mut doc, "b");
        assign(&mut doc, "a", vec![to_b])?;
        assert!(doc.as_substitution(missing)?.is_removed());
        doc.resolve(MAX_RESOLVE_PASSES)?;
        assert_eq!(doc.freeze_root()?, hocon!({ b: { y: 1 }, a: { y: 1 } }));
        Ok(())
    }

    #[test]
    fn test_self_reference_reads_earlier_object_of_same_value() -> crate::Result<()> {
        let mut doc = Document::new();
        let first = doc.new_object(None);
        doc.insert_value(first, "a", &hocon!(1))?;
        let second = doc.new_object(None);
        let a = doc.get_or_create_key(second, "a")?;
        let own = reference(&mut doc, "cfg.a");
        let two = literal(&mut doc, Literal::unquoted("2"));
        let value = doc.value_of(None, [own, two])?;
        doc.set_value(a, value)?;
        assign(&mut doc, "cfg", vec![first, second])?;
        doc.resolve(MAX_RESOLVE_PASSES)?;
        assert_eq!(doc.freeze_root()?, hocon!({ cfg: { a: "12" } }));
        Ok(())
    }

    #[test]
    fn test_resolve_with_depth_limit() -> crate::Result<()> {
        let mut doc = Document::new();
        let root = doc.root_object()?;
        doc.insert_value(root, "deep", &hocon!({ a: { b: { c: 1 } } }))?;
        let error = doc.resolve_with_depth(MAX_RESOLVE_PASSES, 1).unwrap_err();
        assert!(matches!(error, Error::RecursionDepthExceeded { max_depth: 1 }));
        doc.resolve_with_depth(MAX_RESOLVE_PASSES, 8)?;
        Ok(())
    }

    #[test]
    fn test_pending_substitutions() -> crate::Result<()> {
        let mut doc = Document::new();
        let missing = reference(&mut doc, "x.y");
        assign(&mut doc, "a", vec![missing])?;
        assert_eq!(doc.pending_substitutions()?, vec![Path::from("x.y")]);
        Ok(())
    }
}
