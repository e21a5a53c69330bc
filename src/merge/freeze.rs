use indexmap::IndexMap;
use serde_json::Number;
use tracing::{Level, instrument, trace};

use crate::config_options::MAX_DEPTH;
use crate::error::Error;
use crate::merge::document::{Document, Element, HoconType, NodeId};
use crate::merge::literal::{Literal, LiteralKind};
use crate::merge::view::{SubstitutionState, ValueView};
use crate::value::Value;

impl Document {
    /// Freezes the current value of `id` into a parent-free [`Value`].
    pub fn freeze(&self, id: NodeId) -> crate::Result<Value> {
        self.freeze_with_depth(id, MAX_DEPTH)
    }

    pub fn freeze_root(&self) -> crate::Result<Value> {
        self.freeze(self.root())
    }

    #[instrument(level = Level::TRACE, skip(self))]
    pub fn freeze_with_depth(&self, id: NodeId, max_depth: usize) -> crate::Result<Value> {
        match self.element_view(id) {
            Some(view) => self.freeze_view(&view, 0, max_depth),
            None => Ok(Value::Null),
        }
    }

    fn freeze_view(&self, view: &ValueView, depth: usize, max_depth: usize) -> crate::Result<Value> {
        if depth > max_depth {
            return Err(Error::RecursionDepthExceeded { max_depth });
        }
        let fragments = self.view_fragments(view);
        if self.fragments_pending(fragments) {
            return Err(Error::ResolveNotComplete);
        }
        let value = match self.fragments_type(fragments) {
            HoconType::Object => {
                let object = self.object_view(view)?;
                let mut frozen = IndexMap::new();
                for key in self.object_view_keys(&object) {
                    let Some(child) = self.object_view_get(&object, &key) else {
                        continue;
                    };
                    // Fields that came to nothing do not exist.
                    if self.view_is_vacant(&child) {
                        continue;
                    }
                    let child = self.freeze_view(&child, depth + 1, max_depth)?;
                    frozen.insert(key, child);
                }
                Value::Object(frozen)
            }
            HoconType::Array => {
                let mut frozen = vec![];
                for element in self.fragments_array(fragments)? {
                    let element = ValueView::Node(element);
                    if self.view_is_vacant(&element) {
                        continue;
                    }
                    frozen.push(self.freeze_view(&element, depth + 1, max_depth)?);
                }
                Value::Array(frozen)
            }
            HoconType::Boolean | HoconType::Number | HoconType::String => {
                self.freeze_scalar(fragments, depth, max_depth)?
            }
            HoconType::Empty => Value::Null,
        };
        Ok(value)
    }

    /// A lone fragment keeps its own type; anything concatenated is a string.
    fn freeze_scalar(&self, fragments: &[NodeId], depth: usize, max_depth: usize) -> crate::Result<Value> {
        let significant: Vec<NodeId> = fragments
            .iter()
            .copied()
            .filter(|id| match self.element(*id) {
                Element::Literal(literal) => !literal.is_whitespace(),
                Element::Substitution(_) => {
                    matches!(self.substitution_state(*id), SubstitutionState::Resolved(_))
                }
                _ => true,
            })
            .collect();
        if let [single] = significant.as_slice() {
            match self.element(*single) {
                Element::Literal(literal) => return Ok(freeze_literal(literal)),
                Element::Substitution(_) => {
                    if let SubstitutionState::Resolved(resolved) = self.substitution_state(*single) {
                        return self.freeze_view(&ValueView::Node(resolved), depth + 1, max_depth);
                    }
                }
                _ => {}
            }
        }
        Ok(Value::String(self.fragments_string(fragments)?))
    }

    /// Adds `value` under `key` of `object` as a new assignment.
    pub fn insert_value(&mut self, object: NodeId, key: &str, value: &Value) -> crate::Result<NodeId> {
        let field = self.get_or_create_key(object, key)?;
        let node = self.thaw(value)?;
        self.set_value(field, node)?;
        Ok(field)
    }

    /// Builds a detached value node holding a copy of a frozen value.
    pub fn thaw(&mut self, value: &Value) -> crate::Result<NodeId> {
        let fragment = match value {
            Value::Object(map) => {
                let object = self.new_object(None);
                for (key, value) in map {
                    self.insert_value(object, key, value)?;
                }
                object
            }
            Value::Array(items) => {
                let array = self.new_array(None);
                for item in items {
                    let element = self.thaw(item)?;
                    self.array_push(array, element)?;
                }
                array
            }
            Value::Boolean(boolean) => self.new_literal(None, Literal::boolean(*boolean)),
            Value::Null => self.new_literal(None, Literal::null()),
            Value::String(string) => self.new_literal(None, Literal::quoted(string.as_str())),
            Value::Number(number) => {
                let kind = if number.is_f64() {
                    LiteralKind::Double
                } else {
                    LiteralKind::Long
                };
                self.new_literal(None, Literal::new(kind, number.to_string()))
            }
        };
        self.value_of(None, [fragment])
    }
}

fn freeze_literal(literal: &Literal) -> Value {
    let text = literal.get_string();
    let string = || Value::String(text.to_string());
    match literal.kind() {
        LiteralKind::Null => Value::Null,
        LiteralKind::Bool => match text {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            _ => string(),
        },
        LiteralKind::Long | LiteralKind::Double => {
            text.parse::<Number>().map_or_else(|_| string(), Value::Number)
        }
        LiteralKind::Hex => {
            let digits = text
                .strip_prefix("0x")
                .or_else(|| text.strip_prefix("0X"))
                .unwrap_or(text);
            from_radix(digits, 16).unwrap_or_else(string)
        }
        LiteralKind::Octal => {
            let digits = text
                .strip_prefix("0o")
                .or_else(|| text.strip_prefix('0'))
                .unwrap_or(text);
            from_radix(digits, 8).unwrap_or_else(string)
        }
        LiteralKind::UnquotedString
        | LiteralKind::QuotedString
        | LiteralKind::TripleQuotedString
        | LiteralKind::Whitespace => string(),
    }
}

fn from_radix(digits: &str, radix: u32) -> Option<Value> {
    let parsed = i64::from_str_radix(digits, radix).ok()?;
    trace!("parsed {} with radix {} as {}", digits, radix, parsed);
    Some(Value::Number(parsed.into()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::error::Error;
    use crate::hocon;
    use crate::merge::document::Document;
    use crate::merge::literal::{Literal, LiteralKind};
    use crate::path::Path;
    use crate::value::Value;

    #[rstest]
    #[case(Literal::null(), Value::Null)]
    #[case(Literal::boolean(true), Value::Boolean(true))]
    #[case(Literal::new(LiteralKind::Bool, "yes".into()), Value::from("yes"))]
    #[case(Literal::long(42), Value::from(42))]
    #[case(Literal::double(0.25), Value::from(0.25))]
    #[case(Literal::new(LiteralKind::Hex, "0x1F".into()), Value::from(31))]
    #[case(Literal::new(LiteralKind::Octal, "017".into()), Value::from(15))]
    #[case(Literal::new(LiteralKind::Long, "12ab".into()), Value::from("12ab"))]
    #[case(Literal::quoted("text"), Value::from("text"))]
    fn test_freeze_literal(#[case] literal: Literal, #[case] expected: Value) -> crate::Result<()> {
        let mut doc = Document::new();
        let node = doc.new_literal(None, literal);
        let value = doc.value_of(None, [node])?;
        assert_eq!(doc.freeze(value)?, expected);
        Ok(())
    }

    #[test]
    fn test_concatenation_freezes_to_string() -> crate::Result<()> {
        let mut doc = Document::new();
        let one = doc.new_literal(None, Literal::long(1));
        let space = doc.new_literal(None, Literal::whitespace(" "));
        let two = doc.new_literal(None, Literal::long(2));
        let value = doc.value_of(None, [one, space, two])?;
        assert_eq!(doc.freeze(value)?, hocon!("1 2"));
        let padded = doc.new_literal(None, Literal::boolean(false));
        let space = doc.new_literal(None, Literal::whitespace(" "));
        let value = doc.value_of(None, [padded, space])?;
        assert_eq!(doc.freeze(value)?, hocon!(false));
        Ok(())
    }

    #[test]
    fn test_round_trip_through_document() -> crate::Result<()> {
        let frozen = hocon!({
            name: "demo",
            nested { list: [1, 2.5, true, null, { k: "v" }], empty: {} },
            none: null
        });
        let mut doc = Document::new();
        let root = doc.root_object()?;
        doc.insert_value(root, "config", &frozen)?;
        let config = doc.traverse_path(root, &Path::from("config"))?;
        assert_eq!(doc.freeze(config)?, frozen);
        Ok(())
    }

    #[test]
    fn test_pending_substitution_is_not_frozen() -> crate::Result<()> {
        let mut doc = Document::new();
        let root = doc.root_object()?;
        let field = doc.get_or_create_key(root, "a")?;
        let substitution = doc.new_substitution(None, Path::from("b"), false);
        doc.set_value(field, substitution)?;
        assert!(matches!(doc.freeze_root(), Err(Error::ResolveNotComplete)));
        Ok(())
    }

    #[test]
    fn test_depth_limit() -> crate::Result<()> {
        let mut doc = Document::new();
        let root = doc.root_object()?;
        doc.insert_value(root, "a", &hocon!({ b: { c: { d: 1 } } }))?;
        assert!(matches!(
            doc.freeze_with_depth(doc.root(), 2),
            Err(Error::RecursionDepthExceeded { max_depth: 2 })
        ));
        assert_eq!(
            doc.freeze_with_depth(doc.root(), 4)?,
            hocon!({ a: { b: { c: { d: 1 } } } })
        );
        Ok(())
    }
}
