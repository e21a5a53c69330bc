use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Serialize, Serializer};
use serde_json::Number;

/// The frozen, parent-free result of resolving a document.
///
/// Objects keep the insertion order of the document they were frozen from.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Object(IndexMap<String, Value>),
    Array(Vec<Value>),
    Boolean(bool),
    Null,
    String(String),
    Number(Number),
}

impl Value {
    pub fn ty(&self) -> &'static str {
        match self {
            Value::Object(_) => "Object",
            Value::Array(_) => "Array",
            Value::Boolean(_) => "Boolean",
            Value::Null => "Null",
            Value::String(_) => "String",
            Value::Number(_) => "Number",
        }
    }

    /// Follows object keys from `self`; an empty key list yields `self`.
    pub fn get_by_path<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Option<&Value> {
        keys.into_iter().try_fold(self, |current, key| match current {
            Value::Object(object) => object.get(key),
            _ => None,
        })
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Object(object) => {
                write!(
                    f,
                    "{{{}}}",
                    object.iter().map(|(k, v)| format!("{k} = {v}")).join(", ")
                )
            }
            Value::Array(array) => write!(f, "[{}]", array.iter().join(", ")),
            Value::Boolean(boolean) => write!(f, "{boolean}"),
            Value::Null => write!(f, "null"),
            Value::String(string) => write!(f, "{string}"),
            Value::Number(number) => write!(f, "{number}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Object(map) => map.serialize(serializer),
            Value::Array(arr) => arr.serialize(serializer),
            Value::Boolean(b) => b.serialize(serializer),
            Value::Null => serializer.serialize_none(),
            Value::String(s) => s.serialize(serializer),
            Value::Number(num) => num.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::hocon;
    use crate::value::Value;

    #[test]
    fn test_get_by_path() {
        let value = hocon!({ a: { b: [1, 2] } });
        assert_eq!(value.get_by_path(["a", "b"]), Some(&hocon!([1, 2])));
        assert_eq!(value.get_by_path(["a", "b", "c"]), None);
        assert_eq!(value.get_by_path(["x"]), None);
        assert_eq!(value.get_by_path(std::iter::empty()), Some(&value));
    }

    #[test]
    fn test_display_keeps_order() {
        let value = hocon!({ z: 1, a: [true, null], m: "s" });
        assert_eq!(value.to_string(), "{z = 1, a = [true, null], m = s}");
        assert_eq!(Value::Object(Default::default()).to_string(), "{}");
    }

    #[test]
    fn test_serializes_to_json() -> crate::Result<()> {
        let value = hocon!({ name: "demo", ports: [80, 443], ratio: 0.5, debug: false, extra: null });
        assert_eq!(
            serde_json::to_string(&value)?,
            r#"{"name":"demo","ports":[80,443],"ratio":0.5,"debug":false,"extra":null}"#
        );
        Ok(())
    }
}
