use derive_more::{Deref, DerefMut};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config_options::ConfigOptions;
use crate::error::Error;
use crate::merge::document::{Document, NodeId};
use crate::path::Path;
use crate::value::Value;

/// A document together with the options used to resolve it.
///
/// Values are added programmatically; every addition is a new assignment,
/// so later additions shadow or merge into earlier ones exactly like later
/// lines of a configuration file.
#[derive(Debug, Clone, Deref, DerefMut)]
pub struct Config {
    #[deref]
    #[deref_mut]
    document: Document,
    options: ConfigOptions,
}

impl Config {
    pub fn new(options: Option<ConfigOptions>) -> Self {
        Self {
            document: Document::new(),
            options: options.unwrap_or_default(),
        }
    }

    pub fn from_document(document: Document, options: Option<ConfigOptions>) -> Self {
        Self {
            document,
            options: options.unwrap_or_default(),
        }
    }

    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Assigns `value` at the dotted `path`, creating intermediate objects.
    pub fn add_value<V>(&mut self, path: &str, value: V) -> crate::Result<&mut Self>
    where
        V: Into<Value>,
    {
        let field = self.field_at(path)?;
        let node = self.document.thaw(&value.into())?;
        self.document.set_value(field, node)?;
        Ok(self)
    }

    /// Assigns `${target}` (or `${?target}`) at the dotted `path`.
    pub fn add_substitution(
        &mut self,
        path: &str,
        target: &str,
        optional: bool,
    ) -> crate::Result<&mut Self> {
        let field = self.field_at(path)?;
        let target = Path::with_paths(target)?;
        let substitution = self.document.new_substitution(None, target, optional);
        self.document.set_value(field, substitution)?;
        Ok(self)
    }

    /// Merges every key of a frozen object into the root object.
    pub fn add_object(&mut self, value: &Value) -> crate::Result<&mut Self> {
        let object = expect_object(value)?;
        let root = self.document.root_object()?;
        for (key, value) in object {
            self.document.insert_value(root, key, value)?;
        }
        Ok(self)
    }

    /// Builds a config from frozen objects, lowest priority first.
    ///
    /// Each source becomes one component of a merged root object, followed
    /// by the config's own object which receives later additions.
    pub fn from_sources<I>(sources: I, options: Option<ConfigOptions>) -> crate::Result<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut config = Config::new(options);
        let mut components = vec![];
        for source in sources {
            let object = config.document.new_object(None);
            for (key, value) in expect_object(&source)? {
                config.document.insert_value(object, key, value)?;
            }
            components.push(object);
        }
        if components.is_empty() {
            return Ok(config);
        }
        components.push(config.document.root_object()?);
        config.chain(components)?;
        Ok(config)
    }

    /// Combines `self` with `fallback`; keys of `self` win, objects merge.
    ///
    /// The result chains copies of the root components of both configs, so
    /// changes made to one of its components later are seen on resolve.
    pub fn with_fallback(&self, fallback: &Config) -> crate::Result<Config> {
        let mut combined = Config::new(Some(self.options));
        let mut components = vec![];
        for config in [fallback, self] {
            let document = &config.document;
            for component in document.object_components(document.root_object()?) {
                components.push(combined.document.import(document, component, None));
            }
        }
        combined.chain(components)?;
        debug!(
            "chained {} root components with fallback",
            combined.as_object(combined.root_object()?)?.components().len()
        );
        Ok(combined)
    }

    /// Replaces the root object with a merged object over `components`.
    fn chain(&mut self, components: Vec<NodeId>) -> crate::Result<()> {
        let root = self.document.root();
        let merged = self.document.new_merged_object(Some(root), components.clone())?;
        self.document.replace_root_object(merged)?;
        for component in components {
            self.document.set_parent(component, Some(merged));
        }
        Ok(())
    }

    /// Resolves every substitution and freezes the root object.
    pub fn resolve(&mut self) -> crate::Result<Value> {
        self.document
            .resolve_with_depth(self.options.max_resolve_passes, self.options.max_depth)?;
        let root = self.document.root();
        self.document.freeze_with_depth(root, self.options.max_depth)
    }

    pub fn resolve_into<T>(&mut self) -> crate::Result<T>
    where
        T: DeserializeOwned,
    {
        crate::serde::de::from_value(self.resolve()?)
    }

    fn field_at(&mut self, path: &str) -> crate::Result<NodeId> {
        let path = Path::with_paths(path)?;
        let root = self.document.root_object()?;
        self.document.traverse_path_or_create(root, &path)
    }
}

fn expect_object(value: &Value) -> crate::Result<&IndexMap<String, Value>> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(Error::TypeMismatch {
            expected: "object",
            actual: other.ty(),
            path: String::new(),
        }),
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(None)
    }
}

impl From<Document> for Config {
    fn from(value: Document) -> Self {
        Config::from_document(value, None)
    }
}
