//! Read and write views onto one scope of a [`LayeredConfig`].

use super::resolve::Resolved;
use super::{LayeredConfig, ScopeId};
use crate::error::{ConfigError, ConfigResult, ErrorCode};
use crate::value::Value;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// Result of looking up a name: subsections shadow ordinary keys.
#[derive(Debug)]
pub enum Entry<'a> {
    Section(Scope<'a>),
    Value(Value),
}

/// Read-only view of a scope.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    config: &'a LayeredConfig,
    id: ScopeId,
}

impl std::fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("section_key", &self.section_key())
            .field("subsections", &self.subsection_names())
            .finish()
    }
}

impl<'a> Scope<'a> {
    pub(crate) fn new(config: &'a LayeredConfig, id: ScopeId) -> Self {
        Self { config, id }
    }

    /// Resolve `key` to a subsection or a (possibly coerced) value.
    pub fn lookup(&self, key: &str) -> ConfigResult<Entry<'a>> {
        Ok(match self.config.resolve(self.id, key)? {
            Resolved::Section(id) => Entry::Section(Scope::new(self.config, id)),
            Resolved::Value(value) => Entry::Value(value),
        })
    }

    /// Resolve `key` to a value. Subsection names are an error here.
    pub fn get(&self, key: &str) -> ConfigResult<Value> {
        match self.lookup(key)? {
            Entry::Value(value) => Ok(value),
            Entry::Section(_) => Err(ConfigError::is_section(key)),
        }
    }

    /// Like [`Scope::lookup`], but a missing key yields `default`.
    pub fn lookup_or(&self, key: &str, default: impl Into<Value>) -> ConfigResult<Entry<'a>> {
        match self.lookup(key) {
            Err(err) if err.is_not_found() => Ok(Entry::Value(default.into())),
            other => other,
        }
    }

    /// Like [`Scope::get`], but a missing key yields `default`. A
    /// subsection name is still an `IsSection` error; use
    /// [`Scope::lookup_or`] to get the subsection instead.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> ConfigResult<Value> {
        match self.get(key) {
            Err(err) if err.is_not_found() => Ok(default.into()),
            other => other,
        }
    }

    /// Resolve `key` and deserialize it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<T> {
        let value = self.get(key)?;
        serde_json::from_value(value.to_json()).map_err(|e| {
            ConfigError::new(ErrorCode::Coerce, format!("Cannot read {}: {}", key, e)).with_key(key)
        })
    }

    pub fn subsection(&self, name: &str) -> Option<Scope<'a>> {
        self.config
            .node(self.id)
            .subsection(name)
            .map(|id| Scope::new(self.config, id))
    }

    /// Follow a dotted path of subsection names.
    pub fn section(&self, path: &str) -> Option<Scope<'a>> {
        path.split('.')
            .try_fold(*self, |scope, name| scope.subsection(name))
    }

    pub fn subsection_names(&self) -> Vec<&'a str> {
        self.config
            .node(self.id)
            .subsections
            .iter()
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn parent(&self) -> Option<Scope<'a>> {
        self.config
            .node(self.id)
            .parent
            .map(|id| Scope::new(self.config, id))
    }

    /// Name under which this scope is registered in its parent.
    pub fn section_key(&self) -> Option<&'a str> {
        self.config.node(self.id).section_key.as_deref()
    }

    pub fn is_writable(&self) -> bool {
        self.config.node(self.id).writable
    }

    /// Keys of this scope, plus those of enclosing scopes when cascading.
    pub fn keys(&self) -> Vec<String> {
        self.config.keys_of(self.id)
    }

    /// Identifier of the source that supplies `key`, if any.
    pub fn where_is(&self, key: &str) -> Option<&'a str> {
        self.config.where_is(self.id, key)
    }

    /// Resolved values of this scope and its subsections as a JSON object.
    pub fn dump(&self) -> ConfigResult<JsonValue> {
        self.config.dump_scope(self.id)
    }
}

impl<'a> IntoIterator for Scope<'a> {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys().into_iter()
    }
}

/// Mutable view of a scope.
pub struct ScopeMut<'a> {
    config: &'a mut LayeredConfig,
    id: ScopeId,
}

impl<'a> ScopeMut<'a> {
    pub(crate) fn new(config: &'a mut LayeredConfig, id: ScopeId) -> Self {
        Self { config, id }
    }

    pub fn as_scope(&self) -> Scope<'_> {
        Scope::new(&*self.config, self.id)
    }

    pub fn get(&self, key: &str) -> ConfigResult<Value> {
        self.as_scope().get(key)
    }

    /// Set `key` on the highest-priority writable source, marking it and
    /// the documents it belongs to dirty, and on the highest-priority
    /// source that already defines or types `key`.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> ConfigResult<()> {
        self.config.assign(self.id, key, value.into())
    }

    /// Set `key` directly on every source of this scope whose identifier is
    /// `source_id`, without marking anything dirty.
    pub fn set_in_source(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        source_id: &str,
    ) -> ConfigResult<()> {
        self.config
            .assign_in_source(self.id, key, value.into(), source_id)
    }

    pub fn subsection(self, name: &str) -> Option<ScopeMut<'a>> {
        let id = self.config.node(self.id).subsection(name)?;
        Some(ScopeMut::new(self.config, id))
    }

    pub fn section(self, path: &str) -> Option<ScopeMut<'a>> {
        path.split('.')
            .try_fold(self, |scope, name| scope.subsection(name))
    }

    pub fn parent(self) -> Option<ScopeMut<'a>> {
        let id = self.config.node(self.id).parent?;
        Some(ScopeMut::new(self.config, id))
    }

    /// Save every dirty, writable source of the whole tree.
    pub fn write(&mut self) -> ConfigResult<()> {
        self.config.write()
    }
}
