//! Read resolution.
//!
//! Finding a value and finding its type are separate passes: the value
//! comes from the highest-priority source that has the key, the type from
//! the highest-priority source that knows the key's type. This lets an
//! untyped command line string be coerced by a typed default.

use super::{LayeredConfig, ScopeId, SourceId};
use crate::error::{ConfigError, ConfigResult};
use crate::value::Value;
use tracing::{debug, trace};

pub(super) enum Resolved {
    Section(ScopeId),
    Value(Value),
}

impl LayeredConfig {
    pub(super) fn resolve(&self, scope: ScopeId, key: &str) -> ConfigResult<Resolved> {
        let node = self.node(scope);
        if let Some(child) = node.subsection(key) {
            return Ok(Resolved::Section(child));
        }

        let Some(value_source) = self.find_value_source(scope, key) else {
            if self.cascade
                && let Some(parent) = node.parent
            {
                trace!(key, "Key not found in section, trying parent");
                return self.resolve(parent, key);
            }
            return Err(ConfigError::not_found(key));
        };

        let source = self.source(value_source);
        if source.typed(key) {
            return source.get(key).map(Resolved::Value);
        }

        let raw = source.get(key)?;
        match self.find_type_source(scope, key) {
            Some(type_source) => {
                let type_source = self.source(type_source);
                debug!(
                    key,
                    value_source = source.identifier(),
                    type_source = type_source.identifier(),
                    "Typing value"
                );
                type_source.typevalue(key, raw).map(Resolved::Value)
            }
            None => Ok(Resolved::Value(raw)),
        }
    }

    /// Highest-priority source carrying `key`, climbing each source's own
    /// parent chain when cascading.
    pub(super) fn find_value_source(&self, scope: ScopeId, key: &str) -> Option<SourceId> {
        self.node(scope)
            .sources
            .iter()
            .rev()
            .find_map(|&id| self.find_in_lineage(id, key))
    }

    fn find_in_lineage(&self, id: SourceId, key: &str) -> Option<SourceId> {
        let mut current = Some(id);
        while let Some(id) = current {
            let slot = &self.sources[id.0];
            if slot.source.has(key) {
                return Some(id);
            }
            current = if self.cascade { slot.parent } else { None };
        }
        None
    }

    /// Highest-priority source typing `key`, in this scope or (when
    /// cascading) the nearest enclosing scope that has one.
    fn find_type_source(&self, scope: ScopeId, key: &str) -> Option<SourceId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let node = self.node(id);
            let found = node
                .sources
                .iter()
                .rev()
                .copied()
                .find(|&source| self.source(source).typed(key));
            if found.is_some() {
                return found;
            }
            current = if self.cascade { node.parent } else { None };
        }
        None
    }

    /// Keys of the sources directly attached to `scope`, first seen first.
    pub(super) fn local_keys(&self, scope: ScopeId) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for &id in &self.node(scope).sources {
            for key in self.source(id).keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    pub(super) fn keys_of(&self, scope: ScopeId) -> Vec<String> {
        let mut keys = self.local_keys(scope);
        if self.cascade {
            let mut current = self.node(scope).parent;
            while let Some(id) = current {
                for key in self.local_keys(id) {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
                current = self.node(id).parent;
            }
        }
        keys
    }

    pub(super) fn where_is(&self, scope: ScopeId, key: &str) -> Option<&str> {
        let node = self.node(scope);
        if node.subsection(key).is_some() {
            return None;
        }
        match self.find_value_source(scope, key) {
            Some(id) => Some(self.source(id).identifier()),
            None if self.cascade => node.parent.and_then(|parent| self.where_is(parent, key)),
            None => None,
        }
    }
}
