//! Export of resolved values.

use super::resolve::Resolved;
use super::{LayeredConfig, ScopeId};
use crate::error::ConfigResult;
use serde_json::{Map, Value as JsonValue};

impl LayeredConfig {
    /// Resolved values of `scope` as a JSON object, subsections nested.
    ///
    /// Only keys of the scope's own sources are included, so values reached
    /// through cascading appear once, in the scope that defines them.
    pub(super) fn dump_scope(&self, scope: ScopeId) -> ConfigResult<JsonValue> {
        let node = self.node(scope);
        let mut map = Map::new();

        for key in self.local_keys(scope) {
            if node.subsection(&key).is_some() {
                continue;
            }
            if let Resolved::Value(value) = self.resolve(scope, &key)? {
                map.insert(key, value.to_json());
            }
        }
        for (name, child) in &node.subsections {
            map.insert(name.clone(), self.dump_scope(*child)?);
        }

        Ok(JsonValue::Object(map))
    }
}
