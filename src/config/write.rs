//! Write resolution and persistence.

use super::{LayeredConfig, ROOT, ScopeId, SourceId};
use crate::error::{ConfigError, ConfigResult};
use crate::value::Value;
use tracing::{debug, info};

impl LayeredConfig {
    /// Set `key` in `scope`.
    ///
    /// Two sources may be touched: the highest-priority writable source,
    /// which is marked dirty together with the sources it was derived
    /// from, and the highest-priority source that defined or typed `key`
    /// before the write. If neither exists the set cascades to the parent
    /// scope, or fails.
    pub(super) fn assign(&mut self, scope: ScopeId, key: &str, value: Value) -> ConfigResult<()> {
        let node = self.node(scope);
        let owner = node.sources.iter().rev().copied().find(|&id| {
            let source = self.source(id);
            source.has(key) || source.typed(key)
        });
        let target = node
            .sources
            .iter()
            .rev()
            .copied()
            .find(|&id| self.source(id).writable());
        let parent = node.parent;

        if let Some(target) = target {
            self.source_mut(target).set(key, value.clone())?;
            self.mark_dirty(target);
            debug!(key, source = self.source(target).identifier(), "Set value");
        }

        match owner {
            Some(owner) if Some(owner) != target => {
                debug!(key, source = self.source(owner).identifier(), "Updated defining source");
                self.source_mut(owner).set(key, value)
            }
            Some(_) => Ok(()),
            // The writable source carries the key now
            None if target.is_some() => Ok(()),
            None => match parent {
                Some(parent) if self.cascade => self.assign(parent, key, value),
                _ => Err(ConfigError::unknown_key(key)),
            },
        }
    }

    pub(super) fn assign_in_source(
        &mut self,
        scope: ScopeId,
        key: &str,
        value: Value,
        source_id: &str,
    ) -> ConfigResult<()> {
        let matching: Vec<SourceId> = self
            .node(scope)
            .sources
            .iter()
            .copied()
            .filter(|&id| self.source(id).identifier() == source_id)
            .collect();
        if matching.is_empty() {
            return Err(ConfigError::unknown_source(key, source_id));
        }
        for id in matching {
            self.source_mut(id).set(key, value.clone())?;
        }
        Ok(())
    }

    fn mark_dirty(&mut self, id: SourceId) {
        let mut current = Some(id);
        while let Some(id) = current {
            let slot = &mut self.sources[id.0];
            slot.source.set_dirty(true);
            current = slot.parent;
        }
    }

    fn lineage_root(&self, id: SourceId) -> SourceId {
        let mut id = id;
        while let Some(parent) = self.sources[id.0].parent {
            id = parent;
        }
        id
    }

    /// Save every root source that is writable and dirty.
    ///
    /// Nested sections are part of their root source's document, so only
    /// root sources are saved. Dirty flags of a saved document are cleared.
    pub fn write(&mut self) -> ConfigResult<()> {
        let roots = self.node(ROOT).sources.clone();
        for id in roots {
            let source = self.source_mut(id);
            if !(source.writable() && source.dirty()) {
                continue;
            }
            source.save()?;
            info!(source = source.identifier(), "Wrote configuration");

            for index in 0..self.sources.len() {
                if self.lineage_root(SourceId(index)) == id {
                    self.sources[index].source.set_dirty(false);
                }
            }
        }
        Ok(())
    }
}
