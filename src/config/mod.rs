//! Layered configuration scopes.
//!
//! A [`LayeredConfig`] combines an ordered list of sources, later sources
//! taking priority over earlier ones:
//! 1. **Defaults** - typed values embedded in code
//! 2. **Files** - YAML/JSON settings, usually the writable layer
//! 3. **Environment / command line** - untyped overrides
//!
//! ## Structure
//! Every section name found in any source becomes a child scope. Each scope
//! pairs one source per root source: that source's own subsection, or
//! an empty placeholder of the same kind when that source lacks the
//! section. Scopes and sources live in arenas owned by the `LayeredConfig`;
//! parent links are indices, and callers navigate with [`Scope`] and
//! [`ScopeMut`] views.
//!
//! ## Cascade
//! With `cascade` enabled, a key missing in a section is looked up (and
//! set) in the enclosing sections.

mod dump;
mod resolve;
mod scope;
mod write;

pub use scope::{Entry, Scope, ScopeMut};

use crate::error::ConfigResult;
use crate::source::Source;
use crate::value::Value;
use serde_json::Value as JsonValue;
use std::fmt;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SourceId(usize);

const ROOT: ScopeId = ScopeId(0);

struct SourceSlot {
    source: Box<dyn Source>,
    /// The source this one was obtained from as a subsection or placeholder.
    parent: Option<SourceId>,
}

struct ScopeNode {
    /// Priority increases with index.
    sources: Vec<SourceId>,
    subsections: Vec<(String, ScopeId)>,
    parent: Option<ScopeId>,
    section_key: Option<String>,
    writable: bool,
}

impl ScopeNode {
    fn subsection(&self, name: &str) -> Option<ScopeId> {
        self.subsections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }
}

/// A tree of configuration scopes over a fixed, ordered set of sources.
pub struct LayeredConfig {
    sources: Vec<SourceSlot>,
    scopes: Vec<ScopeNode>,
    cascade: bool,
}

/// Builder for [`LayeredConfig`].
pub struct LayeredConfigBuilder {
    sources: Vec<Box<dyn Source>>,
    cascade: bool,
    writable: bool,
}

impl Default for LayeredConfigBuilder {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            cascade: false,
            writable: true,
        }
    }
}

impl LayeredConfigBuilder {
    /// Add a source with higher priority than all sources added before.
    pub fn with_source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn with_boxed_source(mut self, source: Box<dyn Source>) -> Self {
        self.sources.push(source);
        self
    }

    /// Whether lookups and sets in a section fall back to enclosing
    /// sections. Off by default.
    pub fn cascade(mut self, cascade: bool) -> Self {
        self.cascade = cascade;
        self
    }

    /// Advisory flag reported by [`Scope::is_writable`]. On by default; it
    /// does not block `set`.
    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    pub fn build(self) -> ConfigResult<LayeredConfig> {
        let mut config = LayeredConfig {
            sources: Vec::new(),
            scopes: Vec::new(),
            cascade: self.cascade,
        };
        let roots: Vec<SourceId> = self
            .sources
            .into_iter()
            .map(|source| config.push_source(source, None))
            .collect();
        config.build_scope(roots, None, None, self.writable)?;

        debug!(
            sources = config.scopes[ROOT.0].sources.len(),
            scopes = config.scopes.len(),
            cascade = config.cascade,
            "Built layered configuration"
        );
        Ok(config)
    }
}

impl LayeredConfig {
    pub fn builder() -> LayeredConfigBuilder {
        LayeredConfigBuilder::default()
    }

    /// Build with default flags (no cascade, writable).
    pub fn new(sources: Vec<Box<dyn Source>>) -> ConfigResult<Self> {
        sources
            .into_iter()
            .fold(Self::builder(), LayeredConfigBuilder::with_boxed_source)
            .build()
    }

    pub fn is_cascading(&self) -> bool {
        self.cascade
    }

    pub fn root(&self) -> Scope<'_> {
        Scope::new(self, ROOT)
    }

    pub fn root_mut(&mut self) -> ScopeMut<'_> {
        ScopeMut::new(self, ROOT)
    }

    /// Scope at a dotted section path such as `"mymodule.extra"`.
    pub fn section(&self, path: &str) -> Option<Scope<'_>> {
        self.root().section(path)
    }

    pub fn section_mut(&mut self, path: &str) -> Option<ScopeMut<'_>> {
        self.root_mut().section(path)
    }

    pub fn get(&self, key: &str) -> ConfigResult<Value> {
        self.root().get(key)
    }

    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> ConfigResult<Value> {
        self.root().get_or(key, default)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> ConfigResult<()> {
        self.root_mut().set(key, value)
    }

    pub fn keys(&self) -> Vec<String> {
        self.root().keys()
    }

    pub fn dump(&self) -> ConfigResult<JsonValue> {
        self.root().dump()
    }

    fn push_source(&mut self, source: Box<dyn Source>, parent: Option<SourceId>) -> SourceId {
        self.sources.push(SourceSlot { source, parent });
        SourceId(self.sources.len() - 1)
    }

    fn build_scope(
        &mut self,
        sources: Vec<SourceId>,
        parent: Option<ScopeId>,
        section_key: Option<String>,
        writable: bool,
    ) -> ConfigResult<ScopeId> {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(ScopeNode {
            sources: sources.clone(),
            subsections: Vec::new(),
            parent,
            section_key,
            writable,
        });

        // Union of section names, first seen first
        let mut names: Vec<String> = Vec::new();
        for &source in &sources {
            let source = self.source(source);
            match source.subsections() {
                Some(found) => {
                    for name in found {
                        if !names.contains(&name) {
                            names.push(name);
                        }
                    }
                }
                None => trace!(source = source.identifier(), "Source has no subsections"),
            }
        }

        for name in names {
            let mut children = Vec::with_capacity(sources.len());
            for &source_id in &sources {
                let source = self.source(source_id);
                let has_section = source
                    .subsections()
                    .is_some_and(|found| found.contains(&name));
                let child = if has_section {
                    source.subsection(&name)?
                } else {
                    source.placeholder(&name)
                };
                children.push(self.push_source(child, Some(source_id)));
            }
            let child = self.build_scope(children, Some(id), Some(name.clone()), writable)?;
            self.scopes[id.0].subsections.push((name, child));
        }

        Ok(id)
    }

    fn node(&self, id: ScopeId) -> &ScopeNode {
        &self.scopes[id.0]
    }

    fn source(&self, id: SourceId) -> &dyn Source {
        self.sources[id.0].source.as_ref()
    }

    fn source_mut(&mut self, id: SourceId) -> &mut dyn Source {
        self.sources[id.0].source.as_mut()
    }
}

impl fmt::Debug for LayeredConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identifiers: Vec<&str> = self.scopes[ROOT.0]
            .sources
            .iter()
            .map(|&id| self.source(id).identifier())
            .collect();
        f.debug_struct("LayeredConfig")
            .field("sources", &identifiers)
            .field("scopes", &self.scopes.len())
            .field("cascade", &self.cascade)
            .finish()
    }
}
