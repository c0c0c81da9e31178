//! In-code defaults.
//!
//! Defaults are typed: every value they hold carries its native kind, and
//! untyped overrides from files or the command line are coerced to it.

use crate::error::{ConfigError, ConfigResult};
use crate::source::Source;
use crate::table::{SharedTable, Table};
use crate::value::{Value, coerce};

pub const DEFAULTS_IDENTIFIER: &str = "defaults";

#[derive(Debug, Clone)]
pub struct Defaults {
    table: SharedTable,
    identifier: String,
    writable: bool,
    dirty: bool,
}

impl Defaults {
    pub fn new(table: Table) -> Self {
        Self {
            table: SharedTable::new(table),
            identifier: DEFAULTS_IDENTIFIER.to_string(),
            writable: false,
            dirty: false,
        }
    }

    /// Build defaults from a JSON object (e.g. a parsed YAML file).
    pub fn from_json(json: serde_json::Value) -> ConfigResult<Self> {
        Ok(Self::new(Table::from_json(json)?))
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    fn nested(&self, table: SharedTable) -> Self {
        Self {
            table,
            identifier: self.identifier.clone(),
            writable: self.writable,
            dirty: false,
        }
    }
}

impl Source for Defaults {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn writable(&self) -> bool {
        self.writable
    }

    fn dirty(&self) -> bool {
        self.dirty
    }

    fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    fn keys(&self) -> Vec<String> {
        self.table.keys()
    }

    fn has(&self, key: &str) -> bool {
        self.table.contains(key)
    }

    fn typed(&self, key: &str) -> bool {
        self.table.contains(key)
    }

    fn get(&self, key: &str) -> ConfigResult<Value> {
        self.table.get(key).ok_or_else(|| ConfigError::not_found(key))
    }

    fn typevalue(&self, key: &str, raw: Value) -> ConfigResult<Value> {
        match self.table.get(key) {
            Some(template) => coerce(key, raw, &template),
            None => Ok(raw),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> ConfigResult<()> {
        self.table.insert(key, value);
        Ok(())
    }

    fn subsections(&self) -> Option<Vec<String>> {
        Some(self.table.section_names())
    }

    fn subsection(&self, name: &str) -> ConfigResult<Box<dyn Source>> {
        if !self.table.has_section(name) {
            return Err(ConfigError::no_subsection(&self.identifier, name));
        }
        Ok(Box::new(self.nested(self.table.child(name))))
    }

    fn placeholder(&self, name: &str) -> Box<dyn Source> {
        Box::new(self.nested(self.table.child(name)))
    }
}
