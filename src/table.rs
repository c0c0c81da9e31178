//! Nested, insertion-ordered key/value tables.
//!
//! Every built-in source keeps its data in a [`Table`]. A [`SharedTable`]
//! addresses one section inside a table that is shared by all sections of
//! the same document, so a value set through a nested section is seen by
//! the root when the document is saved.

use crate::error::{ConfigError, ConfigResult};
use crate::value::Value;
use serde_json::{Map, Value as JsonValue};
use std::cell::RefCell;
use std::rc::Rc;

/// Scalar entries plus named child tables, both in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    values: Vec<(String, Value)>,
    sections: Vec<(String, Table)>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Builder-style section insert.
    pub fn with_section(mut self, name: impl Into<String>, table: Table) -> Self {
        let name = name.into();
        match self.sections.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = table,
            None => self.sections.push((name, table)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace, keeping the original position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((key, value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(k, _)| k.as_str())
    }

    pub fn section(&self, name: &str) -> Option<&Table> {
        self.sections.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Get a child table, creating it if missing.
    pub fn section_entry(&mut self, name: &str) -> &mut Table {
        let index = match self.sections.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.sections.push((name.to_string(), Table::new()));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index].1
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.sections.is_empty()
    }

    /// Follow a section path.
    pub fn at_path(&self, path: &[String]) -> Option<&Table> {
        path.iter().try_fold(self, |table, name| table.section(name))
    }

    /// Follow a section path, creating sections as needed.
    pub fn at_path_mut(&mut self, path: &[String]) -> &mut Table {
        path.iter()
            .fold(self, |table, name| table.section_entry(name))
    }

    /// Build a table from a JSON object. Nested objects become sections.
    pub fn from_json(json: JsonValue) -> ConfigResult<Self> {
        match json {
            JsonValue::Object(map) => {
                let mut table = Table::new();
                for (key, value) in map {
                    match value {
                        JsonValue::Object(_) => {
                            let section = Table::from_json(value)?;
                            table.sections.push((key, section));
                        }
                        other => {
                            if let Some(value) = Value::from_json(other)? {
                                table.insert(key, value);
                            }
                        }
                    }
                }
                Ok(table)
            }
            // An empty document parses as null
            JsonValue::Null => Ok(Table::new()),
            other => Err(ConfigError::parse(format!(
                "expected a mapping at the top level, found {}",
                other
            ))),
        }
    }

    /// Convert to a JSON object, scalars first, then sections.
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        for (key, value) in &self.values {
            map.insert(key.clone(), value.to_json());
        }
        for (name, section) in &self.sections {
            map.insert(name.clone(), section.to_json());
        }
        JsonValue::Object(map)
    }
}

/// A handle to one section of a shared table.
///
/// The section does not need to exist; reads through a handle to a missing
/// section see an empty table and the first insert creates it.
#[derive(Debug, Clone)]
pub struct SharedTable {
    root: Rc<RefCell<Table>>,
    path: Vec<String>,
}

impl SharedTable {
    pub fn new(table: Table) -> Self {
        Self {
            root: Rc::new(RefCell::new(table)),
            path: Vec::new(),
        }
    }

    /// Handle to the named section below this one.
    pub fn child(&self, name: &str) -> Self {
        let mut path = self.path.clone();
        path.push(name.to_string());
        Self {
            root: Rc::clone(&self.root),
            path,
        }
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn keys(&self) -> Vec<String> {
        self.read(|t| t.keys().map(String::from).collect())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read(|t| t.get(key).cloned())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read(|t| t.contains(key))
    }

    pub fn section_names(&self) -> Vec<String> {
        self.read(|t| t.section_names().map(String::from).collect())
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.read(|t| t.section(name).is_some())
    }

    pub fn insert(&self, key: &str, value: Value) {
        let mut root = self.root.borrow_mut();
        root.at_path_mut(&self.path).insert(key, value);
    }

    /// Copy of the whole document this handle belongs to.
    pub fn document(&self) -> Table {
        self.root.borrow().clone()
    }

    /// Replace the whole document.
    pub fn replace_document(&self, table: Table) {
        *self.root.borrow_mut() = table;
    }

    fn read<R: Default>(&self, f: impl FnOnce(&Table) -> R) -> R {
        let root = self.root.borrow();
        root.at_path(&self.path).map(f).unwrap_or_default()
    }
}
