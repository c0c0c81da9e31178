//! Command line overrides.
//!
//! Accepts `--key=value` options and bare `--flag` switches. A dash in the
//! option name separates sections, so `--mymodule-force=yes` sets `force`
//! in section `mymodule`. Values are untyped strings; switches are typed
//! booleans.

use super::insert_path;
use crate::error::{ConfigError, ConfigResult};
use crate::source::Source;
use crate::table::{SharedTable, Table};
use crate::value::Value;
use tracing::warn;

pub const COMMANDLINE_IDENTIFIER: &str = "commandline";

pub const DEFAULT_SECTION_SEPARATOR: &str = "-";

#[derive(Debug, Clone)]
pub struct Commandline {
    table: SharedTable,
    positional: Vec<String>,
    identifier: String,
    writable: bool,
    dirty: bool,
}

impl Commandline {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_separator(args, DEFAULT_SECTION_SEPARATOR)
    }

    pub fn with_separator<I, S>(args: I, separator: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Table::new();
        let mut positional = Vec::new();

        for arg in args {
            let arg: String = arg.into();
            let Some(option) = arg.strip_prefix("--") else {
                positional.push(arg);
                continue;
            };
            let (name, value) = match option.split_once('=') {
                Some((name, value)) => (name, Value::from(value)),
                None => (option, Value::Bool(true)),
            };
            let parts: Vec<&str> = name.split(separator).collect();
            if parts.iter().any(|p| p.is_empty()) {
                warn!(argument = %arg, "Ignoring malformed command line option");
                continue;
            }
            insert_path(&mut table, &parts, value);
        }

        Self {
            table: SharedTable::new(table),
            positional,
            identifier: COMMANDLINE_IDENTIFIER.to_string(),
            writable: false,
            dirty: false,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Arguments that were not `--` options.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    fn nested(&self, table: SharedTable) -> Self {
        Self {
            table,
            positional: Vec::new(),
            identifier: self.identifier.clone(),
            writable: self.writable,
            dirty: false,
        }
    }
}

impl Source for Commandline {
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

    // Switches are the only typed values
    fn typed(&self, key: &str) -> bool {
        matches!(self.table.get(key), Some(Value::Bool(_)))
    }

    fn get(&self, key: &str) -> ConfigResult<Value> {
        self.table.get(key).ok_or_else(|| ConfigError::not_found(key))
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
