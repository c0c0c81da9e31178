//! Environment variables with a common prefix.
//!
//! `MYAPP_HOME=/srv` becomes key `home`; with the default `__` separator
//! `MYAPP_MYMODULE__FORCE=yes` becomes key `force` in section `mymodule`.
//! All values are untyped strings.

use super::insert_path;
use crate::error::{ConfigError, ConfigResult};
use crate::source::Source;
use crate::table::{SharedTable, Table};
use crate::value::Value;
use tracing::{debug, warn};

pub const ENVIRONMENT_IDENTIFIER: &str = "environment";

/// Default separator between section names in a variable name.
pub const DEFAULT_SECTION_SEPARATOR: &str = "__";

#[derive(Debug, Clone)]
pub struct Environment {
    table: SharedTable,
    identifier: String,
    writable: bool,
    dirty: bool,
}

impl Environment {
    /// Read variables starting with `prefix` from the process environment.
    pub fn new(prefix: &str) -> Self {
        Self::from_vars(std::env::vars(), prefix, DEFAULT_SECTION_SEPARATOR)
    }

    /// Build from an explicit list of variables.
    pub fn from_vars(
        vars: impl IntoIterator<Item = (String, String)>,
        prefix: &str,
        separator: &str,
    ) -> Self {
        let mut table = Table::new();
        for (name, value) in vars {
            let Some(rest) = name.strip_prefix(prefix) else {
                continue;
            };
            let rest = rest.to_lowercase();
            let parts: Vec<&str> = rest.split(separator).collect();
            if parts.iter().any(|p| p.is_empty()) {
                warn!(variable = %name, "Skipping environment variable with empty key part");
                continue;
            }
            debug!(variable = %name, "Using environment variable");
            insert_path(&mut table, &parts, Value::String(value));
        }

        Self {
            table: SharedTable::new(table),
            identifier: ENVIRONMENT_IDENTIFIER.to_string(),
            writable: false,
            dirty: false,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
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

impl Source for Environment {
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

    fn typed(&self, _key: &str) -> bool {
        false
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

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_prefix_filter_and_sections() {
        let env = Environment::from_vars(
            vars(&[
                ("MYAPP_HOME", "/srv"),
                ("MYAPP_MYMODULE__FORCE", "yes"),
                ("PATH", "/usr/bin"),
            ]),
            "MYAPP_",
            DEFAULT_SECTION_SEPARATOR,
        );

        assert_eq!(env.keys(), vec!["home".to_string()]);
        assert!(!env.typed("home"));
        assert_eq!(env.subsections(), Some(vec!["mymodule".to_string()]));
        let sub = env.subsection("mymodule").unwrap();
        assert_eq!(sub.get("force").unwrap(), Value::from("yes"));
    }

    #[test]
    fn test_single_underscore_separator() {
        let env = Environment::from_vars(
            vars(&[("APP_DB_HOST", "localhost")]),
            "APP_",
            "_",
        );
        assert!(env.keys().is_empty());
        let db = env.subsection("db").unwrap();
        assert_eq!(db.get("host").unwrap(), Value::from("localhost"));
    }

    #[test]
    fn test_empty_parts_are_skipped() {
        let env = Environment::from_vars(vars(&[("APP_", "x"), ("APP_A____B", "y")]), "APP_", "__");
        assert!(env.keys().is_empty());
        assert_eq!(env.subsections(), Some(Vec::new()));
    }

    #[test]
    fn test_is_read_only() {
        let env = Environment::from_vars(Vec::new(), "APP_", "__");
        assert!(!env.writable());
        assert_eq!(env.identifier(), ENVIRONMENT_IDENTIFIER);
    }
}
