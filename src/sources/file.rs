//! File-backed configuration in YAML or JSON.
//!
//! Nested mappings become subsections. Strings in the file are untyped;
//! numbers, booleans and lists are typed by the file format itself.

use crate::error::{ConfigError, ConfigResult};
use crate::source::Source;
use crate::table::{SharedTable, Table};
use crate::value::{Value, coerce};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk format of a [`FileSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Pick the format from the file extension. Anything but `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
            _ => FileFormat::Yaml,
        }
    }

    pub fn identifier(&self) -> &'static str {
        match self {
            FileFormat::Yaml => "yamlfile",
            FileFormat::Json => "jsonfile",
        }
    }

    pub fn parse(&self, content: &str) -> ConfigResult<Table> {
        if content.trim().is_empty() {
            return Ok(Table::new());
        }
        let json: JsonValue = match self {
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        };
        Table::from_json(json)
    }

    pub fn render(&self, table: &Table) -> ConfigResult<String> {
        let json = table.to_json();
        match self {
            FileFormat::Yaml => Ok(serde_yaml::to_string(&json)?),
            FileFormat::Json => Ok(serde_json::to_string_pretty(&json)? + "\n"),
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Yaml => write!(f, "yaml"),
            FileFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: FileFormat,
    table: SharedTable,
    identifier: String,
    writable: bool,
    dirty: bool,
}

impl FileSource {
    /// Open a configuration file. A missing file starts out empty and is
    /// created by the first save.
    pub fn open(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        let format = FileFormat::from_path(&path);
        Self::open_with_format(path, format)
    }

    pub fn open_with_format(path: impl Into<PathBuf>, format: FileFormat) -> ConfigResult<Self> {
        let path = path.into();
        let table = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let table = format
                .parse(&content)
                .map_err(|e| ConfigError::parse(format!("{}: {}", path.display(), e)))?;
            debug!(path = %path.display(), %format, "Loaded configuration file");
            table
        } else {
            debug!(path = %path.display(), "Configuration file does not exist yet");
            Table::new()
        };

        Ok(Self {
            path,
            format,
            table: SharedTable::new(table),
            identifier: format.identifier().to_string(),
            writable: true,
            dirty: false,
        })
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    fn nested(&self, table: SharedTable) -> Self {
        Self {
            path: self.path.clone(),
            format: self.format,
            table,
            identifier: self.identifier.clone(),
            writable: self.writable,
            dirty: false,
        }
    }
}

impl Source for FileSource {
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
        matches!(self.table.get(key), Some(value) if value.as_str().is_none())
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

    fn save(&mut self) -> ConfigResult<()> {
        let content = self.format.render(&self.table.document())?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)?;
        info!(path = %self.path.display(), "Saved configuration file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.json")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("a.JSON")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("a.yaml")), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path(Path::new("a.conf")), FileFormat::Yaml);
    }

    #[test]
    fn test_missing_file_is_empty_and_writable() {
        let temp = TempDir::new().unwrap();
        let source = FileSource::open(temp.path().join("nope.yaml")).unwrap();
        assert!(source.keys().is_empty());
        assert!(source.writable());
        assert_eq!(source.identifier(), "yamlfile");
    }

    #[test]
    fn test_strings_are_untyped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "name: foo\nport: 8080\nmymodule:\n  force: true\n").unwrap();

        let source = FileSource::open(&path).unwrap();
        assert!(source.has("name"));
        assert!(!source.typed("name"));
        assert!(source.typed("port"));
        assert_eq!(source.get("port").unwrap(), Value::Integer(8080));
        assert_eq!(source.subsections(), Some(vec!["mymodule".to_string()]));

        let sub = source.subsection("mymodule").unwrap();
        assert!(sub.typed("force"));
    }

    #[test]
    fn test_save_includes_placeholder_sections() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.json");

        let mut source = FileSource::open(&path).unwrap();
        source.set("a", Value::from(1)).unwrap();
        let mut section = source.placeholder("extra");
        section.set("b", Value::from("two")).unwrap();
        source.save().unwrap();

        let written: JsonValue =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({"a": 1, "extra": {"b": "two"}}));
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FileSource::open(&path).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::Parse);
        assert!(err.message.contains("bad.json"));
    }
}
