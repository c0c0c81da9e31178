//! Output formatting for the command line tool.

use crate::value::Value;
use anyhow::Result;
use clap::ValueEnum;
use serde_json::Value as JsonValue;

/// Output format for dumped configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// Render a JSON document (the result of a dump).
    pub fn render(&self, json: &JsonValue) -> Result<String> {
        Ok(match self {
            OutputFormat::Yaml => serde_yaml::to_string(json)?,
            OutputFormat::Json => serde_json::to_string_pretty(json)? + "\n",
        })
    }

    /// Render a single value. Strings are printed bare.
    pub fn render_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(format!("{}\n", s)),
            other => self.render(&other.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_json() {
        let out = OutputFormat::Json.render(&json!({"a": 1})).unwrap();
        assert_eq!(out, "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn test_render_yaml() {
        let out = OutputFormat::Yaml
            .render(&json!({"parameter": "changed", "sub": {"n": 2}}))
            .unwrap();
        assert_eq!(out, "parameter: changed\nsub:\n  n: 2\n");
    }

    #[test]
    fn test_render_value() {
        assert_eq!(
            OutputFormat::Json.render_value(&Value::from("plain")).unwrap(),
            "plain\n"
        );
        assert_eq!(
            OutputFormat::Json.render_value(&Value::Integer(3)).unwrap(),
            "3\n"
        );
    }
}
