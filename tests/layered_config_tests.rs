//! Integration tests for layered configuration over real files.
//!
//! Covers:
//! - priority between defaults, files, environment and command line
//! - typed recovery of untyped file, environment and command line values
//! - write-back of changed values to YAML and JSON files

use chrono::NaiveDate;
use layeredconfig::sources::{Commandline, Defaults, Environment, FileSource};
use layeredconfig::table::Table;
use layeredconfig::{ErrorCode, LayeredConfig, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Defaults, one file and command line arguments, lowest priority first.
fn parameter_config(path: &Path, args: &[&str]) -> LayeredConfig {
    let defaults = Table::new()
        .with("parameter", "foo")
        .with("other", "default");
    LayeredConfig::builder()
        .with_source(Defaults::new(defaults))
        .with_source(FileSource::open(path).expect("Failed to open config file"))
        .with_source(Commandline::new(args.iter().copied()))
        .build()
        .expect("Failed to build config")
}

fn module_defaults() -> Defaults {
    Defaults::new(
        Table::new()
            .with("home", "/tmp/myhome")
            .with("processes", 4)
            .with("expires", NaiveDate::from_ymd_opt(2014, 10, 15).unwrap())
            .with_section(
                "mymodule",
                Table::new().with("force", false).with("retries", 3),
            ),
    )
}

#[test]
fn test_command_line_overrides_file_and_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");
    fs::write(&path, "parameter: bar\n").unwrap();

    let config = parameter_config(&path, &["--parameter=baz"]);
    assert_eq!(config.get("parameter").unwrap(), Value::from("baz"));
    assert_eq!(config.get("other").unwrap(), Value::from("default"));
    assert_eq!(config.root().where_is("parameter"), Some("commandline"));
    assert_eq!(config.root().where_is("other"), Some("defaults"));
}

#[test]
fn test_set_and_write_updates_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");
    fs::write(&path, "parameter: bar\n").unwrap();

    let mut config = parameter_config(&path, &["--parameter=baz"]);
    config.set("parameter", "changed").unwrap();
    config.set("other", "also changed").unwrap();
    assert_eq!(config.get("parameter").unwrap(), Value::from("changed"));
    config.write().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "parameter: changed\nother: also changed\n");

    // A fresh config over the same file sees the written values
    let config = parameter_config(&path, &[]);
    assert_eq!(config.get("parameter").unwrap(), Value::from("changed"));
    assert_eq!(config.get("other").unwrap(), Value::from("also changed"));
}

#[test]
fn test_untouched_file_is_not_written() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");

    let mut config = parameter_config(&path, &[]);
    assert_eq!(config.get("parameter").unwrap(), Value::from("foo"));
    config.write().unwrap();
    assert!(!path.exists());
}

#[test]
fn test_write_creates_missing_file_and_directories() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("dir").join("config.yaml");

    let mut config = parameter_config(&path, &[]);
    config.set("parameter", "x").unwrap();
    config.write().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "parameter: x\n");
}

#[test]
fn test_yaml_strings_are_typed_by_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");
    fs::write(
        &path,
        "processes: \"8\"\nexpires: 2024-01-31\nmymodule:\n  force: \"yes\"\n",
    )
    .unwrap();

    let config = LayeredConfig::builder()
        .with_source(module_defaults())
        .with_source(FileSource::open(&path).unwrap())
        .build()
        .unwrap();

    assert_eq!(config.get("processes").unwrap(), Value::Integer(8));
    assert_eq!(
        config.get("expires").unwrap(),
        Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
    );
    let module = config.section("mymodule").unwrap();
    assert_eq!(module.get("force").unwrap(), Value::Bool(true));
    assert_eq!(module.get("retries").unwrap(), Value::Integer(3));
    assert_eq!(config.root().get_as::<u16>("processes").unwrap(), 8);
}

#[test]
fn test_datetime_with_milliseconds_survives_write() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");
    let epoch = NaiveDate::from_ymd_opt(2000, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let build = || {
        LayeredConfig::builder()
            .with_source(Defaults::new(Table::new().with("updated", epoch)))
            .with_source(FileSource::open(&path).unwrap())
            .build()
            .unwrap()
    };

    let updated = NaiveDate::from_ymd_opt(2014, 3, 5)
        .unwrap()
        .and_hms_milli_opt(12, 30, 0, 500)
        .unwrap();
    let mut config = build();
    config.set("updated", updated).unwrap();
    config.write().unwrap();

    let config = build();
    assert_eq!(config.get("updated").unwrap(), Value::DateTime(updated));
}

#[test]
fn test_bad_value_reports_coercion_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");
    fs::write(&path, "processes: many\n").unwrap();

    let config = LayeredConfig::builder()
        .with_source(module_defaults())
        .with_source(FileSource::open(&path).unwrap())
        .build()
        .unwrap();

    let err = config.get("processes").unwrap_err();
    assert_eq!(err.code, ErrorCode::Coerce);
    assert_eq!(err.key.as_deref(), Some("processes"));
}

#[test]
fn test_json_file_section_write() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");
    fs::write(&path, r#"{"mymodule": {"retries": "5"}}"#).unwrap();

    let mut config = LayeredConfig::builder()
        .with_source(module_defaults())
        .with_source(FileSource::open(&path).unwrap())
        .build()
        .unwrap();

    assert_eq!(
        config.section("mymodule").unwrap().get("retries").unwrap(),
        Value::Integer(5)
    );

    let mut module = config.section_mut("mymodule").unwrap();
    module.set("force", true).unwrap();
    module.write().unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        written,
        serde_json::json!({"mymodule": {"retries": "5", "force": true}})
    );
}

#[test]
fn test_environment_overrides_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");
    fs::write(&path, "home: /srv/file\nmymodule:\n  force: false\n").unwrap();

    let vars = vec![
        ("MYAPP_HOME".to_string(), "/srv/env".to_string()),
        ("MYAPP_MYMODULE__FORCE".to_string(), "on".to_string()),
        ("PATH".to_string(), "/usr/bin".to_string()),
    ];
    let config = LayeredConfig::builder()
        .with_source(module_defaults())
        .with_source(FileSource::open(&path).unwrap())
        .with_source(Environment::from_vars(vars, "MYAPP_", "__"))
        .build()
        .unwrap();

    assert_eq!(config.get("home").unwrap(), Value::from("/srv/env"));
    let module = config.section("mymodule").unwrap();
    assert_eq!(module.get("force").unwrap(), Value::Bool(true));
    assert_eq!(module.where_is("force"), Some("environment"));
    assert!(config.get("path").unwrap_err().is_not_found());
}

#[test]
fn test_cascade_reads_enclosing_section() {
    let build = |cascade| {
        LayeredConfig::builder()
            .with_source(module_defaults())
            .with_source(Commandline::new(["--processes=6"]))
            .cascade(cascade)
            .build()
            .unwrap()
    };

    let config = build(true);
    let module = config.section("mymodule").unwrap();
    assert_eq!(module.get("home").unwrap(), Value::from("/tmp/myhome"));
    assert_eq!(module.get("processes").unwrap(), Value::Integer(6));

    let config = build(false);
    let module = config.section("mymodule").unwrap();
    assert!(module.get("home").unwrap_err().is_not_found());
}

#[test]
fn test_dump_nests_sections() {
    let config = LayeredConfig::builder()
        .with_source(module_defaults())
        .with_source(Commandline::new(["--mymodule-retries=7"]))
        .build()
        .unwrap();

    assert_eq!(
        config.dump().unwrap(),
        serde_json::json!({
            "home": "/tmp/myhome",
            "processes": 4,
            "expires": "2014-10-15",
            "mymodule": {"force": false, "retries": 7},
        })
    );
}
