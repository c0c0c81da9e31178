//! CLI command definitions for layeredconfig
//!
//! This module defines the CLI structure using clap's derive macros and
//! runs the subcommands against a [`LayeredConfig`] built from the given
//! files, environment prefix and trailing `--key=value` overrides.

use crate::config::{LayeredConfig, Scope};
use crate::format::OutputFormat;
use crate::sources::{Commandline, Defaults, Environment, FileFormat, FileSource};
use crate::value::{Value, coerce};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// Inspect and edit layered configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Typed defaults file (YAML or JSON), lowest priority
    #[arg(long, global = true, value_name = "FILE")]
    pub defaults: Option<PathBuf>,

    /// Configuration file; repeat for more, later files take priority
    #[arg(short, long = "file", global = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Read environment variables starting with this prefix
    #[arg(long, global = true, value_name = "PREFIX")]
    pub env_prefix: Option<String>,

    /// Look up missing keys in enclosing sections
    #[arg(long, global = true)]
    pub cascade: bool,

    /// Output format for values and dumps
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml, global = true)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Command line overrides, highest priority
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// `--key=value` or `--section-key=value` arguments after `--`
    #[arg(last = true, value_name = "OVERRIDES")]
    pub args: Vec<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved value of a dotted KEY
    Get {
        key: String,
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Set a dotted KEY and write changed files
    Set {
        key: String,
        value: String,
        #[command(flatten)]
        overrides: Overrides,
    },

    /// List the keys of the root or of a dotted SECTION
    Keys {
        section: Option<String>,
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print all resolved values
    Dump {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the identifier of the source supplying a dotted KEY
    Where {
        key: String,
        #[command(flatten)]
        overrides: Overrides,
    },
}

impl Command {
    pub fn overrides(&self) -> &[String] {
        match self {
            Command::Get { overrides, .. }
            | Command::Set { overrides, .. }
            | Command::Keys { overrides, .. }
            | Command::Dump { overrides }
            | Command::Where { overrides, .. } => &overrides.args,
        }
    }
}

/// Build the configuration from the CLI arguments, lowest priority first.
pub fn build_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut builder = LayeredConfig::builder().cascade(cli.cascade);

    if let Some(path) = &cli.defaults {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read defaults {}", path.display()))?;
        let table = FileFormat::from_path(path)
            .parse(&content)
            .with_context(|| format!("Failed to parse defaults {}", path.display()))?;
        builder = builder.with_source(Defaults::new(table));
    }

    for path in &cli.files {
        let source = FileSource::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        builder = builder.with_source(source);
    }

    if let Some(prefix) = &cli.env_prefix {
        builder = builder.with_source(Environment::new(prefix));
    }

    let overrides = cli.command.overrides();
    if !overrides.is_empty() {
        builder = builder.with_source(Commandline::new(overrides.iter().cloned()));
    }

    debug!(files = cli.files.len(), "Building configuration from command line");
    Ok(builder.build()?)
}

/// Run the subcommand and return what should be printed.
pub fn execute(cli: &Cli) -> Result<String> {
    let mut config = build_config(cli)?;

    match &cli.command {
        Command::Get { key, .. } => {
            let (section, name) = split_key(key);
            let value = find_scope(&config, section)?.get(name)?;
            cli.format.render_value(&value)
        }
        Command::Set { key, value, .. } => {
            let (section, name) = split_key(key);
            let value = typed_input(find_scope(&config, section)?, name, value)?;
            let mut scope = match section {
                Some(path) => config
                    .section_mut(path)
                    .with_context(|| format!("No such section: {}", path))?,
                None => config.root_mut(),
            };
            scope.set(name, value)?;
            scope.write()?;
            Ok(String::new())
        }
        Command::Keys { section, .. } => {
            let scope = find_scope(&config, section.as_deref())?;
            Ok(scope.keys().iter().map(|k| format!("{}\n", k)).collect())
        }
        Command::Dump { .. } => cli.format.render(&config.dump()?),
        Command::Where { key, .. } => {
            let (section, name) = split_key(key);
            match find_scope(&config, section)?.where_is(name) {
                Some(identifier) => Ok(format!("{}\n", identifier)),
                None => bail!("Configuration key {} doesn't exist", key),
            }
        }
    }
}

/// Split `a.b.key` into section path `a.b` and key `key`.
fn split_key(key: &str) -> (Option<&str>, &str) {
    match key.rsplit_once('.') {
        Some((section, name)) => (Some(section), name),
        None => (None, key),
    }
}

fn find_scope<'a>(config: &'a LayeredConfig, section: Option<&str>) -> Result<Scope<'a>> {
    match section {
        Some(path) => config
            .section(path)
            .with_context(|| format!("No such section: {}", path)),
        None => Ok(config.root()),
    }
}

/// Give input text the type of the key's current value, if it has one.
fn typed_input(scope: Scope<'_>, name: &str, input: &str) -> Result<Value> {
    let raw = Value::from(input);
    match scope.get(name) {
        Ok(current) => Ok(coerce(name, raw, &current)?),
        Err(err) if err.is_not_found() => Ok(raw),
        Err(err) => Err(err.into()),
    }
}
