//! Built-in configuration sources.
//!
//! - [`Defaults`] - typed values embedded in code
//! - [`FileSource`] - YAML or JSON file, writable by default
//! - [`Environment`] - prefixed environment variables
//! - [`Commandline`] - `--key=value` arguments

mod commandline;
mod defaults;
mod environment;
mod file;

pub use commandline::{COMMANDLINE_IDENTIFIER, Commandline};
pub use defaults::{DEFAULTS_IDENTIFIER, Defaults};
pub use environment::{ENVIRONMENT_IDENTIFIER, Environment};
pub use file::{FileFormat, FileSource};

use crate::table::Table;
use crate::value::Value;

/// Insert `value` under `parts`, where all but the last part name sections.
fn insert_path(table: &mut Table, parts: &[&str], value: Value) {
    if let Some((key, sections)) = parts.split_last() {
        let mut target = table;
        for name in sections {
            target = target.section_entry(name);
        }
        target.insert(*key, value);
    }
}
