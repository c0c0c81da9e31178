//! Layered configuration library.
//!
//! Unified access to configuration values drawn from ranked sources
//! (in-code defaults, files, environment, command line), with typed value
//! recovery, nested sections and deferred write-back.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod source;
pub mod sources;
pub mod table;
pub mod value;

pub use config::{Entry, LayeredConfig, LayeredConfigBuilder, Scope, ScopeMut};
pub use error::{ConfigError, ConfigResult, ErrorCode};
pub use source::Source;
pub use value::{Value, ValueKind};
