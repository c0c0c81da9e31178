//! The capability set every configuration source provides.

use crate::error::{ConfigError, ConfigResult};
use crate::value::Value;

/// A configuration backing such as in-code defaults, a file, environment
/// variables or command line arguments.
///
/// All operations apply to one level of nesting. Nested levels are
/// separate `Source` instances obtained through [`Source::subsection`] or
/// [`Source::placeholder`]; the layered config records which instance a
/// nested source came from and uses that link to propagate dirty flags.
pub trait Source {
    /// Stable name used to address this source, e.g. `"defaults"`.
    fn identifier(&self) -> &str;

    fn writable(&self) -> bool;

    fn dirty(&self) -> bool;

    /// Only the layered config changes this; `set` must leave it alone.
    fn set_dirty(&mut self, dirty: bool);

    /// Keys carrying a value at this level.
    fn keys(&self) -> Vec<String>;

    fn has(&self, key: &str) -> bool;

    /// Whether this source knows the type of `key`, independent of whether
    /// it carries a value for it.
    fn typed(&self, key: &str) -> bool;

    fn get(&self, key: &str) -> ConfigResult<Value>;

    /// Coerce a value found in another source to this source's type for
    /// `key`. Only called when `typed(key)` is true.
    fn typevalue(&self, _key: &str, raw: Value) -> ConfigResult<Value> {
        Ok(raw)
    }

    fn set(&mut self, key: &str, value: Value) -> ConfigResult<()>;

    /// Names of nested sections, or `None` if this kind of source has no
    /// notion of sections.
    fn subsections(&self) -> Option<Vec<String>> {
        None
    }

    /// The nested source for `name`. Must succeed for every name listed by
    /// [`Source::subsections`].
    fn subsection(&self, name: &str) -> ConfigResult<Box<dyn Source>> {
        Err(ConfigError::no_subsection(self.identifier(), name))
    }

    /// An empty nested source of the same kind, standing in for a section
    /// this source lacks. Inherits identifier and writable flag.
    fn placeholder(&self, name: &str) -> Box<dyn Source>;

    /// Persist the whole physical document, nested sections included.
    fn save(&mut self) -> ConfigResult<()> {
        Ok(())
    }
}
