//! The pluggable serialization contract
//!
//! The engine walks the option tree and drives these traits; a concrete
//! format never sees the tree itself. Any format that can bracket nested
//! scopes and read/write leaf entries can back a [`RootConfig`].
//!
//! [`RootConfig`]: crate::RootConfig

pub mod toml;

pub use self::toml::TomlFormat;

use crate::value::ConfigValue;

/// Write half of the contract.
///
/// One instance serializes exactly one tree walk: `write_option` and the
/// scope pair are called in declaration order, then [`complete`] exactly
/// once to obtain the full document.
///
/// [`complete`]: ConfigSerializer::complete
pub trait ConfigSerializer {
    /// Append one leaf entry with its documentation comment.
    fn write_option(&mut self, key: &str, value: &ConfigValue, comment: &str);

    /// Enter a nested scope (a named category).
    fn open_scope(&mut self, key: &str, comment: &str);

    /// Leave the innermost open scope.
    fn close_scope(&mut self);

    /// Finalize and return the serialized document.
    fn complete(&mut self) -> String;
}

/// Read half of the contract.
///
/// `receive_source` parses the raw persisted text first; the engine treats
/// `false` as "no usable prior state" and regenerates from defaults. All
/// other methods operate relative to the current scope.
pub trait ConfigDeserializer {
    /// Parse raw persisted text. `false` means the document is unusable.
    fn receive_source(&mut self, text: &str) -> bool;

    /// Read the value stored under `key` in the current scope, if any.
    fn read_option(&mut self, key: &str) -> Option<ConfigValue>;

    /// Enter a nested scope; `false` means the scope is absent in the
    /// source and the caller should skip that subtree.
    fn open_scope(&mut self, key: &str) -> bool;

    /// Leave the innermost open scope.
    fn close_scope(&mut self);
}

/// Factory for the strategy pair backing one [`RootConfig`].
///
/// Serializer and deserializer instances are stateful single-walk objects;
/// the engine requests a fresh pair per load cycle.
///
/// [`RootConfig`]: crate::RootConfig
pub trait ConfigFormat: Send + Sync {
    fn serializer(&self) -> Box<dyn ConfigSerializer>;

    fn deserializer(&self) -> Box<dyn ConfigDeserializer>;
}
