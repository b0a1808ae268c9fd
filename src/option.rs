//! Typed configuration options and the handles hosts keep to them

use std::ops::RangeInclusive;
use std::sync::{Arc, RwLock};

use crate::category::ConfigEntry;
use crate::error::ConfigError;
use crate::format::{ConfigDeserializer, ConfigSerializer};
use crate::value::{ConfigType, ConfigValue};

/// A single named, typed, commented configuration value.
///
/// Invariant: `value` always satisfies `range` when one is declared. A set
/// that would break the range is rejected and leaves the value unchanged.
pub struct ConfigOption<T: ConfigType> {
    key: String,
    comment: String,
    value: T,
    range: Option<RangeInclusive<T>>,
}

impl<T: ConfigType> ConfigOption<T> {
    pub(crate) fn new(
        key: &str,
        comment: &str,
        default: T,
        range: Option<RangeInclusive<T>>,
    ) -> Self {
        Self {
            key: key.to_string(),
            comment: comment.to_string(),
            value: default,
            range,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> T {
        self.value.clone()
    }

    /// Commit a new value, rejecting it if it falls outside the range.
    /// Boundary values are accepted (the range is inclusive).
    pub fn set(&mut self, value: T) -> Result<(), ConfigError> {
        if let Some(range) = &self.range {
            if !range.contains(&value) {
                return Err(ConfigError::OutOfRange {
                    key: self.key.clone(),
                    value: value.to_string(),
                    min: range.start().to_string(),
                    max: range.end().to_string(),
                });
            }
        }
        self.value = value;
        Ok(())
    }

    /// Best-effort set from a loosely-typed value.
    ///
    /// A value whose kind does not narrow to `T` is ignored (`Ok(())`, no
    /// change) rather than treated as an error; one that narrows but falls
    /// outside the range errors exactly as [`set`](Self::set) does.
    pub fn set_untyped(&mut self, value: &ConfigValue) -> Result<(), ConfigError> {
        match T::from_value(value) {
            Some(v) => self.set(v),
            None => {
                log::debug!(
                    "ignoring {} value for option '{}' (declared {})",
                    value.kind(),
                    self.key,
                    T::kind()
                );
                Ok(())
            }
        }
    }

    pub(crate) fn serialize(&self, serializer: &mut dyn ConfigSerializer) {
        serializer.write_option(&self.key, &self.value.to_value(), &self.comment);
    }

    /// Pull this option's value from the current scope of the reader.
    ///
    /// Returns whether a value was found under the key at all; absence is
    /// not an error. A found value of a foreign kind, or one outside the
    /// range, is logged and the current value kept.
    pub(crate) fn deserialize(&mut self, deserializer: &mut dyn ConfigDeserializer) -> bool {
        let Some(raw) = deserializer.read_option(&self.key) else {
            return false;
        };
        match T::from_value(&raw) {
            Some(v) => {
                if let Err(e) = self.set(v) {
                    log::warn!("{e}; keeping previous value");
                }
            }
            None => {
                log::warn!(
                    "option '{}' expects a {} value, found {}; keeping previous value",
                    self.key,
                    T::kind(),
                    raw.kind()
                );
            }
        }
        true
    }
}

/// Shared handle to a [`ConfigOption`].
///
/// Hosts keep handles as plain struct fields and read/write option values
/// through them; the owning category holds a clone of the same handle and
/// drives serialization through it. Clones observe each other's writes.
pub struct OptionHandle<T: ConfigType> {
    inner: Arc<RwLock<ConfigOption<T>>>,
}

impl<T: ConfigType> Clone for OptionHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ConfigType> OptionHandle<T> {
    pub(crate) fn new(option: ConfigOption<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(option)),
        }
    }

    pub fn key(&self) -> String {
        self.inner.read().unwrap().key().to_string()
    }

    /// Current value (cloned out of the shared option).
    pub fn get(&self) -> T {
        self.inner.read().unwrap().get()
    }

    /// Set the value; out-of-range values are rejected unchanged.
    pub fn set(&self, value: T) -> Result<(), ConfigError> {
        self.inner.write().unwrap().set(value)
    }

    /// Best-effort set from a loosely-typed value; see
    /// [`ConfigOption::set_untyped`].
    pub fn set_untyped(&self, value: &ConfigValue) -> Result<(), ConfigError> {
        self.inner.write().unwrap().set_untyped(value)
    }
}

impl<T: ConfigType> ConfigEntry for OptionHandle<T> {
    fn serialize(&self, serializer: &mut dyn ConfigSerializer) {
        self.inner.read().unwrap().serialize(serializer);
    }

    fn deserialize(&self, deserializer: &mut dyn ConfigDeserializer) -> bool {
        self.inner.write().unwrap().deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ConfigValue;

    fn volume() -> ConfigOption<i64> {
        ConfigOption::new("volume", "Playback volume", 50, Some(0..=100))
    }

    #[test]
    fn test_set_within_range() {
        let mut opt = volume();
        opt.set(75).unwrap();
        assert_eq!(opt.get(), 75);
    }

    #[test]
    fn test_set_out_of_range_keeps_value() {
        let mut opt = volume();
        let err = opt.set(150).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
        assert_eq!(opt.get(), 50);

        opt.set(-1).unwrap_err();
        assert_eq!(opt.get(), 50);
    }

    #[test]
    fn test_range_boundaries_inclusive() {
        let mut opt = volume();
        opt.set(0).unwrap();
        assert_eq!(opt.get(), 0);
        opt.set(100).unwrap();
        assert_eq!(opt.get(), 100);
    }

    #[test]
    fn test_unconstrained_set() {
        let mut opt: ConfigOption<String> =
            ConfigOption::new("name", "Display name", "anon".to_string(), None);
        opt.set("someone".to_string()).unwrap();
        assert_eq!(opt.get(), "someone");
    }

    #[test]
    fn test_set_untyped_mismatch_is_noop() {
        let mut opt = volume();
        opt.set_untyped(&ConfigValue::String("loud".into())).unwrap();
        assert_eq!(opt.get(), 50);
    }

    #[test]
    fn test_set_untyped_narrows_and_validates() {
        let mut opt = volume();
        opt.set_untyped(&ConfigValue::Int(75)).unwrap();
        assert_eq!(opt.get(), 75);

        // narrows fine, but violates the range
        let err = opt.set_untyped(&ConfigValue::Int(150)).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
        assert_eq!(opt.get(), 75);
    }

    #[test]
    fn test_handle_clones_share_state() {
        let handle = OptionHandle::new(volume());
        let other = handle.clone();
        handle.set(25).unwrap();
        assert_eq!(other.get(), 25);
    }
}
