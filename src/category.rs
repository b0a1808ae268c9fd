//! Ordered category trees and the builder that assembles them

use std::collections::HashSet;
use std::ops::RangeInclusive;

use crate::error::ConfigError;
use crate::format::{ConfigDeserializer, ConfigSerializer};
use crate::option::{ConfigOption, OptionHandle};
use crate::value::ConfigType;

/// One child of a category: either an option handle or a nested category.
///
/// Object-safe so a category can hold a heterogeneous, ordered child list
/// while hosts keep their typed [`OptionHandle`]s.
pub(crate) trait ConfigEntry: Send + Sync {
    fn serialize(&self, serializer: &mut dyn ConfigSerializer);

    /// Returns whether the entry was found in the source at all.
    fn deserialize(&self, deserializer: &mut dyn ConfigDeserializer) -> bool;
}

/// A named, ordered collection of options and nested categories.
///
/// The key is empty only for the anonymous root of a [`RootConfig`]; an
/// anonymous category serializes its children without a surrounding scope.
///
/// [`RootConfig`]: crate::RootConfig
pub struct ConfigCategory {
    key: String,
    comment: String,
    entries: Vec<Box<dyn ConfigEntry>>,
}

impl ConfigCategory {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn serialize(&self, serializer: &mut dyn ConfigSerializer) {
        if self.key.is_empty() {
            for entry in &self.entries {
                entry.serialize(serializer);
            }
            return;
        }
        serializer.open_scope(&self.key, &self.comment);
        for entry in &self.entries {
            entry.serialize(serializer);
        }
        serializer.close_scope();
    }

    /// Deserialize this category's subtree from the current scope.
    ///
    /// An absent scope returns `false` without touching any child; a child
    /// absent inside a present scope simply keeps its default.
    pub(crate) fn deserialize(&self, deserializer: &mut dyn ConfigDeserializer) -> bool {
        if self.key.is_empty() {
            for entry in &self.entries {
                entry.deserialize(deserializer);
            }
            return true;
        }
        if !deserializer.open_scope(&self.key) {
            return false;
        }
        for entry in &self.entries {
            entry.deserialize(deserializer);
        }
        deserializer.close_scope();
        true
    }
}

impl ConfigEntry for ConfigCategory {
    fn serialize(&self, serializer: &mut dyn ConfigSerializer) {
        ConfigCategory::serialize(self, serializer);
    }

    fn deserialize(&self, deserializer: &mut dyn ConfigDeserializer) -> bool {
        ConfigCategory::deserialize(self, deserializer)
    }
}

/// Builder for a [`ConfigCategory`].
///
/// Declaration order is serialization order. Adding an option returns the
/// [`OptionHandle`] the host keeps; definition mistakes (duplicate keys,
/// unnamed nested categories, defaults outside their own range) are
/// collected and surfaced by [`build`](Self::build).
pub struct CategoryBuilder {
    key: String,
    comment: String,
    entries: Vec<Box<dyn ConfigEntry>>,
    seen_keys: HashSet<String>,
    errors: Vec<ConfigError>,
}

impl CategoryBuilder {
    pub fn new(key: &str, comment: &str) -> Self {
        Self {
            key: key.to_string(),
            comment: comment.to_string(),
            entries: Vec::new(),
            seen_keys: HashSet::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn anonymous() -> Self {
        Self::new("", "")
    }

    fn check_key(&mut self, key: &str) {
        if key.is_empty() {
            self.errors.push(ConfigError::EmptyKey {
                category: self.key.clone(),
            });
        } else if !self.seen_keys.insert(key.to_string()) {
            self.errors.push(ConfigError::DuplicateKey {
                key: key.to_string(),
                category: self.key.clone(),
            });
        }
    }

    /// Declare an unconstrained option with a default value.
    pub fn option<T: ConfigType>(&mut self, key: &str, comment: &str, default: T) -> OptionHandle<T> {
        self.check_key(key);
        let handle = OptionHandle::new(ConfigOption::new(key, comment, default, None));
        self.entries.push(Box::new(handle.clone()));
        handle
    }

    /// Declare an option constrained to an inclusive range.
    pub fn range_option<T: ConfigType>(
        &mut self,
        key: &str,
        comment: &str,
        default: T,
        range: RangeInclusive<T>,
    ) -> OptionHandle<T> {
        self.check_key(key);
        if !range.contains(&default) {
            self.errors.push(ConfigError::DefaultOutOfRange {
                key: key.to_string(),
            });
        }
        let handle = OptionHandle::new(ConfigOption::new(key, comment, default, Some(range)));
        self.entries.push(Box::new(handle.clone()));
        handle
    }

    /// Attach a nested category built elsewhere.
    pub fn nested(&mut self, child: CategoryBuilder) {
        self.check_key(&child.key);
        match child.build_nested() {
            Ok(category) => self.entries.push(Box::new(category)),
            Err(e) => self.errors.push(e),
        }
    }

    fn build_nested(mut self) -> Result<ConfigCategory, ConfigError> {
        if !self.errors.is_empty() {
            return Err(self.errors.remove(0));
        }
        Ok(ConfigCategory {
            key: self.key,
            comment: self.comment,
            entries: self.entries,
        })
    }

    /// Finish the category, surfacing the first definition error if any.
    pub fn build(self) -> Result<ConfigCategory, ConfigError> {
        self.build_nested()
    }
}
