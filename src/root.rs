//! Root configurations: a category tree bound to a file and a format

use std::ops::RangeInclusive;

use crate::category::{CategoryBuilder, ConfigCategory};
use crate::error::ConfigError;
use crate::format::{ConfigDeserializer, ConfigFormat, TomlFormat};
use crate::option::OptionHandle;
use crate::value::ConfigType;

/// A category tree that is the unit of discovery, load, and save.
///
/// Exactly one `RootConfig` backs one file at
/// `<config_dir>/<owner_id>/<file>`. The tree itself is anonymous: its
/// direct children serialize at the document's top level.
pub struct RootConfig {
    file: String,
    format: Box<dyn ConfigFormat>,
    category: ConfigCategory,
}

impl RootConfig {
    /// Relative file name under the owning component's config directory.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Serialize the current in-memory tree through the configured format.
    ///
    /// This is what the load cycle writes back to disk after every load.
    pub fn render(&self) -> String {
        let mut serializer = self.format.serializer();
        self.category.serialize(&mut *serializer);
        serializer.complete()
    }

    pub(crate) fn deserializer(&self) -> Box<dyn ConfigDeserializer> {
        self.format.deserializer()
    }

    pub(crate) fn deserialize(&self, deserializer: &mut dyn ConfigDeserializer) {
        self.category.deserialize(deserializer);
    }
}

/// Builder for a [`RootConfig`]; the format defaults to [`TomlFormat`].
pub struct RootConfigBuilder {
    file: String,
    format: Box<dyn ConfigFormat>,
    tree: CategoryBuilder,
}

impl RootConfigBuilder {
    pub fn new(file: &str) -> Self {
        Self {
            file: file.to_string(),
            format: Box::new(TomlFormat),
            tree: CategoryBuilder::anonymous(),
        }
    }

    /// Swap in a different persisted format.
    pub fn format(mut self, format: impl ConfigFormat + 'static) -> Self {
        self.format = Box::new(format);
        self
    }

    /// Declare a top-level option; see [`CategoryBuilder::option`].
    pub fn option<T: ConfigType>(&mut self, key: &str, comment: &str, default: T) -> OptionHandle<T> {
        self.tree.option(key, comment, default)
    }

    /// Declare a top-level range-constrained option; see
    /// [`CategoryBuilder::range_option`].
    pub fn range_option<T: ConfigType>(
        &mut self,
        key: &str,
        comment: &str,
        default: T,
        range: RangeInclusive<T>,
    ) -> OptionHandle<T> {
        self.tree.range_option(key, comment, default, range)
    }

    /// Attach a nested category at the top level.
    pub fn nested(&mut self, child: CategoryBuilder) {
        self.tree.nested(child);
    }

    pub fn build(self) -> Result<RootConfig, ConfigError> {
        Ok(RootConfig {
            file: self.file,
            format: self.format,
            category: self.tree.build()?,
        })
    }
}
