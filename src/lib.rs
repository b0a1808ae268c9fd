//! Declarative, typed, file-backed configuration trees.
//!
//! Host components declare options (named, commented, optionally
//! range-constrained values) grouped into nested categories; a
//! [`RootConfig`] binds one such tree to a file name and a persisted
//! format, and a [`ConfigRegistry`] discovers, loads, and saves every
//! registered tree. Loading is tolerant by design: missing files are
//! created, missing keys keep their defaults, foreign value types are
//! ignored, and unparseable files are regenerated — the on-disk file always
//! reflects the in-memory tree after a load.
//!
//! ```no_run
//! use conftree::{CategoryBuilder, RootConfigBuilder};
//!
//! let mut b = RootConfigBuilder::new("settings.toml");
//! let mut sound = CategoryBuilder::new("sound", "Sound settings");
//! let volume = sound.range_option("volume", "Playback volume", 50i64, 0..=100);
//! b.nested(sound);
//! let root = b.build()?;
//!
//! // hand `root` to the registry through a ConfigProvider, then:
//! # let _ = root;
//! assert_eq!(volume.get(), 50);
//! volume.set(75)?;
//! # Ok::<(), conftree::ConfigError>(())
//! ```
//!
//! The persisted format is pluggable behind the
//! [`format::ConfigSerializer`]/[`format::ConfigDeserializer`] contract;
//! the crate ships a comment-preserving TOML implementation.

pub mod category;
pub mod error;
pub mod format;
pub mod option;
pub mod registry;
pub mod root;
pub mod value;

pub use category::{CategoryBuilder, ConfigCategory};
pub use error::ConfigError;
pub use format::{ConfigDeserializer, ConfigFormat, ConfigSerializer, TomlFormat};
pub use option::{ConfigOption, OptionHandle};
pub use registry::{ConfigProvider, ConfigRegistry};
pub use root::{RootConfig, RootConfigBuilder};
pub use value::{ConfigType, ConfigValue, ValueKind};

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Platform config directory for an application: the XDG config dir on
/// Linux, a dot-prefixed home directory elsewhere.
pub fn default_config_dir(app: &str) -> Result<PathBuf> {
    let dir = if cfg!(target_os = "linux") {
        dirs::config_dir()
            .context("failed to resolve XDG config directory")?
            .join(app)
    } else {
        dirs::home_dir()
            .context("failed to resolve home directory")?
            .join(format!(".{app}"))
    };
    Ok(dir)
}
