//! Process-wide registry and the load/save cycle

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::{fs, io};

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use crate::root::RootConfig;

/// Discovery seam implemented by host components that own configuration.
///
/// The registry calls this once during [`ConfigRegistry::init`]; `configs`
/// is therefore allowed to move pre-built roots out of the provider. A
/// definition that fails to build reports its error in place and only that
/// entry is skipped.
pub trait ConfigProvider {
    /// Identity of the owning component; becomes the directory name under
    /// the config dir and the first half of each `owner:file` identity.
    fn owner_id(&self) -> &str;

    /// The root configurations this component declares.
    fn configs(&mut self) -> Vec<Result<RootConfig>>;
}

struct Registered {
    owner: String,
    root: Arc<RootConfig>,
}

/// Table of every registered [`RootConfig`], keyed by `owner:file`.
///
/// Explicitly constructed and owned by the host; initialization is
/// idempotent and entries are never unregistered. All load/save failures
/// are contained per entry: one corrupt or unwritable config never blocks
/// the others.
pub struct ConfigRegistry {
    config_dir: PathBuf,
    configs: RwLock<HashMap<String, Registered>>,
    initialized: AtomicBool,
}

impl ConfigRegistry {
    /// A registry persisting under `config_dir` (see
    /// [`default_config_dir`](crate::default_config_dir) for the usual
    /// platform location).
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            configs: RwLock::new(HashMap::new()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Discover, register, and load every provided configuration.
    ///
    /// Runs at most once per registry; repeated calls are no-ops.
    pub fn init(&self, providers: &mut [&mut dyn ConfigProvider]) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("config registry already initialized");
            return;
        }

        for provider in providers {
            let owner = provider.owner_id().to_string();
            for config in provider.configs() {
                let root = match config {
                    Ok(root) => root,
                    Err(e) => {
                        error!("skipping config definition from '{owner}': {e:#}");
                        continue;
                    }
                };
                self.register(&owner, root);
            }
        }
    }

    fn register(&self, owner: &str, root: RootConfig) {
        let id = format!("{owner}:{}", root.file());
        let root = Arc::new(root);
        {
            let mut configs = self.configs.write().unwrap();
            if configs.contains_key(&id) {
                warn!("config '{id}' is already registered; skipping duplicate");
                return;
            }
            configs.insert(
                id.clone(),
                Registered {
                    owner: owner.to_string(),
                    root: Arc::clone(&root),
                },
            );
        }
        debug!("registered config '{id}'");
        if let Err(e) = self.load(owner, &root) {
            error!("failed to load config '{id}': {e:#}");
        }
    }

    /// Re-run the load cycle for one registered config.
    ///
    /// `id` has the form `owner:file`. An unregistered identity is a no-op.
    /// Values already committed before a mid-walk failure stay committed.
    pub fn force_reload(&self, id: &str) {
        let entry = {
            let configs = self.configs.read().unwrap();
            configs
                .get(id)
                .map(|r| (r.owner.clone(), Arc::clone(&r.root)))
        };
        match entry {
            Some((owner, root)) => {
                if let Err(e) = self.load(&owner, &root) {
                    error!("failed to reload config '{id}': {e:#}");
                }
            }
            None => debug!("force reload of unregistered config '{id}' ignored"),
        }
    }

    /// Whether `owner:file` is registered.
    pub fn is_registered(&self, id: &str) -> bool {
        self.configs.read().unwrap().contains_key(id)
    }

    /// Number of registered configs.
    pub fn count(&self) -> usize {
        self.configs.read().unwrap().len()
    }

    /// Backing file path for a registered owner/file pair.
    pub fn backing_path(&self, owner: &str, file: &str) -> PathBuf {
        self.config_dir.join(owner).join(file)
    }

    /// One load cycle: read whatever usable state the backing file holds
    /// into the tree, then write the authoritative tree state back out.
    /// Options added since the file was written are merged in; options
    /// missing from the file keep their defaults.
    fn load(&self, owner: &str, root: &RootConfig) -> Result<()> {
        let path = self.backing_path(owner, root.file());

        match fs::read_to_string(&path) {
            Ok(text) => {
                let mut deserializer = root.deserializer();
                if deserializer.receive_source(&text) {
                    root.deserialize(&mut *deserializer);
                } else {
                    warn!(
                        "config file {} could not be parsed; regenerating from defaults",
                        path.display()
                    );
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    "config file {owner}:{} was not found; a new one will be created",
                    root.file()
                );
                if let Some(parent) = path.parent() {
                    create_config_dir(parent)?;
                }
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read config file {}", path.display()));
            }
        }

        fs::write(&path, root.render())
            .with_context(|| format!("failed to write config file {}", path.display()))?;
        debug!("saved config {owner}:{}", root.file());
        Ok(())
    }
}

fn create_config_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::root::RootConfigBuilder;

    struct StaticProvider {
        owner: &'static str,
        pending: Vec<Result<RootConfig>>,
    }

    impl ConfigProvider for StaticProvider {
        fn owner_id(&self) -> &str {
            self.owner
        }

        fn configs(&mut self) -> Vec<Result<RootConfig>> {
            std::mem::take(&mut self.pending)
        }
    }

    fn simple_root(file: &str) -> RootConfig {
        let mut b = RootConfigBuilder::new(file);
        b.option("enabled", "Feature toggle", true);
        b.build().unwrap()
    }

    #[test]
    fn test_init_registers_and_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ConfigRegistry::new(dir.path());

        let mut provider = StaticProvider {
            owner: "myapp",
            pending: vec![Ok(simple_root("settings.toml"))],
        };
        registry.init(&mut [&mut provider]);

        assert!(registry.is_registered("myapp:settings.toml"));
        assert!(registry.backing_path("myapp", "settings.toml").exists());
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ConfigRegistry::new(dir.path());

        let mut first = StaticProvider {
            owner: "myapp",
            pending: vec![Ok(simple_root("settings.toml"))],
        };
        registry.init(&mut [&mut first]);
        assert_eq!(registry.count(), 1);

        let mut second = StaticProvider {
            owner: "other",
            pending: vec![Ok(simple_root("other.toml"))],
        };
        registry.init(&mut [&mut second]);
        assert_eq!(registry.count(), 1);
        assert!(!registry.is_registered("other:other.toml"));
    }

    #[test]
    fn test_failed_definition_skipped_others_load() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ConfigRegistry::new(dir.path());

        let mut provider = StaticProvider {
            owner: "myapp",
            pending: vec![
                Err(anyhow::anyhow!("unresolvable definition")),
                Ok(simple_root("settings.toml")),
            ],
        };
        registry.init(&mut [&mut provider]);

        assert_eq!(registry.count(), 1);
        assert!(registry.is_registered("myapp:settings.toml"));
    }

    #[test]
    fn test_duplicate_identity_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ConfigRegistry::new(dir.path());

        let mut provider = StaticProvider {
            owner: "myapp",
            pending: vec![
                Ok(simple_root("settings.toml")),
                Ok(simple_root("settings.toml")),
            ],
        };
        registry.init(&mut [&mut provider]);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_force_reload_unregistered_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ConfigRegistry::new(dir.path());
        registry.force_reload("ghost:missing.toml");
        assert_eq!(registry.count(), 0);
    }
}
