//! Loader configuration (sigenv.toml)
//!
//! ```toml
//! core_root = "core"
//! repository = ["vendor/sigs"]
//! packages = ["/opt/packages"]
//! dirs = ["sig"]
//! collection = "sig.lock"
//!
//! [[libraries]]
//! name = "json"
//!
//! [[libraries]]
//! name = "set"
//! version = "0"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use crate::lockfile::{Lockfile, LockfileError};
use crate::packages::PackageStore;
use crate::repository::SignatureRepository;
use serde::{Deserialize, Serialize};
use sigenv::EnvironmentLoader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default configuration file name
pub const CONFIG_FILE: &str = "sigenv.toml";

/// Errors that can occur while reading a configuration or building a loader
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The configured collection could not be used
    #[error(transparent)]
    Lockfile(#[from] LockfileError),
}

/// Loader configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoaderConfig {
    /// Core library root, always loaded first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_root: Option<PathBuf>,

    /// Local repository roots in search order
    #[serde(default)]
    pub repository: Vec<PathBuf>,

    /// Installed-package roots in search order
    #[serde(default)]
    pub packages: Vec<PathBuf>,

    /// Explicit signature directories
    #[serde(default)]
    pub dirs: Vec<PathBuf>,

    /// Libraries requested up front, with their dependencies
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,

    /// Collection lockfile to load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<PathBuf>,
}

/// One `[[libraries]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl LoaderConfig {
    /// Parse a configuration from a file, resolving paths against its directory
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Parse a configuration from a string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: LoaderConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if matches!(&self.core_root, Some(root) if root.as_os_str().is_empty()) {
            return Err(ConfigError::ValidationError(
                "core_root cannot be empty".to_string(),
            ));
        }

        for lib in &self.libraries {
            if lib.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "Library name cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Resolve every relative path against `base`
    pub fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |path: PathBuf| base.join(path);

        self.core_root = self.core_root.map(resolve);
        self.repository = self.repository.into_iter().map(resolve).collect();
        self.packages = self.packages.into_iter().map(resolve).collect();
        self.dirs = self.dirs.into_iter().map(resolve).collect();
        self.collection = self.collection.map(resolve);
        self
    }

    /// Repository roots, falling back to [`default_repository_dir`]
    pub fn repository_roots(&self) -> Vec<PathBuf> {
        if !self.repository.is_empty() {
            return self.repository.clone();
        }
        default_repository_dir().into_iter().collect()
    }

    /// Build a loader with every configured request applied
    ///
    /// The package store is both locator and first resolution source; the
    /// repository is the second. Both roles share one repository, so the
    /// collection root registered below is also used to resolve dependencies.
    pub fn build(&self) -> Result<EnvironmentLoader, ConfigError> {
        let store = PackageStore::new(self.packages.iter().cloned());
        let repository = SignatureRepository::new(self.repository_roots());
        debug!(
            core_root = ?self.core_root,
            packages = ?store.roots(),
            repository = ?repository.roots(),
            "building environment loader"
        );

        let mut loader = EnvironmentLoader::new(self.core_root.clone())
            .with_locator(store.clone())
            .with_repository(repository.clone())
            .with_source(store)
            .with_source(repository);

        if let Some(path) = &self.collection {
            let lockfile = Lockfile::from_file(path)?;
            loader.add_collection(&lockfile)?;
        }

        for lib in &self.libraries {
            loader.add_library(lib.name.clone(), lib.version.clone(), true);
        }

        for dir in &self.dirs {
            loader.add_dir(dir.clone());
        }

        Ok(loader)
    }
}

/// Per-user repository at `~/.sigenv/repository`
pub fn default_repository_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".sigenv").join("repository"))
}
