//! Library manifest parsing (manifest.toml)
//!
//! A signature directory may carry a `manifest.toml` listing the libraries it
//! depends on:
//!
//! ```toml
//! [[dependencies]]
//! name = "pathname"
//! ```

use serde::{Deserialize, Serialize};
use sigenv::Dependency;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// File name of a library manifest inside a signature directory
pub const MANIFEST_FILE: &str = "manifest.toml";

/// Errors that can occur during manifest parsing
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("Failed to read manifest file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid manifest: {0}")]
    ValidationError(String),
}

/// Library manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LibraryManifest {
    /// Libraries this one depends on
    #[serde(default)]
    pub dependencies: Vec<ManifestDependency>,
}

/// One `[[dependencies]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestDependency {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl LibraryManifest {
    /// Parse a manifest from a file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a manifest from a string
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        let manifest: LibraryManifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<(), ManifestError> {
        for dep in &self.dependencies {
            if dep.name.trim().is_empty() {
                return Err(ManifestError::ValidationError(
                    "Dependency name cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Dependencies as reported to the loader
    pub fn to_dependencies(&self) -> Vec<Dependency> {
        self.dependencies
            .iter()
            .map(|dep| Dependency {
                name: dep.name.clone(),
                version: dep.version.clone(),
            })
            .collect()
    }
}

/// Read the dependency list of a signature directory
///
/// A missing manifest means the library reports no list. A broken manifest is
/// logged and treated the same way.
pub fn dependencies_in(dir: &Path) -> Option<Vec<Dependency>> {
    let path = dir.join(MANIFEST_FILE);
    if !path.is_file() {
        return None;
    }

    match LibraryManifest::from_file(&path) {
        Ok(manifest) => Some(manifest.to_dependencies()),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable library manifest");
            None
        }
    }
}
