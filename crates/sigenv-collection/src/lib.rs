//! Signature Collection Library
//!
//! Concrete local collaborators for the `sigenv` loader:
//! - Version parsing and ordering
//! - Library manifests (manifest.toml)
//! - Local signature repository (`<root>/<name>/<version>/`)
//! - Installed-package store (`<root>/<name>-<version>/sig/`)
//! - Collection lockfiles (sig.lock)
//! - Loader configuration (sigenv.toml)

pub mod config;
pub mod lockfile;
pub mod manifest;
pub mod packages;
pub mod repository;
pub mod version;

pub use config::{default_repository_dir, ConfigError, LibraryEntry, LoaderConfig, CONFIG_FILE};
pub use lockfile::{LockedLibrary, Lockfile, LockfileError, Source, LOCKFILE_NAME, LOCKFILE_VERSION};
pub use manifest::{LibraryManifest, ManifestDependency, ManifestError, MANIFEST_FILE};
pub use packages::{InstalledPackage, PackageStore, PACKAGE_SIG_DIR};
pub use repository::SignatureRepository;
pub use version::{sort_versions, Version, VersionError};
