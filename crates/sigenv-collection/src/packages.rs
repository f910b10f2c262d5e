//! Installed-package store
//!
//! Installed packages live in `<root>/<name>-<version>/`. A package ships
//! signatures when it carries a `sig/` subdirectory; packages without one are
//! treated as having no signatures at all.

use crate::manifest;
use crate::version::Version;
use sigenv::{Dependency, PackageLocator, ResolutionSource};
use std::fs;
use std::path::PathBuf;

/// Name of the signature directory inside an installed package
pub const PACKAGE_SIG_DIR: &str = "sig";

/// An installed package directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: Version,
    pub dir: PathBuf,
}

impl InstalledPackage {
    /// Signature directory, if the package ships one
    pub fn sig_dir(&self) -> Option<PathBuf> {
        let dir = self.dir.join(PACKAGE_SIG_DIR);
        dir.is_dir().then_some(dir)
    }
}

/// Store of installed packages spread over several roots
#[derive(Debug, Clone, Default)]
pub struct PackageStore {
    roots: Vec<PathBuf>,
}

impl PackageStore {
    /// Create a store over the given roots
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Installed versions of a package, oldest first
    ///
    /// When several roots hold the same version, the earliest root is kept.
    pub fn installed(&self, name: &str) -> Vec<InstalledPackage> {
        let mut found: Vec<InstalledPackage> = Vec::new();

        for root in &self.roots {
            let Ok(entries) = fs::read_dir(root) else {
                continue;
            };

            for entry in entries.flatten() {
                let dir = entry.path();
                if !dir.is_dir() {
                    continue;
                }

                let Some(version) = entry
                    .file_name()
                    .to_str()
                    .and_then(|dir_name| split_package_dir(dir_name, name))
                else {
                    continue;
                };

                if found.iter().any(|p| p.version.as_str() == version.as_str()) {
                    continue;
                }
                found.push(InstalledPackage {
                    name: name.to_string(),
                    version,
                    dir,
                });
            }
        }

        found.sort_by(|a, b| a.version.cmp(&b.version));
        found
    }

    /// The exact version, or the latest when `version` is `None`
    pub fn find(&self, name: &str, version: Option<&str>) -> Option<InstalledPackage> {
        let mut installed = self.installed(name);
        match version {
            Some(version) => installed.into_iter().find(|p| p.version.as_str() == version),
            None => installed.pop(),
        }
    }
}

/// Version part of `<name>-<version>`, when the directory belongs to `name`
fn split_package_dir(dir_name: &str, name: &str) -> Option<Version> {
    let version = dir_name.strip_prefix(name)?.strip_prefix('-')?;
    Version::parse(version).ok()
}

impl PackageLocator for PackageStore {
    fn locate(&self, name: &str, version: Option<&str>) -> Option<PathBuf> {
        self.find(name, version)?.sig_dir()
    }
}

impl ResolutionSource for PackageStore {
    fn has(&self, name: &str, version: Option<&str>) -> bool {
        self.locate(name, version).is_some()
    }

    fn versions(&self, name: &str) -> Vec<String> {
        self.installed(name)
            .into_iter()
            .filter(|p| p.sig_dir().is_some())
            .map(|p| p.version.to_string())
            .collect()
    }

    fn dependencies_of(&self, name: &str, version: &str) -> Option<Vec<Dependency>> {
        let dir = self.locate(name, Some(version))?;
        manifest::dependencies_in(&dir)
    }
}
