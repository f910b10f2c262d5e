//! Local signature repository
//!
//! Directory structure of each root:
//! ```text
//! <root>/
//! ├── json/
//! │   ├── 2.5/
//! │   └── 2.6/
//! │       ├── json.sig
//! │       └── manifest.toml
//! └── set/
//!     └── 0/
//! ```
//!
//! Roots are searched in registration order; for a given version the first
//! root holding it wins.
//!
//! Clones share one root list, so a root registered through the loader's
//! [`Repository`] handle is also seen by the clone serving as a
//! [`ResolutionSource`].

use crate::manifest;
use crate::version::sort_versions;
use sigenv::{Dependency, Repository, ResolutionSource};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Repository of signature libraries laid out as `<root>/<name>/<version>/`
#[derive(Debug, Clone, Default)]
pub struct SignatureRepository {
    roots: Rc<RefCell<Vec<PathBuf>>>,
}

impl SignatureRepository {
    /// Create a repository over the given roots
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: Rc::new(RefCell::new(roots.into_iter().collect())),
        }
    }

    /// Registered roots in search order
    pub fn roots(&self) -> Vec<PathBuf> {
        self.roots.borrow().clone()
    }

    /// Register another root, visible to every clone
    pub fn add_root(&self, root: PathBuf) {
        self.roots.borrow_mut().push(root);
    }

    /// Every version of a library across all roots, latest last
    pub fn versions(&self, name: &str) -> Vec<String> {
        let found: Vec<String> = self
            .roots
            .borrow()
            .iter()
            .flat_map(|root| version_dirs(&root.join(name)))
            .collect();
        sort_versions(found)
    }

    /// Directory of a library version; `None` picks the latest
    pub fn lookup(&self, name: &str, version: Option<&str>) -> Option<PathBuf> {
        let version = match version {
            Some(version) => version.to_string(),
            None => self.versions(name).pop()?,
        };

        let roots = self.roots.borrow();
        roots
            .iter()
            .map(|root| root.join(name).join(&version))
            .find(|dir| dir.is_dir())
    }
}

/// Names of the subdirectories of `dir`, or nothing if it cannot be read
fn version_dirs(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect()
}

impl Repository for SignatureRepository {
    fn lookup(&self, name: &str, version: Option<&str>) -> Option<PathBuf> {
        SignatureRepository::lookup(self, name, version)
    }

    fn add_root(&mut self, root: PathBuf) {
        SignatureRepository::add_root(self, root);
    }
}

impl ResolutionSource for SignatureRepository {
    fn has(&self, name: &str, version: Option<&str>) -> bool {
        self.lookup(name, version).is_some()
    }

    fn versions(&self, name: &str) -> Vec<String> {
        SignatureRepository::versions(self, name)
    }

    fn dependencies_of(&self, name: &str, version: &str) -> Option<Vec<Dependency>> {
        let dir = self.lookup(name, Some(version))?;
        manifest::dependencies_in(&dir)
    }
}
