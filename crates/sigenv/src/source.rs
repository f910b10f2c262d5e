//! Collaborator traits for locating libraries
//!
//! The loader never inspects package stores itself. It asks:
//! - a [`PackageLocator`] for installed packages that ship signatures,
//! - a [`Repository`] for locally registered signature libraries,
//! - an ordered list of [`ResolutionSource`]s when expanding dependencies.

use std::path::PathBuf;

/// A dependency reported by a [`ResolutionSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Library name
    pub name: String,

    /// Version hint from the source (the loader requests dependencies unversioned)
    pub version: Option<String>,
}

impl Dependency {
    /// Create a dependency with no version hint
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }
}

/// A catalog that knows which libraries exist and what they depend on
///
/// Sources are queried in a fixed priority order. The first source that
/// reports a library is authoritative for it; answers are never merged.
pub trait ResolutionSource {
    /// Whether the source has the library (any version when `version` is `None`)
    fn has(&self, name: &str, version: Option<&str>) -> bool;

    /// Known versions of a library, latest last
    fn versions(&self, name: &str) -> Vec<String>;

    /// Dependencies of an exact library version, or `None` if the source has no list
    fn dependencies_of(&self, name: &str, version: &str) -> Option<Vec<Dependency>>;
}

/// Finds the signature directory of an installed package
///
/// A package that is not installed is a plain miss, not an error.
pub trait PackageLocator {
    fn locate(&self, name: &str, version: Option<&str>) -> Option<PathBuf>;
}

/// Local store of signature libraries
pub trait Repository {
    /// Signature directory for a library; `None` version picks the latest
    fn lookup(&self, name: &str, version: Option<&str>) -> Option<PathBuf>;

    /// Register another storage root
    fn add_root(&mut self, root: PathBuf);
}

/// A locked set of libraries, such as a lockfile
///
/// Consumed wholesale by [`EnvironmentLoader::add_collection`](crate::EnvironmentLoader::add_collection).
pub trait Collection {
    /// Error raised when the collection cannot be used
    type Error;

    /// Verify the collection is usable; nothing is registered when this fails
    fn check_availability(&self) -> Result<(), Self::Error>;

    /// Directory holding the collection's signatures
    fn storage_path(&self) -> PathBuf;

    /// Every locked library at its pinned version
    fn locked_libraries(&self) -> Vec<(String, String)>;
}

/// Locator that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPackages;

impl PackageLocator for NoPackages {
    fn locate(&self, _name: &str, _version: Option<&str>) -> Option<PathBuf> {
        None
    }
}

/// Repository that finds nothing but remembers registered roots
#[derive(Debug, Clone, Default)]
pub struct EmptyRepository {
    roots: Vec<PathBuf>,
}

impl Repository for EmptyRepository {
    fn lookup(&self, _name: &str, _version: Option<&str>) -> Option<PathBuf> {
        None
    }

    fn add_root(&mut self, root: PathBuf) {
        self.roots.push(root);
    }
}

impl EmptyRepository {
    /// Roots registered so far
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}
