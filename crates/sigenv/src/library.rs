//! Library references and the requested library set
//!
//! A [`LibraryReference`] names a library and, optionally, a version. The
//! [`RequestedSet`] collects every reference and explicit directory handed to a
//! loader, preserving insertion order so that roots are always resolved in the
//! order they were requested.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// A library name with an optional version
///
/// Equality is keyed on the exact `(name, version)` pair: `a` and `a@1.0` are
/// two distinct references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryReference {
    /// Library name
    pub name: String,

    /// Requested version (`None` means "whatever is latest")
    pub version: Option<String>,
}

impl LibraryReference {
    /// Create a new library reference
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Create a reference with no version pin
    pub fn unversioned(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// Create a reference pinned to an exact version
    pub fn versioned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(name, Some(version.into()))
    }

    /// The requested version as a string slice
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl fmt::Display for LibraryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Insertion-ordered set of requested libraries plus explicit directories
///
/// The set only ever grows. Unversioned and versioned references to the same
/// name are kept as separate entries.
#[derive(Debug, Clone, Default)]
pub struct RequestedSet {
    libraries: Vec<LibraryReference>,
    index: HashSet<LibraryReference>,
    dirs: Vec<PathBuf>,
}

impl RequestedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a library reference
    ///
    /// Returns `true` if the exact pair was not present before.
    pub fn insert(&mut self, library: LibraryReference) -> bool {
        if self.index.contains(&library) {
            return false;
        }

        self.index.insert(library.clone());
        self.libraries.push(library);
        true
    }

    /// Append an explicit directory (duplicates are kept)
    pub fn push_dir(&mut self, dir: PathBuf) {
        self.dirs.push(dir);
    }

    /// Check whether the exact pair has been requested
    pub fn contains(&self, library: &LibraryReference) -> bool {
        self.index.contains(library)
    }

    /// Requested libraries in insertion order
    pub fn libraries(&self) -> &[LibraryReference] {
        &self.libraries
    }

    /// Explicit directories in insertion order
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Number of requested libraries
    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    /// Whether no library has been requested
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}
