//! Collection lockfile management (sig.lock)
//!
//! A lockfile pins every library of a signature collection, including the
//! transitive ones, and names the directory the collection was installed to:
//!
//! ```toml
//! version = 1
//! path = ".sig_collection"
//!
//! [[libraries]]
//! name = "ast"
//! version = "2.4"
//! source = { type = "git", remote = "https://example.com/sigs.git", revision = "b4d3f00" }
//! ```

use serde::{Deserialize, Serialize};
use sigenv::Collection;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during lockfile operations
#[derive(Debug, Error)]
pub enum LockfileError {
    /// Failed to read lockfile
    #[error("Failed to read lockfile: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse lockfile: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize lockfile
    #[error("Failed to serialize lockfile: {0}")]
    SerializeError(String),

    /// Validation error
    #[error("Invalid lockfile: {0}")]
    ValidationError(String),

    /// A locked library is not installed in the collection directory
    #[error("Library {name} ({version}) is not installed at {}; install the collection first", path.display())]
    Unavailable {
        name: String,
        version: String,
        path: PathBuf,
    },
}

/// Lockfile format version
pub const LOCKFILE_VERSION: u32 = 1;

/// Default lockfile name
pub const LOCKFILE_NAME: &str = "sig.lock";

/// Lockfile (sig.lock)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lockfile {
    /// Lockfile format version
    pub version: u32,

    /// Collection directory, relative to the lockfile
    pub path: PathBuf,

    /// Locked libraries
    #[serde(default)]
    pub libraries: Vec<LockedLibrary>,

    /// Directory holding the lockfile
    #[serde(skip)]
    base_dir: PathBuf,
}

/// A library pinned to an exact version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockedLibrary {
    pub name: String,

    pub version: String,

    pub source: Source,
}

/// Where a locked library comes from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    /// Git repository of signatures, installed into the collection directory
    Git {
        /// Repository URL
        remote: String,

        /// Commit hash
        revision: String,
    },

    /// Local directory, installed into the collection directory
    Local {
        /// Relative or absolute path
        path: String,
    },

    /// Shipped with the core repository
    Stdlib,

    /// Shipped inside an installed package
    Installed,
}

impl Source {
    /// Whether the library's files are expected in the collection directory
    pub fn is_installed_into_collection(&self) -> bool {
        matches!(self, Source::Git { .. } | Source::Local { .. })
    }
}

impl Lockfile {
    /// Create a new empty lockfile
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            version: LOCKFILE_VERSION,
            path: path.into(),
            libraries: Vec::new(),
            base_dir: PathBuf::new(),
        }
    }

    /// Parse a lockfile from a file
    pub fn from_file(path: &Path) -> Result<Self, LockfileError> {
        let content = std::fs::read_to_string(path)?;
        let mut lockfile = Self::from_str(&content)?;
        lockfile.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(lockfile)
    }

    /// Parse a lockfile from a string
    ///
    /// The collection path stays relative to the current directory.
    pub fn from_str(content: &str) -> Result<Self, LockfileError> {
        let lockfile: Lockfile = toml::from_str(content)?;
        lockfile.validate()?;
        Ok(lockfile)
    }

    /// Validate the lockfile
    pub fn validate(&self) -> Result<(), LockfileError> {
        if self.version != LOCKFILE_VERSION {
            return Err(LockfileError::ValidationError(format!(
                "Unsupported lockfile version: {} (expected {})",
                self.version, LOCKFILE_VERSION
            )));
        }

        for (i, lib) in self.libraries.iter().enumerate() {
            if lib.name.is_empty() {
                return Err(LockfileError::ValidationError(
                    "Library name cannot be empty".to_string(),
                ));
            }

            if lib.version.is_empty() {
                return Err(LockfileError::ValidationError(format!(
                    "Library '{}' has empty version",
                    lib.name
                )));
            }

            if self.libraries[..i].iter().any(|other| other.name == lib.name) {
                return Err(LockfileError::ValidationError(format!(
                    "Library '{}' is locked more than once",
                    lib.name
                )));
            }
        }

        Ok(())
    }

    /// Write lockfile to a file
    pub fn to_file(&self, path: &Path) -> Result<(), LockfileError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LockfileError::SerializeError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Collection directory resolved against the lockfile location
    pub fn fullpath(&self) -> PathBuf {
        self.base_dir.join(&self.path)
    }

    /// Add a locked library, replacing one with the same name
    pub fn add_library(&mut self, library: LockedLibrary) {
        match self.libraries.iter_mut().find(|l| l.name == library.name) {
            Some(existing) => *existing = library,
            None => self.libraries.push(library),
        }
    }

    /// Get a locked library by name
    pub fn get_library(&self, name: &str) -> Option<&LockedLibrary> {
        self.libraries.iter().find(|l| l.name == name)
    }

    /// Check every collection-installed library is present on disk
    pub fn check_availability(&self) -> Result<(), LockfileError> {
        let root = self.fullpath();

        for lib in &self.libraries {
            if !lib.source.is_installed_into_collection() {
                continue;
            }

            let dir = root.join(&lib.name).join(&lib.version);
            if !dir.is_dir() {
                return Err(LockfileError::Unavailable {
                    name: lib.name.clone(),
                    version: lib.version.clone(),
                    path: dir,
                });
            }
        }

        Ok(())
    }
}

impl LockedLibrary {
    pub fn new(name: impl Into<String>, version: impl Into<String>, source: Source) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source,
        }
    }
}

impl Collection for Lockfile {
    type Error = LockfileError;

    fn check_availability(&self) -> Result<(), LockfileError> {
        Lockfile::check_availability(self)
    }

    fn storage_path(&self) -> PathBuf {
        self.fullpath()
    }

    fn locked_libraries(&self) -> Vec<(String, String)> {
        self.libraries
            .iter()
            .map(|lib| (lib.name.clone(), lib.version.clone()))
            .collect()
    }
}
