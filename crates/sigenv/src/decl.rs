//! Parsed declarations and where they came from

use crate::error::ParseError;
use crate::library::LibraryReference;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source text of one signature file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    /// Buffer name (the file path)
    pub name: String,

    /// Full UTF-8 content
    pub content: String,
}

impl Buffer {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Parses signature text into declarations
pub trait SignatureParser {
    /// Declaration type produced by the parser
    type Declaration;

    /// Parse a whole buffer, returning declarations in source order
    fn parse(&self, buffer: &Buffer) -> Result<Vec<Self::Declaration>, ParseError>;
}

/// Accumulator that receives loaded declarations
pub trait Environment<D> {
    fn insert(&mut self, declaration: D);
}

impl<D> Environment<D> for Vec<D> {
    fn insert(&mut self, declaration: D) {
        self.push(declaration);
    }
}

/// Which kind of root a directory was reached through
///
/// The tag decides whether underscore-prefixed directories are pruned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootTag {
    /// The baseline core library
    Core,

    /// A requested library resolved through a locator or repository
    Library(LibraryReference),

    /// An explicit directory added by the caller
    Directory(PathBuf),
}

impl RootTag {
    /// Whether hidden (`_`-prefixed) directories are skipped under this root
    pub fn skip_hidden(&self) -> bool {
        !matches!(self, RootTag::Directory(_))
    }
}

impl fmt::Display for RootTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootTag::Core => write!(f, "core"),
            RootTag::Library(library) => write!(f, "{}", library),
            RootTag::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// A resolved `(tag, directory)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRoot {
    pub tag: RootTag,
    pub dir: PathBuf,
}

impl SignatureRoot {
    pub fn new(tag: RootTag, dir: PathBuf) -> Self {
        Self { tag, dir }
    }
}

/// Origin of a declaration
#[derive(Debug, Clone)]
pub struct Provenance {
    /// Buffer the declaration was parsed from, shared by all its siblings
    pub buffer: Arc<Buffer>,

    /// Root the file was reached through
    pub tag: RootTag,

    /// File path
    pub path: PathBuf,
}

/// One entry of the list returned by [`EnvironmentLoader::load`](crate::EnvironmentLoader::load)
#[derive(Debug, Clone)]
pub struct LoadedDeclaration<D> {
    pub declaration: D,
    pub path: PathBuf,
    pub tag: RootTag,
}

impl<D> LoadedDeclaration<D> {
    pub fn path(&self) -> &Path {
        &self.path
    }
}
