//! Environment loader
//!
//! Turns a set of requested libraries and directories into an ordered stream
//! of parsed declarations.
//!
//! # Root order
//!
//! 1. The core root, when configured.
//! 2. Every requested library, in insertion order. A library that neither the
//!    package locator nor the repository knows aborts the pass right there.
//! 3. Every explicit directory, in insertion order.
//!
//! Roots are produced lazily, so nothing after an unknown library is read.
//!
//! # Deduplication
//!
//! Each pass keeps its own set of visited files. A file reached again through a
//! later root (overlapping directories, symlinks) is parsed only once.

use crate::decl::{
    Buffer, Environment, LoadedDeclaration, Provenance, RootTag, SignatureParser, SignatureRoot,
};
use crate::error::{LoadError, LoadResult};
use crate::library::{LibraryReference, RequestedSet};
use crate::source::{
    Collection, Dependency, EmptyRepository, NoPackages, PackageLocator, Repository,
    ResolutionSource,
};
use crate::walker::FileWalker;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::slice;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Reserved library name for the core library, which is always loaded implicitly
pub const CORE_LIBRARY_ALIAS: &str = "core";

/// Loads signature files for a set of libraries into an environment
pub struct EnvironmentLoader {
    /// Baseline root, always resolved first
    core_root: Option<PathBuf>,

    /// Installed packages shipping signatures
    locator: Box<dyn PackageLocator>,

    /// Local signature repository
    repository: Box<dyn Repository>,

    /// Dependency catalogs in priority order
    sources: Vec<Box<dyn ResolutionSource>>,

    /// Everything requested so far
    requested: RequestedSet,

    /// Set once the core alias warning has been emitted
    warned_core_alias: bool,
}

impl EnvironmentLoader {
    /// Create a loader with the given core root and no collaborators
    pub fn new(core_root: Option<PathBuf>) -> Self {
        Self {
            core_root,
            locator: Box::new(NoPackages),
            repository: Box::new(EmptyRepository::default()),
            sources: Vec::new(),
            requested: RequestedSet::new(),
            warned_core_alias: false,
        }
    }

    /// Set the installed-package locator
    pub fn with_locator(mut self, locator: impl PackageLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Set the local repository
    pub fn with_repository(mut self, repository: impl Repository + 'static) -> Self {
        self.repository = Box::new(repository);
        self
    }

    /// Append a resolution source; earlier sources take priority
    pub fn with_source(mut self, source: impl ResolutionSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn core_root(&self) -> Option<&Path> {
        self.core_root.as_deref()
    }

    /// Requested libraries in insertion order
    pub fn libraries(&self) -> &[LibraryReference] {
        self.requested.libraries()
    }

    /// Explicit directories in insertion order
    pub fn dirs(&self) -> &[PathBuf] {
        self.requested.dirs()
    }

    pub fn repository(&self) -> &dyn Repository {
        self.repository.as_ref()
    }

    /// Add an explicit directory (or single file); it is walked on every load
    pub fn add_dir(&mut self, dir: impl Into<PathBuf>) {
        self.requested.push_dir(dir.into());
    }

    /// Request a library
    ///
    /// A pair that was already requested is ignored, and so is its dependency
    /// closure. Requesting [`CORE_LIBRARY_ALIAS`] only logs a warning.
    pub fn add_library(
        &mut self,
        name: impl Into<String>,
        version: Option<String>,
        resolve_dependencies: bool,
    ) {
        let library = LibraryReference::new(name, version);

        if self.request(library.clone()) && resolve_dependencies {
            self.resolve_dependencies(&library);
        }
    }

    /// Request every library of a locked collection at its pinned version
    ///
    /// The collection's availability check runs first; on failure nothing is
    /// registered. Dependencies are not resolved since the collection already
    /// holds the full closure.
    pub fn add_collection<C: Collection>(&mut self, collection: &C) -> Result<(), C::Error> {
        collection.check_availability()?;

        self.repository.add_root(collection.storage_path());

        for (name, version) in collection.locked_libraries() {
            self.add_library(name, Some(version), false);
        }

        Ok(())
    }

    /// Whether a library can be located by the package locator or the repository
    pub fn has_library(&self, name: &str, version: Option<&str>) -> bool {
        self.locate(name, version).is_some()
    }

    /// Insert a reference, rejecting the core alias; returns whether it was new
    fn request(&mut self, library: LibraryReference) -> bool {
        if library.name == CORE_LIBRARY_ALIAS {
            if !self.warned_core_alias {
                warn!(
                    "`{}` is always loaded implicitly. Remove the explicit request",
                    CORE_LIBRARY_ALIAS
                );
                self.warned_core_alias = true;
            }
            return false;
        }

        self.requested.insert(library)
    }

    /// Expand the transitive dependencies of a freshly inserted library
    ///
    /// Depth-first, with an explicit stack of dependency lists so insertion
    /// order matches a recursive walk. Dependencies are requested unversioned.
    fn resolve_dependencies(&mut self, library: &LibraryReference) {
        let mut stack = vec![self.dependencies_of(library).into_iter()];

        while let Some(frame) = stack.last_mut() {
            let Some(dependency) = frame.next() else {
                stack.pop();
                continue;
            };

            let dependency = LibraryReference::unversioned(dependency.name);
            if self.request(dependency.clone()) {
                stack.push(self.dependencies_of(&dependency).into_iter());
            }
        }
    }

    /// Ask the first source that has the library for its dependencies
    fn dependencies_of(&self, library: &LibraryReference) -> Vec<Dependency> {
        let Some(source) = self
            .sources
            .iter()
            .find(|source| source.has(&library.name, library.version()))
        else {
            debug!(library = %library, "no resolution source knows library");
            return Vec::new();
        };

        let version = match &library.version {
            Some(version) => version.clone(),
            None => match source.versions(&library.name).pop() {
                Some(latest) => latest,
                None => {
                    debug!(library = %library, "resolution source reports no versions");
                    return Vec::new();
                }
            },
        };

        let dependencies = source
            .dependencies_of(&library.name, &version)
            .unwrap_or_default();
        debug!(
            library = %library,
            version = %version,
            count = dependencies.len(),
            "resolved dependencies"
        );
        dependencies
    }

    fn locate(&self, name: &str, version: Option<&str>) -> Option<PathBuf> {
        self.locator
            .locate(name, version)
            .or_else(|| self.repository.lookup(name, version))
    }

    fn library_root(&self, library: &LibraryReference) -> LoadResult<SignatureRoot> {
        let dir = self
            .locate(&library.name, library.version())
            .ok_or_else(|| LoadError::UnknownLibrary(library.clone()))?;
        Ok(SignatureRoot::new(RootTag::Library(library.clone()), dir))
    }

    /// Lazily resolve every root of a pass, in order
    pub fn roots(&self) -> Roots<'_> {
        Roots {
            loader: self,
            core: self.core_root.clone(),
            libraries: self.requested.libraries().iter(),
            dirs: self.requested.dirs().iter(),
            failed: false,
        }
    }

    /// Lazily stream declarations of a pass with their provenance
    pub fn declarations<'a, P: SignatureParser>(&'a self, parser: &'a P) -> Declarations<'a, P> {
        Declarations {
            roots: self.roots(),
            parser,
            current: None,
            pending: VecDeque::new(),
            visited: HashSet::new(),
            done: false,
        }
    }

    /// Load every declaration into `env`
    ///
    /// Returns the loaded declarations with their path and root tag, in the
    /// order they were inserted. On error, declarations inserted before the
    /// failure stay in `env`.
    pub fn load<P, E>(
        &self,
        parser: &P,
        env: &mut E,
    ) -> LoadResult<Vec<LoadedDeclaration<P::Declaration>>>
    where
        P: SignatureParser,
        P::Declaration: Clone,
        E: Environment<P::Declaration>,
    {
        let mut loaded = Vec::new();

        for item in self.declarations(parser) {
            let (declaration, provenance) = item?;
            env.insert(declaration.clone());
            loaded.push(LoadedDeclaration {
                declaration,
                path: provenance.path,
                tag: provenance.tag,
            });
        }

        Ok(loaded)
    }
}

impl fmt::Debug for EnvironmentLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentLoader")
            .field("core_root", &self.core_root)
            .field("libraries", &self.requested.libraries())
            .field("dirs", &self.requested.dirs())
            .field("sources", &self.sources.len())
            .finish()
    }
}

/// Lazy sequence of the roots of one pass
pub struct Roots<'a> {
    loader: &'a EnvironmentLoader,
    core: Option<PathBuf>,
    libraries: slice::Iter<'a, LibraryReference>,
    dirs: slice::Iter<'a, PathBuf>,
    failed: bool,
}

impl Iterator for Roots<'_> {
    type Item = LoadResult<SignatureRoot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if let Some(core) = self.core.take() {
            return Some(Ok(SignatureRoot::new(RootTag::Core, core)));
        }

        if let Some(library) = self.libraries.next() {
            let root = self.loader.library_root(library);
            self.failed = root.is_err();
            return Some(root);
        }

        self.dirs
            .next()
            .map(|dir| Ok(SignatureRoot::new(RootTag::Directory(dir.clone()), dir.clone())))
    }
}

/// Lazy stream of `(declaration, provenance)` for one pass
pub struct Declarations<'a, P: SignatureParser> {
    roots: Roots<'a>,
    parser: &'a P,
    current: Option<(RootTag, FileWalker)>,
    pending: VecDeque<(P::Declaration, Provenance)>,
    visited: HashSet<PathBuf>,
    done: bool,
}

impl<P: SignatureParser> Declarations<'_, P> {
    fn next_root(&mut self) -> LoadResult<bool> {
        match self.roots.next() {
            Some(root) => {
                let root = root?;
                debug!(tag = %root.tag, dir = %root.dir.display(), "loading signature root");
                let walker = FileWalker::new(root.dir, root.tag.skip_hidden());
                self.current = Some((root.tag, walker));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn load_file(&mut self, tag: RootTag, path: PathBuf) -> LoadResult<()> {
        let key = fs::canonicalize(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        if self.visited.contains(&key) {
            trace!(path = %path.display(), "skipping already loaded file");
            return Ok(());
        }

        let content = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let buffer = Buffer::new(path.to_string_lossy(), content);
        let declarations = self.parser.parse(&buffer)?;
        self.visited.insert(key);

        let buffer = Arc::new(buffer);
        self.pending
            .extend(declarations.into_iter().map(|declaration| {
                let provenance = Provenance {
                    buffer: Arc::clone(&buffer),
                    tag: tag.clone(),
                    path: path.clone(),
                };
                (declaration, provenance)
            }));
        Ok(())
    }

    fn advance(&mut self) -> LoadResult<bool> {
        let Some((tag, walker)) = self.current.as_mut() else {
            return self.next_root();
        };

        match walker.next() {
            Some(path) => {
                let path = path?;
                let tag = tag.clone();
                self.load_file(tag, path)?;
            }
            None => self.current = None,
        }
        Ok(true)
    }
}

impl<P: SignatureParser> Iterator for Declarations<'_, P> {
    type Item = LoadResult<(P::Declaration, Provenance)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(Ok(item));
            }

            if self.done {
                return None;
            }

            match self.advance() {
                Ok(true) => {}
                Ok(false) => self.done = true,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
