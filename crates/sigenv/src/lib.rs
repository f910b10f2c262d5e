//! Signature Environment Loader
//!
//! This crate assembles the signature files of a type environment:
//! - Library references and dependency closure over resolution sources
//! - Ordered, lazy resolution of core, library and directory roots
//! - Deterministic traversal of signature directories
//! - Per-pass file deduplication and declaration streaming with provenance
//!
//! Concrete stores (repositories, installed packages, lockfiles) live in
//! `sigenv-collection`; the parser and environment are supplied by the caller.

pub mod decl;
pub mod error;
pub mod library;
pub mod loader;
pub mod source;
pub mod walker;

pub use decl::{
    Buffer, Environment, LoadedDeclaration, Provenance, RootTag, SignatureParser, SignatureRoot,
};
pub use error::{LoadError, LoadResult, ParseError};
pub use library::{LibraryReference, RequestedSet};
pub use loader::{Declarations, EnvironmentLoader, Roots, CORE_LIBRARY_ALIAS};
pub use source::{
    Collection, Dependency, EmptyRepository, NoPackages, PackageLocator, Repository,
    ResolutionSource,
};
pub use walker::{FileWalker, SIGNATURE_EXTENSION};
