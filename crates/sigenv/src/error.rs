//! Error types for environment loading

use crate::library::LibraryReference;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors that abort a load pass
///
/// Every variant is fatal: the pass stops at the first error. Declarations
/// already handed to the environment are not retracted.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No locator or repository knows the requested library
    #[error(
        "Cannot find type definitions for library: {} ({})",
        .0.name,
        .0.version.as_deref().unwrap_or("[nil]")
    )]
    UnknownLibrary(LibraryReference),

    /// A signature file or directory could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The signature parser rejected a file
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl LoadError {
    /// The library that could not be found, if this is an unknown-library error
    pub fn library(&self) -> Option<&LibraryReference> {
        match self {
            LoadError::UnknownLibrary(library) => Some(library),
            _ => None,
        }
    }
}

/// Error raised by a [`SignatureParser`](crate::SignatureParser)
///
/// The loader never rewrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Name of the buffer being parsed (the file path)
    pub buffer: String,

    /// Human readable message
    pub message: String,

    /// One-based line and column, when the parser knows them
    pub location: Option<(usize, usize)>,
}

impl ParseError {
    /// Create a parse error without location
    pub fn new(buffer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            buffer: buffer.into(),
            message: message.into(),
            location: None,
        }
    }

    /// Attach a line/column location
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.location = Some((line, column));
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some((line, column)) => {
                write!(f, "{}:{}:{}: {}", self.buffer, line, column, self.message)
            }
            None => write!(f, "{}: {}", self.buffer, self.message),
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_library_message() {
        let err = LoadError::UnknownLibrary(LibraryReference::unversioned("nope"));
        assert_eq!(
            err.to_string(),
            "Cannot find type definitions for library: nope ([nil])"
        );

        let err = LoadError::UnknownLibrary(LibraryReference::versioned("nope", "1.2"));
        assert_eq!(
            err.to_string(),
            "Cannot find type definitions for library: nope (1.2)"
        );
    }

    #[test]
    fn test_parse_error_passes_through() {
        let parse = ParseError::new("core/object.sig", "unexpected token").at(3, 7);
        let err: LoadError = parse.clone().into();

        assert_eq!(err.to_string(), "core/object.sig:3:7: unexpected token");
        assert!(matches!(err, LoadError::Parse(ref inner) if *inner == parse));
    }
}
