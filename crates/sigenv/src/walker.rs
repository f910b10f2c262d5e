//! Depth-first enumeration of signature files under one root
//!
//! Rules:
//! - A root that is a plain file is always yielded, whatever its name.
//! - Non-root files are yielded only with the [`SIGNATURE_EXTENSION`].
//! - Directories whose name starts with `_` are hidden. With `skip_hidden`
//!   they are pruned, unless the directory is the root itself.
//! - Children are visited in lexicographic order so output is reproducible.

use crate::error::{LoadError, LoadResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Extension of signature files, without the dot
pub const SIGNATURE_EXTENSION: &str = "sig";

/// Prefix marking a hidden directory
pub const HIDDEN_PREFIX: char = '_';

/// Iterator over the signature files reachable from a root
#[derive(Debug)]
pub struct FileWalker {
    /// Pending entries; the bool marks the traversal root
    stack: Vec<(PathBuf, bool)>,
    skip_hidden: bool,
}

impl FileWalker {
    /// Start a walk at `root`
    pub fn new(root: impl Into<PathBuf>, skip_hidden: bool) -> Self {
        Self {
            stack: vec![(root.into(), true)],
            skip_hidden,
        }
    }

    /// Collect every file of a walk, stopping at the first error
    pub fn collect_files(root: impl Into<PathBuf>, skip_hidden: bool) -> LoadResult<Vec<PathBuf>> {
        Self::new(root, skip_hidden).collect()
    }

    fn descend(&mut self, dir: &Path) -> LoadResult<()> {
        let io_err = |source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut children = fs::read_dir(dir)
            .map_err(io_err)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err)?;
        children.sort();

        // Reverse so the smallest name is popped first
        self.stack
            .extend(children.into_iter().rev().map(|child| (child, false)));
        Ok(())
    }
}

impl Iterator for FileWalker {
    type Item = LoadResult<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((path, immediate)) = self.stack.pop() {
            if path.is_file() {
                if immediate || has_signature_extension(&path) {
                    return Some(Ok(path));
                }
                continue;
            }

            if !path.is_dir() {
                trace!(path = %path.display(), "skipping missing or special entry");
                continue;
            }

            if self.skip_hidden && !immediate && is_hidden(&path) {
                trace!(path = %path.display(), "pruning hidden directory");
                continue;
            }

            if let Err(err) = self.descend(&path) {
                self.stack.clear();
                return Some(Err(err));
            }
        }

        None
    }
}

/// Whether a path's final component starts with the hidden prefix
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.starts_with(HIDDEN_PREFIX))
}

fn has_signature_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SIGNATURE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn relative(root: &Path, files: Vec<PathBuf>) -> Vec<String> {
        files
            .into_iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_sorted_depth_first() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();

        touch(&root.join("b.sig"));
        touch(&root.join("a/z.sig"));
        touch(&root.join("a/m/x.sig"));
        touch(&root.join("c.sig"));

        let files = FileWalker::collect_files(root, true).unwrap();
        assert_eq!(
            relative(root, files),
            vec!["a/m/x.sig", "a/z.sig", "b.sig", "c.sig"]
        );
    }

    #[test]
    fn test_skips_other_extensions() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();

        touch(&root.join("readme.md"));
        touch(&root.join("types.sig"));
        touch(&root.join("manifest.toml"));

        let files = FileWalker::collect_files(root, false).unwrap();
        assert_eq!(relative(root, files), vec!["types.sig"]);
    }

    #[test]
    fn test_root_file_always_yielded() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("_private").join("notes.txt");
        touch(&file);

        let files = FileWalker::collect_files(&file, true).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_hidden_directories() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();

        touch(&root.join("_internal/foo.sig"));
        touch(&root.join("public.sig"));

        let skipped = FileWalker::collect_files(root, true).unwrap();
        assert_eq!(relative(root, skipped), vec!["public.sig"]);

        let kept = FileWalker::collect_files(root, false).unwrap();
        assert_eq!(relative(root, kept), vec!["_internal/foo.sig", "public.sig"]);
    }

    #[test]
    fn test_hidden_root_is_not_pruned() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("_root");

        touch(&root.join("a.sig"));
        touch(&root.join("_nested/b.sig"));

        let files = FileWalker::collect_files(&root, true).unwrap();
        assert_eq!(relative(&root, files), vec!["a.sig"]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let files = FileWalker::collect_files(temp.path().join("absent"), true).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_items_are_load_results() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("a.sig");
        touch(&file);

        let mut walker = FileWalker::new(temp.path(), true);
        let first: Option<LoadResult<PathBuf>> = walker.next();
        assert_eq!(first.unwrap().unwrap(), file);
        assert!(walker.next().is_none());
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new("sig/_internal")));
        assert!(!is_hidden(Path::new("sig/internal_")));
    }
}
