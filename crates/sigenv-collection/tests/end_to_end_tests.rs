//! End-to-end tests: configuration, stores and lockfile driving a real load

use sigenv::{
    Buffer, EnvironmentLoader, LibraryReference, LoadError, ParseError, RootTag, SignatureParser,
};
use sigenv_collection::{
    LoaderConfig, LockedLibrary, Lockfile, LockfileError, PackageStore, SignatureRepository,
    Source, CONFIG_FILE, LOCKFILE_NAME, MANIFEST_FILE,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// One declaration per non-empty line
struct LineParser;

impl SignatureParser for LineParser {
    type Declaration = String;

    fn parse(&self, buffer: &Buffer) -> Result<Vec<String>, ParseError> {
        Ok(buffer
            .content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn depends_on(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!("[[dependencies]]\nname = \"{}\"\n", n))
        .collect()
}

/// Fixture layout:
/// ```text
/// core/object.sig
/// repo/yaml/0/{yaml.sig, manifest.toml -> date}
/// repo/date/0/date.sig
/// repo/date/1/date.sig
/// packages/rails-7.1.0/sig/{rails.sig, _internal/private.sig, manifest.toml -> activesupport, yaml}
/// packages/activesupport-7.1.0/sig/as.sig
/// app/{app.sig, _generated/gen.sig}
/// ```
fn fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(&root.join("core/object.sig"), "class Object");

    write(&root.join("repo/yaml/0/yaml.sig"), "module YAML");
    write(&root.join("repo/yaml/0").join(MANIFEST_FILE), &depends_on(&["date"]));
    write(&root.join("repo/date/0/date.sig"), "class Date0");
    write(&root.join("repo/date/1/date.sig"), "class Date1");

    let rails = root.join("packages/rails-7.1.0/sig");
    write(&rails.join("rails.sig"), "module Rails");
    write(&rails.join("_internal/private.sig"), "module RailsInternal");
    write(
        &rails.join(MANIFEST_FILE),
        &depends_on(&["activesupport", "yaml"]),
    );
    write(
        &root.join("packages/activesupport-7.1.0/sig/as.sig"),
        "module ActiveSupport",
    );

    write(&root.join("app/app.sig"), "class App");
    write(&root.join("app/_generated/gen.sig"), "class Generated");

    temp
}

fn loader_for(root: &Path) -> EnvironmentLoader {
    let store = PackageStore::new([root.join("packages")]);
    let repository = SignatureRepository::new([root.join("repo")]);

    EnvironmentLoader::new(Some(root.join("core")))
        .with_locator(store.clone())
        .with_repository(repository.clone())
        .with_source(store)
        .with_source(repository)
}

#[test]
fn test_full_closure_and_load_order() {
    let temp = fixture();
    let root = temp.path();

    let mut loader = loader_for(root);
    loader.add_library("rails", None, true);
    loader.add_dir(root.join("app"));

    assert_eq!(
        loader.libraries(),
        &[
            LibraryReference::unversioned("rails"),
            LibraryReference::unversioned("activesupport"),
            LibraryReference::unversioned("yaml"),
            LibraryReference::unversioned("date"),
        ]
    );

    let mut env = Vec::new();
    let loaded = loader.load(&LineParser, &mut env).unwrap();

    assert_eq!(
        env,
        vec![
            "class Object",
            "module Rails",
            "module ActiveSupport",
            "module YAML",
            "class Date1",
            "class Generated",
            "class App",
        ]
    );
    assert_eq!(loaded.len(), env.len());
    assert_eq!(
        loaded[5].path,
        root.join("app/_generated/gen.sig"),
        "explicit directories keep underscore directories"
    );
}

#[test]
fn test_versioned_and_unversioned_entries_coexist() {
    let temp = fixture();
    let root = temp.path();

    let mut loader = loader_for(root);
    loader.add_library("date", Some("0".to_string()), true);
    loader.add_library("date", None, true);

    assert_eq!(loader.libraries().len(), 2);

    let loaded = loader.load(&LineParser, &mut Vec::new()).unwrap();
    let decls: Vec<_> = loaded.iter().map(|l| l.declaration.as_str()).collect();
    assert_eq!(decls, vec!["class Object", "class Date0", "class Date1"]);
    assert_eq!(
        loaded[2].tag,
        RootTag::Library(LibraryReference::unversioned("date"))
    );
}

#[test]
fn test_unknown_library_from_stores() {
    let temp = fixture();
    let root = temp.path();

    let mut loader = loader_for(root);
    loader.add_library("nonexistent_lib_xyz", None, true);
    loader.add_dir(root.join("app"));

    let mut env = Vec::new();
    let err = loader.load(&LineParser, &mut env).unwrap_err();

    assert!(matches!(
        err,
        LoadError::UnknownLibrary(ref lib) if lib.name == "nonexistent_lib_xyz"
    ));
    assert_eq!(env, vec!["class Object"]);
}

#[test]
fn test_collection_from_lockfile() {
    let temp = fixture();
    let root = temp.path();

    write(&root.join("project/.sig_collection/ast/2.4/ast.sig"), "module AST");

    let mut lockfile = Lockfile::new(".sig_collection");
    lockfile.add_library(LockedLibrary::new(
        "ast",
        "2.4",
        Source::Git {
            remote: "https://example.com/sigs.git".to_string(),
            revision: "b4d3f00".to_string(),
        },
    ));
    lockfile.add_library(LockedLibrary::new("date", "0", Source::Stdlib));
    let lock_path = root.join("project").join(LOCKFILE_NAME);
    lockfile.to_file(&lock_path).unwrap();

    let lockfile = Lockfile::from_file(&lock_path).unwrap();
    let mut loader = loader_for(root);
    loader.add_collection(&lockfile).unwrap();

    assert_eq!(
        loader.libraries(),
        &[
            LibraryReference::versioned("ast", "2.4"),
            LibraryReference::versioned("date", "0"),
        ]
    );

    let mut env = Vec::new();
    loader.load(&LineParser, &mut env).unwrap();
    assert_eq!(env, vec!["class Object", "module AST", "class Date0"]);
}

#[test]
fn test_unavailable_collection_registers_nothing() {
    let temp = fixture();
    let root = temp.path();

    let mut lockfile = Lockfile::new(".sig_collection");
    lockfile.add_library(LockedLibrary::new(
        "ast",
        "2.4",
        Source::Local {
            path: "../sigs".to_string(),
        },
    ));
    let lock_path = root.join(LOCKFILE_NAME);
    lockfile.to_file(&lock_path).unwrap();
    let lockfile = Lockfile::from_file(&lock_path).unwrap();

    let mut loader = loader_for(root);
    let err = loader.add_collection(&lockfile).unwrap_err();

    assert!(matches!(err, LockfileError::Unavailable { .. }));
    assert!(loader.libraries().is_empty());
}

#[test]
fn test_config_file_builds_loader() {
    let temp = fixture();
    let root = temp.path();

    let config_path = root.join(CONFIG_FILE);
    write(
        &config_path,
        r#"
core_root = "core"
repository = ["repo"]
packages = ["packages"]
dirs = ["app"]

[[libraries]]
name = "yaml"
"#,
    );

    let config = LoaderConfig::from_file(&config_path).unwrap();
    assert_eq!(config.core_root, Some(root.join("core")));

    let loader = config.build().unwrap();
    assert_eq!(loader.core_root(), Some(root.join("core").as_path()));
    assert_eq!(loader.dirs(), &[root.join("app")]);
    assert_eq!(
        loader.libraries(),
        &[
            LibraryReference::unversioned("yaml"),
            LibraryReference::unversioned("date"),
        ]
    );

    let mut env = Vec::new();
    loader.load(&LineParser, &mut env).unwrap();
    assert_eq!(
        env,
        vec![
            "class Object",
            "module YAML",
            "class Date1",
            "class Generated",
            "class App",
        ]
    );
}

#[test]
fn test_library_hidden_dirs_skipped_but_visible_as_directory() {
    let temp = fixture();
    let root = temp.path();
    let sig: PathBuf = root.join("packages/rails-7.1.0/sig");

    let mut loader = loader_for(root);
    loader.add_library("rails", None, false);
    loader.add_dir(sig.clone());

    let loaded = loader.load(&LineParser, &mut Vec::new()).unwrap();
    let paths: Vec<PathBuf> = loaded.iter().map(|l| l.path.clone()).collect();

    assert_eq!(
        paths,
        vec![
            root.join("core/object.sig"),
            sig.join("rails.sig"),
            sig.join("_internal/private.sig"),
        ]
    );
}

#[test]
fn test_config_resolves_dependencies_from_collection() {
    let temp = fixture();
    let root = temp.path();

    let collection = root.join("project/.sig_collection");
    write(&collection.join("ast/2.4/ast.sig"), "module AST");
    write(&collection.join("ast/2.4").join(MANIFEST_FILE), &depends_on(&["set"]));
    write(&root.join("repo/set/0/set.sig"), "class Set");

    let mut lockfile = Lockfile::new(".sig_collection");
    lockfile.add_library(LockedLibrary::new(
        "ast",
        "2.4",
        Source::Git {
            remote: "https://example.com/sigs.git".to_string(),
            revision: "b4d3f00".to_string(),
        },
    ));
    lockfile
        .to_file(&root.join("project").join(LOCKFILE_NAME))
        .unwrap();

    let config_path = root.join("project").join(CONFIG_FILE);
    write(
        &config_path,
        r#"
repository = ["../repo"]
collection = "sig.lock"

[[libraries]]
name = "ast"
"#,
    );

    let loader = LoaderConfig::from_file(&config_path).unwrap().build().unwrap();
    assert!(loader.has_library("ast", None));
    assert_eq!(
        loader.libraries(),
        &[
            LibraryReference::versioned("ast", "2.4"),
            LibraryReference::unversioned("ast"),
            LibraryReference::unversioned("set"),
        ]
    );

    let mut env = Vec::new();
    loader.load(&LineParser, &mut env).unwrap();
    assert_eq!(env, vec!["module AST", "class Set"]);
}
