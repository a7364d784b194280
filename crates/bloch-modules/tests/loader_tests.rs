//! Integration tests for module loading against real directory trees.

use std::fs;
use std::path::{Path, PathBuf};

use bloch_modules::{ModuleError, ModuleLoader, SearchPaths};
use bloch_syntax::ErrorCategory;
use bloch_syntax::ast::{Program, StatementKind};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Write `files` (relative path, contents) under a fresh temp dir.
fn tree(files: &[(&str, &str)]) -> TempDir {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    for (path, contents) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, contents).unwrap();
    }
    dir
}

fn canonical(dir: &TempDir, relative: &str) -> PathBuf {
    fs::canonicalize(dir.path().join(relative)).unwrap()
}

fn function_names(program: &Program) -> Vec<&str> {
    program.functions.iter().map(|f| f.name.as_str()).collect()
}

fn declared_names(program: &Program) -> Vec<&str> {
    program
        .statements
        .iter()
        .filter_map(|s| match &s.kind {
            StatementKind::VariableDeclaration(v) => Some(v.name.as_str()),
            _ => None,
        })
        .collect()
}

fn load(entry: &Path) -> Result<Program, ModuleError> {
    ModuleLoader::new(SearchPaths::new()).load(entry)
}

#[test]
fn test_single_file_program() {
    let dir = tree(&[("main.bloch", "int x; function main() -> void { }")]);
    let mut loader = ModuleLoader::new(SearchPaths::new());
    let program = loader.load(dir.path().join("main.bloch")).unwrap();

    assert_eq!(function_names(&program), vec!["main"]);
    assert!(program.imports.is_empty());
    assert!(!program.has_shots);
    assert_eq!(program.shot_count, 1);
    assert_eq!(loader.load_order(), &[canonical(&dir, "main.bloch")]);
}

#[test]
fn test_dependencies_merge_before_importer() {
    let dir = tree(&[
        (
            "main.bloch",
            "import lib.util;\nint from_main;\nfunction main() -> void { }",
        ),
        ("lib/util.bloch", "int from_util;\nfunction helper() -> int { return 1; }"),
    ]);
    let mut loader = ModuleLoader::new(SearchPaths::new());
    let program = loader.load(dir.path().join("main.bloch")).unwrap();

    assert!(program.imports.is_empty());
    assert_eq!(function_names(&program), vec!["helper", "main"]);
    assert_eq!(declared_names(&program), vec!["from_util", "from_main"]);
    assert_eq!(
        loader.load_order(),
        &[canonical(&dir, "lib/util.bloch"), canonical(&dir, "main.bloch")]
    );
}

#[test]
fn test_shared_dependency_loaded_once() {
    let dir = tree(&[
        (
            "main.bloch",
            "import left;\nimport right;\nfunction main() -> void { }",
        ),
        ("left.bloch", "import base;\nfunction l() -> void { }"),
        ("right.bloch", "import base;\nfunction r() -> void { }"),
        ("base.bloch", "class Shared { }\nfunction b() -> void { }"),
    ]);
    let mut loader = ModuleLoader::new(SearchPaths::new());
    let program = loader.load(dir.path().join("main.bloch")).unwrap();

    assert_eq!(function_names(&program), vec!["b", "l", "r", "main"]);
    assert_eq!(program.classes.len(), 1);
    assert_eq!(loader.load_order().len(), 4);
}

#[test]
fn test_import_cycle_reports_every_module() {
    let dir = tree(&[
        ("A.bloch", "import B;\nfunction main() -> void { }"),
        ("B.bloch", "import A;\n"),
    ]);
    let err = load(&dir.path().join("A.bloch")).unwrap_err();

    let ModuleError::ImportCycle { cycle } = &err else {
        panic!("expected cycle error, got {err:?}");
    };
    let a = canonical(&dir, "A.bloch");
    let b = canonical(&dir, "B.bloch");
    assert_eq!(cycle, &vec![a.clone(), b.clone(), a.clone()]);

    let message = err.to_string();
    assert!(message.starts_with("Semantic error: import cycle detected: "));
    assert!(message.contains(&a.display().to_string()));
    assert!(message.contains(&b.display().to_string()));
}

#[test]
fn test_self_import_is_a_cycle() {
    let dir = tree(&[("A.bloch", "import A;\nfunction main() -> void { }")]);
    let err = load(&dir.path().join("A.bloch")).unwrap_err();
    assert!(matches!(err, ModuleError::ImportCycle { ref cycle } if cycle.len() == 2));
}

#[test]
fn test_main_in_two_modules() {
    let dir = tree(&[
        ("main.bloch", "import other;\nfunction main() -> void { }"),
        ("other.bloch", "function main() -> void { }"),
    ]);
    let err = load(&dir.path().join("main.bloch")).unwrap_err();
    assert!(matches!(err, ModuleError::MultipleMain { .. }));
    assert!(err.to_string().contains("Multiple 'main' functions"));
}

#[test]
fn test_no_main_anywhere() {
    let dir = tree(&[
        ("main.bloch", "import other;\nfunction start() -> void { }"),
        ("other.bloch", "function helper() -> void { }"),
    ]);
    let err = load(&dir.path().join("main.bloch")).unwrap_err();
    assert!(matches!(err, ModuleError::NoMain));
    assert_eq!(
        err.to_string(),
        "Semantic error: No 'main' function found across imported modules"
    );
}

#[test]
fn test_unresolved_import_position() {
    let dir = tree(&[(
        "main.bloch",
        "int x;\n  import pkg.Missing;\nfunction main() -> void { }",
    )]);
    let err = load(&dir.path().join("main.bloch")).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Semantic);
    assert_eq!((err.line(), err.column()), (Some(2), Some(3)));
    assert_eq!(
        err.to_string(),
        "Semantic error at 2:3: import 'pkg.Missing' not found"
    );
}

#[test]
fn test_user_and_stdlib_paths_are_searched() {
    let dir = tree(&[
        (
            "app/main.bloch",
            "import mathx;\nimport std.io;\nfunction main() -> void { }",
        ),
        ("vendor/mathx.bloch", "function square(int x) -> int { return x * x; }"),
        ("stdlib/std/io.bloch", "function print(int x) -> void { echo(x); }"),
    ]);
    let paths = SearchPaths::new()
        .with_user_path(dir.path().join("vendor"))
        .with_stdlib_path(dir.path().join("stdlib"));
    let program = ModuleLoader::new(paths)
        .load(dir.path().join("app/main.bloch"))
        .unwrap();
    assert_eq!(function_names(&program), vec!["square", "print", "main"]);
}

#[test]
fn test_importing_directory_wins_over_user_path() {
    let dir = tree(&[
        ("app/main.bloch", "import util;\nfunction main() -> void { }"),
        ("app/util.bloch", "function local_util() -> void { }"),
        ("vendor/util.bloch", "function vendor_util() -> void { }"),
    ]);
    let paths = SearchPaths::new().with_user_path(dir.path().join("vendor"));
    let program = ModuleLoader::new(paths)
        .load(dir.path().join("app/main.bloch"))
        .unwrap();
    assert_eq!(function_names(&program), vec!["local_util", "main"]);
}

#[test]
fn test_parse_error_names_failing_file() {
    let dir = tree(&[
        ("main.bloch", "import broken;\nfunction main() -> void { }"),
        ("broken.bloch", "int x = ;"),
    ]);
    let err = load(&dir.path().join("main.bloch")).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Parse);
    assert_eq!(err.path(), Some(canonical(&dir, "broken.bloch").as_path()));
    assert_eq!((err.line(), err.column()), (Some(1), Some(9)));
}

#[test]
fn test_shots_taken_from_main() {
    let dir = tree(&[(
        "main.bloch",
        "@quantum @shots(1024)\nfunction main() -> bit { qubit q; return measure q; }",
    )]);
    let program = load(&dir.path().join("main.bloch")).unwrap();
    assert!(program.has_shots);
    assert_eq!(program.shot_count, 1024);
}

#[test]
fn test_relative_spellings_share_one_module() {
    let dir = tree(&[
        ("main.bloch", "import lib.a;\nimport lib.b;\nfunction main() -> void { }"),
        ("lib/a.bloch", "import c;\n"),
        ("lib/b.bloch", "import c;\n"),
        ("lib/c.bloch", "function shared() -> void { }"),
    ]);
    let entry = dir.path().join("lib").join("..").join("main.bloch");
    let mut loader = ModuleLoader::new(SearchPaths::new());
    let program = loader.load(&entry).unwrap();

    assert_eq!(function_names(&program), vec!["shared", "main"]);
    assert_eq!(loader.load_order().last(), Some(&canonical(&dir, "main.bloch")));
}

#[test]
fn test_loader_is_reusable() {
    let first = tree(&[
        ("main.bloch", "import dep;\nfunction main() -> void { }"),
        ("dep.bloch", "function dep_fn() -> void { }"),
    ]);
    let second = tree(&[("main.bloch", "function main() -> void { }")]);

    let mut loader = ModuleLoader::new(SearchPaths::new());
    loader.load(first.path().join("main.bloch")).unwrap();
    assert_eq!(loader.load_order().len(), 2);

    let program = loader.load(second.path().join("main.bloch")).unwrap();
    assert_eq!(function_names(&program), vec!["main"]);
    assert_eq!(loader.load_order().len(), 1);

    let missing = loader.load(second.path().join("absent.bloch"));
    assert!(missing.is_err());
    assert!(loader.load_order().is_empty());
}
