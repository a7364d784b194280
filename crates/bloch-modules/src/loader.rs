//! Loads an entry file and its transitive imports into one program.

use std::path::{Path, PathBuf};

use bloch_syntax::ast::{ImportDeclaration, Program};
use bloch_syntax::parse_source;
use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument};

use crate::error::{ModuleError, ModuleResult};
use crate::search::SearchPaths;

/// File extension of Bloch sources.
pub const SOURCE_EXTENSION: &str = "bloch";

/// Resolves imports depth-first and merges the loaded modules.
///
/// All per-load state is reset at the start of every [`load`](Self::load),
/// so one loader can serve several independent compilations in sequence.
#[derive(Debug)]
pub struct ModuleLoader {
    search_paths: SearchPaths,
    /// Finished modules, keyed by canonical path.
    cache: FxHashMap<PathBuf, Program>,
    /// Modules currently being loaded, outermost first.
    stack: Vec<PathBuf>,
    /// Modules in the order they finished loading.
    load_order: Vec<PathBuf>,
}

impl ModuleLoader {
    pub fn new(search_paths: SearchPaths) -> Self {
        Self {
            search_paths,
            cache: FxHashMap::default(),
            stack: Vec::new(),
            load_order: Vec::new(),
        }
    }

    pub fn search_paths(&self) -> &SearchPaths {
        &self.search_paths
    }

    /// Canonical paths of the last successful load, dependencies first.
    pub fn load_order(&self) -> &[PathBuf] {
        &self.load_order
    }

    /// Load `entry` and everything it imports into a single [`Program`].
    ///
    /// The result has no imports, exactly one `main` function, and its shot
    /// setting taken from `@shots(N)` on `main`.
    #[instrument(skip(self, entry), fields(entry = %entry.as_ref().display()))]
    pub fn load(&mut self, entry: impl AsRef<Path>) -> ModuleResult<Program> {
        self.cache.clear();
        self.stack.clear();
        self.load_order.clear();

        let result = self.load_all(entry.as_ref());

        self.cache.clear();
        self.stack.clear();
        if result.is_err() {
            self.load_order.clear();
        }
        result
    }

    fn load_all(&mut self, entry: &Path) -> ModuleResult<Program> {
        let entry = canonicalize(entry)?;
        info!(entry = %entry.display(), "loading program");

        self.load_module(&entry)?;
        let mut program = self.merge();
        apply_entry_point(&mut program)?;

        info!(
            modules = self.load_order.len(),
            functions = program.functions.len(),
            has_shots = program.has_shots,
            shots = program.shot_count,
            "program loaded"
        );
        Ok(program)
    }

    #[instrument(skip(self, path), fields(module = %path.display()))]
    fn load_module(&mut self, path: &Path) -> ModuleResult<()> {
        if self.cache.contains_key(path) {
            debug!("module already loaded");
            return Ok(());
        }

        if let Some(start) = self.stack.iter().position(|p| p == path) {
            let mut cycle = self.stack[start..].to_vec();
            cycle.push(path.to_path_buf());
            return Err(ModuleError::ImportCycle { cycle });
        }

        self.stack.push(path.to_path_buf());

        let source = std::fs::read_to_string(path).map_err(|e| ModuleError::io(path, e))?;
        let mut program = parse_source(&source).map_err(|source| ModuleError::Syntax {
            path: path.to_path_buf(),
            source,
        })?;

        let importing_dir = path.parent().unwrap_or(Path::new("."));
        for import in std::mem::take(&mut program.imports) {
            let resolved = self.resolve(&import, importing_dir, path)?;
            debug!(
                import = %import.dotted(),
                resolved = %resolved.display(),
                "resolved import"
            );
            self.load_module(&resolved)?;
        }

        self.stack.pop();
        self.load_order.push(path.to_path_buf());
        self.cache.insert(path.to_path_buf(), program);
        Ok(())
    }

    /// Locate the file named by `import` and canonicalize it.
    fn resolve(
        &self,
        import: &ImportDeclaration,
        importing_dir: &Path,
        importer: &Path,
    ) -> ModuleResult<PathBuf> {
        let relative = import_relative_path(import);
        let found = self
            .search_paths
            .find(importing_dir, &relative)
            .ok_or_else(|| ModuleError::UnresolvedImport {
                import: import.dotted(),
                importer: importer.to_path_buf(),
                line: import.pos.line,
                column: import.pos.column,
            })?;
        canonicalize(&found)
    }

    /// Concatenate every cached module in load order.
    fn merge(&mut self) -> Program {
        let mut merged = Program::new();
        for path in &self.load_order {
            if let Some(module) = self.cache.remove(path) {
                merged.classes.extend(module.classes);
                merged.functions.extend(module.functions);
                merged.statements.extend(module.statements);
            }
        }
        merged
    }
}

impl Default for ModuleLoader {
    fn default() -> Self {
        Self::new(SearchPaths::from_env())
    }
}

/// `a.b.C` becomes `a/b/C.bloch`.
fn import_relative_path(import: &ImportDeclaration) -> PathBuf {
    let mut relative: PathBuf = import.path.iter().collect();
    relative.set_extension(SOURCE_EXTENSION);
    relative
}

fn canonicalize(path: &Path) -> ModuleResult<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| ModuleError::io(path, e))
}

/// Check for exactly one `main` and copy its shot count onto the program.
fn apply_entry_point(program: &mut Program) -> ModuleResult<()> {
    let mut mains = program.functions.iter().filter(|f| f.name == "main");
    let main = mains.next().ok_or(ModuleError::NoMain)?;
    if let Some(second) = mains.next() {
        return Err(ModuleError::MultipleMain {
            line: second.pos.line,
            column: second.pos.column,
        });
    }

    let shots = match main.shots_value() {
        Some(value) => match value.parse::<u32>() {
            Ok(n) if n > 0 => Some(n),
            _ => {
                let annotation = main.annotations.iter().find(|a| a.name == "shots");
                let pos = annotation.map_or(main.pos, |a| a.pos);
                return Err(ModuleError::InvalidShots {
                    value: value.to_string(),
                    line: pos.line,
                    column: pos.column,
                });
            }
        },
        None => None,
    };

    program.has_shots = shots.is_some();
    program.shot_count = shots.unwrap_or(1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloch_syntax::ast::Position;

    fn program(source: &str) -> Program {
        parse_source(source).unwrap()
    }

    #[test]
    fn test_import_path_is_nested_file() {
        let import = ImportDeclaration {
            path: vec!["std".into(), "gates".into(), "Hadamard".into()],
            pos: Position::new(1, 1),
        };
        assert_eq!(
            import_relative_path(&import),
            PathBuf::from("std").join("gates").join("Hadamard.bloch")
        );
    }

    #[test]
    fn test_entry_point_without_shots() {
        let mut p = program("function main() -> void { }");
        apply_entry_point(&mut p).unwrap();
        assert!(!p.has_shots);
        assert_eq!(p.shot_count, 1);
    }

    #[test]
    fn test_entry_point_with_shots() {
        let mut p = program("@shots(250) function main() -> void { }");
        apply_entry_point(&mut p).unwrap();
        assert!(p.has_shots);
        assert_eq!(p.shot_count, 250);
    }

    #[test]
    fn test_zero_shots_rejected() {
        let mut p = program("@shots(0) function main() -> void { }");
        let err = apply_entry_point(&mut p).unwrap_err();
        assert!(matches!(err, ModuleError::InvalidShots { ref value, .. } if value == "0"));
        assert_eq!(err.column(), Some(1));
    }

    #[test]
    fn test_main_count_enforced() {
        let mut none = program("function helper() -> void { }");
        assert!(matches!(
            apply_entry_point(&mut none),
            Err(ModuleError::NoMain)
        ));

        let mut two = program("function main() -> void { }\nfunction main() -> void { }");
        let err = apply_entry_point(&mut two).unwrap_err();
        assert!(matches!(err, ModuleError::MultipleMain { line: 2, .. }));
    }

    #[test]
    fn test_missing_entry_is_io_error() {
        let mut loader = ModuleLoader::new(SearchPaths::new());
        let err = loader.load("/no/such/dir/entry.bloch").unwrap_err();
        assert!(matches!(err, ModuleError::Io { .. }));
        assert!(loader.load_order().is_empty());
    }
}
