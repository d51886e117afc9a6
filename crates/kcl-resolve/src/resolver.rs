//! Turning an import statement's path into a concrete module URI, and
//! memoising each module's extracted exports behind a per-URI cache.

use kcl_ast::Program;
use kcl_fs::FileSystem;
use rustc_hash::FxHashMap;

use crate::error::ResolutionError;
use crate::export::{ExportedSymbol, extract_exports};

/// Standard-library namespaces a `@std/` import may name. Mirrors the
/// operation namespaces `kcl-stdlib` exposes.
const STD_MODULES: &[&str] =
    &["@std/math", "@std/vector", "@std/sketch", "@std/units", "@std/array"];

/// Resolve `import_path`, written inside the module at `source_uri`, to a
/// concrete URI. Relative paths (`./`, `../`) resolve against the source
/// file's directory and get `.kcl` appended if missing, then must exist
/// according to `fs`. `@std/` paths are checked against a fixed list.
/// Anything else -- a bare package name -- isn't supported yet.
pub fn resolve_import(
    source_uri: &str,
    import_path: &str,
    fs: &dyn FileSystem,
) -> Result<String, ResolutionError> {
    if import_path.starts_with("./") || import_path.starts_with("../") {
        let mut candidate = kcl_fs::resolve(source_uri, import_path);
        if !candidate.ends_with(".kcl") {
            candidate.push_str(".kcl");
        }
        return if fs.exists(&candidate) {
            Ok(candidate)
        } else {
            Err(ResolutionError::new(format!("Cannot find module '{import_path}'")))
        };
    }

    if let Some(module) = import_path.strip_prefix("@std/") {
        return if STD_MODULES.contains(&import_path) {
            Ok(import_path.to_string())
        } else {
            Err(ResolutionError::new(format!("Unknown standard library module '{module}'")))
        };
    }

    Err(ResolutionError::new("Package imports not yet supported"))
}

/// Per-URI cache of extracted exports, plus an accumulated, never-thrown
/// list of resolution failures. Callers drain `errors()` themselves;
/// nothing here panics or returns early on a bad import.
#[derive(Default)]
pub struct ModuleResolver {
    cache: FxHashMap<String, FxHashMap<String, ExportedSymbol>>,
    errors: Vec<ResolutionError>,
}

impl ModuleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `import_path` against `source_uri`. On failure, the error is
    /// recorded and `None` is returned.
    pub fn resolve(&mut self, source_uri: &str, import_path: &str, fs: &dyn FileSystem) -> Option<String> {
        match resolve_import(source_uri, import_path, fs) {
            Ok(uri) => Some(uri),
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }

    /// Exports of the module at `uri`, extracted from `program` on first
    /// access and cached until `invalidate`/`clear`.
    pub fn exports_of(&mut self, uri: &str, program: &Program) -> &FxHashMap<String, ExportedSymbol> {
        self.cache.entry(uri.to_string()).or_insert_with(|| extract_exports(program))
    }

    pub fn errors(&self) -> &[ResolutionError] {
        &self.errors
    }

    /// Drop the cached exports for one module, e.g. after it's re-parsed.
    pub fn invalidate(&mut self, uri: &str) {
        self.cache.remove(uri);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcl_ast::{Expr, ExprKind, Stmt, StmtKind};
    use kcl_common::Range;
    use kcl_fs::InMemoryFileSystem;

    fn program_exporting(name: &str) -> Program {
        let let_stmt = Stmt::new(
            StmtKind::Let { name: name.to_string(), expr: Expr::new(ExprKind::Number(1.0, None), Range::new(0, 1)) },
            Range::new(0, 10),
        );
        Program {
            statements: vec![Stmt::new(StmtKind::Export(Box::new(let_stmt)), Range::new(0, 10))],
            ..Default::default()
        }
    }

    #[test]
    fn relative_import_resolves_against_source_directory() {
        let fs = InMemoryFileSystem::new().with_file("/proj/helpers.kcl", "");
        let resolved = resolve_import("/proj/main.kcl", "./helpers.kcl", &fs).unwrap();
        assert_eq!(resolved, "/proj/helpers.kcl");
    }

    #[test]
    fn relative_import_without_extension_gets_kcl_appended() {
        let fs = InMemoryFileSystem::new().with_file("/proj/helpers.kcl", "");
        let resolved = resolve_import("/proj/main.kcl", "./helpers", &fs).unwrap();
        assert_eq!(resolved, "/proj/helpers.kcl");
    }

    #[test]
    fn missing_relative_import_is_an_error() {
        let fs = InMemoryFileSystem::new();
        assert!(resolve_import("/proj/main.kcl", "./missing.kcl", &fs).is_err());
    }

    #[test]
    fn known_std_module_resolves_to_itself() {
        let fs = InMemoryFileSystem::new();
        assert_eq!(resolve_import("/proj/main.kcl", "@std/math", &fs).unwrap(), "@std/math");
    }

    #[test]
    fn unknown_std_module_is_an_error() {
        let fs = InMemoryFileSystem::new();
        assert!(resolve_import("/proj/main.kcl", "@std/nope", &fs).is_err());
    }

    #[test]
    fn bare_package_import_is_not_yet_supported() {
        let fs = InMemoryFileSystem::new();
        let err = resolve_import("/proj/main.kcl", "some-package", &fs).unwrap_err();
        assert_eq!(err.message, "Package imports not yet supported");
    }

    #[test]
    fn module_resolver_caches_exports_per_uri() {
        let mut resolver = ModuleResolver::new();
        let program = program_exporting("pi");
        let first = resolver.exports_of("/proj/main.kcl", &program).clone();
        let empty = Program::default();
        let second = resolver.exports_of("/proj/main.kcl", &empty);
        assert_eq!(first, *second);
    }

    #[test]
    fn invalidate_clears_a_single_module() {
        let mut resolver = ModuleResolver::new();
        let program = program_exporting("pi");
        resolver.exports_of("/proj/main.kcl", &program);
        resolver.invalidate("/proj/main.kcl");
        let renamed = program_exporting("tau");
        let exports = resolver.exports_of("/proj/main.kcl", &renamed);
        assert!(exports.contains_key("tau"));
    }

    #[test]
    fn module_resolver_accumulates_errors_without_stopping() {
        let fs = InMemoryFileSystem::new();
        let mut resolver = ModuleResolver::new();
        assert!(resolver.resolve("/proj/main.kcl", "./a.kcl", &fs).is_none());
        assert!(resolver.resolve("/proj/main.kcl", "./b.kcl", &fs).is_none());
        assert_eq!(resolver.errors().len(), 2);
    }
}
