//! Importable-module lookup and version introspection.
//!
//! With a queried interpreter, [`introspect`] imports the module there and
//! reads `__version__` as Python sees it. With an explicit search path there
//! is no interpreter, so the path-based import rules are mirrored closely
//! enough to answer "would `import name` succeed?" without running anything:
//!
//! - within one directory, a regular package (`name/__init__.py`) wins over
//!   an extension module, which wins over a source module, which wins over
//!   bytecode; a bare `name/` directory is only a namespace portion
//! - across directories, the first regular hit wins; namespace portions are
//!   used only when no directory has a regular hit
//! - dotted names are resolved one segment at a time inside the parent
//!   package's directories
//!
//! In that mode the version is read from a module-level `__version__` string
//! literal, or one relative re-export of it. Versions computed at import
//! time are not visible to the static lookup.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::probe::PythonEnvironment;
use crate::error::Result;

/// Extension module suffixes, tried before source.
const EXTENSION_SUFFIXES: &[&str] = &[".so", ".pyd"];

/// `from .sibling import a, b as c` at module level, parenthesized lists may span lines.
static RELATIVE_IMPORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^from\s+\.([A-Za-z_][A-Za-z0-9_]*)\s+import\s+(?:\(([^)]*)\)|([^\n]*))")
        .unwrap()
});

/// How a module was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleKind {
    /// A directory with an `__init__` file.
    Package { init: PathBuf },
    /// A single `.py` file.
    Source { path: PathBuf },
    /// A compiled extension module.
    Extension { path: PathBuf },
    /// A sourceless `.pyc` file.
    Bytecode { path: PathBuf },
    /// A namespace package spread over one or more directories.
    Namespace { portions: Vec<PathBuf> },
    /// Imported by the interpreter; `origin` is its `__file__`, if any.
    Imported { origin: Option<PathBuf> },
}

/// An importable module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocation {
    /// The dotted module name that was looked up.
    pub name: String,
    /// How the module was found.
    pub kind: ModuleKind,
}

impl ModuleLocation {
    /// Directories a submodule lookup searches, empty for non-packages.
    fn submodule_search_path(&self) -> Vec<PathBuf> {
        match &self.kind {
            ModuleKind::Package { init } => {
                init.parent().map(Path::to_path_buf).into_iter().collect()
            }
            ModuleKind::Namespace { portions } => portions.clone(),
            _ => Vec::new(),
        }
    }

    /// The module's self-reported version, if it can be read statically.
    pub fn static_version(&self) -> Option<String> {
        match &self.kind {
            ModuleKind::Package { init } => {
                if init.extension().and_then(|e| e.to_str()) != Some("py") {
                    return None;
                }
                let source = fs::read_to_string(init).ok()?;
                let package_dir = init.parent()?;
                find_version_assignment(&source, "__version__")
                    .or_else(|| find_reexported_version(&source, package_dir))
            }
            ModuleKind::Source { path } => {
                let source = fs::read_to_string(path).ok()?;
                find_version_assignment(&source, "__version__")
            }
            ModuleKind::Extension { .. }
            | ModuleKind::Bytecode { .. }
            | ModuleKind::Namespace { .. }
            | ModuleKind::Imported { .. } => None,
        }
    }
}

/// An importable module and its `__version__`, if one was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrospectedModule {
    pub location: ModuleLocation,
    pub version: Option<String>,
}

/// Find `name` as a module and read its version.
///
/// Imports through the environment's interpreter when there is one,
/// otherwise falls back to [`find_module`] and the static reader.
pub fn introspect(env: &PythonEnvironment, name: &str) -> Result<Option<IntrospectedModule>> {
    if env.interpreter().is_some() {
        let imported = env.import_module(name)?;
        return Ok(imported.map(|module| IntrospectedModule {
            location: ModuleLocation {
                name: name.to_string(),
                kind: ModuleKind::Imported {
                    origin: module.origin,
                },
            },
            version: module.version,
        }));
    }

    Ok(find_module(env, name).map(|location| {
        let version = location.static_version();
        IntrospectedModule { location, version }
    }))
}

/// Locate an importable module by dotted name, without running Python.
pub fn find_module(env: &PythonEnvironment, name: &str) -> Option<ModuleLocation> {
    let mut segments = name.split('.');
    let first = segments.next()?;

    let mut found = ModuleLocation {
        name: first.to_string(),
        kind: find_in_path(env.search_path(), first)?,
    };

    for segment in segments {
        let search_path = found.submodule_search_path();
        if search_path.is_empty() {
            tracing::debug!("{} is not a package; cannot import {}", found.name, name);
            return None;
        }
        found = ModuleLocation {
            name: format!("{}.{}", found.name, segment),
            kind: find_in_path(&search_path, segment)?,
        };
    }

    Some(found)
}

/// Resolve one name segment across a list of directories.
fn find_in_path(search_path: &[PathBuf], segment: &str) -> Option<ModuleKind> {
    if !is_identifier(segment) {
        return None;
    }

    let mut portions = Vec::new();
    for dir in search_path {
        match find_in_dir(dir, segment) {
            Some(DirHit::Module(kind)) => return Some(kind),
            Some(DirHit::NamespacePortion(path)) => portions.push(path),
            None => {}
        }
    }

    if portions.is_empty() {
        None
    } else {
        Some(ModuleKind::Namespace { portions })
    }
}

enum DirHit {
    Module(ModuleKind),
    NamespacePortion(PathBuf),
}

fn find_in_dir(dir: &Path, segment: &str) -> Option<DirHit> {
    let package_dir = dir.join(segment);
    let is_dir = package_dir.is_dir();
    if is_dir {
        for init_name in ["__init__.py", "__init__.pyc"] {
            let init = package_dir.join(init_name);
            if init.is_file() {
                return Some(DirHit::Module(ModuleKind::Package { init }));
            }
        }
        if let Some(path) = find_extension(&package_dir, "__init__") {
            return Some(DirHit::Module(ModuleKind::Package { init: path }));
        }
    }

    if let Some(path) = find_extension(dir, segment) {
        return Some(DirHit::Module(ModuleKind::Extension { path }));
    }

    let source = dir.join(format!("{}.py", segment));
    if source.is_file() {
        return Some(DirHit::Module(ModuleKind::Source { path: source }));
    }

    let bytecode = dir.join(format!("{}.pyc", segment));
    if bytecode.is_file() {
        return Some(DirHit::Module(ModuleKind::Bytecode { path: bytecode }));
    }

    is_dir.then_some(DirHit::NamespacePortion(package_dir))
}

/// Find `<stem>.so`, `<stem>.pyd`, or a tagged form like `<stem>.cpython-312-x86_64-linux-gnu.so`.
fn find_extension(dir: &Path, stem: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let prefix = format!("{}.", stem);

    let mut hits: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| {
                        n.starts_with(&prefix)
                            && EXTENSION_SUFFIXES.iter().any(|suffix| n.ends_with(suffix))
                    })
        })
        .collect();
    hits.sort();
    hits.into_iter().next()
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Find a module-level string assignment to `attr`.
///
/// Accepts plain, annotated and chained forms:
/// `attr = "1.0"`, `attr: str = "1.0"`, `attr = version = "1.0"`,
/// `version = attr = "1.0"`. The literal must end the statement, so
/// expressions such as `"1.0" + suffix` or `".".join(parts)` do not count.
/// The last matching assignment wins, as it would at import time.
fn find_version_assignment(source: &str, attr: &str) -> Option<String> {
    let pattern = format!(
        r#"(?m)^(?:[A-Za-z_][A-Za-z0-9_]*\s*=\s*)*{}\s*(?::[^=\n]+)?=\s*(?:[A-Za-z_][A-Za-z0-9_]*\s*=\s*)*(?:[rRuU]?"([^"\n]*)"|[rRuU]?'([^'\n]*)')[ \t]*(?:;[ \t]*)?(?:#[^\r\n]*)?\r?$"#,
        regex::escape(attr)
    );
    let re = Regex::new(&pattern).ok()?;

    re.captures_iter(source)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .last()
}

/// Follow `from .sibling import __version__` (or `x as __version__`) one level.
fn find_reexported_version(source: &str, package_dir: &Path) -> Option<String> {
    RELATIVE_IMPORT_REGEX
        .captures_iter(source)
        .filter_map(|caps| {
            let sibling = caps.get(1)?.as_str();
            let imported = caps.get(2).or_else(|| caps.get(3))?.as_str();
            let attr = imported.split(',').find_map(reexported_attr)?;
            read_sibling_attr(package_dir, sibling, attr)
        })
        .last()
}

/// The sibling attribute bound to `__version__` by one import item.
fn reexported_attr(item: &str) -> Option<&str> {
    let mut words = item.split_whitespace();
    match (words.next(), words.next(), words.next(), words.next()) {
        (Some("__version__"), None, _, _) => Some("__version__"),
        (Some(attr), Some("as"), Some("__version__"), None) => Some(attr),
        _ => None,
    }
}

fn read_sibling_attr(package_dir: &Path, sibling: &str, attr: &str) -> Option<String> {
    [
        package_dir.join(format!("{}.py", sibling)),
        package_dir.join(sibling).join("__init__.py"),
    ]
    .iter()
    .filter_map(|path| fs::read_to_string(path).ok())
    .find_map(|source| find_version_assignment(&source, attr))
}
