//! Module discovery.
//!
//! Stage 1 of the README pipeline. Maps file paths to the set of addon
//! modules they belong to. A file belongs to a module when its file name is
//! one of the module marker files (`__init__.py`, `__manifest__.py`, or a
//! legacy manifest name) and the path has at least one directory component;
//! the module identifier is the top-level path segment.
//!
//! Two input shapes are supported, matching the two ways the tool is invoked:
//!
//! - **Explicit file list** — pre-commit passes the changed files on the
//!   command line. Each path is reduced to its module (or dropped).
//! - **Root walk** — with no files given, the whole addons directory is
//!   walked and every file is considered.
//!
//! Discovery is a filter, not a validation step: paths that don't match the
//! marker pattern are silently ignored. Duplicate detections collapse into a
//! sorted set, so module processing order is deterministic.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// File names that mark a directory as an addon module.
pub const MODULE_MARKERS: &[&str] = &[
    "__init__.py",
    "__manifest__.py",
    "__openerp__.py",
    "__terp__.py",
];

/// Return the module a root-relative file path belongs to, if any.
///
/// - `"my_module/__manifest__.py"` → `Some("my_module")`
/// - `"my_module/models/__init__.py"` → `Some("my_module")`
/// - `"my_module/models/sale.py"` → `None`
/// - `"__init__.py"` → `None` (no directory component — the repo root is
///   not a module)
pub fn module_of(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    if !MODULE_MARKERS.contains(&file_name) {
        return None;
    }

    let mut components = path.components();
    let first = components.next()?;
    // A bare marker file has the marker itself as its only component.
    if components.next().is_none() {
        return None;
    }

    match first {
        Component::Normal(segment) => segment.to_str().map(str::to_string),
        _ => None,
    }
}

/// Discover the set of modules to process.
///
/// With an explicit `files` list (pre-commit invocation), each path is
/// reduced to its module; absolute paths under `root` are first made
/// root-relative. With an empty list, `root` is walked recursively and every
/// file is considered.
pub fn discover(root: &Path, files: &[PathBuf]) -> BTreeSet<String> {
    let mut modules = BTreeSet::new();

    if files.is_empty() {
        for entry in WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if let Ok(rel) = entry.path().strip_prefix(root)
                && let Some(module) = module_of(rel)
            {
                modules.insert(module);
            }
        }
    } else {
        for file in files {
            let rel = file.strip_prefix(root).unwrap_or(file);
            if let Some(module) = module_of(rel) {
                modules.insert(module);
            }
        }
    }

    modules
}
