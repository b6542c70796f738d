//! Shared test fixtures.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::RunConfig;
use crate::fragment::{AssembledFragments, FRAGMENT_KINDS, FRAGMENTS_DIR};
use crate::manifest::Manifest;
use crate::render::README_NAME;
use crate::validate::ICON_PATH;

/// A module directory containing the given fragment files.
pub(crate) fn module_dir_with_fragments(fragments: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let module_dir = tmp.path().join("test_module");
    let fragments_dir = module_dir.join(FRAGMENTS_DIR);
    fs::create_dir_all(&fragments_dir).unwrap();
    for (kind, body) in fragments {
        fs::write(fragments_dir.join(format!("{kind}.rst")), body).unwrap();
    }
    (tmp, module_dir)
}

/// A manifest with the given string fields set, everything else defaulted.
pub(crate) fn manifest_with(fields: &[(&str, &str)]) -> Manifest {
    let mut raw = Map::new();
    for (key, value) in fields {
        raw.insert(key.to_string(), Value::String(value.to_string()));
    }
    let get = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
    Manifest {
        name: get("name"),
        author: get("author"),
        license: get("license").unwrap_or_else(|| "AGPL-3".to_string()),
        development_status: get("development_status").unwrap_or_else(|| "Beta".to_string()),
        website: get("website"),
        installable: true,
        raw,
    }
}

/// Assembled fragments built directly from (kind, body) pairs.
pub(crate) fn assembled(fragments: &[(&str, &str)]) -> AssembledFragments {
    let mut result = AssembledFragments::default();
    for (kind, body) in fragments {
        let index = FRAGMENT_KINDS
            .iter()
            .position(|k| k == kind)
            .unwrap_or_else(|| panic!("unknown fragment kind {kind}"));
        result.insert(index, body.to_string());
    }
    result
}

/// Put a placeholder icon at the module's expected icon path.
pub(crate) fn write_icon(module_dir: &Path) {
    let icon = module_dir.join(ICON_PATH);
    fs::create_dir_all(icon.parent().unwrap()).unwrap();
    fs::write(icon, b"\x89PNG\r\n\x1a\n").unwrap();
}

/// A module directory holding the given README content, ready for export.
pub(crate) fn generated_module(readme: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let module_dir = tmp.path().join("test_module");
    fs::create_dir_all(&module_dir).unwrap();
    fs::write(module_dir.join(README_NAME), readme).unwrap();
    (tmp, module_dir)
}

pub(crate) fn tiny_readme() -> String {
    "=========\nMy Module\n=========\n\nA short description of the module.\n\nUsage\n=====\n\nInstall it and run it.\n".to_string()
}

/// A complete module under `root` that passes every check with `config`.
pub(crate) fn valid_module(root: &Path, name: &str, config: &RunConfig) {
    let module_dir = root.join(name);
    let fragments_dir = module_dir.join(FRAGMENTS_DIR);
    fs::create_dir_all(&fragments_dir).unwrap();

    fs::write(module_dir.join("__init__.py"), "").unwrap();
    fs::write(
        module_dir.join("__manifest__.py"),
        format!(
            "{{\n    'name': '{name} title',\n    'author': '{}',\n    'license': 'AGPL-3',\n}}\n",
            config.author
        ),
    )
    .unwrap();

    let description = "This module does one useful thing. "
        .repeat(config.min_description_words.div_ceil(6));
    fs::write(fragments_dir.join("DESCRIPTION.rst"), description).unwrap();
    fs::write(
        fragments_dir.join("CONTRIBUTORS.rst"),
        "* Jane Doe <jane@example.com>\n",
    )
    .unwrap();

    write_icon(&module_dir);
}
