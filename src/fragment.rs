//! Fragment reading and assembly.
//!
//! README content lives as small reStructuredText fragments inside each
//! module, one file per section:
//!
//! ```text
//! my_module/
//! └── readme/
//!     ├── DESCRIPTION.rst
//!     ├── INSTALL.rst
//!     ├── CONFIGURE.rst
//!     ├── USAGE.rst
//!     ├── ROADMAP.rst
//!     ├── DEVELOP.rst
//!     ├── CONTRIBUTORS.rst
//!     ├── CREDITS.rst
//!     └── HISTORY.rst
//! ```
//!
//! The assembler reads each fragment in fixed order. Missing files are
//! created empty so future edits have a home; empty fragments contribute
//! nothing. Non-empty fragments get their relative image paths rewritten to
//! absolute `raw.githubusercontent.com` URLs (so images resolve both on the
//! GitHub web UI and on app-store pages that consume the generated HTML) and
//! are normalized to exactly one trailing newline.
//!
//! Only lines that look like a docutils image/figure directive are
//! rewritten; narrative text that happens to mention a path is untouched.

use crate::config::RunConfig;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Directory inside each module holding the fragment files.
pub const FRAGMENTS_DIR: &str = "readme";

/// Fragment kinds in their fixed render order.
pub const FRAGMENT_KINDS: &[&str] = &[
    "DESCRIPTION",
    "INSTALL",
    "CONFIGURE",
    "USAGE",
    "ROADMAP",
    "DEVELOP",
    "CONTRIBUTORS",
    "CREDITS",
    "HISTORY",
];

/// Assembled document grows a table of contents past this many characters.
const TOC_THRESHOLD: usize = 1000;

#[derive(Error, Debug)]
pub enum FragmentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The non-empty fragments of one module, in fixed kind order.
#[derive(Debug, Default)]
pub struct AssembledFragments {
    bodies: BTreeMap<usize, String>,
    /// Total character count across all non-empty fragments.
    pub characters: usize,
}

impl AssembledFragments {
    /// Body for a fragment kind, if that fragment was present and non-empty.
    pub fn get(&self, kind: &str) -> Option<&str> {
        let index = FRAGMENT_KINDS.iter().position(|k| *k == kind)?;
        self.bodies.get(&index).map(String::as_str)
    }

    /// Kinds present, in fixed order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.bodies.keys().map(|&i| FRAGMENT_KINDS[i]).collect()
    }

    /// Whether the assembled document is large enough to warrant a TOC.
    pub fn wants_toc(&self) -> bool {
        self.characters > TOC_THRESHOLD
    }

    pub(crate) fn insert(&mut self, kind_index: usize, body: String) {
        self.characters += body.len();
        self.bodies.insert(kind_index, body);
    }
}

/// Read all fragments of a module, creating the fragment directory and empty
/// placeholder files for any that are missing.
pub fn assemble(
    module_dir: &Path,
    module: &str,
    config: &RunConfig,
) -> Result<AssembledFragments, FragmentError> {
    let fragments_dir = module_dir.join(FRAGMENTS_DIR);
    fs::create_dir_all(&fragments_dir)?;

    let module_url = config.module_url(module);
    let mut assembled = AssembledFragments::default();

    for (index, kind) in FRAGMENT_KINDS.iter().enumerate() {
        let path = fragments_dir.join(format!("{kind}.rst"));
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            if !content.is_empty() {
                assembled.insert(index, rewrite_images(&content, &module_url));
            }
        } else {
            fs::write(&path, "")?;
        }
    }

    Ok(assembled)
}

/// A docutils image or figure directive line, optionally indented and
/// optionally a substitution definition (`.. |name| image:: path`).
static IMAGE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\.\.\s+(?:\|[^|\n]+\|\s+)?(?:image|figure)::\s+(\S+)\s*$")
        .expect("image directive pattern")
});

/// Rewrite relative image/figure paths to absolute URLs under `module_url`,
/// and normalize to exactly one trailing newline.
///
/// Paths already starting with `http` are left alone. Leading `../` segments
/// (used so fragments render from inside the `readme/` subfolder on the
/// GitHub UI) are stripped before joining.
pub fn rewrite_images(content: &str, module_url: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in content.lines() {
        let rewritten = match IMAGE_DIRECTIVE.captures(line).and_then(|caps| caps.get(1)) {
            Some(path) => {
                if path.as_str().starts_with("http") {
                    line.to_string()
                } else {
                    let relative = path.as_str().replace("../", "");
                    format!(
                        "{}{}{}{}",
                        &line[..path.start()],
                        module_url,
                        relative,
                        &line[path.end()..]
                    )
                }
            }
            None => line.to_string(),
        };
        lines.push(rewritten);
    }

    let mut out = lines.join("\n");
    while out.ends_with('\n') {
        out.pop();
    }
    out.push('\n');
    out
}
