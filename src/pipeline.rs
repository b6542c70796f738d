//! Pipeline orchestration: discover → manifest → assemble → render → check.
//!
//! [`run`] regenerates READMEs and exports HTML. [`check`] performs the same
//! validation without writing anything, for use as a repository check.
//!
//! Validation problems are not early exits. Every module is processed and
//! every problem collected into [`RunSummary::errors`], so one malformed
//! manifest does not hide the other forty modules' problems. HTML export runs
//! only when the whole run is clean, keeping broken content out of published
//! description pages.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::RunConfig;
use crate::discover;
use crate::fragment::{self, FragmentError};
use crate::html::{self, ExportOutcome, HtmlError};
use crate::manifest::{self, ManifestError};
use crate::render::{self, RenderError};
use crate::validate::{self, ValidationError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Fragment(#[from] FragmentError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Html(#[from] HtmlError),
}

/// Per-module result of a generation run.
#[derive(Debug, Clone)]
pub struct ModuleReport {
    pub module: String,
    /// Number of non-empty fragments assembled.
    pub fragments: usize,
    /// Total fragment characters (drives the table of contents).
    pub characters: usize,
    pub toc: bool,
}

/// Aggregate result of one [`run`] or [`check`] invocation.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<ModuleReport>,
    pub errors: Vec<ValidationError>,
    /// HTML export outcomes, present only for clean generation runs.
    pub html: Vec<(String, ExportOutcome)>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Regenerate READMEs for the selected modules and, if the whole run is
/// clean, export their HTML description pages.
///
/// `files` narrows the run to the modules containing those paths; empty
/// means every module under `root`.
pub fn run(root: &Path, files: &[PathBuf], config: &RunConfig) -> Result<RunSummary, PipelineError> {
    let modules = discover::discover(root, files);
    let mut summary = RunSummary::default();
    let mut module_dirs = Vec::new();

    for module in modules {
        let module_dir = root.join(&module);
        let manifest = match manifest::read_manifest(&module_dir) {
            Ok(manifest) => manifest,
            Err(err) => {
                summary.errors.push(unreadable(&module, err));
                continue;
            }
        };

        let fragments = fragment::assemble(&module_dir, &module, config)?;
        let content = render::render_readme(&module, &manifest, &fragments, config);
        render::write_readme(&module_dir, &content)?;

        summary
            .errors
            .extend(validate::check_module(&module_dir, &module, &manifest, config));
        summary.reports.push(ModuleReport {
            module: module.clone(),
            fragments: fragments.kinds().len(),
            characters: fragments.characters,
            toc: fragments.wants_toc(),
        });
        module_dirs.push((module, module_dir));
    }

    if summary.is_clean() {
        for (module, module_dir) in module_dirs {
            let outcome = html::export(&module_dir)?;
            summary.html.push((module, outcome));
        }
    }

    Ok(summary)
}

/// Validate the selected modules without writing READMEs or HTML.
pub fn check(
    root: &Path,
    files: &[PathBuf],
    config: &RunConfig,
) -> Result<RunSummary, PipelineError> {
    let modules = discover::discover(root, files);
    let mut summary = RunSummary::default();

    for module in modules {
        let module_dir = root.join(&module);
        let manifest = match manifest::read_manifest(&module_dir) {
            Ok(manifest) => manifest,
            Err(err) => {
                summary.errors.push(unreadable(&module, err));
                continue;
            }
        };

        summary
            .errors
            .extend(validate::check_module(&module_dir, &module, &manifest, config));
        summary.reports.push(ModuleReport {
            module,
            fragments: 0,
            characters: 0,
            toc: false,
        });
    }

    Ok(summary)
}

fn unreadable(module: &str, err: ManifestError) -> ValidationError {
    ValidationError::UnreadableManifest {
        module: module.to_string(),
        message: err.to_string(),
    }
}
