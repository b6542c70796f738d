//! Content quality validation.
//!
//! After a module's README is generated, the module is checked for:
//!
//! - a CONTRIBUTORS fragment with at least one `* Name <email>` line
//! - a DESCRIPTION fragment meeting the configured word minimum
//! - an icon at `static/description/icon.png`
//! - a manifest `name`, and an `author` matching the configured one
//!
//! Every check returns its findings as values; nothing is printed here and
//! nothing aborts. The caller aggregates findings across all modules and
//! reports them at the end of the run. Missing fragment files are an
//! expected, handled path — they count as empty content, never a crash.

use crate::config::RunConfig;
use crate::fragment::FRAGMENTS_DIR;
use crate::manifest::Manifest;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Relative path of the required module icon.
pub const ICON_PATH: &str = "static/description/icon.png";

/// A recorded validation finding. Messages name the offending module and
/// file so they are actionable straight from the error report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "{module}/readme/CONTRIBUTORS.rst has no identification, please add one:\n\
         i.e. '* Your Name <your@email.com>'"
    )]
    MissingContributor { module: String },

    #[error(
        "please write a good description for the {module} module in \
         {module}/readme/DESCRIPTION.rst\n\
         the description must have at least {minimum} words to be acceptable (found {found})"
    )]
    ShortDescription {
        module: String,
        minimum: usize,
        found: usize,
    },

    #[error(
        "the module {module} has no icon\n\
         please provide an icon.png file at {module}/static/description/icon.png"
    )]
    MissingIcon { module: String },

    #[error("the manifest of module {module} has no name, please add a proper name")]
    MissingName { module: String },

    #[error(
        "the manifest of module {module} does not have author, please add \
         {expected} as the author"
    )]
    WrongAuthor { module: String, expected: String },

    #[error("cannot read the manifest of module {module}: {message}")]
    UnreadableManifest { module: String, message: String },
}

/// A contributor line: `* Name <email>`.
static CONTRIBUTOR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*\s+[A-Za-z\s]+\s<[\w.-]+@[\w.-]+>$").expect("contributor pattern")
});

/// Run all checks for one module, returning every finding.
pub fn check_module(
    module_dir: &Path,
    module: &str,
    manifest: &Manifest,
    config: &RunConfig,
) -> Vec<ValidationError> {
    let mut findings = Vec::new();
    findings.extend(check_contributors(module_dir, module));
    findings.extend(check_description(
        module_dir,
        module,
        config.min_description_words,
    ));
    findings.extend(check_icon(module_dir, module));
    findings.extend(check_manifest_fields(module, manifest, config));
    findings
}

/// Read a fragment file as text; a missing file is empty content.
fn fragment_content(module_dir: &Path, kind: &str) -> String {
    let path = module_dir.join(FRAGMENTS_DIR).join(format!("{kind}.rst"));
    fs::read_to_string(path).unwrap_or_default()
}

fn check_contributors(module_dir: &Path, module: &str) -> Option<ValidationError> {
    let content = fragment_content(module_dir, "CONTRIBUTORS");
    let has_contributor = content
        .lines()
        .any(|line| CONTRIBUTOR_LINE.is_match(line.trim()));
    (!has_contributor).then(|| ValidationError::MissingContributor {
        module: module.to_string(),
    })
}

fn check_description(module_dir: &Path, module: &str, minimum: usize) -> Option<ValidationError> {
    let content = fragment_content(module_dir, "DESCRIPTION");
    let found = content.split_whitespace().count();
    (found < minimum).then(|| ValidationError::ShortDescription {
        module: module.to_string(),
        minimum,
        found,
    })
}

fn check_icon(module_dir: &Path, module: &str) -> Option<ValidationError> {
    let icon = module_dir.join(ICON_PATH);
    (!icon.is_file()).then(|| ValidationError::MissingIcon {
        module: module.to_string(),
    })
}

fn check_manifest_fields(
    module: &str,
    manifest: &Manifest,
    config: &RunConfig,
) -> Vec<ValidationError> {
    let mut findings = Vec::new();
    if manifest.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
        findings.push(ValidationError::MissingName {
            module: module.to_string(),
        });
    }
    if manifest.author.as_deref() != Some(config.author.as_str()) {
        findings.push(ValidationError::WrongAuthor {
            module: module.to_string(),
            expected: config.author.clone(),
        });
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{manifest_with, module_dir_with_fragments, write_icon};
    use crate::config::RunConfig;

    fn words(n: usize) -> String {
        let mut out = "word ".repeat(n);
        out.push('\n');
        out
    }

    #[test]
    fn contributor_line_passes() {
        let (_tmp, dir) =
            module_dir_with_fragments(&[("CONTRIBUTORS", "* Jane Doe <jane@example.com>\n")]);
        assert_eq!(check_contributors(&dir, "m"), None);
    }

    #[test]
    fn indented_contributor_line_passes() {
        let (_tmp, dir) =
            module_dir_with_fragments(&[("CONTRIBUTORS", "  * Jane Doe <jane@example.com>\n")]);
        assert_eq!(check_contributors(&dir, "m"), None);
    }

    #[test]
    fn prose_contributors_fail() {
        let (_tmp, dir) = module_dir_with_fragments(&[(
            "CONTRIBUTORS",
            "Thanks to everyone who helped with this module.\n",
        )]);
        assert!(matches!(
            check_contributors(&dir, "m"),
            Some(ValidationError::MissingContributor { .. })
        ));
    }

    #[test]
    fn missing_contributors_file_fails_without_panicking() {
        let (_tmp, dir) = module_dir_with_fragments(&[]);
        assert!(check_contributors(&dir, "m").is_some());
    }

    #[test]
    fn description_at_threshold_passes() {
        let (_tmp, dir) = module_dir_with_fragments(&[("DESCRIPTION", &words(40))]);
        assert_eq!(check_description(&dir, "m", 40), None);
    }

    #[test]
    fn description_below_threshold_fails() {
        let (_tmp, dir) = module_dir_with_fragments(&[("DESCRIPTION", &words(39))]);
        assert_eq!(
            check_description(&dir, "m", 40),
            Some(ValidationError::ShortDescription {
                module: "m".to_string(),
                minimum: 40,
                found: 39,
            })
        );
    }

    #[test]
    fn missing_description_counts_as_zero_words() {
        let (_tmp, dir) = module_dir_with_fragments(&[]);
        assert!(matches!(
            check_description(&dir, "m", 40),
            Some(ValidationError::ShortDescription { found: 0, .. })
        ));
    }

    #[test]
    fn icon_presence_checked() {
        let (_tmp, dir) = module_dir_with_fragments(&[]);
        assert!(matches!(
            check_icon(&dir, "m"),
            Some(ValidationError::MissingIcon { .. })
        ));

        write_icon(&dir);
        assert_eq!(check_icon(&dir, "m"), None);
    }

    #[test]
    fn manifest_name_required() {
        let config = RunConfig::default();
        let manifest = manifest_with(&[("author", "Quilsoft")]);
        let findings = check_manifest_fields("m", &manifest, &config);
        assert!(findings.contains(&ValidationError::MissingName {
            module: "m".to_string()
        }));
    }

    #[test]
    fn manifest_author_must_match_config() {
        let config = RunConfig::default();

        let manifest = manifest_with(&[("name", "X"), ("author", "Quilsoft")]);
        assert!(check_manifest_fields("m", &manifest, &config).is_empty());

        let manifest = manifest_with(&[("name", "X"), ("author", "SomeoneElse")]);
        let findings = check_manifest_fields("m", &manifest, &config);
        assert!(matches!(
            findings.as_slice(),
            [ValidationError::WrongAuthor { .. }]
        ));
    }

    #[test]
    fn check_module_collects_all_findings() {
        let config = RunConfig::default();
        let (_tmp, dir) = module_dir_with_fragments(&[]);
        let manifest = manifest_with(&[]);
        let findings = check_module(&dir, "m", &manifest, &config);
        // contributors + description + icon + name + author
        assert_eq!(findings.len(), 5);
    }
}
