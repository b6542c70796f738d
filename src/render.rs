//! README document rendering.
//!
//! Produces each module's `README.rst` from a fixed template:
//!
//! ```text
//! =============
//! Invoice Fixes              <- manifest name (module dir as fallback)
//! =============
//!
//! .. |badge1| image:: ...    <- badge substitution definitions
//!     :target: ...
//!     :alt: ...
//!
//! |badge1| |badge2| |badge3| <- badge reference line
//!
//! <summary>                  <- manifest "summary", when present
//!
//! <DESCRIPTION fragment>
//!
//! .. contents::              <- only when the assembled content is large
//!    :local:
//!
//! Installation               <- one section per non-empty fragment,
//! ============                  fixed order, fixed headings
//! <INSTALL fragment>
//! ...
//!
//! Maintainer                 <- footer with org, status, website
//! ==========
//! ```
//!
//! Badges come from two static lookup tables keyed by development status
//! (case-insensitive) and license string, preceded by a fixed pre-commit
//! badge. Unknown statuses or licenses simply omit that badge.
//!
//! The document is written to `<module>/README.rst`, overwriting any prior
//! content, terminated by exactly one trailing blank line. The template is
//! fixed, so it is rendered with direct string formatting — no runtime
//! template engine.

use crate::config::RunConfig;
use crate::fragment::{AssembledFragments, FRAGMENT_KINDS};
use crate::manifest::Manifest;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Output file name inside each module directory.
pub const README_NAME: &str = "README.rst";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A status image with link and alt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub image: &'static str,
    pub target: &'static str,
    pub alt: &'static str,
}

/// Fixed badge rendered first on every README.
pub const PRE_COMMIT_BADGE: Badge = Badge {
    image: "https://img.shields.io/badge/pre_commit-passed-green",
    target: "https://pre-commit.com/",
    alt: "Pre-Commit",
};

/// Maturity badge for a development-status string, matched case-insensitively.
pub fn development_status_badge(status: &str) -> Option<Badge> {
    let badge = match status.to_lowercase().as_str() {
        "mature" => Badge {
            image: "https://img.shields.io/badge/maturity-Mature-brightgreen.png",
            target: "https://odoo-community.org/page/development-status",
            alt: "Mature",
        },
        "production/stable" => Badge {
            image: "https://img.shields.io/badge/maturity-Production%2FStable-green.png",
            target: "https://odoo-community.org/page/development-status",
            alt: "Production/Stable",
        },
        "beta" => Badge {
            image: "https://img.shields.io/badge/maturity-Beta-yellow.png",
            target: "https://odoo-community.org/page/development-status",
            alt: "Beta",
        },
        "alpha" => Badge {
            image: "https://img.shields.io/badge/maturity-Alpha-red.png",
            target: "https://odoo-community.org/page/development-status",
            alt: "Alpha",
        },
        _ => return None,
    };
    Some(badge)
}

/// License badge for a license identifier, matched exactly.
pub fn license_badge(license: &str) -> Option<Badge> {
    let badge = match license {
        "AGPL-3" => Badge {
            image: "https://img.shields.io/badge/licence-AGPL--3-blue.png",
            target: "http://www.gnu.org/licenses/agpl-3.0-standalone.html",
            alt: "License: AGPL-3",
        },
        "LGPL-3" => Badge {
            image: "https://img.shields.io/badge/licence-LGPL--3-blue.png",
            target: "http://www.gnu.org/licenses/lgpl-3.0-standalone.html",
            alt: "License: LGPL-3",
        },
        "GPL-3" => Badge {
            image: "https://img.shields.io/badge/licence-GPL--3-blue.png",
            target: "http://www.gnu.org/licenses/gpl-3.0-standalone.html",
            alt: "License: GPL-3",
        },
        "OPL-1" => Badge {
            image: "https://img.shields.io/badge/licence-OPL--1-blue.png",
            target: "https://www.tldrlegal.com/license/open-public-license-v1-0-opl-1-0",
            alt: "License: OPL-1",
        },
        "OEEL-1" => Badge {
            image: "https://img.shields.io/badge/licence-OEEL--1-blue.png",
            target: "https://www.tldrlegal.com/license/open-public-license-v1-0-opl-1-0",
            alt: "License: OEEL-1",
        },
        _ => return None,
    };
    Some(badge)
}

/// Badges for a manifest: fixed pre-commit badge, then maturity, then
/// license. Unknown values omit that badge rather than erroring.
pub fn badges(manifest: &Manifest) -> Vec<Badge> {
    let mut out = vec![PRE_COMMIT_BADGE];
    out.extend(development_status_badge(&manifest.development_status));
    out.extend(license_badge(&manifest.license));
    out
}

/// Section heading for a fragment kind. DESCRIPTION has no heading — it is
/// the document lead.
fn section_heading(kind: &str) -> Option<&'static str> {
    match kind {
        "INSTALL" => Some("Installation"),
        "CONFIGURE" => Some("Configuration"),
        "USAGE" => Some("Usage"),
        "ROADMAP" => Some("Roadmap"),
        "DEVELOP" => Some("Development"),
        "CONTRIBUTORS" => Some("Contributors"),
        "CREDITS" => Some("Credits"),
        "HISTORY" => Some("History"),
        _ => None,
    }
}

/// Render the full README document.
pub fn render_readme(
    module: &str,
    manifest: &Manifest,
    fragments: &AssembledFragments,
    config: &RunConfig,
) -> String {
    let mut out = String::new();

    // Title block — manifest name, falling back to the module directory so
    // a missing name (a validation error) still produces a document.
    let title = manifest.name.clone().unwrap_or_else(|| module.to_string());
    let rule = "=".repeat(title.chars().count());
    out.push_str(&format!("{rule}\n{title}\n{rule}\n\n"));

    // Badge substitution definitions and the reference line
    let badge_list = badges(manifest);
    for (i, badge) in badge_list.iter().enumerate() {
        out.push_str(&format!(
            ".. |badge{}| image:: {}\n    :target: {}\n    :alt: {}\n",
            i + 1,
            badge.image,
            badge.target,
            badge.alt
        ));
    }
    let refs: Vec<String> = (1..=badge_list.len())
        .map(|i| format!("|badge{i}|"))
        .collect();
    out.push_str(&format!("\n{}\n\n", refs.join(" ")));

    // Optional one-line summary from the raw manifest mapping
    if let Some(Value::String(summary)) = manifest.raw.get("summary") {
        let summary = summary.trim();
        if !summary.is_empty() {
            out.push_str(&format!("{summary}\n\n"));
        }
    }

    if let Some(description) = fragments.get("DESCRIPTION") {
        out.push_str(description);
        out.push('\n');
    }

    if fragments.wants_toc() {
        out.push_str(".. contents::\n   :local:\n\n");
    }

    // One section per remaining non-empty fragment, fixed order
    for kind in FRAGMENT_KINDS {
        let Some(heading) = section_heading(kind) else {
            continue;
        };
        if let Some(body) = fragments.get(kind) {
            let rule = "=".repeat(heading.chars().count());
            out.push_str(&format!("{heading}\n{rule}\n\n"));
            out.push_str(body);
            out.push('\n');
        }
    }

    // Maintainer footer
    out.push_str("Maintainer\n==========\n\n");
    out.push_str(&format!(
        "This module is maintained by {}.\n",
        config.org_name
    ));
    if let Some(author) = &manifest.author {
        out.push_str(&format!("Author: {author}.\n"));
    }
    out.push_str(&format!(
        "Development status: {}.\n\n",
        manifest.development_status
    ));
    out.push_str(&format!("`{0} <{0}>`__\n", config.website));

    // Exactly one trailing blank line
    while out.ends_with('\n') {
        out.pop();
    }
    out.push_str("\n\n");
    out
}

/// Write the rendered README into the module directory, overwriting any
/// prior content. Returns the written path.
pub fn write_readme(module_dir: &Path, content: &str) -> Result<PathBuf, RenderError> {
    let path = module_dir.join(README_NAME);
    fs::write(&path, content)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{assembled, manifest_with};

    #[test]
    fn beta_agpl_yields_three_badges_in_order() {
        let manifest = manifest_with(&[
            ("name", "X"),
            ("development_status", "Beta"),
            ("license", "AGPL-3"),
        ]);
        let list = badges(&manifest);
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], PRE_COMMIT_BADGE);
        assert_eq!(list[1].alt, "Beta");
        assert_eq!(list[2].alt, "License: AGPL-3");
    }

    #[test]
    fn status_lookup_is_case_insensitive() {
        assert_eq!(
            development_status_badge("Production/Stable").unwrap().alt,
            "Production/Stable"
        );
        assert_eq!(development_status_badge("MATURE").unwrap().alt, "Mature");
    }

    #[test]
    fn unknown_status_and_license_omit_badges() {
        assert_eq!(development_status_badge("experimental"), None);
        assert_eq!(license_badge("MIT"), None);

        let manifest = manifest_with(&[
            ("name", "X"),
            ("development_status", "experimental"),
            ("license", "MIT"),
        ]);
        assert_eq!(badges(&manifest), vec![PRE_COMMIT_BADGE]);
    }

    #[test]
    fn title_comes_from_manifest_name() {
        let manifest = manifest_with(&[("name", "Invoice Fixes")]);
        let readme = render_readme("my_module", &manifest, &assembled(&[]), &RunConfig::default());
        assert!(readme.starts_with("=============\nInvoice Fixes\n=============\n"));
    }

    #[test]
    fn title_falls_back_to_module_dir() {
        let manifest = manifest_with(&[]);
        let readme = render_readme("my_module", &manifest, &assembled(&[]), &RunConfig::default());
        assert!(readme.contains("\nmy_module\n"));
    }

    #[test]
    fn sections_rendered_in_fixed_order_with_headings() {
        let manifest = manifest_with(&[("name", "X")]);
        let fragments = assembled(&[
            ("HISTORY", "old news\n"),
            ("INSTALL", "pip install\n"),
            ("USAGE", "run it\n"),
        ]);
        let readme = render_readme("m", &manifest, &fragments, &RunConfig::default());

        let install = readme.find("Installation\n============").unwrap();
        let usage = readme.find("Usage\n=====").unwrap();
        let history = readme.find("History\n=======").unwrap();
        assert!(install < usage && usage < history);
    }

    #[test]
    fn absent_fragments_render_no_section() {
        let manifest = manifest_with(&[("name", "X")]);
        let fragments = assembled(&[("USAGE", "run it\n")]);
        let readme = render_readme("m", &manifest, &fragments, &RunConfig::default());
        assert!(!readme.contains("Installation"));
        assert!(!readme.contains("Roadmap"));
    }

    #[test]
    fn description_is_lead_without_heading() {
        let manifest = manifest_with(&[("name", "X")]);
        let fragments = assembled(&[("DESCRIPTION", "This module fixes things.\n")]);
        let readme = render_readme("m", &manifest, &fragments, &RunConfig::default());
        assert!(readme.contains("This module fixes things."));
        assert!(!readme.contains("Description\n"));
    }

    #[test]
    fn toc_rendered_only_for_large_content() {
        let manifest = manifest_with(&[("name", "X")]);

        let small = assembled(&[("DESCRIPTION", "short\n")]);
        let readme = render_readme("m", &manifest, &small, &RunConfig::default());
        assert!(!readme.contains(".. contents::"));

        let body = format!("{}\n", "word ".repeat(300));
        let large = assembled(&[("DESCRIPTION", &body)]);
        let readme = render_readme("m", &manifest, &large, &RunConfig::default());
        assert!(readme.contains(".. contents::\n   :local:"));
    }

    #[test]
    fn footer_names_org_author_and_website() {
        let manifest = manifest_with(&[("name", "X"), ("author", "Quilsoft")]);
        let readme = render_readme("m", &manifest, &assembled(&[]), &RunConfig::default());
        assert!(readme.contains("This module is maintained by quilsoft-org."));
        assert!(readme.contains("Author: Quilsoft."));
        assert!(readme.contains("`https://quilsoft.com <https://quilsoft.com>`__"));
    }

    #[test]
    fn document_ends_with_one_blank_line() {
        let manifest = manifest_with(&[("name", "X")]);
        let readme = render_readme("m", &manifest, &assembled(&[]), &RunConfig::default());
        assert!(readme.ends_with("\n\n"));
        assert!(!readme.ends_with("\n\n\n"));
    }

    #[test]
    fn summary_rendered_from_raw_manifest() {
        let manifest = manifest_with(&[("name", "X"), ("summary", "Fixes invoices")]);
        let readme = render_readme("m", &manifest, &assembled(&[]), &RunConfig::default());
        assert!(readme.contains("Fixes invoices\n"));
    }

    #[test]
    fn write_readme_overwrites() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_readme(tmp.path(), "first\n").unwrap();
        let path = write_readme(tmp.path(), "second\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "second\n");
    }
}
