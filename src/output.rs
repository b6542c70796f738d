//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout or stderr.
//! Format functions are pure.
//!
//! # Output Format
//!
//! ## Gen
//!
//! ```text
//! 001 account_invoice_extra → README.rst
//!     7 fragments (1843 characters, toc)
//!     static/description/index.html: written
//! 002 sale_margin_report → README.rst
//!     3 fragments (412 characters)
//!     static/description/index.html: kept (manual)
//!
//! Generated 2 READMEs, 2 HTML pages
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 account_invoice_extra
//! 002 sale_margin_report
//!
//! Checked 2 modules
//! ```
//!
//! ## Errors (either command)
//!
//! ```text
//! Errors
//!     The Contributors section of sale_margin_report needs at least one
//!     name and email ("* Name <email>")
//!
//! 1 error in 2 modules
//! ```

use crate::html::{ExportOutcome, INDEX_PATH};
use crate::pipeline::RunSummary;
use crate::render::README_NAME;
use crate::validate::ValidationError;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Format generation output: one entity per module with its README, fragment
/// stats, and HTML outcome as indented context lines.
pub fn format_gen_output(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();
    let mut written = 0;

    for (i, report) in summary.reports.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            report.module,
            README_NAME
        ));
        let toc_marker = if report.toc { ", toc" } else { "" };
        lines.push(format!(
            "    {} ({} characters{})",
            plural(report.fragments, "fragment"),
            report.characters,
            toc_marker
        ));
        if let Some((_, outcome)) = summary.html.iter().find(|(m, _)| *m == report.module) {
            let status = match outcome {
                ExportOutcome::Written(_) => {
                    written += 1;
                    "written"
                }
                ExportOutcome::SkippedManual(_) => "kept (manual)",
            };
            lines.push(format!("    {INDEX_PATH}: {status}"));
        }
    }

    if !summary.reports.is_empty() {
        lines.push(String::new());
    }
    if summary.is_clean() {
        lines.push(format!(
            "Generated {}, {}",
            plural(summary.reports.len(), "README"),
            plural(written, "HTML page")
        ));
    } else {
        lines.push(format!(
            "Generated {}, HTML withheld",
            plural(summary.reports.len(), "README")
        ));
    }

    lines
}

/// Format check output: the modules inspected and a total.
pub fn format_check_output(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, report) in summary.reports.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), report.module));
    }
    if !summary.reports.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!("Checked {}", plural(summary.reports.len(), "module")));
    lines
}

/// Format the collected validation errors, empty for a clean run.
pub fn format_errors(errors: &[ValidationError], module_count: usize) -> Vec<String> {
    if errors.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Errors".to_string()];
    for error in errors {
        lines.push(format!("    {error}"));
    }
    lines.push(String::new());
    lines.push(format!(
        "{} in {}",
        plural(errors.len(), "error"),
        plural(module_count, "module")
    ));
    lines
}

/// Print generation output to stdout and any errors to stderr.
pub fn print_gen_output(summary: &RunSummary) {
    for line in format_gen_output(summary) {
        println!("{}", line);
    }
    for line in format_errors(&summary.errors, summary.reports.len()) {
        eprintln!("{}", line);
    }
}

/// Print check output to stdout and any errors to stderr.
pub fn print_check_output(summary: &RunSummary) {
    for line in format_check_output(summary) {
        println!("{}", line);
    }
    for line in format_errors(&summary.errors, summary.reports.len()) {
        eprintln!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::ExportOutcome;
    use crate::pipeline::ModuleReport;
    use std::path::PathBuf;

    fn report(module: &str, fragments: usize, characters: usize, toc: bool) -> ModuleReport {
        ModuleReport {
            module: module.to_string(),
            fragments,
            characters,
            toc,
        }
    }

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn gen_output_clean_run() {
        let summary = RunSummary {
            reports: vec![report("account_extra", 7, 1843, true)],
            errors: vec![],
            html: vec![(
                "account_extra".to_string(),
                ExportOutcome::Written(PathBuf::from(
                    "account_extra/static/description/index.html",
                )),
            )],
        };
        let lines = format_gen_output(&summary);
        assert_eq!(lines[0], "001 account_extra \u{2192} README.rst");
        assert_eq!(lines[1], "    7 fragments (1843 characters, toc)");
        assert_eq!(lines[2], "    static/description/index.html: written");
        assert_eq!(lines[4], "Generated 1 README, 1 HTML page");
    }

    #[test]
    fn gen_output_manual_html_kept() {
        let summary = RunSummary {
            reports: vec![report("sale_report", 2, 300, false)],
            errors: vec![],
            html: vec![(
                "sale_report".to_string(),
                ExportOutcome::SkippedManual(PathBuf::from(
                    "sale_report/static/description/index.html",
                )),
            )],
        };
        let lines = format_gen_output(&summary);
        assert_eq!(lines[1], "    2 fragments (300 characters)");
        assert_eq!(lines[2], "    static/description/index.html: kept (manual)");
        assert_eq!(lines[4], "Generated 1 README, 0 HTML pages");
    }

    #[test]
    fn gen_output_with_errors_withholds_html() {
        let summary = RunSummary {
            reports: vec![report("broken", 1, 50, false)],
            errors: vec![ValidationError::MissingIcon {
                module: "broken".to_string(),
            }],
            html: vec![],
        };
        let lines = format_gen_output(&summary);
        assert_eq!(lines.last().unwrap(), "Generated 1 README, HTML withheld");
    }

    #[test]
    fn gen_output_empty_run() {
        let lines = format_gen_output(&RunSummary::default());
        assert_eq!(lines, vec!["Generated 0 READMEs, 0 HTML pages"]);
    }

    #[test]
    fn check_output_lists_modules() {
        let summary = RunSummary {
            reports: vec![report("a_module", 0, 0, false), report("b_module", 0, 0, false)],
            errors: vec![],
            html: vec![],
        };
        let lines = format_check_output(&summary);
        assert_eq!(lines[0], "001 a_module");
        assert_eq!(lines[1], "002 b_module");
        assert_eq!(lines[3], "Checked 2 modules");
    }

    #[test]
    fn errors_section_formats_each_error() {
        let errors = vec![
            ValidationError::MissingIcon {
                module: "a_module".to_string(),
            },
            ValidationError::MissingName {
                module: "b_module".to_string(),
            },
        ];
        let lines = format_errors(&errors, 2);
        assert_eq!(lines[0], "Errors");
        assert!(lines[1].starts_with("    "));
        assert!(lines[1].contains("a_module"));
        assert_eq!(lines.last().unwrap(), "2 errors in 2 modules");
    }

    #[test]
    fn errors_section_empty_when_clean() {
        assert!(format_errors(&[], 3).is_empty());
    }
}
