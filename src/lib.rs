//! # Addon README
//!
//! A README generator for addon repositories. Module authors maintain small
//! RST fragments under `<module>/readme/` (description, installation,
//! contributors, ...), and the tool assembles them into a uniform
//! `README.rst` with badges, a generated title, and a maintainer footer,
//! then exports an HTML description page per module.
//!
//! # Architecture: Generate-Then-Check Pipeline
//!
//! Each run processes every selected module through the same stages:
//!
//! ```text
//! 1. Discover   repository root  →  module names     (marker files)
//! 2. Manifest   __manifest__.py  →  Manifest         (literal parsing, no exec)
//! 3. Assemble   readme/*.rst     →  AssembledFragments
//! 4. Render     fragments        →  README.rst       (fixed template + badges)
//! 5. Check      module           →  validation errors (collected, not fatal)
//! 6. Export     README.rst       →  static/description/index.html
//! ```
//!
//! Validation never aborts a run. Problems from all modules are collected and
//! reported together, so a repository-wide run surfaces everything at once.
//! HTML export is withheld whenever any module has a problem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`discover`] | Module discovery from marker files, whole tree or changed-file list |
//! | [`manifest`] | Python-literal manifest parsing without executing code |
//! | [`fragment`] | Fragment assembly with relative image URL rewriting |
//! | [`render`] | README.rst rendering: title, badges, sections, footer |
//! | [`validate`] | Per-module content checks (contributors, description, icon, manifest) |
//! | [`html`] | Safe-subset RST to HTML export with manual-edit protection |
//! | [`pipeline`] | Orchestration: [`pipeline::run`] and [`pipeline::check`] |
//! | [`config`] | Optional `gen-readme.toml` with repository-level settings |
//! | [`output`] | CLI output formatting for run summaries and errors |
//!
//! # Design Decisions
//!
//! ## Manifests Are Parsed, Never Executed
//!
//! Addon manifests are Python dict literals. [`manifest`] parses the literal
//! grammar directly (strings, numbers, booleans, `None`, lists, tuples,
//! dicts, comments) instead of shelling out to a Python interpreter. Running
//! a repository check must not execute repository code.
//!
//! ## Generated Files Are Protected, Not Owned
//!
//! Both outputs carry a generator marker: `README.rst` is always regenerated
//! (fragments are the source of truth), but an `index.html` that lost its
//! marker was taken over by hand and is never overwritten. See
//! [`html::GENERATOR_MARKER`].
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system. Malformed HTML is a build error, interpolation is
//! auto-escaped, and there is no template directory to ship. The RST
//! renderer in [`html`] accepts only a known-safe subset: unknown directives
//! (`include`, `raw`, ...) are hard errors rather than silent passthrough.
//!
//! ## Diff-Stable Output
//!
//! Regenerating an unchanged module must produce byte-identical files.
//! Section order is fixed, module iteration is sorted, and the tool version
//! is stripped from the generator meta tag after rendering, so upgrading the
//! tool does not touch every description page in the repository.

pub mod config;
pub mod discover;
pub mod fragment;
pub mod html;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
