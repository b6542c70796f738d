//! Run configuration.
//!
//! Settings come from two layers: an optional `gen-readme.toml` at the
//! addons root (overrides the stock defaults), then CLI flags (override the
//! file). Config files are sparse — set just the values you want:
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! org_name = "quilsoft-org"      # GitHub organization for raw image URLs
//! repo_name = "my-repo"          # Repository name for raw image URLs
//! branch = "main"                # Branch name for raw image URLs
//! website = "https://quilsoft.com"
//! author = "Quilsoft"            # Expected manifest author
//! min_description_words = 40     # Minimum DESCRIPTION word count
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Optional config file name, looked up in the addons root.
pub const CONFIG_FILE: &str = "gen-readme.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings for one pipeline run.
///
/// All fields have defaults matching the original pre-commit hook flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// GitHub organization used to build absolute raw image URLs.
    pub org_name: String,
    /// Repository name used to build absolute raw image URLs.
    pub repo_name: String,
    /// Branch name used to build absolute raw image URLs.
    pub branch: String,
    /// Partner website shown in the README footer.
    pub website: String,
    /// Expected manifest author; a differing or missing author is a
    /// validation error.
    pub author: String,
    /// Minimum number of words the DESCRIPTION fragment must contain.
    pub min_description_words: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            org_name: "quilsoft-org".to_string(),
            repo_name: "my-repo".to_string(),
            branch: "main".to_string(),
            website: "https://quilsoft.com".to_string(),
            author: "Quilsoft".to_string(),
            min_description_words: 40,
        }
    }
}

impl RunConfig {
    /// Absolute URL prefix for a module's files on the raw GitHub host.
    /// Always ends with a trailing slash.
    pub fn module_url(&self, module: &str) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}/",
            self.org_name, self.repo_name, self.branch, module
        )
    }
}

/// Load config from `gen-readme.toml` in the addons root, falling back to
/// defaults when the file doesn't exist.
pub fn load_config(root: &Path) -> Result<RunConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(RunConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    Ok(toml::from_str(&content)?)
}

/// A documented stock config file, printed by `gen-config`.
pub fn stock_config_toml() -> String {
    let defaults = RunConfig::default();
    format!(
        r#"# addon-readme configuration
# Place this file as gen-readme.toml in your addons root.
# All options are optional - defaults shown below.

# GitHub coordinates used to rewrite relative image paths in fragments
# to absolute raw.githubusercontent.com URLs.
org_name = "{}"
repo_name = "{}"
branch = "{}"

# Partner website shown in the README footer.
website = "{}"

# Expected manifest author; modules listing a different author fail
# validation.
author = "{}"

# Minimum number of words the DESCRIPTION fragment must contain.
min_description_words = {}
"#,
        defaults.org_name,
        defaults.repo_name,
        defaults.branch,
        defaults.website,
        defaults.author,
        defaults.min_description_words,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.org_name, "quilsoft-org");
        assert_eq!(config.min_description_words, 40);
    }

    #[test]
    fn partial_file_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "org_name = \"acme\"\nbranch = \"16.0\"\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.org_name, "acme");
        assert_eq!(config.branch, "16.0");
        // Untouched fields keep defaults
        assert_eq!(config.author, "Quilsoft");
    }

    #[test]
    fn unknown_keys_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "org = \"typo\"\n").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn module_url_shape() {
        let config = RunConfig {
            org_name: "acme".to_string(),
            repo_name: "addons".to_string(),
            branch: "16.0".to_string(),
            ..RunConfig::default()
        };
        assert_eq!(
            config.module_url("my_module"),
            "https://raw.githubusercontent.com/acme/addons/16.0/my_module/"
        );
    }

    #[test]
    fn stock_config_round_trips() {
        let parsed: RunConfig = toml::from_str(&stock_config_toml()).unwrap();
        assert_eq!(parsed.org_name, RunConfig::default().org_name);
        assert_eq!(
            parsed.min_description_words,
            RunConfig::default().min_description_words
        );
    }
}
