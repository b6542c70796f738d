use addon_readme::{config, output, pipeline};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Config overrides shared by gen and check. Flags beat gen-readme.toml,
/// which beats the built-in defaults.
#[derive(clap::Args, Clone)]
struct ConfigArgs {
    /// GitHub organization for raw image URLs
    #[arg(long)]
    org_name: Option<String>,

    /// Repository name for raw image URLs
    #[arg(long)]
    repo_name: Option<String>,

    /// Branch name for raw image URLs
    #[arg(long)]
    branch: Option<String>,

    /// Website shown in the README footer
    #[arg(long)]
    website: Option<String>,

    /// Expected manifest author
    #[arg(long)]
    author: Option<String>,

    /// Minimum DESCRIPTION word count
    #[arg(long)]
    min_description_words: Option<usize>,
}

impl ConfigArgs {
    fn apply(&self, mut config: config::RunConfig) -> config::RunConfig {
        if let Some(org_name) = &self.org_name {
            config.org_name = org_name.clone();
        }
        if let Some(repo_name) = &self.repo_name {
            config.repo_name = repo_name.clone();
        }
        if let Some(branch) = &self.branch {
            config.branch = branch.clone();
        }
        if let Some(website) = &self.website {
            config.website = website.clone();
        }
        if let Some(author) = &self.author {
            config.author = author.clone();
        }
        if let Some(words) = self.min_description_words {
            config.min_description_words = words;
        }
        config
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "addon-readme")]
#[command(about = "README generator for addon repositories")]
#[command(long_about = "\
README generator for addon repositories

Module authors maintain RST fragments under <module>/readme/; the tool
assembles them into a uniform README.rst with badges and a maintainer
footer, then exports an HTML description page per module.

Module structure:

  my_module/
  ├── __manifest__.py              # Manifest (parsed as a literal, never executed)
  ├── readme/
  │   ├── DESCRIPTION.rst          # Lead section (min word count enforced)
  │   ├── INSTALL.rst              # Optional; missing fragments get empty placeholders
  │   ├── USAGE.rst
  │   ├── CONTRIBUTORS.rst         # Must contain '* Name <email>' lines
  │   └── ...
  ├── static/description/
  │   ├── icon.png                 # Required module icon
  │   └── index.html               # Generated HTML (skipped if manually edited)
  └── README.rst                   # Generated - do not edit

Relative image paths in fragments are rewritten to absolute
raw.githubusercontent.com URLs so they render on external sites.

Run 'addon-readme gen-config' to print a documented gen-readme.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Addons repository root
    #[arg(long, default_value = ".", global = true)]
    addons_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Regenerate READMEs and HTML description pages
    Gen {
        /// Limit the run to the modules containing these files
        files: Vec<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Validate modules without writing anything
    Check {
        /// Limit the check to the modules containing these files
        files: Vec<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Print a stock gen-readme.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Gen { files, config: overrides } => {
            let config = overrides.apply(config::load_config(&cli.addons_dir)?);
            let summary = pipeline::run(&cli.addons_dir, &files, &config)?;
            output::print_gen_output(&summary);
            Ok(exit_code(summary.is_clean()))
        }
        Command::Check { files, config: overrides } => {
            let config = overrides.apply(config::load_config(&cli.addons_dir)?);
            let summary = pipeline::check(&cli.addons_dir, &files, &config)?;
            output::print_check_output(&summary);
            Ok(exit_code(summary.is_clean()))
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(clean: bool) -> ExitCode {
    if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
