//! Command line argument parsing and validation.

use crate::config::{DEFAULT_SERVICE_URL, DEFAULT_STAGING_URL, WorkspaceConfig};
use crate::error::CliError;
use crate::mirror::DEFAULT_BRANCH;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build-number bookkeeping and staged publication for mirrored products
#[derive(Parser, Debug)]
#[command(
    name = "release_steward",
    version,
    about = "Build-number bookkeeping and staged publication for mirrored products",
    long_about = "Keeps upstream mirrors, a git-tracked version ledger, and publishes
signed artifacts through a single-slot staging profile.

Usage:
  release_steward mirror libs acme https://github.com/acme/acme.git
  release_steward bump acme
  release_steward suffix acme
  release_steward publish acme --group org.acme dist/acme.jar"
)]
pub struct Args {
    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true, env = "RELEASE_WORKSPACE", value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Do not stage ledger writes into git
    #[arg(long, global = true)]
    pub no_stage: bool,

    /// Suppress status output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show detailed progress
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clone or refresh an upstream mirror and record its provenance
    Mirror {
        /// Mirror category (directory under projects/)
        category: String,
        /// Product name
        name: String,
        /// Upstream URL
        url: String,
        /// Branch to track
        #[arg(long, default_value = DEFAULT_BRANCH)]
        branch: String,
        /// Clone the full history instead of a shallow copy
        #[arg(long)]
        full_history: bool,
    },

    /// Record one attribute for a product
    Record {
        /// Product name
        name: String,
        /// Attribute key (e.g. commit, branch)
        key: String,
        /// Value; parsed as JSON when possible, otherwise taken as a string
        value: String,
    },

    /// Increment a product's build number and print it
    Bump {
        /// Product name
        name: String,
    },

    /// Print a product's version suffix (b<N>-<commit>)
    Suffix {
        /// Product name
        name: String,
    },

    /// Print ledger records as JSON
    Show {
        /// Only this product
        name: Option<String>,
    },

    /// Sign and publish artifacts through the staging profile
    Publish(PublishArgs),
}

/// Arguments of the publish command
#[derive(clap::Args, Debug)]
pub struct PublishArgs {
    /// Product name
    pub name: String,

    /// Dotted artifact group, e.g. org.acme
    #[arg(long)]
    pub group: String,

    /// Base version prefixed to the build suffix
    #[arg(long, value_name = "VERSION")]
    pub base_version: Option<String>,

    /// Increment the build number before publishing
    #[arg(long)]
    pub bump: bool,

    /// Staging profile name
    #[arg(long, env = "STAGING_PROFILE")]
    pub profile: Option<String>,

    /// Staging username
    #[arg(long, env = "STAGING_USERNAME")]
    pub username: Option<String>,

    /// Staging password
    #[arg(long, env = "STAGING_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// GnuPG key used to sign artifacts
    #[arg(long, env = "SIGNING_KEY")]
    pub signing_key: Option<String>,

    /// Deploy URL used while staging
    #[arg(long, default_value = DEFAULT_STAGING_URL)]
    pub staging_url: String,

    /// REST root of the staging service
    #[arg(long, default_value = DEFAULT_SERVICE_URL)]
    pub service_url: String,

    /// Seconds between checks while another release holds the slot
    #[arg(long, default_value_t = 1, value_name = "SECS")]
    pub poll_interval_secs: u64,

    /// Release target restored after staging
    #[arg(long, env = "RELEASE_URL")]
    pub release_url: Option<String>,

    /// Artifact files to sign and upload
    #[arg(required = true, value_name = "ARTIFACT")]
    pub artifacts: Vec<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), CliError> {
        let invalid = |reason: &str| {
            Err(CliError::InvalidArguments {
                reason: reason.to_string(),
            })
        };
        let blank = |s: &str| s.trim().is_empty();
        match &self.command {
            Command::Mirror {
                category,
                name,
                url,
                branch,
                ..
            } => {
                if blank(category) || blank(name) || blank(url) || blank(branch) {
                    return invalid("category, name, url and branch must not be empty");
                }
                if !is_path_component(category) || !is_path_component(name) {
                    return invalid("category and name must be single path components");
                }
            }
            Command::Record { name, key, .. } => {
                if blank(name) || blank(key) {
                    return invalid("name and key must not be empty");
                }
            }
            Command::Bump { name } | Command::Suffix { name } => {
                if blank(name) {
                    return invalid("name must not be empty");
                }
            }
            Command::Show { .. } => {}
            Command::Publish(publish) => {
                if blank(&publish.name) || blank(&publish.group) {
                    return invalid("name and --group must not be empty");
                }
                if publish.poll_interval_secs == 0 {
                    return invalid("--poll-interval-secs must be at least 1");
                }
            }
        }
        Ok(())
    }

    /// Workspace layout selected by the arguments
    pub fn workspace_config(&self) -> std::io::Result<WorkspaceConfig> {
        let root = match &self.workspace {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        Ok(WorkspaceConfig::new(root).with_staging(!self.no_stage))
    }
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Mirror { .. } => "mirror",
            Command::Record { .. } => "record",
            Command::Bump { .. } => "bump",
            Command::Suffix { .. } => "suffix",
            Command::Show { .. } => "show",
            Command::Publish(_) => "publish",
        }
    }
}

/// A plain directory name: no separators, not `.` or `..`
fn is_path_component(value: &str) -> bool {
    !value.contains(['/', '\\']) && value != "." && value != ".."
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
        }
    }
}

impl RuntimeConfig {
    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print progress message
    pub fn progress_println(&self, message: &str) {
        let _ = self.output.progress(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Print a command result for scripts
    pub fn data_println(&self, value: &str) -> std::io::Result<()> {
        self.output.data(value)
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_mirror_defaults() {
        let args = Args::try_parse_from([
            "release_steward",
            "mirror",
            "libs",
            "acme",
            "https://example.invalid/acme.git",
        ])
        .unwrap();
        match args.command {
            Command::Mirror {
                branch,
                full_history,
                ..
            } => {
                assert_eq!(branch, DEFAULT_BRANCH);
                assert!(!full_history);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_mirror_rejects_nested_name() {
        let args = Args::try_parse_from([
            "release_steward",
            "mirror",
            "libs",
            "../acme",
            "https://example.invalid/acme.git",
        ])
        .unwrap();
        assert!(matches!(
            args.validate(),
            Err(CliError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn test_mirror_rejects_dot_components() {
        for (category, name) in [("libs", ".."), ("libs", "."), ("..", "acme"), (".", "acme")] {
            let args = Args::try_parse_from([
                "release_steward",
                "mirror",
                category,
                name,
                "https://example.invalid/acme.git",
            ])
            .unwrap();
            assert!(
                matches!(args.validate(), Err(CliError::InvalidArguments { .. })),
                "{}/{} should be rejected",
                category,
                name
            );
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "release_steward",
            "bump",
            "acme",
            "--no-stage",
            "--workspace",
            "/tmp/ws",
        ])
        .unwrap();
        assert!(args.no_stage);
        let ws = args.workspace_config().unwrap();
        assert_eq!(ws.root, PathBuf::from("/tmp/ws"));
        assert!(!ws.stage_ledger);
    }

    #[test]
    fn test_publish_requires_artifacts() {
        let result = Args::try_parse_from(["release_steward", "publish", "acme", "--group", "org.acme"]);
        assert!(result.is_err());
    }
}
