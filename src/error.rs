//! Error types for release_steward operations.
//!
//! Every failure carries an actionable message. Fatal classes (configuration,
//! missing provenance) are distinguished from failures worth retrying by hand.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release_steward operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release_steward operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Version ledger errors
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Version suffix errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Git operation errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote staging service errors
    #[error("Staging error: {0}")]
    Staging(#[from] StagingError),

    /// Artifact signing errors
    #[error("Signing error: {0}")]
    Sign(#[from] SignError),

    /// Artifact upload errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Version ledger errors
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No build number has ever been recorded for the product
    #[error(
        "No build number recorded for '{name}'. Increment the build number before computing a version suffix."
    )]
    BuildNumberNotFound {
        /// Product name
        name: String,
    },

    /// Ledger file exists but cannot be parsed
    #[error("Ledger file {path} is corrupted: {reason}")]
    Corrupted {
        /// Path of the ledger file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Attribute value has the wrong shape for its key
    #[error("Invalid value for attribute '{key}': {reason}")]
    InvalidAttribute {
        /// Attribute key
        key: String,
        /// Reason for the error
        reason: String,
    },

    /// Writing the ledger file failed
    #[error("Failed to write ledger file {path}: {reason}")]
    WriteFailed {
        /// Path of the ledger file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// Version suffix errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Suffix string does not follow `b<N>-<commit>`
    #[error("Invalid version suffix '{suffix}': {reason}")]
    InvalidSuffix {
        /// Offending suffix
        suffix: String,
        /// Reason for the error
        reason: String,
    },
}

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Git executable could not be started
    #[error("Failed to run '{command}': {reason}")]
    SpawnFailed {
        /// Command line that was attempted
        command: String,
        /// Reason for the error
        reason: String,
    },

    /// Git exited with a non-zero status
    #[error("'{command}' failed in {dir}: {stderr}")]
    CommandFailed {
        /// Command line that failed
        command: String,
        /// Working directory of the command
        dir: PathBuf,
        /// Captured standard error
        stderr: String,
    },

    /// Mirror path exists but is not a directory
    #[error("Mirror path {path} exists but is not a directory")]
    NotADirectory {
        /// Offending path
        path: PathBuf,
    },

    /// Mirror directory exists but is not the root of a git working copy
    #[error("Mirror path {path} is not a git repository root; refusing to reset it")]
    NotARepository {
        /// Offending path
        path: PathBuf,
    },
}

/// Configuration errors; always fatal and raised before any remote interaction
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required value absent or blank
    #[error("Missing {name}. {hint}")]
    MissingValue {
        /// Human-readable name of the value
        name: String,
        /// How to supply it
        hint: String,
    },

    /// Value present but malformed
    #[error("Invalid {name} '{value}': {reason}")]
    InvalidValue {
        /// Human-readable name of the value
        name: String,
        /// Offending value
        value: String,
        /// Reason for the error
        reason: String,
    },
}

/// Remote staging service errors
#[derive(Error, Debug)]
pub enum StagingError {
    /// Transport-level failure
    #[error("Staging request '{operation}' failed: {reason}")]
    RequestFailed {
        /// Operation that failed
        operation: String,
        /// Reason for the error
        reason: String,
    },

    /// Service answered with a non-success status
    #[error("Staging request '{operation}' returned HTTP {status}: {body}")]
    UnexpectedStatus {
        /// Operation that failed
        operation: String,
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// Staging profile unknown to the service
    #[error("Staging profile '{profile}' not found")]
    ProfileNotFound {
        /// Profile name
        profile: String,
    },

    /// Finalization requires exactly one staging repository
    #[error("Expected exactly one staging repository for profile '{profile}', found {count}")]
    UnexpectedRepositoryCount {
        /// Profile name
        profile: String,
        /// Number of repositories found
        count: usize,
    },

    /// Repository did not reach the closed state (e.g. rule failures)
    #[error("Staging repository '{repository}' is '{state}' after close; expected 'closed'")]
    CloseFailed {
        /// Repository id
        repository: String,
        /// State reported by the service
        state: String,
    },

    /// Repository did not settle after closing
    #[error("Staging repository '{repository}' still transitioning after {attempts} checks")]
    TransitionTimeout {
        /// Repository id
        repository: String,
        /// Number of checks made
        attempts: u32,
    },
}

/// Artifact signing errors
#[derive(Error, Debug)]
pub enum SignError {
    /// gpg executable not on PATH
    #[error("Signing tool '{tool}' not found on PATH")]
    ToolNotFound {
        /// Tool name
        tool: String,
    },

    /// gpg exited with a non-zero status
    #[error("Signing {path} failed: {reason}")]
    CommandFailed {
        /// File being signed
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// gpg succeeded but produced no signature file
    #[error("Expected signature {signature} was not produced")]
    SignatureMissing {
        /// Path where the signature was expected
        signature: PathBuf,
    },
}

/// Artifact upload errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// Artifact path is not a readable file
    #[error("Artifact {path} is not a file")]
    InvalidArtifact {
        /// Offending path
        path: PathBuf,
    },

    /// Upload transport failure
    #[error("Upload of {location} failed: {reason}")]
    UploadFailed {
        /// Remote location
        location: String,
        /// Reason for the error
        reason: String,
    },

    /// Repository rejected the upload
    #[error("Upload of {location} rejected with HTTP {status}")]
    Rejected {
        /// Remote location
        location: String,
        /// HTTP status code
        status: u16,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Requested product has no ledger entry
    #[error("No ledger entry for '{name}'")]
    UnknownProduct {
        /// Product name
        name: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Ledger(LedgerError::BuildNumberNotFound { name }) => vec![
                format!("Initialize version tracking: release_steward bump {}", name),
                "Run the release steps in order: bump, then suffix/publish".to_string(),
            ],
            ReleaseError::Ledger(LedgerError::Corrupted { path, .. }) => vec![
                format!("Inspect the ledger: git diff -- {}", path.display()),
                format!("Restore the last staged version: git checkout -- {}", path.display()),
            ],
            ReleaseError::Config(ConfigError::MissingValue { .. }) => vec![
                "Pass the value on the command line or export the matching environment variable"
                    .to_string(),
                "See release_steward publish --help for the supported variables".to_string(),
            ],
            ReleaseError::Git(GitError::SpawnFailed { .. }) => vec![
                "Ensure git is installed and on PATH".to_string(),
            ],
            ReleaseError::Git(GitError::CommandFailed { dir, .. }) => vec![
                format!("Inspect the working copy: git -C {} status", dir.display()),
                "Use --no-stage when the workspace is not under version control".to_string(),
            ],
            ReleaseError::Git(GitError::NotARepository { path }) => vec![
                format!("Remove or move aside {} so it can be cloned fresh", path.display()),
            ],
            ReleaseError::Sign(SignError::ToolNotFound { .. }) => vec![
                "Install GnuPG and make sure gpg is on PATH".to_string(),
            ],
            ReleaseError::Staging(StagingError::UnexpectedRepositoryCount { profile, .. }) => vec![
                format!(
                    "Drop stale staging repositories for profile '{}' in the staging UI",
                    profile
                ),
                "Re-run the release once a single staging repository remains".to_string(),
            ],
            ReleaseError::Staging(StagingError::UnexpectedStatus { status: 401, .. })
            | ReleaseError::Publish(PublishError::Rejected { status: 401, .. }) => vec![
                "Verify the staging username and password".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ReleaseError::Config(_)
                | ReleaseError::Ledger(LedgerError::BuildNumberNotFound { .. })
                | ReleaseError::Ledger(LedgerError::Corrupted { .. })
                | ReleaseError::Ledger(LedgerError::InvalidAttribute { .. })
                | ReleaseError::Sign(SignError::ToolNotFound { .. })
                | ReleaseError::Staging(StagingError::ProfileNotFound { .. })
        )
    }
}
