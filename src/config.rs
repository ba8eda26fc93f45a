//! Workspace and staging configuration.
//!
//! Configuration is built once by the CLI layer and handed to each component
//! by reference; nothing here is process-global.

use crate::error::ConfigError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Workspace-relative location of the version ledger
pub const LEDGER_RELATIVE_PATH: &str = "config/versions.json";

/// Workspace-relative directory holding upstream mirrors
pub const REPOSITORY_DIR_NAME: &str = "projects";

/// Fixed deploy endpoint substituted during staging releases
pub const DEFAULT_STAGING_URL: &str =
    "https://oss.sonatype.org/service/local/staging/deploy/maven2/";

/// REST root of the staging service
pub const DEFAULT_SERVICE_URL: &str = "https://oss.sonatype.org/service/local/";

/// Paths of one release workspace
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Workspace root
    pub root: PathBuf,
    /// Version ledger JSON file
    pub ledger_path: PathBuf,
    /// Parent directory of all mirrors
    pub repository_dir: PathBuf,
    /// Stage the ledger into git after each write
    pub stage_ledger: bool,
}

impl WorkspaceConfig {
    /// Standard layout rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            ledger_path: root.join(LEDGER_RELATIVE_PATH),
            repository_dir: root.join(REPOSITORY_DIR_NAME),
            root,
            stage_ledger: true,
        }
    }

    /// Disable or enable git staging of the ledger
    pub fn with_staging(mut self, stage_ledger: bool) -> Self {
        self.stage_ledger = stage_ledger;
        self
    }

    /// Directory holding every mirror of `category`
    pub fn category_path(&self, category: &str) -> PathBuf {
        self.repository_dir.join(category)
    }

    /// Working copy location for `name` within `category`
    pub fn product_path(&self, category: &str, name: &str) -> PathBuf {
        self.category_path(category).join(name)
    }
}

/// Release-target configuration: where artifacts are deployed, and as whom.
///
/// The staging coordinator temporarily substitutes this triple and restores it.
#[derive(Clone, PartialEq, Eq)]
pub struct ReleaseTarget {
    /// Deploy repository URL
    pub url: String,
    /// Deploy username
    pub username: Option<String>,
    /// Deploy password
    pub password: Option<String>,
}

impl ReleaseTarget {
    /// Target with explicit credentials
    pub fn new(url: impl Into<String>, username: Option<String>, password: Option<String>) -> Self {
        Self {
            url: url.into(),
            username,
            password,
        }
    }
}

impl fmt::Debug for ReleaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseTarget")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Settings for a staging release
#[derive(Clone)]
pub struct StagingConfig {
    /// Staging profile name
    pub profile: Option<String>,
    /// Staging username
    pub username: Option<String>,
    /// Staging password
    pub password: Option<String>,
    /// Deploy URL substituted during upload
    pub staging_url: Url,
    /// REST root of the staging service
    pub service_url: Url,
    /// Delay between checks while another release holds the slot
    pub poll_interval: Duration,
    /// Upper bound on checks while a repository closes
    pub transition_attempts: u32,
    /// User-Agent sent to the staging service
    pub user_agent: String,
}

impl fmt::Debug for StagingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagingConfig")
            .field("profile", &self.profile)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("staging_url", &self.staging_url.as_str())
            .field("service_url", &self.service_url.as_str())
            .field("poll_interval", &self.poll_interval)
            .field("transition_attempts", &self.transition_attempts)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            profile: None,
            username: None,
            password: None,
            staging_url: Url::parse(DEFAULT_STAGING_URL).expect("default staging URL is valid"),
            service_url: Url::parse(DEFAULT_SERVICE_URL).expect("default service URL is valid"),
            poll_interval: Duration::from_secs(1),
            transition_attempts: 120,
            user_agent: default_user_agent(),
        }
    }
}

/// Validated staging credentials
#[derive(Clone, PartialEq, Eq)]
pub struct StagingCredentials {
    /// Staging profile name
    pub profile: String,
    /// Staging username
    pub username: String,
    /// Staging password
    pub password: String,
}

impl fmt::Debug for StagingCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagingCredentials")
            .field("profile", &self.profile)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl StagingConfig {
    /// Profile, username and password, or the first one missing
    pub fn credentials(&self) -> Result<StagingCredentials, ConfigError> {
        let profile = required(&self.profile, "staging profile name", "STAGING_PROFILE")?;
        let username = required(&self.username, "staging username", "STAGING_USERNAME")?;
        let password = required(&self.password, "staging password", "STAGING_PASSWORD")?;

        Ok(StagingCredentials {
            profile,
            username,
            password,
        })
    }
}

/// Parse an endpoint URL, naming the setting in the error
pub fn parse_endpoint(name: &str, value: &str) -> Result<Url, ConfigError> {
    // Relative joins drop the last segment unless the base ends with '/'
    let normalized = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{}/", value)
    };

    Url::parse(&normalized).map_err(|e| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn required(value: &Option<String>, name: &str, env_var: &str) -> Result<String, ConfigError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingValue {
            name: name.to_string(),
            hint: format!("Set {} or pass it on the command line.", env_var),
        }),
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
