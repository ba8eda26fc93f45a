//! Detached GnuPG signatures for release artifacts.

use crate::error::{ConfigError, Result, SignError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Produces `<file>.asc` armored detached signatures
#[derive(Debug, Clone)]
pub struct Signer {
    identity: String,
    gpg: PathBuf,
}

impl Signer {
    /// Signer using key `identity`; fails if it is missing or gpg is unavailable
    pub fn new(identity: Option<&str>) -> Result<Self> {
        let identity = match identity.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                return Err(ConfigError::MissingValue {
                    name: "signing identity".to_string(),
                    hint: "Set SIGNING_KEY or pass --signing-key.".to_string(),
                }
                .into());
            }
        };

        let gpg = which::which("gpg").map_err(|_| SignError::ToolNotFound {
            tool: "gpg".to_string(),
        })?;

        Ok(Self { identity, gpg })
    }

    /// Where the signature of `file` is written
    pub fn signature_path(file: &Path) -> PathBuf {
        let mut name = OsString::from(file.as_os_str());
        name.push(".asc");
        PathBuf::from(name)
    }

    /// Sign `file`, returning the signature path
    pub async fn sign(&self, file: &Path) -> Result<PathBuf> {
        let signature = Self::signature_path(file);
        log::info!("Signing {} with {}", file.display(), self.identity);

        let output = Command::new(&self.gpg)
            .args(["--batch", "--yes", "--local-user"])
            .arg(&self.identity)
            .args(["--armor", "--detach-sign"])
            .arg(file)
            .output()
            .await
            .map_err(|e| SignError::CommandFailed {
                path: file.to_path_buf(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(SignError::CommandFailed {
                path: file.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        if !signature.is_file() {
            return Err(SignError::SignatureMissing { signature }.into());
        }

        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;

    #[test]
    fn test_missing_identity_is_configuration_error() {
        for identity in [None, Some(""), Some("  ")] {
            let err = Signer::new(identity).unwrap_err();
            assert!(matches!(err, ReleaseError::Config(ConfigError::MissingValue { .. })));
        }
    }

    #[test]
    fn test_signature_path_appends_extension() {
        assert_eq!(
            Signer::signature_path(Path::new("dist/acme-1.0.jar")),
            PathBuf::from("dist/acme-1.0.jar.asc")
        );
    }
}
