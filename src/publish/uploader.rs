//! HTTP PUT uploader with checksum sidecars.

use crate::config::ReleaseTarget;
use crate::error::{PublishError, Result};
use crate::sign::Signer;
use bytes::Bytes;
use sha1::Digest as _;
use std::path::Path;

/// Version label for artifacts: `<base>-<suffix>`, or just the suffix
pub fn release_version(base: Option<&str>, suffix: &str) -> String {
    match base.map(str::trim) {
        Some(base) if !base.is_empty() => format!("{}-{}", base, suffix),
        _ => suffix.to_string(),
    }
}

/// Repository coordinates of one product release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCoordinates {
    /// Dotted group, e.g. `org.acme`
    pub group: String,
    /// Product (artifact) name
    pub product: String,
    /// Release version
    pub version: String,
}

impl ArtifactCoordinates {
    /// Repository-relative location of `file_name`
    pub fn remote_path(&self, file_name: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group.replace('.', "/"),
            self.product,
            self.version,
            file_name
        )
    }
}

/// Hex digests uploaded next to each file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksums {
    /// MD5 hex digest
    pub md5: String,
    /// SHA-1 hex digest
    pub sha1: String,
}

impl Checksums {
    /// Digests of `data`
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = sha1::Sha1::new();
        hasher.update(data);
        Self {
            md5: hex::encode(md5::compute(data).0),
            sha1: hex::encode(hasher.finalize()),
        }
    }
}

/// Uploads artifacts into a release target
#[derive(Debug, Clone)]
pub struct ArtifactUploader {
    http: reqwest::Client,
}

impl ArtifactUploader {
    /// Uploader identifying itself as `user_agent`
    pub fn new(user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| PublishError::UploadFailed {
                location: "<client>".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { http })
    }

    /// Upload `artifact`, its signature if present, and checksums; returns the locations written
    pub async fn upload(
        &self,
        target: &ReleaseTarget,
        coordinates: &ArtifactCoordinates,
        artifact: &Path,
    ) -> Result<Vec<String>> {
        let file_name = artifact
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|_| artifact.is_file())
            .ok_or_else(|| PublishError::InvalidArtifact {
                path: artifact.to_path_buf(),
            })?;

        let mut files = vec![(file_name.to_string(), artifact.to_path_buf())];
        let signature = Signer::signature_path(artifact);
        if signature.is_file() {
            files.push((format!("{}.asc", file_name), signature));
        }

        let mut uploaded = Vec::new();
        for (name, path) in files {
            let data = Bytes::from(tokio::fs::read(&path).await?);
            let checksums = Checksums::of(&data);

            uploaded.push(self.put(target, &coordinates.remote_path(&name), data).await?);
            uploaded.push(
                self.put(
                    target,
                    &coordinates.remote_path(&format!("{}.md5", name)),
                    Bytes::from(checksums.md5),
                )
                .await?,
            );
            uploaded.push(
                self.put(
                    target,
                    &coordinates.remote_path(&format!("{}.sha1", name)),
                    Bytes::from(checksums.sha1),
                )
                .await?,
            );
        }

        Ok(uploaded)
    }

    async fn put(&self, target: &ReleaseTarget, remote_path: &str, body: Bytes) -> Result<String> {
        let location = format!("{}/{}", target.url.trim_end_matches('/'), remote_path);
        log::debug!("PUT {} ({} bytes)", location, body.len());

        let mut request = self.http.put(&location).body(body);
        if let Some(username) = &target.username {
            request = request.basic_auth(username, target.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| PublishError::UploadFailed {
                location: location.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(PublishError::Rejected {
                location,
                status: response.status().as_u16(),
            }
            .into());
        }

        Ok(location)
    }
}
