//! Publish command implementation.
//!
//! Signs the artifacts, then hands the upload to the staging coordinator so
//! that the release target is swapped to the staging endpoint only while the
//! profile's single slot is ours.

use crate::cli::{Args, PublishArgs, RuntimeConfig};
use crate::config::{ReleaseTarget, StagingConfig, parse_endpoint};
use crate::error::{PublishError, ReleaseError, Result};
use crate::ledger::LedgerStore;
use crate::publish::{ArtifactCoordinates, ArtifactUploader, release_version};
use crate::sign::Signer;
use crate::staging::{NexusStagingClient, StagingCoordinator};
use crate::version::VersionPolicy;
use std::time::Duration;

/// Execute publish command
pub(super) async fn execute_publish(
    args: &Args,
    publish: &PublishArgs,
    config: &RuntimeConfig,
) -> Result<()> {
    let staging = StagingConfig {
        profile: publish.profile.clone(),
        username: publish.username.clone(),
        password: publish.password.clone(),
        staging_url: parse_endpoint("staging URL", &publish.staging_url)?,
        service_url: parse_endpoint("staging service URL", &publish.service_url)?,
        poll_interval: Duration::from_secs(publish.poll_interval_secs),
        ..StagingConfig::default()
    };
    // Fail on missing credentials before touching the ledger or signing
    let credentials = staging.credentials()?;
    let signer = Signer::new(publish.signing_key.as_deref())?;

    for artifact in &publish.artifacts {
        if !artifact.is_file() {
            return Err(PublishError::InvalidArtifact {
                path: artifact.clone(),
            }
            .into());
        }
    }

    let ledger = LedgerStore::from_config(&args.workspace_config()?);
    if publish.bump {
        let build_number = ledger.increment_build_number(&publish.name)?;
        config.verbose_println(&format!("{} is now at build {}", publish.name, build_number));
    }
    let suffix = VersionPolicy::new(&ledger).version_suffix(&publish.name)?;
    let coordinates = ArtifactCoordinates {
        group: publish.group.clone(),
        product: publish.name.clone(),
        version: release_version(publish.base_version.as_deref(), &suffix),
    };
    config.progress_println(&format!(
        "Publishing {}:{}:{}",
        coordinates.group, coordinates.product, coordinates.version
    ));

    for artifact in &publish.artifacts {
        let signature = signer.sign(artifact).await?;
        config.verbose_println(&format!("Signed {}", signature.display()));
    }

    let client = NexusStagingClient::new(&staging, &credentials)?;
    let coordinator = StagingCoordinator::new(&client, &staging);
    let uploader = ArtifactUploader::new(&staging.user_agent)?;
    let mut target = ReleaseTarget::new(publish.release_url.clone().unwrap_or_default(), None, None);

    let uploader = &uploader;
    let coordinates = &coordinates;
    let artifacts = &publish.artifacts;
    let uploaded = coordinator
        .release(&mut target, move |staged: ReleaseTarget| async move {
            let mut locations = Vec::new();
            for artifact in artifacts {
                locations.extend(uploader.upload(&staged, coordinates, artifact).await?);
            }
            Ok::<_, ReleaseError>(locations)
        })
        .await?;

    for location in &uploaded {
        config.indent(location);
    }
    config.verbose_println(&format!("Release target restored to '{}'", target.url));
    config.success_println(&format!(
        "Released {} files for {} {}",
        uploaded.len(),
        coordinates.product,
        coordinates.version
    ));
    Ok(())
}
