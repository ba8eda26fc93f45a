//! Staging release coordinator.
//!
//! One release walks Waiting -> Configuring -> Uploading -> Finalizing. The
//! release target is substituted through a [`TargetGuard`], so the original
//! target is back in place on every exit path: success, error, panic, or the
//! release future being dropped.

use super::service::StagingService;
use super::sleeper::{Sleeper, TokioSleeper};
use crate::config::{ReleaseTarget, StagingConfig};
use crate::error::Result;
use std::future::Future;

/// Serializes staging releases for one profile
#[derive(Debug)]
pub struct StagingCoordinator<'a, S, P = TokioSleeper> {
    service: &'a S,
    config: &'a StagingConfig,
    sleeper: P,
}

impl<'a, S: StagingService> StagingCoordinator<'a, S> {
    /// Coordinator that sleeps on the tokio timer between polls
    pub fn new(service: &'a S, config: &'a StagingConfig) -> Self {
        Self::with_sleeper(service, config, TokioSleeper)
    }
}

impl<'a, S: StagingService, P: Sleeper> StagingCoordinator<'a, S, P> {
    /// Coordinator with an explicit sleeper
    pub fn with_sleeper(service: &'a S, config: &'a StagingConfig, sleeper: P) -> Self {
        Self {
            service,
            config,
            sleeper,
        }
    }

    /// Block until `profile` holds no staging repository; returns the number of waits
    ///
    /// There is no upper bound: an occupied slot means another release is in
    /// progress elsewhere and is simply waited out.
    pub async fn wait_for_free_slot(&self, profile: &str) -> Result<u64> {
        let mut waits = 0u64;
        loop {
            let count = self.service.list_staging_repositories(profile).await?;
            if count == 0 {
                if waits > 0 {
                    log::info!("Staging slot for {} free after {} waits", profile, waits);
                }
                return Ok(waits);
            }

            waits += 1;
            log::info!(
                "{} staging repositories open for {}; waiting {:?} for the other release",
                count,
                profile,
                self.config.poll_interval
            );
            self.sleeper.sleep(self.config.poll_interval).await;
        }
    }

    /// Run `upload` against the staging endpoint, then release the staged repository
    ///
    /// `target` is replaced by the staging URL and credentials for the duration
    /// of the upload and finalization, and restored verbatim before this returns.
    /// Missing profile, username or password fail before any remote call.
    pub async fn release<F, Fut, T>(&self, target: &mut ReleaseTarget, upload: F) -> Result<T>
    where
        F: FnOnce(ReleaseTarget) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let credentials = self.config.credentials()?;

        self.wait_for_free_slot(&credentials.profile).await?;

        let staged = ReleaseTarget::new(
            self.config.staging_url.as_str(),
            Some(credentials.username.clone()),
            Some(credentials.password.clone()),
        );
        let guard = TargetGuard::substitute(target, staged);
        log::info!("Uploading to staging for profile {}", credentials.profile);

        let value = upload(guard.target().clone()).await?;

        log::info!("Releasing staging repository for {}", credentials.profile);
        self.service
            .release_sole_staging_repository(&credentials.profile)
            .await?;

        drop(guard);
        Ok(value)
    }
}

/// Substitutes a release target and puts the original back when dropped
#[derive(Debug)]
pub struct TargetGuard<'a> {
    slot: &'a mut ReleaseTarget,
    original: Option<ReleaseTarget>,
}

impl<'a> TargetGuard<'a> {
    /// Swap `replacement` into `slot`, remembering the previous value
    pub fn substitute(slot: &'a mut ReleaseTarget, replacement: ReleaseTarget) -> Self {
        let original = std::mem::replace(slot, replacement);
        Self {
            slot,
            original: Some(original),
        }
    }

    /// Target currently in effect
    pub fn target(&self) -> &ReleaseTarget {
        self.slot
    }
}

impl Drop for TargetGuard<'_> {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            *self.slot = original;
            log::info!("Restored release target {}", self.slot.url);
        }
    }
}
