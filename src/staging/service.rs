//! Operations consumed from the remote staging service.

use crate::error::Result;
use std::future::Future;

/// Remote staging-and-release service
pub trait StagingService {
    /// Number of staging repositories currently held by `profile`
    fn list_staging_repositories(&self, profile: &str) -> impl Future<Output = Result<usize>>;

    /// Promote the one staging repository of `profile` to release
    fn release_sole_staging_repository(&self, profile: &str) -> impl Future<Output = Result<()>>;
}

impl<S: StagingService> StagingService for &S {
    async fn list_staging_repositories(&self, profile: &str) -> Result<usize> {
        (**self).list_staging_repositories(profile).await
    }

    async fn release_sole_staging_repository(&self, profile: &str) -> Result<()> {
        (**self).release_sole_staging_repository(profile).await
    }
}
