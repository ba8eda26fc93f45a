//! Staging releases serialized through the remote staging service.
//!
//! The remote service's own staging-repository list acts as a cross-process
//! mutex: a release waits until no staging repository exists for its profile,
//! uploads under a substituted release target, then releases the single
//! repository its upload created.

mod coordinator;
mod nexus;
mod service;
mod sleeper;

pub use coordinator::{StagingCoordinator, TargetGuard};
pub use nexus::NexusStagingClient;
pub use service::StagingService;
pub use sleeper::{Sleeper, TokioSleeper};
