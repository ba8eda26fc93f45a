//! # Release Steward
//!
//! Build-number bookkeeping and staged publication for products mirrored
//! from upstream git repositories.
//!
//! ## Features
//!
//! - **Version Ledger**: per-product build numbers and commit provenance in a
//!   git-tracked JSON file
//! - **Version Suffixes**: `b<buildNumber>-<commit>` identifiers for artifacts
//! - **Mirrors**: upstream working copies forced to the remote branch tip
//! - **Staged Releases**: uploads serialized through a single-slot staging
//!   profile, with the release target always restored afterwards
//!
//! ## Usage
//!
//! ```bash
//! release_steward mirror libs acme https://github.com/acme/acme.git
//! release_steward bump acme
//! release_steward suffix acme          # b1-<commit>
//! release_steward publish acme --group org.acme dist/acme.jar
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod ledger;
pub mod mirror;
pub mod publish;
pub mod sign;
pub mod staging;
pub mod version;

pub use cli::Args;
pub use config::{ReleaseTarget, StagingConfig, WorkspaceConfig};
pub use error::{ReleaseError, Result};
pub use ledger::{LedgerStore, VersionRecord};
pub use mirror::{MirrorState, RepoMirror};
pub use staging::{StagingCoordinator, StagingService};
pub use version::{BuildSuffix, VersionPolicy};
