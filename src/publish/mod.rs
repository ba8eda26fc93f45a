//! Artifact publication into a Maven-layout release target.
//!
//! Artifacts are uploaded with HTTP PUT alongside their signatures and
//! checksum sidecars.

mod uploader;

pub use uploader::{ArtifactCoordinates, ArtifactUploader, Checksums, release_version};
