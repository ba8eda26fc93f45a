//! Version ledger: per-product build numbers and commit provenance.
//!
//! The ledger is a single pretty-printed JSON document inside the workspace.
//! Each mutation rewrites the document in full and stages it into git, so the
//! ledger history travels with the workspace's own commits.

mod record;
mod store;

pub use record::{BRANCH_KEY, BUILD_NUMBER_KEY, COMMIT_KEY, Ledger, VersionRecord};
pub use store::LedgerStore;
