//! Git plumbing for release operations.
//!
//! All commands run against an explicit working directory (`git -C <dir>`);
//! the process working directory is never changed.

mod command;
mod stager;

pub use command::GitCommand;
pub use stager::{GitStager, NoopStager, Stager};

use crate::error::Result;
use std::path::Path;

/// Full SHA of HEAD in the working copy at `dir`
pub fn head_commit(dir: &Path) -> Result<String> {
    GitCommand::new(dir).args(["rev-parse", "HEAD"]).output()
}

/// Checked-out branch of the working copy at `dir` (`HEAD` when detached)
pub fn current_branch(dir: &Path) -> Result<String> {
    GitCommand::new(dir)
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .output()
}
