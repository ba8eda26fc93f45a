//! Upstream repository mirrors.
//!
//! A mirror is a local working copy under `projects/<category>/<name>` that is
//! forced to match the remote tip of its tracked branch. Local modifications
//! in a mirror are discarded.

use crate::config::WorkspaceConfig;
use crate::error::{GitError, Result};
use crate::git::{self, GitCommand, Stager};
use crate::ledger::{BRANCH_KEY, COMMIT_KEY, LedgerStore};
use std::fs;
use std::path::{Path, PathBuf};

/// Branch used when none is requested
pub const DEFAULT_BRANCH: &str = "master";

/// Working copy state after a mirror operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorState {
    /// Working copy location
    pub path: PathBuf,
    /// HEAD commit after synchronization
    pub commit: String,
    /// Tracked branch
    pub branch: String,
    /// True when the mirror was freshly cloned
    pub cloned: bool,
}

/// Keeps mirrors of upstream repositories in the workspace
#[derive(Debug, Clone, Copy)]
pub struct RepoMirror<'a> {
    config: &'a WorkspaceConfig,
}

impl<'a> RepoMirror<'a> {
    /// Mirrors rooted at `config.repository_dir`
    pub fn new(config: &'a WorkspaceConfig) -> Self {
        Self { config }
    }

    /// Clone `url` if absent, otherwise reset the copy to `origin/<branch>`
    pub fn ensure_mirror(
        &self,
        category: &str,
        name: &str,
        url: &str,
        branch: &str,
        shallow: bool,
    ) -> Result<MirrorState> {
        let category_dir = self.config.category_path(category);
        fs::create_dir_all(&category_dir)?;
        let local_dir = self.config.product_path(category, name);

        let cloned = if local_dir.exists() {
            if !local_dir.is_dir() {
                return Err(GitError::NotADirectory { path: local_dir }.into());
            }
            // git would otherwise walk up into the enclosing workspace repository
            if !is_repository_root(&local_dir)? {
                return Err(GitError::NotARepository { path: local_dir }.into());
            }
            log::info!(
                "Mirror {}:{} exists at {}; fetching",
                category,
                name,
                local_dir.display()
            );
            self.refresh(&local_dir, branch)?;
            false
        } else {
            log::info!(
                "Mirror {}:{} missing; cloning {} into {}",
                category,
                name,
                url,
                local_dir.display()
            );
            let mut clone = GitCommand::new(&category_dir).arg("clone");
            if shallow {
                clone = clone.args(["--depth", "1"]);
            }
            clone.args(["--branch", branch]).arg(url).arg(name).run()?;
            true
        };

        Ok(MirrorState {
            commit: git::head_commit(&local_dir)?,
            path: local_dir,
            branch: branch.to_string(),
            cloned,
        })
    }

    fn refresh(&self, local_dir: &Path, branch: &str) -> Result<()> {
        GitCommand::new(local_dir).args(["clean", "-f", "-d", "-x"]).run()?;
        GitCommand::new(local_dir).args(["checkout", branch]).run()?;
        GitCommand::new(local_dir).args(["fetch", "--prune"]).run()?;
        GitCommand::new(local_dir)
            .args(["reset", "--hard"])
            .arg(format!("origin/{}", branch))
            .run()
    }
}

/// True when `dir` is the top level of its own git working copy
fn is_repository_root(dir: &Path) -> Result<bool> {
    if !dir.join(".git").exists() {
        return Ok(false);
    }
    let toplevel = GitCommand::new(dir)
        .args(["rev-parse", "--show-toplevel"])
        .output()?;
    Ok(fs::canonicalize(&toplevel)? == fs::canonicalize(dir)?)
}

/// Record the mirror's commit and branch; returns true if the ledger changed
pub fn sync_provenance<S: Stager>(
    ledger: &LedgerStore<S>,
    name: &str,
    state: &MirrorState,
) -> Result<bool> {
    let commit_changed = ledger.record_attribute(name, COMMIT_KEY, state.commit.as_str())?;
    let branch_changed = ledger.record_attribute(name, BRANCH_KEY, state.branch.as_str())?;
    Ok(commit_changed || branch_changed)
}
