//! Staging of rewritten files into the enclosing git index.

use super::GitCommand;
use crate::error::Result;
use std::path::Path;

/// Adds a rewritten file to version control (without committing it)
pub trait Stager {
    /// Stage `path` in the working tree that contains it
    fn stage(&self, path: &Path) -> Result<()>;
}

/// Stages files with `git add`
#[derive(Debug, Clone, Copy, Default)]
pub struct GitStager;

impl Stager for GitStager {
    fn stage(&self, path: &Path) -> Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().unwrap_or(path.as_os_str());
        GitCommand::new(dir).arg("add").arg("--").arg(file_name).run()
    }
}

/// Leaves files unstaged, for workspaces outside version control
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStager;

impl Stager for NoopStager {
    fn stage(&self, path: &Path) -> Result<()> {
        log::debug!("Staging disabled; leaving {} unstaged", path.display());
        Ok(())
    }
}

impl<S: Stager + ?Sized> Stager for Box<S> {
    fn stage(&self, path: &Path) -> Result<()> {
        (**self).stage(path)
    }
}
