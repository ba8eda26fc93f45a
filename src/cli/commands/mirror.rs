//! Mirror command implementation.

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::ledger::LedgerStore;
use crate::mirror::{RepoMirror, sync_provenance};

/// Execute mirror command
pub(super) fn execute_mirror(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Mirror {
        category,
        name,
        url,
        branch,
        full_history,
    } = &args.command
    else {
        unreachable!("execute_mirror called with non-Mirror command");
    };

    let workspace = args.workspace_config()?;
    config.progress_println(&format!("Synchronizing {}:{} from {}", category, name, url));

    let state = RepoMirror::new(&workspace).ensure_mirror(category, name, url, branch, !full_history)?;
    let verb = if state.cloned { "Cloned" } else { "Updated" };
    config.success_println(&format!(
        "{} {} at {} ({})",
        verb,
        name,
        state.commit,
        state.path.display()
    ));

    let ledger = LedgerStore::from_config(&workspace);
    if sync_provenance(&ledger, name, &state)? {
        config.verbose_println(&format!("Recorded {}@{} in {}", branch, state.commit, ledger.path().display()));
    } else {
        config.verbose_println("Ledger already up to date");
    }

    Ok(())
}
