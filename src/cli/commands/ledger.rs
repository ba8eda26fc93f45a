//! Ledger command implementations: record, bump, suffix and show.

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{CliError, Result};
use crate::ledger::{BRANCH_KEY, COMMIT_KEY, LedgerStore};
use crate::version::VersionPolicy;
use serde_json::Value;

/// Execute record command
pub(super) fn execute_record(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Record { name, key, value } = &args.command else {
        unreachable!("execute_record called with non-Record command");
    };

    let ledger = LedgerStore::from_config(&args.workspace_config()?);
    if ledger.record_attribute(name, key, parse_value(key, value))? {
        config.success_println(&format!("Recorded {}.{} = {}", name, key, value));
    } else {
        config.println(&format!("{}.{} unchanged", name, key));
    }
    Ok(())
}

/// Execute bump command
pub(super) fn execute_bump(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Bump { name } = &args.command else {
        unreachable!("execute_bump called with non-Bump command");
    };

    let ledger = LedgerStore::from_config(&args.workspace_config()?);
    let build_number = ledger.increment_build_number(name)?;
    config.verbose_println(&format!("{} is now at build {}", name, build_number));
    config.data_println(&build_number.to_string())?;
    Ok(())
}

/// Execute suffix command
pub(super) fn execute_suffix(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Suffix { name } = &args.command else {
        unreachable!("execute_suffix called with non-Suffix command");
    };

    let ledger = LedgerStore::from_config(&args.workspace_config()?);
    let suffix = VersionPolicy::new(&ledger).version_suffix(name)?;
    config.data_println(&suffix)?;
    Ok(())
}

/// Execute show command
pub(super) fn execute_show(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Show { name } = &args.command else {
        unreachable!("execute_show called with non-Show command");
    };

    let ledger = LedgerStore::from_config(&args.workspace_config()?);
    let rendered = match name {
        Some(name) => {
            let record = ledger.load(name)?;
            if record.is_empty() {
                return Err(CliError::UnknownProduct { name: name.clone() }.into());
            }
            serde_json::to_string_pretty(&record)?
        }
        None => serde_json::to_string_pretty(&ledger.load_all()?)?,
    };
    config.data_println(&rendered)?;
    Ok(())
}

/// Commit and branch are always strings; other values are JSON when they parse
fn parse_value(key: &str, raw: &str) -> Value {
    if key == COMMIT_KEY || key == BRANCH_KEY {
        return Value::String(raw.to_string());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
