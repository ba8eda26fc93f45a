//! Command execution functions.
//!
//! Each command reports its own progress; this module validates arguments,
//! dispatches, and turns failures into an exit code with recovery hints.

mod ledger;
mod mirror;
mod publish;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use ledger::{execute_bump, execute_record, execute_show, execute_suffix};
use mirror::execute_mirror;
use publish::execute_publish;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false, false);
        output.error(&validation_error.to_string());
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Mirror { .. } => execute_mirror(&args, &config),
        Command::Record { .. } => execute_record(&args, &config),
        Command::Bump { .. } => execute_bump(&args, &config),
        Command::Suffix { .. } => execute_suffix(&args, &config),
        Command::Show { .. } => execute_show(&args, &config),
        Command::Publish(publish) => execute_publish(&args, publish, &config).await,
    };

    match result {
        Ok(()) => {
            config.verbose_println(&format!(
                "Command '{}' completed successfully",
                args.command.name()
            ));
            Ok(0)
        }
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }
            if e.is_recoverable() {
                config.verbose_println("The failure may be transient; re-running the command is safe");
            }

            Ok(1)
        }
    }
}
