//! `ispawn logs`: View the logs of a run.

use clap::Args;
use ispawn_common::config::InstallScope;
use ispawn_runtime::logs;

use crate::commands::RunTarget;
use crate::context::Session;

/// Arguments for the `logs` command.
#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Run whose logs are shown.
    #[command(flatten)]
    pub target: RunTarget,
}

/// Executes the `logs` command.
///
/// Prints the engine log of the container, when it still exists, then
/// every file of the run's latest log directory.
///
/// # Errors
///
/// Returns an error if the engine or the log files cannot be read.
pub fn execute(args: LogsArgs, scope: Option<InstallScope>) -> anyhow::Result<()> {
    let session = Session::open(scope, args.target.user.as_deref())?;
    let container = session.container(&args.target.name);
    let run_logs = logs::collect(
        &session.engine,
        &session.layout(),
        &container,
        &args.target.name,
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    if run_logs.engine.is_none() && run_logs.files.is_empty() {
        println!("No logs available for run: {}", args.target.name);
        return Ok(());
    }
    if let Some(engine_log) = &run_logs.engine {
        println!("==> {container} <==");
        print!("{engine_log}");
    }
    for (path, contents) in &run_logs.files {
        println!("==> {} <==", path.display());
        print!("{contents}");
    }
    Ok(())
}
