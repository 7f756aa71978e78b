//! `ispawn stop`: Stop running containers.

use clap::Args;
use ispawn_common::config::InstallScope;

use crate::context::Session;
use crate::output::{GREEN, RESET};

/// Arguments for the `stop` command.
#[derive(Args, Debug)]
pub struct StopArgs {
    /// Run names to stop.
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Owner of the runs; defaults to the invoking user.
    #[arg(short, long)]
    pub user: Option<String>,
}

/// Executes the `stop` command.
///
/// Stopping a stopped container succeeds without engine action.
///
/// # Errors
///
/// Returns an error if a run has no container or the engine fails.
pub fn execute(args: StopArgs, scope: Option<InstallScope>) -> anyhow::Result<()> {
    let session = Session::open(scope, args.user.as_deref())?;
    for name in &args.names {
        let container = session.container(name);
        session
            .engine
            .stop(&container)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        eprintln!("  {GREEN}✓{RESET} {container} stopped");
    }
    Ok(())
}
