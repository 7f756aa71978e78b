//! `ispawn remove`: Remove containers.

use clap::Args;
use ispawn_common::config::InstallScope;

use crate::context::Session;
use crate::output::{GREEN, RESET};

/// Arguments for the `remove` command.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Run names to remove.
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Remove running containers too.
    #[arg(short, long)]
    pub force: bool,

    /// Owner of the runs; defaults to the invoking user.
    #[arg(short, long)]
    pub user: Option<String>,
}

/// Executes the `remove` command.
///
/// Host directories and log directories of the runs are kept.
///
/// # Errors
///
/// Returns an error if a run has no container, is running without
/// `--force`, or the engine fails.
pub fn execute(args: RemoveArgs, scope: Option<InstallScope>) -> anyhow::Result<()> {
    let session = Session::open(scope, args.user.as_deref())?;
    for name in &args.names {
        let container = session.container(name);
        session
            .engine
            .remove(&container, args.force)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        eprintln!("  {GREEN}✓{RESET} {container} removed");
    }
    Ok(())
}
