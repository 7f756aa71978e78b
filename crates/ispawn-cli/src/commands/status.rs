//! `ispawn status`: Show the state and URLs of one run.

use clap::Args;
use ispawn_common::config::InstallScope;
use ispawn_plan::labels;

use crate::commands::RunTarget;
use crate::context::Session;
use crate::output::{BOLD, CYAN, DIM, GREEN, RESET, YELLOW};

/// Arguments for the `status` command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Run to inspect.
    #[command(flatten)]
    pub target: RunTarget,
}

/// Executes the `status` command.
///
/// # Errors
///
/// Returns an error if the run has no container or the engine fails.
pub fn execute(args: StatusArgs, scope: Option<InstallScope>) -> anyhow::Result<()> {
    let session = Session::open(scope, args.target.user.as_deref())?;
    let name = session.container(&args.target.name);
    let container = session
        .engine
        .status(&name)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let color = if container.is_running() { GREEN } else { YELLOW };
    eprintln!("  {BOLD}{}{RESET} {color}{}{RESET}", container.name, container.state);
    eprintln!("  {DIM}image:{RESET} {}", container.image);
    let services = labels::labelled_services(&container.labels);
    if !services.is_empty() {
        eprintln!("  {DIM}services:{RESET} {}", services.join(", "));
    }
    for domain in labels::routed_domains(&container.labels) {
        eprintln!("  {CYAN}https://{domain}{RESET}");
    }
    Ok(())
}
