//! `ispawn list`: List the containers of a user.

use clap::Args;
use ispawn_common::config::InstallScope;
use ispawn_plan::labels;
use ispawn_runtime::backend::ContainerSummary;

use crate::context::Session;
use crate::output;

/// Arguments for the `list` command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show stopped containers too.
    #[arg(short, long)]
    pub all: bool,

    /// List the runs of this user; defaults to the invoking user.
    #[arg(short, long)]
    pub user: Option<String>,
}

/// Executes the `list` command.
///
/// # Errors
///
/// Returns an error if the configuration or the engine cannot be reached.
pub fn execute(args: ListArgs, scope: Option<InstallScope>) -> anyhow::Result<()> {
    let session = Session::open(scope, args.user.as_deref())?;
    let containers = session
        .engine
        .list(&session.container_prefix())
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let rows: Vec<Vec<String>> = containers
        .iter()
        .filter(|c| args.all || c.is_running())
        .filter_map(|c| session.run_of(c).map(|run| row(run, c)))
        .collect();
    if rows.is_empty() {
        println!("No containers found.");
        return Ok(());
    }
    print!("{}", output::table(&["RUN", "STATE", "SERVICES", "URLS"], &rows));
    Ok(())
}

/// Table row of one container; URLs are recovered from its router rules.
fn row(run: &str, container: &ContainerSummary) -> Vec<String> {
    let urls: Vec<String> = labels::routed_domains(&container.labels)
        .into_iter()
        .map(|domain| format!("https://{domain}"))
        .collect();
    vec![
        run.to_owned(),
        container.state.clone(),
        labels::labelled_services(&container.labels).join(","),
        urls.join(" "),
    ]
}
