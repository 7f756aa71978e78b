//! CLI command definitions and dispatch.

pub mod build;
pub mod images;
pub mod list;
pub mod logs;
pub mod remove;
pub mod run;
pub mod setup;
pub mod status;
pub mod stop;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ispawn_common::config::InstallScope;

/// ispawn: routed service containers from one persisted configuration.
#[derive(Parser, Debug)]
#[command(name = "ispawn", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Configuration scope to use; defaults to system for root, else user.
    #[arg(long, global = true, value_enum)]
    pub scope: Option<ScopeArg>,
}

/// `--scope` values.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeArg {
    /// `/etc/ispawn`, requires root to write.
    System,
    /// `$HOME/.ispawn`.
    User,
}

impl From<ScopeArg> for InstallScope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::System => Self::System,
            ScopeArg::User => Self::User,
        }
    }
}

/// Addresses one run of a user.
#[derive(Args, Debug)]
pub struct RunTarget {
    /// Run name.
    pub name: String,

    /// Owner of the run; defaults to the invoking user.
    #[arg(short, long)]
    pub user: Option<String>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate and persist the configuration, then create the network.
    Setup(setup::SetupArgs),
    /// Build the image of a base image and a service set.
    Build(build::BuildArgs),
    /// Plan and launch a container.
    Run(run::RunArgs),
    /// List the containers of a user.
    List(list::ListArgs),
    /// Stop containers.
    Stop(stop::StopArgs),
    /// Remove containers.
    Remove(remove::RemoveArgs),
    /// Show the state and URLs of one run.
    Status(status::StatusArgs),
    /// Print the engine log and log files of a run.
    Logs(logs::LogsArgs),
    /// List or remove the images of the namespace.
    Images(images::ImagesArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let scope = cli.scope.map(InstallScope::from);
    match cli.command {
        Command::Setup(args) => setup::execute(args, scope),
        Command::Build(args) => build::execute(args, scope),
        Command::Run(args) => run::execute(args, scope),
        Command::List(args) => list::execute(args, scope),
        Command::Stop(args) => stop::execute(args, scope),
        Command::Remove(args) => remove::execute(args, scope),
        Command::Status(args) => status::execute(args, scope),
        Command::Logs(args) => logs::execute(args, scope),
        Command::Images(args) => images::execute(args, scope),
    }
}
