//! `ispawn run`: Plan and launch a service container.

use std::time::Instant;

use clap::Args;
use ispawn_common::config::InstallScope;
use ispawn_common::constants::DEFAULT_BASE_IMAGE;
use ispawn_common::types::Password;
use ispawn_core::identity::SystemIdentityResolver;
use ispawn_plan::image::ImageSelection;
use ispawn_plan::planner::Planner;
use ispawn_plan::request::{IdentityOverride, RunRequest};
use ispawn_runtime::engine::Engine;

use crate::context;
use crate::output::{self, BOLD, DIM, GREEN, RESET};

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run name, unique within the namespace.
    pub name: String,

    /// Base image reference.
    #[arg(short, long, default_value = DEFAULT_BASE_IMAGE)]
    pub base: String,

    /// Service to start (repeatable).
    #[arg(short, long = "service", required = true)]
    pub services: Vec<String>,

    /// Extra volume, `path` or `host:container[:ro|rw]` (repeatable).
    #[arg(short = 'v', long = "volume")]
    pub volumes: Vec<String>,

    /// Run the services as this user.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Group the service user must belong to.
    #[arg(long)]
    pub group: Option<String>,

    /// Grant the service user sudo rights.
    #[arg(long)]
    pub sudo: bool,

    /// Service password; generated when omitted.
    #[arg(long, env = "ISPAWN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Replace an existing container of the same name.
    #[arg(short, long)]
    pub force: bool,

    /// Print the plan as JSON, password redacted, without launching.
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    fn to_request(&self) -> anyhow::Result<RunRequest> {
        let selection = ImageSelection::new(&self.base, &self.services)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        let mut request = RunRequest::new(self.name.clone(), selection)
            .with_volumes(self.volumes.iter().cloned())
            .with_identity(IdentityOverride {
                user: self.user.clone(),
                required_group: self.group.clone(),
                sudo: self.sudo,
            });
        if let Some(password) = &self.password {
            request = request.with_password(Password::new(password.clone()));
        }
        Ok(request)
    }
}

/// Executes the `run` command.
///
/// The whole plan, host directories included, is built before the engine
/// is contacted; the image is built when missing.
///
/// # Errors
///
/// Returns an error if the request is invalid, the container exists
/// without `--force`, or the engine fails.
pub fn execute(args: RunArgs, scope: Option<InstallScope>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = context::load_config(scope)?;
    let request = args.to_request()?;
    let plan = Planner::new(&config, &SystemIdentityResolver)
        .plan(&request)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    if args.dry_run {
        let json = serde_json::to_string_pretty(&plan.redacted())?;
        println!("{json}");
        return Ok(());
    }

    output::print_header();
    let engine = Engine::detect().map_err(|e| anyhow::anyhow!("{e}"))?;
    if !engine
        .image_exists(&plan.image)
        .map_err(|e| anyhow::anyhow!("{e}"))?
    {
        eprintln!("  {DIM}building {}{RESET}", plan.image);
        let _ = engine
            .build(&config, &request.selection, false)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    engine
        .launch(&plan, args.force)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    eprintln!(
        "  {GREEN}✓{RESET} {BOLD}{}{RESET} started {DIM}({}, {:.1}s){RESET}",
        plan.container_name,
        plan.image,
        start.elapsed().as_secs_f64()
    );
    eprintln!("  {DIM}logs: {}{RESET}", plan.log_dir.display());
    eprintln!();
    output::print_urls(&plan.service_urls());
    if !plan.warnings.is_empty() {
        eprintln!();
        output::print_warnings(&plan.warnings);
    }
    Ok(())
}
