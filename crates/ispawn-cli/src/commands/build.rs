//! `ispawn build`: Build the image of a base image and a service set.

use clap::Args;
use ispawn_common::config::InstallScope;
use ispawn_common::constants::DEFAULT_BASE_IMAGE;
use ispawn_plan::image::ImageSelection;
use ispawn_runtime::engine::Engine;

use crate::context;
use crate::output::{BOLD, GREEN, RESET};

/// Arguments for the `build` command.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Base image reference.
    #[arg(short, long, default_value = DEFAULT_BASE_IMAGE)]
    pub base: String,

    /// Service to install (repeatable).
    #[arg(short, long = "service", required = true)]
    pub services: Vec<String>,

    /// Rebuild an existing image.
    #[arg(short, long)]
    pub force: bool,
}

/// Executes the `build` command.
///
/// # Errors
///
/// Returns an error if a service is unknown, the image exists without
/// `--force`, or the build fails.
pub fn execute(args: BuildArgs, scope: Option<InstallScope>) -> anyhow::Result<()> {
    let config = context::load_config(scope)?;
    let selection =
        ImageSelection::new(&args.base, &args.services).map_err(|e| anyhow::anyhow!("{e}"))?;
    let engine = Engine::detect().map_err(|e| anyhow::anyhow!("{e}"))?;

    tracing::info!(base = %args.base, services = ?selection.service_ids(), "building image");
    let tag = engine
        .build(&config, &selection, args.force)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    eprintln!("  {GREEN}✓{RESET} built {BOLD}{tag}{RESET}");
    Ok(())
}
