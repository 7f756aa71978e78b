//! `ispawn images`: List or remove the images of the namespace.

use clap::Args;
use ispawn_common::config::InstallScope;
use ispawn_plan::naming;
use ispawn_runtime::engine::Engine;

use crate::context;
use crate::output::{self, GREEN, RESET};

/// Arguments for the `images` command.
#[derive(Args, Debug)]
pub struct ImagesArgs {
    /// Remove an image by reference.
    #[arg(long, value_name = "REFERENCE", conflicts_with = "remove_all")]
    pub remove: Option<String>,

    /// Remove every image of the namespace.
    #[arg(long)]
    pub remove_all: bool,

    /// Remove images still used by containers.
    #[arg(short, long)]
    pub force: bool,
}

/// Executes the `images` command.
///
/// # Errors
///
/// Returns an error if a reference lies outside the namespace or the
/// engine fails.
pub fn execute(args: ImagesArgs, scope: Option<InstallScope>) -> anyhow::Result<()> {
    let config = context::load_config(scope)?;
    let engine = Engine::detect().map_err(|e| anyhow::anyhow!("{e}"))?;
    let prefix = naming::image_prefix(&config);

    if args.remove.is_some() || args.remove_all {
        let removed = engine
            .remove_images(&prefix, args.remove.as_deref(), args.force)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        for reference in removed {
            eprintln!("  {GREEN}✓{RESET} {reference} removed");
        }
        return Ok(());
    }

    let images = engine.images(&prefix).map_err(|e| anyhow::anyhow!("{e}"))?;
    if images.is_empty() {
        println!("No images found.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = images
        .into_iter()
        .map(|i| vec![i.reference, i.id, i.size])
        .collect();
    print!("{}", output::table(&["IMAGE", "IMAGE ID", "SIZE"], &rows));
    Ok(())
}
