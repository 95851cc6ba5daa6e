//! Sphereflow CLI
//!
//! A command-line toolkit for 360-degree video: spherical detection,
//! projection conversion, viewport extraction, bitrate ladder planning, and
//! adaptive streaming packaging.
//!
//! # Usage
//!
//! ```bash
//! sphereflow detect --input dive_360.mp4
//! sphereflow convert --input dive_360.mp4 --to cubemap
//! sphereflow viewport --input dive_360.mp4 --output front.mp4 --yaw 0 --fov 90
//! sphereflow plan --width 3840 --height 1920 --projection equirectangular
//! sphereflow stream --input dive_360.mp4 --output-dir ./stream
//! ```

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use sphereflow::cli::{commands, Cli, Commands};
use sphereflow::config::SphereflowConfig;

/// Main entry point for the Sphereflow CLI
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let cli = Cli::parse();
    let config = SphereflowConfig::load_or_default(cli.config.as_deref().map(Path::new))?;

    // Execute the requested command
    match cli.command {
        Commands::Detect(args) => {
            info!("Executing detect command");
            commands::execute_detect(args, &config).await?;
        }
        Commands::Convert(args) => {
            info!("Executing convert command");
            commands::execute_convert(args, &config).await?;
        }
        Commands::BatchConvert(args) => {
            info!("Executing batch-convert command");
            commands::execute_batch_convert(args, &config).await?;
        }
        Commands::Viewport(args) => {
            info!("Executing viewport command");
            commands::execute_viewport(args, &config).await?;
        }
        Commands::Plan(args) => {
            info!("Executing plan command");
            commands::execute_plan(args, &config).await?;
        }
        Commands::Stream(args) => {
            info!("Executing stream command");
            commands::execute_stream(args, &config).await?;
        }
        Commands::Stereo(args) => {
            info!("Executing stereo command");
            commands::execute_stereo(args, &config).await?;
        }
    }

    Ok(())
}
