use std::path::PathBuf;

use clap::Parser;
use mgl::{AppConfig, TangramApp};

/// Orbit a 3D tangram; drag to rotate, scroll to zoom.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// OBJ mesh drawn beside the tangram
    #[arg(short, long)]
    mesh: Option<PathBuf>,
    /// window width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,
    /// window height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// start with the orthographic projection
    #[arg(short, long)]
    orthographic: bool,
    /// binding slot of the camera block
    #[arg(long, default_value_t = 0)]
    binding: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    let mut config = AppConfig::default()
        .with_size(args.width, args.height)
        .with_orthographic(args.orthographic)
        .with_camera_binding(args.binding);
    if let Some(mesh) = args.mesh {
        config = config.with_mesh(mesh);
    }

    TangramApp::new(config)?.run()?;
    Ok(())
}
