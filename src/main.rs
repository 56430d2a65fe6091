// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use depthrec::config::FallbackSource;
use depthrec::constants::DEFAULT_OUTPUT_DIR;
use depthrec::SensorConfig;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "depthrec")]
#[command(about = "Depth-camera recording client")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report capture capabilities on this machine
    Probe,

    /// Record from the depth camera (or its fallback source)
    Record {
        /// Depth camera model identifier
        #[arg(short, long)]
        model: Option<String>,

        /// Recording duration in seconds (runs until Ctrl+C if omitted)
        #[arg(short, long)]
        duration: Option<u64>,

        /// Output directory for recordings
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Fallback source: webcam device index or "synthetic"
        #[arg(long, value_parser = cli::parse_fallback)]
        fallback: Option<FallbackSource>,

        /// Fail instead of falling back when no depth camera is available
        #[arg(long)]
        no_fallback: bool,

        /// Frame width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Frame height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Target frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// JSON config file; explicit flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// API key for the recording client
        #[arg(short = 'k', long, default_value = "local")]
        api_key: String,
    },

    /// Record with the mock sensor (optionally looping a video file)
    Mock {
        /// Video file to replay as the frame source
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Recording duration in seconds (runs until Ctrl+C if omitted)
        #[arg(short, long)]
        duration: Option<u64>,

        /// Output directory for recordings
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// API key for the recording client
        #[arg(short = 'k', long, default_value = "local")]
        api_key: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=depthrec=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Probe => cli::probe_capabilities(),
        Commands::Record {
            model,
            duration,
            output_dir,
            fallback,
            no_fallback,
            width,
            height,
            fps,
            config,
            api_key,
        } => {
            let mut cfg = match config {
                Some(path) => SensorConfig::load(&path)?,
                None => SensorConfig::default(),
            };
            if let Some(model) = model {
                cfg.model = model;
            }
            if let Some(output_dir) = output_dir {
                cfg.output_dir = output_dir;
            }
            if let Some(fallback) = fallback {
                cfg.fallback = fallback;
            }
            if no_fallback {
                cfg.allow_fallback = false;
            }
            if let Some(width) = width {
                cfg.width = width;
            }
            if let Some(height) = height {
                cfg.height = height;
            }
            if let Some(fps) = fps {
                cfg.fps = fps;
            }
            cli::record(cfg, &api_key, duration)
        }
        Commands::Mock {
            source,
            duration,
            output_dir,
            api_key,
        } => cli::record_mock(source, output_dir, &api_key, duration),
    }
}
