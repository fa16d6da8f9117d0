use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tiny_claw_runtime::config::ClawConfig;
use tiny_claw_runtime::runtime::{self, Backend};

/// Claw cabinet controller
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON config file (pins, motion, timing); defaults are used when omitted
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Hardware backend
    #[arg(short, long, value_enum, default_value_t = Backend::Rpi)]
    backend: Backend,

    /// Override the lives granted at startup
    #[arg(short, long)]
    lives: Option<i32>,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => match ClawConfig::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => ClawConfig::default(),
    };
    if let Some(lives) = args.lives {
        cfg.initial_lives = lives;
    }
    info!("Starting with {} lives on {:?} backend", cfg.initial_lives, args.backend);

    if let Err(e) = runtime::run(cfg, args.backend).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
