mod commands;
mod repl;
mod state;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roomshift_core::{load_config_or_default, validate_config, DesignStyle};

use state::AppState;

/// Redesign room photos in a new interior style and turn them into a video tour.
#[derive(Debug, Parser)]
#[command(name = "roomshift", version, about)]
struct Cli {
    /// Configuration file. Missing files fall back to defaults and environment.
    #[arg(long, env = "ROOMSHIFT_CONFIG", default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the available design styles.
    Styles,

    /// Redesign images in one style and write the results.
    Redesign {
        #[arg(long, default_value_t = DesignStyle::default())]
        style: DesignStyle,

        /// Output directory.
        #[arg(long, default_value = ".")]
        out: PathBuf,

        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Generate a video tour from images.
    Tour {
        /// Output file.
        #[arg(long, default_value = "apartment-tour.mp4")]
        out: PathBuf,

        #[arg(required = true, num_args = 2..)]
        images: Vec<PathBuf>,
    },

    /// Start an interactive session.
    Session,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so command output stays clean on stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Styles => {
            commands::list_styles();
            Ok(())
        }
        Command::Redesign { style, out, images } => {
            let state = load_state(&cli.config)?;
            commands::redesign(&state, style, &images, &out).await
        }
        Command::Tour { out, images } => {
            let state = load_state(&cli.config)?;
            commands::tour(&state, &images, &out).await
        }
        Command::Session => {
            let state = load_state(&cli.config)?;
            repl::run(&state).await
        }
    }
}

fn load_state(path: &Path) -> Result<AppState> {
    info!(path = %path.display(), "Loading configuration");
    let config = load_config_or_default(path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!(
        image_model = %config.gemini.image_model,
        video_model = %config.gemini.video_model,
        "Configuration loaded"
    );
    Ok(AppState::new(config))
}
