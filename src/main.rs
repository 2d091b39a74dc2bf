// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand, ValueEnum};
use nakama_booth::backends::camera::CameraBackendType;
use nakama_booth::config::Config;
use nakama_booth::constants::{APP_DIR_NAME, APP_VERSION, terminal::LOG_FILE_NAME};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "nakama-booth")]
#[command(about = "Wanted-poster photo booth for the terminal")]
#[command(version = APP_VERSION)]
#[command(subcommand_required = false)]
struct Cli {
    /// Configuration file (default: ~/.config/nakama-booth/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Camera backend
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendArg>,

    /// Image served by the still backend instead of a test pattern
    #[arg(long, global = true)]
    still_image: Option<PathBuf>,

    /// Directory holding frame/, images/ and stickers/
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    V4l2,
    Still,
}

impl From<BackendArg> for CameraBackendType {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::V4l2 => CameraBackendType::V4l2,
            BackendArg::Still => CameraBackendType::Still,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,

    /// Count down and take a photo
    Capture {
        /// Output file or directory (default: Downloads/anime-lens-photo-1.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a wanted poster from an existing photo
    Poster {
        /// Photo to place on the poster
        #[arg(short, long)]
        photo: PathBuf,

        /// Name printed under the photo
        #[arg(short, long)]
        name: String,

        /// Sticker to add, by catalog index (repeatable)
        #[arg(short, long = "sticker")]
        stickers: Vec<usize>,

        /// Output directory (default: Downloads)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let tui = cli.command.is_none();

    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=nakama_booth=debug, RUST_LOG=info
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    match tui.then(open_log_file).flatten() {
        // The terminal UI owns stdout, so logs go to a file
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init(),
    }
    tracing::info!(version = APP_VERSION, "Starting nakama-booth");

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(backend) = cli.backend {
        config.backend = backend.into();
    }
    if let Some(path) = cli.still_image {
        config.still_image = Some(path);
    }
    if let Some(dir) = cli.assets {
        config.asset_dir = dir;
    }

    match cli.command {
        Some(Commands::List) => cli::list_cameras(&config),
        Some(Commands::Capture { output }) => cli::take_photo(&config, output),
        Some(Commands::Poster {
            photo,
            name,
            stickers,
            output,
        }) => cli::make_poster(config, &photo, &name, &stickers, output),
        None => nakama_booth::terminal::run(config),
    }
}

fn open_log_file() -> Option<std::fs::File> {
    let dir = dirs::cache_dir()?.join(APP_DIR_NAME);
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))
        .ok()
}
