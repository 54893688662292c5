// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use qrscan::Config;
use std::path::PathBuf;
use std::sync::Mutex;

mod cli;

#[derive(Parser)]
#[command(name = "qrscan")]
#[command(about = "Scan, decode and generate QR codes")]
#[command(version = qrscan::constants::app_info::version())]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run in terminal mode (default)
    Terminal,

    /// List available cameras
    List,

    /// Scan the camera until a QR code is found and print it
    Scan {
        /// Camera index to use (from 'qrscan list')
        #[arg(short, long)]
        camera: Option<usize>,

        /// Ask whether to open the scanned link
        #[arg(long)]
        open: bool,
    },

    /// Decode QR codes in image files
    Decode {
        /// Image files to decode
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Generate a QR code
    Generate {
        /// Text to encode
        text: String,

        /// Write a PNG instead of printing to the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Edge length of the PNG in pixels (default from config)
        #[arg(short, long)]
        size: Option<u32>,
    },

    /// Take a photo and save it into an album
    Capture {
        /// Camera index to use (from 'qrscan list')
        #[arg(short, long)]
        camera: Option<usize>,

        /// Album name (default from config)
        #[arg(short, long)]
        album: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let terminal_mode = matches!(cli.command, None | Some(Commands::Terminal));

    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=qrscan=debug, RUST_LOG=info
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    if terminal_mode {
        // The screen belongs to the UI, so logs go to a file
        let log_dir = Config::log_dir();
        std::fs::create_dir_all(&log_dir)?;
        let log_file = std::fs::File::create(log_dir.join("qrscan.log"))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(log_file))
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .init();
    }

    let config = Config::load();

    let result = match cli.command {
        None | Some(Commands::Terminal) => qrscan::terminal::run(config),
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Scan { camera, open }) => cli::scan(&config, camera, open),
        Some(Commands::Decode { images }) => cli::decode(&images),
        Some(Commands::Generate { text, output, size }) => {
            cli::generate_code(&text, output, size.unwrap_or(config.qr_size.max(1)))
        }
        Some(Commands::Capture { camera, album }) => cli::capture(&config, camera, album),
    };
    result?;
    Ok(())
}
