//! # Media Resaver - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Composizione della configurazione (file JSON + flag espliciti)
//! - Avvio del passaggio di ricodifica e exit code
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (root, qualità, flag)
//! 2. Configura il logging (`RUST_LOG` se presente, altrimenti INFO o DEBUG
//!    a seconda del flag verbose)
//! 3. Carica il file di configurazione se indicato, poi applica i flag
//! 4. Istanzia DirectoryResaver e avvia il passaggio
//!
//! ## Esempio di utilizzo:
//! ```bash
//! media-resaver ./site/static --jpeg-quality 85 --sorted --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use media_resaver::{Config, DirectoryResaver, PngCompression};

#[derive(Parser)]
#[command(name = "media-resaver")]
#[command(about = "Re-encode every .jpg/.jpeg/.png/.webp file under a directory in place")]
struct Args {
    /// Root directory to walk
    #[arg(default_value = ".")]
    root: PathBuf,

    /// JSON config file (explicit flags override its values)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to this file and exit
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// JPEG quality (1-100)
    #[arg(short = 'q', long)]
    jpeg_quality: Option<u8>,

    /// PNG compression level
    #[arg(long, value_enum)]
    png_compression: Option<PngCompression>,

    /// WebP quality (1-100); compression effort with --webp-lossless
    #[arg(long)]
    webp_quality: Option<u8>,

    /// Encode WebP losslessly instead of lossy
    #[arg(long)]
    webp_lossless: bool,

    /// Visit directory entries sorted by file name
    #[arg(long)]
    sorted: bool,

    /// Dry run - decode and encode but don't write files
    #[arg(long)]
    dry_run: bool,

    /// Record failed files and keep going instead of aborting
    #[arg(long)]
    continue_on_error: bool,

    /// Output start/complete/error messages as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Layer the explicit flags over a base configuration
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(quality) = self.jpeg_quality {
            config.encode.jpeg_quality = quality;
        }
        if let Some(level) = self.png_compression {
            config.encode.png_compression = level;
        }
        if let Some(quality) = self.webp_quality {
            config.encode.webp_quality = quality;
        }
        config.encode.webp_lossless |= self.webp_lossless;
        config.sorted |= self.sorted;
        config.dry_run |= self.dry_run;
        config.continue_on_error |= self.continue_on_error;
        config.json_output |= self.json;
        config
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.verbose))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let base = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    let config = args.apply_to(base);
    config.validate()?;

    if let Some(ref path) = args.save_config {
        config.save_to_file(path).await?;
        info!("Saved configuration to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let resaver = DirectoryResaver::new(&args.root, config)?;
    let stats = resaver.run().await?;

    if stats.failures.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// `RUST_LOG` when set and valid, otherwise INFO (DEBUG with `--verbose`)
fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }))
}
