//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con i parametri del passaggio di ricodifica
//! - Definisce `EncodeOptions`, i parametri espliciti passati al codec
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri di configurazione:
//! - `encode.jpeg_quality`: Qualità JPEG (1-100, default: 75)
//! - `encode.png_compression`: Livello compressione PNG (default/fast/best)
//! - `encode.webp_quality`: Qualità WebP (1-100, default: 80); in lossless è lo sforzo di compressione
//! - `encode.webp_lossless`: WebP lossless invece di lossy (default: false)
//! - `sorted`: Visita le entry ordinate per nome (default: false)
//! - `dry_run`: Decodifica e ricodifica senza scrivere (default: false)
//! - `continue_on_error`: Continua dopo un file fallito (default: false)
//! - `json_output`: Messaggi JSON su stdout (default: false)
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     encode: EncodeOptions { jpeg_quality: 90, ..Default::default() },
//!     sorted: true,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// PNG compression level handed to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    #[default]
    Default,
    Fast,
    Best,
}

impl From<PngCompression> for image::codecs::png::CompressionType {
    fn from(level: PngCompression) -> Self {
        match level {
            PngCompression::Default => Self::Default,
            PngCompression::Fast => Self::Fast,
            PngCompression::Best => Self::Best,
        }
    }
}

/// Parameters passed to the codec when re-encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// PNG compression level
    pub png_compression: PngCompression,
    /// WebP quality (1-100); compression effort when lossless
    pub webp_quality: u8,
    /// Encode WebP losslessly instead of lossy
    pub webp_lossless: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 75,
            png_compression: PngCompression::Default,
            webp_quality: 80,
            webp_lossless: false,
        }
    }
}

/// Configuration for a re-encoding pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Codec parameters
    pub encode: EncodeOptions,
    /// Visit directory entries sorted by file name
    pub sorted: bool,
    /// Dry run - decode and encode but don't write files
    pub dry_run: bool,
    /// Record failed files and keep going instead of aborting
    pub continue_on_error: bool,
    /// Output start/complete/error messages as JSON for programmatic use
    pub json_output: bool,
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.encode.jpeg_quality == 0 || self.encode.jpeg_quality > 100 {
            return Err(anyhow::anyhow!("JPEG quality must be between 1 and 100"));
        }

        if self.encode.webp_quality == 0 || self.encode.webp_quality > 100 {
            return Err(anyhow::anyhow!("WebP quality must be between 1 and 100"));
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file does not exist: {}", path.display()));
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
