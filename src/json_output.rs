//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'uso programmatico del tool.
//!
//! ## Responsabilità:
//! - Emette una riga JSON per evento su stdout
//! - Riusa `RunStats` e `Config` per il contenuto dei messaggi
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del passaggio (root e configurazione)
//! - `complete`: Fine del passaggio con statistiche finali
//! - `error`: Errore che ha interrotto il passaggio

use crate::config::{Config, PngCompression};
use crate::report::{FailedFile, RunStats};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio del passaggio
    #[serde(rename = "start")]
    Start { root: PathBuf, config: JsonConfig },

    /// Passaggio completato
    #[serde(rename = "complete")]
    Complete {
        files_resaved: usize,
        files_written: usize,
        files_failed: usize,
        total_original_size: u64,
        total_resaved_size: u64,
        size_change_percent: f64,
        duration_seconds: f64,
        failures: Vec<FailedFile>,
    },

    /// Errore che interrompe il passaggio
    #[serde(rename = "error")]
    Error {
        message: String,
        path: Option<PathBuf>,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonConfig {
    pub jpeg_quality: u8,
    pub png_compression: PngCompression,
    pub webp_quality: u8,
    pub webp_lossless: bool,
    pub sorted: bool,
    pub dry_run: bool,
    pub continue_on_error: bool,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    /// Crea un messaggio di inizio
    pub fn start(root: PathBuf, config: &Config) -> Self {
        Self::Start {
            root,
            config: JsonConfig::from(config),
        }
    }

    /// Crea un messaggio di completamento dalle statistiche del run
    pub fn complete(stats: &RunStats, duration_seconds: f64) -> Self {
        Self::Complete {
            files_resaved: stats.files_resaved,
            files_written: stats.files_written,
            files_failed: stats.files_failed(),
            total_original_size: stats.total_original_size,
            total_resaved_size: stats.total_resaved_size,
            size_change_percent: stats.overall_change_percent(),
            duration_seconds,
            failures: stats.failures.clone(),
        }
    }

    /// Crea un messaggio di errore
    pub fn error(message: String, path: Option<PathBuf>) -> Self {
        Self::Error { message, path }
    }
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            jpeg_quality: config.encode.jpeg_quality,
            png_compression: config.encode.png_compression,
            webp_quality: config.encode.webp_quality,
            webp_lossless: config.encode.webp_lossless,
            sorted: config.sorted,
            dry_run: config.dry_run,
            continue_on_error: config.continue_on_error,
        }
    }
}
