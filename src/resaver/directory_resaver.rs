//! # Directory Resaver Main Orchestrator
//!
//! Orchestratore principale: cammina l'albero e ricodifica un file alla volta.
//!
//! ## Flusso di esecuzione:
//! 1. **Inizializzazione**: Valida config e root
//! 2. **Walk**: Il walker produce i path uno alla volta (nessuna lista preventiva)
//! 3. **Processing**: Ogni file viene completato prima di leggere il path successivo
//! 4. **Errori**: Di default il primo errore interrompe tutto il passaggio;
//!    con `continue_on_error` l'errore viene registrato e si prosegue
//! 5. **Reporting**: Statistiche finali nei log o in JSON

use crate::{
    config::Config,
    error::ResaveError,
    file_manager::FileManager,
    json_output::JsonMessage,
    report::RunStats,
    resaver::task_resaver::TaskResaver,
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Orchestratore principale
pub struct DirectoryResaver {
    config: Config,
    root: PathBuf,
    task_resaver: TaskResaver,
}

impl DirectoryResaver {
    /// Crea nuova istanza, validando configurazione e directory root
    pub fn new(root: &Path, config: Config) -> Result<Self> {
        config.validate()?;

        if !root.exists() {
            return Err(ResaveError::Validation(format!(
                "Root directory does not exist: {}",
                root.display()
            ))
            .into());
        }
        if !root.is_dir() {
            return Err(ResaveError::Validation(format!(
                "Root path is not a directory: {}",
                root.display()
            ))
            .into());
        }

        let task_resaver = TaskResaver::new(config.clone());

        Ok(Self {
            config,
            root: root.to_path_buf(),
            task_resaver,
        })
    }

    /// Esegue il passaggio di ricodifica.
    ///
    /// Without `continue_on_error` the first failing file (or unreadable
    /// directory) aborts the run and is returned as a [`ResaveError`] inside
    /// the `anyhow::Error`; files after it are left untouched.
    pub async fn run(&self) -> Result<RunStats> {
        let start_time = Instant::now();

        self.emit_start_message();
        self.log_configuration();

        let mut stats = RunStats::new();

        for entry in FileManager::walk_images(&self.root, self.config.sorted) {
            let outcome = match entry {
                Ok(path) => self.task_resaver.process_single_file(path).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(resaved) => stats.add_resaved(&resaved),
                Err(e) if self.config.continue_on_error => {
                    warn!("Continuing after error: {}", e);
                    stats.add_failure(e.path().map(Path::to_path_buf), e.to_string());
                }
                Err(e) => {
                    error!(
                        "Aborting after {} file(s): {}",
                        stats.files_resaved, e
                    );
                    if self.config.json_output {
                        JsonMessage::error(e.to_string(), e.path().map(Path::to_path_buf)).emit();
                    }
                    return Err(e.into());
                }
            }
        }

        let duration = start_time.elapsed().as_secs_f64();
        self.print_final_stats(&stats, duration);

        Ok(stats)
    }

    /// Invia messaggio di inizio
    fn emit_start_message(&self) {
        if self.config.json_output {
            JsonMessage::start(self.root.clone(), &self.config).emit();
        } else {
            info!("Re-encoding images in: {}", self.root.display());
        }
    }

    /// Logga configurazione
    fn log_configuration(&self) {
        let encode = &self.config.encode;
        info!(
            "Encode options: JPEG quality {}, PNG compression {:?}, WebP {} quality {}",
            encode.jpeg_quality,
            encode.png_compression,
            if encode.webp_lossless { "lossless" } else { "lossy" },
            encode.webp_quality
        );

        if self.config.sorted {
            info!("Order: sorted by file name");
        }
        if self.config.dry_run {
            info!("Dry run mode: No files will be modified");
        }
        if self.config.continue_on_error {
            info!("Failed files will be recorded and skipped");
        }
    }

    fn print_final_stats(&self, stats: &RunStats, duration: f64) {
        if self.config.json_output {
            JsonMessage::complete(stats, duration).emit();
        }

        if stats.files_resaved == 0 && stats.failures.is_empty() {
            info!("No image files found");
        } else {
            info!("{} in {:.2}s", stats.format_summary(), duration);
        }

        for failure in &stats.failures {
            warn!("Failed: {}", failure.error);
        }
    }
}
