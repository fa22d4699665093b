//! # Task Resaver Module
//!
//! Worker per la ricodifica di un singolo file.
//! Separato dall'orchestratore per tenere il ciclo principale leggibile.

use crate::{config::Config, error::ResaveError, image_processor::ImageProcessor, report::ResavedFile};
use std::path::PathBuf;
use tracing::{debug, info};

/// Worker per elaborazione singoli file
pub struct TaskResaver {
    pub config: Config,
    pub image_processor: ImageProcessor,
}

impl TaskResaver {
    /// Crea nuovo task resaver
    pub fn new(config: Config) -> Self {
        let image_processor = ImageProcessor::new(config.encode);

        Self {
            config,
            image_processor,
        }
    }

    /// Processa un singolo file: decode, encode e sovrascrittura.
    ///
    /// Returns only after the file has been fully written (or skipped in dry
    /// run), so callers that await it never have two files in flight.
    pub async fn process_single_file(&self, file_path: PathBuf) -> Result<ResavedFile, ResaveError> {
        debug!("Processing {}", file_path.display());

        let resaved = self
            .image_processor
            .resave_blocking(file_path, self.config.dry_run)
            .await?;

        if resaved.written {
            debug!(
                "Rewrote {} as {} ({} -> {} bytes, {:+.2}%)",
                resaved.path.display(),
                resaved.format,
                resaved.original_size,
                resaved.resaved_size,
                resaved.size_change_percent
            );
        } else {
            info!(
                "Dry run: would rewrite {} ({} -> {} bytes)",
                resaved.path.display(),
                resaved.original_size,
                resaved.resaved_size
            );
        }

        Ok(resaved)
    }
}
