//! # Run Report Module
//!
//! Questo modulo raccoglie il risultato di ogni file ricodificato e le statistiche del passaggio.
//!
//! ## Componenti principali:
//! - `ResavedFile`: Info su un file ricodificato (path, formato, dimensioni)
//! - `FailedFile`: File fallito, registrato solo con `continue_on_error`
//! - `RunStats`: Statistiche cumulative del passaggio
//!
//! Nessuno stato viene persistito: il report vive solo per la durata del run
//! e serve per il logging e per il messaggio JSON finale.
//!
//! ## Esempio:
//! ```ignore
//! let mut stats = RunStats::new();
//! stats.add_resaved(&resaved_file);
//! info!("{}", stats.format_summary());
//! ```

use crate::file_manager::FileManager;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Information about a re-encoded file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResavedFile {
    pub path: PathBuf,
    /// Output format name ("jpeg", "png", "webp")
    pub format: String,
    pub original_size: u64,
    pub resaved_size: u64,
    pub size_change_percent: f64,
    /// False when the run was a dry run
    pub written: bool,
}

impl ResavedFile {
    pub fn new(
        path: PathBuf,
        format: impl Into<String>,
        original_size: u64,
        resaved_size: u64,
        written: bool,
    ) -> Self {
        Self {
            path,
            format: format.into(),
            original_size,
            resaved_size,
            size_change_percent: FileManager::calculate_change(original_size, resaved_size),
            written,
        }
    }
}

/// A file that failed while the run kept going
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FailedFile {
    pub path: Option<PathBuf>,
    pub error: String,
}

/// Statistics for one pass over the tree
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RunStats {
    pub files_resaved: usize,
    pub files_written: usize,
    pub total_original_size: u64,
    pub total_resaved_size: u64,
    pub failures: Vec<FailedFile>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_resaved(&mut self, file: &ResavedFile) {
        self.files_resaved += 1;
        if file.written {
            self.files_written += 1;
        }
        self.total_original_size += file.original_size;
        self.total_resaved_size += file.resaved_size;
    }

    pub fn add_failure(&mut self, path: Option<PathBuf>, error: String) {
        self.failures.push(FailedFile { path, error });
    }

    pub fn files_failed(&self) -> usize {
        self.failures.len()
    }

    pub fn overall_change_percent(&self) -> f64 {
        FileManager::calculate_change(self.total_original_size, self.total_resaved_size)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Resaved: {} files | Written: {} | Failed: {} | Size: {} -> {} ({:+.2}%)",
            self.files_resaved,
            self.files_written,
            self.files_failed(),
            FileManager::format_size(self.total_original_size),
            FileManager::format_size(self.total_resaved_size),
            self.overall_change_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resaved_file_change() {
        let file = ResavedFile::new(PathBuf::from("a.jpg"), "jpeg", 1000, 800, true);
        assert_eq!(file.size_change_percent, -20.0);
        assert_eq!(file.format, "jpeg");
    }

    #[test]
    fn test_stats_accumulate() {
        let mut stats = RunStats::new();
        stats.add_resaved(&ResavedFile::new(PathBuf::from("a.jpg"), "jpeg", 1000, 500, true));
        stats.add_resaved(&ResavedFile::new(PathBuf::from("b.png"), "png", 1000, 1500, false));
        stats.add_failure(Some(PathBuf::from("c.webp")), "Cannot decode c.webp".to_string());

        assert_eq!(stats.files_resaved, 2);
        assert_eq!(stats.files_written, 1);
        assert_eq!(stats.files_failed(), 1);
        assert_eq!(stats.total_original_size, 2000);
        assert_eq!(stats.total_resaved_size, 2000);
        assert_eq!(stats.overall_change_percent(), 0.0);
        assert!(stats.format_summary().contains("Failed: 1"));
    }

    #[test]
    fn test_empty_stats_summary() {
        let stats = RunStats::new();
        assert_eq!(stats.overall_change_percent(), 0.0);
        assert!(stats.format_summary().starts_with("Resaved: 0 files"));
    }
}
