//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la discovery delle immagini.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva (streaming) di file immagine in una directory
//! - Filtro per estensione, case-sensitive, sul nome del file
//! - Sovrascrittura in-place di un file esistente
//! - Utilità per calcoli dimensioni e percentuali
//!
//! ## Estensioni riconosciute:
//! `.jpg`, `.jpeg`, `.png`, `.webp` (esattamente, `c.PNG` non è riconosciuto)
//!
//! ## Operazioni sui file:
//! - `walk_images()`: Itera i file immagine nell'ordine del walker
//! - `is_image()`: Controlla il suffisso del nome file
//! - `write_in_place()`: Sovrascrive un file che deve già esistere
//! - `get_file_info()`: Dimensione e mtime (secondi Unix) di un file
//!
//! ## Esempio:
//! ```ignore
//! for path in FileManager::walk_images(Path::new("."), false) {
//!     let path = path?;
//!     // decode + encode
//! }
//! ```

use crate::error::ResaveError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Filename suffixes that select a file for re-encoding, in match order
pub const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Walk `root` recursively and yield every regular file that looks like an image.
    ///
    /// The walk is lazy: entries are read from disk as the iterator advances, so
    /// a caller that stops at the first error never lists the rest of the tree.
    /// Listing errors are yielded in place rather than skipped. Symlinks are not
    /// followed and are not yielded.
    pub fn walk_images(
        root: &Path,
        sorted: bool,
    ) -> impl Iterator<Item = Result<PathBuf, ResaveError>> {
        let mut walker = WalkDir::new(root).follow_links(false);
        if sorted {
            walker = walker.sort_by_file_name();
        }

        walker.into_iter().filter_map(|entry| match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    if entry.path_is_symlink() {
                        debug!("Skipping symlink: {}", entry.path().display());
                    }
                    return None;
                }
                if Self::is_image(entry.path()) {
                    Some(Ok(entry.into_path()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(ResaveError::Walk(e))),
        })
    }

    /// Check if a file name ends with one of [`IMAGE_EXTENSIONS`] (case-sensitive)
    pub fn is_image(path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.as_encoded_bytes();
        IMAGE_EXTENSIONS
            .iter()
            .any(|ext| name.ends_with(ext.as_bytes()))
    }

    /// Overwrite an existing file with `bytes`.
    ///
    /// Never creates a new path: a missing file is reported as `NotFound`.
    pub fn write_in_place(path: &Path, bytes: &[u8]) -> Result<(), ResaveError> {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(false)
            .open(path)
            .map_err(|e| ResaveError::io(path, e))?;
        file.write_all(bytes).map_err(|e| ResaveError::io(path, e))?;
        file.flush().map_err(|e| ResaveError::io(path, e))?;
        Ok(())
    }

    /// Get file size and modification time (seconds since the Unix epoch)
    pub fn get_file_info(path: &Path) -> Result<(u64, u64), ResaveError> {
        let metadata = std::fs::metadata(path).map_err(|e| ResaveError::io(path, e))?;
        let size = metadata.len();
        let modified = metadata
            .modified()
            .map_err(|e| ResaveError::io(path, e))?
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Ok((size, modified))
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage size change (negative = smaller)
    pub fn calculate_change(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((new_size as f64 - original_size as f64) / original_size as f64) * 100.0
        }
    }
}
