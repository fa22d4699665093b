//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `ResaveError` enum per categorizzare tutti gli errori possibili
//! - Ogni variante legata a un file porta con sé il path che ha fallito
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Walk`: Errori durante la lettura di una directory
//! - `Io`: Errori di I/O su un file specifico (lettura, scrittura, metadata)
//! - `Decode`: File con estensione immagine ma contenuto non decodificabile
//! - `Encode`: Errore del codec durante la ricodifica
//! - `WebpEncode`: Errore dell'encoder WebP (`zenwebp`)
//! - `Task`: Il task bloccante di decode/encode è fallito (panic o cancellazione)
//! - `UnsupportedFormat`: Estensione senza formato di output associato
//! - `Validation`: Errori di validazione input/configurazione
//!
//! ## Esempio:
//! ```ignore
//! if !root.is_dir() {
//!     return Err(ResaveError::Validation(format!("Not a directory: {}", root.display())));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for in-place re-encoding
#[derive(thiserror::Error, Debug)]
pub enum ResaveError {
    #[error("Directory traversal error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot encode {} as WebP: {message}", path.display())]
    WebpEncode { path: PathBuf, message: String },

    #[error("Worker task failed for {}: {message}", path.display())]
    Task { path: PathBuf, message: String },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ResaveError {
    /// Path of the file the error refers to, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Walk(e) => e.path(),
            Self::Io { path, .. }
            | Self::Decode { path, .. }
            | Self::Encode { path, .. }
            | Self::WebpEncode { path, .. }
            | Self::Task { path, .. } => Some(path.as_path()),
            Self::UnsupportedFormat(_) | Self::Validation(_) => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
