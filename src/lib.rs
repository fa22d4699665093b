//! # Media Resaver Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione, parametri di encode e validazione
//! - `error`: Tipi di errore custom
//! - `file_manager`: Walk ricorsivo, filtro estensioni, scrittura in-place
//! - `image_processor`: Decode e ricodifica di un singolo file
//! - `resaver`: Orchestratore del passaggio sull'albero
//! - `report`: Risultati per file e statistiche del run
//! - `json_output`: Messaggi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```ignore
//! use media_resaver::{Config, DirectoryResaver};
//!
//! let resaver = DirectoryResaver::new(Path::new("."), Config::default())?;
//! let stats = resaver.run().await?;
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod report;
pub mod resaver;

#[cfg(test)]
mod test_support;

pub use config::{Config, EncodeOptions, PngCompression};
pub use error::ResaveError;
pub use file_manager::{FileManager, IMAGE_EXTENSIONS};
pub use image_processor::{DecodedImage, ImageProcessor};
pub use report::{ResavedFile, RunStats};
pub use resaver::DirectoryResaver;
