//! # Resaver Module
//!
//! Separa le responsabilità del passaggio di ricodifica in sottomoduli:
//! - `directory_resaver`: Orchestratore principale (walk + fail-fast)
//! - `task_resaver`: Worker per il singolo file

pub mod directory_resaver;
pub mod task_resaver;

pub use directory_resaver::DirectoryResaver;
pub use task_resaver::TaskResaver;
