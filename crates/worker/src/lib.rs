//! `creogen-worker` library crate.
//!
//! Job configuration and the single export job. The binary entrypoint lives
//! in `main.rs`.

pub mod config;
pub mod job;

use creogen_export::ExportError;

/// Errors that end a worker run.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
