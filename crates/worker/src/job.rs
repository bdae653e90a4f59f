//! Render one stored export to a file.

use std::path::PathBuf;

use creogen_core::store::DocumentStore;
use creogen_export::export_by_id;

use crate::config::JobConfig;
use crate::WorkerError;

/// Fetch the configured export, render it and write it to
/// [`JobConfig::output_path`]. Returns the written path.
pub async fn run<S>(store: &S, config: &JobConfig) -> Result<PathBuf, WorkerError>
where
    S: DocumentStore + ?Sized,
{
    let bytes = export_by_id(store, &config.export_id, &config.format).await?;

    tokio::fs::create_dir_all(&config.output_dir).await?;
    let path = config.output_path();
    tokio::fs::write(&path, &bytes).await?;

    tracing::info!(
        export_id = %config.export_id,
        path = %path.display(),
        bytes = bytes.len(),
        "Export written",
    );
    Ok(path)
}
