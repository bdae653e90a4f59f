//! End-to-end export: request → rows → output bytes.

use creogen_core::models::export::TtExport;
use creogen_core::store::{DocumentStore, DocumentStoreExt};

use crate::delimited::write_delimited;
use crate::error::ExportError;
use crate::request::ExportRequest;
use crate::rows::{RandomTitleChooser, RowSynthesizer, TitleChooser};
use crate::workbook::{fill_template, write_workbook, TemplateOptions, DEFAULT_SHEET_NAME};

/// Output flavour of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportFormat {
    /// Semicolon-delimited text with a UTF-8 BOM.
    Csv,
    /// Fresh single-sheet workbook.
    Xlsx,
    /// Rows appended to a copy of an existing workbook.
    Template(TemplateOptions),
}

impl ExportFormat {
    /// File extension for the output bytes.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx | Self::Template(_) => "xlsx",
        }
    }
}

/// Synthesize rows for `request` and encode them as `format`.
pub fn render<C: TitleChooser>(
    request: &ExportRequest,
    synthesizer: &mut RowSynthesizer<C>,
    format: &ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    let rows = synthesizer.synthesize(request);
    let bytes = match format {
        ExportFormat::Csv => write_delimited(&rows),
        ExportFormat::Xlsx => write_workbook(&rows, DEFAULT_SHEET_NAME)?,
        ExportFormat::Template(options) => fill_template(&rows, options)?,
    };

    tracing::info!(
        export_id = %request.id,
        format = format.extension(),
        rows = rows.len(),
        bytes = bytes.len(),
        "Generated bulk-upload export"
    );
    Ok(bytes)
}

/// Validate a stored export and render it with random titles and the
/// current time.
pub fn generate(export: &TtExport, format: &ExportFormat) -> Result<Vec<u8>, ExportError> {
    let request = ExportRequest::try_from(export)?;
    let mut synthesizer = RowSynthesizer::new(RandomTitleChooser::thread());
    render(&request, &mut synthesizer, format)
}

/// Load the export document `id` from `store` and render it.
pub async fn export_by_id<S>(store: &S, id: &str, format: &ExportFormat) -> Result<Vec<u8>, ExportError>
where
    S: DocumentStore + ?Sized,
{
    let export: TtExport = store
        .fetch_by_id(id)
        .await?
        .ok_or_else(|| ExportError::NotFound(id.to_string()))?;
    generate(&export, format)
}
