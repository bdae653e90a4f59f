use creogen_core::store::StoreError;

/// Errors produced while building a bulk-upload export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A campaign parameter is missing or malformed. Raised before any
    /// output is produced.
    #[error("Validation failed for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// No row in the scanned window of the template shares a column name
    /// with the bulk-upload schema.
    #[error("no bulk-upload header found in the first {scanned_rows} rows of sheet '{sheet}'")]
    TemplateSchema { sheet: String, scanned_rows: u32 },

    /// The template could not be read or the workbook could not be written.
    #[error("workbook error: {0}")]
    Workbook(String),

    /// The export document does not exist.
    #[error("export {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ExportError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ExportError {
    /// Field names are reported sorted and comma-joined, so a single failing
    /// field is named exactly.
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut failures: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let codes: Vec<&str> = errs.iter().map(|e| e.code.as_ref()).collect();
                (field.to_string(), codes.join(", "))
            })
            .collect();
        failures.sort();

        let field = failures
            .iter()
            .map(|(field, _)| field.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let reason = failures
            .iter()
            .map(|(field, codes)| format!("{field} failed {codes}"))
            .collect::<Vec<_>>()
            .join("; ");
        Self::validation(field, reason)
    }
}
