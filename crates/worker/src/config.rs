//! Job configuration from the environment.

use std::path::PathBuf;

use creogen_export::workbook::DEFAULT_SHEET_NAME;
use creogen_export::{ExportFormat, TemplateOptions};

use crate::WorkerError;

/// Output directory when `EXPORT_OUTPUT_DIR` is unset.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// What to export and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub export_id: String,
    pub output_dir: PathBuf,
    pub format: ExportFormat,
}

impl JobConfig {
    /// Read the job settings from process environment variables.
    pub fn from_env() -> Result<Self, WorkerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WorkerError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let export_id = get("EXPORT_ID")
            .ok_or_else(|| WorkerError::Config("EXPORT_ID is required".into()))?;
        let output_dir = get("EXPORT_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let format = parse_format(
            get("EXPORT_FORMAT").as_deref(),
            get("EXPORT_TEMPLATE_PATH"),
            get("EXPORT_TEMPLATE_SHEET"),
        )?;

        Ok(Self {
            export_id,
            output_dir,
            format,
        })
    }

    /// `<output_dir>/<export_id>.<ext>`
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.export_id, self.format.extension()))
    }
}

/// Resolve the output format. A template path selects template mode and
/// requires `xlsx` (or no explicit format).
pub fn parse_format(
    format: Option<&str>,
    template_path: Option<String>,
    template_sheet: Option<String>,
) -> Result<ExportFormat, WorkerError> {
    let format = format.map(|f| f.trim().to_ascii_lowercase());
    match (format.as_deref(), template_path) {
        (None | Some("xlsx"), Some(path)) => Ok(ExportFormat::Template(
            TemplateOptions::new(path)
                .with_sheet(template_sheet.unwrap_or_else(|| DEFAULT_SHEET_NAME.into())),
        )),
        (Some("csv"), Some(_)) => Err(WorkerError::Config(
            "EXPORT_TEMPLATE_PATH requires EXPORT_FORMAT=xlsx".into(),
        )),
        (None | Some("csv"), None) => Ok(ExportFormat::Csv),
        (Some("xlsx"), None) => Ok(ExportFormat::Xlsx),
        (Some(other), _) => Err(WorkerError::Config(format!(
            "unknown EXPORT_FORMAT '{other}', expected csv or xlsx"
        ))),
    }
}
