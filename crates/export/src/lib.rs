//! Bulk ad-campaign export generator.
//!
//! Expands one campaign export into the rows of the Ads Manager bulk-upload
//! sheet. Creatives are grouped into ad groups with interpolated bids, each
//! row gets a title from the pool, and the result is written as delimited
//! text, a fresh workbook, or appended to an existing template workbook.
//!
//! Data flows one way: [`ExportRequest`] → [`grouping`] → [`RowSynthesizer`]
//! → [`delimited`] / [`workbook`].

pub mod delimited;
pub mod error;
pub mod grouping;
pub mod request;
pub mod rows;
pub mod schema;
pub mod service;
pub mod url;
pub mod workbook;

pub use error::ExportError;
pub use request::ExportRequest;
pub use rows::{ExportRow, RandomTitleChooser, RowSynthesizer, TitleChooser};
pub use service::{export_by_id, generate, render, ExportFormat};
pub use workbook::TemplateOptions;
