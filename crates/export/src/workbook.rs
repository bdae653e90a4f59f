//! XLSX output: a fresh single-sheet workbook, or rows appended to a
//! user-supplied template.
//!
//! Template placement runs in two phases. The header row is discovered by
//! name overlap with the schema, so templates may carry banner rows,
//! reordered columns or columns we do not know. The first data row is then
//! picked from the anchor cell under the header.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::PathBuf;

use umya_spreadsheet::{Spreadsheet, Worksheet};

use crate::error::ExportError;
use crate::rows::ExportRow;
use crate::schema::{column_index, ANCHOR_COLUMN, BULK_UPLOAD_COLUMNS};

/// Sheet name for fresh workbooks and the default template sheet hint.
pub const DEFAULT_SHEET_NAME: &str = "Ads";

/// Rows scanned from the top of a template sheet when looking for the header.
pub const HEADER_SCAN_ROWS: u32 = 50;

/// Upper bound for auto-sized column widths, in characters.
pub const MAX_COLUMN_WIDTH: usize = 50;

fn workbook_error(context: &str, err: impl std::fmt::Display) -> ExportError {
    ExportError::Workbook(format!("{context}: {err}"))
}

fn to_bytes(book: &Spreadsheet) -> Result<Vec<u8>, ExportError> {
    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(book, &mut cursor)
        .map_err(|e| workbook_error("failed to write workbook", e))?;
    Ok(cursor.into_inner())
}

// ---------------------------------------------------------------------------
// Fresh workbook
// ---------------------------------------------------------------------------

/// Display width of each schema column: the longest of the header and every
/// value, capped at [`MAX_COLUMN_WIDTH`].
pub fn column_widths(rows: &[ExportRow]) -> Vec<usize> {
    BULK_UPLOAD_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| row.values()[i].chars().count())
                .fold(header.chars().count(), usize::max)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// A workbook with one sheet named `sheet_name`: schema header in row 1,
/// one row per [`ExportRow`] below it.
pub fn write_workbook(rows: &[ExportRow], sheet_name: &str) -> Result<Vec<u8>, ExportError> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_mut(&0)
        .ok_or_else(|| ExportError::Workbook("new workbook has no sheet".into()))?;
    sheet.set_name(sheet_name);

    for (i, header) in BULK_UPLOAD_COLUMNS.iter().enumerate() {
        sheet.get_cell_mut((i as u32 + 1, 1)).set_value_string(*header);
    }
    for (r, row) in rows.iter().enumerate() {
        let row_number = r as u32 + 2;
        for (i, value) in row.values().iter().enumerate() {
            if !value.is_empty() {
                sheet
                    .get_cell_mut((i as u32 + 1, row_number))
                    .set_value_string(value.as_str());
            }
        }
    }
    for (i, width) in column_widths(rows).into_iter().enumerate() {
        sheet
            .get_column_dimension_by_number_mut(&(i as u32 + 1))
            .set_width(width as f64);
    }

    let bytes = to_bytes(&book)?;
    tracing::debug!(rows = rows.len(), bytes = bytes.len(), "Wrote fresh workbook");
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Template discovery
// ---------------------------------------------------------------------------

/// Where to find the template workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOptions {
    pub path: PathBuf,
    /// Sheet name, matched exactly, then as a case-insensitive substring.
    pub sheet_name: String,
}

impl TemplateOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }

    pub fn with_sheet(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }
}

/// Read access to a sheet's cells. Coordinates are 1-based.
pub trait SheetCells {
    /// Cell text, empty for missing cells.
    fn cell_text(&self, col: u32, row: u32) -> String;
    fn max_row(&self) -> u32;
    fn max_col(&self) -> u32;
}

impl SheetCells for Worksheet {
    fn cell_text(&self, col: u32, row: u32) -> String {
        self.get_value((col, row))
    }

    fn max_row(&self) -> u32 {
        self.get_highest_row()
    }

    fn max_col(&self) -> u32 {
        self.get_highest_column()
    }
}

/// Schema columns found in a template and where they live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    /// 1-based header row.
    pub row: u32,
    /// Schema column name → 1-based sheet column.
    pub columns: BTreeMap<&'static str, u32>,
}

impl HeaderMap {
    pub fn column(&self, name: &str) -> Option<u32> {
        self.columns.get(name).copied()
    }
}

/// Index of the sheet to use for `hint`.
///
/// Exact name first, then the first sheet whose name contains `hint`
/// ignoring case, then the first sheet. `None` only for an empty list.
pub fn select_sheet<S: AsRef<str>>(names: &[S], hint: &str) -> Option<usize> {
    if names.is_empty() {
        return None;
    }
    if let Some(i) = names.iter().position(|n| n.as_ref() == hint) {
        return Some(i);
    }
    let needle = hint.to_lowercase();
    if let Some(i) = names
        .iter()
        .position(|n| n.as_ref().to_lowercase().contains(&needle))
    {
        return Some(i);
    }
    tracing::warn!(hint, "Template sheet not found, using the first sheet");
    Some(0)
}

/// Schema columns present in one sheet row.
fn header_candidates(sheet: &impl SheetCells, row: u32) -> BTreeMap<&'static str, u32> {
    let mut columns = BTreeMap::new();
    for col in 1..=sheet.max_col() {
        let text = sheet.cell_text(col, row);
        if let Some(i) = column_index(text.trim()) {
            columns.entry(BULK_UPLOAD_COLUMNS[i]).or_insert(col);
        }
    }
    columns
}

/// Find the header row: the row within the first [`HEADER_SCAN_ROWS`] rows
/// sharing the most names with the schema. The earliest row wins ties.
pub fn discover_header(
    sheet: &impl SheetCells,
    sheet_name: &str,
) -> Result<HeaderMap, ExportError> {
    let last = sheet.max_row().min(HEADER_SCAN_ROWS);
    let mut best: Option<HeaderMap> = None;

    for row in 1..=last {
        let columns = header_candidates(sheet, row);
        let better = match &best {
            Some(current) => columns.len() > current.columns.len(),
            None => !columns.is_empty(),
        };
        if better {
            best = Some(HeaderMap { row, columns });
        }
    }

    best.ok_or_else(|| ExportError::TemplateSchema {
        sheet: sheet_name.to_string(),
        scanned_rows: HEADER_SCAN_ROWS,
    })
}

fn row_is_empty(sheet: &impl SheetCells, row: u32) -> bool {
    (1..=sheet.max_col()).all(|col| sheet.cell_text(col, row).trim().is_empty())
}

/// First row to write data into.
///
/// Directly under the header when the anchor cell there is empty or the
/// template has no anchor column. Otherwise after the last row holding any
/// value.
pub fn append_row(sheet: &impl SheetCells, header: &HeaderMap) -> u32 {
    let below = header.row + 1;
    let Some(anchor) = header.column(ANCHOR_COLUMN) else {
        return below;
    };
    if sheet.cell_text(anchor, below).trim().is_empty() {
        return below;
    }
    (below..=sheet.max_row())
        .rev()
        .find(|row| !row_is_empty(sheet, *row))
        .map_or(below, |row| row + 1)
}

// ---------------------------------------------------------------------------
// Template fill
// ---------------------------------------------------------------------------

fn write_rows(sheet: &mut Worksheet, header: &HeaderMap, start: u32, rows: &[ExportRow]) {
    for (offset, row) in rows.iter().enumerate() {
        let row_number = start + offset as u32;
        for (name, col) in &header.columns {
            match row.get(name) {
                Some(value) if !value.is_empty() => {
                    sheet.get_cell_mut((*col, row_number)).set_value_string(value);
                }
                _ => {}
            }
        }
    }
}

/// Load the template, append `rows` under its header and return the
/// resulting workbook. The template file itself is left untouched.
pub fn fill_template(
    rows: &[ExportRow],
    options: &TemplateOptions,
) -> Result<Vec<u8>, ExportError> {
    let mut book = umya_spreadsheet::reader::xlsx::read(&options.path).map_err(|e| {
        workbook_error(
            &format!("failed to read template {}", options.path.display()),
            e,
        )
    })?;

    let names: Vec<String> = book
        .get_sheet_collection()
        .iter()
        .map(|s| s.get_name().to_string())
        .collect();
    let index = select_sheet(&names, &options.sheet_name)
        .ok_or_else(|| ExportError::Workbook("template has no sheets".into()))?;
    let sheet = book
        .get_sheet_mut(&index)
        .ok_or_else(|| ExportError::Workbook(format!("sheet {index} missing")))?;

    let header = discover_header(&*sheet, &names[index])?;
    let start = append_row(&*sheet, &header);
    write_rows(sheet, &header, start, rows);

    tracing::info!(
        template = %options.path.display(),
        sheet = %names[index],
        header_row = header.row,
        mapped_columns = header.columns.len(),
        start_row = start,
        rows = rows.len(),
        "Filled template"
    );
    to_bytes(&book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::column;
    use assert_matches::assert_matches;

    /// In-memory sheet; `cells[r][c]` is row `r + 1`, column `c + 1`.
    struct Grid(Vec<Vec<&'static str>>);

    impl SheetCells for Grid {
        fn cell_text(&self, col: u32, row: u32) -> String {
            self.0
                .get(row as usize - 1)
                .and_then(|r| r.get(col as usize - 1))
                .map(|s| s.to_string())
                .unwrap_or_default()
        }

        fn max_row(&self) -> u32 {
            self.0.len() as u32
        }

        fn max_col(&self) -> u32 {
            self.0.iter().map(Vec::len).max().unwrap_or(0) as u32
        }
    }

    fn sample_row(name: &str) -> ExportRow {
        let mut row = ExportRow::with_defaults();
        row.set(column::CAMPAIGN_NAME, name);
        row.set(column::AD_TEXT, "Hi There");
        row
    }

    // --- sheet selection ---

    #[test]
    fn exact_name_wins() {
        assert_eq!(select_sheet(&["my ads", "Ads"], "Ads"), Some(1));
    }

    #[test]
    fn substring_match_ignores_case() {
        assert_eq!(select_sheet(&["Notes", "Bulk ADS upload"], "ads"), Some(1));
    }

    #[test]
    fn falls_back_to_first_sheet() {
        assert_eq!(select_sheet(&["Sheet1", "Sheet2"], "Ads"), Some(0));
        assert_eq!(select_sheet::<&str>(&[], "Ads"), None);
    }

    // --- header discovery ---

    #[test]
    fn header_below_banner_rows() {
        let grid = Grid(vec![
            vec!["Bulk upload"],
            vec![""],
            vec!["Campaign ID", "Notes", "Campaign Name", "Ad Text"],
        ]);
        let header = discover_header(&grid, "Ads").unwrap();
        assert_eq!(header.row, 3);
        assert_eq!(header.column("Campaign ID"), Some(1));
        assert_eq!(header.column("Campaign Name"), Some(3));
        assert_eq!(header.column("Ad Text"), Some(4));
        assert_eq!(header.column("Notes"), None);
    }

    #[test]
    fn best_overlap_wins_and_ties_keep_first() {
        let grid = Grid(vec![
            vec!["Budget"],
            vec!["Bid", "Ad Name"],
            vec!["Ad Text", "Ad Name"],
        ]);
        assert_eq!(discover_header(&grid, "Ads").unwrap().row, 2);
    }

    #[test]
    fn header_cells_are_trimmed() {
        let grid = Grid(vec![vec!["  Campaign Name "]]);
        let header = discover_header(&grid, "Ads").unwrap();
        assert_eq!(header.column("Campaign Name"), Some(1));
    }

    #[test]
    fn no_overlap_is_a_schema_error() {
        let grid = Grid(vec![vec!["foo", "bar"], vec!["baz"]]);
        assert_matches!(
            discover_header(&grid, "Ads"),
            Err(ExportError::TemplateSchema { ref sheet, scanned_rows: 50 }) if sheet == "Ads"
        );
    }

    #[test]
    fn header_past_scan_window_is_not_found() {
        let mut rows = vec![vec![""]; 50];
        rows.push(vec!["Campaign Name"]);
        assert_matches!(
            discover_header(&Grid(rows), "Ads"),
            Err(ExportError::TemplateSchema { .. })
        );
    }

    // --- append position ---

    #[test]
    fn empty_anchor_writes_directly_below_header() {
        let grid = Grid(vec![
            vec!["Title"],
            vec![""],
            vec!["Campaign ID", "Campaign Name"],
            vec!["", "leftover"],
        ]);
        let header = discover_header(&grid, "Ads").unwrap();
        assert_eq!(append_row(&grid, &header), 4);
    }

    #[test]
    fn populated_anchor_appends_after_last_row() {
        let mut rows = vec![vec![""], vec![""], vec!["Campaign ID", "Campaign Name"]];
        for _ in 4..=10 {
            rows.push(vec!["123", "Spring"]);
        }
        let grid = Grid(rows);
        let header = discover_header(&grid, "Ads").unwrap();
        assert_eq!(append_row(&grid, &header), 11);
    }

    #[test]
    fn gaps_are_skipped_when_appending() {
        let grid = Grid(vec![
            vec!["Campaign ID"],
            vec!["1"],
            vec![""],
            vec!["", "x"],
            vec![""],
        ]);
        let header = discover_header(&grid, "Ads").unwrap();
        assert_eq!(append_row(&grid, &header), 5);
    }

    #[test]
    fn missing_anchor_column_writes_below_header() {
        let grid = Grid(vec![vec!["Campaign Name"], vec!["Spring"], vec!["Autumn"]]);
        let header = discover_header(&grid, "Ads").unwrap();
        assert_eq!(append_row(&grid, &header), 2);
    }

    // --- widths ---

    #[test]
    fn widths_are_capped() {
        let mut row = ExportRow::with_defaults();
        row.set(column::AD_TEXT, "x".repeat(80));
        let widths = column_widths(&[row]);
        let ad_text = column_index(column::AD_TEXT).unwrap();
        assert_eq!(widths[ad_text], MAX_COLUMN_WIDTH);
        assert_eq!(widths[column_index("Bid").unwrap()], 3);
        assert_eq!(widths[0], "Campaign ID".len());
    }

    // --- workbook round trips ---

    fn read_back(bytes: Vec<u8>) -> Spreadsheet {
        umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes), true).unwrap()
    }

    #[test]
    fn fresh_workbook_has_header_and_rows() {
        let bytes = write_workbook(&[sample_row("Spring")], "Ads").unwrap();
        let book = read_back(bytes);
        let sheet = book.get_sheet_by_name("Ads").unwrap();
        assert_eq!(sheet.get_value((1, 1)), "Campaign ID");
        assert_eq!(sheet.get_value((2, 1)), "Campaign Name");
        assert_eq!(sheet.get_value((2, 2)), "Spring");
        let ad_text = column_index(column::AD_TEXT).unwrap() as u32 + 1;
        assert_eq!(sheet.get_value((ad_text, 2)), "Hi There");
    }

    fn template_with(rows: &[&[&str]]) -> (tempfile::TempDir, TemplateOptions) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.xlsx");
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.set_name("Bulk Ads");
        for (r, cells) in rows.iter().enumerate() {
            for (c, value) in cells.iter().enumerate() {
                if !value.is_empty() {
                    sheet
                        .get_cell_mut((c as u32 + 1, r as u32 + 1))
                        .set_value_string(*value);
                }
            }
        }
        umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();
        (dir, TemplateOptions::new(path))
    }

    #[test]
    fn template_rows_land_under_header() {
        let (_dir, options) = template_with(&[
            &["Upload sheet"],
            &[],
            &["Campaign ID", "Ad Text", "Internal", "Campaign Name"],
        ]);
        let bytes = fill_template(&[sample_row("Spring"), sample_row("Autumn")], &options).unwrap();
        let book = read_back(bytes);
        let sheet = book.get_sheet_by_name("Bulk Ads").unwrap();

        assert_eq!(sheet.get_value((1, 1)), "Upload sheet");
        assert_eq!(sheet.get_value((4, 4)), "Spring");
        assert_eq!(sheet.get_value((2, 4)), "Hi There");
        assert_eq!(sheet.get_value((4, 5)), "Autumn");
        assert_eq!(sheet.get_value((3, 4)), "");
        assert_eq!(sheet.get_value((1, 4)), "");
    }

    #[test]
    fn template_with_data_is_appended_to() {
        let (_dir, options) = template_with(&[
            &["Campaign ID", "Campaign Name"],
            &["1", "Old"],
            &["2", "Older"],
        ]);
        let bytes = fill_template(&[sample_row("New")], &options).unwrap();
        let sheet_book = read_back(bytes);
        let sheet = sheet_book.get_sheet(&0).unwrap();
        assert_eq!(sheet.get_value((2, 3)), "Older");
        assert_eq!(sheet.get_value((2, 4)), "New");
    }

    #[test]
    fn template_without_schema_header_fails() {
        let (_dir, options) = template_with(&[&["foo", "bar"]]);
        assert_matches!(
            fill_template(&[sample_row("x")], &options),
            Err(ExportError::TemplateSchema { .. })
        );
    }

    #[test]
    fn missing_template_is_a_workbook_error() {
        let options = TemplateOptions::new("/nonexistent/template.xlsx");
        assert_matches!(
            fill_template(&[], &options),
            Err(ExportError::Workbook(_))
        );
    }
}
