//! Semicolon-delimited text output.
//!
//! Ads Manager opens these files in spreadsheet tools that sniff the
//! encoding from a byte-order mark, so every file starts with one.

use crate::rows::ExportRow;
use crate::schema::BULK_UPLOAD_COLUMNS;

/// UTF-8 byte-order mark.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const DELIMITER: char = ';';

pub const LINE_ENDING: &str = "\r\n";

/// Quote a field when it contains the delimiter, a quote or a line break.
/// Inner quotes are doubled.
fn escape_field(value: &str) -> String {
    if value.contains(DELIMITER)
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r')
    {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn push_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(DELIMITER);
        }
        first = false;
        out.push_str(&escape_field(field));
    }
    out.push_str(LINE_ENDING);
}

/// Render a header line and one line per row, all columns in schema order.
pub fn write_delimited(rows: &[ExportRow]) -> Vec<u8> {
    let mut text = String::new();
    push_line(&mut text, BULK_UPLOAD_COLUMNS.iter().copied());
    for row in rows {
        push_line(&mut text, row.values().iter().map(String::as_str));
    }

    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + text.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{column, COLUMN_COUNT};

    fn lines(bytes: &[u8]) -> Vec<String> {
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        text.split_terminator(LINE_ENDING).map(String::from).collect()
    }

    // --- escaping ---

    #[test]
    fn plain_values_are_not_quoted() {
        assert_eq!(escape_field("Hi There"), "Hi There");
        assert_eq!(escape_field("a,b"), "a,b");
    }

    #[test]
    fn delimiter_quote_and_breaks_are_quoted() {
        assert_eq!(escape_field("a;b"), "\"a;b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("one\ntwo"), "\"one\ntwo\"");
        assert_eq!(escape_field("one\rtwo"), "\"one\rtwo\"");
    }

    // --- document ---

    #[test]
    fn header_only_when_no_rows() {
        let bytes = write_delimited(&[]);
        assert!(bytes.starts_with(UTF8_BOM));
        let lines = lines(&bytes);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], BULK_UPLOAD_COLUMNS.join(";"));
        assert!(bytes.ends_with(b"\r\n"));
    }

    #[test]
    fn quoted_title_keeps_field_count() {
        let mut row = ExportRow::with_defaults();
        row.set(column::AD_TEXT, "a;b");
        row.set(column::CAMPAIGN_NAME, "Spring");
        let bytes = write_delimited(&[row]);
        let lines = lines(&bytes);

        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"a;b\""));
        // one extra split from the quoted delimiter
        assert_eq!(lines[1].split(';').count(), COLUMN_COUNT + 1);
        assert_eq!(lines[0].split(';').count(), COLUMN_COUNT);
    }

    #[test]
    fn values_follow_schema_order() {
        let mut row = ExportRow::with_defaults();
        row.set(column::CAMPAIGN_NAME, "Spring");
        let bytes = write_delimited(&[row.clone()]);
        let lines = lines(&bytes);
        let fields: Vec<&str> = lines[1].split(';').collect();
        assert_eq!(fields.len(), COLUMN_COUNT);
        assert_eq!(fields, row.values().iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(fields[0], "");
        assert_eq!(fields[1], "Spring");
    }
}
