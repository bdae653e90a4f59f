//! Full export pipeline:
//! - deterministic output with a pinned chooser and clock
//! - only title-derived columns vary between random runs
//! - every delimited line carries the full schema
//! - export_by_id against the in-memory store, including missing ids

use std::str::FromStr;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveDateTime};
use creogen_core::models::export::TtExport;
use creogen_core::store::DocumentStoreExt;
use creogen_db::MemoryDocumentStore;
use creogen_export::delimited::UTF8_BOM;
use creogen_export::schema::{column, BULK_UPLOAD_COLUMNS, COLUMN_COUNT};
use creogen_export::{
    export_by_id, render, ExportError, ExportFormat, ExportRequest, RandomTitleChooser,
    RowSynthesizer,
};
use rust_decimal::Decimal;
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn export() -> TtExport {
    serde_json::from_value(json!({
        "id": "exp42",
        "campaign_name": "Summer",
        "pixel_id": "PX9",
        "pixel_event": "Complete Payment",
        "locations": ["US", "GB"],
        "languages": ["en"],
        "budget": "250",
        "bid_min": 1,
        "bid_max": 2,
        "identity_id": "ID-1",
        "url": "https://shop.example/?utm_content=YYYYYYY",
        "event_name": "purchase",
        "file_names": ["v1.mp4", "v2.mp4", "v3.mp4", "v4.mp4", "v5.mp4"],
        "ad_titles": ["Big sale", "Only today; hurry", "Say \"yes\""],
        "ad_creatives_in_adgroup_count": 2
    }))
    .unwrap()
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 30, 0)
        .unwrap()
}

fn pinned(request: &ExportRequest) -> Vec<u8> {
    let mut synth = RowSynthesizer::new(|_: &[String]| Some(1)).at(now());
    render(request, &mut synth, &ExportFormat::Csv).unwrap()
}

/// Splits delimited output into lines of raw fields, honouring quotes.
fn parse_lines(bytes: &[u8]) -> Vec<Vec<String>> {
    let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
    let mut lines = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ';' if !quoted => fields.push(std::mem::take(&mut field)),
            '\r' if !quoted && chars.peek() == Some(&'\n') => {
                chars.next();
                fields.push(std::mem::take(&mut field));
                lines.push(std::mem::take(&mut fields));
            }
            _ => field.push(c),
        }
    }
    lines
}

fn col(name: &str) -> usize {
    BULK_UPLOAD_COLUMNS.iter().position(|c| *c == name).unwrap()
}

// ---------------------------------------------------------------------------
// Delimited pipeline
// ---------------------------------------------------------------------------

#[test]
fn pinned_chooser_and_clock_are_deterministic() {
    let request = ExportRequest::try_from(&export()).unwrap();
    assert_eq!(pinned(&request), pinned(&request));
}

#[test]
fn every_line_has_every_column() {
    let request = ExportRequest::try_from(&export()).unwrap();
    let lines = parse_lines(&pinned(&request));

    assert_eq!(lines.len(), 1 + 5);
    assert!(lines.iter().all(|l| l.len() == COLUMN_COUNT));
    assert_eq!(lines[0], BULK_UPLOAD_COLUMNS.map(String::from).to_vec());
}

#[test]
fn groups_bids_and_titles_reach_the_file() {
    let request = ExportRequest::try_from(&export()).unwrap();
    let lines = parse_lines(&pinned(&request));
    let data = &lines[1..];

    let groups: Vec<&str> = data.iter().map(|l| l[col(column::AD_GROUP_NAME)].as_str()).collect();
    assert_eq!(
        groups,
        vec!["ADG_1_exp42", "ADG_1_exp42", "ADG_2_exp42", "ADG_2_exp42", "ADG_3_exp42"]
    );
    let bids: Vec<&str> = data.iter().map(|l| l[col(column::BID)].as_str()).collect();
    assert_eq!(bids, vec!["1.00", "1.00", "1.50", "1.50", "2.00"]);

    let row = &data[0];
    assert_eq!(row[col(column::AD_TEXT)], "Only today; hurry");
    assert_eq!(
        row[col(column::DESTINATION_URL)],
        "https://shop.example/?utm_content=Only%20today%3B%20hurry"
    );
    assert_eq!(row[col(column::BUDGET)], "250.00");
    assert_eq!(row[col(column::START_TIME)], "2024/12/31 00:30");
    assert_eq!(row[col(column::LOCATION)], "US,GB");
    assert_eq!(row[col(column::VIDEO_NAME)], "v1.mp4");
    assert_eq!(data[4][col(column::AD_NAME)], "AD_3_1_exp42");
}

#[test]
fn random_titles_only_touch_text_and_url() {
    let request = ExportRequest::try_from(&export()).unwrap();
    let render_random = || {
        let mut synth = RowSynthesizer::new(RandomTitleChooser::thread()).at(now());
        parse_lines(&render(&request, &mut synth, &ExportFormat::Csv).unwrap())
    };
    let a = render_random();
    let b = render_random();

    let varying = [col(column::AD_TEXT), col(column::DESTINATION_URL)];
    for (la, lb) in a.iter().zip(&b) {
        for i in 0..COLUMN_COUNT {
            if !varying.contains(&i) {
                assert_eq!(la[i], lb[i], "column {}", BULK_UPLOAD_COLUMNS[i]);
            }
        }
    }
    for line in &a[1..] {
        assert!(request.ad_titles.contains(&line[col(column::AD_TEXT)]));
    }
}

#[test]
fn equal_bounds_give_one_bid_everywhere() {
    let mut tt = export();
    tt.bid_min = Some(json!("1.5"));
    tt.bid_max = Some(json!(1.5));
    let request = ExportRequest::try_from(&tt).unwrap();
    let bid = Decimal::from_str("1.5").unwrap();
    assert_eq!((request.bid_min, request.bid_max), (bid, bid));

    let lines = parse_lines(&pinned(&request));
    assert!(lines[1..].iter().all(|l| l[col(column::BID)] == "1.50"));
}

#[test]
fn no_creatives_gives_header_only() {
    let mut tt = export();
    tt.file_names.clear();
    let request = ExportRequest::try_from(&tt).unwrap();
    assert_eq!(parse_lines(&pinned(&request)).len(), 1);
}

#[test]
fn fresh_workbook_renders() {
    let request = ExportRequest::try_from(&export()).unwrap();
    let mut synth = RowSynthesizer::new(|_: &[String]| Some(0)).at(now());
    let bytes = render(&request, &mut synth, &ExportFormat::Xlsx).unwrap();
    // xlsx is a zip archive
    assert!(bytes.starts_with(b"PK"));
}

// ---------------------------------------------------------------------------
// Store-backed export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn export_by_id_reads_from_store() {
    let store = MemoryDocumentStore::new();
    let mut tt = export();
    tt.id = None;
    let saved = store.store(tt).await.unwrap();
    let id = saved.id.clone().unwrap();

    let bytes = export_by_id(&store, &id, &ExportFormat::Csv).await.unwrap();
    let lines = parse_lines(&bytes);
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[1][col(column::AD_GROUP_NAME)], format!("ADG_1_{id}"));
    assert_eq!(lines[1][col(column::CAMPAIGN_NAME)], "Summer");
}

#[tokio::test]
async fn missing_export_is_not_found() {
    let store = MemoryDocumentStore::new();
    assert_matches!(
        export_by_id(&store, "nope", &ExportFormat::Csv).await,
        Err(ExportError::NotFound(ref id)) if id == "nope"
    );
}

#[tokio::test]
async fn invalid_export_fails_before_output() {
    let store = MemoryDocumentStore::new();
    let mut tt = export();
    tt.bid_max = Some(json!("lots"));
    store.store_with_id("bad", tt).await.unwrap();

    assert_matches!(
        export_by_id(&store, "bad", &ExportFormat::Csv).await,
        Err(ExportError::Validation { ref field, .. }) if field == "bid_max"
    );
}
