//! Row synthesis: one bulk-upload row per (ad group, creative) pair.

use chrono::{Local, NaiveDateTime};
use rand::rngs::ThreadRng;
use rand::Rng;

use crate::grouping::{build_ad_groups, format_amount};
use crate::request::ExportRequest;
use crate::schema::{column, column_index, BULK_UPLOAD_COLUMNS, COLUMN_COUNT, FIXED_DEFAULTS};
use crate::url::destination_url;

/// `Start Time` cell format.
pub const START_TIME_FORMAT: &str = "%Y/%m/%d %H:%M";

// ---------------------------------------------------------------------------
// Title choice
// ---------------------------------------------------------------------------

/// Picks which ad title a row uses.
///
/// Returns an index into `pool`, or `None` when no title should be used.
/// Out-of-range indexes are treated as `None`.
pub trait TitleChooser {
    fn choose(&mut self, pool: &[String]) -> Option<usize>;
}

impl<F> TitleChooser for F
where
    F: FnMut(&[String]) -> Option<usize>,
{
    fn choose(&mut self, pool: &[String]) -> Option<usize> {
        self(pool)
    }
}

/// Uniform choice over the pool, independently per row.
pub struct RandomTitleChooser<R> {
    rng: R,
}

impl RandomTitleChooser<ThreadRng> {
    /// Chooser backed by the thread-local generator.
    pub fn thread() -> Self {
        Self { rng: rand::rng() }
    }
}

impl<R: Rng> RandomTitleChooser<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> TitleChooser for RandomTitleChooser<R> {
    fn choose(&mut self, pool: &[String]) -> Option<usize> {
        if pool.is_empty() {
            None
        } else {
            Some(self.rng.random_range(0..pool.len()))
        }
    }
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One sheet row: a value (possibly empty) for every schema column, in
/// schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    values: Vec<String>,
}

impl ExportRow {
    /// A row with every fixed default set and every other column empty.
    pub fn with_defaults() -> Self {
        let mut row = Self {
            values: vec![String::new(); COLUMN_COUNT],
        };
        for (name, value) in FIXED_DEFAULTS {
            row.set(name, *value);
        }
        row
    }

    /// Set a column by name. Names outside the schema are ignored.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        match column_index(column) {
            Some(i) => self.values[i] = value.into(),
            None => tracing::warn!(column, "Ignoring value for unknown bulk-upload column"),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        column_index(column).map(|i| self.values[i].as_str())
    }

    /// Values in schema order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// `(column, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        BULK_UPLOAD_COLUMNS
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// The start time Ads Manager needs for immediate activation: one day
/// before `now`.
pub fn start_time(now: NaiveDateTime) -> String {
    (now - chrono::Duration::days(1))
        .format(START_TIME_FORMAT)
        .to_string()
}

/// Campaign-level values shared by every row of a request.
fn campaign_row(request: &ExportRequest, start_time: &str) -> ExportRow {
    let mut row = ExportRow::with_defaults();
    row.set(column::CAMPAIGN_NAME, request.campaign_name.as_str());
    row.set(column::PIXEL_ID, request.pixel_id.as_str());
    row.set(column::OPTIMIZATION_EVENT, request.pixel_event.as_str());
    row.set(column::LOCATION, request.locations.join(","));
    row.set(column::LANGUAGES, request.languages.join(","));
    row.set(column::BUDGET, format_amount(request.budget));
    row.set(column::START_TIME, start_time);
    row.set(column::IDENTITY_ID, request.identity_id.as_str());
    row.set(column::TRACKING_PIXEL_ID, request.pixel_id.as_str());
    row.set(column::TRACKING_EVENT, request.event_name.as_str());
    row
}

/// Builds the rows of an export.
///
/// The title chooser and the clock are injected so output can be made
/// fully deterministic.
pub struct RowSynthesizer<C> {
    chooser: C,
    now: NaiveDateTime,
}

impl<C: TitleChooser> RowSynthesizer<C> {
    /// Synthesizer using the local wall clock.
    pub fn new(chooser: C) -> Self {
        Self {
            chooser,
            now: Local::now().naive_local(),
        }
    }

    /// Pin the clock used for `Start Time`.
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    /// One row per creative, ordered by group then by position in group.
    pub fn synthesize(&mut self, request: &ExportRequest) -> Vec<ExportRow> {
        let groups = build_ad_groups(request);
        let base = campaign_row(request, &start_time(self.now));
        let mut rows = Vec::with_capacity(request.file_names.len());

        for group in &groups {
            let ad_group_name = format!("ADG_{}_{}", group.index, request.id);
            let bid = format_amount(group.bid);

            for (j, creative) in group.creatives.iter().enumerate() {
                let title = self
                    .chooser
                    .choose(&request.ad_titles)
                    .and_then(|i| request.ad_titles.get(i))
                    .map(String::as_str);

                let mut row = base.clone();
                row.set(column::AD_GROUP_NAME, ad_group_name.as_str());
                row.set(column::BID, bid.as_str());
                row.set(
                    column::AD_NAME,
                    format!("AD_{}_{}_{}", group.index, j + 1, request.id),
                );
                row.set(column::VIDEO_NAME, creative.as_str());
                row.set(column::AD_TEXT, title.unwrap_or_default());
                row.set(column::DESTINATION_URL, destination_url(&request.url, title));
                rows.push(row);
            }
        }

        tracing::debug!(
            export_id = %request.id,
            groups = groups.len(),
            rows = rows.len(),
            "Synthesized bulk-upload rows"
        );
        rows
    }
}
