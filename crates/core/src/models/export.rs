//! TikTok bulk-upload export parameters.
//!
//! A [`TtExport`] is what the platform persists when a user asks for a bulk
//! upload sheet. The export generator turns it into a validated request; this
//! module only carries the stored shape and the declarative field checks.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::DocId;

/// Placeholder in the destination URL replaced with the chosen ad title.
pub const URL_TITLE_PLACEHOLDER: &str = "YYYYYYY";

/// Stored campaign parameters for one bulk-upload export.
///
/// Money amounts are kept as raw JSON scalars because clients send both
/// numbers and numeric strings; they are parsed when the export runs.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TtExport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_id: Option<String>,

    #[validate(length(min = 1))]
    pub campaign_name: String,
    #[validate(length(min = 1))]
    pub pixel_id: String,
    pub pixel_event: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub identity_id: String,

    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,

    pub budget: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_min: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_max: Option<serde_json::Value>,
    /// Older exports carry a single bid used for every ad group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid: Option<serde_json::Value>,

    /// Destination URL; may contain [`URL_TITLE_PLACEHOLDER`].
    pub url: String,

    /// Creative video references, in upload order.
    #[serde(default)]
    pub file_names: Vec<String>,
    #[serde(default)]
    pub ad_titles: Vec<String>,
    /// Older exports carry a single ad text instead of a title pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[validate(range(min = 1))]
    pub ad_creatives_in_adgroup_count: i64,
}

super::impl_document!(TtExport, "tt_exports");

impl TtExport {
    /// Run the declarative field checks.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        Ok(())
    }

    /// The `(min, max)` raw bid bounds, falling back to the single legacy
    /// `bid` for whichever bound is missing.
    pub fn bid_bounds(&self) -> (Option<&serde_json::Value>, Option<&serde_json::Value>) {
        let legacy = self.bid.as_ref();
        (
            self.bid_min.as_ref().or(legacy),
            self.bid_max.as_ref().or(legacy),
        )
    }

    /// Distinct titles in first-seen order, with the legacy `text` used when
    /// no titles are stored.
    pub fn title_pool(&self) -> Vec<String> {
        if !self.ad_titles.is_empty() {
            let mut seen = HashSet::new();
            return self
                .ad_titles
                .iter()
                .filter(|title| seen.insert(title.as_str()))
                .cloned()
                .collect();
        }
        match &self.text {
            Some(text) if !text.trim().is_empty() => vec![text.clone()],
            _ => Vec::new(),
        }
    }
}
