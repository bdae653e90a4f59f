//! Validated export parameters.

use std::num::NonZeroUsize;
use std::str::FromStr;

use creogen_core::models::export::TtExport;
use rust_decimal::Decimal;
use serde_json::Value;
use validator::Validate;

use crate::error::ExportError;

/// Campaign parameters for one export call, with amounts parsed and the
/// group size checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    /// Id of the owning export document; namespaces generated names.
    pub id: String,
    pub campaign_name: String,
    pub pixel_id: String,
    pub pixel_event: String,
    pub locations: Vec<String>,
    pub languages: Vec<String>,
    pub budget: Decimal,
    /// Bid bounds in whatever order they were supplied.
    pub bid_min: Decimal,
    pub bid_max: Decimal,
    pub identity_id: String,
    pub url: String,
    pub event_name: String,
    pub file_names: Vec<String>,
    pub ad_titles: Vec<String>,
    /// Maximum number of creatives per ad group.
    pub ad_creatives_in_adgroup_count: NonZeroUsize,
}

impl TryFrom<&TtExport> for ExportRequest {
    type Error = ExportError;

    fn try_from(export: &TtExport) -> Result<Self, Self::Error> {
        export.validate()?;

        let id = export
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ExportError::validation("id", "export document has no id"))?;

        let (raw_min, raw_max) = export.bid_bounds();
        let budget = parse_amount("budget", Some(&export.budget))?;
        let bid_min = parse_amount("bid_min", raw_min)?;
        let bid_max = parse_amount("bid_max", raw_max)?;

        let ad_creatives_in_adgroup_count = usize::try_from(export.ad_creatives_in_adgroup_count)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| {
                ExportError::validation(
                    "ad_creatives_in_adgroup_count",
                    format!(
                        "must be at least 1, got {}",
                        export.ad_creatives_in_adgroup_count
                    ),
                )
            })?;

        Ok(Self {
            id,
            campaign_name: export.campaign_name.clone(),
            pixel_id: export.pixel_id.clone(),
            pixel_event: export.pixel_event.clone(),
            locations: export.locations.clone(),
            languages: export.languages.clone(),
            budget,
            bid_min,
            bid_max,
            identity_id: export.identity_id.clone(),
            url: export.url.clone(),
            event_name: export.event_name.clone(),
            file_names: export.file_names.clone(),
            ad_titles: export.title_pool(),
            ad_creatives_in_adgroup_count,
        })
    }
}

/// Parse a stored money amount. Accepts JSON numbers and numeric strings
/// (plain or scientific notation); rejects anything else and negatives.
pub fn parse_amount(field: &str, raw: Option<&Value>) -> Result<Decimal, ExportError> {
    let raw = raw.ok_or_else(|| ExportError::validation(field, "is required"))?;
    let text = match raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(ExportError::validation(
                field,
                format!("expected a number, got {other}"),
            ))
        }
    };

    let amount = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ExportError::validation(field, format!("'{text}' is not a number")))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ExportError::validation(
            field,
            format!("must not be negative, got {amount}"),
        ));
    }
    Ok(amount)
}
