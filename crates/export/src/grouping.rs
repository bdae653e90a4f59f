//! Creative grouping and bid interpolation.
//!
//! Creatives are split into contiguous ad groups of at most
//! `ad_creatives_in_adgroup_count` videos, and every group gets one bid
//! spaced linearly across the request's bid range.

use std::num::NonZeroUsize;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::request::ExportRequest;

/// Decimal places kept for every money amount in the sheet.
pub const AMOUNT_DECIMALS: u32 = 2;

/// One ad group: a non-empty run of creatives sharing a bid.
#[derive(Debug, Clone, PartialEq)]
pub struct AdGroup<'a> {
    /// 1-based position of the group.
    pub index: usize,
    pub creatives: &'a [String],
    pub bid: Decimal,
}

/// Split `file_names` into contiguous chunks of `per_group`, keeping order.
///
/// Every chunk but possibly the last has exactly `per_group` entries. Empty
/// input yields no groups.
pub fn group_creatives(file_names: &[String], per_group: NonZeroUsize) -> Vec<&[String]> {
    file_names.chunks(per_group.get()).collect()
}

/// Round half away from zero to [`AMOUNT_DECIMALS`] places.
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Fixed two-decimal rendering, e.g. `1.5` → `"1.50"`.
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = round_amount(value);
    rounded.rescale(AMOUNT_DECIMALS);
    rounded.to_string()
}

/// `count` bids spaced evenly from the lower to the higher bound.
///
/// Bounds may be given in either order. The first bid is the low bound and,
/// for more than one group, the last is the high bound. Each value is
/// rounded with [`round_amount`].
pub fn interpolate_bids(bid_min: Decimal, bid_max: Decimal, count: usize) -> Vec<Decimal> {
    if count == 0 {
        return Vec::new();
    }
    let (low, high) = if bid_min <= bid_max {
        (bid_min, bid_max)
    } else {
        (bid_max, bid_min)
    };

    let steps = Decimal::from(count.saturating_sub(1).max(1));
    let span = high - low;

    // Multiply before dividing so exact midpoints such as 1.005 survive.
    (0..count)
        .map(|i| round_amount(low + span * Decimal::from(i) / steps))
        .collect()
}

/// Group the request's creatives and attach the interpolated bids.
pub fn build_ad_groups(request: &ExportRequest) -> Vec<AdGroup<'_>> {
    let chunks = group_creatives(&request.file_names, request.ad_creatives_in_adgroup_count);
    let bids = interpolate_bids(request.bid_min, request.bid_max, chunks.len());

    chunks
        .into_iter()
        .zip(bids)
        .enumerate()
        .map(|(i, (creatives, bid))| AdGroup {
            index: i + 1,
            creatives,
            bid,
        })
        .collect()
}
