//! TikTok bulk-upload sheet schema.
//!
//! [`BULK_UPLOAD_COLUMNS`] is the column list of the Ads Manager bulk import
//! template, in template order. The delimited export writes exactly these
//! columns in this order; template mode matches them by name.
//!
//! [`FIXED_DEFAULTS`] are the values every row carries regardless of the
//! campaign parameters. Ads Manager validates them against its own
//! vocabulary, so they must be reproduced character for character.

/// Ordered column names of the bulk import sheet.
pub const BULK_UPLOAD_COLUMNS: [&str; 140] = [
    "Campaign ID",
    "Campaign Name",
    "Advertising Objective",
    "Campaign Type",
    "iOS 14 Dedicated Campaign",
    "Special Ad Categories",
    "Campaign Budget Optimization",
    "Campaign Budget Type",
    "Campaign Budget",
    "Campaign Bid Strategy",
    "Campaign Status",
    "Ad Group ID",
    "Ad Group Name",
    "Ad Group Status",
    "Optimization Location",
    "Website",
    "App ID",
    "Pixel ID",
    "Optimization Event",
    "Secondary Goal",
    "Placement Type",
    "Placements",
    "TikTok Placement",
    "Pangle Placement",
    "Global App Bundle Placement",
    "Include Search Results",
    "User Comments",
    "Allow Video Download",
    "Allow Video Sharing",
    "Audience Type",
    "Custom Audience Include",
    "Custom Audience Exclude",
    "Location",
    "Zipcode/Postcode",
    "Gender",
    "Age",
    "Languages",
    "Spending Power",
    "Household Income",
    "Interest Category",
    "Interest Keywords",
    "Video Interactions",
    "Creator Interactions",
    "Hashtag Interactions",
    "Operating System",
    "OS Versions",
    "Device Models",
    "Device Price",
    "Connection Type",
    "Carriers",
    "Internet Service Providers",
    "Targeting Expansion",
    "Smart Audience",
    "Budget Type",
    "Budget",
    "Schedule Type",
    "Start Time",
    "End Time",
    "Dayparting",
    "Optimization Goal",
    "Billing Event",
    "Bid Strategy",
    "Bid",
    "Target CPA",
    "ROAS Bid",
    "Delivery Type",
    "Frequency Cap",
    "Click-through Window",
    "View-through Window",
    "Engaged View-through Window",
    "Event Count",
    "Automated Creative Optimization",
    "Brand Safety",
    "Inventory Filter",
    "Category Exclusion",
    "Vertical Sensitivity",
    "Blocked Pangle Apps",
    "Ad ID",
    "Ad Name",
    "Ad Status",
    "Identity Type",
    "Identity ID",
    "Identity Authorized BC ID",
    "Ad Format",
    "Spark Ads",
    "TikTok Post ID",
    "Authorization Code",
    "Creative Type",
    "Video ID",
    "Video Name",
    "Image ID",
    "Image Name",
    "Cover Image",
    "Carousel Images",
    "Music ID",
    "Ad Text",
    "Smart Text",
    "Call to Action Type",
    "Call to Action",
    "Dynamic Call to Action",
    "Destination Type",
    "Destination URL",
    "URL Parameters",
    "Deeplink Type",
    "Deeplink",
    "Fallback Type",
    "Instant Page ID",
    "Display Name",
    "Profile Image",
    "Interactive Add-on Type",
    "Interactive Add-on ID",
    "Product Set ID",
    "Catalog ID",
    "Shopping Ads Type",
    "Product Source",
    "Store ID",
    "Tracking Pixel ID",
    "Tracking Event",
    "Tracking App ID",
    "Impression Tracking URL",
    "Click Tracking URL",
    "Third-party Tracking Tool",
    "Creative Auto-enhancement",
    "Auto-generate Captions",
    "Promotional Music",
    "Disclaimer Type",
    "Disclaimer Text",
    "Disclaimer Link",
    "Playable Material ID",
    "Page ID",
    "Lead Form ID",
    "Phone Region Code",
    "Phone Number",
    "Message Event Set ID",
    "Search Keywords",
    "Campaign Operation Status",
    "Ad Group Operation Status",
    "Ad Operation Status",
    "Primary Status",
    "Error Message",
];
/// The probe column for template append detection: the schema's first field.
pub const ANCHOR_COLUMN: &str = BULK_UPLOAD_COLUMNS[0];

/// Number of columns in the bulk import sheet.
pub const COLUMN_COUNT: usize = BULK_UPLOAD_COLUMNS.len();

/// Columns filled from the campaign parameters, ad groups, or per-row choices.
pub mod column {
    pub const CAMPAIGN_NAME: &str = "Campaign Name";
    pub const AD_GROUP_NAME: &str = "Ad Group Name";
    pub const PIXEL_ID: &str = "Pixel ID";
    pub const OPTIMIZATION_EVENT: &str = "Optimization Event";
    pub const LOCATION: &str = "Location";
    pub const LANGUAGES: &str = "Languages";
    pub const BUDGET: &str = "Budget";
    pub const START_TIME: &str = "Start Time";
    pub const BID: &str = "Bid";
    pub const AD_NAME: &str = "Ad Name";
    pub const IDENTITY_ID: &str = "Identity ID";
    pub const VIDEO_NAME: &str = "Video Name";
    pub const AD_TEXT: &str = "Ad Text";
    pub const DESTINATION_URL: &str = "Destination URL";
    pub const TRACKING_PIXEL_ID: &str = "Tracking Pixel ID";
    pub const TRACKING_EVENT: &str = "Tracking Event";
}

/// Constant cell values for a single-video, website-conversion campaign with
/// a custom identity.
pub const FIXED_DEFAULTS: &[(&str, &str)] = &[
    ("Advertising Objective", "Website Conversions"),
    ("Campaign Type", "Regular"),
    ("iOS 14 Dedicated Campaign", "Off"),
    ("Campaign Budget Optimization", "Off"),
    ("Campaign Budget Type", "No Limit"),
    ("Campaign Status", "On"),
    ("Ad Group Status", "On"),
    ("Optimization Location", "Website"),
    ("Placement Type", "Select Placement"),
    ("Placements", "TikTok"),
    ("Include Search Results", "On"),
    ("User Comments", "On"),
    ("Allow Video Download", "Off"),
    ("Allow Video Sharing", "On"),
    ("Audience Type", "Custom"),
    ("Gender", "All"),
    ("Age", "18+"),
    ("Targeting Expansion", "Off"),
    ("Budget Type", "Daily"),
    ("Schedule Type", "Set start time and run ad group continuously"),
    ("Dayparting", "All Day"),
    ("Optimization Goal", "Conversion"),
    ("Billing Event", "oCPM"),
    ("Bid Strategy", "Cost Cap"),
    ("Delivery Type", "Standard"),
    ("Click-through Window", "7-day click"),
    ("View-through Window", "1-day view"),
    ("Event Count", "Every"),
    ("Automated Creative Optimization", "Off"),
    ("Inventory Filter", "Standard Inventory"),
    ("Ad Status", "On"),
    ("Identity Type", "Custom Identity"),
    ("Ad Format", "Single Video"),
    ("Spark Ads", "Off"),
    ("Call to Action Type", "Standard"),
    ("Call to Action", "Learn More"),
    ("Destination Type", "Website"),
    ("Creative Type", "Video"),
];

/// Position of `name` in [`BULK_UPLOAD_COLUMNS`].
pub fn column_index(name: &str) -> Option<usize> {
    BULK_UPLOAD_COLUMNS.iter().position(|c| *c == name)
}
