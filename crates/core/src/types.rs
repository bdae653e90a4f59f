/// Document ids are opaque strings assigned by the store (UUID v4 text).
pub type DocId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
