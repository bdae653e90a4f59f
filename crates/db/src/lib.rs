//! Document store backends.
//!
//! [`PgDocumentStore`] keeps every collection in one Postgres table of JSONB
//! documents. [`MemoryDocumentStore`] implements the same contract in process
//! and backs tests and local tooling.

pub mod memory;
pub mod pg;

pub use memory::MemoryDocumentStore;
pub use pg::PgDocumentStore;

/// Default pool size when `DB_MAX_CONNECTIONS` is not set.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection settings for [`PgDocumentStore::connect`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Read `DATABASE_URL` (required) and `DB_MAX_CONNECTIONS` (optional).
    pub fn from_env() -> Option<Self> {
        let database_url = std::env::var("DATABASE_URL").ok()?;
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        Some(Self {
            database_url,
            max_connections,
        })
    }
}
