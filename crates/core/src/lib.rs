//! Shared domain types for the creogen ad-creative platform.
//!
//! Holds the persisted entity models, the document persistence contract, and
//! the common error type. Nothing here performs I/O.

pub mod error;
pub mod models;
pub mod store;
pub mod types;
