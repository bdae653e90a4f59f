//! Persisted entity models.
//!
//! Each submodule contains serde structs for one family of documents. Every
//! top-level entity implements [`Document`](crate::store::Document) with the
//! collection name it is stored under.

/// Implement [`Document`](crate::store::Document) for a struct with an
/// `id: Option<DocId>` field.
macro_rules! impl_document {
    ($ty:ty, $collection:literal) => {
        impl $crate::store::Document for $ty {
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn set_id(&mut self, id: $crate::types::DocId) {
                self.id = Some(id);
            }
        }
    };
}

pub(crate) use impl_document;

pub mod api;
pub mod export;
pub mod profile;
pub mod project;
