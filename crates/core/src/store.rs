//! Document persistence contract.
//!
//! Entities are JSON documents keyed by a collection name and a string id.
//! [`DocumentStore`] is the object-safe, JSON-level trait that backends
//! implement; [`DocumentStoreExt`] layers the typed CRUD operations on top of
//! it for every [`Document`] type.
//!
//! Stores are constructed explicitly from configuration and handed to callers;
//! there is no process-wide client. Call [`DocumentStore::close`] when done.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::DocId;

// ---------------------------------------------------------------------------
// Document trait
// ---------------------------------------------------------------------------

/// A serializable entity stored in a named collection.
///
/// The id is kept outside the stored payload and re-attached on read, so the
/// `id` field is stripped from the JSON before writing.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// Name of the collection this entity lives in.
    const COLLECTION: &'static str;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: DocId);
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Comparison operator for a [`FieldFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Field value is one of the elements of the filter's array value.
    In,
    /// Field is an array containing the filter value.
    ArrayContains,
}

/// A predicate over a single top-level field of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Shorthand for an equality filter.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Evaluate the filter against a document body.
    ///
    /// A missing field never matches, including for `Ne`. Ordering operators
    /// only compare numbers with numbers and strings with strings.
    pub fn matches(&self, document: &Value) -> bool {
        let Some(field_value) = document.get(&self.field) else {
            return false;
        };

        match self.op {
            FilterOp::Eq => json_eq(field_value, &self.value),
            FilterOp::Ne => !json_eq(field_value, &self.value),
            FilterOp::Lt => compare(field_value, &self.value).is_some_and(|o| o.is_lt()),
            FilterOp::Le => compare(field_value, &self.value).is_some_and(|o| o.is_le()),
            FilterOp::Gt => compare(field_value, &self.value).is_some_and(|o| o.is_gt()),
            FilterOp::Ge => compare(field_value, &self.value).is_some_and(|o| o.is_ge()),
            FilterOp::In => self
                .value
                .as_array()
                .is_some_and(|items| items.iter().any(|v| json_eq(field_value, v))),
            FilterOp::ArrayContains => field_value
                .as_array()
                .is_some_and(|items| items.iter().any(|v| json_eq(v, &self.value))),
        }
    }
}

/// Equality that treats `1` and `1.0` as the same number.
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures surfaced by any document store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or initialised.
    #[error("store connection failed: {0}")]
    Connection(String),

    /// A single operation against a collection failed.
    #[error("{operation} on '{collection}' failed: {message}")]
    Operation {
        collection: String,
        operation: &'static str,
        message: String,
    },

    /// An update-style operation was given an entity without an id.
    #[error("document in '{collection}' has no id")]
    MissingId { collection: String },

    /// `fetch_one` matched more than one document.
    #[error("expected one document in '{collection}', found {count}")]
    MultipleResults { collection: String, count: usize },

    #[error("document (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Build an [`StoreError::Operation`] from any displayable cause.
    pub fn operation(
        collection: &str,
        operation: &'static str,
        cause: impl std::fmt::Display,
    ) -> Self {
        Self::Operation {
            collection: collection.to_string(),
            operation,
            message: cause.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// One write inside an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchWrite {
    Set {
        collection: String,
        id: DocId,
        data: Value,
        merge: bool,
    },
    Delete {
        collection: String,
        id: DocId,
    },
}

/// JSON-level storage backend.
///
/// `data` payloads are JSON objects without the `id` key.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write a document. With `merge`, top-level keys are merged into an
    /// existing document; otherwise the document is replaced.
    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        merge: bool,
    ) -> Result<(), StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// All documents matching every filter, as `(id, data)` pairs.
    async fn query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<(DocId, Value)>, StoreError>;

    async fn remove(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Apply all writes atomically.
    async fn write_batch(&self, writes: Vec<BatchWrite>) -> Result<(), StoreError>;

    /// Release backend resources. The store must not be used afterwards.
    async fn close(&self);
}

// ---------------------------------------------------------------------------
// Typed operations
// ---------------------------------------------------------------------------

/// Generate a fresh document id.
fn new_doc_id() -> DocId {
    uuid::Uuid::new_v4().to_string()
}

fn to_payload<D: Document>(doc: &D) -> Result<Value, StoreError> {
    let mut value = serde_json::to_value(doc)?;
    if let Value::Object(map) = &mut value {
        map.remove("id");
    }
    Ok(value)
}

/// Collection path for `D` documents nested under the `P` document `parent_id`.
pub fn subcollection_path<P: Document, D: Document>(parent_id: &str) -> String {
    format!("{}/{}/{}", P::COLLECTION, parent_id, D::COLLECTION)
}

fn from_payload<D: Document>(id: DocId, mut data: Value) -> Result<D, StoreError> {
    if let Value::Object(map) = &mut data {
        map.insert("id".to_string(), Value::String(id));
    }
    Ok(serde_json::from_value(data)?)
}

/// Typed CRUD on top of any [`DocumentStore`].
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Insert under a newly generated id; returns the entity with its id set.
    async fn store<D: Document>(&self, mut doc: D) -> Result<D, StoreError> {
        let id = new_doc_id();
        self.set(D::COLLECTION, &id, to_payload(&doc)?, false).await?;
        doc.set_id(id);
        Ok(doc)
    }

    /// Insert (or replace) under a caller-chosen id.
    async fn store_with_id<D: Document>(&self, id: &str, mut doc: D) -> Result<D, StoreError> {
        self.set(D::COLLECTION, id, to_payload(&doc)?, false).await?;
        doc.set_id(id.to_string());
        Ok(doc)
    }

    async fn fetch_by_id<D: Document>(&self, id: &str) -> Result<Option<D>, StoreError> {
        match self.get(D::COLLECTION, id).await? {
            Some(data) => Ok(Some(from_payload(id.to_string(), data)?)),
            None => Ok(None),
        }
    }

    async fn fetch_all<D: Document>(&self, filters: &[FieldFilter]) -> Result<Vec<D>, StoreError> {
        self.query(D::COLLECTION, filters)
            .await?
            .into_iter()
            .map(|(id, data)| from_payload(id, data))
            .collect()
    }

    /// Exactly zero or one match; more than one is an error.
    async fn fetch_one<D: Document>(&self, filters: &[FieldFilter]) -> Result<Option<D>, StoreError> {
        let mut docs: Vec<D> = self.fetch_all(filters).await?;
        match docs.len() {
            0 => Ok(None),
            1 => Ok(docs.pop()),
            count => Err(StoreError::MultipleResults {
                collection: D::COLLECTION.to_string(),
                count,
            }),
        }
    }

    /// Insert `doc` under a new id in the `D` subcollection of parent `P`.
    async fn store_in_subcollection<P: Document, D: Document>(
        &self,
        parent_id: &str,
        mut doc: D,
    ) -> Result<D, StoreError> {
        let id = new_doc_id();
        let path = subcollection_path::<P, D>(parent_id);
        self.set(&path, &id, to_payload(&doc)?, false).await?;
        doc.set_id(id);
        Ok(doc)
    }

    async fn fetch_subcollection<P: Document, D: Document>(
        &self,
        parent_id: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<D>, StoreError> {
        let path = subcollection_path::<P, D>(parent_id);
        self.query(&path, filters)
            .await?
            .into_iter()
            .map(|(id, data)| from_payload(id, data))
            .collect()
    }

    /// Merge the entity's fields into the stored document with `id`.
    async fn update<D: Document>(&self, id: &str, mut doc: D) -> Result<D, StoreError> {
        self.set(D::COLLECTION, id, to_payload(&doc)?, true).await?;
        doc.set_id(id.to_string());
        Ok(doc)
    }

    async fn delete<D: Document>(&self, id: &str) -> Result<(), StoreError> {
        self.remove(D::COLLECTION, id).await
    }

    async fn batch_store<D: Document>(&self, docs: Vec<D>) -> Result<Vec<D>, StoreError> {
        let mut writes = Vec::with_capacity(docs.len());
        let mut stored = Vec::with_capacity(docs.len());
        for mut doc in docs {
            let id = new_doc_id();
            writes.push(BatchWrite::Set {
                collection: D::COLLECTION.to_string(),
                id: id.clone(),
                data: to_payload(&doc)?,
                merge: false,
            });
            doc.set_id(id);
            stored.push(doc);
        }
        self.write_batch(writes).await?;
        Ok(stored)
    }

    /// Merge every entity into its stored document. Each must carry an id.
    async fn batch_update<D: Document>(&self, docs: Vec<D>) -> Result<Vec<D>, StoreError> {
        let mut writes = Vec::with_capacity(docs.len());
        for doc in &docs {
            let id = doc.id().ok_or_else(|| StoreError::MissingId {
                collection: D::COLLECTION.to_string(),
            })?;
            writes.push(BatchWrite::Set {
                collection: D::COLLECTION.to_string(),
                id: id.to_string(),
                data: to_payload(doc)?,
                merge: true,
            });
        }
        self.write_batch(writes).await?;
        Ok(docs)
    }

    async fn batch_delete<D: Document>(&self, ids: &[DocId]) -> Result<(), StoreError> {
        let writes = ids
            .iter()
            .map(|id| BatchWrite::Delete {
                collection: D::COLLECTION.to_string(),
                id: id.clone(),
            })
            .collect();
        self.write_batch(writes).await
    }
}

impl<S: DocumentStore + ?Sized> DocumentStoreExt for S {}
