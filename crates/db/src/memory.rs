//! In-process document store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use creogen_core::store::{BatchWrite, DocumentStore, FieldFilter, StoreError};
use creogen_core::types::DocId;
use serde_json::Value;
use tokio::sync::RwLock;

type Collections = BTreeMap<String, BTreeMap<DocId, Value>>;

/// A [`DocumentStore`] held entirely in memory.
///
/// Queries return documents in id order. Batches are applied to a copy of
/// the affected state and swapped in only if every write succeeds.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<Collections>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

fn apply_set(
    collections: &mut Collections,
    collection: &str,
    id: &str,
    data: Value,
    merge: bool,
) -> Result<(), StoreError> {
    let Value::Object(incoming) = data else {
        return Err(StoreError::operation(
            collection,
            "set",
            "document body must be a JSON object",
        ));
    };

    let docs = collections.entry(collection.to_string()).or_default();
    match docs.get_mut(id) {
        Some(Value::Object(existing)) if merge => {
            existing.extend(incoming);
        }
        _ => {
            docs.insert(id.to_string(), Value::Object(incoming));
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        merge: bool,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        apply_set(&mut collections, collection, id, data, merge)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<(DocId, Value)>, StoreError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|(_, data)| filters.iter().all(|f| f.matches(data)))
            .map(|(id, data)| (id.clone(), data.clone()))
            .collect())
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn write_batch(&self, writes: Vec<BatchWrite>) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let mut staged = collections.clone();

        for write in writes {
            match write {
                BatchWrite::Set {
                    collection,
                    id,
                    data,
                    merge,
                } => apply_set(&mut staged, &collection, &id, data, merge)?,
                BatchWrite::Delete { collection, id } => {
                    if let Some(docs) = staged.get_mut(&collection) {
                        docs.remove(&id);
                    }
                }
            }
        }

        *collections = staged;
        Ok(())
    }

    async fn close(&self) {
        self.collections.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[tokio::test]
    async fn merge_keeps_untouched_keys() {
        let store = MemoryDocumentStore::new();
        store
            .set("c", "1", json!({ "a": 1, "b": 2 }), false)
            .await
            .unwrap();
        store.set("c", "1", json!({ "b": 3 }), true).await.unwrap();

        let doc = store.get("c", "1").await.unwrap().unwrap();
        assert_eq!(doc, json!({ "a": 1, "b": 3 }));
    }

    #[tokio::test]
    async fn replace_drops_old_keys() {
        let store = MemoryDocumentStore::new();
        store.set("c", "1", json!({ "a": 1 }), false).await.unwrap();
        store.set("c", "1", json!({ "b": 2 }), false).await.unwrap();

        let doc = store.get("c", "1").await.unwrap().unwrap();
        assert_eq!(doc, json!({ "b": 2 }));
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let store = MemoryDocumentStore::new();
        let err = store.set("c", "1", json!([1, 2]), false).await.unwrap_err();
        assert_matches!(err, StoreError::Operation { ref collection, .. } if collection == "c");
    }

    #[tokio::test]
    async fn failed_batch_leaves_state_untouched() {
        let store = MemoryDocumentStore::new();
        store.set("c", "keep", json!({ "a": 1 }), false).await.unwrap();

        let result = store
            .write_batch(vec![
                BatchWrite::Delete {
                    collection: "c".into(),
                    id: "keep".into(),
                },
                BatchWrite::Set {
                    collection: "c".into(),
                    id: "bad".into(),
                    data: json!("not an object"),
                    merge: false,
                },
            ])
            .await;

        assert!(result.is_err());
        assert!(store.get("c", "keep").await.unwrap().is_some());
        assert_eq!(store.count("c").await, 1);
    }
}
