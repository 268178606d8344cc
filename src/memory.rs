use async_trait::async_trait;
use serde_json::Value;
use std::{cmp::Ordering, collections::HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repository::{Document, DocumentId, DocumentStore, StoreError, StoredDocument};

/// InMemoryDocumentStore
///
/// Process-local `DocumentStore` used by the test suites and by local runs started without
/// a `DATABASE_URL`. Collections keep insertion order, which is also the sort tie-breaker.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<StoredDocument>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a document under a caller-chosen id. Used to provision users,
    /// which this service only ever reads.
    pub async fn put(&self, collection: &str, id: DocumentId, body: Document) {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|doc| doc.id == id) {
            Some(existing) => existing.body = body,
            None => docs.push(StoredDocument { id, body }),
        }
    }
}

// Cross-type order follows the usual document-database convention:
// missing/null < numbers < strings < objects < arrays < booleans.
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn compare_documents(a: &StoredDocument, b: &StoredDocument, sort: &[&str]) -> Ordering {
    sort.iter()
        .map(|key| compare_values(a.body.get(*key), b.body.get(*key)))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<DocumentId, StoreError> {
        let id = Uuid::new_v4();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument { id, body: doc });
        Ok(id)
    }

    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<Document>,
    ) -> Result<Vec<DocumentId>, StoreError> {
        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection.to_string()).or_default();

        let mut ids = Vec::with_capacity(docs.len());
        for body in docs {
            let id = Uuid::new_v4();
            stored.push(StoredDocument { id, body });
            ids.push(id);
        }
        Ok(ids)
    }

    async fn find(&self, collection: &str, sort: &[&str]) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.collections.read().await;
        let mut docs = collections.get(collection).cloned().unwrap_or_default();
        // Stable sort keeps insertion order for ties.
        docs.sort_by(|a, b| compare_documents(a, b, sort));
        Ok(docs)
    }

    async fn find_one(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn update_one(
        &self,
        collection: &str,
        id: DocumentId,
        set: Document,
    ) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
        else {
            return Ok(false);
        };

        for (key, value) in set {
            doc.body.insert(key, value);
        }
        Ok(true)
    }

    async fn delete_one(&self, collection: &str, id: DocumentId) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };

        let before = docs.len();
        docs.retain(|doc| doc.id != id);
        Ok(docs.len() < before)
    }

    async fn count_documents(&self, collection: &str) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map_or(0, |docs| docs.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test documents must be objects"),
        }
    }

    #[test]
    fn missing_keys_sort_first_and_numbers_before_strings() {
        assert_eq!(compare_values(None, Some(&json!(1))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!(2)), Some(&json!("1"))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!(10)), Some(&json!(9))), Ordering::Greater);
        assert_eq!(compare_values(Some(&json!("r")), Some(&json!("s"))), Ordering::Less);
    }

    #[tokio::test]
    async fn find_sorts_on_every_key_in_turn() {
        let store = InMemoryDocumentStore::new();
        store
            .insert_many(
                "c",
                vec![
                    doc(json!({"sound_id": "s", "level": 2, "order": 1})),
                    doc(json!({"sound_id": "r", "level": 3, "order": 2})),
                    doc(json!({"sound_id": "s", "level": 1, "order": 2})),
                    doc(json!({"sound_id": "s", "level": 1, "order": 1})),
                ],
            )
            .await
            .unwrap();

        let found = store.find("c", &["sound_id", "level", "order"]).await.unwrap();
        let keys: Vec<(String, i64, i64)> = found
            .iter()
            .map(|d| {
                (
                    d.body["sound_id"].as_str().unwrap().to_string(),
                    d.body["level"].as_i64().unwrap(),
                    d.body["order"].as_i64().unwrap(),
                )
            })
            .collect();

        assert_eq!(
            keys,
            vec![
                ("r".to_string(), 3, 2),
                ("s".to_string(), 1, 1),
                ("s".to_string(), 1, 2),
                ("s".to_string(), 2, 1),
            ]
        );
    }

    #[tokio::test]
    async fn update_merges_top_level_keys_only() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .insert_one("c", doc(json!({"target": "sun", "order": 1})))
            .await
            .unwrap();

        let matched = store
            .update_one("c", id, doc(json!({"target": "see"})))
            .await
            .unwrap();
        assert!(matched);

        let stored = store.find_one("c", id).await.unwrap().unwrap();
        assert_eq!(stored.body["target"], "see");
        assert_eq!(stored.body["order"], 1);
    }

    #[tokio::test]
    async fn writes_against_unknown_ids_report_no_match() {
        let store = InMemoryDocumentStore::new();
        let id = Uuid::new_v4();
        assert!(!store.update_one("c", id, Document::new()).await.unwrap());
        assert!(!store.delete_one("c", id).await.unwrap());
        assert_eq!(store.count_documents("c").await.unwrap(), 0);
    }
}
