use serde_json::Value;

use crate::{
    error::ApiError,
    repository::{Document, DocumentId, StoreState, StoredDocument, parse_document_id},
};

use super::documents::{prepare_update, render_document, timestamp_now};

// Truth value of a stored flag. Updates store payloads verbatim, so `is_active` may hold
// any JSON type: zero, empty and null are false.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(fields)) => !fields.is_empty(),
    }
}

/// ExerciseCollection
///
/// The operations both exercise catalogs share, bound to one collection of the injected
/// store. Schema-specific validation stays in the service that owns the collection.
#[derive(Clone)]
pub struct ExerciseCollection {
    store: StoreState,
    name: &'static str,
    // Plural noun used in seed messages, e.g. "articulation exercises".
    label: &'static str,
}

impl ExerciseCollection {
    pub fn new(store: StoreState, name: &'static str, label: &'static str) -> Self {
        Self { store, name, label }
    }

    /// Inserts `catalog` only when the collection is empty. The count check and the insert
    /// are separate store calls, so two racing seeds can both succeed.
    pub async fn seed(&self, catalog: Vec<Document>) -> Result<usize, ApiError> {
        let existing = self.store.count_documents(self.name).await?;
        if existing > 0 {
            return Err(ApiError::Conflict {
                message: format!("Database already has {} {}.", existing, self.label),
                existing_count: existing,
            });
        }

        let inserted = self.store.insert_many(self.name, catalog).await?;
        tracing::info!(collection = self.name, count = inserted.len(), "seeded default catalog");
        Ok(inserted.len())
    }

    /// Every document sorted on `sort`, rendered for clients.
    pub async fn list(&self, sort: &[&str]) -> Result<Vec<Document>, ApiError> {
        let docs = self.store.find(self.name, sort).await?;
        Ok(docs.into_iter().map(render_document).collect())
    }

    /// Inserts a validated document and returns it rendered with its new `_id`.
    pub async fn insert(&self, body: Document) -> Result<Document, ApiError> {
        let id = self.store.insert_one(self.name, body.clone()).await?;
        tracing::info!(collection = self.name, %id, "exercise created");
        Ok(render_document(StoredDocument { id, body }))
    }

    /// Applies `payload` as a partial set. The identifier field is never written.
    pub async fn update(&self, raw_id: &str, payload: Document) -> Result<(), ApiError> {
        let id = parse_document_id(raw_id)?;
        self.update_parsed(id, prepare_update(payload)).await
    }

    pub async fn delete(&self, raw_id: &str) -> Result<(), ApiError> {
        let id = parse_document_id(raw_id)?;
        if !self.store.delete_one(self.name, id).await? {
            return Err(ApiError::exercise_not_found());
        }
        tracing::info!(collection = self.name, %id, "exercise deleted");
        Ok(())
    }

    /// Flips the truth value of `is_active` (absent counts as false) and stores the result
    /// as a boolean. Returns the new value.
    pub async fn toggle_active(&self, raw_id: &str) -> Result<bool, ApiError> {
        let id = parse_document_id(raw_id)?;
        let current = self
            .store
            .find_one(self.name, id)
            .await?
            .ok_or_else(ApiError::exercise_not_found)?;

        let is_active = !is_truthy(current.body.get("is_active"));

        let mut set = Document::new();
        set.insert("is_active".to_string(), Value::Bool(is_active));
        set.insert("updated_at".to_string(), timestamp_now());
        self.update_parsed(id, set).await?;

        Ok(is_active)
    }

    async fn update_parsed(&self, id: DocumentId, set: Document) -> Result<(), ApiError> {
        if !self.store.update_one(self.name, id, set).await? {
            return Err(ApiError::exercise_not_found());
        }
        tracing::debug!(collection = self.name, %id, "exercise updated");
        Ok(())
    }
}
