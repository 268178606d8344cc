use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder, types::Json};
use std::sync::Arc;
use uuid::Uuid;

/// A schemaless document: the top-level JSON object stored in a collection.
pub type Document = Map<String, Value>;

/// Collection-local identifier. Rendered to clients as its hyphenated string form.
pub type DocumentId = Uuid;

/// Collection names shared by the services and the credential verifier.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ARTICULATION_EXERCISES: &str = "articulation_exercises";
    pub const RECEPTIVE_EXERCISES: &str = "receptive_exercises";
}

/// StoredDocument
///
/// A document together with the identifier the store assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub body: Document,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid document id: {0}")]
    InvalidId(String),
    #[error("document {0} is not a JSON object")]
    Corrupt(DocumentId),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Parses a client-supplied identifier string.
pub fn parse_document_id(raw: &str) -> Result<DocumentId, StoreError> {
    Uuid::parse_str(raw.trim()).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

/// DocumentStore Trait
///
/// The persistence contract the exercise services and the credential verifier depend on.
/// Operations are addressed by collection name; each single-document write relies on the
/// backend's own atomicity and nothing else.
///
/// **Send + Sync + async_trait** make `Arc<dyn DocumentStore>` shareable across Axum tasks.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<DocumentId, StoreError>;

    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<Document>,
    ) -> Result<Vec<DocumentId>, StoreError>;

    /// Returns every document of the collection, ascending on each sort key in turn.
    /// Documents missing a key sort before those that have it.
    async fn find(&self, collection: &str, sort: &[&str]) -> Result<Vec<StoredDocument>, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// Merges `set` into the top level of the document. Returns whether a document matched.
    async fn update_one(
        &self,
        collection: &str,
        id: DocumentId,
        set: Document,
    ) -> Result<bool, StoreError>;

    /// Returns whether a document was removed.
    async fn delete_one(&self, collection: &str, id: DocumentId) -> Result<bool, StoreError>;

    async fn count_documents(&self, collection: &str) -> Result<u64, StoreError>;
}

/// StoreState
///
/// The concrete type used to share the persistence layer across the application state.
pub type StoreState = Arc<dyn DocumentStore>;

/// PostgresDocumentStore
///
/// Keeps every collection in one `documents` table with a JSONB body. Partial updates use
/// the JSONB `||` merge, which replaces top-level keys exactly like a `$set`.
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations (creates the `documents` table).
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn into_stored(id: DocumentId, body: Value) -> Result<StoredDocument, StoreError> {
    match body {
        Value::Object(body) => Ok(StoredDocument { id, body }),
        _ => Err(StoreError::Corrupt(id)),
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<DocumentId, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(Json(Value::Object(doc)))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<Document>,
    ) -> Result<Vec<DocumentId>, StoreError> {
        if docs.is_empty() {
            return Ok(vec![]);
        }

        let rows: Vec<(DocumentId, Document)> =
            docs.into_iter().map(|doc| (Uuid::new_v4(), doc)).collect();
        let ids = rows.iter().map(|(id, _)| *id).collect();

        // One multi-row INSERT keeps the batch atomic.
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO documents (collection, id, body) ");
        builder.push_values(rows, |mut row, (id, doc)| {
            row.push_bind(collection)
                .push_bind(id)
                .push_bind(Json(Value::Object(doc)));
        });
        builder.build().execute(&self.pool).await?;

        Ok(ids)
    }

    async fn find(&self, collection: &str, sort: &[&str]) -> Result<Vec<StoredDocument>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT id, body FROM documents WHERE collection = ");
        builder.push_bind(collection);
        builder.push(" ORDER BY ");
        for key in sort {
            // Keys are bound as parameters, never spliced into the SQL text.
            builder.push("body -> ");
            builder.push_bind(key.to_string());
            builder.push(" ASC NULLS FIRST, ");
        }
        // Insertion order breaks ties.
        builder.push("seq ASC");

        let rows = builder
            .build_query_as::<(DocumentId, Json<Value>)>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(id, Json(body))| into_stored(id, body))
            .collect()
    }

    async fn find_one(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let row = sqlx::query_as::<_, (DocumentId, Json<Value>)>(
            "SELECT id, body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(id, Json(body))| into_stored(id, body)).transpose()
    }

    async fn update_one(
        &self,
        collection: &str,
        id: DocumentId,
        set: Document,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET body = body || $3 WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(set)))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_one(&self, collection: &str, id: DocumentId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_documents(&self, collection: &str) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}
