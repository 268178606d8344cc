use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use therapy_exercises::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    memory::InMemoryDocumentStore,
    repository::{Document, PostgresDocumentStore, StoreState, collections},
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// main
///
/// Loads configuration, sets up logging, picks the document store and serves the API.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast in production)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise verbose defaults for this crate.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "therapy_exercises=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Document store
    let store: StoreState = match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

            let store = PostgresDocumentStore::new(pool);
            store
                .migrate()
                .await
                .expect("FATAL: Failed to apply database migrations.");
            Arc::new(store)
        }
        None => {
            // Only reachable locally; AppConfig::load refuses to start production without a database.
            let store = InMemoryDocumentStore::new();
            let therapist_id = Uuid::new_v4();
            let mut therapist = Document::new();
            therapist.insert("role".to_string(), json!("therapist"));
            therapist.insert("email".to_string(), json!("therapist@localhost"));
            store.put(collections::USERS, therapist_id, therapist).await;
            tracing::warn!("DATABASE_URL not set, using the in-memory document store");
            tracing::info!(
                "Development therapist provisioned. Send `x-user-id: {}` to authenticate.",
                therapist_id
            );
            Arc::new(store)
        }
    };

    // 4. Router and server
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(store, config));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
