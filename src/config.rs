use std::env;

/// Fallback signing secret for local runs. Never accepted in production.
pub const LOCAL_JWT_SECRET: &str = "local-development-secret";

/// Default listen address, matching the port the therapy frontend targets.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// pulled into handlers and extractors through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. `None` means the in-memory document store is used.
    pub db_url: Option<String>,
    // Runtime environment marker. Controls the local `x-user-id` bypass and log format.
    pub env: Env,
    // Shared HS256 secret used to verify incoming bearer tokens.
    pub jwt_secret: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Runtime context: developer conveniences in `Local`, hardened behaviour in `Production`.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking configuration for test scaffolding.
    fn default() -> Self {
        Self {
            db_url: None,
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when `DATABASE_URL` or `SECRET_KEY` is missing, so the service
    /// never starts against an implicit store or an unsigned secret.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                // Local runs without a database fall back to the in-memory store.
                db_url: env::var("DATABASE_URL").ok(),
                jwt_secret: env::var("SECRET_KEY").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                bind_addr,
            },
            Env::Production => Self {
                env: Env::Production,
                db_url: Some(
                    env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod"),
                ),
                jwt_secret: env::var("SECRET_KEY")
                    .expect("FATAL: SECRET_KEY must be set in production."),
                bind_addr,
            },
        }
    }
}
