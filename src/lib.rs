use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod repository;
pub mod seed;
pub mod services;

// Public (health) and authenticated (exercise) routers.
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use memory::InMemoryDocumentStore;
pub use repository::{DocumentStore, PostgresDocumentStore, StoreState};
pub use services::{ArticulationService, ReceptiveService};

/// ApiDoc
///
/// OpenAPI document for the exercise API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::seed_articulation_exercises, handlers::list_articulation_exercises,
        handlers::create_articulation_exercise, handlers::update_articulation_exercise,
        handlers::delete_articulation_exercise, handlers::toggle_articulation_exercise,
        handlers::seed_receptive_exercises, handlers::list_receptive_exercises,
        handlers::create_receptive_exercise, handlers::update_receptive_exercise,
        handlers::delete_receptive_exercise, handlers::toggle_receptive_exercise,
    ),
    components(
        schemas(
            models::ArticulationExercise, models::ReceptiveExercise, models::ReceptiveOption,
            models::MessageResponse, models::SeedResponse, models::ExerciseCreatedResponse,
            models::ToggleActiveResponse, models::LevelGroup, models::SoundGroup,
            models::ArticulationListResponse, models::ReceptiveListResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "articulation", description = "Speech-sound articulation exercises"),
        (name = "receptive", description = "Receptive language exercises")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared by every request. The services wrap the same store the auth extractor reads
/// users from.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreState,
    pub config: AppConfig,
    pub articulation: ArticulationService,
    pub receptive: ReceptiveService,
}

impl AppState {
    pub fn new(store: StoreState, config: AppConfig) -> Self {
        Self {
            articulation: ArticulationService::new(store.clone()),
            receptive: ReceptiveService::new(store.clone()),
            store,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for StoreState {
    fn from_ref(app_state: &AppState) -> StoreState {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Runs the `AuthUser` extractor once per request; a failure short-circuits with the
/// 401 envelope. The resolved user is stashed in the request extensions so the handler's
/// own `AuthUser` argument does not hit the store a second time.
async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// create_router
///
/// Assembles the routers, the auth layer and the observability stack.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Every exercise endpoint needs a valid identity; role checks happen in the handlers.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Span for `TraceLayer`, tagged with the request id so every log line of a request
/// can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
