use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post, put},
};

/// Authenticated Router Module
///
/// Both exercise catalogs. Any authenticated user may list; seeding and every mutation
/// is limited to therapists and admins by the handlers themselves.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Articulation ---
        // POST /api/articulation-exercises/seed
        // Loads the default catalog into an empty collection.
        .route(
            "/api/articulation-exercises/seed",
            post(handlers::seed_articulation_exercises),
        )
        // GET/POST /api/articulation-exercises
        .route(
            "/api/articulation-exercises",
            get(handlers::list_articulation_exercises).post(handlers::create_articulation_exercise),
        )
        // PUT/DELETE /api/articulation-exercises/{id}
        .route(
            "/api/articulation-exercises/{id}",
            put(handlers::update_articulation_exercise).delete(handlers::delete_articulation_exercise),
        )
        // PATCH /api/articulation-exercises/{id}/toggle-active
        .route(
            "/api/articulation-exercises/{id}/toggle-active",
            patch(handlers::toggle_articulation_exercise),
        )
        // --- Receptive Language ---
        .route(
            "/api/receptive-exercises/seed",
            post(handlers::seed_receptive_exercises),
        )
        .route(
            "/api/receptive-exercises",
            get(handlers::list_receptive_exercises).post(handlers::create_receptive_exercise),
        )
        .route(
            "/api/receptive-exercises/{id}",
            put(handlers::update_receptive_exercise).delete(handlers::delete_receptive_exercise),
        )
        .route(
            "/api/receptive-exercises/{id}/toggle-active",
            patch(handlers::toggle_receptive_exercise),
        )
}
