use crate::{
    AppState,
    auth::{AuthUser, StaffUser},
    error::{ApiError, ErrorResponse},
    extract::ApiJson,
    models::{
        ArticulationListResponse, ExerciseCreatedResponse, MessageResponse,
        ReceptiveListResponse, SeedResponse, ToggleActiveResponse,
    },
    repository::Document,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

// --- Shared Envelopes ---

fn created(exercise: Document) -> (StatusCode, Json<ExerciseCreatedResponse>) {
    (
        StatusCode::CREATED,
        Json(ExerciseCreatedResponse {
            success: true,
            message: "Exercise created successfully".to_string(),
            exercise,
        }),
    )
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        success: true,
        message: text.to_string(),
    })
}

fn toggled(is_active: bool) -> Json<ToggleActiveResponse> {
    let state = if is_active { "active" } else { "inactive" };
    Json(ToggleActiveResponse {
        success: true,
        message: format!("Exercise is now {}", state),
        is_active,
    })
}

// --- Articulation Handlers ---

/// seed_articulation_exercises
///
/// [Therapist Route] Populates an empty collection with the default catalog.
#[utoipa::path(
    post,
    path = "/api/articulation-exercises/seed",
    tag = "articulation",
    responses(
        (status = 201, description = "Seeded", body = SeedResponse),
        (status = 400, description = "Already seeded", body = ErrorResponse),
        (status = 403, description = "Not therapist or admin", body = ErrorResponse)
    )
)]
pub async fn seed_articulation_exercises(
    _staff: StaffUser,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SeedResponse>), ApiError> {
    let count = state.articulation.seed().await?;
    Ok((
        StatusCode::CREATED,
        Json(SeedResponse {
            success: true,
            message: format!("Successfully seeded {} articulation exercises", count),
            count,
        }),
    ))
}

/// list_articulation_exercises
///
/// [Authenticated Route] All exercises grouped by sound, then level.
#[utoipa::path(
    get,
    path = "/api/articulation-exercises",
    tag = "articulation",
    responses((status = 200, description = "Grouped exercises", body = ArticulationListResponse))
)]
pub async fn list_articulation_exercises(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ArticulationListResponse>, ApiError> {
    let (exercises_by_sound, total_count) = state.articulation.list().await?;
    Ok(Json(ArticulationListResponse {
        success: true,
        exercises_by_sound,
        total_count,
    }))
}

/// create_articulation_exercise
///
/// [Therapist Route] Requires `exercise_id, sound_id, sound_name, level, level_name, target`.
/// `order` defaults to 1 and `is_active` to true.
#[utoipa::path(
    post,
    path = "/api/articulation-exercises",
    tag = "articulation",
    request_body = Object,
    responses(
        (status = 201, description = "Created", body = ExerciseCreatedResponse),
        (status = 400, description = "Missing or malformed field", body = ErrorResponse)
    )
)]
pub async fn create_articulation_exercise(
    _staff: StaffUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<Document>,
) -> Result<(StatusCode, Json<ExerciseCreatedResponse>), ApiError> {
    let exercise = state.articulation.create(payload).await?;
    Ok(created(exercise))
}

/// update_articulation_exercise
///
/// [Therapist Route] Partial update; a client-supplied `_id` is ignored.
#[utoipa::path(
    put,
    path = "/api/articulation-exercises/{id}",
    tag = "articulation",
    params(("id" = String, Path, description = "Exercise document id")),
    request_body = Object,
    responses(
        (status = 200, description = "Updated", body = MessageResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_articulation_exercise(
    _staff: StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<Document>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.articulation.update(&id, payload).await?;
    Ok(message("Exercise updated successfully"))
}

/// delete_articulation_exercise
#[utoipa::path(
    delete,
    path = "/api/articulation-exercises/{id}",
    tag = "articulation",
    params(("id" = String, Path, description = "Exercise document id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_articulation_exercise(
    _staff: StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.articulation.delete(&id).await?;
    Ok(message("Exercise deleted successfully"))
}

/// toggle_articulation_exercise
///
/// [Therapist Route] Flips `is_active` and reports the new value.
#[utoipa::path(
    patch,
    path = "/api/articulation-exercises/{id}/toggle-active",
    tag = "articulation",
    params(("id" = String, Path, description = "Exercise document id")),
    responses(
        (status = 200, description = "Toggled", body = ToggleActiveResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn toggle_articulation_exercise(
    _staff: StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ToggleActiveResponse>, ApiError> {
    let is_active = state.articulation.toggle_active(&id).await?;
    Ok(toggled(is_active))
}

// --- Receptive Handlers ---

/// seed_receptive_exercises
#[utoipa::path(
    post,
    path = "/api/receptive-exercises/seed",
    tag = "receptive",
    responses(
        (status = 201, description = "Seeded", body = SeedResponse),
        (status = 400, description = "Already seeded", body = ErrorResponse),
        (status = 403, description = "Not therapist or admin", body = ErrorResponse)
    )
)]
pub async fn seed_receptive_exercises(
    _staff: StaffUser,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SeedResponse>), ApiError> {
    let count = state.receptive.seed().await?;
    Ok((
        StatusCode::CREATED,
        Json(SeedResponse {
            success: true,
            message: format!("Successfully seeded {} receptive language exercises", count),
            count,
        }),
    ))
}

/// list_receptive_exercises
///
/// [Authenticated Route] All exercises ordered by level, then display order.
#[utoipa::path(
    get,
    path = "/api/receptive-exercises",
    tag = "receptive",
    responses((status = 200, description = "Exercises", body = ReceptiveListResponse))
)]
pub async fn list_receptive_exercises(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ReceptiveListResponse>, ApiError> {
    let exercises = state.receptive.list().await?;
    Ok(Json(ReceptiveListResponse {
        success: true,
        count: exercises.len(),
        exercises,
    }))
}

/// create_receptive_exercise
///
/// [Therapist Route] `options` is four plain strings; `correct_answer` (0-3) picks the
/// right one.
#[utoipa::path(
    post,
    path = "/api/receptive-exercises",
    tag = "receptive",
    request_body = Object,
    responses(
        (status = 201, description = "Created", body = ExerciseCreatedResponse),
        (status = 400, description = "Missing field, wrong option count or bad index", body = ErrorResponse)
    )
)]
pub async fn create_receptive_exercise(
    _staff: StaffUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<Document>,
) -> Result<(StatusCode, Json<ExerciseCreatedResponse>), ApiError> {
    let exercise = state.receptive.create(payload).await?;
    Ok(created(exercise))
}

/// update_receptive_exercise
///
/// [Therapist Route] Sending `options` together with `correct_answer` rebuilds the option
/// objects; either alone is stored verbatim.
#[utoipa::path(
    put,
    path = "/api/receptive-exercises/{id}",
    tag = "receptive",
    params(("id" = String, Path, description = "Exercise document id")),
    request_body = Object,
    responses(
        (status = 200, description = "Updated", body = MessageResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_receptive_exercise(
    _staff: StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<Document>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.receptive.update(&id, payload).await?;
    Ok(message("Exercise updated successfully"))
}

/// delete_receptive_exercise
#[utoipa::path(
    delete,
    path = "/api/receptive-exercises/{id}",
    tag = "receptive",
    params(("id" = String, Path, description = "Exercise document id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_receptive_exercise(
    _staff: StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.receptive.delete(&id).await?;
    Ok(message("Exercise deleted successfully"))
}

/// toggle_receptive_exercise
#[utoipa::path(
    patch,
    path = "/api/receptive-exercises/{id}/toggle-active",
    tag = "receptive",
    params(("id" = String, Path, description = "Exercise document id")),
    responses(
        (status = 200, description = "Toggled", body = ToggleActiveResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn toggle_receptive_exercise(
    _staff: StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ToggleActiveResponse>, ApiError> {
    let is_active = state.receptive.toggle_active(&id).await?;
    Ok(toggled(is_active))
}
