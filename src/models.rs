use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::repository::Document;

// --- Stored Documents ---

/// ArticulationExercise
///
/// One articulation drill in the `articulation_exercises` collection. `level` and
/// `level_name` are expected to agree, but caller-supplied values are stored as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticulationExercise {
    /// Human-readable key such as `s-word-1`. Unique by convention only.
    pub exercise_id: String,
    // One of s, r, l, k, th.
    pub sound_id: String,
    pub sound_name: String,
    // 1 (Sound) through 5 (Sentence).
    pub level: i32,
    pub level_name: String,
    /// The prompt the patient practises.
    pub target: String,
    // Display position within the level.
    pub order: i32,
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ReceptiveOption
///
/// One of the four answer choices of a receptive drill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ReceptiveOption {
    // 1-based position.
    pub id: i32,
    pub text: String,
    // Emoji or image reference; empty for options created through the API.
    pub image: String,
    pub correct: bool,
}

/// ReceptiveExercise
///
/// One multiple-choice drill in the `receptive_exercises` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ReceptiveExercise {
    /// Always `receptive`.
    pub mode: String,
    // 1 (Vocabulary) through 3 (Comprehension).
    pub level: i32,
    pub level_name: String,
    pub level_color: String,
    pub exercise_id: String,
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub instruction: String,
    /// Informational answer key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub options: Vec<ReceptiveOption>,
    pub order: i32,
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// User
///
/// The slice of a `users` document the credential verifier needs. Users are provisioned
/// by the account service; this API only reads them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: Option<String>,
}

// --- Response Envelopes ---

/// MessageResponse
///
/// Envelope for update and delete.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// SeedResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SeedResponse {
    pub success: bool,
    pub message: String,
    /// Number of documents inserted.
    pub count: usize,
}

/// ExerciseCreatedResponse
///
/// Echoes the stored document, including its generated `_id`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ExerciseCreatedResponse {
    pub success: bool,
    pub message: String,
    #[schema(value_type = Object)]
    #[ts(type = "Record<string, unknown>")]
    pub exercise: Document,
}

/// ToggleActiveResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ToggleActiveResponse {
    pub success: bool,
    pub message: String,
    pub is_active: bool,
}

/// LevelGroup
///
/// Articulation exercises of one sound at one level, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LevelGroup {
    pub level_name: String,
    #[schema(value_type = Vec<Object>)]
    #[ts(type = "Array<Record<string, unknown>>")]
    pub exercises: Vec<Document>,
}

/// SoundGroup
///
/// All levels recorded for one sound. Keys of `levels` are the level numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SoundGroup {
    pub sound_name: String,
    pub levels: BTreeMap<String, LevelGroup>,
}

/// ArticulationListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticulationListResponse {
    pub success: bool,
    /// sound_id → level → exercises.
    pub exercises_by_sound: BTreeMap<String, SoundGroup>,
    pub total_count: usize,
}

/// ReceptiveListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ReceptiveListResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    #[ts(type = "Array<Record<string, unknown>>")]
    pub exercises: Vec<Document>,
    pub count: usize,
}
