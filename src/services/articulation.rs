use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{
    error::ApiError,
    models::{ArticulationExercise, LevelGroup, SoundGroup},
    repository::{Document, StoreState, collections},
    seed,
};

use super::{
    collection::ExerciseCollection,
    documents::{
        optional_bool, optional_int, require_fields, required_int, required_string, to_document,
    },
};

const REQUIRED_FIELDS: [&str; 6] = [
    "exercise_id",
    "sound_id",
    "sound_name",
    "level",
    "level_name",
    "target",
];

const LIST_SORT: [&str; 3] = ["sound_id", "level", "order"];

/// ArticulationService
///
/// CRUD and seeding for the `articulation_exercises` collection.
#[derive(Clone)]
pub struct ArticulationService {
    exercises: ExerciseCollection,
}

impl ArticulationService {
    pub fn new(store: StoreState) -> Self {
        Self {
            exercises: ExerciseCollection::new(
                store,
                collections::ARTICULATION_EXERCISES,
                "articulation exercises",
            ),
        }
    }

    /// Inserts the default catalog into an empty collection; returns the inserted count.
    pub async fn seed(&self) -> Result<usize, ApiError> {
        let catalog = seed::articulation_catalog(Utc::now())
            .iter()
            .map(to_document)
            .collect::<Result<Vec<_>, _>>()?;
        self.exercises.seed(catalog).await
    }

    /// All exercises grouped by sound then level, plus the total count.
    pub async fn list(&self) -> Result<(BTreeMap<String, SoundGroup>, usize), ApiError> {
        let docs = self.exercises.list(&LIST_SORT).await?;
        let total = docs.len();
        Ok((group_by_sound(docs), total))
    }

    pub async fn create(&self, payload: Document) -> Result<Document, ApiError> {
        require_fields(&payload, &REQUIRED_FIELDS)?;

        let now = Utc::now();
        let exercise = ArticulationExercise {
            exercise_id: required_string(&payload, "exercise_id")?,
            sound_id: required_string(&payload, "sound_id")?,
            sound_name: required_string(&payload, "sound_name")?,
            level: required_int(&payload, "level")?,
            level_name: required_string(&payload, "level_name")?,
            target: required_string(&payload, "target")?,
            order: optional_int(&payload, "order", 1)?,
            is_active: optional_bool(&payload, "is_active", true)?,
            created_at: now,
            updated_at: now,
        };

        self.exercises.insert(to_document(&exercise)?).await
    }

    pub async fn update(&self, id: &str, payload: Document) -> Result<(), ApiError> {
        self.exercises.update(id, payload).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.exercises.delete(id).await
    }

    pub async fn toggle_active(&self, id: &str) -> Result<bool, ApiError> {
        self.exercises.toggle_active(id).await
    }
}

// Grouping key for a level value: numbers render as written ("3"), strings as-is.
fn level_key(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn string_field(doc: &Document, field: &str) -> String {
    doc.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Nests rendered documents into sound → level → exercises, preserving input order inside
/// each level. The first document seen for a sound (or level) supplies its display name.
pub fn group_by_sound(docs: Vec<Document>) -> BTreeMap<String, SoundGroup> {
    let mut by_sound: BTreeMap<String, SoundGroup> = BTreeMap::new();

    for doc in docs {
        let sound = by_sound
            .entry(string_field(&doc, "sound_id"))
            .or_insert_with(|| SoundGroup {
                sound_name: string_field(&doc, "sound_name"),
                levels: BTreeMap::new(),
            });

        let level = sound
            .levels
            .entry(level_key(doc.get("level")))
            .or_insert_with(|| LevelGroup {
                level_name: string_field(&doc, "level_name"),
                exercises: Vec::new(),
            });

        level.exercises.push(doc);
    }

    by_sound
}
