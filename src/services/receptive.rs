use chrono::Utc;
use serde_json::Value;

use crate::{
    error::ApiError,
    models::{ReceptiveExercise, ReceptiveOption},
    repository::{Document, StoreState, collections},
    seed::{self, RECEPTIVE_MODE},
};

use super::{
    collection::ExerciseCollection,
    documents::{
        optional_bool, optional_int, optional_string, require_fields, required_int,
        required_string, to_document,
    },
};

const REQUIRED_FIELDS: [&str; 7] = [
    "level",
    "level_name",
    "level_color",
    "exercise_id",
    "type",
    "instruction",
    "options",
];

const LIST_SORT: [&str; 2] = ["level", "order"];

/// Number of answer choices every receptive exercise carries.
pub const OPTION_COUNT: usize = 4;

/// ReceptiveService
///
/// CRUD and seeding for the `receptive_exercises` collection. Clients send options as
/// plain strings plus a `correct_answer` index; the service stores option objects.
#[derive(Clone)]
pub struct ReceptiveService {
    exercises: ExerciseCollection,
}

impl ReceptiveService {
    pub fn new(store: StoreState) -> Self {
        Self {
            exercises: ExerciseCollection::new(
                store,
                collections::RECEPTIVE_EXERCISES,
                "receptive exercises",
            ),
        }
    }

    pub async fn seed(&self) -> Result<usize, ApiError> {
        let catalog = seed::receptive_catalog(Utc::now())
            .iter()
            .map(to_document)
            .collect::<Result<Vec<_>, _>>()?;
        self.exercises.seed(catalog).await
    }

    /// All exercises ordered by level then display order.
    pub async fn list(&self) -> Result<Vec<Document>, ApiError> {
        self.exercises.list(&LIST_SORT).await
    }

    pub async fn create(&self, payload: Document) -> Result<Document, ApiError> {
        require_fields(&payload, &REQUIRED_FIELDS)?;
        let texts = option_texts(&payload["options"])?;
        let correct = correct_answer(&payload)?;

        let now = Utc::now();
        let exercise = ReceptiveExercise {
            mode: RECEPTIVE_MODE.to_string(),
            level: required_int(&payload, "level")?,
            level_name: required_string(&payload, "level_name")?,
            level_color: required_string(&payload, "level_color")?,
            exercise_id: required_string(&payload, "exercise_id")?,
            exercise_type: required_string(&payload, "type")?,
            instruction: required_string(&payload, "instruction")?,
            target: optional_string(&payload, "target")?,
            options: build_options(texts, correct),
            order: optional_int(&payload, "order", 1)?,
            is_active: optional_bool(&payload, "is_active", true)?,
            created_at: now,
            updated_at: now,
        };

        self.exercises.insert(to_document(&exercise)?).await
    }

    /// Partial update. When both `options` and `correct_answer` are present they are
    /// validated and stored as option objects, and `correct_answer` itself is dropped.
    /// Either one alone is written exactly as sent.
    pub async fn update(&self, id: &str, mut payload: Document) -> Result<(), ApiError> {
        if payload.contains_key("options") && payload.contains_key("correct_answer") {
            let texts = option_texts(&payload["options"])?;
            let correct = correct_answer(&payload)?;
            let options = serde_json::to_value(build_options(texts, correct))
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            payload.insert("options".to_string(), options);
            payload.remove("correct_answer");
        }

        self.exercises.update(id, payload).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.exercises.delete(id).await
    }

    pub async fn toggle_active(&self, id: &str) -> Result<bool, ApiError> {
        self.exercises.toggle_active(id).await
    }
}

/// Validates the client's option list: exactly four plain strings.
fn option_texts(options: &Value) -> Result<Vec<String>, ApiError> {
    let items = match options {
        Value::Array(items) if items.len() == OPTION_COUNT => items,
        _ => return Err(ApiError::Validation("Must provide exactly 4 options".to_string())),
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(text) => Ok(text.clone()),
            _ => Err(ApiError::Validation("Each option must be a string".to_string())),
        })
        .collect()
}

/// Reads `correct_answer` as a 0-based index in [0, 3].
fn correct_answer(payload: &Document) -> Result<usize, ApiError> {
    let value = payload
        .get("correct_answer")
        .ok_or_else(|| ApiError::missing_field("correct_answer"))?;

    let index = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        _ => None,
    };

    match index {
        Some(i) if (0..OPTION_COUNT as i64).contains(&i) => Ok(i as usize),
        _ => Err(ApiError::Validation("correct_answer must be between 0 and 3".to_string())),
    }
}

/// Turns plain option texts into option objects; only `correct` is marked correct.
pub fn build_options(texts: Vec<String>, correct: usize) -> Vec<ReceptiveOption> {
    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| ReceptiveOption {
            id: i as i32 + 1,
            text,
            image: String::new(),
            correct: i == correct,
        })
        .collect()
}
