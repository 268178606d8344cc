//! Payload validation and document rendering shared by both exercise services.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::ApiError,
    repository::{Document, StoredDocument},
};

/// Field carrying the rendered store identifier.
pub const ID_FIELD: &str = "_id";

const TIMESTAMP_FIELDS: [&str; 2] = ["created_at", "updated_at"];

/// Fails with `Missing required field: <name>` for the first absent field, in order.
pub fn require_fields(payload: &Document, fields: &[&str]) -> Result<(), ApiError> {
    match fields.iter().find(|field| !payload.contains_key(**field)) {
        Some(missing) => Err(ApiError::missing_field(missing)),
        None => Ok(()),
    }
}

pub fn required_string(payload: &Document, field: &str) -> Result<String, ApiError> {
    match payload.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ApiError::Validation(format!("{} must be a string", field))),
        None => Err(ApiError::missing_field(field)),
    }
}

pub fn optional_string(payload: &Document, field: &str) -> Result<Option<String>, ApiError> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ApiError::Validation(format!("{} must be a string", field))),
    }
}

/// Coerces a JSON value to an integer: integers as-is, floats truncated, numeric strings
/// parsed.
pub fn coerce_int(value: &Value, field: &str) -> Result<i32, ApiError> {
    let invalid = || ApiError::Validation(format!("{} must be an integer", field));

    let parsed = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => n.as_f64().filter(|f| f.is_finite()).ok_or_else(invalid)?.trunc() as i64,
        },
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    i32::try_from(parsed).map_err(|_| invalid())
}

pub fn required_int(payload: &Document, field: &str) -> Result<i32, ApiError> {
    let value = payload.get(field).ok_or_else(|| ApiError::missing_field(field))?;
    coerce_int(value, field)
}

pub fn optional_int(payload: &Document, field: &str, default: i32) -> Result<i32, ApiError> {
    match payload.get(field) {
        None => Ok(default),
        Some(value) => coerce_int(value, field),
    }
}

pub fn optional_bool(payload: &Document, field: &str, default: bool) -> Result<bool, ApiError> {
    match payload.get(field) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ApiError::Validation(format!("{} must be a boolean", field))),
    }
}

/// The current time in the same string form chrono's serde impl writes.
pub fn timestamp_now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document, ApiError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::Internal("exercise did not serialize to an object".to_string())),
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}

/// Renders a stored timestamp as an ISO-8601 string. Strings pass through untouched;
/// epoch milliseconds and `{"$date": …}` wrappers (as written by other document tooling)
/// are converted. Anything else is returned unchanged.
pub fn normalize_timestamp(value: &Value) -> Value {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)))
            .unwrap_or_else(|| value.clone()),
        Value::Object(map) => match map.get("$date") {
            Some(Value::Object(inner)) => inner
                .get("$numberLong")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<i64>().ok())
                .map(|millis| normalize_timestamp(&Value::from(millis)))
                .unwrap_or_else(|| value.clone()),
            Some(inner) => normalize_timestamp(inner),
            None => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Client-facing form of a stored document: `_id` as a string, timestamps as ISO-8601.
pub fn render_document(doc: StoredDocument) -> Document {
    let StoredDocument { id, mut body } = doc;
    for field in TIMESTAMP_FIELDS {
        if let Some(value) = body.get(field) {
            let normalized = normalize_timestamp(value);
            body.insert(field.to_string(), normalized);
        }
    }
    body.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    body
}

/// Prepares a partial update: drops any client-supplied identifier and refreshes
/// `updated_at`.
pub fn prepare_update(mut payload: Document) -> Document {
    payload.remove(ID_FIELD);
    payload.insert("updated_at".to_string(), timestamp_now());
    payload
}
