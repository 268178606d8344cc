use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    models::User,
    repository::{DocumentId, StoreState, collections, parse_document_id},
};

/// Roles allowed to seed and modify exercise catalogs.
pub const STAFF_ROLES: &[&str] = &["therapist", "admin"];

/// Claims
///
/// Payload of the bearer token issued by the account service. The subject is carried in
/// `id`; older tokens used `user_id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Expiration Time (exp): required, and validated on every request.
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
}

impl Claims {
    pub fn subject(&self) -> Option<&str> {
        let non_empty = |s: &&str| !s.is_empty();
        self.id
            .as_deref()
            .filter(non_empty)
            .or_else(|| self.user_id.as_deref().filter(non_empty))
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: DocumentId,
    /// 'patient', 'therapist' or 'admin'.
    pub role: String,
}

impl AuthUser {
    /// Role gate: called first thing in every privileged handler.
    pub fn require_role(&self, allowed: &[&str]) -> Result<(), ApiError> {
        if allowed.contains(&self.role.as_str()) {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.id, role = %self.role, "role gate rejected request");
            Err(ApiError::Forbidden(
                "Unauthorized. Therapist access required.".to_string(),
            ))
        }
    }
}

fn unauthenticated(message: &str) -> ApiError {
    ApiError::Unauthenticated(message.to_string())
}

/// Accepts both `Bearer <token>` and a raw token.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value
        .strip_prefix("Bearer ")
        .unwrap_or(header_value)
        .trim();
    (!token.is_empty()).then_some(token)
}

/// Verifies signature and expiry and returns the claims.
pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("expired token presented"),
                _ => tracing::debug!("token rejected: {}", e),
            }
            unauthenticated("Token is invalid!")
        })
}

async fn load_user(store: &StoreState, id: DocumentId) -> Result<Option<AuthUser>, ApiError> {
    let Some(doc) = store.find_one(collections::USERS, id).await? else {
        return Ok(None);
    };
    let user: User = serde_json::from_value(serde_json::Value::Object(doc.body))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Some(AuthUser { id, role: user.role }))
}

/// AuthUser Extractor Implementation
///
/// 1. Reuses the identity the auth middleware already placed in the request extensions.
/// 2. Local Bypass: in `Env::Local`, an `x-user-id` header naming a known user is accepted.
/// 3. Token Validation: HS256 bearer token with a mandatory, unexpired `exp`.
/// 4. Store Lookup: the subject must still exist in the `users` collection.
///
/// Rejection: an `ApiError::Unauthenticated` envelope (401).
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    StoreState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let store = StoreState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| parse_document_id(raw).ok());
            if let Some(user_id) = bypass_id {
                if let Some(user) = load_user(&store, user_id).await? {
                    return Ok(user);
                }
            }
        }
        // Production, or a bypass header that did not resolve: fall through to the token.

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| unauthenticated("Token is missing!"))?;

        let claims = decode_claims(token, &config.jwt_secret)?;
        let subject = claims
            .subject()
            .ok_or_else(|| unauthenticated("Invalid token format!"))?;
        let user_id = parse_document_id(subject).map_err(|_| unauthenticated("Token is invalid!"))?;

        load_user(&store, user_id)
            .await?
            .ok_or_else(|| unauthenticated("User not found!"))
    }
}

/// StaffUser
///
/// An `AuthUser` whose role passed the `STAFF_ROLES` gate. Request-parts extractors run
/// before the body extractor, so a non-staff caller is refused with 403 before any payload
/// is read or validated.
#[derive(Debug, Clone)]
pub struct StaffUser(pub AuthUser);

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
    StoreState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        user.require_role(STAFF_ROLES)?;
        Ok(StaffUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn bearer_prefix_is_optional() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn subject_prefers_id_over_user_id() {
        let claims = Claims {
            id: Some("a".into()),
            user_id: Some("b".into()),
            exp: 0,
            iat: None,
        };
        assert_eq!(claims.subject(), Some("a"));

        let claims = Claims { id: None, user_id: Some("b".into()), exp: 0, iat: None };
        assert_eq!(claims.subject(), Some("b"));

        let claims = Claims { id: Some(String::new()), user_id: None, exp: 0, iat: None };
        assert_eq!(claims.subject(), None);
    }

    #[test]
    fn role_gate_admits_staff_only() {
        let mut user = AuthUser { id: Uuid::new_v4(), role: "therapist".into() };
        assert!(user.require_role(STAFF_ROLES).is_ok());

        user.role = "admin".into();
        assert!(user.require_role(STAFF_ROLES).is_ok());

        user.role = "patient".into();
        assert!(matches!(user.require_role(STAFF_ROLES), Err(ApiError::Forbidden(_))));
    }
}
