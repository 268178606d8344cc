use axum::{
    extract::FromRequestParts,
    http::{Method, Request, header, request::Parts},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;
use std::{sync::Arc, time::SystemTime};
use therapy_exercises::{
    AppState, ApiError,
    auth::{AuthUser, Claims, StaffUser},
    config::{AppConfig, Env},
    memory::InMemoryDocumentStore,
    repository::{Document, collections},
};
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn now() -> usize {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

fn sign(claims: &Claims, secret: &str) -> String {
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &key).unwrap()
}

/// Token carrying the subject in `id`, expiring `exp_offset` seconds from now.
fn create_token(user_id: Uuid, exp_offset: i64) -> String {
    let claims = Claims {
        id: Some(user_id.to_string()),
        user_id: None,
        iat: Some(now()),
        exp: (now() as i64 + exp_offset) as usize,
    };
    sign(&claims, TEST_JWT_SECRET)
}

async fn create_app_state(env: Env, users: &[(Uuid, &str)]) -> AppState {
    let store = InMemoryDocumentStore::new();
    for (id, role) in users {
        let mut user = Document::new();
        user.insert("role".to_string(), json!(role));
        user.insert("email".to_string(), json!(format!("{}@example.com", role)));
        store.put(collections::USERS, *id, user).await;
    }

    let config = AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };
    AppState::new(Arc::new(store), config)
}

fn get_request_parts(headers: &[(header::HeaderName, String)]) -> Parts {
    let mut builder = Request::builder().method(Method::GET).uri("/api/articulation-exercises");
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    let (parts, _) = builder.body(axum::body::Body::empty()).unwrap().into_parts();
    parts
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

async fn authenticate(state: &AppState, headers: &[(header::HeaderName, String)]) -> Result<AuthUser, ApiError> {
    let mut parts = get_request_parts(headers);
    AuthUser::from_request_parts(&mut parts, state).await
}

fn assert_unauthenticated(result: Result<AuthUser, ApiError>, expected: &str) {
    match result {
        Err(ApiError::Unauthenticated(message)) => assert_eq!(message, expected),
        other => panic!("expected 401 '{}', got {:?}", expected, other),
    }
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let state = create_app_state(Env::Production, &[(TEST_USER_ID, "therapist")]).await;
    let token = create_token(TEST_USER_ID, 3600);

    let user = authenticate(&state, &[bearer(&token)]).await.unwrap();

    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.role, "therapist");
}

#[tokio::test]
async fn test_auth_accepts_raw_token_without_bearer_prefix() {
    let state = create_app_state(Env::Production, &[(TEST_USER_ID, "patient")]).await;
    let token = create_token(TEST_USER_ID, 3600);

    let user = authenticate(&state, &[(header::AUTHORIZATION, token)]).await.unwrap();
    assert_eq!(user.role, "patient");
}

#[tokio::test]
async fn test_auth_falls_back_to_user_id_claim() {
    let state = create_app_state(Env::Production, &[(TEST_USER_ID, "admin")]).await;
    let claims = Claims {
        id: None,
        user_id: Some(TEST_USER_ID.to_string()),
        iat: None,
        exp: now() + 3600,
    };

    let user = authenticate(&state, &[bearer(&sign(&claims, TEST_JWT_SECRET))])
        .await
        .unwrap();
    assert_eq!(user.id, TEST_USER_ID);
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let state = create_app_state(Env::Production, &[(TEST_USER_ID, "therapist")]).await;
    assert_unauthenticated(authenticate(&state, &[]).await, "Token is missing!");
}

#[tokio::test]
async fn test_auth_failure_with_expired_token() {
    let state = create_app_state(Env::Production, &[(TEST_USER_ID, "therapist")]).await;
    let token = create_token(TEST_USER_ID, -3600);

    assert_unauthenticated(authenticate(&state, &[bearer(&token)]).await, "Token is invalid!");
}

#[tokio::test]
async fn test_auth_failure_with_wrong_signature() {
    let state = create_app_state(Env::Production, &[(TEST_USER_ID, "therapist")]).await;
    let claims = Claims {
        id: Some(TEST_USER_ID.to_string()),
        user_id: None,
        iat: None,
        exp: now() + 3600,
    };
    let token = sign(&claims, "some-other-secret");

    assert_unauthenticated(authenticate(&state, &[bearer(&token)]).await, "Token is invalid!");
}

#[tokio::test]
async fn test_auth_failure_with_garbage_token() {
    let state = create_app_state(Env::Production, &[]).await;
    assert_unauthenticated(
        authenticate(&state, &[bearer("not.a.jwt")]).await,
        "Token is invalid!",
    );
}

#[tokio::test]
async fn test_auth_failure_without_subject_claim() {
    let state = create_app_state(Env::Production, &[(TEST_USER_ID, "therapist")]).await;
    let claims = Claims { id: None, user_id: None, iat: None, exp: now() + 3600 };

    assert_unauthenticated(
        authenticate(&state, &[bearer(&sign(&claims, TEST_JWT_SECRET))]).await,
        "Invalid token format!",
    );
}

#[tokio::test]
async fn test_auth_failure_when_user_no_longer_exists() {
    let state = create_app_state(Env::Production, &[]).await;
    let token = create_token(TEST_USER_ID, 3600);

    assert_unauthenticated(authenticate(&state, &[bearer(&token)]).await, "User not found!");
}

#[tokio::test]
async fn test_local_bypass_with_known_user() {
    let state = create_app_state(Env::Local, &[(TEST_USER_ID, "therapist")]).await;
    let header = (
        header::HeaderName::from_static("x-user-id"),
        TEST_USER_ID.to_string(),
    );

    let user = authenticate(&state, &[header]).await.unwrap();
    assert_eq!(user.id, TEST_USER_ID);
}

#[tokio::test]
async fn test_local_bypass_disabled_in_production() {
    let state = create_app_state(Env::Production, &[(TEST_USER_ID, "therapist")]).await;
    let header = (
        header::HeaderName::from_static("x-user-id"),
        TEST_USER_ID.to_string(),
    );

    assert_unauthenticated(authenticate(&state, &[header]).await, "Token is missing!");
}

#[tokio::test]
async fn test_local_bypass_with_unknown_user_falls_through_to_token() {
    let state = create_app_state(Env::Local, &[(TEST_USER_ID, "therapist")]).await;
    let header = (
        header::HeaderName::from_static("x-user-id"),
        Uuid::new_v4().to_string(),
    );

    assert_unauthenticated(authenticate(&state, &[header]).await, "Token is missing!");
}

// --- Staff Gate ---

async fn authenticate_staff(state: &AppState, role_token: String) -> Result<StaffUser, ApiError> {
    let mut parts = get_request_parts(&[bearer(&role_token)]);
    StaffUser::from_request_parts(&mut parts, state).await
}

#[tokio::test]
async fn test_staff_gate_admits_therapist_and_admin() {
    let admin_id = Uuid::from_u128(2);
    let state = create_app_state(
        Env::Production,
        &[(TEST_USER_ID, "therapist"), (admin_id, "admin")],
    )
    .await;

    let StaffUser(therapist) = authenticate_staff(&state, create_token(TEST_USER_ID, 3600))
        .await
        .unwrap();
    assert_eq!(therapist.role, "therapist");

    let StaffUser(admin) = authenticate_staff(&state, create_token(admin_id, 3600))
        .await
        .unwrap();
    assert_eq!(admin.role, "admin");
}

#[tokio::test]
async fn test_staff_gate_rejects_patient_with_forbidden() {
    let state = create_app_state(Env::Production, &[(TEST_USER_ID, "patient")]).await;

    match authenticate_staff(&state, create_token(TEST_USER_ID, 3600)).await {
        Err(ApiError::Forbidden(message)) => {
            assert_eq!(message, "Unauthorized. Therapist access required.")
        }
        other => panic!("expected 403, got {:?}", other),
    }
}

#[tokio::test]
async fn test_staff_gate_reuses_identity_cached_by_middleware() {
    // An empty store: the identity must come from the request extensions.
    let state = create_app_state(Env::Production, &[]).await;
    let mut parts = get_request_parts(&[]);
    parts.extensions.insert(AuthUser { id: TEST_USER_ID, role: "patient".to_string() });

    let result = StaffUser::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[tokio::test]
async fn test_staff_gate_still_requires_a_token() {
    let state = create_app_state(Env::Production, &[(TEST_USER_ID, "therapist")]).await;
    let mut parts = get_request_parts(&[]);

    let result = StaffUser::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
}
