// bodega-client integration tests
//
// Runs the client against a small in-process axum router standing in
// for the retail API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tempfile::TempDir;

use bodega_client::{
    ApiClient, AuthMethod, AuthState, ClientConfig, ClientError, CredentialStore, LoginRequest,
    SessionStore, UserInfo,
};

const ADMIN_TOKEN: &str = "tok-admin";
const EMPLOYEE_TOKEN: &str = "tok-employee";
const API_KEY: &str = "sk_test_bodega123";

#[derive(Clone, Default)]
struct ServerState {
    cancel_calls: Arc<AtomicUsize>,
}

fn authorized(headers: &HeaderMap) -> bool {
    let bearer_ok = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {ADMIN_TOKEN}") || v == format!("Bearer {EMPLOYEE_TOKEN}"))
        .unwrap_or(false);
    let key_ok = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == API_KEY)
        .unwrap_or(false);
    bearer_ok || key_ok
}

async fn login(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    // The API takes one identifier, username or email, never both
    if body.get("username").is_some() && body.get("email").is_some() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "send either username or email" })),
        );
    }
    let username = body["username"].as_str();
    let email = body["email"].as_str();
    let password = body["password"].as_str().unwrap_or_default();

    if (username == Some("admin") || email == Some("admin@example.com")) && password == "admin123"
    {
        (
            StatusCode::OK,
            Json(json!({
                "token": ADMIN_TOKEN,
                "user": { "id": "u1", "username": "admin", "role": "admin" }
            })),
        )
    } else if username == Some("employee") && password == "employee123" {
        (
            StatusCode::OK,
            Json(json!({
                "token": EMPLOYEE_TOKEN,
                "user": { "id": "u2", "username": "employee", "role": "employee" }
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
    }
}

async fn verify(headers: HeaderMap) -> impl IntoResponse {
    if authorized(&headers) {
        (StatusCode::OK, Json(json!({ "valid": true })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid token" })))
    }
}

async fn products(headers: HeaderMap) -> impl IntoResponse {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Authentication required" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!([{
            "id": "p1",
            "code": "P-001",
            "name": "Rice 1kg",
            "price": 45.0,
            "cost": 30.0,
            "stock": 12,
            "category": "Grains",
            "discount": 0.0
        }])),
    )
}

async fn create_product(headers: HeaderMap, Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Authentication required" })),
        );
    }
    if body["stock"].as_i64().unwrap_or(0) < 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "stock cannot be negative" })),
        );
    }
    let mut product = body;
    product["id"] = json!("p-new");
    (StatusCode::CREATED, Json(product))
}

async fn cancel_sale(State(state): State<ServerState>, headers: HeaderMap) -> impl IntoResponse {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Authentication required" })),
        );
    }
    // The server accepts repeated cancellations; the point of the
    // counter is to prove the client issues the call every time.
    state.cancel_calls.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::OK,
        Json(json!({
            "id": "s1",
            "date": "2024-05-01T12:00:00Z",
            "customer": { "name": "Ana" },
            "items": [{ "productId": "p1", "quantity": 1, "unitPrice": 45.0 }],
            "paymentMethod": "cash",
            "paymentStatus": "pending",
            "status": "cancelled",
            "totalAmount": 45.0
        })),
    )
}

async fn update_user(headers: HeaderMap, Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Authentication required" })),
        );
    }
    // A password change must not drag the rest of the record along
    if body.get("password").is_some() && body.as_object().map(|o| o.len()) != Some(1) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "unexpected fields alongside password" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": "u2",
            "username": "employee",
            "firstName": "Eva",
            "lastName": "Luna",
            "email": "eva@example.com",
            "role": "employee",
            "active": true
        })),
    )
}

async fn serve(state: ServerState) -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify", get(verify))
        .route("/api/products", get(products).post(create_product))
        .route("/api/sales/{id}/cancel", post(cancel_sale))
        .route("/api/users/{id}", put(update_user))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

struct TestClient {
    _dir: TempDir,
    storage: Arc<CredentialStore>,
    api: ApiClient,
    session: SessionStore,
}

async fn test_client(state: ServerState) -> TestClient {
    let base_url = serve(state).await;
    let dir = TempDir::new().unwrap();
    let config = ClientConfig::new(base_url)
        .with_credential_path(dir.path().join("credentials.json"));
    let storage = Arc::new(CredentialStore::open(&config.credential_path).unwrap());
    let api = ApiClient::new(&config, storage.clone()).unwrap();
    let session = SessionStore::new(storage.clone());
    TestClient {
        _dir: dir,
        storage,
        api,
        session,
    }
}

fn admin_user() -> UserInfo {
    UserInfo {
        id: "u1".to_string(),
        username: "admin".to_string(),
        role: "admin".to_string(),
        first_name: None,
    }
}

#[tokio::test]
async fn credential_store_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("credentials.json");

    let store = CredentialStore::open(&path).unwrap();
    store.store_token("tok", &admin_user()).unwrap();

    // Reopen and check the fields survived
    let reopened = CredentialStore::open(&path).unwrap();
    let stored = reopened.snapshot();
    assert_eq!(stored.token.as_deref(), Some("tok"));
    assert_eq!(stored.auth_method.as_deref(), Some("token"));
    assert_eq!(stored.user_info().unwrap().username, "admin");
    assert!(stored.api_key.is_none());

    // Clear is idempotent and removes the file
    reopened.clear().unwrap();
    reopened.clear().unwrap();
    assert!(!path.exists());
    assert!(reopened.snapshot().is_empty());
}

#[tokio::test]
async fn login_stores_token_method_and_admin_role() {
    let mut tc = test_client(ServerState::default()).await;

    let response = tc
        .api
        .login(&LoginRequest::with_username("admin", "admin123"))
        .await
        .unwrap();
    assert_eq!(response.user.role, "admin");

    tc.session
        .login_with_token(response.user, response.token)
        .unwrap();

    let session = tc.session.state().session().unwrap();
    assert_eq!(session.method, AuthMethod::Token);
    assert_eq!(session.user.role, "admin");
    assert_eq!(tc.storage.snapshot().auth_method.as_deref(), Some("token"));
}

#[tokio::test]
async fn bad_credentials_are_rejected() {
    let tc = test_client(ServerState::default()).await;
    let err = tc
        .api
        .login(&LoginRequest::with_username("admin", "nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
}

#[tokio::test]
async fn login_accepts_an_email_identifier() {
    let tc = test_client(ServerState::default()).await;

    // The handler rejects requests carrying both identifiers, so a
    // success also proves the username key stayed out of the body
    let response = tc
        .api
        .login(&LoginRequest::with_email("admin@example.com", "admin123"))
        .await
        .unwrap();
    assert_eq!(response.user.username, "admin");
}

#[tokio::test]
async fn logout_then_restore_is_anonymous_with_no_residual_credential() {
    let mut tc = test_client(ServerState::default()).await;

    let response = tc
        .api
        .login(&LoginRequest::with_username("admin", "admin123"))
        .await
        .unwrap();
    tc.session
        .login_with_token(response.user, response.token)
        .unwrap();

    tc.session.logout().unwrap();
    assert!(tc.storage.snapshot().is_empty());

    tc.session.restore(&tc.api).await.unwrap();
    assert!(matches!(tc.session.state(), AuthState::Anonymous));
    assert!(!tc.storage.path().exists());
}

#[tokio::test]
async fn restore_revalidates_token_sessions() {
    let mut tc = test_client(ServerState::default()).await;

    // A valid stored token restores the session
    tc.storage.store_token(ADMIN_TOKEN, &admin_user()).unwrap();
    tc.session.restore(&tc.api).await.unwrap();
    assert!(tc.session.state().is_authenticated());

    // A stale token degrades silently to anonymous and clears storage
    tc.storage.store_token("expired", &admin_user()).unwrap();
    tc.session.restore(&tc.api).await.unwrap();
    assert!(matches!(tc.session.state(), AuthState::Anonymous));
    assert!(tc.storage.snapshot().is_empty());
}

#[tokio::test]
async fn restore_accepts_api_key_sessions_without_network() {
    let mut tc = test_client(ServerState::default()).await;

    tc.storage
        .store_api_key(API_KEY, &UserInfo::api_key_user())
        .unwrap();
    tc.session.restore(&tc.api).await.unwrap();

    let session = tc.session.state().session().unwrap();
    assert_eq!(session.method, AuthMethod::ApiKey);
    assert_eq!(session.credential, API_KEY);
}

#[tokio::test]
async fn unauthorized_response_clears_all_persisted_fields() {
    let mut tc = test_client(ServerState::default()).await;

    tc.session
        .login_with_token(admin_user(), "bad-token".to_string())
        .unwrap();
    assert!(!tc.storage.snapshot().is_empty());

    let err = tc.api.products().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));

    let stored = tc.storage.snapshot();
    assert!(stored.token.is_none());
    assert!(stored.api_key.is_none());
    assert!(stored.auth_method.is_none());
    assert!(stored.user.is_none());
}

#[tokio::test]
async fn api_key_sessions_send_the_key_header() {
    let mut tc = test_client(ServerState::default()).await;

    tc.session
        .login_with_api_key(UserInfo::api_key_user(), API_KEY.to_string())
        .unwrap();

    let products = tc.api.products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].code, "P-001");
}

#[tokio::test]
async fn cancel_is_issued_without_client_side_guard() {
    let state = ServerState::default();
    let cancel_calls = state.cancel_calls.clone();
    let mut tc = test_client(state).await;

    tc.session
        .login_with_token(admin_user(), ADMIN_TOKEN.to_string())
        .unwrap();

    let sale = tc.api.cancel_sale("s1", None).await.unwrap();
    assert_eq!(sale.status, shared::models::SaleStatus::Cancelled);

    // Cancelling the already-cancelled sale still hits the server
    tc.api.cancel_sale("s1", None).await.unwrap();
    assert_eq!(cancel_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn password_change_sends_only_the_password_field() {
    let mut tc = test_client(ServerState::default()).await;
    tc.session
        .login_with_token(admin_user(), ADMIN_TOKEN.to_string())
        .unwrap();

    // The handler 400s on any extra field next to the password
    let payload = shared::models::UserPasswordUpdate {
        password: "secret9".to_string(),
    };
    let user = tc.api.change_password("u2", &payload).await.unwrap();
    assert_eq!(user.username, "employee");
}

#[tokio::test]
async fn server_validation_message_is_surfaced() {
    let mut tc = test_client(ServerState::default()).await;
    tc.session
        .login_with_token(admin_user(), ADMIN_TOKEN.to_string())
        .unwrap();

    let payload = shared::models::ProductCreate {
        code: "P-002".to_string(),
        name: "Beans".to_string(),
        stock: -1,
        price: 10.0,
        cost: 5.0,
        category: "Grains".to_string(),
        ..Default::default()
    };
    let err = tc.api.create_product(&payload).await.unwrap_err();
    match err {
        ClientError::Validation(message) => assert_eq!(message, "stock cannot be negative"),
        other => panic!("expected validation error, got {other:?}"),
    }
}
