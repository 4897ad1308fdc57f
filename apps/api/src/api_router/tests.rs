use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use axum::http::{Request, Response, StatusCode};
use fleetdesk_application::{AuthorizationGate, RouteGuard, SessionStore};
use fleetdesk_core::{AUTHENTICATION_FAILED_MESSAGE, AppError};
use fleetdesk_domain::Role;
use fleetdesk_infrastructure::{
    DEMO_PASSWORD, HttpAuthGateway, InMemoryAuthGateway, InMemorySessionStorage, SystemClock,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;

use super::build_router;
use crate::state::AppState;

fn test_state() -> AppState {
    AppState {
        auth_gateway: Arc::new(InMemoryAuthGateway::with_demo_accounts(Arc::new(SystemClock))),
        oauth_provider_url: Url::parse("https://accounts.example.com/o/oauth2/auth")
            .unwrap_or_else(|_| panic!("test")),
        oauth_callback_url: "http://localhost:3000/auth/callback".to_owned(),
    }
}

fn test_router(state: AppState) -> Router {
    build_router(state, "http://localhost:3000").unwrap_or_else(|_| panic!("test"))
}

fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap_or_else(|_| panic!("test"))
}

fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap_or_else(|_| panic!("test"))
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    serde_json::from_slice(&bytes).unwrap_or_default()
}

async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|_| panic!("test"))
}

#[tokio::test]
async fn health_reports_ok() {
    let router = test_router(test_state());
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap_or_else(|_| panic!("test"));

    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn login_returns_user_token_and_expiry() {
    let router = test_router(test_state());

    let response = send(&router, login_request("dispatcher@example.com", DEMO_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user"]["role"], "dispatcher");
    assert_eq!(body["user"]["email"], "dispatcher@example.com");
    assert!(body["token"].as_str().is_some_and(|token| !token.is_empty()));

    let expires_at = body["expiresAt"].as_i64().unwrap_or_default();
    assert!(expires_at > chrono::Utc::now().timestamp_millis());
}

#[tokio::test]
async fn rejected_login_uses_generic_message() {
    let router = test_router(test_state());

    let response = send(&router, login_request("admin@example.com", "not-the-password")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await,
        json!({ "message": AUTHENTICATION_FAILED_MESSAGE })
    );
}

#[tokio::test]
async fn malformed_email_is_bad_request() {
    let router = test_router(test_state());

    let response = send(&router, login_request("not-an-email", DEMO_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn google_login_redirects_to_provider_with_safe_state() {
    let router = test_router(test_state());

    let request = Request::builder()
        .uri("/api/auth/google?redirect=%2Fdashboard%2Fjobs")
        .body(Body::empty())
        .unwrap_or_else(|_| panic!("test"));
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert_eq!(
        location,
        "https://accounts.example.com/o/oauth2/auth?redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback&state=%2Fdashboard%2Fjobs"
    );

    let request = Request::builder()
        .uri("/api/auth/google?redirect=https%3A%2F%2Fevil.example")
        .body(Body::empty())
        .unwrap_or_else(|_| panic!("test"));
    let response = send(&router, request).await;
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(location.ends_with("&state=%2Fdashboard"));
}

#[tokio::test]
async fn logout_always_answers_no_content() {
    let router = test_router(test_state());

    let anonymous = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .body(Body::empty())
        .unwrap_or_else(|_| panic!("test"));
    assert_eq!(send(&router, anonymous).await.status(), StatusCode::NO_CONTENT);

    let unknown = bearer_request("POST", "/api/auth/logout", "never-issued");
    assert_eq!(send(&router, unknown).await.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn me_resolves_token_until_logout() {
    let router = test_router(test_state());

    let login = json_body(send(&router, login_request("driver@example.com", DEMO_PASSWORD)).await).await;
    let token = login["token"].as_str().unwrap_or_default().to_owned();

    let me = send(&router, bearer_request("GET", "/api/auth/me", &token)).await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(json_body(me).await["role"], "driver");

    let logout = send(&router, bearer_request("POST", "/api/auth/logout", &token)).await;
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);

    let me = send(&router, bearer_request("GET", "/api/auth/me", &token)).await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn http_gateway_drives_session_store_against_live_router() {
    let state = test_state();
    let issuer = Arc::clone(&state.auth_gateway);
    let router = test_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|_| panic!("test"));
    let address = listener.local_addr().unwrap_or_else(|_| panic!("test"));
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let base_url = Url::parse(&format!("http://{address}")).unwrap_or_else(|_| panic!("test"));
    let http_gateway = Arc::new(HttpAuthGateway::new(reqwest::Client::new(), base_url));
    let store = SessionStore::new(
        Arc::new(InMemorySessionStorage::new()),
        http_gateway.clone(),
        Arc::new(SystemClock),
    );
    let gate = AuthorizationGate::new(store.clone());
    let guard = RouteGuard::new(store.clone());

    let rejected = store
        .login(
            &fleetdesk_domain::Credentials::new("admin@example.com", "wrong")
                .unwrap_or_else(|_| panic!("test")),
        )
        .await;
    assert!(matches!(rejected, Err(AppError::Authentication(message)) if message == AUTHENTICATION_FAILED_MESSAGE));

    let identity = store
        .login(
            &fleetdesk_domain::Credentials::new("admin@example.com", DEMO_PASSWORD)
                .unwrap_or_else(|_| panic!("test")),
        )
        .await
        .unwrap_or_else(|_| panic!("test"));
    assert_eq!(identity.role(), Role::Admin);
    assert!(store.is_session_valid());
    assert!(gate.has_role(Role::Admin));
    assert!(!gate.has_role(Role::Driver));
    assert!(guard.check_page("/dashboard/quickbooks").identity().is_some());
    assert_eq!(issuer.active_session_count().await, 1);

    let token = store.token().unwrap_or_default();
    let remote = http_gateway.fetch_identity(&token).await;
    assert!(remote.is_ok_and(|remote| remote == identity));

    store.logout().await;
    assert!(store.current_identity().is_none());
    assert_eq!(issuer.active_session_count().await, 0);
    assert!(matches!(
        http_gateway.fetch_identity(&token).await,
        Err(AppError::Authentication(_))
    ));
}
