use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use motorlot::{
    api::{build_router, ApiState},
    config::{AuthConfig, DatabaseConfig},
    storage::{create_pool, DbPool},
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const STRONG_PASSWORD: &str = "Str0ng!Pass#1";

pub struct TestApp {
    pub state: ApiState,
    pub pool: DbPool,
    _data_dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Register an account through the real endpoint.
    pub async fn register(&self, first_name: &str, last_name: &str, email: &str) {
        let response = send_request(
            self,
            Method::POST,
            "/account/register",
            None,
            Some(json!({
                "firstName": first_name,
                "lastName": last_name,
                "email": email,
                "password": STRONG_PASSWORD,
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED, "registration should succeed");
    }

    /// Log in through the real endpoint and return the auth cookie pair
    /// (`ml_auth=<token>`).
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = send_request(
            self,
            Method::POST,
            "/account/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login should succeed");
        auth_cookie_pair(&response).expect("login response should set the auth cookie")
    }

    /// Promote an account directly in the store; role is not client-settable
    /// through any endpoint.
    pub async fn promote(&self, email: &str, role: &str) {
        sqlx::query("UPDATE accounts SET role = $1 WHERE email = $2")
            .bind(role)
            .bind(email)
            .execute(&self.pool)
            .await
            .expect("promote account");
    }
}

pub async fn setup_test_app() -> TestApp {
    let data_dir = TempDir::new().expect("create temp dir");
    let db_config = DatabaseConfig {
        url: format!("sqlite://{}/motorlot-test.db", data_dir.path().display()),
        max_connections: 5,
        auto_migrate: true,
        ..Default::default()
    };

    let pool = create_pool(&db_config).await.expect("create test pool");

    let auth_config = AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        token_ttl_seconds: 3600,
        production: false,
    };

    let state = ApiState::new(pool.clone(), &auth_config);

    TestApp { state, pool, _data_dir: data_dir }
}

pub async fn send_request(
    app: &TestApp,
    method: Method,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = if let Some(json) = body {
        let bytes = serde_json::to_vec(&json).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("build request")
    } else {
        builder.body(Body::empty()).expect("build request")
    };

    app.router().oneshot(request).await.expect("request")
}

pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

/// Extract the `ml_auth=<token>` pair from a response's Set-Cookie headers.
pub fn auth_cookie_pair(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("ml_auth=") && !value.starts_with("ml_auth=;"))
        .and_then(|value| value.split(';').next())
        .map(|pair| pair.to_string())
}

/// True when the response instructs the client to drop the auth cookie.
pub fn clears_auth_cookie(response: &Response<Body>) -> bool {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with("ml_auth=;") || value.starts_with("ml_auth=\"\""))
}

/// Pull the bare token out of a `ml_auth=<token>` pair.
pub fn token_from_pair(pair: &str) -> &str {
    pair.strip_prefix("ml_auth=").expect("auth cookie pair")
}
