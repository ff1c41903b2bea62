#![allow(dead_code)]

use std::env;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use timetracker::{
    app::build_app,
    config::{AppConfig, StoreBackend},
    state::AppState,
};
use tower::ServiceExt;

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

impl TestResponse {
    /// `name=value` pair from the first `Set-Cookie` header.
    pub fn session_cookie(&self) -> Option<String> {
        let raw = self.headers.get(header::SET_COOKIE)?.to_str().ok()?;
        raw.split(';').next().map(|pair| pair.trim().to_string())
    }

    pub fn set_cookie_header(&self) -> String {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    pub fn error_kind(&self) -> &str {
        self.json["error"]["kind"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub fn memory() -> Self {
        Self::from_state(AppState::memory())
    }

    pub fn from_state(state: AppState) -> Self {
        let router = build_app(state.clone());
        Self { state, router }
    }

    /// Connect to `TEST_DATABASE_URL`; `None` when it is not set.
    pub async fn postgres() -> Option<Self> {
        let url = env::var("TEST_DATABASE_URL").ok()?;
        let config = AppConfig {
            backend: StoreBackend::Postgres,
            database_url: Some(url),
            max_connections: 5,
            ..AppConfig::memory()
        };
        let state = AppState::from_config(config)
            .await
            .expect("failed to connect to postgres for integration tests");
        let app = Self::from_state(state);
        app.reset().await;
        Some(app)
    }

    /// Empty every table so each scenario starts from scratch.
    pub async fn reset(&self) {
        self.state
            .reset()
            .await
            .expect("failed to truncate tables for test isolation");
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let resp = self.router.clone().oneshot(req).await.expect("infallible router");
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            headers,
            json,
        }
    }

    pub async fn raw(&self, method: Method, uri: &str, cookie: &str, body: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        let resp = self.router.clone().oneshot(req).await.expect("infallible router");
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("readable body");
        TestResponse {
            status,
            headers,
            json: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }

    /// Sign up and return the user id with its session cookie.
    pub async fn sign_up(&self, email: &str, password: &str) -> (i64, String) {
        let resp = self
            .send(
                Method::POST,
                "/signup",
                None,
                Some(serde_json::json!({
                    "name": "string",
                    "email": email,
                    "password": password,
                    "about": "string",
                })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "signup failed: {}", resp.json);
        let cookie = resp.session_cookie().expect("signup sets a session cookie");
        let id = resp.json["body"]["id"].as_i64().expect("user id");
        (id, cookie)
    }

    pub async fn create_project(&self, cookie: &str, name: &str) -> i64 {
        let resp = self
            .send(
                Method::POST,
                "/project/create",
                Some(cookie),
                Some(serde_json::json!({ "name": name, "color": "#00ff00" })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "project create failed: {}", resp.json);
        resp.json["body"]["id"].as_i64().expect("project id")
    }

    pub async fn create_entry(&self, cookie: &str, body: Value) -> TestResponse {
        self.send(Method::POST, "/entry/create", Some(cookie), Some(body))
            .await
    }
}
