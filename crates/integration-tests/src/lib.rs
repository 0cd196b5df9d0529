//! Integration tests for Stockroom.
//!
//! The router is driven in memory with [`tower::ServiceExt::oneshot`]; no
//! port is bound and storage never touches the disk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stockroom-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_accounts` - Login, logout and account approval
//! - `inventory` - Listing, editing and stock alerts
//! - `pos` - Cart, checkout and receipts
//! - `dashboard_history` - Summaries, reports and the activity log

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::FixedOffset;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use stockroom_core::CurrencyCode;
use stockroom_server::config::ServerConfig;
use stockroom_server::db::LocalStorage;
use stockroom_server::services::accounts::SuperAdminSeed;
use stockroom_server::state::AppState;

/// Super admin username used by every test app.
pub const SUPER_ADMIN: &str = "superadmin";

/// Super admin password used by every test app.
pub const SUPER_ADMIN_PASSWORD: &str = "superadmin123";

/// Test configuration: in-memory data, `+08:00`, PHP.
///
/// # Panics
///
/// Never; the literals are valid.
#[must_use]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        data_dir: PathBuf::from("./unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3002,
        base_url: "http://localhost:3002".to_string(),
        utc_offset: FixedOffset::east_opt(8 * 3600).unwrap(),
        currency: CurrencyCode::PHP,
        log_json: false,
        super_admin: SuperAdminSeed {
            username: SUPER_ADMIN.to_string(),
            password: SecretString::from(SUPER_ADMIN_PASSWORD),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Response captured from the router.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    /// `name=value` part of the session `Set-Cookie` header, if any.
    pub cookie: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Body parsed as JSON (`Null` when empty).
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn json(&self) -> Value {
        if self.body.is_empty() {
            return Value::Null;
        }
        serde_json::from_slice(&self.body).unwrap()
    }

    /// Body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The `error` field of a JSON error body.
    #[must_use]
    pub fn error(&self) -> String {
        self.json()["error"].as_str().unwrap_or_default().to_string()
    }
}

/// An application instance over fresh in-memory storage.
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    /// Build an app with the default catalog and the super admin.
    ///
    /// # Panics
    ///
    /// Panics if the store cannot be prepared.
    #[allow(clippy::unwrap_used)]
    pub async fn new() -> Self {
        let state = AppState::new(test_config(), LocalStorage::in_memory());
        state.prepare().await.unwrap();
        let router = stockroom_server::app(state.clone());
        Self { state, router }
    }

    /// Send a request, optionally with a session cookie and a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::unwrap_used)]
    pub async fn request(
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
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_owned);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            content_type,
            cookie,
            body,
        }
    }

    /// `GET` with a session cookie.
    pub async fn get(&self, uri: &str, cookie: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(cookie), None).await
    }

    /// `POST` a JSON body with a session cookie.
    pub async fn post(&self, uri: &str, cookie: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(cookie), Some(body))
            .await
    }

    /// Log in and return the session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the login fails.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(serde_json::json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "login failed: {}",
            response.text()
        );
        response.cookie.unwrap_or_default()
    }

    /// Log in as the super admin.
    pub async fn login_super_admin(&self) -> String {
        self.login(SUPER_ADMIN, SUPER_ADMIN_PASSWORD).await
    }

    /// Create an active account as the super admin and log in with it.
    ///
    /// # Panics
    ///
    /// Panics if the account cannot be created.
    pub async fn login_as_new(&self, username: &str, role: &str) -> String {
        let admin = self.login_super_admin().await;
        let response = self
            .post(
                "/accounts",
                &admin,
                serde_json::json!({
                    "username": username,
                    "password": "secret123",
                    "confirmPassword": "secret123",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "create failed: {}",
            response.text()
        );
        self.login(username, "secret123").await
    }
}
