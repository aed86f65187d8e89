#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use tillstock_api::config::AppConfig;
use tillstock_api::database::MemoryStore;
use tillstock_api::{app, AppState};

pub const PASSWORD: &str = "correct-horse-battery";

/// Router over a fresh in-memory store, driven in-process with `oneshot`
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
}

/// A business registered through the public API, with a session token for its admin
pub struct Registered {
    pub business_id: i64,
    pub user_id: i64,
    pub email: String,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::development();
        config.bootstrap.seed_on_create = true;
        config.bootstrap.detached = false;
        adjust(&mut config);

        let store = Arc::new(MemoryStore::new());
        let router = app(AppState::new(store.clone(), config));
        Self { router, store }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await.context("router call failed")?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, uri, token, None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let (status, body) = self
            .post("/api/users/login", None, json!({ "email": email, "password": password }))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed with {}: {}", status, body);
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    /// Register a business and log its admin in
    pub async fn register(&self, business_name: &str, email: &str) -> Result<Registered> {
        let (status, body) = self
            .post(
                "/api/register",
                None,
                json!({
                    "businessName": business_name,
                    "email": email,
                    "password": PASSWORD,
                    "country": "KE",
                    "city": "Nairobi",
                    "firstName": "Owner"
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "registration failed with {}: {}", status, body);

        let business_id = body["businessId"].as_i64().context("missing businessId")?;
        let user_id = body["userId"].as_i64().context("missing userId")?;
        let token = self.login(email, PASSWORD).await?;
        Ok(Registered { business_id, user_id, email: email.to_string(), token })
    }
}
