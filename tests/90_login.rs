mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, PASSWORD};

#[tokio::test]
async fn login_returns_token_without_password_hash() -> Result<()> {
    let app = TestApp::new();
    let owner = app.register("Corner Shop", "owner@corner.test").await?;

    let (status, body) = app
        .post("/api/users/login", None, json!({ "email": "Owner@Corner.test", "password": PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["data"]["user"]["id"], json!(owner.user_id));
    assert!(body["data"]["user"].get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn bad_credentials_share_one_answer() -> Result<()> {
    let app = TestApp::new();
    app.register("Corner Shop", "owner@corner.test").await?;

    let (wrong_password, body_a) = app
        .post("/api/users/login", None, json!({ "email": "owner@corner.test", "password": "nope" }))
        .await?;
    let (unknown_email, body_b) = app
        .post("/api/users/login", None, json!({ "email": "ghost@corner.test", "password": "nope" }))
        .await?;

    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a["error"], body_b["error"]);
    Ok(())
}

#[tokio::test]
async fn me_describes_the_token_holder() -> Result<()> {
    let app = TestApp::new();
    let owner = app.register("Corner Shop", "owner@corner.test").await?;

    let (status, body) = app.get("/api/users/me", Some(&owner.token)).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["user"]["email"], json!(owner.email));
    assert_eq!(body["data"]["business"], json!(owner.business_id));
    assert_eq!(body["data"]["roles"], json!(["admin"]));
    assert_eq!(body["data"]["platformAdmin"], json!(false));
    Ok(())
}

#[tokio::test]
async fn invalid_token_is_rejected_even_on_public_routes() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.get("/api/users/me", Some("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!("UNAUTHORIZED"));

    let (status, _) = app.get("/health", Some("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], json!("ok"));
    Ok(())
}
