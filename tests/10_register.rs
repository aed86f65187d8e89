mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use tillstock_api::database::Store;
use tillstock_api::filter::FilterData;

use common::TestApp;

#[tokio::test]
async fn registration_creates_business_admin_profile_and_units() -> Result<()> {
    let app = TestApp::new();
    let owner = app.register("Corner Shop", "owner@corner.test").await?;

    let business = app.store.find_by_id("businesses", owner.business_id).await?.expect("business stored");
    assert_eq!(business["name"], json!("Corner Shop"));
    assert_eq!(business["currency"], json!("USD"));
    assert_eq!(business["timezone"], json!("UTC"));

    let user = app.store.find_by_id("users", owner.user_id).await?.expect("user stored");
    assert_eq!(user["business"], json!(owner.business_id));
    assert_eq!(user["roles"], json!(["admin"]));
    assert!(user.get("password").is_none(), "plaintext password must not be stored");
    assert!(user["password_hash"].as_str().unwrap_or_default().starts_with("$argon2"));

    let profiles = FilterData::by_fields([("user", json!(owner.user_id))]);
    assert_eq!(app.store.count("profiles", profiles).await?, 1);

    let units = FilterData::by_fields([("business", json!(owner.business_id))]);
    assert_eq!(app.store.count("units", units.clone()).await?, 11);
    assert_eq!(app.store.count("unit_conversions", units).await?, 16);
    Ok(())
}

#[tokio::test]
async fn registration_without_password_writes_nothing() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({
                "businessName": "Corner Shop",
                "email": "owner@corner.test",
                "country": "KE",
                "city": "Nairobi"
            }),
        )
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["field_errors"]["password"], json!("is required"));
    assert_eq!(app.store.count("businesses", FilterData::default()).await?, 0);
    assert_eq!(app.store.count("users", FilterData::default()).await?, 0);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected_before_any_write() -> Result<()> {
    let app = TestApp::new();
    app.register("Corner Shop", "owner@corner.test").await?;

    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({
                "businessName": "Second Shop",
                "email": "OWNER@corner.test",
                "password": "another-password",
                "country": "KE",
                "city": "Mombasa"
            }),
        )
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(body["field_errors"]["email"], json!("is already registered"));
    assert_eq!(app.store.count("businesses", FilterData::default()).await?, 1);
    Ok(())
}

#[tokio::test]
async fn registration_without_seeding_leaves_catalog_empty() -> Result<()> {
    let app = TestApp::with_config(|config| config.bootstrap.seed_on_create = false);
    let owner = app.register("Corner Shop", "owner@corner.test").await?;

    let units = FilterData::by_fields([("business", json!(owner.business_id))]);
    assert_eq!(app.store.count("units", units).await?, 0);
    Ok(())
}
