use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::access::Principal;
use crate::collections::{self, BUSINESSES, PROFILES, USERS};
use crate::database::document_id;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::services::CollectionService;
use crate::state::AppState;
use crate::types::{Document, RecordId};

/// Self-service registration payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub business_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub landmark: Option<String>,
    pub currency: Option<String>,
    pub timezone: Option<String>,
    pub first_name: Option<String>,
}

impl RegisterRequest {
    /// Every problem with the payload, keyed by request field
    pub fn validate(&self) -> HashMap<String, String> {
        let mut errors = HashMap::new();
        let required = [
            ("businessName", &self.business_name),
            ("email", &self.email),
            ("password", &self.password),
            ("country", &self.country),
            ("city", &self.city),
        ];
        for (field, value) in required {
            if value.as_deref().map(str::trim).unwrap_or_default().is_empty() {
                errors.insert(field.to_string(), "is required".to_string());
            }
        }
        if let Some(email) = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            if !email.contains('@') {
                errors.insert("email".to_string(), "must be an email address".to_string());
            }
        }
        errors
    }

    fn email(&self) -> String {
        self.email.as_deref().unwrap_or_default().trim().to_lowercase()
    }

    fn business_document(&self) -> Value {
        let mut doc = Document::new();
        let fields = [
            ("name", &self.business_name),
            ("country", &self.country),
            ("city", &self.city),
            ("state", &self.state),
            ("zip_code", &self.zip_code),
            ("landmark", &self.landmark),
            ("currency", &self.currency),
            ("timezone", &self.timezone),
        ];
        for (field, value) in fields {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                doc.insert(field.to_string(), json!(v));
            }
        }
        doc.insert("email".to_string(), json!(self.email()));
        Value::Object(doc)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub business_id: RecordId,
    pub user_id: RecordId,
    pub profile_id: Option<RecordId>,
}

/// Business-level workflows: self-service registration and the caller's own business
pub struct TenantService {
    businesses: CollectionService,
    users: CollectionService,
    profiles: CollectionService,
}

fn schema(slug: &str) -> Result<&'static collections::CollectionSchema, ApiError> {
    collections::lookup(slug).ok_or_else(|| ApiError::internal_server_error(format!("collection {} is not declared", slug)))
}

impl TenantService {
    pub fn new(state: &AppState) -> Result<Self, ApiError> {
        let service = |slug| -> Result<CollectionService, ApiError> {
            Ok(CollectionService::new(state.store.clone(), state.pipeline.clone(), schema(slug)?))
        };
        Ok(Self {
            businesses: service(BUSINESSES)?,
            users: service(USERS)?,
            profiles: service(PROFILES)?,
        })
    }

    /// Register a business with its first admin user and profile.
    ///
    /// The payload is validated in full before anything is written. Creating
    /// the business seeds its default units through the post-write observer. The steps are not
    /// atomic: a failure after the business exists is reported as a server
    /// error and leaves the records written so far.
    pub async fn register(&self, request: RegisterRequest) -> Result<Registration, ApiError> {
        let field_errors = request.validate();
        if !field_errors.is_empty() {
            return Err(ApiError::validation_error("Invalid registration", Some(field_errors)));
        }

        let email = request.email();
        let taken = self
            .users
            .exists_unscoped(FilterData::by_fields([("email", json!(email))]))
            .await?;
        if taken {
            let mut field_errors = HashMap::new();
            field_errors.insert("email".to_string(), "is already registered".to_string());
            return Err(ApiError::validation_error("Invalid registration", Some(field_errors)));
        }

        let business = self.businesses.create_as_system(request.business_document()).await?;
        let business_id = document_id(&business)
            .ok_or_else(|| ApiError::internal_server_error("Business was created without an id"))?;
        tracing::info!("Registered business {} for {}", business_id, email);

        let first_name = request.first_name.clone().unwrap_or_default();
        let user = self
            .users
            .create_as_system(json!({
                "email": email,
                "password": request.password,
                "first_name": first_name,
                "roles": ["admin"],
                "business": business_id,
            }))
            .await
            .map_err(|e| registration_failed("user", business_id, e))?;
        let user_id =
            document_id(&user).ok_or_else(|| ApiError::internal_server_error("User was created without an id"))?;

        let profile = self
            .profiles
            .create_as_system(json!({
                "user": user_id,
                "business": business_id,
                "first_name": first_name,
                "email": email,
            }))
            .await
            .map_err(|e| registration_failed("profile", business_id, e))?;

        Ok(Registration {
            business_id,
            user_id,
            profile_id: document_id(&profile),
        })
    }

    fn caller_business_id(principal: Option<&Principal>) -> Result<RecordId, ApiError> {
        let principal = principal.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
        principal
            .tenant_id()
            .ok_or_else(|| ApiError::not_found("No business is associated with this account"))
    }

    /// The caller's own business
    pub async fn current_business(&self, principal: Option<&Principal>) -> Result<Document, ApiError> {
        let business_id = Self::caller_business_id(principal)?;
        self.businesses.get(principal, business_id).await
    }

    /// Patch the caller's own business; store-owned fields in the body are ignored
    pub async fn update_current_business(&self, principal: Option<&Principal>, changes: Value) -> Result<Document, ApiError> {
        let business_id = Self::caller_business_id(principal)?;
        self.businesses.update(principal, business_id, changes).await
    }
}

fn registration_failed(step: &str, business_id: RecordId, error: ApiError) -> ApiError {
    tracing::error!("Registration of business {} failed creating {}: {}", business_id, step, error);
    ApiError::internal_server_error("Registration failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_reports_every_missing_field() {
        let request = RegisterRequest {
            business_name: Some("Corner Shop".to_string()),
            email: Some("not-an-email".to_string()),
            city: Some("  ".to_string()),
            ..Default::default()
        };
        let errors = request.validate();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains_key("password"));
        assert!(errors.contains_key("country"));
        assert!(errors.contains_key("city"));
        assert_eq!(errors["email"], "must be an email address");
    }

    #[test]
    fn business_document_maps_request_fields() {
        let request = RegisterRequest {
            business_name: Some("Corner Shop".to_string()),
            email: Some(" Owner@Shop.Test ".to_string()),
            zip_code: Some("00100".to_string()),
            ..Default::default()
        };
        let doc = request.business_document();
        assert_eq!(doc["name"], json!("Corner Shop"));
        assert_eq!(doc["email"], json!("owner@shop.test"));
        assert_eq!(doc["zip_code"], json!("00100"));
        assert!(doc.get("landmark").is_none());
    }
}
