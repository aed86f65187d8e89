use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tenant_ref::{TenantRef, TENANT_FIELD};
use crate::types::{Document, RecordId};

/// Roles a user may hold. `SuperAdmin` is platform-wide; the rest are
/// roles inside the user's own business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    Manager,
    User,
    Cashier,
    SuperAdmin,
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "user" => Ok(Role::User),
            "cashier" => Ok(Role::Cashier),
            "super-admin" | "super_admin" | "superadmin" => Ok(Role::SuperAdmin),
            _ => Err(()),
        }
    }
}

/// The authenticated caller of a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: RecordId,
    pub email: String,
    pub business: Option<TenantRef>,
    pub roles: Vec<Role>,
    /// Active entry in the platform admin allow-list
    pub platform_admin: bool,
}

impl Principal {
    /// Build a principal from a stored user document
    pub fn from_user_document(doc: &Document, platform_admin: bool) -> Option<Self> {
        let user_id = doc.get("id").and_then(Value::as_i64)?;
        let email = doc.get("email").and_then(Value::as_str).unwrap_or_default().to_string();
        let business = doc.get(TENANT_FIELD).and_then(TenantRef::from_value);
        let roles = doc
            .get("roles")
            .and_then(Value::as_array)
            .map(|roles| {
                roles
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(|r| r.parse().ok())
                    .collect()
            })
            .unwrap_or_default();

        Some(Self { user_id, email, business, roles, platform_admin })
    }

    pub fn tenant_id(&self) -> Option<RecordId> {
        self.business.as_ref().map(TenantRef::id)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Cross-tenant access: allow-listed platform admin or platform-wide role
    pub fn is_privileged(&self) -> bool {
        self.platform_admin || self.has_role(Role::SuperAdmin)
    }
}
