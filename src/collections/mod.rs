// Declarative collection schemas: which collections exist, how they are
// guarded, and which fields the write pipeline checks.

use serde_json::Value;

use crate::access::AccessPolicy;

pub const BUSINESSES: &str = "businesses";
pub const USERS: &str = "users";
pub const PLATFORM_ADMINS: &str = "platform_admins";
pub const PROFILES: &str = "profiles";
pub const UNITS: &str = "units";
pub const UNIT_CONVERSIONS: &str = "unit_conversions";

pub const ROLES: &[&str] = &["admin", "manager", "user", "cashier", "super-admin"];
pub const UNIT_GROUPS: &[&str] = &["MASS", "LENGTH", "VOLUME", "AREA", "COUNT", "TIME", "OTHER"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Str(&'static str),
    Bool(bool),
}

impl FieldDefault {
    pub fn to_value(self) -> Value {
        match self {
            FieldDefault::Str(s) => Value::String(s.to_string()),
            FieldDefault::Bool(b) => Value::Bool(b),
        }
    }
}

#[derive(Debug)]
pub struct CollectionSchema {
    pub slug: &'static str,
    pub policy: AccessPolicy,
    /// Must be present and non-empty on create, and may not be cleared on update
    pub required: &'static [&'static str],
    /// Closed value sets; array fields are checked element by element
    pub enums: &'static [(&'static str, &'static [&'static str])],
    /// Applied on create when the field is absent
    pub defaults: &'static [(&'static str, FieldDefault)],
    /// Stored but never returned through the API
    pub hidden: &'static [&'static str],
    pub allow_delete: bool,
}

impl CollectionSchema {
    /// Records carry a `business` field and are auto-assigned on write
    pub fn is_tenant_scoped(&self) -> bool {
        self.policy == AccessPolicy::TenantScoped
    }

    pub fn is(&self, slug: &str) -> bool {
        self.slug == slug
    }

    pub fn allowed_values(&self, field: &str) -> Option<&'static [&'static str]> {
        self.enums.iter().find(|(name, _)| *name == field).map(|(_, values)| *values)
    }
}

const fn scoped(slug: &'static str, required: &'static [&'static str]) -> CollectionSchema {
    CollectionSchema {
        slug,
        policy: AccessPolicy::TenantScoped,
        required,
        enums: &[],
        defaults: &[],
        hidden: &[],
        allow_delete: true,
    }
}

static COLLECTIONS: &[CollectionSchema] = &[
    CollectionSchema {
        slug: BUSINESSES,
        policy: AccessPolicy::SelfTenant,
        required: &["name", "email", "country", "city"],
        enums: &[],
        defaults: &[("currency", FieldDefault::Str("USD")), ("timezone", FieldDefault::Str("UTC"))],
        hidden: &[],
        allow_delete: false,
    },
    CollectionSchema {
        slug: USERS,
        policy: AccessPolicy::TenantScoped,
        required: &["email", "business"],
        enums: &[("roles", ROLES)],
        defaults: &[],
        hidden: &["password_hash"],
        allow_delete: true,
    },
    CollectionSchema {
        slug: PLATFORM_ADMINS,
        policy: AccessPolicy::PlatformAdminOnly,
        required: &["user"],
        enums: &[],
        defaults: &[("is_active", FieldDefault::Bool(true))],
        hidden: &[],
        allow_delete: true,
    },
    scoped(PROFILES, &["user", "business"]),
    CollectionSchema {
        slug: UNITS,
        policy: AccessPolicy::TenantScoped,
        required: &["name", "short_name", "unit_group", "business"],
        enums: &[("unit_group", UNIT_GROUPS)],
        defaults: &[("is_base_unit", FieldDefault::Bool(false)), ("allow_decimal", FieldDefault::Bool(true))],
        hidden: &[],
        allow_delete: true,
    },
    scoped(UNIT_CONVERSIONS, &["from_unit", "to_unit", "factor", "business"]),
    scoped("products", &["name", "business"]),
    scoped("categories", &["name", "business"]),
    scoped("brands", &["name", "business"]),
    scoped("customers", &["name", "business"]),
    scoped("suppliers", &["name", "business"]),
    scoped("sales", &["business"]),
    scoped("purchases", &["business"]),
    scoped("stock_adjustments", &["product", "business"]),
    scoped("subscriptions", &["plan", "business"]),
    scoped("pages", &["title", "business"]),
    scoped("posts", &["title", "business"]),
];

/// Look up a collection by its URL slug
pub fn lookup(slug: &str) -> Option<&'static CollectionSchema> {
    COLLECTIONS.iter().find(|c| c.slug == slug)
}

pub fn all() -> &'static [CollectionSchema] {
    COLLECTIONS
}
