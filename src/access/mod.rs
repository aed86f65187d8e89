// Tenant isolation: who the caller is, which business a record belongs to,
// and what a collection's access predicate decides for them.

pub mod decision;
pub mod guard;
pub mod principal;
pub mod tenant_ref;

pub use decision::AccessDecision;
pub use guard::{business_scope, platform_admin_only, self_business_scope, AccessPolicy};
pub use principal::{Principal, Role};
pub use tenant_ref::{document_tenant, tenant_id_of, TenantRef, TENANT_FIELD};
