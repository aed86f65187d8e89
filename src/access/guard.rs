use serde_json::json;

use super::decision::AccessDecision;
use super::principal::Principal;
use super::tenant_ref::TENANT_FIELD;
use crate::types::Operation;

/// Access predicate a collection declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Records carry a `business` field; callers see their own business only
    TenantScoped,
    /// The business collection itself: callers see the record whose `id`
    /// is their business
    SelfTenant,
    /// Platform staff only
    PlatformAdminOnly,
}

impl AccessPolicy {
    pub fn evaluate(&self, principal: Option<&Principal>, op: Operation) -> AccessDecision {
        let decision = match self {
            AccessPolicy::TenantScoped => business_scope(principal, op),
            AccessPolicy::SelfTenant => self_business_scope(principal, op),
            AccessPolicy::PlatformAdminOnly => platform_admin_only(principal),
        };
        tracing::trace!(
            "access {:?} {:?} for user {:?} -> {:?}",
            self,
            op,
            principal.map(|p| p.user_id),
            decision
        );
        decision
    }
}

/// Guard for tenant-owned collections.
///
/// * privileged principal: `Allow`
/// * principal with a business: `FilterBy({business: id})`
/// * no principal, or no business: `Deny`
///
/// Creation only requires an authenticated principal; the business is then
/// stamped and checked by the write pipeline.
pub fn business_scope(principal: Option<&Principal>, op: Operation) -> AccessDecision {
    let Some(principal) = principal else {
        return AccessDecision::Deny;
    };
    if principal.is_privileged() {
        return AccessDecision::Allow;
    }
    if op == Operation::Create {
        return AccessDecision::Allow;
    }
    match principal.tenant_id() {
        Some(tenant_id) => AccessDecision::FilterBy(json!({ TENANT_FIELD: tenant_id })),
        None => AccessDecision::Deny,
    }
}

/// Guard for the business collection: compares the record's own `id`
pub fn self_business_scope(principal: Option<&Principal>, op: Operation) -> AccessDecision {
    let Some(principal) = principal else {
        return AccessDecision::Deny;
    };
    if principal.is_privileged() {
        return AccessDecision::Allow;
    }
    match (op, principal.tenant_id()) {
        // Businesses are created by registration or platform staff
        (Operation::Create, _) => AccessDecision::Deny,
        // Deletion is disabled for businesses through the API
        (Operation::Delete, _) => AccessDecision::Deny,
        (_, Some(tenant_id)) => AccessDecision::FilterBy(json!({ "id": tenant_id })),
        (_, None) => AccessDecision::Deny,
    }
}

pub fn platform_admin_only(principal: Option<&Principal>) -> AccessDecision {
    match principal {
        Some(p) if p.is_privileged() => AccessDecision::Allow,
        _ => AccessDecision::Deny,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Role, TenantRef};
    use serde_json::json;

    fn member(tenant: Option<i64>) -> Principal {
        Principal {
            user_id: 10,
            email: "cashier@shop.test".to_string(),
            business: tenant.map(TenantRef::Id),
            roles: vec![Role::Cashier],
            platform_admin: false,
        }
    }

    #[test]
    fn anonymous_callers_are_denied() {
        for op in [Operation::Read, Operation::Update, Operation::Delete, Operation::Create] {
            assert_eq!(business_scope(None, op), AccessDecision::Deny);
            assert_eq!(self_business_scope(None, op), AccessDecision::Deny);
        }
    }

    #[test]
    fn members_are_scoped_to_their_business() {
        let p = member(Some(42));
        for op in [Operation::Read, Operation::Update, Operation::Delete] {
            assert_eq!(business_scope(Some(&p), op), AccessDecision::FilterBy(json!({ "business": 42 })));
        }
    }

    #[test]
    fn embedded_business_ref_scopes_the_same_way() {
        let mut p = member(None);
        p.business = TenantRef::from_value(&json!({ "id": 42, "name": "Corner Shop" }));
        assert_eq!(
            business_scope(Some(&p), Operation::Read),
            AccessDecision::FilterBy(json!({ "business": 42 }))
        );
    }

    #[test]
    fn members_without_business_are_denied() {
        let p = member(None);
        assert_eq!(business_scope(Some(&p), Operation::Read), AccessDecision::Deny);
        assert_eq!(business_scope(Some(&p), Operation::Update), AccessDecision::Deny);
    }

    #[test]
    fn tenant_admin_role_is_still_scoped() {
        let mut p = member(Some(42));
        p.roles = vec![Role::Admin];
        assert_eq!(business_scope(Some(&p), Operation::Read), AccessDecision::FilterBy(json!({ "business": 42 })));
    }

    #[test]
    fn platform_admins_bypass_scoping() {
        let mut p = member(None);
        p.platform_admin = true;
        assert_eq!(business_scope(Some(&p), Operation::Delete), AccessDecision::Allow);
        assert_eq!(self_business_scope(Some(&p), Operation::Read), AccessDecision::Allow);
        assert_eq!(platform_admin_only(Some(&p)), AccessDecision::Allow);
    }

    #[test]
    fn self_scope_compares_record_id() {
        let p = member(Some(42));
        assert_eq!(self_business_scope(Some(&p), Operation::Read), AccessDecision::FilterBy(json!({ "id": 42 })));
        assert_eq!(self_business_scope(Some(&p), Operation::Update), AccessDecision::FilterBy(json!({ "id": 42 })));
        assert_eq!(self_business_scope(Some(&p), Operation::Delete), AccessDecision::Deny);
        assert_eq!(platform_admin_only(Some(&p)), AccessDecision::Deny);
    }
}
