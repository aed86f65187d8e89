// Observer implementations organized by rings
// Each ring handles a specific phase of the write pipeline

use crate::config::BootstrapConfig;
use crate::observer::pipeline::ObserverPipeline;

// Ring 0: Data Preparation
#[path = "0/normalize_email.rs"]
pub mod normalize_email;
#[path = "0/tenant_assignment.rs"]
pub mod tenant_assignment;

// Ring 1: Input Validation
#[path = "1/allowed_values.rs"]
pub mod allowed_values;
#[path = "1/conversion_factor.rs"]
pub mod conversion_factor;
#[path = "1/required_fields.rs"]
pub mod required_fields;

// Ring 2: Security
#[path = "2/account_access.rs"]
pub mod account_access;
#[path = "2/role_escalation.rs"]
pub mod role_escalation;
#[path = "2/tenant_integrity.rs"]
pub mod tenant_integrity;

// Ring 3: Business
#[path = "3/base_unit_check.rs"]
pub mod base_unit_check;
#[path = "3/conversion_endpoints.rs"]
pub mod conversion_endpoints;
#[path = "3/unique_email.rs"]
pub mod unique_email;

// Ring 4: Enrichment
#[path = "4/field_defaults.rs"]
pub mod field_defaults;
#[path = "4/hash_password.rs"]
pub mod hash_password;

// Ring 5: Database
#[path = "5/persist_records.rs"]
pub mod persist_records;

// Ring 6: Post-Database
#[path = "6/seed_default_units.rs"]
pub mod seed_default_units;

// Ring 7: Audit
#[path = "7/change_log.rs"]
pub mod change_log;

pub use account_access::AccountAccess;
pub use allowed_values::AllowedValues;
pub use base_unit_check::BaseUnitCheck;
pub use change_log::ChangeLog;
pub use conversion_endpoints::ConversionEndpoints;
pub use conversion_factor::ConversionFactor;
pub use field_defaults::FieldDefaults;
pub use hash_password::HashUserPassword;
pub use normalize_email::NormalizeUserEmail;
pub use persist_records::PersistRecords;
pub use required_fields::RequiredFields;
pub use role_escalation::RoleEscalation;
pub use seed_default_units::SeedDefaultUnits;
pub use tenant_assignment::TenantAssignment;
pub use tenant_integrity::TenantIntegrity;
pub use unique_email::UniqueEmail;

/// Register every built-in observer
pub fn register_all(pipeline: &mut ObserverPipeline, bootstrap: &BootstrapConfig) {
    pipeline.register_observer(TenantAssignment);
    pipeline.register_observer(NormalizeUserEmail);

    pipeline.register_observer(RequiredFields);
    pipeline.register_observer(AllowedValues);
    pipeline.register_observer(ConversionFactor);

    pipeline.register_observer(TenantIntegrity);
    pipeline.register_observer(AccountAccess);
    pipeline.register_observer(RoleEscalation);

    pipeline.register_observer(UniqueEmail);
    pipeline.register_observer(BaseUnitCheck);
    pipeline.register_observer(ConversionEndpoints);

    pipeline.register_observer(HashUserPassword);
    pipeline.register_observer(FieldDefaults);

    pipeline.register_observer(PersistRecords);

    if bootstrap.seed_on_create {
        pipeline.register_observer(SeedDefaultUnits::new(bootstrap));
    }

    pipeline.register_observer(ChangeLog);
}
