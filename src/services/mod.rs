pub mod collection_service;
pub mod tenant_service;

pub use collection_service::CollectionService;
pub use tenant_service::{RegisterRequest, Registration, TenantService};
