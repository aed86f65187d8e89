// handlers/protected/mod.rs - Handlers that act for an authenticated caller
//
// The auth middleware has already resolved the caller into an `AuthContext`
// extension. Handlers pass it to the services, which answer 401 when it is
// empty and apply tenant scoping otherwise.

pub mod auth;     // Current user
pub mod business; // The caller's own business
pub mod data;     // Generic CRUD over declared collections
pub mod units;    // Unit seeding, conversion and group listings
