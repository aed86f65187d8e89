// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account creation and token acquisition. The auth middleware still runs on
// these routes but a missing token is never an error here.

pub mod auth;

pub use auth::*;
