pub mod access;
pub mod app;
pub mod auth;
pub mod collections;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod observer;
pub mod services;
pub mod state;
pub mod types;
pub mod units;

pub use app::app;
pub use state::AppState;
