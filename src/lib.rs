// Library exports for testing
pub mod app;
pub mod auth;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod session;
pub mod storage;
pub mod templates;

pub use app::{AppState, build_router};
