pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pipeline;
pub mod session;
pub mod state;
pub mod views;

pub use app::build_app;
pub use state::AppState;
