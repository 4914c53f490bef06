//! Local background service for the vidsage page scripts
//!
//! Page-side code posts [`Command`](vidsage_types::Command)s to `/dispatch`
//! (plain JSON reply) or `/dispatch/stream` (SSE progress, then the reply).

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use app::build_router;
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
