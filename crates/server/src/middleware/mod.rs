//! HTTP middleware stack for the Stockroom server.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with an in-memory store)
//! 4. Auth extractors on individual handlers

pub mod auth;
pub mod session;

pub use auth::{
    AuthRejection, OptionalAuth, RequireAuth, RequirePermission, RequireSuperAdmin,
    clear_current_account, set_current_account,
};
pub use session::create_session_layer;
