//! API Module
//!
//! HTTP handlers and routing for the caching gateway. Reads go through the
//! cached accessors; the remaining endpoints expose invalidation, warm-up and
//! cache diagnostics.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
