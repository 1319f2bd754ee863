//! API module
//!
//! HTTP endpoints.

pub mod routes;

pub use routes::create_router;
