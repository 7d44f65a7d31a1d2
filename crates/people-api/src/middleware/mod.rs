//! # Middleware
//!
//! Request tracing for the API router.

pub mod tracing_layer;
