//! vigil server library entry.
//!
//! Wires configuration, the shared metrics registry, and the HTTP handlers
//! into an axum router. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod greet;
pub mod obs;
pub mod ops;
pub mod router;
