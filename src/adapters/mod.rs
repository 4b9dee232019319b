//! Infrastructure adapters. Implement outbound ports.
//!
//! Storage, session, terminal UI. Map infrastructure errors to EngineError.

pub mod auth;
pub mod persistence;
pub mod ui;
