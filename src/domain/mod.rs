//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    CYCLE_SECS, Menu, MenuId, MenuView, Restaurant, RestaurantId, SelectionRecord, UserId, Vote,
    VOTE_WINDOW_SECS,
};
pub use errors::EngineError;
