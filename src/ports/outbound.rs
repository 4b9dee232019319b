//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    EngineError, Menu, MenuId, Restaurant, RestaurantId, SelectionRecord, UserId, Vote,
};

/// Catalog collaborator. Read-only provider of restaurants and their
/// candidate menus for the voting period. Content is owned elsewhere
/// (admin CRUD); the engine only reads identity and display data.
#[async_trait::async_trait]
pub trait CatalogPort: Send + Sync {
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, EngineError>;

    async fn list_menus(&self, restaurant_id: RestaurantId) -> Result<Vec<Menu>, EngineError>;

    /// Look up a single menu. `None` when the id is not in the catalog.
    async fn find_menu(&self, menu_id: MenuId) -> Result<Option<Menu>, EngineError>;

    async fn find_restaurant(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Option<Restaurant>, EngineError>;
}

/// Session collaborator. Supplies the acting user; credential handling
/// lives outside the engine.
#[async_trait::async_trait]
pub trait SessionPort: Send + Sync {
    async fn current_user_id(&self) -> Result<UserId, EngineError>;
}

/// Vote ledger + per-cycle counters. Append-only vote history; the menu
/// counter is a running tally kept consistent with the ledger.
#[async_trait::async_trait]
pub trait LedgerPort: Send + Sync {
    /// Append a vote and increment the menu's counter as one atomic unit.
    /// The rolling-window eligibility check runs inside the same
    /// transaction: fails with `RateLimited` when the user's latest vote is
    /// younger than [`crate::domain::VOTE_WINDOW_SECS`]. A failed append
    /// leaves no partial state, so retrying is safe.
    async fn append_vote(
        &self,
        user_id: UserId,
        menu_id: MenuId,
        now: DateTime<Utc>,
    ) -> Result<Vote, EngineError>;

    /// Timestamp of the user's most recent vote, if any.
    async fn last_vote_at(&self, user_id: UserId) -> Result<Option<DateTime<Utc>>, EngineError>;

    /// Current-cycle counters for every menu that has one. Menus absent
    /// from the map have zero votes this cycle.
    async fn vote_counts(&self) -> Result<HashMap<MenuId, u32>, EngineError>;

    /// Zero the counter (and stamp the reset time) for every menu whose
    /// last reset/creation is at least [`crate::domain::CYCLE_SECS`] old.
    /// Returns the number of menus touched. Never alters vote history or
    /// selection history; serializes with concurrent counter increments.
    async fn reset_stale_counts(&self, now: DateTime<Utc>) -> Result<usize, EngineError>;
}

/// Selection history. Append-only, one record per calendar day.
#[async_trait::async_trait]
pub trait HistoryPort: Send + Sync {
    /// Commit today's decision. Idempotent per day: when a record for
    /// `now`'s date already exists it is returned unchanged, regardless of
    /// the arguments — concurrent first-reads all receive the winning
    /// commit. A fresh commit also maintains restaurant streaks atomically
    /// (winner extended or restarted at 1, all others zeroed).
    async fn commit_decision(
        &self,
        menu_id: MenuId,
        restaurant_id: RestaurantId,
        now: DateTime<Utc>,
    ) -> Result<SelectionRecord, EngineError>;

    async fn decision_for(&self, day: NaiveDate) -> Result<Option<SelectionRecord>, EngineError>;

    /// The `n` most recent records, newest first.
    async fn recent_decisions(&self, n: usize) -> Result<Vec<SelectionRecord>, EngineError>;
}
