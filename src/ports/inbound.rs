//! Inbound ports. UI (adapter) calls into the application.

use std::collections::HashMap;

use crate::domain::{EngineError, MenuId, MenuView, UserId, Vote};

/// Engine-exposed operations. Implemented by the engine context; wall-clock
/// time is injected there so the underlying services stay testable.
#[async_trait::async_trait]
pub trait EnginePort: Send + Sync {
    /// Record a vote for `menu_id` by `user_id`. Fails with `RateLimited`
    /// inside the rolling window and `UnknownMenu` for stale ids.
    async fn cast_vote(&self, user_id: UserId, menu_id: MenuId) -> Result<Vote, EngineError>;

    /// Today's menu. The first call of a day computes and commits the
    /// decision; later calls return the memoized record.
    async fn todays_menu(&self) -> Result<MenuView, EngineError>;

    /// Snapshot of current-cycle counts for every catalog menu.
    async fn tally(&self) -> Result<HashMap<MenuId, u32>, EngineError>;

    /// Manually trigger a cycle reset (the scheduler calls the same path).
    /// Returns the number of menus whose counter was zeroed.
    async fn reset_cycle(&self) -> Result<usize, EngineError>;
}

/// Input port: UI/CLI invokes application use cases.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the interactive loop (vote, today's menu, tally, history).
    async fn run(&self) -> Result<(), EngineError>;
}
