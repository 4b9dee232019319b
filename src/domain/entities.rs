//! Domain entities. Pure data structures for the core business.
//!
//! No SQL/IO types here — these are mapped from adapters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type MenuId = i64;
pub type RestaurantId = i64;

/// Rolling per-user vote window: a user may cast at most one vote within
/// 24 hours of their own previous vote. Measured from the vote timestamp,
/// not from a clock boundary.
pub const VOTE_WINDOW_SECS: i64 = 24 * 60 * 60;

/// Tally cycle length: a menu's counter is eligible for reset once its last
/// reset (or creation) is at least this old.
pub const CYCLE_SECS: i64 = 24 * 60 * 60;

/// A restaurant offering candidate menus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    /// Consecutive days this restaurant's menu was selected. Updated only
    /// when a daily decision is committed.
    pub streak: u32,
}

/// A candidate menu for the voting period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Menu {
    pub id: MenuId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Current-cycle vote counter. Zeroed by the reset scheduler; identity
    /// and restaurant association never change after creation.
    pub votes: u32,
}

/// One accepted vote. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: i64,
    pub user_id: UserId,
    pub menu_id: MenuId,
    pub cast_at: DateTime<Utc>,
}

/// The committed decision for one calendar day. Append-only; at most one
/// record per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRecord {
    pub id: i64,
    pub day: NaiveDate,
    pub menu_id: MenuId,
    pub restaurant_id: RestaurantId,
    pub decided_at: DateTime<Utc>,
}

/// Read model for "today's menu": the committed decision joined with its
/// catalog display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuView {
    pub day: NaiveDate,
    pub menu_id: MenuId,
    pub menu_name: String,
    pub description: String,
    pub restaurant_id: RestaurantId,
    pub restaurant_name: String,
    pub decided_at: DateTime<Utc>,
}
