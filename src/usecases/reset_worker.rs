//! Background cycle reset: sleep a fixed interval, zero stale counters,
//! repeat.
//!
//! Runs decoupled from request handling; the per-menu staleness check in the
//! ledger keeps each pass idempotent, so stopping the task at shutdown is
//! safe. The interval is wall-clock uptime, not calendar midnight.

use crate::ports::LedgerPort;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Reset worker. Owns nothing but the ledger handle and its interval.
pub struct ResetWorker {
    ledger: Arc<dyn LedgerPort>,
    interval: Duration,
}

impl ResetWorker {
    pub fn new(ledger: Arc<dyn LedgerPort>, interval: Duration) -> Self {
        Self { ledger, interval }
    }

    /// Run the scheduler loop until the task is dropped. Vote history and
    /// selection history are never touched; only per-cycle counters are.
    pub async fn run(self) {
        info!(
            interval_secs = self.interval.as_secs(),
            "cycle reset worker started"
        );
        loop {
            tokio::time::sleep(self.interval).await;
            match self.ledger.reset_stale_counts(Utc::now()).await {
                Ok(reset) => info!(menus_reset = reset, "cycle reset complete"),
                Err(e) => warn!(error = %e, "cycle reset failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::memory_store::MemoryStore;
    use chrono::Duration as ChronoDuration;

    #[tokio::test]
    async fn stale_counter_is_zeroed_and_fresh_one_kept() {
        let store = Arc::new(MemoryStore::new());
        let t0 = Utc::now();
        let r = store.add_restaurant("Diner").await;
        let stale = store
            .add_menu(r.id, "Burger", "", t0 - ChronoDuration::hours(25))
            .await
            .unwrap();
        let fresh = store
            .add_menu(r.id, "Fries", "", t0 - ChronoDuration::hours(10))
            .await
            .unwrap();

        for user in 0..7 {
            store
                .append_vote(user, stale.id, t0 - ChronoDuration::hours(25))
                .await
                .unwrap();
        }
        store
            .append_vote(100, fresh.id, t0 - ChronoDuration::hours(10))
            .await
            .unwrap();

        let touched = store.reset_stale_counts(t0).await.unwrap();
        assert_eq!(touched, 1);

        let counts = store.vote_counts().await.unwrap();
        assert_eq!(counts.get(&stale.id), Some(&0));
        assert_eq!(counts.get(&fresh.id), Some(&1));

        // The ledger itself is untouched: the votes are still on record.
        assert!(store.last_vote_at(100).await.unwrap().is_some());
        assert!(store.last_vote_at(0).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn resetting_an_already_zero_menu_is_a_no_op() {
        let store = Arc::new(MemoryStore::new());
        let t0 = Utc::now();
        let r = store.add_restaurant("Diner").await;
        let menu = store
            .add_menu(r.id, "Burger", "", t0 - ChronoDuration::hours(30))
            .await
            .unwrap();

        let first = store.reset_stale_counts(t0).await.unwrap();
        assert_eq!(first, 1);
        // The pass stamped the reset time, so an immediate second pass
        // finds nothing stale.
        let second = store.reset_stale_counts(t0).await.unwrap();
        assert_eq!(second, 0);

        let counts = store.vote_counts().await.unwrap();
        assert_eq!(counts.get(&menu.id), Some(&0));
    }
}
