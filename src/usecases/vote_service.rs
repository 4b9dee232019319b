//! Vote casting: resolve the menu against the catalog, then append to the
//! ledger.
//!
//! The rolling-window eligibility check and the counter increment live
//! inside the ledger's transaction; this layer only validates the reference
//! and reports the outcome.

use crate::domain::{EngineError, MenuId, UserId, Vote};
use crate::ports::{CatalogPort, LedgerPort};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Vote service. One vote per user per rolling day.
pub struct VoteService {
    catalog: Arc<dyn CatalogPort>,
    ledger: Arc<dyn LedgerPort>,
}

impl VoteService {
    pub fn new(catalog: Arc<dyn CatalogPort>, ledger: Arc<dyn LedgerPort>) -> Self {
        Self { catalog, ledger }
    }

    /// Cast a vote for `menu_id`. Fails with `UnknownUser`/`UnknownMenu`
    /// for invalid references and `RateLimited` when the user's latest vote
    /// is younger than the window. A transient ledger failure commits
    /// nothing, so the caller may retry without double-counting.
    pub async fn cast_vote(
        &self,
        user_id: UserId,
        menu_id: MenuId,
        now: DateTime<Utc>,
    ) -> Result<Vote, EngineError> {
        // User ids are storage rowids, always >= 1.
        if user_id <= 0 {
            return Err(EngineError::UnknownUser(user_id));
        }
        let menu = self
            .catalog
            .find_menu(menu_id)
            .await?
            .ok_or(EngineError::UnknownMenu(menu_id))?;

        let vote = self.ledger.append_vote(user_id, menu.id, now).await?;
        info!(
            user_id,
            menu_id = menu.id,
            restaurant_id = menu.restaurant_id,
            "vote accepted"
        );
        Ok(vote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::memory_store::MemoryStore;
    use crate::ports::LedgerPort as _;
    use chrono::Duration;

    async fn store_with_one_menu() -> (Arc<MemoryStore>, MenuId) {
        let store = Arc::new(MemoryStore::new());
        let r = store.add_restaurant("Trattoria").await;
        let m = store
            .add_menu(r.id, "Lasagne", "Beef ragu", Utc::now())
            .await
            .unwrap();
        (store, m.id)
    }

    fn service(store: &Arc<MemoryStore>) -> VoteService {
        VoteService::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn rejects_unknown_menu() {
        let (store, _) = store_with_one_menu().await;
        let svc = service(&store);

        let err = svc.cast_vote(1, 999, Utc::now()).await.unwrap_err();
        assert!(matches!(err, EngineError::UnknownMenu(999)));
    }

    #[tokio::test]
    async fn rejects_invalid_user_reference() {
        let (store, menu_id) = store_with_one_menu().await;
        let svc = service(&store);

        let err = svc.cast_vote(0, menu_id, Utc::now()).await.unwrap_err();
        assert!(matches!(err, EngineError::UnknownUser(0)));
    }

    #[tokio::test]
    async fn accepts_first_vote_and_counts_it() {
        let (store, menu_id) = store_with_one_menu().await;
        let svc = service(&store);

        let vote = svc.cast_vote(1, menu_id, Utc::now()).await.unwrap();
        assert_eq!(vote.user_id, 1);
        assert_eq!(vote.menu_id, menu_id);

        let counts = store.vote_counts().await.unwrap();
        assert_eq!(counts.get(&menu_id), Some(&1));
    }

    #[tokio::test]
    async fn second_vote_inside_window_is_rate_limited() {
        let (store, menu_id) = store_with_one_menu().await;
        let svc = service(&store);
        let t0 = Utc::now();

        svc.cast_vote(1, menu_id, t0).await.unwrap();
        let err = svc
            .cast_vote(1, menu_id, t0 + Duration::hours(23))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::RateLimited { .. }));

        // The window is per user: another voter is unaffected.
        svc.cast_vote(2, menu_id, t0 + Duration::hours(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn window_slides_from_the_users_own_last_vote() {
        let (store, menu_id) = store_with_one_menu().await;
        let svc = service(&store);
        let t0 = Utc::now();

        svc.cast_vote(1, menu_id, t0).await.unwrap();
        svc.cast_vote(1, menu_id, t0 + Duration::hours(24))
            .await
            .unwrap();
        // 09:00 vote yesterday means 08:59 today is still closed.
        let err = svc
            .cast_vote(1, menu_id, t0 + Duration::hours(47))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::RateLimited { .. }));
    }

    mod property_tests {
        use super::*;
        use crate::domain::VOTE_WINDOW_SECS;
        use proptest::prelude::*;

        proptest! {
            /// No sequence of attempts ever yields two accepted votes by the
            /// same user inside a trailing 24 h window.
            #[test]
            fn prop_at_most_one_vote_per_window(
                offsets in prop::collection::vec(0i64..7 * VOTE_WINDOW_SECS, 1..40)
            ) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .unwrap();
                let accepted: Vec<i64> = rt.block_on(async {
                    let (store, menu_id) = store_with_one_menu().await;
                    let svc = service(&store);
                    let base = Utc::now();

                    let mut sorted = offsets.clone();
                    sorted.sort_unstable();

                    let mut ok = Vec::new();
                    for off in sorted {
                        let at = base + chrono::Duration::seconds(off);
                        if svc.cast_vote(7, menu_id, at).await.is_ok() {
                            ok.push(at.timestamp());
                        }
                    }
                    ok
                });

                for pair in accepted.windows(2) {
                    prop_assert!(
                        pair[1] - pair[0] >= VOTE_WINDOW_SECS,
                        "two accepted votes {} s apart",
                        pair[1] - pair[0]
                    );
                }
            }
        }
    }
}
