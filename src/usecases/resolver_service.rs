//! The daily decision: memoized via selection history, with the
//! anti-repetition override.
//!
//! The transition fires lazily on the first read of a calendar day; the one
//! committed record is the answer for the rest of that day. Votes cast
//! afterwards accumulate toward tomorrow only.

use crate::domain::{EngineError, Menu, MenuView, RestaurantId, SelectionRecord};
use crate::ports::{CatalogPort, HistoryPort};
use crate::usecases::tally_service::TallyService;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;

/// Resolver service. Orchestrates Tally and Selection History.
pub struct ResolverService {
    catalog: Arc<dyn CatalogPort>,
    tally: Arc<TallyService>,
    history: Arc<dyn HistoryPort>,
}

impl ResolverService {
    pub fn new(
        catalog: Arc<dyn CatalogPort>,
        tally: Arc<TallyService>,
        history: Arc<dyn HistoryPort>,
    ) -> Self {
        Self {
            catalog,
            tally,
            history,
        }
    }

    /// Today's menu. Returns the existing record when the day is already
    /// decided; otherwise computes the winner, applies the anti-repetition
    /// rule, and commits. `NoMenus` propagates when the catalog is empty —
    /// a fatal precondition the operator must fix.
    pub async fn todays_menu(&self, now: DateTime<Utc>) -> Result<MenuView, EngineError> {
        let today = now.date_naive();
        if let Some(record) = self.history.decision_for(today).await? {
            return self.view_of(&record).await;
        }

        let ranked = self.tally.ranked().await?;
        let candidate = &ranked[0].0;

        let pick = match self.vetoed_restaurant(today, candidate.restaurant_id).await? {
            Some(vetoed) => {
                let runner_up = pick_runner_up(&ranked, vetoed);
                if let Some(alt) = runner_up {
                    info!(
                        vetoed_restaurant = vetoed,
                        menu_id = alt.id,
                        "anti-repetition override applied"
                    );
                    alt
                } else {
                    // Every menu belongs to the vetoed restaurant; it keeps
                    // winning rather than starving the day of a decision.
                    candidate
                }
            }
            None => candidate,
        };

        let record = self
            .history
            .commit_decision(pick.id, pick.restaurant_id, now)
            .await?;
        // A concurrent first-read may have committed first; the returned
        // record is authoritative either way.
        info!(
            day = %record.day,
            menu_id = record.menu_id,
            restaurant_id = record.restaurant_id,
            "menu of the day decided"
        );
        self.view_of(&record).await
    }

    /// Restaurant barred from a third consecutive win, if any: the two most
    /// recent decisions before `today` exist, agree on a restaurant, and
    /// that restaurant is the candidate's. Fewer than two prior records
    /// never veto.
    async fn vetoed_restaurant(
        &self,
        today: NaiveDate,
        candidate_restaurant: RestaurantId,
    ) -> Result<Option<RestaurantId>, EngineError> {
        let prior: Vec<SelectionRecord> = self
            .history
            .recent_decisions(2)
            .await?
            .into_iter()
            .filter(|r| r.day < today)
            .collect();

        match prior.as_slice() {
            [last1, last2]
                if last1.restaurant_id == last2.restaurant_id
                    && last1.restaurant_id == candidate_restaurant =>
            {
                Ok(Some(candidate_restaurant))
            }
            _ => Ok(None),
        }
    }

    /// Join a committed record with its catalog display data. History never
    /// outlives the rows it references, so a miss is a storage fault.
    async fn view_of(&self, record: &SelectionRecord) -> Result<MenuView, EngineError> {
        let menu = self
            .catalog
            .find_menu(record.menu_id)
            .await?
            .ok_or_else(|| EngineError::Repo(format!("menu {} missing", record.menu_id)))?;
        let restaurant = self
            .catalog
            .find_restaurant(record.restaurant_id)
            .await?
            .ok_or_else(|| {
                EngineError::Repo(format!("restaurant {} missing", record.restaurant_id))
            })?;

        Ok(MenuView {
            day: record.day,
            menu_id: menu.id,
            menu_name: menu.name,
            description: menu.description,
            restaurant_id: restaurant.id,
            restaurant_name: restaurant.name,
            decided_at: record.decided_at,
        })
    }
}

/// Best-ranked menu owned by a different restaurant. The scan is bounded by
/// the ranked list, which holds one entry per catalog menu.
fn pick_runner_up(ranked: &[(Menu, u32)], vetoed: RestaurantId) -> Option<&Menu> {
    ranked
        .iter()
        .map(|(menu, _)| menu)
        .find(|menu| menu.restaurant_id != vetoed)
}
