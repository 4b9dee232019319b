//! In-memory store implementing the catalog, ledger, and history ports.
//!
//! One async mutex guards the whole store, so every multi-step mutation is a
//! single critical section — the same single-writer discipline the SQLite
//! adapter gets from its transactions. Backs tests and offline runs.

use crate::domain::{
    CYCLE_SECS, EngineError, Menu, MenuId, Restaurant, RestaurantId, SelectionRecord, UserId,
    Vote, VOTE_WINDOW_SECS,
};
use crate::ports::{CatalogPort, HistoryPort, LedgerPort};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

struct MenuRow {
    menu: Menu,
    /// Last cycle reset; creation time until the first reset.
    last_reset_at: DateTime<Utc>,
}

#[derive(Default)]
struct StoreData {
    restaurants: Vec<Restaurant>,
    menus: Vec<MenuRow>,
    votes: Vec<Vote>,
    selections: Vec<SelectionRecord>,
    next_restaurant_id: i64,
    next_menu_id: i64,
    next_vote_id: i64,
    next_selection_id: i64,
}

/// In-memory store. Safe to share via Arc; all state behind one lock.
pub struct MemoryStore {
    data: Mutex<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(StoreData::default()),
        }
    }

    /// Seed a restaurant. Catalog content is otherwise read-only here.
    pub async fn add_restaurant(&self, name: &str) -> Restaurant {
        let mut data = self.data.lock().await;
        data.next_restaurant_id += 1;
        let restaurant = Restaurant {
            id: data.next_restaurant_id,
            name: name.to_string(),
            streak: 0,
        };
        data.restaurants.push(restaurant.clone());
        restaurant
    }

    /// Seed a menu under an existing restaurant. `now` is both the creation
    /// time and the initial reset stamp.
    pub async fn add_menu(
        &self,
        restaurant_id: RestaurantId,
        name: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Menu, EngineError> {
        let mut data = self.data.lock().await;
        if !data.restaurants.iter().any(|r| r.id == restaurant_id) {
            return Err(EngineError::Repo(format!(
                "restaurant {restaurant_id} missing"
            )));
        }
        data.next_menu_id += 1;
        let menu = Menu {
            id: data.next_menu_id,
            restaurant_id,
            name: name.to_string(),
            description: description.to_string(),
            created_at: now,
            votes: 0,
        };
        data.menus.push(MenuRow {
            menu: menu.clone(),
            last_reset_at: now,
        });
        Ok(menu)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CatalogPort for MemoryStore {
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, EngineError> {
        Ok(self.data.lock().await.restaurants.clone())
    }

    async fn list_menus(&self, restaurant_id: RestaurantId) -> Result<Vec<Menu>, EngineError> {
        let data = self.data.lock().await;
        Ok(data
            .menus
            .iter()
            .filter(|row| row.menu.restaurant_id == restaurant_id)
            .map(|row| row.menu.clone())
            .collect())
    }

    async fn find_menu(&self, menu_id: MenuId) -> Result<Option<Menu>, EngineError> {
        let data = self.data.lock().await;
        Ok(data
            .menus
            .iter()
            .find(|row| row.menu.id == menu_id)
            .map(|row| row.menu.clone()))
    }

    async fn find_restaurant(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Option<Restaurant>, EngineError> {
        let data = self.data.lock().await;
        Ok(data
            .restaurants
            .iter()
            .find(|r| r.id == restaurant_id)
            .cloned())
    }
}

#[async_trait::async_trait]
impl LedgerPort for MemoryStore {
    async fn append_vote(
        &self,
        user_id: UserId,
        menu_id: MenuId,
        now: DateTime<Utc>,
    ) -> Result<Vote, EngineError> {
        let mut data = self.data.lock().await;

        let last = data
            .votes
            .iter()
            .filter(|v| v.user_id == user_id)
            .map(|v| v.cast_at)
            .max();
        if let Some(last) = last {
            if (now - last).num_seconds() < VOTE_WINDOW_SECS {
                return Err(EngineError::RateLimited {
                    next_allowed: last + Duration::seconds(VOTE_WINDOW_SECS),
                });
            }
        }

        data.next_vote_id += 1;
        let id = data.next_vote_id;
        let row = data
            .menus
            .iter_mut()
            .find(|row| row.menu.id == menu_id)
            .ok_or(EngineError::UnknownMenu(menu_id))?;
        row.menu.votes += 1;

        let vote = Vote {
            id,
            user_id,
            menu_id,
            cast_at: now,
        };
        data.votes.push(vote.clone());
        Ok(vote)
    }

    async fn last_vote_at(&self, user_id: UserId) -> Result<Option<DateTime<Utc>>, EngineError> {
        let data = self.data.lock().await;
        Ok(data
            .votes
            .iter()
            .filter(|v| v.user_id == user_id)
            .map(|v| v.cast_at)
            .max())
    }

    async fn vote_counts(&self) -> Result<HashMap<MenuId, u32>, EngineError> {
        let data = self.data.lock().await;
        Ok(data
            .menus
            .iter()
            .map(|row| (row.menu.id, row.menu.votes))
            .collect())
    }

    async fn reset_stale_counts(&self, now: DateTime<Utc>) -> Result<usize, EngineError> {
        let mut data = self.data.lock().await;
        let mut touched = 0;
        for row in &mut data.menus {
            if (now - row.last_reset_at).num_seconds() >= CYCLE_SECS {
                row.menu.votes = 0;
                row.last_reset_at = now;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[async_trait::async_trait]
impl HistoryPort for MemoryStore {
    async fn commit_decision(
        &self,
        menu_id: MenuId,
        restaurant_id: RestaurantId,
        now: DateTime<Utc>,
    ) -> Result<SelectionRecord, EngineError> {
        let mut data = self.data.lock().await;
        let day = now.date_naive();

        if let Some(existing) = data.selections.iter().find(|s| s.day == day) {
            return Ok(existing.clone());
        }

        let previous_winner = data
            .selections
            .iter()
            .max_by_key(|s| s.day)
            .map(|s| s.restaurant_id);
        let streak = if previous_winner == Some(restaurant_id) {
            data.restaurants
                .iter()
                .find(|r| r.id == restaurant_id)
                .map(|r| r.streak)
                .unwrap_or(0)
                + 1
        } else {
            1
        };
        for r in &mut data.restaurants {
            r.streak = if r.id == restaurant_id { streak } else { 0 };
        }

        data.next_selection_id += 1;
        let record = SelectionRecord {
            id: data.next_selection_id,
            day,
            menu_id,
            restaurant_id,
            decided_at: now,
        };
        data.selections.push(record.clone());
        Ok(record)
    }

    async fn decision_for(&self, day: NaiveDate) -> Result<Option<SelectionRecord>, EngineError> {
        let data = self.data.lock().await;
        Ok(data.selections.iter().find(|s| s.day == day).cloned())
    }

    async fn recent_decisions(&self, n: usize) -> Result<Vec<SelectionRecord>, EngineError> {
        let data = self.data.lock().await;
        let mut all = data.selections.clone();
        all.sort_by(|a, b| b.day.cmp(&a.day));
        all.truncate(n);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Fixed midday timestamp so hour offsets stay inside one UTC day.
    fn midday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn commit_decision_is_idempotent_per_day() {
        let store = MemoryStore::new();
        let now = midday();
        let r = store.add_restaurant("Osteria").await;
        let menu = store.add_menu(r.id, "Risotto", "", now).await.unwrap();

        let first = store.commit_decision(menu.id, r.id, now).await.unwrap();
        // Same day, different arguments: the existing record wins.
        let replay = store
            .commit_decision(999, 999, now + Duration::hours(2))
            .await
            .unwrap();
        assert_eq!(first, replay);

        assert_eq!(store.recent_decisions(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn streaks_extend_on_repeat_wins_and_reset_on_change() {
        let store = MemoryStore::new();
        let now = midday();
        let a = store.add_restaurant("Alpha").await;
        let b = store.add_restaurant("Bravo").await;
        let menu_a = store.add_menu(a.id, "Pasta", "", now).await.unwrap();
        let menu_b = store.add_menu(b.id, "Ramen", "", now).await.unwrap();

        store
            .commit_decision(menu_a.id, a.id, now - Duration::days(2))
            .await
            .unwrap();
        store
            .commit_decision(menu_a.id, a.id, now - Duration::days(1))
            .await
            .unwrap();
        let alpha = store.find_restaurant(a.id).await.unwrap().unwrap();
        assert_eq!(alpha.streak, 2);

        store.commit_decision(menu_b.id, b.id, now).await.unwrap();
        let alpha = store.find_restaurant(a.id).await.unwrap().unwrap();
        let bravo = store.find_restaurant(b.id).await.unwrap().unwrap();
        assert_eq!(alpha.streak, 0);
        assert_eq!(bravo.streak, 1);
    }

    #[tokio::test]
    async fn recent_decisions_are_newest_first() {
        let store = MemoryStore::new();
        let now = midday();
        let r = store.add_restaurant("Osteria").await;
        let menu = store.add_menu(r.id, "Risotto", "", now).await.unwrap();

        for days_ago in [3i64, 1, 2] {
            store
                .commit_decision(menu.id, r.id, now - Duration::days(days_ago))
                .await
                .unwrap();
        }

        let recent = store.recent_decisions(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].day > recent[1].day);
        assert_eq!(recent[0].day, (now - Duration::days(1)).date_naive());
    }
}
