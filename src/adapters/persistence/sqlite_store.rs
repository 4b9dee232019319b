//! SQLite-backed store via libsql. Implements the catalog, ledger, and
//! history ports over one database file.
//!
//! Every multi-step mutation (vote append + counter increment, decision
//! commit + streak update) runs inside a single transaction; dropping an
//! uncommitted transaction rolls it back. All state shares one database
//! file: <data_dir>/lunchvote.db

use crate::domain::{
    CYCLE_SECS, EngineError, Menu, MenuId, Restaurant, RestaurantId, SelectionRecord, UserId,
    Vote, VOTE_WINDOW_SECS,
};
use crate::ports::{CatalogPort, HistoryPort, LedgerPort};
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{params, Database};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

const RESTAURANTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS restaurants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    streak INTEGER NOT NULL DEFAULT 0
)"#;

const MENUS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS menus (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    restaurant_id INTEGER NOT NULL REFERENCES restaurants(id),
    name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    created_at INTEGER NOT NULL,
    votes INTEGER NOT NULL DEFAULT 0,
    last_reset_at INTEGER NOT NULL
)"#;

const VOTES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS votes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    menu_id INTEGER NOT NULL REFERENCES menus(id),
    cast_at INTEGER NOT NULL
)"#;
const VOTES_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_votes_user_cast ON votes (user_id, cast_at DESC)";

/// One decision per calendar day. The UNIQUE day key is what turns two
/// concurrent first-reads into one winning commit.
const SELECTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS selections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    day TEXT NOT NULL UNIQUE,
    menu_id INTEGER NOT NULL REFERENCES menus(id),
    restaurant_id INTEGER NOT NULL REFERENCES restaurants(id),
    decided_at INTEGER NOT NULL
)"#;

/// Catalog seed document (JSON file): restaurants with their menus.
/// Applied idempotently at startup; rows are keyed by unique name.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    pub restaurants: Vec<RestaurantSeed>,
}

#[derive(Debug, Deserialize)]
pub struct RestaurantSeed {
    pub name: String,
    #[serde(default)]
    pub menus: Vec<MenuSeed>,
}

#[derive(Debug, Deserialize)]
pub struct MenuSeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// SQLite store. One database file (lunchvote.db) in the given base
/// directory; safe to share via Arc.
pub struct SqliteStore {
    db: Database,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Connect to (or create) the SQLite database and ensure the schema
    /// exists. WAL mode enables concurrent readers + one writer;
    /// synchronous=NORMAL is safe with WAL and faster than FULL.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, EngineError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| EngineError::Repo(e.to_string()))?;
        let db_path = base.join("lunchvote.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let conn = db.connect().map_err(|e| EngineError::Repo(e.to_string()))?;

        // PRAGMA returns a row (new value); use query and consume rows
        // (execute fails when rows are returned).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| EngineError::Repo(format!("WAL pragma failed: {}", e)))?;
        while wal_rows
            .next()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?
            .is_some()
        {}
        let mut sync_rows = conn
            .query("PRAGMA synchronous=NORMAL", ())
            .await
            .map_err(|e| EngineError::Repo(format!("synchronous pragma failed: {}", e)))?;
        while sync_rows
            .next()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?
            .is_some()
        {}

        for ddl in [
            RESTAURANTS_TABLE,
            MENUS_TABLE,
            VOTES_TABLE,
            VOTES_INDEX,
            SELECTIONS_TABLE,
        ] {
            conn.execute(ddl, ())
                .await
                .map_err(|e| EngineError::Repo(e.to_string()))?;
        }

        info!(path = %db_path.display(), "SQLite connected with WAL mode");

        Ok(Self {
            db,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Apply a catalog seed. Existing rows (matched by unique name) are
    /// left untouched, so re-running at every startup is safe.
    pub async fn apply_seed(
        &self,
        seed: &CatalogSeed,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        for restaurant in &seed.restaurants {
            conn.execute(
                "INSERT INTO restaurants (name) VALUES (?1) ON CONFLICT (name) DO NOTHING",
                params![restaurant.name.as_str()],
            )
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;

            let restaurant_id: i64 = {
                let mut rows = conn
                    .query(
                        "SELECT id FROM restaurants WHERE name = ?1",
                        params![restaurant.name.as_str()],
                    )
                    .await
                    .map_err(|e| EngineError::Repo(e.to_string()))?;
                match rows
                    .next()
                    .await
                    .map_err(|e| EngineError::Repo(e.to_string()))?
                {
                    Some(row) => row.get(0).map_err(|e| EngineError::Repo(e.to_string()))?,
                    None => {
                        return Err(EngineError::Repo(format!(
                            "seeded restaurant '{}' not found",
                            restaurant.name
                        )));
                    }
                }
            };

            for menu in &restaurant.menus {
                conn.execute(
                    r#"
                    INSERT INTO menus (restaurant_id, name, description, created_at, votes, last_reset_at)
                    VALUES (?1, ?2, ?3, ?4, 0, ?4)
                    ON CONFLICT (name) DO NOTHING
                    "#,
                    params![
                        restaurant_id,
                        menu.name.as_str(),
                        menu.description.as_str(),
                        now.timestamp()
                    ],
                )
                .await
                .map_err(|e| EngineError::Repo(e.to_string()))?;
            }
        }
        info!(
            restaurants = seed.restaurants.len(),
            "catalog seed applied"
        );
        Ok(())
    }
}

fn ts(secs: i64) -> Result<DateTime<Utc>, EngineError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| EngineError::Repo(format!("bad timestamp {secs}")))
}

fn row_to_restaurant(row: &libsql::Row) -> Result<Restaurant, EngineError> {
    let streak: i64 = row.get(2).map_err(|e| EngineError::Repo(e.to_string()))?;
    Ok(Restaurant {
        id: row.get(0).map_err(|e| EngineError::Repo(e.to_string()))?,
        name: row.get(1).map_err(|e| EngineError::Repo(e.to_string()))?,
        streak: streak as u32,
    })
}

fn row_to_menu(row: &libsql::Row) -> Result<Menu, EngineError> {
    let created_at: i64 = row.get(4).map_err(|e| EngineError::Repo(e.to_string()))?;
    let votes: i64 = row.get(5).map_err(|e| EngineError::Repo(e.to_string()))?;
    Ok(Menu {
        id: row.get(0).map_err(|e| EngineError::Repo(e.to_string()))?,
        restaurant_id: row.get(1).map_err(|e| EngineError::Repo(e.to_string()))?,
        name: row.get(2).map_err(|e| EngineError::Repo(e.to_string()))?,
        description: row.get::<String>(3).unwrap_or_default(),
        created_at: ts(created_at)?,
        votes: votes as u32,
    })
}

fn row_to_selection(row: &libsql::Row) -> Result<SelectionRecord, EngineError> {
    let day: String = row.get(1).map_err(|e| EngineError::Repo(e.to_string()))?;
    let decided_at: i64 = row.get(4).map_err(|e| EngineError::Repo(e.to_string()))?;
    Ok(SelectionRecord {
        id: row.get(0).map_err(|e| EngineError::Repo(e.to_string()))?,
        day: NaiveDate::parse_from_str(&day, "%Y-%m-%d")
            .map_err(|e| EngineError::Repo(format!("bad day '{}': {}", day, e)))?,
        menu_id: row.get(2).map_err(|e| EngineError::Repo(e.to_string()))?,
        restaurant_id: row.get(3).map_err(|e| EngineError::Repo(e.to_string()))?,
        decided_at: ts(decided_at)?,
    })
}

const SELECTION_COLUMNS: &str = "id, day, menu_id, restaurant_id, decided_at";

async fn selection_for_day(
    conn: &libsql::Connection,
    day: &str,
) -> Result<Option<SelectionRecord>, EngineError> {
    let mut rows = conn
        .query(
            &format!("SELECT {} FROM selections WHERE day = ?1", SELECTION_COLUMNS),
            params![day],
        )
        .await
        .map_err(|e| EngineError::Repo(e.to_string()))?;
    match rows
        .next()
        .await
        .map_err(|e| EngineError::Repo(e.to_string()))?
    {
        Some(row) => Ok(Some(row_to_selection(&row)?)),
        None => Ok(None),
    }
}

#[async_trait::async_trait]
impl CatalogPort for SqliteStore {
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, EngineError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let mut rows = conn
            .query("SELECT id, name, streak FROM restaurants ORDER BY id", ())
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let mut restaurants = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?
        {
            restaurants.push(row_to_restaurant(&row)?);
        }
        Ok(restaurants)
    }

    async fn list_menus(&self, restaurant_id: RestaurantId) -> Result<Vec<Menu>, EngineError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let mut rows = conn
            .query(
                r#"
                SELECT id, restaurant_id, name, description, created_at, votes
                FROM menus
                WHERE restaurant_id = ?1
                ORDER BY id
                "#,
                params![restaurant_id],
            )
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let mut menus = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?
        {
            menus.push(row_to_menu(&row)?);
        }
        Ok(menus)
    }

    async fn find_menu(&self, menu_id: MenuId) -> Result<Option<Menu>, EngineError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let mut rows = conn
            .query(
                r#"
                SELECT id, restaurant_id, name, description, created_at, votes
                FROM menus
                WHERE id = ?1
                "#,
                params![menu_id],
            )
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        match rows
            .next()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?
        {
            Some(row) => Ok(Some(row_to_menu(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_restaurant(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Option<Restaurant>, EngineError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let mut rows = conn
            .query(
                "SELECT id, name, streak FROM restaurants WHERE id = ?1",
                params![restaurant_id],
            )
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        match rows
            .next()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?
        {
            Some(row) => Ok(Some(row_to_restaurant(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl LedgerPort for SqliteStore {
    async fn append_vote(
        &self,
        user_id: UserId,
        menu_id: MenuId,
        now: DateTime<Utc>,
    ) -> Result<Vote, EngineError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;

        // Eligibility check inside the same transaction as the append:
        // two in-flight votes by one user cannot both pass.
        let last: Option<i64> = {
            let mut rows = tx
                .query(
                    "SELECT MAX(cast_at) FROM votes WHERE user_id = ?1",
                    params![user_id],
                )
                .await
                .map_err(|e| EngineError::Repo(e.to_string()))?;
            match rows
                .next()
                .await
                .map_err(|e| EngineError::Repo(e.to_string()))?
            {
                Some(row) => row.get::<i64>(0).ok(),
                None => None,
            }
        };
        if let Some(last) = last {
            if now.timestamp() - last < VOTE_WINDOW_SECS {
                return Err(EngineError::RateLimited {
                    next_allowed: ts(last + VOTE_WINDOW_SECS)?,
                });
            }
        }

        let affected = tx
            .execute(
                "UPDATE menus SET votes = votes + 1 WHERE id = ?1",
                params![menu_id],
            )
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        if affected == 0 {
            return Err(EngineError::UnknownMenu(menu_id));
        }
        tx.execute(
            "INSERT INTO votes (user_id, menu_id, cast_at) VALUES (?1, ?2, ?3)",
            params![user_id, menu_id, now.timestamp()],
        )
        .await
        .map_err(|e| EngineError::Repo(e.to_string()))?;
        let id = tx.last_insert_rowid();
        tx.commit()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;

        Ok(Vote {
            id,
            user_id,
            menu_id,
            cast_at: now,
        })
    }

    async fn last_vote_at(&self, user_id: UserId) -> Result<Option<DateTime<Utc>>, EngineError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let mut rows = conn
            .query(
                "SELECT MAX(cast_at) FROM votes WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let last: Option<i64> = match rows
            .next()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?
        {
            Some(row) => row.get::<i64>(0).ok(),
            None => None,
        };
        last.map(ts).transpose()
    }

    async fn vote_counts(&self) -> Result<HashMap<MenuId, u32>, EngineError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let mut rows = conn
            .query("SELECT id, votes FROM menus", ())
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let mut counts = HashMap::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?
        {
            let id: i64 = row.get(0).map_err(|e| EngineError::Repo(e.to_string()))?;
            let votes: i64 = row.get(1).map_err(|e| EngineError::Repo(e.to_string()))?;
            counts.insert(id, votes as u32);
        }
        Ok(counts)
    }

    async fn reset_stale_counts(&self, now: DateTime<Utc>) -> Result<usize, EngineError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        // One statement: atomic against concurrent increments, and a no-op
        // for menus reset less than a cycle ago.
        let affected = conn
            .execute(
                "UPDATE menus SET votes = 0, last_reset_at = ?1 WHERE last_reset_at <= ?2",
                params![now.timestamp(), now.timestamp() - CYCLE_SECS],
            )
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        Ok(affected as usize)
    }
}

#[async_trait::async_trait]
impl HistoryPort for SqliteStore {
    async fn commit_decision(
        &self,
        menu_id: MenuId,
        restaurant_id: RestaurantId,
        now: DateTime<Utc>,
    ) -> Result<SelectionRecord, EngineError> {
        let day = now.date_naive().to_string();
        let conn = self
            .db
            .connect()
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;

        if let Some(existing) = selection_for_day(&tx, &day).await? {
            return Ok(existing);
        }

        let affected = tx
            .execute(
                r#"
                INSERT INTO selections (day, menu_id, restaurant_id, decided_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT (day) DO NOTHING
                "#,
                params![day.as_str(), menu_id, restaurant_id, now.timestamp()],
            )
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        if affected == 0 {
            // A concurrent commit won the day; defer to it.
            drop(tx);
            return selection_for_day(&conn, &day).await?.ok_or_else(|| {
                EngineError::Repo(format!("day {} decided concurrently but unreadable", day))
            });
        }
        let id = tx.last_insert_rowid();

        // Streak maintenance rides the same transaction as the record.
        let previous_winner: Option<i64> = {
            let mut rows = tx
                .query(
                    "SELECT restaurant_id FROM selections WHERE day < ?1 ORDER BY day DESC LIMIT 1",
                    params![day.as_str()],
                )
                .await
                .map_err(|e| EngineError::Repo(e.to_string()))?;
            match rows
                .next()
                .await
                .map_err(|e| EngineError::Repo(e.to_string()))?
            {
                Some(row) => row.get::<i64>(0).ok(),
                None => None,
            }
        };
        let streak: i64 = if previous_winner == Some(restaurant_id) {
            let current: i64 = {
                let mut rows = tx
                    .query(
                        "SELECT streak FROM restaurants WHERE id = ?1",
                        params![restaurant_id],
                    )
                    .await
                    .map_err(|e| EngineError::Repo(e.to_string()))?;
                match rows
                    .next()
                    .await
                    .map_err(|e| EngineError::Repo(e.to_string()))?
                {
                    Some(row) => row.get::<i64>(0).unwrap_or(0),
                    None => 0,
                }
            };
            current + 1
        } else {
            1
        };
        tx.execute(
            "UPDATE restaurants SET streak = 0 WHERE id != ?1",
            params![restaurant_id],
        )
        .await
        .map_err(|e| EngineError::Repo(e.to_string()))?;
        tx.execute(
            "UPDATE restaurants SET streak = ?1 WHERE id = ?2",
            params![streak, restaurant_id],
        )
        .await
        .map_err(|e| EngineError::Repo(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;

        Ok(SelectionRecord {
            id,
            day: now.date_naive(),
            menu_id,
            restaurant_id,
            decided_at: now,
        })
    }

    async fn decision_for(&self, day: NaiveDate) -> Result<Option<SelectionRecord>, EngineError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        selection_for_day(&conn, &day.to_string()).await
    }

    async fn recent_decisions(&self, n: usize) -> Result<Vec<SelectionRecord>, EngineError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {} FROM selections ORDER BY day DESC LIMIT ?1",
                    SELECTION_COLUMNS
                ),
                params![n as i64],
            )
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?;
        let mut selections = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| EngineError::Repo(e.to_string()))?
        {
            selections.push(row_to_selection(&row)?);
        }
        Ok(selections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// Fixed midday timestamp so hour offsets stay inside one UTC day.
    fn midday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 12, 0, 0).unwrap()
    }

    fn seed() -> CatalogSeed {
        CatalogSeed {
            restaurants: vec![
                RestaurantSeed {
                    name: "Alpha".into(),
                    menus: vec![MenuSeed {
                        name: "Pasta".into(),
                        description: "Tomato and basil".into(),
                    }],
                },
                RestaurantSeed {
                    name: "Bravo".into(),
                    menus: vec![MenuSeed {
                        name: "Ramen".into(),
                        description: String::new(),
                    }],
                },
            ],
        }
    }

    async fn connected() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::connect(dir.path()).await.unwrap();
        store.apply_seed(&seed(), Utc::now()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn seed_is_idempotent() {
        let (_dir, store) = connected().await;
        store.apply_seed(&seed(), Utc::now()).await.unwrap();

        let restaurants = store.list_restaurants().await.unwrap();
        assert_eq!(restaurants.len(), 2);
        let menus = store.list_menus(restaurants[0].id).await.unwrap();
        assert_eq!(menus.len(), 1);
    }

    #[tokio::test]
    async fn vote_append_and_window_survive_in_storage() {
        let (_dir, store) = connected().await;
        let now = Utc::now();
        let restaurants = store.list_restaurants().await.unwrap();
        let menu = store.list_menus(restaurants[0].id).await.unwrap()[0].clone();

        store.append_vote(1, menu.id, now).await.unwrap();
        let err = store
            .append_vote(1, menu.id, now + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::RateLimited { .. }));

        let counts = store.vote_counts().await.unwrap();
        assert_eq!(counts.get(&menu.id), Some(&1));

        let err = store.append_vote(2, 9999, now).await.unwrap_err();
        assert!(matches!(err, EngineError::UnknownMenu(9999)));
        // The rejected vote left no ledger entry behind.
        assert!(store.last_vote_at(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn decision_commit_is_idempotent_and_updates_streaks() {
        let (_dir, store) = connected().await;
        let now = midday();
        let restaurants = store.list_restaurants().await.unwrap();
        let alpha = restaurants[0].clone();
        let menu = store.list_menus(alpha.id).await.unwrap()[0].clone();

        let first = store.commit_decision(menu.id, alpha.id, now).await.unwrap();
        let replay = store
            .commit_decision(menu.id, alpha.id, now + Duration::hours(2))
            .await
            .unwrap();
        assert_eq!(first, replay);
        assert_eq!(store.recent_decisions(10).await.unwrap().len(), 1);

        let alpha = store.find_restaurant(alpha.id).await.unwrap().unwrap();
        assert_eq!(alpha.streak, 1);
    }

    #[tokio::test]
    async fn stale_counters_reset_without_touching_history() {
        let (_dir, store) = connected().await;
        let t0 = Utc::now() - Duration::hours(25);
        let restaurants = store.list_restaurants().await.unwrap();
        let menu = store.list_menus(restaurants[0].id).await.unwrap()[0].clone();

        store.append_vote(1, menu.id, t0).await.unwrap();

        // The menu was seeded "now", so nothing is stale yet.
        assert_eq!(store.reset_stale_counts(Utc::now()).await.unwrap(), 0);
        // A day later the whole catalog is.
        let touched = store
            .reset_stale_counts(Utc::now() + Duration::hours(25))
            .await
            .unwrap();
        assert_eq!(touched, 2);

        let counts = store.vote_counts().await.unwrap();
        assert_eq!(counts.get(&menu.id), Some(&0));
        assert!(store.last_vote_at(1).await.unwrap().is_some());
    }
}
