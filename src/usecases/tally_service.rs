//! Current-cycle tally: catalog menus joined with ledger counters.
//!
//! Ranking is total over the catalog (zero-vote menus included) and fully
//! deterministic: count descending, ties broken by lowest menu id.

use crate::domain::{EngineError, Menu, MenuId};
use crate::ports::{CatalogPort, LedgerPort};
use std::collections::HashMap;
use std::sync::Arc;

/// Tally service. Snapshot reads only; never mutates.
pub struct TallyService {
    catalog: Arc<dyn CatalogPort>,
    ledger: Arc<dyn LedgerPort>,
}

impl TallyService {
    pub fn new(catalog: Arc<dyn CatalogPort>, ledger: Arc<dyn LedgerPort>) -> Self {
        Self { catalog, ledger }
    }

    /// Per-menu counts for every catalog menu. Empty catalog yields an
    /// empty map; only `highest_voted`/`ranked` treat that as an error.
    pub async fn current_counts(&self) -> Result<HashMap<MenuId, u32>, EngineError> {
        let counts = self.ledger.vote_counts().await?;
        let mut out = HashMap::new();
        for menu in self.all_menus().await? {
            out.insert(menu.id, counts.get(&menu.id).copied().unwrap_or(0));
        }
        Ok(out)
    }

    /// Every catalog menu with its count, best first. Fails with `NoMenus`
    /// when the catalog is empty.
    pub async fn ranked(&self) -> Result<Vec<(Menu, u32)>, EngineError> {
        let counts = self.ledger.vote_counts().await?;
        let mut ranked: Vec<(Menu, u32)> = self
            .all_menus()
            .await?
            .into_iter()
            .map(|m| {
                let count = counts.get(&m.id).copied().unwrap_or(0);
                (m, count)
            })
            .collect();
        if ranked.is_empty() {
            return Err(EngineError::NoMenus);
        }
        ranked.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then(a.id.cmp(&b.id)));
        Ok(ranked)
    }

    /// The winning candidate under the deterministic tie-break.
    pub async fn highest_voted(&self) -> Result<(Menu, u32), EngineError> {
        let mut ranked = self.ranked().await?;
        Ok(ranked.swap_remove(0))
    }

    async fn all_menus(&self) -> Result<Vec<Menu>, EngineError> {
        let mut menus = Vec::new();
        for restaurant in self.catalog.list_restaurants().await? {
            menus.extend(self.catalog.list_menus(restaurant.id).await?);
        }
        Ok(menus)
    }
}
