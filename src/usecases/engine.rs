//! Engine context: explicit references to the catalog, ledger, and history
//! plus the services over them.
//!
//! Every operation flows through this context — no ambient singletons. Wall
//! clock time is injected here so the services underneath stay testable with
//! fixed timestamps.

use crate::domain::{EngineError, MenuId, MenuView, UserId, Vote};
use crate::ports::{CatalogPort, EnginePort, HistoryPort, LedgerPort};
use crate::usecases::resolver_service::ResolverService;
use crate::usecases::tally_service::TallyService;
use crate::usecases::vote_service::VoteService;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

pub struct Engine {
    vote: VoteService,
    tally: Arc<TallyService>,
    resolver: ResolverService,
    ledger: Arc<dyn LedgerPort>,
}

impl Engine {
    pub fn new(
        catalog: Arc<dyn CatalogPort>,
        ledger: Arc<dyn LedgerPort>,
        history: Arc<dyn HistoryPort>,
    ) -> Self {
        let tally = Arc::new(TallyService::new(Arc::clone(&catalog), Arc::clone(&ledger)));
        Self {
            vote: VoteService::new(Arc::clone(&catalog), Arc::clone(&ledger)),
            resolver: ResolverService::new(catalog, Arc::clone(&tally), history),
            tally,
            ledger,
        }
    }
}

#[async_trait::async_trait]
impl EnginePort for Engine {
    async fn cast_vote(&self, user_id: UserId, menu_id: MenuId) -> Result<Vote, EngineError> {
        self.vote.cast_vote(user_id, menu_id, Utc::now()).await
    }

    async fn todays_menu(&self) -> Result<MenuView, EngineError> {
        self.resolver.todays_menu(Utc::now()).await
    }

    async fn tally(&self) -> Result<HashMap<MenuId, u32>, EngineError> {
        self.tally.current_counts().await
    }

    async fn reset_cycle(&self) -> Result<usize, EngineError> {
        self.ledger.reset_stale_counts(Utc::now()).await
    }
}
