//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Menu loop: today's menu, vote, tally, history, manual cycle reset.

use crate::domain::{EngineError, MenuId};
use crate::ports::{CatalogPort, EnginePort, HistoryPort, InputPort, SessionPort};
use async_trait::async_trait;
use inquire::Select;
use std::sync::Arc;

const ACTION_TODAY: &str = "Today's menu";
const ACTION_VOTE: &str = "Vote";
const ACTION_TALLY: &str = "Tally";
const ACTION_HISTORY: &str = "History";
const ACTION_RESET: &str = "Reset cycle";
const ACTION_QUIT: &str = "Quit";

/// TUI adapter. Inquire prompts over the engine.
pub struct TuiInputPort {
    engine: Arc<dyn EnginePort>,
    catalog: Arc<dyn CatalogPort>,
    history: Arc<dyn HistoryPort>,
    session: Arc<dyn SessionPort>,
}

impl TuiInputPort {
    pub fn new(
        engine: Arc<dyn EnginePort>,
        catalog: Arc<dyn CatalogPort>,
        history: Arc<dyn HistoryPort>,
        session: Arc<dyn SessionPort>,
    ) -> Self {
        Self {
            engine,
            catalog,
            history,
            session,
        }
    }

    async fn show_today(&self) -> Result<(), EngineError> {
        match self.engine.todays_menu().await {
            Ok(view) => {
                println!(
                    "{}: {} — {} (decided {})",
                    view.day, view.menu_name, view.restaurant_name, view.decided_at
                );
                if !view.description.is_empty() {
                    println!("  {}", view.description);
                }
            }
            Err(EngineError::NoMenus) => {
                println!("The catalog has no menus yet; add restaurants and menus first.");
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn cast_vote(&self) -> Result<(), EngineError> {
        let user_id = self.session.current_user_id().await?;

        let mut labels: Vec<String> = Vec::new();
        let mut ids: Vec<MenuId> = Vec::new();
        for restaurant in self.catalog.list_restaurants().await? {
            for menu in self.catalog.list_menus(restaurant.id).await? {
                labels.push(format!("{} — {} ({})", menu.name, restaurant.name, menu.id));
                ids.push(menu.id);
            }
        }
        if labels.is_empty() {
            println!("The catalog has no menus yet; add restaurants and menus first.");
            return Ok(());
        }

        let selected = Select::new("Pick a menu", labels.clone())
            .prompt()
            .map_err(|e| EngineError::Auth(e.to_string()))?;
        // Map selected display string back to the menu id (match full option string)
        let Some(idx) = labels.iter().position(|l| *l == selected) else {
            return Ok(());
        };

        match self.engine.cast_vote(user_id, ids[idx]).await {
            Ok(vote) => println!("Vote recorded at {}.", vote.cast_at),
            Err(EngineError::RateLimited { next_allowed }) => {
                println!("You already voted; next vote opens at {}.", next_allowed);
            }
            Err(EngineError::UnknownMenu(id)) => {
                println!("Menu {} is no longer in the catalog.", id);
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn show_tally(&self) -> Result<(), EngineError> {
        let counts = self.engine.tally().await?;
        let mut lines: Vec<(u32, String)> = Vec::new();
        for restaurant in self.catalog.list_restaurants().await? {
            for menu in self.catalog.list_menus(restaurant.id).await? {
                let count = counts.get(&menu.id).copied().unwrap_or(0);
                lines.push((count, format!("{:>4}  {} — {}", count, menu.name, restaurant.name)));
            }
        }
        if lines.is_empty() {
            println!("The catalog has no menus yet.");
            return Ok(());
        }
        lines.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, line) in lines {
            println!("{}", line);
        }
        Ok(())
    }

    async fn show_history(&self) -> Result<(), EngineError> {
        let records = self.history.recent_decisions(7).await?;
        if records.is_empty() {
            println!("No decisions yet.");
            return Ok(());
        }
        for record in records {
            let menu_name = self
                .catalog
                .find_menu(record.menu_id)
                .await?
                .map(|m| m.name)
                .unwrap_or_else(|| format!("menu {}", record.menu_id));
            let restaurant_name = self
                .catalog
                .find_restaurant(record.restaurant_id)
                .await?
                .map(|r| r.name)
                .unwrap_or_else(|| format!("restaurant {}", record.restaurant_id));
            println!("{}  {} — {}", record.day, menu_name, restaurant_name);
        }
        Ok(())
    }

    async fn reset_cycle(&self) -> Result<(), EngineError> {
        let reset = self.engine.reset_cycle().await?;
        println!("Cycle reset: {} menu counter(s) zeroed.", reset);
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), EngineError> {
        loop {
            let action = Select::new(
                "lunchvote",
                vec![
                    ACTION_TODAY,
                    ACTION_VOTE,
                    ACTION_TALLY,
                    ACTION_HISTORY,
                    ACTION_RESET,
                    ACTION_QUIT,
                ],
            )
            .prompt();
            // Esc / Ctrl-C leaves the loop.
            let Ok(action) = action else {
                return Ok(());
            };

            match action {
                ACTION_TODAY => self.show_today().await?,
                ACTION_VOTE => self.cast_vote().await?,
                ACTION_TALLY => self.show_tally().await?,
                ACTION_HISTORY => self.show_history().await?,
                ACTION_RESET => self.reset_cycle().await?,
                _ => return Ok(()),
            }
        }
    }
}
