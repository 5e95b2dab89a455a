//! Process-wide application state: the session hub, the per-game store,
//! the shared card catalog, and the listener wiring. Games are keyed by
//! id; each one sits behind its own lock, so actions on different games
//! never contend.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::RwLock;

use engine::{CardCatalog, EventBus, GameState, new_game_id};

use crate::config::ServerConfig;
use crate::hub::SessionHub;

pub struct AppState {
    pub config: ServerConfig,
    pub hub: SessionHub,
    pub catalog: Arc<CardCatalog>,
    pub bus: EventBus,
    games: RwLock<HashMap<String, Arc<RwLock<GameState>>>>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> AppState {
        AppState {
            config,
            hub: SessionHub::new(),
            catalog: Arc::new(CardCatalog::standard()),
            bus: EventBus::standard(),
            games: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create_game(&self, max_players: u32) -> (String, Arc<RwLock<GameState>>) {
        let id = new_game_id();
        let game = Arc::new(RwLock::new(GameState::new(
            id.clone(),
            max_players,
            self.catalog.clone(),
        )));
        self.games
            .write()
            .await
            .insert(id.clone(), game.clone());
        tracing::info!(game = %id, max_players, "game created");
        (id, game)
    }

    pub async fn game(&self, id: &str) -> Option<Arc<RwLock<GameState>>> {
        self.games.read().await.get(id).cloned()
    }

    pub async fn game_count(&self) -> usize {
        self.games.read().await.len()
    }

    /// Sweeps games nobody has touched within the configured TTL.
    pub async fn cleanup_stale_games(&self) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let ttl = self.config.game_ttl_secs;

        let mut stale = Vec::new();
        {
            let games = self.games.read().await;
            for (id, game) in games.iter() {
                let game = game.read().await;
                let idle = now.saturating_sub(game.updated_at);
                if idle > ttl {
                    stale.push(id.clone());
                }
            }
        }
        if stale.is_empty() {
            return;
        }
        let mut games = self.games.write().await;
        for id in stale {
            tracing::info!(game = %id, "removing stale game");
            games.remove(&id);
        }
    }
}
