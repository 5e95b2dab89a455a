//! The per-game aggregate: metadata, phase machine state, turn cursor,
//! board, global parameters, decks, and the player records. One value of
//! [`GameState`] is owned by exactly one lock in the server.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::prelude::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::cards::catalog::CardCatalog;
use crate::error::ActionError;
use crate::ids::{CardId, PlayerId};
use crate::params::GlobalParameters;
use crate::player::Player;

pub const MIN_PLAYERS: usize = 2;

pub const MILESTONES: [&str; 5] = ["terraformer", "mayor", "gardener", "builder", "planner"];
pub const AWARDS: [&str; 5] = ["landlord", "banker", "scientist", "thermalist", "miner"];
pub const MILESTONE_COST: u32 = 8;
pub const MILESTONE_VP: i32 = 5;
/// Funding price by how many awards are already funded.
pub const AWARD_COSTS: [u32; 3] = [8, 11, 14];
pub const MAX_CLAIMED_MILESTONES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    Lobby,
    Active,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Setup,
    StartingCardSelection,
    Action,
    Production,
    Complete,
}

impl GameStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GameStatus::Lobby => "lobby",
            GameStatus::Active => "active",
            GameStatus::Completed => "completed",
        }
    }
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::StartingCardSelection => "starting-card-selection",
            Phase::Action => "action",
            Phase::Production => "production",
            Phase::Complete => "complete",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundedAward {
    pub name: String,
    pub funder: PlayerId,
}

#[derive(Debug)]
pub struct GameState {
    pub id: String,
    pub status: GameStatus,
    pub phase: Phase,
    pub generation: u32,
    pub max_players: u32,
    pub host: Option<PlayerId>,
    /// Seat order; the first entry holds the first-player token.
    pub turn_order: Vec<PlayerId>,
    pub current_turn: Option<PlayerId>,
    /// Players that passed this generation.
    pub passed: BTreeSet<PlayerId>,
    pub params: GlobalParameters,
    pub board: Board,
    pub players: BTreeMap<PlayerId, Player>,
    pub deck: Vec<CardId>,
    pub discard: Vec<CardId>,
    pub corporation_deck: Vec<CardId>,
    pub milestones: BTreeMap<String, PlayerId>,
    pub awards: Vec<FundedAward>,
    pub catalog: Arc<CardCatalog>,
    pub created_at: u64,
    pub updated_at: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl GameState {
    pub fn new(id: String, max_players: u32, catalog: Arc<CardCatalog>) -> GameState {
        let mut rng = thread_rng();
        let mut deck: Vec<CardId> = catalog.projects().to_vec();
        deck.shuffle(&mut rng);
        let mut corporation_deck: Vec<CardId> = catalog.corporations().to_vec();
        corporation_deck.shuffle(&mut rng);

        let now = unix_now();
        GameState {
            id,
            status: GameStatus::Lobby,
            phase: Phase::Setup,
            generation: 1,
            max_players,
            host: None,
            turn_order: Vec::new(),
            current_turn: None,
            passed: BTreeSet::new(),
            params: GlobalParameters::default(),
            board: Board::standard(),
            players: BTreeMap::new(),
            deck,
            discard: Vec::new(),
            corporation_deck,
            milestones: BTreeMap::new(),
            awards: Vec::new(),
            catalog,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = unix_now();
    }

    /// Adds a fresh player in the lobby. The first join becomes host.
    pub fn join(&mut self, name: String) -> Result<PlayerId, ActionError> {
        if self.status != GameStatus::Lobby {
            return Err(ActionError::NotJoinable);
        }
        if self.players.len() >= self.max_players as usize {
            return Err(ActionError::GameFull);
        }
        let id = PlayerId::random();
        let player = Player::new(id.clone(), name);
        self.players.insert(id.clone(), player);
        self.turn_order.push(id.clone());
        if self.host.is_none() {
            self.host = Some(id.clone());
        }
        self.touch();
        Ok(id)
    }

    pub fn player(&self, id: &PlayerId) -> Result<&Player, ActionError> {
        self.players
            .get(id)
            .ok_or_else(|| ActionError::PlayerNotFound(id.to_string()))
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Result<&mut Player, ActionError> {
        self.players
            .get_mut(id)
            .ok_or_else(|| ActionError::PlayerNotFound(id.to_string()))
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.values().find(|p| p.name == name)
    }

    /// Draws up to `count` cards, reshuffling the discard pile into the
    /// deck when it runs dry. May return fewer when both are empty.
    pub fn draw_cards(&mut self, count: usize) -> Vec<CardId> {
        let mut drawn = Vec::with_capacity(count);
        for _ in 0..count {
            if self.deck.is_empty() {
                if self.discard.is_empty() {
                    break;
                }
                let mut rng = thread_rng();
                self.discard.shuffle(&mut rng);
                self.deck.append(&mut self.discard);
            }
            if let Some(card) = self.deck.pop() {
                drawn.push(card);
            }
        }
        drawn
    }

    /// Deals corporation candidates for the starting selection.
    pub fn draw_corporations(&mut self, count: usize) -> Vec<CardId> {
        let take = count.min(self.corporation_deck.len());
        self.corporation_deck.split_off(self.corporation_deck.len() - take)
    }

    /// The next player in seat order that has not passed this generation.
    pub fn next_unpassed_after(&self, current: &PlayerId) -> Option<PlayerId> {
        let len = self.turn_order.len();
        let start = self.turn_order.iter().position(|p| p == current)?;
        (1..=len)
            .map(|offset| &self.turn_order[(start + offset) % len])
            .find(|candidate| !self.passed.contains(*candidate))
            .cloned()
    }

    pub fn all_passed(&self) -> bool {
        !self.turn_order.is_empty() && self.passed.len() == self.turn_order.len()
    }

    pub fn require_phase(&self, phase: Phase) -> Result<(), ActionError> {
        if self.phase != phase {
            return Err(ActionError::WrongPhase(self.phase));
        }
        Ok(())
    }

    pub fn require_turn(&self, player: &PlayerId) -> Result<(), ActionError> {
        if self.current_turn.as_ref() != Some(player) {
            return Err(ActionError::NotYourTurn);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_game() -> GameState {
        GameState::new("g1".into(), 3, Arc::new(CardCatalog::standard()))
    }

    #[test]
    fn first_join_becomes_host() {
        let mut game = fresh_game();
        let alice = game.join("Alice".into()).unwrap();
        let bob = game.join("Bob".into()).unwrap();
        assert_eq!(Some(alice.clone()), game.host);
        assert_eq!(vec![alice, bob], game.turn_order);
    }

    #[test]
    fn join_rejected_when_full_or_started() {
        let mut game = fresh_game();
        game.join("A".into()).unwrap();
        game.join("B".into()).unwrap();
        game.join("C".into()).unwrap();
        assert_eq!(Err(ActionError::GameFull), game.join("D".into()));

        game.status = GameStatus::Active;
        assert_eq!(Err(ActionError::NotJoinable), game.join("E".into()));
    }

    #[test]
    fn draw_reshuffles_discard_when_deck_runs_out() {
        let mut game = fresh_game();
        let total = game.deck.len();
        let drawn = game.draw_cards(total);
        assert_eq!(total, drawn.len());
        game.discard.extend(drawn);
        let redrawn = game.draw_cards(2);
        assert_eq!(2, redrawn.len());
    }

    #[test]
    fn next_unpassed_wraps_and_skips_passed_players() {
        let mut game = fresh_game();
        let a = game.join("A".into()).unwrap();
        let b = game.join("B".into()).unwrap();
        let c = game.join("C".into()).unwrap();
        game.passed.insert(b.clone());
        assert_eq!(Some(c.clone()), game.next_unpassed_after(&a));
        assert_eq!(Some(a.clone()), game.next_unpassed_after(&c));
        game.passed.insert(a.clone());
        game.passed.insert(c.clone());
        assert!(game.all_passed());
        assert_eq!(None, game.next_unpassed_after(&c));
    }
}
