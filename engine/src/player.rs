//! Per-player state: ledgers, hand, played card instances, passive
//! effects, manual actions, and the single pending-selection slot.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use protocol::hex::HexCoordinate;

use crate::board::TileKind;
use crate::cards::catalog::CardCatalog;
use crate::cards::{CardKind, Tag};
use crate::ids::{CardId, PlayerId};
use crate::resources::{ProductionLedger, ResourceLedger};

/// Terraform rating granted when a corporation is selected.
pub const STARTING_TERRAFORM_RATING: u32 = 20;

/// A card in play, with the mutable per-play state the static definition
/// cannot hold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    pub card: CardId,
    /// On-card resource count (microbes, animals, ...).
    pub stored: u32,
    /// Play count per behavior index, reset each generation.
    pub plays: Vec<u32>,
}

impl CardInstance {
    pub fn new(card: CardId, behavior_count: usize, starting_storage: u32) -> CardInstance {
        CardInstance {
            card,
            stored: starting_storage,
            plays: vec![0; behavior_count],
        }
    }
}

/// Reference to one behavior of one played card, used for both passive
/// effects and registered manual actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorRef {
    pub card: CardId,
    pub behavior: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTileSelection {
    pub tile: TileKind,
    pub available: Vec<HexCoordinate>,
    /// Card id or action tag that caused the placement.
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCardDraw {
    pub cards: Vec<CardId>,
    pub free_take: u32,
    pub buy_limit: u32,
    pub price: u32,
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingSelection {
    pub corporations: Vec<CardId>,
    pub projects: Vec<CardId>,
}

/// At most one selection is open per player at any time; tiles beyond the
/// first wait in the tile queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingSelection {
    Tile(PendingTileSelection),
    CardDraw(PendingCardDraw),
    Starting(StartingSelection),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub connected: bool,
    pub corporation: Option<CardId>,
    pub terraform_rating: u32,
    pub victory_points: i32,
    pub resources: ResourceLedger,
    pub production: ProductionLedger,
    pub hand: Vec<CardId>,
    pub played: Vec<CardInstance>,
    pub effects: Vec<BehaviorRef>,
    pub actions: Vec<BehaviorRef>,
    pub pending: Option<PendingSelection>,
    /// FIFO of tile placements waiting behind the open selection.
    /// Entries keep the source token they were created with.
    pub tile_queue: VecDeque<(TileKind, String)>,
}

impl Player {
    pub fn new(id: PlayerId, name: String) -> Player {
        Player {
            id,
            name,
            connected: true,
            corporation: None,
            terraform_rating: 0,
            victory_points: 0,
            resources: ResourceLedger::default(),
            production: ProductionLedger::default(),
            hand: Vec::new(),
            played: Vec::new(),
            effects: Vec::new(),
            actions: Vec::new(),
            pending: None,
            tile_queue: VecDeque::new(),
        }
    }

    pub fn has_in_hand(&self, card: &CardId) -> bool {
        self.hand.contains(card)
    }

    pub fn instance(&self, card: &CardId) -> Option<&CardInstance> {
        self.played.iter().find(|i| &i.card == card)
    }

    pub fn instance_mut(&mut self, card: &CardId) -> Option<&mut CardInstance> {
        self.played.iter_mut().find(|i| &i.card == card)
    }

    /// Tags across played non-event cards; wild counts toward every tag.
    pub fn tag_count(&self, catalog: &CardCatalog, tag: Tag) -> u32 {
        self.played
            .iter()
            .filter_map(|instance| catalog.get(&instance.card))
            .filter(|def| def.kind != CardKind::Event)
            .flat_map(|def| def.tags.iter())
            .filter(|&&t| t == tag || (t == Tag::Wild && tag != Tag::Event))
            .count() as u32
    }

    /// Resets manual-action play counters at generation end.
    pub fn reset_action_plays(&mut self) {
        for instance in &mut self.played {
            for plays in &mut instance.plays {
                *plays = 0;
            }
        }
    }

    pub fn pending_tile(&self) -> Option<&PendingTileSelection> {
        match &self.pending {
            Some(PendingSelection::Tile(selection)) => Some(selection),
            _ => None,
        }
    }

    pub fn pending_card_draw(&self) -> Option<&PendingCardDraw> {
        match &self.pending {
            Some(PendingSelection::CardDraw(selection)) => Some(selection),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::catalog::CardCatalog;

    #[test]
    fn tag_counts_skip_event_cards() {
        let catalog = CardCatalog::standard();
        let mut player = Player::new(PlayerId::from("p1"), "Tester".into());
        // Asteroid is an event with a space tag; asteroid-mining is not.
        player
            .played
            .push(CardInstance::new(CardId::from("asteroid"), 1, 0));
        player
            .played
            .push(CardInstance::new(CardId::from("asteroid-mining"), 1, 0));
        assert_eq!(1, player.tag_count(&catalog, Tag::Space));
        assert_eq!(1, player.tag_count(&catalog, Tag::Jovian));
    }

    #[test]
    fn reset_clears_every_behavior_counter() {
        let mut player = Player::new(PlayerId::from("p1"), "Tester".into());
        let mut instance = CardInstance::new(CardId::from("birds"), 2, 0);
        instance.plays[1] = 1;
        player.played.push(instance);
        player.reset_action_plays();
        assert!(player.played[0].plays.iter().all(|&p| p == 0));
    }
}
