//! The immutable card catalog. Loaded once at startup from the embedded
//! deck file, then shared read-only across every game.

use std::collections::BTreeMap;

use crate::cards::{CardDef, CardKind};
use crate::ids::CardId;

#[derive(Debug)]
pub struct CardCatalog {
    cards: BTreeMap<CardId, CardDef>,
    projects: Vec<CardId>,
    corporations: Vec<CardId>,
}

impl CardCatalog {
    /// The standard deck compiled into the binary.
    pub fn standard() -> CardCatalog {
        CardCatalog::from_json(include_str!("deck.json"))
            .expect("embedded card deck is valid")
    }

    pub fn from_json(raw: &str) -> Result<CardCatalog, serde_json::Error> {
        let defs: Vec<CardDef> = serde_json::from_str(raw)?;
        let mut cards = BTreeMap::new();
        let mut projects = Vec::new();
        let mut corporations = Vec::new();
        for def in defs {
            match def.kind {
                CardKind::Corporation => corporations.push(def.id.clone()),
                CardKind::Prelude => {}
                _ => projects.push(def.id.clone()),
            }
            cards.insert(def.id.clone(), def);
        }
        Ok(CardCatalog {
            cards,
            projects,
            corporations,
        })
    }

    pub fn get(&self, id: &CardId) -> Option<&CardDef> {
        self.cards.get(id)
    }

    pub fn contains(&self, id: &CardId) -> bool {
        self.cards.contains_key(id)
    }

    /// Ids of every playable project card, in catalog order.
    pub fn projects(&self) -> &[CardId] {
        &self.projects
    }

    pub fn corporations(&self) -> &[CardId] {
        &self.corporations
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Behavior, CardKind, Output, TriggerKind};

    fn is_card_valid(card: &CardDef) -> bool {
        let mut is_valid = true;

        // Active cards carry manual actions or reactive effects; the
        // other kinds never have manual triggers.
        let manual_count = card
            .behaviors
            .iter()
            .filter(|b| b.trigger.kind == TriggerKind::Manual)
            .count();
        if card.kind != CardKind::Active && card.kind != CardKind::Corporation {
            is_valid &= manual_count == 0;
        }

        // Events are immediate-only.
        if card.kind == CardKind::Event {
            is_valid &= card.behaviors.iter().all(Behavior::is_immediate);
        }

        // Storage outputs that target the card itself need a storage spec.
        let stores_on_self = card.behaviors.iter().any(|b| {
            b.outputs.iter().any(|o| {
                matches!(
                    o,
                    Output::CardResource {
                        target: crate::cards::StorageTarget::SelfCard,
                        ..
                    }
                )
            })
        });
        if stores_on_self {
            is_valid &= card.storage.is_some();
        }

        // Choices live on immediate behaviors only.
        for behavior in &card.behaviors {
            if !behavior.choices.is_empty() {
                is_valid &= behavior.trigger.condition.is_none();
            }
        }

        is_valid
    }

    #[test]
    fn standard_deck_parses_and_is_valid() {
        let catalog = CardCatalog::standard();
        assert!(!catalog.is_empty());
        assert!(!catalog.projects().is_empty());
        assert!(catalog.corporations().len() >= 2);

        let invalid: Vec<_> = catalog
            .cards
            .values()
            .filter(|card| !is_card_valid(card))
            .map(|card| card.id.clone())
            .collect();
        assert!(invalid.is_empty(), "{:?}", invalid);
    }

    #[test]
    fn corporations_are_not_in_the_project_deck() {
        let catalog = CardCatalog::standard();
        for corp in catalog.corporations() {
            assert!(!catalog.projects().contains(corp));
        }
    }
}
