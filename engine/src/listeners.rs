//! Reactive subscribers on the event bus. Each one translates events
//! into further store mutations through the same APIs the orchestrators
//! use; none of them blocks.

use crate::cards::TriggerCondition;
use crate::effects;
use crate::error::ActionError;
use crate::events::{EventQueue, GameEvent, Listener};
use crate::game::{GameState, Phase};
use crate::ids::{CardId, PlayerId};
use crate::player::{PendingSelection, StartingSelection};

/// Corporation candidates dealt per player at game start.
const STARTING_CORPORATIONS: usize = 2;
/// Project candidates dealt per player at game start.
const STARTING_PROJECTS: usize = 10;

/// Deals the starting pools once the host starts the game.
pub struct StartingCards;

impl Listener for StartingCards {
    fn name(&self) -> &'static str {
        "starting-cards"
    }

    fn handle(
        &self,
        state: &mut GameState,
        event: &GameEvent,
        _queue: &mut EventQueue,
    ) -> Result<(), ActionError> {
        if *event != GameEvent::GameStarted {
            return Ok(());
        }
        let order = state.turn_order.clone();
        for player_id in order {
            let corporations = state.draw_corporations(STARTING_CORPORATIONS);
            let projects = state.draw_cards(STARTING_PROJECTS);
            let player = state.player_mut(&player_id)?;
            player.pending = Some(PendingSelection::Starting(StartingSelection {
                corporations,
                projects,
            }));
        }
        tracing::debug!(game = %state.id, "starting pools dealt");
        Ok(())
    }
}

/// Walks every player's passive effects and applies the ones whose
/// trigger condition matches the event.
pub struct CardEffects;

fn condition_matches(
    condition: &TriggerCondition,
    owner: &PlayerId,
    event: &GameEvent,
) -> bool {
    match (condition, event) {
        (
            TriggerCondition::TilePlaced { tile, own_only },
            GameEvent::TilePlaced {
                player, tile: placed, ..
            },
        ) => placed == tile && (!own_only || player == owner),
        (
            TriggerCondition::TagPlayed { tag, own_only },
            GameEvent::TagsPlayed { player, tags },
        ) => tags.contains(tag) && (!own_only || player == owner),
        (TriggerCondition::TemperatureRaised, GameEvent::TemperatureChanged { .. }) => true,
        (TriggerCondition::OxygenRaised, GameEvent::OxygenChanged { .. }) => true,
        _ => false,
    }
}

impl Listener for CardEffects {
    fn name(&self) -> &'static str {
        "card-effects"
    }

    fn handle(
        &self,
        state: &mut GameState,
        event: &GameEvent,
        queue: &mut EventQueue,
    ) -> Result<(), ActionError> {
        match event {
            GameEvent::TilePlaced { .. }
            | GameEvent::TagsPlayed { .. }
            | GameEvent::TemperatureChanged { .. }
            | GameEvent::OxygenChanged { .. }
            | GameEvent::OceansChanged { .. }
            | GameEvent::CardPlayed { .. } => {}
            _ => return Ok(()),
        }

        let catalog = state.catalog.clone();
        let mut matched: Vec<(PlayerId, CardId, usize)> = Vec::new();
        for (player_id, player) in &state.players {
            for effect in &player.effects {
                let Some(behavior) = catalog
                    .get(&effect.card)
                    .and_then(|def| def.behavior(effect.behavior))
                else {
                    continue;
                };
                let Some(condition) = &behavior.trigger.condition else {
                    continue;
                };
                if condition_matches(condition, player_id, event) {
                    matched.push((player_id.clone(), effect.card.clone(), effect.behavior));
                }
            }
        }

        for (owner, card, index) in matched {
            let Some(outputs) = catalog
                .get(&card)
                .and_then(|def| def.behavior(index))
                .map(|behavior| behavior.outputs.clone())
            else {
                continue;
            };
            effects::apply_outputs(state, queue, &owner, &card, &outputs, None)?;
            effects::refresh_pending_tile(state, &owner);
        }
        Ok(())
    }
}

/// The one home of the greenery/oxygen rule: every placed greenery
/// raises oxygen a step, with the terraform rating riding on the actual
/// step.
pub struct GreeneryRule;

impl Listener for GreeneryRule {
    fn name(&self) -> &'static str {
        "greenery-rule"
    }

    fn handle(
        &self,
        state: &mut GameState,
        event: &GameEvent,
        queue: &mut EventQueue,
    ) -> Result<(), ActionError> {
        if let GameEvent::TilePlaced {
            player,
            tile: crate::board::TileKind::Greenery,
            ..
        } = event
        {
            if state.phase != Phase::Complete {
                effects::raise_oxygen(state, queue, player, 1);
            }
        }
        Ok(())
    }
}
