//! Orchestrators resolving pending selections: starting cards, card
//! draws, production purchases, and tile placements.

use std::collections::BTreeSet;

use protocol::hex::HexCoordinate;

use crate::actions::with_events;
use crate::cards::{CardDef, Output};
use crate::effects;
use crate::error::ActionError;
use crate::events::{EventBus, GameEvent};
use crate::game::{GameState, GameStatus, Phase};
use crate::ids::{CardId, PlayerId};
use crate::player::{CardInstance, PendingSelection, STARTING_TERRAFORM_RATING};
use crate::production;
use crate::resources::{CARD_PRICE, Resource};

/// Credits a corporation grants on selection, read from its immediate
/// behaviors. Starting projects are paid out of this grant.
fn corporation_grant(card: &CardDef) -> u32 {
    card.behaviors
        .iter()
        .filter(|b| b.is_immediate())
        .flat_map(|b| b.outputs.iter())
        .map(|output| match output {
            Output::Resource {
                resource: Resource::Credits,
                amount,
            } if *amount > 0 => *amount as u32,
            _ => 0,
        })
        .sum()
}

/// Resolves the starting selection: exactly one corporation from the
/// dealt pair, any subset of the dealt projects bought at the standard
/// price from the corporation's grant. Once the last player selects,
/// play begins with the host.
pub fn select_starting_cards(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
    card_ids: &[String],
) -> Result<(), ActionError> {
    with_events(state, bus, |state, queue| {
        state.require_phase(Phase::StartingCardSelection)?;
        let selection = match &state.player(player_id)?.pending {
            Some(PendingSelection::Starting(selection)) => selection.clone(),
            _ => return Err(ActionError::NoPendingSelection),
        };

        let chosen: Vec<CardId> = card_ids.iter().map(|id| CardId::from(id.as_str())).collect();
        let unique: BTreeSet<&CardId> = chosen.iter().collect();
        if unique.len() != chosen.len() {
            return Err(ActionError::InvalidSelection("duplicate card ids".into()));
        }

        let mut corporation: Option<CardId> = None;
        let mut projects: Vec<CardId> = Vec::new();
        for id in &chosen {
            if selection.corporations.contains(id) {
                if corporation.is_some() {
                    return Err(ActionError::InvalidSelection(
                        "more than one corporation selected".into(),
                    ));
                }
                corporation = Some(id.clone());
            } else if selection.projects.contains(id) {
                projects.push(id.clone());
            } else {
                return Err(ActionError::InvalidSelection(format!(
                    "{} was not offered",
                    id
                )));
            }
        }
        let corporation = corporation.ok_or_else(|| {
            ActionError::InvalidSelection("a corporation must be selected".into())
        })?;

        let corp_def = state
            .catalog
            .get(&corporation)
            .cloned()
            .ok_or_else(|| ActionError::CardNotFound(corporation.to_string()))?;
        let project_cost = projects.len() as u32 * CARD_PRICE;
        if corporation_grant(&corp_def) < project_cost {
            return Err(ActionError::InsufficientResources(Resource::Credits));
        }

        // Commit: corporation becomes a played instance, its immediate
        // behaviors run, then the project purchase settles.
        let starting = corp_def.storage.map(|s| s.starting).unwrap_or(0);
        {
            let player = state.player_mut(player_id)?;
            player.pending = None;
            player.corporation = Some(corporation.clone());
            player.terraform_rating = STARTING_TERRAFORM_RATING;
            player.played.push(CardInstance::new(
                corporation.clone(),
                corp_def.behaviors.len(),
                starting,
            ));
        }
        effects::install_played_card(state, queue, player_id, &corp_def, None, None)?;
        {
            let player = state.player_mut(player_id)?;
            if !player.resources.deduct(Resource::Credits, project_cost) {
                return Err(ActionError::InsufficientResources(Resource::Credits));
            }
            player.hand.extend(projects.iter().cloned());
        }

        // Unpicked candidates go back to their piles.
        for id in &selection.projects {
            if !projects.contains(id) {
                state.discard.push(id.clone());
            }
        }
        for id in &selection.corporations {
            if id != &corporation {
                state.corporation_deck.insert(0, id.clone());
            }
        }

        queue.publish(GameEvent::CardPlayed {
            player: player_id.clone(),
            card: corporation.clone(),
        });
        if !corp_def.tags.is_empty() {
            queue.publish(GameEvent::TagsPlayed {
                player: player_id.clone(),
                tags: corp_def.tags.clone(),
            });
        }

        let all_selected = state
            .players
            .values()
            .all(|p| !matches!(p.pending, Some(PendingSelection::Starting(_))));
        if all_selected {
            state.phase = Phase::Action;
            state.current_turn = state.turn_order.first().cloned();
            tracing::info!(game = %state.id, "all corporations selected, action phase begins");
        }
        Ok(())
    })
}

/// Resolves a pending card-draw selection (everything except the
/// production purchase, which has its own frame).
pub fn confirm_card_draw(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
    cards_to_take: &[String],
    cards_to_buy: &[String],
) -> Result<(), ActionError> {
    with_events(state, bus, |state, _queue| {
        let draw = match state.player(player_id)?.pending_card_draw() {
            Some(draw) if draw.source != production::PRODUCTION_SOURCE => draw.clone(),
            _ => return Err(ActionError::NoPendingSelection),
        };

        let take: Vec<CardId> = cards_to_take.iter().map(|id| CardId::from(id.as_str())).collect();
        let buy: Vec<CardId> = cards_to_buy.iter().map(|id| CardId::from(id.as_str())).collect();
        validate_draw_resolution(&draw.cards, &take, &buy, draw.free_take, draw.buy_limit)?;

        let price = draw.price * buy.len() as u32;
        let player = state.player_mut(player_id)?;
        if !player.resources.deduct(Resource::Credits, price) {
            return Err(ActionError::InsufficientResources(Resource::Credits));
        }
        player.hand.extend(take.iter().cloned());
        player.hand.extend(buy.iter().cloned());
        player.pending = None;
        for id in &draw.cards {
            if !take.contains(id) && !buy.contains(id) {
                state.discard.push(id.clone());
            }
        }
        effects::refresh_pending_tile(state, player_id);
        Ok(())
    })
}

/// Resolves the production-phase purchase; the generation advances once
/// every player has confirmed.
pub fn confirm_production_cards(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
    card_ids: &[String],
) -> Result<(), ActionError> {
    with_events(state, bus, |state, _queue| {
        state.require_phase(Phase::Production)?;
        let draw = match state.player(player_id)?.pending_card_draw() {
            Some(draw) if draw.source == production::PRODUCTION_SOURCE => draw.clone(),
            _ => return Err(ActionError::NoPendingSelection),
        };

        let buy: Vec<CardId> = card_ids.iter().map(|id| CardId::from(id.as_str())).collect();
        validate_draw_resolution(&draw.cards, &[], &buy, 0, draw.buy_limit)?;

        let price = draw.price * buy.len() as u32;
        let player = state.player_mut(player_id)?;
        if !player.resources.deduct(Resource::Credits, price) {
            return Err(ActionError::InsufficientResources(Resource::Credits));
        }
        player.hand.extend(buy.iter().cloned());
        player.pending = None;
        for id in &draw.cards {
            if !buy.contains(id) {
                state.discard.push(id.clone());
            }
        }
        production::advance_generation_if_ready(state);
        Ok(())
    })
}

fn validate_draw_resolution(
    offered: &[CardId],
    take: &[CardId],
    buy: &[CardId],
    free_take: u32,
    buy_limit: u32,
) -> Result<(), ActionError> {
    if take.len() as u32 > free_take {
        return Err(ActionError::InvalidSelection(format!(
            "only {} free cards",
            free_take
        )));
    }
    if buy.len() as u32 > buy_limit {
        return Err(ActionError::InvalidSelection(format!(
            "only {} cards for sale",
            buy_limit
        )));
    }
    let mut seen: BTreeSet<&CardId> = BTreeSet::new();
    for id in take.iter().chain(buy) {
        if !offered.contains(id) {
            return Err(ActionError::InvalidSelection(format!(
                "{} was not offered",
                id
            )));
        }
        if !seen.insert(id) {
            return Err(ActionError::InvalidSelection(format!(
                "{} selected twice",
                id
            )));
        }
    }
    Ok(())
}

/// Resolves the pending tile placement.
pub fn select_tile(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
    coordinate: &HexCoordinate,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, queue| {
        if state.status != GameStatus::Active {
            return Err(ActionError::WrongPhase(state.phase));
        }
        effects::select_tile(state, queue, player_id, coordinate)
    })
}
