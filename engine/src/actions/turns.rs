//! Lifecycle and turn orchestrators: starting the game, passing,
//! the heat and plant conversions, milestones and awards.

use crate::actions::{require_action_turn, with_events};
use crate::board::TileKind;
use crate::cards::Tag;
use crate::effects;
use crate::error::ActionError;
use crate::events::{EventBus, GameEvent};
use crate::game::{
    AWARD_COSTS, AWARDS, FundedAward, GameState, GameStatus, MAX_CLAIMED_MILESTONES,
    MILESTONE_COST, MILESTONE_VP, MILESTONES, MIN_PLAYERS, Phase,
};
use crate::ids::PlayerId;
use crate::params::MAX_TEMPERATURE;
use crate::production;
use crate::resources::{HEAT_CONVERSION_COST, PLANT_CONVERSION_COST, Resource};

/// Host starts the game from the lobby; the starting-cards listener
/// reacts to the event and deals every player their pools.
pub fn start_game(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, queue| {
        if state.status != GameStatus::Lobby {
            return Err(ActionError::WrongPhase(state.phase));
        }
        if state.host.as_ref() != Some(player_id) {
            return Err(ActionError::NotHost);
        }
        if state.players.len() < MIN_PLAYERS {
            return Err(ActionError::NotEnoughPlayers(MIN_PLAYERS));
        }
        state.status = GameStatus::Active;
        state.phase = Phase::StartingCardSelection;
        queue.publish(GameEvent::GameStarted);
        tracing::info!(game = %state.id, players = state.players.len(), "game started");
        Ok(())
    })
}

/// Passes for the rest of the generation. When the last player passes
/// the production phase runs immediately.
pub fn skip_action(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, queue| {
        require_action_turn(state, player_id)?;
        state.passed.insert(player_id.clone());
        if state.all_passed() {
            production::run_production(state, queue);
        } else {
            state.current_turn = state.next_unpassed_after(player_id);
        }
        Ok(())
    })
}

/// 8 heat buy one temperature step.
pub fn convert_heat(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, queue| {
        require_action_turn(state, player_id)?;
        if state.params.temperature >= MAX_TEMPERATURE {
            return Err(ActionError::ParameterAtMax);
        }
        let player = state.player_mut(player_id)?;
        if !player.resources.deduct(Resource::Heat, HEAT_CONVERSION_COST) {
            return Err(ActionError::InsufficientResources(Resource::Heat));
        }
        effects::raise_temperature(state, queue, player_id, 1);
        Ok(())
    })
}

/// 8 plants buy a greenery placement; the oxygen step lands via the
/// greenery rule once the tile is placed.
pub fn convert_plants(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, _queue| {
        require_action_turn(state, player_id)?;
        let player = state.player_mut(player_id)?;
        if !player.resources.deduct(Resource::Plants, PLANT_CONVERSION_COST) {
            return Err(ActionError::InsufficientResources(Resource::Plants));
        }
        player
            .tile_queue
            .push_back((TileKind::Greenery, "convert-plants".to_owned()));
        effects::refresh_pending_tile(state, player_id);
        Ok(())
    })
}

fn milestone_reached(state: &GameState, player_id: &PlayerId, name: &str) -> bool {
    let Ok(player) = state.player(player_id) else {
        return false;
    };
    match name {
        "terraformer" => player.terraform_rating >= 35,
        "mayor" => state.board.count_tiles(player_id, Some(TileKind::City)) >= 3,
        "gardener" => state.board.count_tiles(player_id, Some(TileKind::Greenery)) >= 3,
        "builder" => player.tag_count(&state.catalog, Tag::Building) >= 8,
        "planner" => player.hand.len() >= 16,
        _ => false,
    }
}

/// Claims a milestone or funds an award, depending on the name.
pub fn claim_milestone_award(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
    name: &str,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, _queue| {
        require_action_turn(state, player_id)?;

        if MILESTONES.contains(&name) {
            if state.milestones.contains_key(name)
                || state.milestones.len() >= MAX_CLAIMED_MILESTONES
            {
                return Err(ActionError::MilestoneUnavailable(name.to_owned()));
            }
            if !milestone_reached(state, player_id, name) {
                return Err(ActionError::RequirementNotMet(format!(
                    "milestone {} not reached",
                    name
                )));
            }
            let player = state.player_mut(player_id)?;
            if !player.resources.deduct(Resource::Credits, MILESTONE_COST) {
                return Err(ActionError::InsufficientResources(Resource::Credits));
            }
            player.victory_points += MILESTONE_VP;
            state.milestones.insert(name.to_owned(), player_id.clone());
            return Ok(());
        }

        if AWARDS.contains(&name) {
            if state.awards.iter().any(|a| a.name == name)
                || state.awards.len() >= AWARD_COSTS.len()
            {
                return Err(ActionError::MilestoneUnavailable(name.to_owned()));
            }
            let cost = AWARD_COSTS[state.awards.len()];
            let player = state.player_mut(player_id)?;
            if !player.resources.deduct(Resource::Credits, cost) {
                return Err(ActionError::InsufficientResources(Resource::Credits));
            }
            state.awards.push(FundedAward {
                name: name.to_owned(),
                funder: player_id.clone(),
            });
            return Ok(());
        }

        Err(ActionError::MilestoneUnavailable(name.to_owned()))
    })
}
