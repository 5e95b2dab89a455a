//! The fixed-cost standard projects. All of them are paid in credits and
//! funnel their grants through the same effect pipeline as cards.

use crate::actions::{require_action_turn, with_events};
use crate::board::TileKind;
use crate::effects;
use crate::error::ActionError;
use crate::events::EventBus;
use crate::game::GameState;
use crate::ids::PlayerId;
use crate::params::{MAX_OCEANS, MAX_TEMPERATURE};
use crate::resources::Resource;

pub const POWER_PLANT_COST: u32 = 11;
pub const ASTEROID_COST: u32 = 14;
pub const AQUIFER_COST: u32 = 18;
pub const GREENERY_COST: u32 = 23;
pub const CITY_COST: u32 = 25;

const SOURCE: &str = "standard-project";

fn pay_credits(
    state: &mut GameState,
    player_id: &PlayerId,
    cost: u32,
) -> Result<(), ActionError> {
    let player = state.player_mut(player_id)?;
    if !player.resources.deduct(Resource::Credits, cost) {
        return Err(ActionError::InsufficientResources(Resource::Credits));
    }
    Ok(())
}

pub fn build_power_plant(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, _queue| {
        require_action_turn(state, player_id)?;
        pay_credits(state, player_id, POWER_PLANT_COST)?;
        state
            .player_mut(player_id)?
            .production
            .adjust(Resource::Energy, 1);
        Ok(())
    })
}

pub fn launch_asteroid(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, queue| {
        require_action_turn(state, player_id)?;
        if state.params.temperature >= MAX_TEMPERATURE {
            return Err(ActionError::ParameterAtMax);
        }
        pay_credits(state, player_id, ASTEROID_COST)?;
        effects::raise_temperature(state, queue, player_id, 1);
        Ok(())
    })
}

pub fn build_aquifer(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, _queue| {
        require_action_turn(state, player_id)?;
        if state.params.oceans >= MAX_OCEANS {
            return Err(ActionError::ParameterAtMax);
        }
        pay_credits(state, player_id, AQUIFER_COST)?;
        state
            .player_mut(player_id)?
            .tile_queue
            .push_back((TileKind::Ocean, SOURCE.to_owned()));
        effects::refresh_pending_tile(state, player_id);
        Ok(())
    })
}

pub fn plant_greenery(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, _queue| {
        require_action_turn(state, player_id)?;
        pay_credits(state, player_id, GREENERY_COST)?;
        state
            .player_mut(player_id)?
            .tile_queue
            .push_back((TileKind::Greenery, SOURCE.to_owned()));
        effects::refresh_pending_tile(state, player_id);
        Ok(())
    })
}

pub fn build_city(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, _queue| {
        require_action_turn(state, player_id)?;
        pay_credits(state, player_id, CITY_COST)?;
        let player = state.player_mut(player_id)?;
        player.production.adjust(Resource::Credits, 1);
        player
            .tile_queue
            .push_back((TileKind::City, SOURCE.to_owned()));
        effects::refresh_pending_tile(state, player_id);
        Ok(())
    })
}
