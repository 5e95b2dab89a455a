//! Action orchestrators: one entry point per gameplay action. Every
//! orchestrator validates its preconditions, performs all mutations, and
//! publishes its events; the bus drains synchronously before the call
//! returns, so the caller broadcasts a state that already includes every
//! reactive follow-up.

mod cards;
mod selections;
mod standard;
mod turns;

pub use selections::{
    confirm_card_draw, confirm_production_cards, select_starting_cards, select_tile,
};

use protocol::actions::ActionRequest;

use crate::error::ActionError;
use crate::events::{EventBus, EventQueue};
use crate::game::{GameState, Phase};
use crate::ids::{CardId, PlayerId};

/// Runs one orchestrator body and then drains the event queue. When the
/// body fails nothing has mutated and nothing is delivered.
pub(crate) fn with_events<F>(
    state: &mut GameState,
    bus: &EventBus,
    f: F,
) -> Result<(), ActionError>
where
    F: FnOnce(&mut GameState, &mut EventQueue) -> Result<(), ActionError>,
{
    let mut queue = EventQueue::default();
    f(state, &mut queue)?;
    bus.deliver(state, &mut queue);
    state.touch();
    Ok(())
}

/// Common guard for in-generation actions: action phase, the caller's
/// turn, and no selection already waiting on them.
pub(crate) fn require_action_turn(
    state: &GameState,
    player_id: &PlayerId,
) -> Result<(), ActionError> {
    state.require_phase(Phase::Action)?;
    state.require_turn(player_id)?;
    if state.player(player_id)?.pending.is_some() {
        return Err(ActionError::SelectionPending);
    }
    Ok(())
}

/// Routes a `play-action` request to its orchestrator. Returns the
/// action label for the success acknowledgement.
pub fn dispatch(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
    request: &ActionRequest,
) -> Result<&'static str, ActionError> {
    let label = request.label();
    tracing::debug!(game = %state.id, player = %player_id, action = label, "dispatching");
    match request {
        ActionRequest::StartGame => turns::start_game(state, bus, player_id),
        ActionRequest::SkipAction => turns::skip_action(state, bus, player_id),
        ActionRequest::ConvertHeatTemperature => turns::convert_heat(state, bus, player_id),
        ActionRequest::ConvertPlantsGreenery => turns::convert_plants(state, bus, player_id),
        ActionRequest::ClaimMilestoneAward { name } => {
            turns::claim_milestone_award(state, bus, player_id, name)
        }
        ActionRequest::PlayCard {
            card_id,
            payment,
            choice_index,
            card_storage_target,
        } => cards::play_card(
            state,
            bus,
            player_id,
            &CardId::from(card_id.as_str()),
            payment,
            *choice_index,
            card_storage_target
                .as_deref()
                .map(CardId::from)
                .as_ref(),
        ),
        ActionRequest::UseCardAction {
            card_id,
            behavior_index,
            choice_index,
            card_storage_target,
        } => cards::use_card_action(
            state,
            bus,
            player_id,
            &CardId::from(card_id.as_str()),
            *behavior_index,
            *choice_index,
            card_storage_target
                .as_deref()
                .map(CardId::from)
                .as_ref(),
        ),
        ActionRequest::CorporationAction {
            behavior_index,
            choice_index,
            card_storage_target,
        } => cards::corporation_action(
            state,
            bus,
            player_id,
            *behavior_index,
            *choice_index,
            card_storage_target
                .as_deref()
                .map(CardId::from)
                .as_ref(),
        ),
        ActionRequest::BuyCards { card_count } => {
            cards::buy_cards(state, bus, player_id, *card_count)
        }
        ActionRequest::SellPatents { card_count } => {
            cards::sell_patents(state, bus, player_id, *card_count)
        }
        ActionRequest::BuildPowerPlant => standard::build_power_plant(state, bus, player_id),
        ActionRequest::LaunchAsteroid => standard::launch_asteroid(state, bus, player_id),
        ActionRequest::BuildAquifer => standard::build_aquifer(state, bus, player_id),
        ActionRequest::PlantGreenery => standard::plant_greenery(state, bus, player_id),
        ActionRequest::BuildCity => standard::build_city(state, bus, player_id),
    }
    .map(|_| label)
}
