//! Card-centric orchestrators: playing a card, invoking manual actions,
//! buying and selling cards.

use protocol::actions::Payment;

use crate::actions::{require_action_turn, with_events};
use crate::effects;
use crate::error::ActionError;
use crate::events::EventBus;
use crate::game::GameState;
use crate::ids::{CardId, PlayerId};
use crate::player::{PendingCardDraw, PendingSelection};
use crate::resources::{CARD_PRICE, Resource};

/// Maximum cards revealed by one buy-cards action.
const BUY_CARDS_LIMIT: usize = 4;
/// Credits received per patent sold.
const PATENT_VALUE: u32 = 1;

pub fn play_card(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
    card_id: &CardId,
    payment: &Payment,
    choice_index: Option<usize>,
    storage_target: Option<&CardId>,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, queue| {
        require_action_turn(state, player_id)?;
        effects::validate_card_play(
            state,
            player_id,
            card_id,
            payment,
            choice_index,
            storage_target,
        )?;
        effects::apply_card_play(
            state,
            queue,
            player_id,
            card_id,
            payment,
            choice_index,
            storage_target,
        )
    })
}

pub fn use_card_action(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
    card_id: &CardId,
    behavior_index: usize,
    choice_index: Option<usize>,
    storage_target: Option<&CardId>,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, queue| {
        require_action_turn(state, player_id)?;
        effects::use_card_action(
            state,
            queue,
            player_id,
            card_id,
            behavior_index,
            choice_index,
            storage_target,
        )
    })
}

/// The corporation's manual action; resolves the card id from the
/// player's chosen corporation.
pub fn corporation_action(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
    behavior_index: usize,
    choice_index: Option<usize>,
    storage_target: Option<&CardId>,
) -> Result<(), ActionError> {
    let corporation = state
        .player(player_id)?
        .corporation
        .clone()
        .ok_or(ActionError::UnknownAction)?;
    use_card_action(
        state,
        bus,
        player_id,
        &corporation,
        behavior_index,
        choice_index,
        storage_target,
    )
}

/// Reveals up to four cards and opens a buy selection at the standard
/// price, resolved by `confirm-card-draw`.
pub fn buy_cards(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
    card_count: usize,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, _queue| {
        require_action_turn(state, player_id)?;
        if card_count == 0 || card_count > BUY_CARDS_LIMIT {
            return Err(ActionError::InvalidSelection(format!(
                "may reveal 1 to {} cards",
                BUY_CARDS_LIMIT
            )));
        }
        let offer = state.draw_cards(card_count);
        if offer.is_empty() {
            return Err(ActionError::InvalidSelection("deck is exhausted".into()));
        }
        let player = state.player_mut(player_id)?;
        player.pending = Some(PendingSelection::CardDraw(PendingCardDraw {
            buy_limit: offer.len() as u32,
            cards: offer,
            free_take: 0,
            price: CARD_PRICE,
            source: "buy-cards".to_owned(),
        }));
        Ok(())
    })
}

/// Discards the most recently drawn `card_count` hand cards for credits.
pub fn sell_patents(
    state: &mut GameState,
    bus: &EventBus,
    player_id: &PlayerId,
    card_count: usize,
) -> Result<(), ActionError> {
    with_events(state, bus, |state, _queue| {
        require_action_turn(state, player_id)?;
        let hand_size = state.player(player_id)?.hand.len();
        if card_count == 0 || card_count > hand_size {
            return Err(ActionError::InvalidSelection(format!(
                "may sell between 1 and {} cards",
                hand_size
            )));
        }
        let player = state.player_mut(player_id)?;
        let sold: Vec<CardId> = player.hand.split_off(hand_size - card_count);
        player
            .resources
            .add(Resource::Credits, sold.len() as u32 * PATENT_VALUE);
        state.discard.extend(sold);
        Ok(())
    })
}
