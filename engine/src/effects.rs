//! The card effect engine: requirement and payment validation, the
//! output-application pipeline shared by card plays, manual actions,
//! reactive effects and standard projects, and tile-selection handling.

use protocol::actions::Payment;
use protocol::hex::HexCoordinate;

use crate::board::{Occupant, PlacementBonus, TileKind};
use crate::cards::{
    Behavior, CardDef, Input, Metric, Output, StorageTarget, Tag, VictoryCondition,
};
use crate::error::ActionError;
use crate::events::{EventQueue, GameEvent};
use crate::game::{GameState, GameStatus, Phase};
use crate::ids::{CardId, PlayerId};
use crate::params::TEMPERATURE_INCREMENT;
use crate::player::{
    CardInstance, PendingCardDraw, PendingSelection, PendingTileSelection, BehaviorRef,
};
use crate::resources::{CARD_PRICE, Resource, STEEL_VALUE, TITANIUM_VALUE};
use crate::scoring;

/// Summed requirement lenience from the player's passive effects, in
/// parameter steps.
pub fn requirement_lenience(state: &GameState, player_id: &PlayerId) -> i32 {
    let catalog = state.catalog.clone();
    let Ok(player) = state.player(player_id) else {
        return 0;
    };
    player
        .effects
        .iter()
        .filter_map(|eff| catalog.get(&eff.card)?.behavior(eff.behavior))
        .flat_map(|behavior| behavior.outputs.iter())
        .map(|output| match output {
            Output::RequirementLenience { amount } => *amount as i32,
            _ => 0,
        })
        .sum()
}

/// Summed discount applying to `card` from the player's passive effects.
pub fn discount_for(state: &GameState, player_id: &PlayerId, card: &CardDef) -> u32 {
    let catalog = state.catalog.clone();
    let Ok(player) = state.player(player_id) else {
        return 0;
    };
    player
        .effects
        .iter()
        .filter_map(|eff| catalog.get(&eff.card)?.behavior(eff.behavior))
        .flat_map(|behavior| behavior.outputs.iter())
        .map(|output| match output {
            Output::Discount { amount, tag: None } => *amount,
            Output::Discount {
                amount,
                tag: Some(tag),
            } if card.has_tag(*tag) => *amount,
            _ => 0,
        })
        .sum()
}

/// Cost after discounts, floored at zero.
pub fn final_cost(state: &GameState, player_id: &PlayerId, card: &CardDef) -> u32 {
    card.cost.saturating_sub(discount_for(state, player_id, card))
}

fn metric_value(state: &GameState, player_id: &PlayerId, metric: Metric) -> i32 {
    let player = state.player(player_id).ok();
    match metric {
        Metric::Temperature => state.params.temperature,
        Metric::Oxygen => state.params.oxygen as i32,
        Metric::Oceans => state.params.oceans as i32,
        Metric::TerraformRating => {
            player.map(|p| p.terraform_rating as i32).unwrap_or_default()
        }
        Metric::Tag(tag) => player
            .map(|p| p.tag_count(&state.catalog, tag) as i32)
            .unwrap_or_default(),
        Metric::Production(resource) => {
            player.map(|p| p.production.get(resource)).unwrap_or_default()
        }
        Metric::Resource(resource) => player
            .map(|p| p.resources.get(resource) as i32)
            .unwrap_or_default(),
    }
}

/// Checks the card's requirement windows, widened by active lenience.
/// Lenience only softens global-parameter requirements; temperature
/// moves in 2-degree steps, so it widens twice as far.
pub fn check_requirements(
    state: &GameState,
    player_id: &PlayerId,
    card: &CardDef,
) -> Result<(), ActionError> {
    let lenience = requirement_lenience(state, player_id);
    for requirement in &card.requirements {
        let slack = match requirement.metric {
            Metric::Temperature => lenience * TEMPERATURE_INCREMENT,
            Metric::Oxygen | Metric::Oceans => lenience,
            _ => 0,
        };
        let value = metric_value(state, player_id, requirement.metric);
        if let Some(min) = requirement.min {
            if value < min - slack {
                return Err(ActionError::RequirementNotMet(format!(
                    "{:?} below {}",
                    requirement.metric, min
                )));
            }
        }
        if let Some(max) = requirement.max {
            if value > max + slack {
                return Err(ActionError::RequirementNotMet(format!(
                    "{:?} above {}",
                    requirement.metric, max
                )));
            }
        }
    }
    Ok(())
}

/// The value a payment plan puts toward `card`: steel counts only with a
/// building tag, titanium only with a space tag, heat always at 1:1.
pub fn payment_value(card: &CardDef, payment: &Payment) -> u32 {
    let mut value = payment.credits + payment.heat;
    if card.has_tag(Tag::Building) {
        value += payment.steel * STEEL_VALUE;
    }
    if card.has_tag(Tag::Space) {
        value += payment.titanium * TITANIUM_VALUE;
    }
    value
}

fn validate_payment(
    state: &GameState,
    player_id: &PlayerId,
    card: &CardDef,
    payment: &Payment,
) -> Result<(), ActionError> {
    let player = state.player(player_id)?;
    for (resource, offered) in [
        (Resource::Credits, payment.credits),
        (Resource::Steel, payment.steel),
        (Resource::Titanium, payment.titanium),
        (Resource::Heat, payment.heat),
    ] {
        if player.resources.get(resource) < offered {
            return Err(ActionError::InsufficientResources(resource));
        }
    }
    if (payment.steel > 0 && !card.has_tag(Tag::Building))
        || (payment.titanium > 0 && !card.has_tag(Tag::Space))
    {
        return Err(ActionError::BadPayment);
    }
    if payment_value(card, payment) != final_cost(state, player_id, card) {
        return Err(ActionError::BadPayment);
    }
    Ok(())
}

/// The immediate slice of a card: every auto behavior without a condition
/// that is not a pure static modifier.
fn immediate_behaviors(card: &CardDef) -> impl Iterator<Item = &Behavior> {
    card.behaviors.iter().filter(|b| b.is_immediate())
}

fn chosen_choice<'a>(
    behavior: &'a Behavior,
    choice_index: Option<usize>,
) -> Result<Option<&'a crate::cards::Choice>, ActionError> {
    if behavior.choices.is_empty() {
        return Ok(None);
    }
    let index = choice_index.ok_or(ActionError::ChoiceRequired)?;
    behavior
        .choices
        .get(index)
        .map(Some)
        .ok_or(ActionError::ChoiceOutOfRange)
}

/// Full pre-mutation validation of a card play.
pub fn validate_card_play(
    state: &GameState,
    player_id: &PlayerId,
    card_id: &CardId,
    payment: &Payment,
    choice_index: Option<usize>,
    storage_target: Option<&CardId>,
) -> Result<(), ActionError> {
    let player = state.player(player_id)?;
    if !player.has_in_hand(card_id) {
        return Err(ActionError::CardNotInHand(card_id.to_string()));
    }
    let card = state
        .catalog
        .get(card_id)
        .ok_or_else(|| ActionError::CardNotFound(card_id.to_string()))?;

    check_requirements(state, player_id, card)?;
    validate_payment(state, player_id, card, payment)?;

    // Dry-run the immediate outputs far enough to catch failures that
    // must not mutate: choice index, production floors, storage targets.
    let mut production = player.production;
    for behavior in immediate_behaviors(card) {
        let choice = chosen_choice(behavior, choice_index)?;
        let choice_outputs = choice.map(|c| c.outputs.as_slice()).unwrap_or(&[]);
        for output in behavior.outputs.iter().chain(choice_outputs) {
            match output {
                Output::Production { resource, amount } => {
                    if !production.adjust(*resource, *amount) {
                        return Err(ActionError::RequirementNotMet(format!(
                            "{} production cannot drop further",
                            resource
                        )));
                    }
                }
                Output::CardResource {
                    resource,
                    target: StorageTarget::AnyCard,
                    ..
                } => {
                    let target = storage_target.ok_or(ActionError::StorageTargetRequired)?;
                    validate_storage_target(state, player_id, target, *resource)?;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn validate_storage_target(
    state: &GameState,
    player_id: &PlayerId,
    target: &CardId,
    resource: crate::cards::StorageResource,
) -> Result<(), ActionError> {
    let player = state.player(player_id)?;
    if player.instance(target).is_none() {
        return Err(ActionError::StorageTargetInvalid(target.to_string()));
    }
    let spec = state
        .catalog
        .get(target)
        .and_then(|def| def.storage)
        .ok_or_else(|| ActionError::StorageTargetInvalid(target.to_string()))?;
    if spec.resource != resource {
        return Err(ActionError::StorageTargetInvalid(target.to_string()));
    }
    Ok(())
}

/// Plays a card from hand. Callers must have run [`validate_card_play`];
/// this function deducts, instantiates, applies, and publishes.
pub fn apply_card_play(
    state: &mut GameState,
    queue: &mut EventQueue,
    player_id: &PlayerId,
    card_id: &CardId,
    payment: &Payment,
    choice_index: Option<usize>,
    storage_target: Option<&CardId>,
) -> Result<(), ActionError> {
    let card = state
        .catalog
        .get(card_id)
        .cloned()
        .ok_or_else(|| ActionError::CardNotFound(card_id.to_string()))?;

    let player = state.player_mut(player_id)?;
    for (resource, offered) in [
        (Resource::Credits, payment.credits),
        (Resource::Steel, payment.steel),
        (Resource::Titanium, payment.titanium),
        (Resource::Heat, payment.heat),
    ] {
        if offered > 0 && !player.resources.deduct(resource, offered) {
            return Err(ActionError::InsufficientResources(resource));
        }
    }
    player.hand.retain(|id| id != card_id);
    let starting = card.storage.map(|s| s.starting).unwrap_or(0);
    player.played.push(CardInstance::new(
        card_id.clone(),
        card.behaviors.len(),
        starting,
    ));

    install_played_card(state, queue, player_id, &card, choice_index, storage_target)?;

    queue.publish(GameEvent::CardPlayed {
        player: player_id.clone(),
        card: card_id.clone(),
    });
    if !card.tags.is_empty() {
        queue.publish(GameEvent::TagsPlayed {
            player: player_id.clone(),
            tags: card.tags.clone(),
        });
    }
    refresh_pending_tile(state, player_id);
    Ok(())
}

/// Shared by card plays and corporation selection: registers passive
/// effects and manual actions, runs the immediate behaviors, applies
/// fixed victory points. Assumes the instance is already in `played`.
pub fn install_played_card(
    state: &mut GameState,
    queue: &mut EventQueue,
    player_id: &PlayerId,
    card: &CardDef,
    choice_index: Option<usize>,
    storage_target: Option<&CardId>,
) -> Result<(), ActionError> {
    for (index, behavior) in card.behaviors.iter().enumerate() {
        let reference = BehaviorRef {
            card: card.id.clone(),
            behavior: index,
        };
        match behavior.trigger.kind {
            crate::cards::TriggerKind::Manual => {
                state.player_mut(player_id)?.actions.push(reference);
            }
            crate::cards::TriggerKind::Auto if behavior.is_passive() => {
                state.player_mut(player_id)?.effects.push(reference);
            }
            crate::cards::TriggerKind::Auto => {
                let choice = chosen_choice(behavior, choice_index)?;
                apply_outputs(
                    state,
                    queue,
                    player_id,
                    &card.id,
                    &behavior.outputs,
                    storage_target,
                )?;
                if let Some(choice) = choice {
                    deduct_inputs(state, player_id, &card.id, &choice.inputs)?;
                    apply_outputs(
                        state,
                        queue,
                        player_id,
                        &card.id,
                        &choice.outputs,
                        storage_target,
                    )?;
                }
            }
        }
    }

    let mut fixed = 0i32;
    for condition in &card.victory_points {
        if let VictoryCondition::Fixed { amount } = condition {
            fixed += amount;
        }
    }
    if fixed != 0 {
        state.player_mut(player_id)?.victory_points += fixed;
    }
    Ok(())
}

fn deduct_inputs(
    state: &mut GameState,
    player_id: &PlayerId,
    source: &CardId,
    inputs: &[Input],
) -> Result<(), ActionError> {
    // Validate everything before touching anything.
    {
        let player = state.player(player_id)?;
        for input in inputs {
            match input {
                Input::Resource { resource, amount } => {
                    if player.resources.get(*resource) < *amount {
                        return Err(ActionError::InsufficientResources(*resource));
                    }
                }
                Input::CardResource { amount } => {
                    let stored = player.instance(source).map(|i| i.stored).unwrap_or(0);
                    if stored < *amount {
                        return Err(ActionError::InvalidSelection(format!(
                            "{} has too few stored resources",
                            source
                        )));
                    }
                }
            }
        }
    }
    let player = state.player_mut(player_id)?;
    for input in inputs {
        match input {
            Input::Resource { resource, amount } => {
                player.resources.deduct(*resource, *amount);
            }
            Input::CardResource { amount } => {
                if let Some(instance) = player.instance_mut(source) {
                    instance.stored -= amount;
                }
            }
        }
    }
    Ok(())
}

/// Runs a registered manual action: checks availability and the
/// per-generation play counter, settles inputs, applies outputs.
pub fn use_card_action(
    state: &mut GameState,
    queue: &mut EventQueue,
    player_id: &PlayerId,
    card_id: &CardId,
    behavior_index: usize,
    choice_index: Option<usize>,
    storage_target: Option<&CardId>,
) -> Result<(), ActionError> {
    let registered = state
        .player(player_id)?
        .actions
        .iter()
        .any(|a| &a.card == card_id && a.behavior == behavior_index);
    if !registered {
        return Err(ActionError::UnknownAction);
    }
    let plays = state
        .player(player_id)?
        .instance(card_id)
        .and_then(|i| i.plays.get(behavior_index).copied())
        .unwrap_or(0);
    if plays > 0 {
        return Err(ActionError::ActionExhausted);
    }

    let card = state
        .catalog
        .get(card_id)
        .cloned()
        .ok_or_else(|| ActionError::CardNotFound(card_id.to_string()))?;
    let behavior = card.behavior(behavior_index).ok_or(ActionError::UnknownAction)?;
    let choice = chosen_choice(behavior, choice_index)?;

    // Storage targets are validated before anything is deducted.
    for output in behavior.outputs.iter().chain(
        choice.map(|c| c.outputs.as_slice()).unwrap_or(&[]),
    ) {
        if let Output::CardResource {
            resource,
            target: StorageTarget::AnyCard,
            ..
        } = output
        {
            let target = storage_target.ok_or(ActionError::StorageTargetRequired)?;
            validate_storage_target(state, player_id, target, *resource)?;
        }
    }

    deduct_inputs(state, player_id, card_id, &behavior.inputs)?;
    if let Some(choice) = choice {
        deduct_inputs(state, player_id, card_id, &choice.inputs)?;
    }
    apply_outputs(state, queue, player_id, card_id, &behavior.outputs, storage_target)?;
    if let Some(choice) = choice {
        apply_outputs(state, queue, player_id, card_id, &choice.outputs, storage_target)?;
    }

    if let Some(instance) = state.player_mut(player_id)?.instance_mut(card_id) {
        if let Some(slot) = instance.plays.get_mut(behavior_index) {
            *slot += 1;
        }
    }
    refresh_pending_tile(state, player_id);
    Ok(())
}

/// The single output-application pipeline. Every path that grants
/// anything (card play, manual action, reactive effect, standard
/// project) funnels through here.
pub fn apply_outputs(
    state: &mut GameState,
    queue: &mut EventQueue,
    player_id: &PlayerId,
    source: &CardId,
    outputs: &[Output],
    storage_target: Option<&CardId>,
) -> Result<(), ActionError> {
    for output in outputs {
        match *output {
            Output::Resource { resource, amount } => {
                state
                    .player_mut(player_id)?
                    .resources
                    .adjust_saturating(resource, amount);
            }
            Output::Production { resource, amount } => {
                if !state.player_mut(player_id)?.production.adjust(resource, amount) {
                    return Err(ActionError::RequirementNotMet(format!(
                        "{} production cannot drop further",
                        resource
                    )));
                }
            }
            Output::TerraformRating { amount } => {
                state.player_mut(player_id)?.terraform_rating += amount;
            }
            Output::Temperature { steps } => {
                raise_temperature(state, queue, player_id, steps);
            }
            Output::Oxygen { steps } => {
                raise_oxygen(state, queue, player_id, steps);
            }
            Output::Tile { tile, count } => {
                let player = state.player_mut(player_id)?;
                for _ in 0..count {
                    player.tile_queue.push_back((tile, source.to_string()));
                }
            }
            Output::DrawCards { count, take, buy } => {
                grant_draw(state, player_id, count, take, buy, source.as_str())?;
            }
            Output::CardResource {
                resource,
                amount,
                target,
            } => {
                let target_card = match target {
                    StorageTarget::SelfCard => source.clone(),
                    StorageTarget::AnyCard => storage_target
                        .cloned()
                        .ok_or(ActionError::StorageTargetRequired)?,
                };
                if target != StorageTarget::SelfCard {
                    validate_storage_target(state, player_id, &target_card, resource)?;
                }
                let capacity = state
                    .catalog
                    .get(&target_card)
                    .and_then(|def| def.storage)
                    .and_then(|spec| spec.capacity);
                let player = state.player_mut(player_id)?;
                if let Some(instance) = player.instance_mut(&target_card) {
                    if amount >= 0 {
                        instance.stored += amount as u32;
                        if let Some(cap) = capacity {
                            instance.stored = instance.stored.min(cap);
                        }
                    } else {
                        instance.stored = instance.stored.saturating_sub(amount.unsigned_abs());
                    }
                }
            }
            Output::Discount { .. } | Output::RequirementLenience { .. } => {
                // Static modifiers live on the player as passive effects.
            }
        }
    }
    Ok(())
}

/// Draws `count` cards. When all of them are free and nothing is for
/// sale they go straight to the hand; otherwise a pending card-draw
/// selection opens.
fn grant_draw(
    state: &mut GameState,
    player_id: &PlayerId,
    count: u32,
    take: u32,
    buy: u32,
    source: &str,
) -> Result<(), ActionError> {
    let drawn = state.draw_cards(count as usize);
    if drawn.is_empty() {
        return Ok(());
    }
    let take = take.min(drawn.len() as u32);
    if take as usize >= drawn.len() && buy == 0 {
        state.player_mut(player_id)?.hand.extend(drawn);
        return Ok(());
    }
    if state.player(player_id)?.pending.is_some() {
        // The selection slot is taken; settle the free part and discard
        // the rest rather than losing cards.
        tracing::warn!(player = %player_id, source, "selection slot busy, auto-resolving draw");
        let (to_hand, to_discard) = drawn.split_at(take as usize);
        let to_discard = to_discard.to_vec();
        state
            .player_mut(player_id)?
            .hand
            .extend(to_hand.iter().cloned());
        state.discard.extend(to_discard);
        return Ok(());
    }
    state.player_mut(player_id)?.pending =
        Some(PendingSelection::CardDraw(PendingCardDraw {
            cards: drawn,
            free_take: take,
            buy_limit: buy,
            price: CARD_PRICE,
            source: source.to_owned(),
        }));
    Ok(())
}

/// Raises temperature, granting 1 TR per actual step.
pub fn raise_temperature(
    state: &mut GameState,
    queue: &mut EventQueue,
    player_id: &PlayerId,
    steps: u32,
) -> u32 {
    let actual = state.params.raise_temperature(steps);
    if actual > 0 {
        if let Ok(player) = state.player_mut(player_id) {
            player.terraform_rating += actual;
        }
        queue.publish(GameEvent::TemperatureChanged {
            player: player_id.clone(),
            steps: actual,
        });
        complete_if_terraformed(state, queue);
    }
    actual
}

/// Raises oxygen, granting 1 TR per actual step.
pub fn raise_oxygen(
    state: &mut GameState,
    queue: &mut EventQueue,
    player_id: &PlayerId,
    steps: u32,
) -> u32 {
    let actual = state.params.raise_oxygen(steps);
    if actual > 0 {
        if let Ok(player) = state.player_mut(player_id) {
            player.terraform_rating += actual;
        }
        queue.publish(GameEvent::OxygenChanged {
            player: player_id.clone(),
            steps: actual,
        });
        complete_if_terraformed(state, queue);
    }
    actual
}

/// Ends the game once all three parameters sit at their maximum.
pub fn complete_if_terraformed(state: &mut GameState, queue: &mut EventQueue) {
    if state.status != GameStatus::Active || !state.params.at_max() {
        return;
    }
    state.status = GameStatus::Completed;
    state.phase = Phase::Complete;
    state.current_turn = None;
    scoring::finalize(state);
    queue.publish(GameEvent::GameCompleted);
    tracing::info!(game = %state.id, "game completed, all parameters at maximum");
}

/// Opens the next tile selection from the queue, skipping entries with
/// no legal hex (vacuous resolution).
pub fn refresh_pending_tile(state: &mut GameState, player_id: &PlayerId) {
    loop {
        let Ok(player) = state.player(player_id) else {
            return;
        };
        if player.pending.is_some() {
            return;
        }
        let Some((tile, source)) = state
            .player_mut(player_id)
            .ok()
            .and_then(|p| p.tile_queue.pop_front())
        else {
            return;
        };
        let available = state.board.legal_hexes(tile, player_id);
        if available.is_empty() {
            tracing::debug!(player = %player_id, tile = tile.label(), "no legal hex, skipping placement");
            continue;
        }
        if let Ok(player) = state.player_mut(player_id) {
            player.pending = Some(PendingSelection::Tile(PendingTileSelection {
                tile,
                available,
                source,
            }));
        }
        return;
    }
}

/// Resolves the open tile selection at `coord`: places the occupant,
/// credits placement bonuses for cities and greeneries, fills the ocean
/// counter, and advances the tile queue.
pub fn select_tile(
    state: &mut GameState,
    queue: &mut EventQueue,
    player_id: &PlayerId,
    coord: &HexCoordinate,
) -> Result<(), ActionError> {
    if !coord.is_valid() {
        return Err(ActionError::InvalidCoordinate);
    }
    let selection = match state.player(player_id)?.pending_tile() {
        Some(selection) => selection.clone(),
        None => return Err(ActionError::NoPendingSelection),
    };
    if !selection.available.contains(coord) {
        return Err(ActionError::IllegalHex(coord.to_string()));
    }

    let bonuses: Vec<PlacementBonus> = state
        .board
        .hex(coord)
        .map(|hex| hex.bonuses.clone())
        .unwrap_or_default();

    let owner = match selection.tile {
        TileKind::Ocean => None,
        _ => Some(player_id.clone()),
    };
    if !state.board.place(coord, Occupant {
        tile: selection.tile,
        owner,
    }) {
        return Err(ActionError::IllegalHex(coord.to_string()));
    }
    state.player_mut(player_id)?.pending = None;

    match selection.tile {
        TileKind::City | TileKind::Greenery => {
            for bonus in bonuses {
                match bonus {
                    PlacementBonus::Resource(resource, amount) => {
                        state.player_mut(player_id)?.resources.add(resource, amount);
                    }
                    PlacementBonus::CardDraw(count) => {
                        grant_draw(state, player_id, count, count, 0, "placement-bonus")?;
                    }
                }
            }
        }
        TileKind::Ocean => {
            if state.params.place_ocean() {
                state.player_mut(player_id)?.terraform_rating += 1;
                queue.publish(GameEvent::OceansChanged {
                    player: player_id.clone(),
                    count: 1,
                });
            }
        }
    }

    queue.publish(GameEvent::TilePlaced {
        player: player_id.clone(),
        tile: selection.tile,
        coordinate: *coord,
    });
    complete_if_terraformed(state, queue);
    refresh_pending_tile(state, player_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::catalog::CardCatalog;
    use crate::events::EventBus;
    use crate::game::GameStatus;
    use crate::ids::PlayerId;
    use std::sync::Arc;

    fn game_with_player() -> (GameState, PlayerId) {
        let mut state = GameState::new("g1".into(), 2, Arc::new(CardCatalog::standard()));
        let player = state.join("Alice".into()).unwrap();
        state.status = GameStatus::Active;
        state.phase = Phase::Action;
        state.current_turn = Some(player.clone());
        (state, player)
    }

    fn give_played(state: &mut GameState, player: &PlayerId, card: &str) {
        let def = state.catalog.get(&CardId::from(card)).unwrap().clone();
        let starting = def.storage.map(|s| s.starting).unwrap_or(0);
        state.player_mut(player).unwrap().played.push(CardInstance::new(
            CardId::from(card),
            def.behaviors.len(),
            starting,
        ));
    }

    fn give_effect(state: &mut GameState, player: &PlayerId, card: &str, behavior: usize) {
        give_played(state, player, card);
        state.player_mut(player).unwrap().effects.push(BehaviorRef {
            card: CardId::from(card),
            behavior,
        });
    }

    #[test]
    fn steel_only_pays_for_building_cards() {
        let (mut state, player) = game_with_player();
        let ledger = &mut state.player_mut(&player).unwrap().resources;
        ledger.add(Resource::Credits, 20);
        ledger.add(Resource::Steel, 5);

        // Asteroid has a space tag, no building tag: steel is refused.
        let asteroid = state.catalog.get(&CardId::from("asteroid")).unwrap().clone();
        let payment = Payment {
            credits: 10,
            steel: 2,
            ..Payment::default()
        };
        assert_eq!(
            Err(ActionError::BadPayment),
            validate_payment(&state, &player, &asteroid, &payment)
        );

        // Mine is a building card: 2 steel cover 4 of the cost.
        let mine = state.catalog.get(&CardId::from("mine")).unwrap().clone();
        let payment = Payment {
            credits: 0,
            steel: 2,
            ..Payment::default()
        };
        assert_eq!(Ok(()), validate_payment(&state, &player, &mine, &payment));
    }

    #[test]
    fn payment_must_match_final_cost_exactly() {
        let (mut state, player) = game_with_player();
        state
            .player_mut(&player)
            .unwrap()
            .resources
            .add(Resource::Credits, 50);
        let mine = state.catalog.get(&CardId::from("mine")).unwrap().clone();
        assert_eq!(
            Err(ActionError::BadPayment),
            validate_payment(&state, &player, &mine, &Payment::credits(5))
        );
        assert_eq!(
            Ok(()),
            validate_payment(&state, &player, &mine, &Payment::credits(4))
        );
    }

    #[test]
    fn discounts_lower_the_final_cost() {
        let (mut state, player) = game_with_player();
        // Thorgate's second behavior is a 3-credit discount on power tags.
        give_effect(&mut state, &player, "thorgate", 1);
        let power_plant = state
            .catalog
            .get(&CardId::from("power-plant"))
            .unwrap()
            .clone();
        assert_eq!(1, final_cost(&state, &player, &power_plant));

        // The discount does not touch cards without the tag.
        let mine = state.catalog.get(&CardId::from("mine")).unwrap().clone();
        assert_eq!(4, final_cost(&state, &player, &mine));
    }

    #[test]
    fn lenience_widens_requirement_windows() {
        let (mut state, player) = game_with_player();
        let birds = state.catalog.get(&CardId::from("birds")).unwrap().clone();

        state.params.oxygen = 11;
        assert!(check_requirements(&state, &player, &birds).is_err());

        give_effect(&mut state, &player, "adaptation-technology", 0);
        assert!(check_requirements(&state, &player, &birds).is_ok());

        state.params.oxygen = 10;
        assert!(check_requirements(&state, &player, &birds).is_err());
    }

    #[test]
    fn play_card_resolves_the_selected_choice_only() {
        let (mut state, player) = game_with_player();
        {
            let p = state.player_mut(&player).unwrap();
            p.hand.push(CardId::from("cargo-rockets"));
            p.resources.add(Resource::Credits, 3);
        }
        let mut queue = EventQueue::default();
        let payment = Payment::credits(3);
        validate_card_play(
            &state,
            &player,
            &CardId::from("cargo-rockets"),
            &payment,
            Some(1),
            None,
        )
        .unwrap();
        apply_card_play(
            &mut state,
            &mut queue,
            &player,
            &CardId::from("cargo-rockets"),
            &payment,
            Some(1),
            None,
        )
        .unwrap();

        let p = state.player(&player).unwrap();
        assert_eq!(2, p.resources.plants);
        assert_eq!(0, p.resources.steel);
        assert_eq!(0, p.resources.credits);
        assert!(p.instance(&CardId::from("cargo-rockets")).is_some());
        assert!(!p.has_in_hand(&CardId::from("cargo-rockets")));
    }

    #[test]
    fn choice_card_without_index_is_rejected_before_mutation() {
        let (mut state, player) = game_with_player();
        {
            let p = state.player_mut(&player).unwrap();
            p.hand.push(CardId::from("cargo-rockets"));
            p.resources.add(Resource::Credits, 3);
        }
        assert_eq!(
            Err(ActionError::ChoiceRequired),
            validate_card_play(
                &state,
                &player,
                &CardId::from("cargo-rockets"),
                &Payment::credits(3),
                None,
                None,
            )
        );
        assert_eq!(3, state.player(&player).unwrap().resources.credits);
    }

    #[test]
    fn manual_action_deducts_inputs_and_counts_plays() {
        let (mut state, player) = game_with_player();
        give_played(&mut state, &player, "ironworks");
        state
            .player_mut(&player)
            .unwrap()
            .actions
            .push(BehaviorRef {
                card: CardId::from("ironworks"),
                behavior: 0,
            });
        state
            .player_mut(&player)
            .unwrap()
            .resources
            .add(Resource::Energy, 8);

        let mut queue = EventQueue::default();
        use_card_action(
            &mut state,
            &mut queue,
            &player,
            &CardId::from("ironworks"),
            0,
            None,
            None,
        )
        .unwrap();

        let p = state.player(&player).unwrap();
        assert_eq!(4, p.resources.energy);
        assert_eq!(1, p.resources.steel);
        assert_eq!(1, state.params.oxygen);
        assert_eq!(1, p.terraform_rating); // one actual oxygen step
        assert_eq!(1, p.instance(&CardId::from("ironworks")).unwrap().plays[0]);

        // Second use this generation is refused before anything moves.
        let result = use_card_action(
            &mut state,
            &mut queue,
            &player,
            &CardId::from("ironworks"),
            0,
            None,
            None,
        );
        assert_eq!(Err(ActionError::ActionExhausted), result);
        assert_eq!(4, state.player(&player).unwrap().resources.energy);
    }

    #[test]
    fn storage_output_needs_a_valid_target_card() {
        let (mut state, player) = game_with_player();
        give_played(&mut state, &player, "symbiotic-fungus");
        state
            .player_mut(&player)
            .unwrap()
            .actions
            .push(BehaviorRef {
                card: CardId::from("symbiotic-fungus"),
                behavior: 0,
            });

        let mut queue = EventQueue::default();
        let missing = use_card_action(
            &mut state,
            &mut queue,
            &player,
            &CardId::from("symbiotic-fungus"),
            0,
            None,
            None,
        );
        assert_eq!(Err(ActionError::StorageTargetRequired), missing);

        give_played(&mut state, &player, "tardigrades");
        use_card_action(
            &mut state,
            &mut queue,
            &player,
            &CardId::from("symbiotic-fungus"),
            0,
            None,
            Some(&CardId::from("tardigrades")),
        )
        .unwrap();
        let stored = state
            .player(&player)
            .unwrap()
            .instance(&CardId::from("tardigrades"))
            .unwrap()
            .stored;
        assert_eq!(1, stored);
    }

    #[test]
    fn ocean_selection_fills_the_counter_and_grants_rating() {
        let (mut state, player) = game_with_player();
        let bus = EventBus::standard();
        state
            .player_mut(&player)
            .unwrap()
            .tile_queue
            .push_back((TileKind::Ocean, "test".into()));
        refresh_pending_tile(&mut state, &player);

        let coord = state
            .player(&player)
            .unwrap()
            .pending_tile()
            .unwrap()
            .available[0];
        let mut queue = EventQueue::default();
        select_tile(&mut state, &mut queue, &player, &coord).unwrap();
        bus.deliver(&mut state, &mut queue);

        assert_eq!(1, state.params.oceans);
        assert_eq!(1, state.player(&player).unwrap().terraform_rating);
        assert!(state.board.hex(&coord).unwrap().occupant.is_some());
        assert!(state.player(&player).unwrap().pending.is_none());
    }

    #[test]
    fn city_placement_collects_hex_bonuses() {
        let (mut state, player) = game_with_player();
        state
            .player_mut(&player)
            .unwrap()
            .tile_queue
            .push_back((TileKind::City, "test".into()));
        refresh_pending_tile(&mut state, &player);

        // Arsia Mons carries a two-plant bonus and is legal for a first city.
        let arsia = HexCoordinate::new(-4, 2);
        let available = state
            .player(&player)
            .unwrap()
            .pending_tile()
            .unwrap()
            .available
            .clone();
        assert!(available.contains(&arsia));

        let mut queue = EventQueue::default();
        select_tile(&mut state, &mut queue, &player, &arsia).unwrap();
        assert_eq!(2, state.player(&player).unwrap().resources.plants);
    }

    #[test]
    fn illegal_hex_is_rejected_without_mutation() {
        let (mut state, player) = game_with_player();
        state
            .player_mut(&player)
            .unwrap()
            .tile_queue
            .push_back((TileKind::Ocean, "test".into()));
        refresh_pending_tile(&mut state, &player);

        // (0,0) is plain land, never legal for an ocean.
        let mut queue = EventQueue::default();
        let result = select_tile(&mut state, &mut queue, &player, &HexCoordinate::new(0, 0));
        assert_eq!(
            Err(ActionError::IllegalHex(HexCoordinate::new(0, 0).to_string())),
            result
        );
        assert!(state.player(&player).unwrap().pending_tile().is_some());
        assert_eq!(0, state.params.oceans);
    }

    #[test]
    fn draws_with_nothing_to_decide_go_straight_to_hand() {
        let (mut state, player) = game_with_player();
        grant_draw(&mut state, &player, 2, 2, 0, "research").unwrap();
        let p = state.player(&player).unwrap();
        assert_eq!(2, p.hand.len());
        assert!(p.pending.is_none());
    }

    #[test]
    fn partial_draws_open_a_pending_selection() {
        let (mut state, player) = game_with_player();
        grant_draw(&mut state, &player, 4, 2, 0, "business-contacts").unwrap();
        let p = state.player(&player).unwrap();
        assert!(p.hand.is_empty());
        let draw = p.pending_card_draw().unwrap();
        assert_eq!(4, draw.cards.len());
        assert_eq!(2, draw.free_take);
        assert_eq!("business-contacts", draw.source);
    }
}
