//! The production phase: energy folds into heat, the production rows pay
//! out (terraform rating rides on the credits row), and every player gets
//! the next generation's card purchase selection.

use crate::events::{EventQueue, GameEvent};
use crate::game::{GameState, Phase};
use crate::player::{PendingCardDraw, PendingSelection};
use crate::resources::{CARD_PRICE, Resource};

/// Cards offered to each player between generations.
pub const PRODUCTION_CARD_OFFER: usize = 4;
/// Source token of the production-phase selection.
pub const PRODUCTION_SOURCE: &str = "production";

/// Runs the whole phase for every player in turn order and deals the
/// card-purchase selections. The generation advances once every player
/// has confirmed theirs.
pub fn run_production(state: &mut GameState, queue: &mut EventQueue) {
    state.phase = Phase::Production;
    state.current_turn = None;

    let order = state.turn_order.clone();
    for player_id in order {
        let offer = state.draw_cards(PRODUCTION_CARD_OFFER);
        let Ok(player) = state.player_mut(&player_id) else {
            continue;
        };

        // Energy converts before the production rows pay out.
        let energy = player.resources.energy;
        player.resources.energy = 0;
        player.resources.heat += energy;

        let credits_payout = player.production.credits + player.terraform_rating as i32;
        player.resources.adjust_saturating(Resource::Credits, credits_payout);
        for resource in [
            Resource::Steel,
            Resource::Titanium,
            Resource::Plants,
            Resource::Energy,
            Resource::Heat,
        ] {
            let amount = player.production.get(resource).max(0) as u32;
            player.resources.add(resource, amount);
        }

        player.reset_action_plays();
        if !offer.is_empty() {
            player.pending = Some(PendingSelection::CardDraw(PendingCardDraw {
                buy_limit: offer.len() as u32,
                cards: offer,
                free_take: 0,
                price: CARD_PRICE,
                source: PRODUCTION_SOURCE.to_owned(),
            }));
        }
    }

    queue.publish(GameEvent::GenerationEnded {
        generation: state.generation,
    });
    tracing::debug!(game = %state.id, generation = state.generation, "production phase run");
}

/// True while any player still has the production selection open.
pub fn production_pending(state: &GameState) -> bool {
    state.players.values().any(|player| {
        player
            .pending_card_draw()
            .is_some_and(|draw| draw.source == PRODUCTION_SOURCE)
    })
}

/// Starts the next generation: the first-player token advances one seat,
/// the pass set clears, and play returns to the action phase.
pub fn advance_generation_if_ready(state: &mut GameState) {
    if state.phase != Phase::Production || production_pending(state) {
        return;
    }
    state.generation += 1;
    state.turn_order.rotate_left(1);
    state.passed.clear();
    state.phase = Phase::Action;
    state.current_turn = state.turn_order.first().cloned();
    tracing::info!(game = %state.id, generation = state.generation, "generation advanced");
}
