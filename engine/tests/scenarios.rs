//! End-to-end rule scenarios driven through the action orchestrators,
//! the same entry points the message router uses.

use std::sync::Arc;

use engine::actions;
use engine::board::TileKind;
use engine::cards::catalog::CardCatalog;
use engine::error::ActionError;
use engine::events::EventBus;
use engine::game::{GameState, GameStatus, Phase};
use engine::ids::{CardId, PlayerId};
use engine::player::PendingSelection;
use protocol::actions::{ActionRequest, Payment};

fn new_game() -> (GameState, EventBus, PlayerId, PlayerId) {
    let mut game = GameState::new("g1".into(), 2, Arc::new(CardCatalog::standard()));
    let alice = game.join("Alice".into()).unwrap();
    let bob = game.join("Bob".into()).unwrap();
    (game, EventBus::standard(), alice, bob)
}

/// Skips the starting-card ceremony for tests that exercise the action
/// phase directly.
fn force_action_phase(game: &mut GameState) {
    game.status = GameStatus::Active;
    game.phase = Phase::Action;
    game.current_turn = game.turn_order.first().cloned();
    for player in game.players.values_mut() {
        player.pending = None;
        player.terraform_rating = 20;
    }
}

fn give_credits(game: &mut GameState, player: &PlayerId, amount: u32) {
    game.player_mut(player).unwrap().resources.credits += amount;
}

#[test]
fn join_and_start_deals_starting_pools() {
    let (mut game, bus, alice, bob) = new_game();
    assert_eq!(Some(alice.clone()), game.host);

    // Only the host may start.
    assert_eq!(
        Err(ActionError::NotHost),
        actions::dispatch(&mut game, &bus, &bob, &ActionRequest::StartGame)
    );

    actions::dispatch(&mut game, &bus, &alice, &ActionRequest::StartGame).unwrap();
    assert_eq!(GameStatus::Active, game.status);
    assert_eq!(Phase::StartingCardSelection, game.phase);

    for id in [&alice, &bob] {
        let Some(PendingSelection::Starting(pool)) = &game.player(id).unwrap().pending else {
            panic!("no starting pool for {}", id);
        };
        assert_eq!(2, pool.corporations.len());
        assert_eq!(10, pool.projects.len());
    }
}

#[test]
fn starting_selection_installs_the_corporation_and_buys_projects() {
    let (mut game, bus, alice, bob) = new_game();
    actions::dispatch(&mut game, &bus, &alice, &ActionRequest::StartGame).unwrap();

    let (corp, projects) = {
        let Some(PendingSelection::Starting(pool)) = &game.player(&alice).unwrap().pending
        else {
            panic!("no pool");
        };
        (pool.corporations[0].clone(), pool.projects[..2].to_vec())
    };
    let mut picks: Vec<String> = vec![corp.to_string()];
    picks.extend(projects.iter().map(|id| id.to_string()));
    actions::select_starting_cards(&mut game, &bus, &alice, &picks).unwrap();

    let player = game.player(&alice).unwrap();
    assert_eq!(Some(corp.clone()), player.corporation);
    assert_eq!(20, player.terraform_rating);
    assert_eq!(2, player.hand.len());
    assert!(player.instance(&corp).is_some());
    // Grant minus two bought projects at three credits each.
    assert!(player.resources.credits >= 30);
    // Still waiting on Bob.
    assert_eq!(Phase::StartingCardSelection, game.phase);

    let picks: Vec<String> = {
        let Some(PendingSelection::Starting(pool)) = &game.player(&bob).unwrap().pending else {
            panic!("no pool");
        };
        vec![pool.corporations[0].to_string()]
    };
    actions::select_starting_cards(&mut game, &bus, &bob, &picks).unwrap();

    assert_eq!(Phase::Action, game.phase);
    assert_eq!(Some(alice.clone()), game.current_turn);
}

#[test]
fn convert_heat_raises_temperature_one_step() {
    let (mut game, bus, alice, _bob) = new_game();
    force_action_phase(&mut game);
    game.player_mut(&alice).unwrap().resources.heat = 8;

    actions::dispatch(&mut game, &bus, &alice, &ActionRequest::ConvertHeatTemperature).unwrap();

    let player = game.player(&alice).unwrap();
    assert_eq!(0, player.resources.heat);
    assert_eq!(-28, game.params.temperature);
    assert_eq!(21, player.terraform_rating);
}

#[test]
fn convert_plants_at_max_oxygen_places_greenery_without_rating() {
    let (mut game, bus, alice, _bob) = new_game();
    force_action_phase(&mut game);
    game.params.oxygen = 14;
    game.player_mut(&alice).unwrap().resources.plants = 8;
    game.player_mut(&alice).unwrap().terraform_rating = 30;

    actions::dispatch(&mut game, &bus, &alice, &ActionRequest::ConvertPlantsGreenery).unwrap();
    let coordinate = {
        let player = game.player(&alice).unwrap();
        assert_eq!(0, player.resources.plants);
        player.pending_tile().unwrap().available[0]
    };
    actions::select_tile(&mut game, &bus, &alice, &coordinate).unwrap();

    let player = game.player(&alice).unwrap();
    assert_eq!(14, game.params.oxygen);
    assert_eq!(30, player.terraform_rating);
    let occupant = game.board.hex(&coordinate).unwrap().occupant.as_ref().unwrap();
    assert_eq!(TileKind::Greenery, occupant.tile);
    assert_eq!(Some(alice.clone()), occupant.owner);
}

#[test]
fn greenery_below_max_oxygen_grants_the_step_and_rating() {
    let (mut game, bus, alice, _bob) = new_game();
    force_action_phase(&mut game);
    game.player_mut(&alice).unwrap().resources.plants = 8;

    actions::dispatch(&mut game, &bus, &alice, &ActionRequest::ConvertPlantsGreenery).unwrap();
    let coordinate = game.player(&alice).unwrap().pending_tile().unwrap().available[0];
    actions::select_tile(&mut game, &bus, &alice, &coordinate).unwrap();

    assert_eq!(1, game.params.oxygen);
    assert_eq!(21, game.player(&alice).unwrap().terraform_rating);
}

#[test]
fn play_card_with_choice_applies_the_selected_branch() {
    let (mut game, bus, alice, _bob) = new_game();
    force_action_phase(&mut game);
    game.player_mut(&alice)
        .unwrap()
        .hand
        .push(CardId::from("cargo-rockets"));
    give_credits(&mut game, &alice, 3);

    actions::dispatch(
        &mut game,
        &bus,
        &alice,
        &ActionRequest::PlayCard {
            card_id: "cargo-rockets".into(),
            payment: Payment::credits(3),
            choice_index: Some(1),
            card_storage_target: None,
        },
    )
    .unwrap();

    let player = game.player(&alice).unwrap();
    assert_eq!(2, player.resources.plants);
    assert_eq!(0, player.resources.steel);
    assert!(player.instance(&CardId::from("cargo-rockets")).is_some());
}

#[test]
fn skipping_through_production_advances_the_generation() {
    let (mut game, bus, alice, bob) = new_game();
    force_action_phase(&mut game);
    {
        let player = game.player_mut(&alice).unwrap();
        player.resources.energy = 3;
        player.production.credits = 2;
    }

    actions::dispatch(&mut game, &bus, &alice, &ActionRequest::SkipAction).unwrap();
    assert_eq!(Some(bob.clone()), game.current_turn);
    actions::dispatch(&mut game, &bus, &bob, &ActionRequest::SkipAction).unwrap();

    assert_eq!(Phase::Production, game.phase);
    {
        let player = game.player(&alice).unwrap();
        // Energy folded into heat, credits paid production + rating.
        assert_eq!(0, player.resources.energy);
        assert_eq!(3, player.resources.heat);
        assert_eq!(22, player.resources.credits);
        let draw = player.pending_card_draw().unwrap();
        assert_eq!("production", draw.source);
        assert_eq!(4, draw.cards.len());
    }

    actions::confirm_production_cards(&mut game, &bus, &alice, &[]).unwrap();
    assert_eq!(Phase::Production, game.phase);
    actions::confirm_production_cards(&mut game, &bus, &bob, &[]).unwrap();

    assert_eq!(2, game.generation);
    assert_eq!(Phase::Action, game.phase);
    assert_eq!(game.turn_order.first().cloned(), game.current_turn);
    assert!(game.passed.is_empty());
}

#[test]
fn production_purchase_costs_three_per_card() {
    let (mut game, bus, alice, bob) = new_game();
    force_action_phase(&mut game);
    actions::dispatch(&mut game, &bus, &alice, &ActionRequest::SkipAction).unwrap();
    actions::dispatch(&mut game, &bus, &bob, &ActionRequest::SkipAction).unwrap();

    let (wanted, credits_before) = {
        let player = game.player(&alice).unwrap();
        (
            player.pending_card_draw().unwrap().cards[0].to_string(),
            player.resources.credits,
        )
    };
    actions::confirm_production_cards(&mut game, &bus, &alice, &[wanted.clone()]).unwrap();

    let player = game.player(&alice).unwrap();
    assert_eq!(credits_before - 3, player.resources.credits);
    assert!(player.has_in_hand(&CardId::from(wanted.as_str())));
}

#[test]
fn rating_follows_actual_steps_not_requested_ones() {
    let (mut game, bus, alice, _bob) = new_game();
    force_action_phase(&mut game);
    game.params.temperature = 6; // one step of headroom
    game.player_mut(&alice)
        .unwrap()
        .hand
        .push(CardId::from("big-asteroid"));
    give_credits(&mut game, &alice, 27);

    actions::dispatch(
        &mut game,
        &bus,
        &alice,
        &ActionRequest::PlayCard {
            card_id: "big-asteroid".into(),
            payment: Payment::credits(27),
            choice_index: None,
            card_storage_target: None,
        },
    )
    .unwrap();

    assert_eq!(8, game.params.temperature);
    // 20 base + 1 actual step, despite the card asking for two.
    assert_eq!(21, game.player(&alice).unwrap().terraform_rating);
    assert_eq!(4, game.player(&alice).unwrap().resources.titanium);
}

#[test]
fn reactive_effect_fires_before_the_action_returns() {
    let (mut game, bus, alice, _bob) = new_game();
    force_action_phase(&mut game);
    game.player_mut(&alice)
        .unwrap()
        .hand
        .push(CardId::from("rover-construction"));
    give_credits(&mut game, &alice, 8 + 25);

    actions::dispatch(
        &mut game,
        &bus,
        &alice,
        &ActionRequest::PlayCard {
            card_id: "rover-construction".into(),
            payment: Payment::credits(8),
            choice_index: None,
            card_storage_target: None,
        },
    )
    .unwrap();

    actions::dispatch(&mut game, &bus, &alice, &ActionRequest::BuildCity).unwrap();
    let coordinate = game.player(&alice).unwrap().pending_tile().unwrap().available[0];
    actions::select_tile(&mut game, &bus, &alice, &coordinate).unwrap();

    // City placed, and the rover effect paid out its two credits.
    assert_eq!(2, game.player(&alice).unwrap().resources.credits);
    assert_eq!(1, game.player(&alice).unwrap().production.credits);
}

#[test]
fn standard_projects_check_credits_and_turn() {
    let (mut game, bus, alice, bob) = new_game();
    force_action_phase(&mut game);
    give_credits(&mut game, &alice, 11);

    assert_eq!(
        Err(ActionError::NotYourTurn),
        actions::dispatch(&mut game, &bus, &bob, &ActionRequest::BuildPowerPlant)
    );
    assert_eq!(
        Err(ActionError::InsufficientResources(
            engine::resources::Resource::Credits
        )),
        actions::dispatch(&mut game, &bus, &alice, &ActionRequest::BuildCity)
    );

    actions::dispatch(&mut game, &bus, &alice, &ActionRequest::BuildPowerPlant).unwrap();
    let player = game.player(&alice).unwrap();
    assert_eq!(0, player.resources.credits);
    assert_eq!(1, player.production.energy);
}

#[test]
fn sell_patents_discards_for_credits() {
    let (mut game, bus, alice, _bob) = new_game();
    force_action_phase(&mut game);
    {
        let player = game.player_mut(&alice).unwrap();
        player.hand.push(CardId::from("mine"));
        player.hand.push(CardId::from("lichen"));
    }

    actions::dispatch(
        &mut game,
        &bus,
        &alice,
        &ActionRequest::SellPatents { card_count: 2 },
    )
    .unwrap();

    let player = game.player(&alice).unwrap();
    assert!(player.hand.is_empty());
    assert_eq!(2, player.resources.credits);
    assert_eq!(2, game.discard.len());
}

#[test]
fn buy_cards_opens_a_selection_resolved_by_confirm() {
    let (mut game, bus, alice, _bob) = new_game();
    force_action_phase(&mut game);
    give_credits(&mut game, &alice, 6);

    actions::dispatch(
        &mut game,
        &bus,
        &alice,
        &ActionRequest::BuyCards { card_count: 2 },
    )
    .unwrap();
    let offered = game
        .player(&alice)
        .unwrap()
        .pending_card_draw()
        .unwrap()
        .cards
        .clone();
    assert_eq!(2, offered.len());

    let buy = vec![offered[0].to_string()];
    actions::confirm_card_draw(&mut game, &bus, &alice, &[], &buy).unwrap();

    let player = game.player(&alice).unwrap();
    assert_eq!(3, player.resources.credits);
    assert!(player.has_in_hand(&offered[0]));
    assert!(player.pending.is_none());
    assert!(game.discard.contains(&offered[1]));
}

#[test]
fn milestone_claim_requires_threshold_and_is_exclusive() {
    let (mut game, bus, alice, bob) = new_game();
    force_action_phase(&mut game);
    give_credits(&mut game, &alice, 16);

    // TR 20 misses the terraformer threshold.
    assert!(matches!(
        actions::dispatch(
            &mut game,
            &bus,
            &alice,
            &ActionRequest::ClaimMilestoneAward {
                name: "terraformer".into()
            }
        ),
        Err(ActionError::RequirementNotMet(_))
    ));

    game.player_mut(&alice).unwrap().terraform_rating = 35;
    actions::dispatch(
        &mut game,
        &bus,
        &alice,
        &ActionRequest::ClaimMilestoneAward {
            name: "terraformer".into(),
        },
    )
    .unwrap();
    let player = game.player(&alice).unwrap();
    assert_eq!(5, player.victory_points);
    assert_eq!(8, player.resources.credits);

    // Taken milestones stay taken, also for other players.
    game.current_turn = Some(bob.clone());
    game.player_mut(&bob).unwrap().terraform_rating = 40;
    give_credits(&mut game, &bob, 8);
    assert!(matches!(
        actions::dispatch(
            &mut game,
            &bus,
            &bob,
            &ActionRequest::ClaimMilestoneAward {
                name: "terraformer".into()
            }
        ),
        Err(ActionError::MilestoneUnavailable(_))
    ));
}

#[test]
fn pending_tile_survives_a_reconnect() {
    let (mut game, bus, alice, _bob) = new_game();
    force_action_phase(&mut game);
    game.player_mut(&alice).unwrap().resources.plants = 8;
    actions::dispatch(&mut game, &bus, &alice, &ActionRequest::ConvertPlantsGreenery).unwrap();

    let before = game.player(&alice).unwrap().pending_tile().unwrap().clone();

    // The connection drops and a new one reclaims the identity; game
    // state is untouched by either transition.
    game.player_mut(&alice).unwrap().connected = false;
    game.player_mut(&alice).unwrap().connected = true;

    let after = game.player(&alice).unwrap().pending_tile().unwrap().clone();
    assert_eq!(before, after);

    actions::select_tile(&mut game, &bus, &alice, &before.available[0]).unwrap();
    assert!(game.player(&alice).unwrap().pending.is_none());
}

#[test]
fn actions_are_refused_while_a_selection_is_open() {
    let (mut game, bus, alice, _bob) = new_game();
    force_action_phase(&mut game);
    game.player_mut(&alice).unwrap().resources.plants = 16;
    actions::dispatch(&mut game, &bus, &alice, &ActionRequest::ConvertPlantsGreenery).unwrap();

    assert_eq!(
        Err(ActionError::SelectionPending),
        actions::dispatch(&mut game, &bus, &alice, &ActionRequest::ConvertPlantsGreenery)
    );
}
