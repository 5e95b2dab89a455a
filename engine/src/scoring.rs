//! End-of-game victory point accounting: terraform rating, card
//! conditions, board presence, milestones, and awards.

use std::collections::BTreeMap;

use crate::board::TileKind;
use crate::cards::VictoryCondition;
use crate::game::{GameState, MILESTONE_VP};
use crate::ids::PlayerId;

const AWARD_FIRST_VP: i32 = 5;
const AWARD_SECOND_VP: i32 = 2;

/// Full victory point total for one player, computed from scratch.
pub fn total_victory_points(state: &GameState, player_id: &PlayerId) -> i32 {
    let Ok(player) = state.player(player_id) else {
        return 0;
    };
    let catalog = &state.catalog;
    let mut total = player.terraform_rating as i32;

    for instance in &player.played {
        let Some(def) = catalog.get(&instance.card) else {
            continue;
        };
        for condition in &def.victory_points {
            total += match *condition {
                VictoryCondition::Fixed { amount } => amount,
                VictoryCondition::PerTag { tag, per, amount } => {
                    (player.tag_count(catalog, tag) / per.max(1)) as i32 * amount as i32
                }
                VictoryCondition::PerCardResource { per, amount } => {
                    (instance.stored / per.max(1)) as i32 * amount as i32
                }
                VictoryCondition::PerCity { per, amount } => {
                    let cities = state
                        .players
                        .keys()
                        .map(|p| state.board.count_tiles(p, Some(TileKind::City)))
                        .sum::<usize>();
                    (cities / per.max(1) as usize) as i32 * amount as i32
                }
            };
        }
    }

    // One point per greenery, one per greenery adjacent to each own city.
    total += state.board.count_tiles(player_id, Some(TileKind::Greenery)) as i32;
    total += state
        .board
        .tiles_of(player_id)
        .filter(|(_, occupant)| occupant.tile == TileKind::City)
        .map(|(coord, _)| state.board.adjacent_greeneries(coord) as i32)
        .sum::<i32>();

    total += state
        .milestones
        .values()
        .filter(|claimant| *claimant == player_id)
        .count() as i32
        * MILESTONE_VP;

    total += award_points(state).get(player_id).copied().unwrap_or(0);
    total
}

/// Scores every funded award: 5 points to the leader, 2 to the runner-up.
fn award_points(state: &GameState) -> BTreeMap<PlayerId, i32> {
    let mut points: BTreeMap<PlayerId, i32> = BTreeMap::new();
    for award in &state.awards {
        let mut standings: Vec<(PlayerId, i64)> = state
            .players
            .values()
            .map(|player| (player.id.clone(), award_metric(state, &player.id, &award.name)))
            .collect();
        standings.sort_by(|a, b| b.1.cmp(&a.1));
        if let Some((leader, best)) = standings.first().cloned() {
            if best > 0 {
                *points.entry(leader).or_default() += AWARD_FIRST_VP;
            }
            if let Some((second, value)) = standings.get(1).cloned() {
                if value > 0 && value < best {
                    *points.entry(second).or_default() += AWARD_SECOND_VP;
                }
            }
        }
    }
    points
}

fn award_metric(state: &GameState, player_id: &PlayerId, award: &str) -> i64 {
    let Ok(player) = state.player(player_id) else {
        return 0;
    };
    match award {
        "landlord" => state.board.count_tiles(player_id, None) as i64,
        "banker" => player.production.credits as i64,
        "scientist" => player.tag_count(&state.catalog, crate::cards::Tag::Science) as i64,
        "thermalist" => player.resources.heat as i64,
        "miner" => (player.resources.steel + player.resources.titanium) as i64,
        _ => 0,
    }
}

/// Writes the final totals onto every player record.
pub fn finalize(state: &mut GameState) {
    let totals: Vec<(PlayerId, i32)> = state
        .players
        .keys()
        .cloned()
        .map(|id| {
            let total = total_victory_points(state, &id);
            (id, total)
        })
        .collect();
    for (id, total) in totals {
        if let Some(player) = state.players.get_mut(&id) {
            player.victory_points = total;
        }
    }
}
