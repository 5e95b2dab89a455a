//! Projection of [`GameState`] into the personalized wire DTO. The
//! viewer sees their own hand, pending selection, and tile queue; every
//! other player is reduced to public state with the hand replaced by its
//! size.

use protocol::dto::{
    AwardDto, BonusDto, GameDto, GlobalParametersDto, HexDto, MilestoneDto, OccupantDto,
    PendingSelectionDto, PlayedCardDto, PlayerDto, ResourcesDto,
};

use crate::board::{HexKind, PlacementBonus};
use crate::game::{AWARDS, GameState, MILESTONES};
use crate::ids::PlayerId;
use crate::player::{PendingSelection, Player};

pub fn project(state: &GameState, viewer: Option<&PlayerId>) -> GameDto {
    GameDto {
        id: state.id.clone(),
        status: state.status.label().to_owned(),
        phase: state.phase.label().to_owned(),
        generation: state.generation,
        max_players: state.max_players,
        host_id: state.host.as_ref().map(|id| id.to_string()),
        current_turn: state.current_turn.as_ref().map(|id| id.to_string()),
        global_parameters: GlobalParametersDto {
            temperature: state.params.temperature,
            oxygen: state.params.oxygen,
            oceans: state.params.oceans,
        },
        board: project_board(state),
        players: state
            .turn_order
            .iter()
            .filter_map(|id| state.players.get(id))
            .map(|player| project_player(player, viewer == Some(&player.id)))
            .collect(),
        milestones: MILESTONES
            .iter()
            .map(|name| MilestoneDto {
                name: (*name).to_owned(),
                claimed_by: state.milestones.get(*name).map(|id| id.to_string()),
            })
            .collect(),
        awards: AWARDS
            .iter()
            .map(|name| AwardDto {
                name: (*name).to_owned(),
                funded_by: state
                    .awards
                    .iter()
                    .find(|award| award.name == *name)
                    .map(|award| award.funder.to_string()),
            })
            .collect(),
        deck_size: state.deck.len(),
        created_at: state.created_at,
        updated_at: state.updated_at,
    }
}

fn project_board(state: &GameState) -> Vec<HexDto> {
    state
        .board
        .iter()
        .map(|(coord, hex)| HexDto {
            coordinate: *coord,
            kind: match hex.kind {
                HexKind::MarsLand => "mars-land",
                HexKind::MarsOceanOnly => "mars-ocean-only",
                HexKind::OffMars => "off-mars",
            }
            .to_owned(),
            name: hex.name.clone(),
            bonuses: hex
                .bonuses
                .iter()
                .map(|bonus| match bonus {
                    PlacementBonus::Resource(resource, amount) => BonusDto {
                        kind: resource.to_string(),
                        amount: *amount,
                    },
                    PlacementBonus::CardDraw(amount) => BonusDto {
                        kind: "card-draw".to_owned(),
                        amount: *amount,
                    },
                })
                .collect(),
            occupant: hex.occupant.as_ref().map(|occupant| OccupantDto {
                tile: occupant.tile.label().to_owned(),
                owner: occupant.owner.as_ref().map(|id| id.to_string()),
            }),
        })
        .collect()
}

fn project_player(player: &Player, private: bool) -> PlayerDto {
    PlayerDto {
        id: player.id.to_string(),
        name: player.name.clone(),
        connected: player.connected,
        corporation: player.corporation.as_ref().map(|id| id.to_string()),
        terraform_rating: player.terraform_rating,
        victory_points: player.victory_points,
        resources: ResourcesDto {
            credits: player.resources.credits as i32,
            steel: player.resources.steel as i32,
            titanium: player.resources.titanium as i32,
            plants: player.resources.plants as i32,
            energy: player.resources.energy as i32,
            heat: player.resources.heat as i32,
        },
        production: ResourcesDto {
            credits: player.production.credits,
            steel: player.production.steel,
            titanium: player.production.titanium,
            plants: player.production.plants,
            energy: player.production.energy,
            heat: player.production.heat,
        },
        hand: private.then(|| player.hand.iter().map(|id| id.to_string()).collect()),
        hand_size: player.hand.len(),
        played_cards: player
            .played
            .iter()
            .map(|instance| PlayedCardDto {
                card_id: instance.card.to_string(),
                stored_resources: instance.stored,
                action_plays: instance.plays.clone(),
            })
            .collect(),
        pending_selection: if private {
            player.pending.as_ref().map(project_pending)
        } else {
            None
        },
        tile_queue: if private {
            player
                .tile_queue
                .iter()
                .map(|(tile, _)| tile.label().to_owned())
                .collect()
        } else {
            Vec::new()
        },
    }
}

fn project_pending(pending: &PendingSelection) -> PendingSelectionDto {
    match pending {
        PendingSelection::Tile(selection) => PendingSelectionDto::Tile {
            tile: selection.tile.label().to_owned(),
            available: selection.available.clone(),
            source: selection.source.clone(),
        },
        PendingSelection::CardDraw(selection) => PendingSelectionDto::CardDraw {
            cards: selection.cards.iter().map(|id| id.to_string()).collect(),
            free_take: selection.free_take,
            buy_limit: selection.buy_limit,
            price: selection.price,
            source: selection.source.clone(),
        },
        PendingSelection::Starting(selection) => PendingSelectionDto::Starting {
            corporations: selection
                .corporations
                .iter()
                .map(|id| id.to_string())
                .collect(),
            projects: selection.projects.iter().map(|id| id.to_string()).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::catalog::CardCatalog;
    use crate::game::GameState;
    use crate::ids::CardId;
    use crate::player::{PendingCardDraw, PendingSelection};
    use std::sync::Arc;

    #[test]
    fn peers_see_hand_size_but_never_the_hand() {
        let mut game = GameState::new("g1".into(), 2, Arc::new(CardCatalog::standard()));
        let alice = game.join("Alice".into()).unwrap();
        let bob = game.join("Bob".into()).unwrap();
        {
            let player = game.player_mut(&alice).unwrap();
            player.hand.push(CardId::from("mine"));
            player.hand.push(CardId::from("lichen"));
            player.pending = Some(PendingSelection::CardDraw(PendingCardDraw {
                cards: vec![CardId::from("birds")],
                free_take: 0,
                buy_limit: 1,
                price: 3,
                source: "buy-cards".into(),
            }));
        }

        let for_alice = project(&game, Some(&alice));
        let own = for_alice
            .players
            .iter()
            .find(|p| p.id == alice.to_string())
            .unwrap();
        assert_eq!(Some(2), own.hand.as_ref().map(Vec::len));
        assert!(own.pending_selection.is_some());

        let for_bob = project(&game, Some(&bob));
        let peer = for_bob
            .players
            .iter()
            .find(|p| p.id == alice.to_string())
            .unwrap();
        assert!(peer.hand.is_none());
        assert_eq!(2, peer.hand_size);
        assert!(peer.pending_selection.is_none());
    }

    #[test]
    fn projection_carries_board_and_parameters() {
        let game = GameState::new("g1".into(), 2, Arc::new(CardCatalog::standard()));
        let dto = project(&game, None);
        assert_eq!("lobby", dto.status);
        assert_eq!(-30, dto.global_parameters.temperature);
        assert_eq!(63, dto.board.len()); // 61 Mars hexes + 2 off-Mars
        assert_eq!(5, dto.milestones.len());
        assert_eq!(5, dto.awards.len());
    }
}
