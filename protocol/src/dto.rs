//! Personalized game projections. The server builds one [`GameDto`] per
//! receiving player: the receiver sees their own hand and pending
//! selections, every other player is reduced to public state with the
//! hand replaced by its size.

use serde::{Deserialize, Serialize};

use crate::hex::HexCoordinate;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDto {
    pub id: String,
    pub status: String,
    pub phase: String,
    pub generation: u32,
    pub max_players: u32,
    pub host_id: Option<String>,
    pub current_turn: Option<String>,
    pub global_parameters: GlobalParametersDto,
    pub board: Vec<HexDto>,
    pub players: Vec<PlayerDto>,
    pub milestones: Vec<MilestoneDto>,
    pub awards: Vec<AwardDto>,
    pub deck_size: usize,
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalParametersDto {
    pub temperature: i32,
    pub oxygen: u32,
    pub oceans: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HexDto {
    pub coordinate: HexCoordinate,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bonuses: Vec<BonusDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupant: Option<OccupantDto>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusDto {
    pub kind: String,
    pub amount: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantDto {
    pub tile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// One player as seen by the receiver. `hand` is populated only on the
/// receiver's own entry; peers carry `hand_size` alone. The same rule
/// applies to the pending selection and the tile queue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: String,
    pub name: String,
    pub connected: bool,
    pub corporation: Option<String>,
    pub terraform_rating: u32,
    pub victory_points: i32,
    pub resources: ResourcesDto,
    pub production: ResourcesDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<String>>,
    pub hand_size: usize,
    pub played_cards: Vec<PlayedCardDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_selection: Option<PendingSelectionDto>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tile_queue: Vec<String>,
}

/// Both ledgers share a shape; production credits may go negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesDto {
    pub credits: i32,
    pub steel: i32,
    pub titanium: i32,
    pub plants: i32,
    pub energy: i32,
    pub heat: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayedCardDto {
    pub card_id: String,
    pub stored_resources: u32,
    /// Per-behavior play counts for the current generation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action_plays: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum PendingSelectionDto {
    Tile {
        tile: String,
        available: Vec<HexCoordinate>,
        source: String,
    },
    CardDraw {
        cards: Vec<String>,
        free_take: u32,
        buy_limit: u32,
        price: u32,
        source: String,
    },
    Starting {
        corporations: Vec<String>,
        projects: Vec<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDto {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardDto {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funded_by: Option<String>,
}
