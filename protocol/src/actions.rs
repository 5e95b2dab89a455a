//! The gameplay action vocabulary carried inside a `play-action` frame.
//! Payloads are a tagged union keyed by `type`; unknown types fail
//! deserialization at the boundary and never reach an orchestrator.

use serde::{Deserialize, Serialize};

/// How a card play is paid for. Steel only counts toward cards with a
/// building tag, titanium only toward cards with a space tag; heat is the
/// universal 1:1 substitute. The summed value must match the final cost
/// exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Payment {
    pub credits: u32,
    pub steel: u32,
    pub titanium: u32,
    pub heat: u32,
}

impl Payment {
    pub fn credits(credits: u32) -> Payment {
        Payment {
            credits,
            ..Payment::default()
        }
    }
}

/// One gameplay action. Every variant is validated and applied atomically
/// under the owning game's write lock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ActionRequest {
    StartGame,
    SkipAction,
    PlayCard {
        card_id: String,
        #[serde(default)]
        payment: Payment,
        #[serde(default)]
        choice_index: Option<usize>,
        #[serde(default)]
        card_storage_target: Option<String>,
    },
    UseCardAction {
        card_id: String,
        behavior_index: usize,
        #[serde(default)]
        choice_index: Option<usize>,
        #[serde(default)]
        card_storage_target: Option<String>,
    },
    /// The player's corporation action; the card id is implied.
    CorporationAction {
        behavior_index: usize,
        #[serde(default)]
        choice_index: Option<usize>,
        #[serde(default)]
        card_storage_target: Option<String>,
    },
    BuildPowerPlant,
    LaunchAsteroid,
    BuildAquifer,
    PlantGreenery,
    BuildCity,
    /// Discards the most recently drawn `card_count` hand cards for one
    /// credit each.
    SellPatents { card_count: usize },
    ConvertHeatTemperature,
    ConvertPlantsGreenery,
    ClaimMilestoneAward { name: String },
    /// Reveals `card_count` cards from the deck and opens a buy selection
    /// at the standard card price.
    BuyCards { card_count: usize },
}

impl ActionRequest {
    /// Stable label used in logs and `action-success` frames.
    pub fn label(&self) -> &'static str {
        match self {
            ActionRequest::StartGame => "start-game",
            ActionRequest::SkipAction => "skip-action",
            ActionRequest::PlayCard { .. } => "play-card",
            ActionRequest::UseCardAction { .. } => "use-card-action",
            ActionRequest::CorporationAction { .. } => "corporation-action",
            ActionRequest::BuildPowerPlant => "build-power-plant",
            ActionRequest::LaunchAsteroid => "launch-asteroid",
            ActionRequest::BuildAquifer => "build-aquifer",
            ActionRequest::PlantGreenery => "plant-greenery",
            ActionRequest::BuildCity => "build-city",
            ActionRequest::SellPatents { .. } => "sell-patents",
            ActionRequest::ConvertHeatTemperature => "convert-heat-temperature",
            ActionRequest::ConvertPlantsGreenery => "convert-plants-greenery",
            ActionRequest::ClaimMilestoneAward { .. } => "claim-milestone-award",
            ActionRequest::BuyCards { .. } => "buy-cards",
        }
    }
}
