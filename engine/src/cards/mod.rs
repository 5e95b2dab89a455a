//! The declarative card schema. A card is data, never code: requirements
//! gate the play, behaviors bundle a trigger with inputs, outputs, and
//! optional choices, and the effect engine interprets the whole thing.
//! Any card conforming to this schema works without engine changes.

pub mod catalog;

use serde::{Deserialize, Serialize};

use crate::board::TileKind;
use crate::ids::CardId;
use crate::resources::Resource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardKind {
    Automated,
    Active,
    Event,
    Corporation,
    Prelude,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    Building,
    Space,
    Power,
    Science,
    Jovian,
    Earth,
    Plant,
    Microbe,
    Animal,
    City,
    Wild,
    Event,
}

/// Resources that live on a card instead of the player ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageResource {
    Microbe,
    Animal,
    Floater,
    Science,
    Asteroid,
}

/// What a requirement reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    Temperature,
    Oxygen,
    Oceans,
    TerraformRating,
    Tag(Tag),
    Production(Resource),
    Resource(Resource),
}

/// A min/max window over one metric. Requirement-lenience effects widen
/// the window before comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub metric: Metric,
    #[serde(default)]
    pub min: Option<i32>,
    #[serde(default)]
    pub max: Option<i32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    /// Runs when the card is played, or reacts to events when a
    /// condition is attached.
    Auto,
    /// Invoked explicitly by the player, once per generation.
    Manual,
}

/// Event pattern a reactive behavior waits for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerCondition {
    TilePlaced {
        tile: TileKind,
        #[serde(default)]
        own_only: bool,
    },
    TagPlayed {
        tag: Tag,
        #[serde(default)]
        own_only: bool,
    },
    TemperatureRaised,
    OxygenRaised,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub kind: TriggerKind,
    #[serde(default)]
    pub condition: Option<TriggerCondition>,
}

/// What a behavior consumes before its outputs apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Input {
    Resource { resource: Resource, amount: u32 },
    /// Spends resources stored on the card itself.
    CardResource { amount: u32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageTarget {
    #[default]
    SelfCard,
    AnyCard,
}

/// The full output vocabulary of the effect engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Output {
    Resource {
        resource: Resource,
        amount: i32,
    },
    Production {
        resource: Resource,
        amount: i32,
    },
    TerraformRating {
        amount: u32,
    },
    Temperature {
        steps: u32,
    },
    Oxygen {
        steps: u32,
    },
    /// Tile placements enqueue; oceans additionally raise the ocean
    /// counter and grant rating when the cell fills.
    Tile {
        tile: TileKind,
        #[serde(default = "default_count")]
        count: u32,
    },
    /// Reveals `count` cards; `take` of them are free, up to `buy` more
    /// may be bought at the standard price. When everything is free the
    /// cards go straight to the hand.
    DrawCards {
        count: u32,
        #[serde(default)]
        take: u32,
        #[serde(default)]
        buy: u32,
    },
    CardResource {
        resource: StorageResource,
        amount: i32,
        #[serde(default)]
        target: StorageTarget,
    },
    /// Static modifier: cheaper card plays, optionally limited to a tag.
    Discount {
        amount: u32,
        #[serde(default)]
        tag: Option<Tag>,
    },
    /// Static modifier: widens requirement windows.
    RequirementLenience {
        amount: u32,
    },
}

fn default_count() -> u32 {
    1
}

impl Output {
    /// Modifiers never run through the output pipeline; they are stored
    /// on the player and consulted during validation.
    pub fn is_static_modifier(&self) -> bool {
        matches!(
            self,
            Output::Discount { .. } | Output::RequirementLenience { .. }
        )
    }
}

/// One selectable sub-behavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Behavior {
    pub trigger: Trigger,
    #[serde(default)]
    pub inputs: Vec<Input>,
    #[serde(default)]
    pub outputs: Vec<Output>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Behavior {
    /// Immediate behaviors run on card play; reactive and static ones
    /// are stored as passive effects instead.
    pub fn is_immediate(&self) -> bool {
        self.trigger.kind == TriggerKind::Auto
            && self.trigger.condition.is_none()
            && !(self.has_only_static_outputs() && self.choices.is_empty())
    }

    pub fn is_passive(&self) -> bool {
        self.trigger.kind == TriggerKind::Auto
            && (self.trigger.condition.is_some()
                || (self.has_only_static_outputs() && self.choices.is_empty()))
    }

    fn has_only_static_outputs(&self) -> bool {
        !self.outputs.is_empty() && self.outputs.iter().all(Output::is_static_modifier)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VictoryCondition {
    Fixed { amount: i32 },
    PerTag { tag: Tag, per: u32, amount: u32 },
    PerCardResource { per: u32, amount: u32 },
    PerCity { per: u32, amount: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSpec {
    pub resource: StorageResource,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub starting: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDef {
    pub id: CardId,
    pub name: String,
    pub cost: u32,
    pub kind: CardKind,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub behaviors: Vec<Behavior>,
    #[serde(default)]
    pub victory_points: Vec<VictoryCondition>,
    #[serde(default)]
    pub storage: Option<StorageSpec>,
}

impl CardDef {
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn behavior(&self, index: usize) -> Option<&Behavior> {
        self.behaviors.get(index)
    }
}
