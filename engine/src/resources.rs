//! The six resource kinds and the per-player ledgers for stock and
//! production. All stock values are non-negative; production rows are
//! non-negative too except credits, which may sink to −5.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Floor of the credits production row.
pub const CREDITS_PRODUCTION_FLOOR: i32 = -5;
/// Value of one steel toward a building-tag card.
pub const STEEL_VALUE: u32 = 2;
/// Value of one titanium toward a space-tag card.
pub const TITANIUM_VALUE: u32 = 3;
/// Price of buying one card, in credits.
pub const CARD_PRICE: u32 = 3;
/// Heat needed for one temperature step.
pub const HEAT_CONVERSION_COST: u32 = 8;
/// Plants needed for one greenery.
pub const PLANT_CONVERSION_COST: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Credits,
    Steel,
    Titanium,
    Plants,
    Energy,
    Heat,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Credits,
        Resource::Steel,
        Resource::Titanium,
        Resource::Plants,
        Resource::Energy,
        Resource::Heat,
    ];
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Credits => "credits",
            Resource::Steel => "steel",
            Resource::Titanium => "titanium",
            Resource::Plants => "plants",
            Resource::Energy => "energy",
            Resource::Heat => "heat",
        };
        f.write_str(name)
    }
}

/// Stock of the six resources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    pub credits: u32,
    pub steel: u32,
    pub titanium: u32,
    pub plants: u32,
    pub energy: u32,
    pub heat: u32,
}

impl ResourceLedger {
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Credits => self.credits,
            Resource::Steel => self.steel,
            Resource::Titanium => self.titanium,
            Resource::Plants => self.plants,
            Resource::Energy => self.energy,
            Resource::Heat => self.heat,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Credits => &mut self.credits,
            Resource::Steel => &mut self.steel,
            Resource::Titanium => &mut self.titanium,
            Resource::Plants => &mut self.plants,
            Resource::Energy => &mut self.energy,
            Resource::Heat => &mut self.heat,
        }
    }

    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Removes `amount`, refusing to go below zero. Returns false and
    /// leaves the ledger untouched when the stock does not cover it.
    pub fn deduct(&mut self, resource: Resource, amount: u32) -> bool {
        let slot = self.slot(resource);
        if *slot < amount {
            return false;
        }
        *slot -= amount;
        true
    }

    /// Signed adjustment used by card outputs; negative deltas clamp at
    /// zero rather than fail, losses on stock are allowed by the rules.
    pub fn adjust_saturating(&mut self, resource: Resource, delta: i32) {
        let slot = self.slot(resource);
        if delta >= 0 {
            *slot += delta as u32;
        } else {
            *slot = slot.saturating_sub(delta.unsigned_abs());
        }
    }
}

/// Production rows. Kept signed throughout so the credits row can dip
/// below zero; the non-credits floors are enforced in [`ProductionLedger::adjust`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionLedger {
    pub credits: i32,
    pub steel: i32,
    pub titanium: i32,
    pub plants: i32,
    pub energy: i32,
    pub heat: i32,
}

impl ProductionLedger {
    pub fn get(&self, resource: Resource) -> i32 {
        match resource {
            Resource::Credits => self.credits,
            Resource::Steel => self.steel,
            Resource::Titanium => self.titanium,
            Resource::Plants => self.plants,
            Resource::Energy => self.energy,
            Resource::Heat => self.heat,
        }
    }

    fn floor(resource: Resource) -> i32 {
        match resource {
            Resource::Credits => CREDITS_PRODUCTION_FLOOR,
            _ => 0,
        }
    }

    /// Applies a signed delta, failing without mutation when the row would
    /// fall through its floor.
    pub fn adjust(&mut self, resource: Resource, delta: i32) -> bool {
        let slot = match resource {
            Resource::Credits => &mut self.credits,
            Resource::Steel => &mut self.steel,
            Resource::Titanium => &mut self.titanium,
            Resource::Plants => &mut self.plants,
            Resource::Energy => &mut self.energy,
            Resource::Heat => &mut self.heat,
        };
        let next = *slot + delta;
        if next < Self::floor(resource) {
            return false;
        }
        *slot = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduct_refuses_overdraft() {
        let mut ledger = ResourceLedger::default();
        ledger.add(Resource::Steel, 3);
        assert!(!ledger.deduct(Resource::Steel, 4));
        assert_eq!(3, ledger.steel);
        assert!(ledger.deduct(Resource::Steel, 3));
        assert_eq!(0, ledger.steel);
    }

    #[test]
    fn credits_production_floors_at_minus_five() {
        let mut production = ProductionLedger::default();
        assert!(production.adjust(Resource::Credits, -5));
        assert!(!production.adjust(Resource::Credits, -1));
        assert_eq!(-5, production.credits);
    }

    #[test]
    fn other_production_floors_at_zero() {
        let mut production = ProductionLedger::default();
        assert!(production.adjust(Resource::Energy, 2));
        assert!(!production.adjust(Resource::Energy, -3));
        assert_eq!(2, production.energy);
    }

    #[test]
    fn saturating_adjust_clamps_losses() {
        let mut ledger = ResourceLedger::default();
        ledger.add(Resource::Plants, 2);
        ledger.adjust_saturating(Resource::Plants, -5);
        assert_eq!(0, ledger.plants);
    }
}
