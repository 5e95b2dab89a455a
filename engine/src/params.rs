//! The three shared terraforming counters. Raises clamp at the declared
//! maxima and report the number of steps actually taken; terraform rating
//! is granted per actual step, never per requested step.

use serde::{Deserialize, Serialize};

pub const MIN_TEMPERATURE: i32 = -30;
pub const MAX_TEMPERATURE: i32 = 8;
/// Degrees per temperature step.
pub const TEMPERATURE_INCREMENT: i32 = 2;
pub const MAX_OXYGEN: u32 = 14;
pub const MAX_OCEANS: u32 = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalParameters {
    pub temperature: i32,
    pub oxygen: u32,
    pub oceans: u32,
}

impl Default for GlobalParameters {
    fn default() -> GlobalParameters {
        GlobalParameters {
            temperature: MIN_TEMPERATURE,
            oxygen: 0,
            oceans: 0,
        }
    }
}

impl GlobalParameters {
    /// Raises temperature by up to `steps` steps of 2 degrees and returns
    /// how many actually happened.
    pub fn raise_temperature(&mut self, steps: u32) -> u32 {
        let room = (MAX_TEMPERATURE - self.temperature) / TEMPERATURE_INCREMENT;
        let actual = steps.min(room.max(0) as u32);
        self.temperature += actual as i32 * TEMPERATURE_INCREMENT;
        actual
    }

    /// Raises oxygen by up to `steps` percent points, returns the actual count.
    pub fn raise_oxygen(&mut self, steps: u32) -> u32 {
        let actual = steps.min(MAX_OXYGEN - self.oxygen);
        self.oxygen += actual;
        actual
    }

    /// Registers one placed ocean; false once all nine cells are filled.
    pub fn place_ocean(&mut self) -> bool {
        if self.oceans >= MAX_OCEANS {
            return false;
        }
        self.oceans += 1;
        true
    }

    /// End-of-game condition: all three counters at their maximum.
    pub fn at_max(&self) -> bool {
        self.temperature >= MAX_TEMPERATURE
            && self.oxygen >= MAX_OXYGEN
            && self.oceans >= MAX_OCEANS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_clamps_and_reports_actual_steps() {
        let mut params = GlobalParameters::default();
        assert_eq!(1, params.raise_temperature(1));
        assert_eq!(-28, params.temperature);

        params.temperature = MAX_TEMPERATURE - TEMPERATURE_INCREMENT;
        assert_eq!(1, params.raise_temperature(3));
        assert_eq!(MAX_TEMPERATURE, params.temperature);
        assert_eq!(0, params.raise_temperature(1));
    }

    #[test]
    fn oxygen_raise_at_max_is_a_no_op() {
        let mut params = GlobalParameters::default();
        params.oxygen = MAX_OXYGEN;
        assert_eq!(0, params.raise_oxygen(1));
        assert_eq!(MAX_OXYGEN, params.oxygen);
    }

    #[test]
    fn game_end_needs_all_three_at_max() {
        let mut params = GlobalParameters {
            temperature: MAX_TEMPERATURE,
            oxygen: MAX_OXYGEN,
            oceans: MAX_OCEANS - 1,
        };
        assert!(!params.at_max());
        assert!(params.place_ocean());
        assert!(params.at_max());
        assert!(!params.place_ocean());
    }
}
