//! Cube coordinates for the hex board.
//!
//! All points satisfy q + r + s = 0. Diagram at:
//! https://www.redblobgames.com/grids/hexagons/

use serde::{Deserialize, Serialize};
use std::fmt;

/// One hex address in cube coordinates.
///
/// Deserialization does not enforce the cube invariant; callers at the wire
/// boundary must check [`HexCoordinate::is_valid`] and reject bad frames.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct HexCoordinate {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

impl HexCoordinate {
    pub fn new(q: i32, r: i32) -> HexCoordinate {
        HexCoordinate { q, r, s: -(q + r) }
    }

    /// True when the cube invariant q + r + s = 0 holds.
    pub fn is_valid(&self) -> bool {
        self.q + self.r + self.s == 0
    }

    /// The six adjacent hexes.
    pub fn neighbors(&self) -> [HexCoordinate; 6] {
        [
            HexCoordinate::new(self.q + 1, self.r),
            HexCoordinate::new(self.q + 1, self.r - 1),
            HexCoordinate::new(self.q, self.r - 1),
            HexCoordinate::new(self.q - 1, self.r),
            HexCoordinate::new(self.q - 1, self.r + 1),
            HexCoordinate::new(self.q, self.r + 1),
        ]
    }

    /// Distance from the board center, in hexes.
    pub fn radius(&self) -> i32 {
        self.q.abs().max(self.r.abs()).max(self.s.abs())
    }
}

impl fmt::Display for HexCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.q, self.r, self.s)
    }
}
