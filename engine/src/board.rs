//! The hex board: static hex kinds and placement bonuses, mutable
//! occupancy, and the placement-legality rules per tile kind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use protocol::hex::HexCoordinate;

use crate::ids::PlayerId;
use crate::resources::Resource;

/// The one hex where a city may sit next to other cities.
pub const NOCTIS_NAME: &str = "Noctis City";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HexKind {
    MarsLand,
    MarsOceanOnly,
    OffMars,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileKind {
    City,
    Greenery,
    Ocean,
}

impl TileKind {
    pub fn label(&self) -> &'static str {
        match self {
            TileKind::City => "city",
            TileKind::Greenery => "greenery",
            TileKind::Ocean => "ocean",
        }
    }
}

/// Bonus granted when a city or greenery lands on the hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementBonus {
    Resource(Resource, u32),
    CardDraw(u32),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub tile: TileKind,
    /// Oceans are unowned.
    pub owner: Option<PlayerId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hex {
    pub kind: HexKind,
    pub name: Option<String>,
    pub bonuses: Vec<PlacementBonus>,
    pub occupant: Option<Occupant>,
}

impl Hex {
    fn land() -> Hex {
        Hex {
            kind: HexKind::MarsLand,
            name: None,
            bonuses: vec![],
            occupant: None,
        }
    }

    fn land_with(bonuses: Vec<PlacementBonus>) -> Hex {
        Hex {
            bonuses,
            ..Hex::land()
        }
    }

    fn named_land(name: &str, bonuses: Vec<PlacementBonus>) -> Hex {
        Hex {
            name: Some(name.to_owned()),
            bonuses,
            ..Hex::land()
        }
    }

    fn ocean_reserved() -> Hex {
        Hex {
            kind: HexKind::MarsOceanOnly,
            ..Hex::land()
        }
    }

    fn off_mars(name: &str) -> Hex {
        Hex {
            kind: HexKind::OffMars,
            name: Some(name.to_owned()),
            ..Hex::land()
        }
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    hexes: BTreeMap<HexCoordinate, Hex>,
}

impl Board {
    /// The standard map: a radius-4 hexagon of 61 Mars hexes (nine of
    /// them reserved for oceans) plus the two off-Mars city locations.
    pub fn standard() -> Board {
        let oceans: &[(i32, i32)] = &[
            (2, -4),
            (3, -4),
            (4, -4),
            (3, -2),
            (4, -2),
            (4, -1),
            (2, 0),
            (3, 0),
            (4, 0),
        ];
        let mut hexes = BTreeMap::new();
        for q in -4..=4i32 {
            for r in -4..=4i32 {
                let coord = HexCoordinate::new(q, r);
                if coord.radius() > 4 {
                    continue;
                }
                let hex = if oceans.contains(&(q, r)) {
                    Hex::ocean_reserved()
                } else {
                    match (q, r) {
                        (-4, 2) => Hex::named_land(
                            "Arsia Mons",
                            vec![PlacementBonus::Resource(Resource::Plants, 2)],
                        ),
                        (-3, 2) => Hex::named_land(
                            "Pavonis Mons",
                            vec![
                                PlacementBonus::Resource(Resource::Plants, 1),
                                PlacementBonus::Resource(Resource::Titanium, 1),
                            ],
                        ),
                        (-3, 1) => Hex::named_land("Ascraeus Mons", vec![PlacementBonus::CardDraw(1)]),
                        (-2, 0) => Hex::named_land(
                            NOCTIS_NAME,
                            vec![PlacementBonus::Resource(Resource::Plants, 2)],
                        ),
                        (-4, 0) | (0, -2) => {
                            Hex::land_with(vec![PlacementBonus::Resource(Resource::Steel, 2)])
                        }
                        (-1, -2) | (-3, 3) | (0, 4) => {
                            Hex::land_with(vec![PlacementBonus::Resource(Resource::Steel, 1)])
                        }
                        (2, -3) => Hex::land_with(vec![PlacementBonus::Resource(Resource::Titanium, 1)]),
                        (4, -3) => Hex::land_with(vec![PlacementBonus::Resource(Resource::Titanium, 2)]),
                        (1, 2) => Hex::land_with(vec![PlacementBonus::CardDraw(1)]),
                        (0, 2) | (-1, 3) | (1, 1) => {
                            Hex::land_with(vec![PlacementBonus::Resource(Resource::Plants, 2)])
                        }
                        (q, r) if r >= 1 && q + r <= 3 => {
                            Hex::land_with(vec![PlacementBonus::Resource(Resource::Plants, 1)])
                        }
                        _ => Hex::land(),
                    }
                };
                hexes.insert(coord, hex);
            }
        }
        hexes.insert(HexCoordinate::new(7, -4), Hex::off_mars("Phobos Space Haven"));
        hexes.insert(HexCoordinate::new(8, -4), Hex::off_mars("Ganymede Colony"));
        Board { hexes }
    }

    pub fn hex(&self, coord: &HexCoordinate) -> Option<&Hex> {
        self.hexes.get(coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HexCoordinate, &Hex)> {
        self.hexes.iter()
    }

    /// Places an occupant; false when the hex does not exist or is taken.
    pub fn place(&mut self, coord: &HexCoordinate, occupant: Occupant) -> bool {
        match self.hexes.get_mut(coord) {
            Some(hex) if hex.is_free() => {
                hex.occupant = Some(occupant);
                true
            }
            _ => false,
        }
    }

    fn has_adjacent_city(&self, coord: &HexCoordinate) -> bool {
        coord.neighbors().iter().any(|n| {
            self.hexes
                .get(n)
                .and_then(|hex| hex.occupant.as_ref())
                .is_some_and(|o| o.tile == TileKind::City)
        })
    }

    fn is_adjacent_to_player(&self, coord: &HexCoordinate, player: &PlayerId) -> bool {
        coord.neighbors().iter().any(|n| {
            self.hexes
                .get(n)
                .and_then(|hex| hex.occupant.as_ref())
                .is_some_and(|o| o.owner.as_ref() == Some(player))
        })
    }

    /// Enumerates the hexes where `player` may currently place `tile`.
    ///
    /// Greeneries prefer hexes adjacent to the player's existing tiles and
    /// fall back to any free land; oceans stay on the reserved cells;
    /// cities avoid other cities except on the Noctis hex and off Mars.
    pub fn legal_hexes(&self, tile: TileKind, player: &PlayerId) -> Vec<HexCoordinate> {
        let free_land = || {
            self.hexes
                .iter()
                .filter(|(_, hex)| hex.kind == HexKind::MarsLand && hex.is_free())
        };
        match tile {
            TileKind::Ocean => self
                .hexes
                .iter()
                .filter(|(_, hex)| hex.kind == HexKind::MarsOceanOnly && hex.is_free())
                .map(|(coord, _)| *coord)
                .collect(),
            TileKind::Greenery => {
                let adjacent: Vec<HexCoordinate> = free_land()
                    .filter(|(coord, _)| self.is_adjacent_to_player(coord, player))
                    .map(|(coord, _)| *coord)
                    .collect();
                if !adjacent.is_empty() {
                    return adjacent;
                }
                free_land().map(|(coord, _)| *coord).collect()
            }
            TileKind::City => self
                .hexes
                .iter()
                .filter(|(coord, hex)| {
                    hex.is_free()
                        && match hex.kind {
                            HexKind::OffMars => true,
                            HexKind::MarsLand => {
                                hex.name.as_deref() == Some(NOCTIS_NAME)
                                    || !self.has_adjacent_city(coord)
                            }
                            HexKind::MarsOceanOnly => false,
                        }
                })
                .map(|(coord, _)| *coord)
                .collect(),
        }
    }

    pub fn tiles_of(&self, player: &PlayerId) -> impl Iterator<Item = (&HexCoordinate, &Occupant)> {
        self.hexes.iter().filter_map(move |(coord, hex)| {
            hex.occupant
                .as_ref()
                .filter(|o| o.owner.as_ref() == Some(player))
                .map(|o| (coord, o))
        })
    }

    pub fn count_tiles(&self, player: &PlayerId, tile: Option<TileKind>) -> usize {
        self.tiles_of(player)
            .filter(|(_, o)| tile.is_none_or(|t| o.tile == t))
            .count()
    }

    /// Greeneries adjacent to the given hex, for city scoring.
    pub fn adjacent_greeneries(&self, coord: &HexCoordinate) -> usize {
        coord
            .neighbors()
            .iter()
            .filter(|n| {
                self.hexes
                    .get(n)
                    .and_then(|hex| hex.occupant.as_ref())
                    .is_some_and(|o| o.tile == TileKind::Greenery)
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> PlayerId {
        PlayerId::from("alice")
    }

    #[test]
    fn standard_board_has_61_mars_hexes_and_9_ocean_cells() {
        let board = Board::standard();
        let mars = board
            .iter()
            .filter(|(_, hex)| hex.kind != HexKind::OffMars)
            .count();
        let oceans = board
            .iter()
            .filter(|(_, hex)| hex.kind == HexKind::MarsOceanOnly)
            .count();
        assert_eq!(61, mars);
        assert_eq!(9, oceans);
    }

    #[test]
    fn oceans_are_restricted_to_reserved_cells() {
        let board = Board::standard();
        for coord in board.legal_hexes(TileKind::Ocean, &alice()) {
            assert_eq!(HexKind::MarsOceanOnly, board.hex(&coord).unwrap().kind);
        }
    }

    #[test]
    fn cities_avoid_each_other_except_noctis() {
        let mut board = Board::standard();
        let spot = HexCoordinate::new(0, 0);
        assert!(board.place(
            &spot,
            Occupant {
                tile: TileKind::City,
                owner: Some(alice()),
            }
        ));
        let legal = board.legal_hexes(TileKind::City, &alice());
        for neighbor in spot.neighbors() {
            if board
                .hex(&neighbor)
                .is_some_and(|h| h.name.as_deref() == Some(NOCTIS_NAME))
            {
                assert!(legal.contains(&neighbor));
            } else {
                assert!(!legal.contains(&neighbor));
            }
        }
    }

    #[test]
    fn greenery_prefers_own_adjacency() {
        let mut board = Board::standard();
        let spot = HexCoordinate::new(0, 0);
        board.place(
            &spot,
            Occupant {
                tile: TileKind::City,
                owner: Some(alice()),
            },
        );
        let legal = board.legal_hexes(TileKind::Greenery, &alice());
        assert!(!legal.is_empty());
        for coord in &legal {
            assert!(board.is_adjacent_to_player(coord, &alice()));
        }

        // A player with no tiles may go anywhere on free land.
        let bob = PlayerId::from("bob");
        let open = board.legal_hexes(TileKind::Greenery, &bob);
        assert!(open.len() > legal.len());
    }

    #[test]
    fn occupied_hexes_cannot_be_reused() {
        let mut board = Board::standard();
        let spot = HexCoordinate::new(1, -1);
        assert!(board.place(
            &spot,
            Occupant {
                tile: TileKind::Greenery,
                owner: Some(alice()),
            }
        ));
        assert!(!board.place(
            &spot,
            Occupant {
                tile: TileKind::City,
                owner: Some(alice()),
            }
        ));
    }
}
