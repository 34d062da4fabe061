//! Tile model - shapes, sides and rotation
//!
//! A tile's wiring is stored once, at rotation 0, as a [`Sides`] mask.
//! Rotating the tile shifts that mask clockwise; nothing else changes.
//!
//! | Shape      | Sides at 0 degrees |
//! |------------|--------------------|
//! | Empty      | none               |
//! | Straight   | N, S               |
//! | Corner     | N, E               |
//! | TJunction  | N, E, S            |
//! | Cross      | N, E, S, W         |
//! | Terminal   | N                  |
//! | Power      | per-instance mask  |
//!
//! # Example
//!
//! ```
//! use nets_core::tile::{Shape, Sides, Tile};
//! use nets_types::{Direction, Rotation};
//!
//! let corner = Tile::new(Shape::Corner, Rotation::R90);
//! assert!(corner.connections().has(Direction::East));
//! assert!(corner.connections().has(Direction::South));
//! assert_eq!(corner.connections().count(), 2);
//!
//! let power = Tile::power(Sides::ALL);
//! assert!(power.locked());
//! ```

use nets_types::{Direction, Rotation, TileKind};

/// Set of connected sides, one bit per [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sides(u8);

impl Sides {
    pub const NONE: Sides = Sides(0);
    pub const ALL: Sides = Sides(0x0F);

    pub fn from_bits(bits: u8) -> Self {
        Sides(bits & 0x0F)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Build from `[north, east, south, west]` flags.
    pub fn from_array(flags: [bool; 4]) -> Self {
        Direction::ALL
            .into_iter()
            .filter(|d| flags[d.index()])
            .fold(Sides::NONE, Sides::with)
    }

    pub fn to_array(self) -> [bool; 4] {
        Direction::ALL.map(|d| self.has(d))
    }

    pub fn with(self, dir: Direction) -> Self {
        Sides(self.0 | dir.bit())
    }

    pub fn has(self, dir: Direction) -> bool {
        self.0 & dir.bit() != 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.has(*d))
    }

    /// Turn the mask clockwise: after `rotation`, side `d` is set iff side
    /// `d - rotation` was set before.
    pub fn rotated(self, rotation: Rotation) -> Self {
        let turns = u32::from(rotation.quarter_turns());
        let bits = u32::from(self.0);
        Sides((((bits << turns) | (bits >> (4 - turns))) & 0x0F) as u8)
    }
}

/// What is printed on a tile, independent of its orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Empty,
    Straight,
    Corner,
    TJunction,
    Cross,
    Terminal,
    /// The single source. Carries its own side mask.
    Power(Sides),
}

impl Shape {
    pub fn kind(&self) -> TileKind {
        match self {
            Shape::Empty => TileKind::Empty,
            Shape::Straight => TileKind::Straight,
            Shape::Corner => TileKind::Corner,
            Shape::TJunction => TileKind::TJunction,
            Shape::Cross => TileKind::Cross,
            Shape::Terminal => TileKind::Terminal,
            Shape::Power(_) => TileKind::Power,
        }
    }

    /// Build a shape from its kind. `power_sides` is only read for Power.
    pub fn from_kind(kind: TileKind, power_sides: Sides) -> Self {
        match kind {
            TileKind::Empty => Shape::Empty,
            TileKind::Straight => Shape::Straight,
            TileKind::Corner => Shape::Corner,
            TileKind::TJunction => Shape::TJunction,
            TileKind::Cross => Shape::Cross,
            TileKind::Terminal => Shape::Terminal,
            TileKind::Power => Shape::Power(power_sides),
        }
    }

    /// Connected sides at rotation 0.
    pub fn base_sides(&self) -> Sides {
        match self {
            Shape::Empty => Sides::NONE,
            Shape::Straight => Sides::NONE.with(Direction::North).with(Direction::South),
            Shape::Corner => Sides::NONE.with(Direction::North).with(Direction::East),
            Shape::TJunction => Sides::NONE
                .with(Direction::North)
                .with(Direction::East)
                .with(Direction::South),
            Shape::Cross => Sides::ALL,
            Shape::Terminal => Sides::NONE.with(Direction::North),
            Shape::Power(sides) => *sides,
        }
    }

    /// Pick the shape and the lowest rotation whose connections equal `sides`.
    ///
    /// Used when wiring a spanning tree: the degree of a cell decides the
    /// shape, the position of the wires decides the rotation.
    pub fn for_sides(sides: Sides) -> (Shape, Rotation) {
        let shape = match sides.count() {
            0 => return (Shape::Empty, Rotation::R0),
            1 => Shape::Terminal,
            2 if sides.has(Direction::North) == sides.has(Direction::South) => Shape::Straight,
            2 => Shape::Corner,
            3 => Shape::TJunction,
            _ => return (Shape::Cross, Rotation::R0),
        };
        let rotation = Rotation::ALL
            .into_iter()
            .find(|r| shape.base_sides().rotated(*r) == sides)
            .unwrap_or_default();
        (shape, rotation)
    }
}

/// One cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    shape: Shape,
    rotation: Rotation,
    locked: bool,
    powered: bool,
}

impl Tile {
    /// Create an unlocked tile. Power tiles are always locked at rotation 0.
    pub fn new(shape: Shape, rotation: Rotation) -> Self {
        match shape {
            Shape::Power(sides) => Tile::power(sides),
            _ => Self {
                shape,
                rotation,
                locked: false,
                powered: false,
            },
        }
    }

    pub fn empty() -> Self {
        Tile::new(Shape::Empty, Rotation::R0)
    }

    pub fn power(sides: Sides) -> Self {
        Self {
            shape: Shape::Power(sides),
            rotation: Rotation::R0,
            locked: true,
            powered: true,
        }
    }

    /// Same tile with the lock flag replaced. Power stays locked.
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked || self.is_power();
        self
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn kind(&self) -> TileKind {
        self.shape.kind()
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn powered(&self) -> bool {
        self.powered
    }

    pub fn is_empty(&self) -> bool {
        self.shape == Shape::Empty
    }

    pub fn is_power(&self) -> bool {
        matches!(self.shape, Shape::Power(_))
    }

    pub fn is_terminal(&self) -> bool {
        self.shape == Shape::Terminal
    }

    /// Connected sides if the tile were at `rotation`.
    pub fn connections_at(&self, rotation: Rotation) -> Sides {
        self.shape.base_sides().rotated(rotation)
    }

    /// Connected sides at the current rotation.
    pub fn connections(&self) -> Sides {
        self.connections_at(self.rotation)
    }

    pub fn degree(&self) -> u32 {
        self.connections().count()
    }

    /// Returns false (and leaves the tile untouched) when locked.
    pub fn set_rotation(&mut self, rotation: Rotation) -> bool {
        if self.locked {
            return false;
        }
        self.rotation = rotation;
        true
    }

    pub fn rotate_cw(&mut self) -> bool {
        self.set_rotation(self.rotation.rotate_cw())
    }

    pub fn rotate_ccw(&mut self) -> bool {
        self.set_rotation(self.rotation.rotate_ccw())
    }

    pub(crate) fn set_powered(&mut self, powered: bool) {
        self.powered = powered;
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::empty()
    }
}
