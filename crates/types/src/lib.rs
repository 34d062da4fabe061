//! Core types module - shared vocabulary for the wire puzzle
//!
//! This crate defines the small value types used throughout the workspace.
//! All types are plain data with no external dependencies, so they can be
//! shared by the engine, the boundary adapters and the CLI alike.
//!
//! # Coordinates
//!
//! Cells are addressed as `(row, col)` with `row` growing downwards (south)
//! and `col` growing to the right (east). The grid never wraps.
//!
//! | Direction | Index | Delta (row, col) |
//! |-----------|-------|------------------|
//! | `North`   | 0     | (-1, 0)          |
//! | `East`    | 1     | (0, +1)          |
//! | `South`   | 2     | (+1, 0)          |
//! | `West`    | 3     | (0, -1)          |
//!
//! # Rotations
//!
//! Tiles turn clockwise in quarter steps: 0, 90, 180, 270 degrees.
//!
//! # Examples
//!
//! ```
//! use nets_types::{Direction, Rotation, RotationDelta, TileKind};
//!
//! assert_eq!(Direction::North.opposite(), Direction::South);
//! assert_eq!(Rotation::R270.rotate_cw(), Rotation::R0);
//! assert_eq!(Rotation::R0.apply(RotationDelta::Ccw), Rotation::R270);
//! assert_eq!(TileKind::from_str("t_junction"), Some(TileKind::TJunction));
//! ```

/// Default board height used when a caller does not ask for one.
pub const DEFAULT_HEIGHT: usize = 5;

/// Default board width used when a caller does not ask for one.
pub const DEFAULT_WIDTH: usize = 5;

/// One of the four sides of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions in canonical N, E, S, W order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Position in the canonical order (N=0, E=1, S=2, W=3).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Direction::index`]; the index is taken modulo 4.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// The side facing this one across a shared edge.
    ///
    /// ```
    /// use nets_types::Direction;
    ///
    /// assert_eq!(Direction::East.opposite(), Direction::West);
    /// assert_eq!(Direction::South.opposite(), Direction::North);
    /// ```
    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Row/column step towards the neighbour on this side.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    /// Single-bit mask for this side (N=1, E=2, S=4, W=8).
    pub fn bit(self) -> u8 {
        1 << self.index()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
        }
    }
}

/// Clockwise orientation of a tile.
///
/// The cycle goes: R0 → R90 → R180 → R270 → R0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// All rotations in ascending degree order.
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use nets_types::Rotation;
    ///
    /// assert_eq!(Rotation::R0.rotate_cw(), Rotation::R90);
    /// assert_eq!(Rotation::R90.rotate_cw(), Rotation::R180);
    /// assert_eq!(Rotation::R180.rotate_cw(), Rotation::R270);
    /// assert_eq!(Rotation::R270.rotate_cw(), Rotation::R0);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::R0 => Rotation::R90,
            Rotation::R90 => Rotation::R180,
            Rotation::R180 => Rotation::R270,
            Rotation::R270 => Rotation::R0,
        }
    }

    /// Rotate counter-clockwise (-90° or 270°)
    ///
    /// # Examples
    ///
    /// ```
    /// use nets_types::Rotation;
    ///
    /// assert_eq!(Rotation::R0.rotate_ccw(), Rotation::R270);
    /// assert_eq!(Rotation::R270.rotate_ccw(), Rotation::R180);
    /// assert_eq!(Rotation::R180.rotate_ccw(), Rotation::R90);
    /// assert_eq!(Rotation::R90.rotate_ccw(), Rotation::R0);
    /// ```
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::R0 => Rotation::R270,
            Rotation::R270 => Rotation::R180,
            Rotation::R180 => Rotation::R90,
            Rotation::R90 => Rotation::R0,
        }
    }

    /// Apply a relative quarter turn.
    pub fn apply(&self, delta: RotationDelta) -> Self {
        match delta {
            RotationDelta::Cw => self.rotate_cw(),
            RotationDelta::Ccw => self.rotate_ccw(),
        }
    }

    /// Number of clockwise quarter turns from R0 (0..=3).
    pub fn quarter_turns(&self) -> u8 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    /// Build from a quarter-turn count; the count is taken modulo 4.
    pub fn from_quarter_turns(turns: u8) -> Self {
        Self::ALL[(turns % 4) as usize]
    }

    pub fn degrees(&self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// Parse an exact rotation in degrees.
    ///
    /// Only 0, 90, 180 and 270 are accepted; anything else (including 360 or
    /// negative values) yields `None`.
    ///
    /// ```
    /// use nets_types::Rotation;
    ///
    /// assert_eq!(Rotation::from_degrees(180), Some(Rotation::R180));
    /// assert_eq!(Rotation::from_degrees(45), None);
    /// assert_eq!(Rotation::from_degrees(360), None);
    /// ```
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::R0),
            90 => Some(Rotation::R90),
            180 => Some(Rotation::R180),
            270 => Some(Rotation::R270),
            _ => None,
        }
    }
}

/// A relative quarter turn requested by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDelta {
    /// +90°
    Cw,
    /// -90°
    Ccw,
}

impl RotationDelta {
    pub fn degrees(&self) -> i16 {
        match self {
            RotationDelta::Cw => 90,
            RotationDelta::Ccw => -90,
        }
    }

    /// Parse `+90` / `-90`. Any other value yields `None`.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees {
            90 => Some(RotationDelta::Cw),
            -90 => Some(RotationDelta::Ccw),
            _ => None,
        }
    }
}

/// Who is acting on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    Human,
    Cpu,
}

impl Actor {
    /// The actor whose turn follows this one.
    pub fn other(&self) -> Self {
        match self {
            Actor::Human => Actor::Cpu,
            Actor::Cpu => Actor::Human,
        }
    }

    /// Parse actor from string (case-insensitive)
    ///
    /// ```
    /// use nets_types::Actor;
    ///
    /// assert_eq!(Actor::from_str("human"), Some(Actor::Human));
    /// assert_eq!(Actor::from_str("CPU"), Some(Actor::Cpu));
    /// assert_eq!(Actor::from_str("bot"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "HUMAN" => Some(Actor::Human),
            "CPU" => Some(Actor::Cpu),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Actor::Human => "HUMAN",
            Actor::Cpu => "CPU",
        }
    }
}

/// Lifecycle of a game. `Solved` is terminal until a new game starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Playing,
    Solved,
}

impl GameStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PLAYING" => Some(GameStatus::Playing),
            "SOLVED" => Some(GameStatus::Solved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Playing => "PLAYING",
            GameStatus::Solved => "SOLVED",
        }
    }
}

/// Geometric class of a cell's contents, without any per-tile data.
///
/// The wire names match the serialized state format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileKind {
    Empty,
    Straight,
    Corner,
    TJunction,
    Cross,
    /// A computer terminal ("PC"): a single-sided sink.
    Terminal,
    /// The power source.
    Power,
}

impl TileKind {
    pub const ALL: [TileKind; 7] = [
        TileKind::Empty,
        TileKind::Straight,
        TileKind::Corner,
        TileKind::TJunction,
        TileKind::Cross,
        TileKind::Terminal,
        TileKind::Power,
    ];

    /// Parse tile kind from its wire name (case-insensitive)
    ///
    /// `TERMINAL` is accepted as an alias of `PC`.
    ///
    /// ```
    /// use nets_types::TileKind;
    ///
    /// assert_eq!(TileKind::from_str("PC"), Some(TileKind::Terminal));
    /// assert_eq!(TileKind::from_str("terminal"), Some(TileKind::Terminal));
    /// assert_eq!(TileKind::from_str("ELBOW"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "EMPTY" => Some(TileKind::Empty),
            "STRAIGHT" => Some(TileKind::Straight),
            "CORNER" => Some(TileKind::Corner),
            "T_JUNCTION" => Some(TileKind::TJunction),
            "CROSS" => Some(TileKind::Cross),
            "PC" | "TERMINAL" => Some(TileKind::Terminal),
            "POWER" => Some(TileKind::Power),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TileKind::Empty => "EMPTY",
            TileKind::Straight => "STRAIGHT",
            TileKind::Corner => "CORNER",
            TileKind::TJunction => "T_JUNCTION",
            TileKind::Cross => "CROSS",
            TileKind::Terminal => "PC",
            TileKind::Power => "POWER",
        }
    }

    /// Rotations that produce pairwise distinct connection sets.
    ///
    /// Straight is symmetric under 180°, Cross and Empty under any turn, and
    /// Power never rotates.
    pub fn rotation_options(&self) -> &'static [Rotation] {
        match self {
            TileKind::Empty | TileKind::Cross | TileKind::Power => &[Rotation::R0],
            TileKind::Straight => &[Rotation::R0, Rotation::R90],
            TileKind::Corner | TileKind::TJunction | TileKind::Terminal => &Rotation::ALL,
        }
    }
}

/// A cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A rotation applied to one tile, recorded with the actor that made it.
///
/// `rotation` is always the absolute rotation after the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub actor: Actor,
    pub row: usize,
    pub col: usize,
    pub rotation: Rotation,
}

impl Move {
    pub fn pos(&self) -> Pos {
        Pos::new(self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_indices_follow_canonical_order() {
        for (i, d) in Direction::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
            assert_eq!(Direction::from_index(i), *d);
            assert_eq!(d.opposite().index(), (i + 2) % 4);
        }
    }

    #[test]
    fn direction_deltas_point_at_neighbours() {
        assert_eq!(Direction::North.delta(), (-1, 0));
        assert_eq!(Direction::East.delta(), (0, 1));
        assert_eq!(Direction::South.delta(), (1, 0));
        assert_eq!(Direction::West.delta(), (0, -1));
    }

    #[test]
    fn rotation_four_cw_turns_is_identity() {
        for r in Rotation::ALL {
            assert_eq!(r.rotate_cw().rotate_cw().rotate_cw().rotate_cw(), r);
            assert_eq!(r.rotate_cw().rotate_ccw(), r);
        }
    }

    #[test]
    fn rotation_degrees_roundtrip() {
        for r in Rotation::ALL {
            assert_eq!(Rotation::from_degrees(r.degrees() as i64), Some(r));
        }
        assert_eq!(Rotation::from_degrees(-90), None);
    }

    #[test]
    fn delta_parses_only_quarter_turns() {
        assert_eq!(RotationDelta::from_degrees(90), Some(RotationDelta::Cw));
        assert_eq!(RotationDelta::from_degrees(-90), Some(RotationDelta::Ccw));
        assert_eq!(RotationDelta::from_degrees(180), None);
    }

    #[test]
    fn tile_kind_wire_names_roundtrip() {
        for kind in TileKind::ALL {
            assert_eq!(TileKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn actor_other_alternates() {
        assert_eq!(Actor::Human.other(), Actor::Cpu);
        assert_eq!(Actor::Cpu.other(), Actor::Human);
    }
}
