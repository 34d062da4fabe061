//! Serialized state document
//!
//! The JSON dictionary exchanged with the CLI, the TCP clients and CPU helper
//! processes:
//!
//! ```text
//! {
//!   "meta":  {"width", "height", "seed", "status", "turn", "wraps"},
//!   "grid":  [[{"type", "rotation", "locked", "powered", "connections"?}]],
//!   "last_move": {"actor", "row", "col", "rotation"} | null,
//!   "stats": {"components", "loose_ends", "solved"},
//!   "rules": {"allow_loops", "rotation_rules"}
//! }
//! ```
//!
//! Enum strings are written upper-case and read in any case. On input
//! `powered` and `stats` are ignored and `status` is re-derived from the
//! board; `lastMove` and `looseEnds` are accepted as aliases.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use nets_core::{EngineError, GameSnapshot, GameState, Grid, Meta, Shape, Sides, SolveOutcome, Stats, Tile};
use nets_types::{Actor, GameStatus, Move, Rotation, TileKind};

/// Enum that travels as its upper-case name.
pub trait WireName: Sized + Copy {
    const WHAT: &'static str;

    fn wire_name(&self) -> &'static str;

    fn parse(s: &str) -> Option<Self>;
}

impl WireName for GameStatus {
    const WHAT: &'static str = "status";

    fn wire_name(&self) -> &'static str {
        self.as_str()
    }

    fn parse(s: &str) -> Option<Self> {
        GameStatus::from_str(s)
    }
}

impl WireName for Actor {
    const WHAT: &'static str = "actor";

    fn wire_name(&self) -> &'static str {
        self.as_str()
    }

    fn parse(s: &str) -> Option<Self> {
        Actor::from_str(s)
    }
}

impl WireName for TileKind {
    const WHAT: &'static str = "tile type";

    fn wire_name(&self) -> &'static str {
        self.as_str()
    }

    fn parse(s: &str) -> Option<Self> {
        TileKind::from_str(s)
    }
}

mod wire_name {
    use super::*;

    pub fn serialize<T: WireName, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.wire_name())
    }

    pub fn deserialize<'de, T: WireName, D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
        let s = String::deserialize(deserializer)?;
        T::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("unknown {} {:?}", T::WHAT, s)))
    }
}

/// Rotations travel as degrees.
pub(crate) mod degrees {
    use super::*;

    pub fn serialize<S: Serializer>(rotation: &Rotation, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(rotation.degrees())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rotation, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Rotation::from_degrees(value).ok_or_else(|| {
            serde::de::Error::custom(format!("rotation {} is not one of 0, 90, 180, 270", value))
        })
    }
}

/// Accept any JSON integer as a seed; negatives keep their bit pattern.
fn any_seed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AnyInt {
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match AnyInt::deserialize(deserializer)? {
        AnyInt::Unsigned(v) => v,
        AnyInt::Signed(v) => v as u64,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaDoc {
    pub width: usize,
    pub height: usize,
    #[serde(default, deserialize_with = "any_seed")]
    pub seed: u64,
    #[serde(with = "wire_name")]
    pub status: GameStatus,
    #[serde(with = "wire_name")]
    pub turn: Actor,
    #[serde(default)]
    pub wraps: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDoc {
    #[serde(rename = "type", with = "wire_name")]
    pub kind: TileKind,
    #[serde(with = "degrees")]
    pub rotation: Rotation,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub powered: bool,
    /// Only meaningful for POWER.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<[bool; 4]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDoc {
    #[serde(with = "wire_name")]
    pub actor: Actor,
    pub row: usize,
    pub col: usize,
    #[serde(with = "degrees")]
    pub rotation: Rotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDoc {
    pub components: usize,
    #[serde(alias = "looseEnds")]
    pub loose_ends: usize,
    pub solved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesDoc {
    #[serde(default)]
    pub allow_loops: bool,
    #[serde(default)]
    pub rotation_rules: BTreeMap<String, Vec<u16>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDocument {
    pub meta: MetaDoc,
    pub grid: Vec<Vec<TileDoc>>,
    #[serde(default, alias = "lastMove")]
    pub last_move: Option<MoveDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<RulesDoc>,
}

impl From<Move> for MoveDoc {
    fn from(mv: Move) -> Self {
        Self {
            actor: mv.actor,
            row: mv.row,
            col: mv.col,
            rotation: mv.rotation,
        }
    }
}

impl From<MoveDoc> for Move {
    fn from(doc: MoveDoc) -> Self {
        Move {
            actor: doc.actor,
            row: doc.row,
            col: doc.col,
            rotation: doc.rotation,
        }
    }
}

impl From<Stats> for StatsDoc {
    fn from(stats: Stats) -> Self {
        Self {
            components: stats.components,
            loose_ends: stats.loose_ends,
            solved: stats.solved,
        }
    }
}

impl RulesDoc {
    /// The rules this engine plays by.
    pub fn standard() -> Self {
        let rotation_rules = TileKind::ALL
            .iter()
            .map(|kind| {
                let degrees = kind.rotation_options().iter().map(Rotation::degrees).collect();
                (kind.as_str().to_string(), degrees)
            })
            .collect();
        Self {
            allow_loops: false,
            rotation_rules,
        }
    }
}

impl TileDoc {
    fn from_tile(tile: &Tile) -> Self {
        let connections = match tile.shape() {
            Shape::Power(sides) => Some(sides.to_array()),
            _ => None,
        };
        Self {
            kind: tile.kind(),
            rotation: tile.rotation(),
            locked: tile.locked(),
            powered: tile.powered(),
            connections,
        }
    }

    fn into_tile(self, row: usize, col: usize) -> Result<Tile, EngineError> {
        if self.kind == TileKind::Power {
            if self.rotation != Rotation::R0 {
                return Err(EngineError::malformed(format!(
                    "POWER at ({}, {}) has rotation {}",
                    row,
                    col,
                    self.rotation.degrees()
                )));
            }
            let sides = self.connections.map(Sides::from_array).unwrap_or(Sides::ALL);
            return Ok(Tile::power(sides));
        }
        let shape = Shape::from_kind(self.kind, Sides::NONE);
        Ok(Tile::new(shape, self.rotation).with_locked(self.locked))
    }
}

impl StateDocument {
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        let meta = &snapshot.meta;
        Self {
            meta: MetaDoc {
                width: meta.width,
                height: meta.height,
                seed: meta.seed,
                status: meta.status,
                turn: meta.turn,
                wraps: meta.wraps,
            },
            grid: snapshot
                .grid
                .rows()
                .map(|row| row.iter().map(TileDoc::from_tile).collect())
                .collect(),
            last_move: snapshot.last_move.map(MoveDoc::from),
            stats: Some(snapshot.stats.into()),
            rules: Some(RulesDoc::standard()),
        }
    }

    /// Structural conversion. Stats are recomputed when the snapshot is
    /// loaded into a [`GameState`].
    pub fn into_snapshot(self) -> Result<GameSnapshot, EngineError> {
        if self.rules.as_ref().is_some_and(|r| r.allow_loops) {
            warn!("state document asks for allow_loops; loops never count as solved");
        }

        let rows = self
            .grid
            .into_iter()
            .enumerate()
            .map(|(r, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(c, tile)| tile.into_tile(r, c))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        let grid = Grid::from_rows(rows)?;

        let meta = Meta {
            height: self.meta.height,
            width: self.meta.width,
            seed: self.meta.seed,
            status: self.meta.status,
            turn: self.meta.turn,
            wraps: self.meta.wraps,
        };
        Ok(GameSnapshot::unanalyzed(
            meta,
            grid,
            self.last_move.map(Move::from),
        ))
    }

    pub fn into_state(self) -> Result<GameState, EngineError> {
        GameState::from_snapshot(self.into_snapshot()?)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn malformed_json(e: serde_json::Error) -> EngineError {
    EngineError::malformed(e.to_string())
}

/// Parse a document without loading it.
pub fn parse_document(json: &str) -> Result<StateDocument, EngineError> {
    serde_json::from_str(json).map_err(malformed_json)
}

/// Parse, validate and analyse a state document.
pub fn parse_state(json: &str) -> Result<GameState, EngineError> {
    parse_document(json)?.into_state()
}

/// Parse and validate a state document into a snapshot with fresh stats.
pub fn parse_snapshot(json: &str) -> Result<GameSnapshot, EngineError> {
    Ok(parse_state(json)?.snapshot())
}

/// Target of a CPU move as exchanged with helper processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTarget {
    pub row: usize,
    pub col: usize,
    #[serde(with = "degrees")]
    pub rotation: Rotation,
}

/// `{"move": {...}}` or `{"move": null}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReply {
    #[serde(rename = "move")]
    pub target: Option<MoveTarget>,
}

impl MoveReply {
    pub fn from_move(mv: Option<Move>) -> Self {
        Self {
            target: mv.map(|m| MoveTarget {
                row: m.row,
                col: m.col,
                rotation: m.rotation,
            }),
        }
    }

    pub fn into_move(self, actor: Actor) -> Option<Move> {
        self.target.map(|t| Move {
            actor,
            row: t.row,
            col: t.col,
            rotation: t.rotation,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationCell {
    #[serde(with = "degrees")]
    pub rotation: Rotation,
}

/// Output of the `unscramble` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscrambleReply {
    pub solved: bool,
    pub outcome: String,
    /// Solved rotations, or the unchanged board when no solution was found.
    pub grid: Vec<Vec<RotationCell>>,
}

impl UnscrambleReply {
    pub fn new(grid: &Grid, outcome: &SolveOutcome) -> Self {
        let rotations = match outcome {
            SolveOutcome::Solved(rotations) => rotations.clone(),
            _ => grid.rotations(),
        };
        let width = grid.width().max(1);
        Self {
            solved: matches!(outcome, SolveOutcome::Solved(_)),
            outcome: outcome.as_str().to_string(),
            grid: rotations
                .chunks(width)
                .map(|row| row.iter().map(|r| RotationCell { rotation: *r }).collect())
                .collect(),
        }
    }
}
