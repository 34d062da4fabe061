//! CPU opponent.
//!
//! The greedy mover tries every other rotation of every rotatable tile and
//! keeps the one with the fewest loose ends afterwards. Ties go to the
//! lowest row, then the lowest column, then the smallest rotation.
//!
//! A trial only changes one tile, so its effect on the loose-end total is
//! confined to that tile and its four neighbours; the scan scores trials by
//! that local difference instead of re-walking the whole board.

use std::convert::Infallible;
use std::fmt::Display;

use nets_core::analysis::{loose_end_count, loose_end_weight, loose_end_weight_sum};
use nets_core::{GameSnapshot, Grid};
use nets_types::{Actor, Move, Rotation};

/// Something that can pick the CPU's next move.
pub trait CpuMover {
    type Error: Display;

    fn name(&self) -> &str;

    /// `Ok(None)` means the mover found nothing to rotate.
    fn choose_move(&mut self, snapshot: &GameSnapshot) -> Result<Option<Move>, Self::Error>;
}

/// Built-in one-ply greedy mover.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyMover;

impl CpuMover for GreedyMover {
    type Error = Infallible;

    fn name(&self) -> &str {
        "greedy"
    }

    fn choose_move(&mut self, snapshot: &GameSnapshot) -> Result<Option<Move>, Infallible> {
        Ok(choose_cpu_move(&snapshot.grid))
    }
}

/// Sum of loose-end weights over a tile and its neighbours.
fn local_weight(grid: &Grid, idx: usize) -> usize {
    loose_end_weight(grid, idx)
        + grid
            .neighbors(idx)
            .map(|(_, n)| loose_end_weight(grid, n))
            .sum::<usize>()
}

/// Best single rotation for the CPU, or `None` if nothing can turn.
pub fn choose_cpu_move(grid: &Grid) -> Option<Move> {
    let mut scratch = grid.clone();
    let base = loose_end_weight_sum(grid);
    let mut best: Option<(usize, usize, Rotation)> = None;

    for idx in 0..scratch.len() {
        let tile = *scratch.tile(idx);
        if tile.locked() || tile.is_empty() {
            continue;
        }
        let current = tile.rotation();
        let before = local_weight(&scratch, idx);

        for rotation in Rotation::ALL {
            if rotation == current {
                continue;
            }
            scratch.tile_mut(idx).set_rotation(rotation);
            let total = base - before + local_weight(&scratch, idx);
            let score = loose_end_count(total);
            if best.map_or(true, |(s, _, _)| score < s) {
                best = Some((score, idx, rotation));
            }
        }
        scratch.tile_mut(idx).set_rotation(current);
    }

    best.map(|(_, idx, rotation)| {
        let pos = grid.pos(idx);
        Move {
            actor: Actor::Cpu,
            row: pos.row,
            col: pos.col,
            rotation,
        }
    })
}
