//! Bounded backtracking solver
//!
//! Locked and Empty tiles are fixed. The remaining cells are visited in a
//! priority order that places constrained tiles first:
//!
//! | Factor                       | Weight |
//! |------------------------------|--------|
//! | tile degree                  | x10    |
//! | border or locked neighbour   | +5     |
//! | Empty neighbour              | +2     |
//!
//! A rotation is tried only when every side agrees with fixed or already
//! placed neighbours and no wire points off the board. A full assignment is
//! accepted only if the whole board passes the win check. The step budget
//! caps the number of rotation trials.

use std::cmp::Reverse;

use nets_types::{Direction, Rotation};
use tracing::debug;

use crate::analysis;
use crate::grid::Grid;

/// Default number of rotation trials.
pub const DEFAULT_BUDGET: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Row-major rotation of every cell.
    Solved(Vec<Rotation>),
    Unsolvable,
    BudgetExhausted,
}

impl SolveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveOutcome::Solved(_) => "solved",
            SolveOutcome::Unsolvable => "unsolvable",
            SolveOutcome::BudgetExhausted => "budget_exhausted",
        }
    }
}

fn priority(grid: &Grid, fixed: &[bool], idx: usize) -> u32 {
    let mut score = grid.tile(idx).degree() * 10;
    for dir in Direction::ALL {
        score += match grid.neighbor(idx, dir) {
            None => 5,
            Some(n) if grid.tile(n).is_empty() => 2,
            Some(n) if fixed[n] => 5,
            Some(_) => 0,
        };
    }
    score
}

/// Does `rotation` at `idx` agree with every placed neighbour?
fn fits(grid: &Grid, placed: &[bool], idx: usize, rotation: Rotation) -> bool {
    let sides = grid.tile(idx).connections_at(rotation);
    Direction::ALL.into_iter().all(|dir| match grid.neighbor(idx, dir) {
        None => !sides.has(dir),
        Some(n) if placed[n] => {
            sides.has(dir) == grid.tile(n).connections().has(dir.opposite())
        }
        Some(_) => true,
    })
}

/// Two fixed tiles that disagree can never be repaired.
fn fixed_conflict(grid: &Grid, fixed: &[bool]) -> bool {
    (0..grid.len()).filter(|i| fixed[*i]).any(|idx| {
        let rotation = grid.tile(idx).rotation();
        !fits(grid, fixed, idx, rotation)
    })
}

/// Search for rotations that solve `grid`, trying at most `budget` rotations.
pub fn solve(grid: &Grid, budget: u64) -> SolveOutcome {
    let mut work = grid.clone();
    let fixed: Vec<bool> = work
        .tiles()
        .iter()
        .map(|t| t.locked() || t.is_empty())
        .collect();

    if fixed_conflict(&work, &fixed) {
        return SolveOutcome::Unsolvable;
    }

    let mut order: Vec<usize> = (0..work.len()).filter(|i| !fixed[*i]).collect();
    order.sort_by_key(|i| Reverse(priority(&work, &fixed, *i)));

    let mut placed = fixed.clone();
    let mut next_option = vec![0usize; order.len()];
    let mut depth = 0usize;
    let mut steps = 0u64;

    loop {
        if depth == order.len() {
            if analysis::analyze(&work).stats.solved {
                debug!(steps, "solver found a solution");
                return SolveOutcome::Solved(work.rotations());
            }
            if depth == 0 {
                return SolveOutcome::Unsolvable;
            }
            depth -= 1;
            placed[order[depth]] = false;
            continue;
        }

        let idx = order[depth];
        let options = work.tile(idx).kind().rotation_options();
        let mut advanced = false;
        while next_option[depth] < options.len() {
            let rotation = options[next_option[depth]];
            next_option[depth] += 1;
            steps += 1;
            if steps > budget {
                debug!(budget, "solver budget exhausted");
                return SolveOutcome::BudgetExhausted;
            }
            if fits(&work, &placed, idx, rotation) {
                work.tile_mut(idx).set_rotation(rotation);
                placed[idx] = true;
                advanced = true;
                break;
            }
        }

        if advanced {
            depth += 1;
            if depth < order.len() {
                next_option[depth] = 0;
            }
        } else {
            next_option[depth] = 0;
            if depth == 0 {
                return SolveOutcome::Unsolvable;
            }
            depth -= 1;
            placed[order[depth]] = false;
        }
    }
}
