//! Board analysis - loose ends, components, power flow and loops
//!
//! Everything here is a pure function of the grid's shapes and rotations.
//! [`refresh`] is the only entry point that writes back, and it only touches
//! the per-tile `powered` flag.
//!
//! # Definitions
//!
//! - Two cells are **linked** when they are adjacent and each has a wire on
//!   the side facing the other.
//! - A **loose end** is a wire that is not linked. A wire facing the border
//!   weighs 2, a wire facing a cell that does not answer weighs 1; the board
//!   total is the weight sum divided by two. A dangling wire between two
//!   cells is therefore counted once per side. An odd sum never rounds a
//!   lone unanswered wire down to zero.
//! - A **component** is a maximal set of non-Empty cells joined by links.
//! - Current flows from Power over links; a Terminal receives current but
//!   never passes it on.
//! - The board is **solved** when it has no loose ends, exactly one
//!   component, and every non-Empty cell is powered.
//!
//! Traversals use explicit stacks so large boards cannot overflow the call
//! stack.

use nets_types::Direction;

use crate::grid::Grid;

/// Summary numbers for a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Stats {
    pub components: usize,
    pub loose_ends: usize,
    pub solved: bool,
}

/// Full result of analysing a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub stats: Stats,
    /// Row-major powered flags.
    pub powered: Vec<bool>,
    pub has_loop: bool,
}

/// Neighbour across `dir` if the two cells are linked.
pub fn linked_neighbor(grid: &Grid, idx: usize, dir: Direction) -> Option<usize> {
    if !grid.tile(idx).connections().has(dir) {
        return None;
    }
    let n = grid.neighbor(idx, dir)?;
    grid.tile(n)
        .connections()
        .has(dir.opposite())
        .then_some(n)
}

/// Weighted loose-end count of one cell.
pub fn loose_end_weight(grid: &Grid, idx: usize) -> usize {
    let sides = grid.tile(idx).connections();
    sides
        .directions()
        .map(|dir| match grid.neighbor(idx, dir) {
            None => 2,
            Some(n) if grid.tile(n).connections().has(dir.opposite()) => 0,
            Some(_) => 1,
        })
        .sum()
}

/// Sum of [`loose_end_weight`] over the whole board. Zero iff every wire is
/// reciprocated.
pub fn loose_end_weight_sum(grid: &Grid) -> usize {
    (0..grid.len()).map(|i| loose_end_weight(grid, i)).sum()
}

/// Loose-end count for a weight sum.
pub fn loose_end_count(weight_sum: usize) -> usize {
    if weight_sum == 0 {
        0
    } else {
        (weight_sum / 2).max(1)
    }
}

pub fn loose_ends(grid: &Grid) -> usize {
    loose_end_count(loose_end_weight_sum(grid))
}

/// Number of link-connected groups of non-Empty cells.
pub fn components(grid: &Grid) -> usize {
    let mut seen = vec![false; grid.len()];
    let mut count = 0;
    let mut stack = Vec::new();

    for start in 0..grid.len() {
        if seen[start] || grid.tile(start).is_empty() {
            continue;
        }
        seen[start] = true;
        stack.push(start);
        while let Some(idx) = stack.pop() {
            for dir in Direction::ALL {
                if let Some(n) = linked_neighbor(grid, idx, dir) {
                    if !seen[n] {
                        seen[n] = true;
                        stack.push(n);
                    }
                }
            }
        }
        count += 1;
    }
    count
}

/// Which cells receive current. All false when the board has no Power tile.
pub fn power_set(grid: &Grid) -> Vec<bool> {
    let mut powered = vec![false; grid.len()];
    let Some(source) = grid.power_index() else {
        return powered;
    };

    powered[source] = true;
    let mut stack = vec![source];
    while let Some(idx) = stack.pop() {
        if idx != source && grid.tile(idx).is_terminal() {
            continue;
        }
        for dir in Direction::ALL {
            if let Some(n) = linked_neighbor(grid, idx, dir) {
                if !powered[n] {
                    powered[n] = true;
                    stack.push(n);
                }
            }
        }
    }
    powered
}

fn link_count(grid: &Grid) -> usize {
    (0..grid.len())
        .map(|i| {
            [Direction::East, Direction::South]
                .into_iter()
                .filter(|d| linked_neighbor(grid, i, *d).is_some())
                .count()
        })
        .sum()
}

/// True when the link graph contains a cycle.
///
/// A forest has exactly `cells - components` links; any extra link closes a
/// loop.
pub fn has_closed_loop(grid: &Grid) -> bool {
    let cells = grid.tiles().iter().filter(|t| !t.is_empty()).count();
    link_count(grid) + components(grid) > cells
}

/// Analyse without mutating the grid.
pub fn analyze(grid: &Grid) -> Analysis {
    let components = components(grid);
    let weight_sum = loose_end_weight_sum(grid);
    let loose_ends = loose_end_count(weight_sum);
    let powered = power_set(grid);
    let all_powered = grid
        .tiles()
        .iter()
        .zip(&powered)
        .all(|(t, p)| t.is_empty() || *p);
    let has_loop = has_closed_loop(grid);

    Analysis {
        stats: Stats {
            components,
            loose_ends,
            solved: weight_sum == 0 && components == 1 && all_powered,
        },
        powered,
        has_loop,
    }
}

/// Analyse and write the powered flags back into the grid.
pub fn refresh(grid: &mut Grid) -> Analysis {
    let analysis = analyze(grid);
    grid.set_powered(&analysis.powered);
    analysis
}
