//! Puzzle generator - randomized spanning tree, then scramble
//!
//! 1. Power goes in the centre cell `(H/2, W/2)`.
//! 2. Randomized Prim grows a spanning tree from Power over the 4-grid.
//! 3. Each cell's tree degree picks its shape; the wire directions pick the
//!    rotation (see [`Shape::for_sides`]).
//! 4. Every rotatable tile gets a random rotation. The pre-scramble
//!    rotations are kept as the reference solution.
//!
//! A spanning tree is one component with no loose ends and every cell fed
//! from Power, so the reference solution always satisfies the win check.

use nets_types::{Direction, Pos, Rotation};
use tracing::debug;

use crate::analysis;
use crate::error::EngineError;
use crate::grid::Grid;
use crate::rng::SimpleRng;
use crate::tile::{Shape, Sides, Tile};

/// Scramble retries before accepting a board that is already solved.
pub const MAX_SCRAMBLE_ATTEMPTS: usize = 16;

/// Largest board the generator will build, in cells.
pub const MAX_CELLS: usize = 1 << 16;

/// A freshly generated puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    /// Scrambled board with powered flags already computed.
    pub grid: Grid,
    /// Row-major reference rotation of every cell.
    pub solution: Vec<Rotation>,
}

/// Cell that holds Power on an `height x width` board.
pub fn power_cell(height: usize, width: usize) -> Pos {
    Pos::new(height / 2, width / 2)
}

fn check_size(height: usize, width: usize) -> Result<(), EngineError> {
    match height.checked_mul(width) {
        Some(cells) if (1..=MAX_CELLS).contains(&cells) => Ok(()),
        _ => Err(EngineError::GeneratorFailure { height, width }),
    }
}

/// Wire masks of a random spanning tree rooted at `root`.
fn spanning_tree(height: usize, width: usize, root: usize, rng: &mut SimpleRng) -> Vec<Sides> {
    // Only the geometry is needed here.
    let geometry = Grid::new(height, width);
    let mut sides = vec![Sides::NONE; geometry.len()];
    let mut in_tree = vec![false; geometry.len()];
    let mut frontier: Vec<(usize, usize, Direction)> = Vec::new();

    in_tree[root] = true;
    frontier.extend(geometry.neighbors(root).map(|(d, n)| (root, n, d)));

    while !frontier.is_empty() {
        let pick = rng.next_range(frontier.len());
        let (parent, candidate, dir) = frontier.swap_remove(pick);
        if in_tree[candidate] {
            continue;
        }
        in_tree[candidate] = true;
        sides[parent] = sides[parent].with(dir);
        sides[candidate] = sides[candidate].with(dir.opposite());
        frontier.extend(
            geometry
                .neighbors(candidate)
                .filter(|(_, n)| !in_tree[*n])
                .map(|(d, n)| (candidate, n, d)),
        );
    }
    sides
}

/// Build the solved board: spanning tree wired into shapes, nothing scrambled.
pub fn build_solved(height: usize, width: usize, rng: &mut SimpleRng) -> Result<Grid, EngineError> {
    check_size(height, width)?;

    let mut grid = Grid::new(height, width);
    let centre = power_cell(height, width);
    let root = grid
        .index(centre.row, centre.col)
        .ok_or(EngineError::GeneratorFailure { height, width })?;

    let wiring = spanning_tree(height, width, root, rng);
    for (idx, mask) in wiring.into_iter().enumerate() {
        let tile = if idx == root {
            Tile::power(mask)
        } else {
            let (shape, rotation) = Shape::for_sides(mask);
            Tile::new(shape, rotation)
        };
        *grid.tile_mut(idx) = tile;
    }
    analysis::refresh(&mut grid);
    Ok(grid)
}

/// True when at least one tile has a rotation that changes its wiring.
fn has_rotatable(grid: &Grid) -> bool {
    grid.tiles()
        .iter()
        .any(|t| !t.locked() && t.kind().rotation_options().len() > 1)
}

/// Give every unlocked, non-Empty tile a random rotation.
pub fn scramble(grid: &mut Grid, rng: &mut SimpleRng) {
    for idx in 0..grid.len() {
        let tile = grid.tile_mut(idx);
        if tile.is_empty() || tile.locked() {
            continue;
        }
        let turns = rng.next_range(4) as u8;
        tile.set_rotation(Rotation::from_quarter_turns(turns));
    }
}

/// Generate a scrambled, solvable puzzle.
pub fn generate(height: usize, width: usize, seed: u64) -> Result<Puzzle, EngineError> {
    let mut rng = SimpleRng::new(seed);
    let mut grid = build_solved(height, width, &mut rng)?;
    let solution = grid.rotations();

    let mut attempts = 0;
    loop {
        scramble(&mut grid, &mut rng);
        attempts += 1;
        let analysis = analysis::refresh(&mut grid);
        if !analysis.stats.solved || !has_rotatable(&grid) || attempts >= MAX_SCRAMBLE_ATTEMPTS {
            break;
        }
    }

    debug!(height, width, seed, attempts, "generated puzzle");
    Ok(Puzzle { grid, solution })
}
