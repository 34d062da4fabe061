//! Session tests - move engine, turns, CPU opponent

use std::fmt;

use nets::core::analysis::loose_ends;
use nets::core::generator::power_cell;
use nets::core::{EngineError, GameSnapshot, GameState, Grid, Meta, Shape, Sides, Tile};
use nets::engine::{choose_cpu_move, CpuMover, CpuStep, Session, SessionConfig};
use nets::types::{Actor, Direction, GameStatus, Move, Rotation, RotationDelta};

fn relaxed() -> SessionConfig {
    SessionConfig {
        strict_turns: false,
    }
}

/// Hand-made 2x2 board with four loose ends.
fn crooked_board() -> GameSnapshot {
    let mut grid = Grid::new(2, 2);
    grid.set(0, 0, Tile::power(Sides::NONE.with(Direction::East)));
    grid.set(0, 1, Tile::new(Shape::Corner, Rotation::R0)); // N + E
    grid.set(1, 0, Tile::new(Shape::Terminal, Rotation::R180)); // S
    grid.set(1, 1, Tile::new(Shape::Terminal, Rotation::R90)); // E
    GameSnapshot::unanalyzed(Meta::new(2, 2, 0), grid, None)
}

fn rotatable_cell(game: &GameState) -> (usize, usize) {
    let pos = game
        .grid()
        .iter()
        .find(|(_, t)| !t.locked() && !t.is_empty())
        .map(|(p, _)| p)
        .unwrap();
    (pos.row, pos.col)
}

#[test]
fn test_power_tile_is_locked() {
    let mut session = Session::with_game(SessionConfig::default(), 5, 5, 11).unwrap();
    let p = power_cell(5, 5);
    let before = session.snapshot();

    let err = session.human_move(p.row, p.col, RotationDelta::Cw).unwrap_err();
    assert_eq!(err, EngineError::Locked { row: p.row, col: p.col });
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_crooked_board_starts_with_four_loose_ends() {
    let game = GameState::from_snapshot(crooked_board()).unwrap();
    assert_eq!(game.stats().loose_ends, 4);
}

#[test]
fn test_cpu_step_never_worsens_loose_ends() {
    let mut session = Session::new(SessionConfig::default()).unwrap();
    let mut snap = crooked_board();
    snap.meta.turn = Actor::Cpu;
    session.load(snap).unwrap();

    let before = session.state().stats().loose_ends;
    let grid = session.state().grid().clone();
    let step = session.cpu_step().unwrap();
    let after = session.state().stats().loose_ends;
    assert!(after <= before);

    if after == before {
        // Equality only when no single rotation helps.
        for idx in 0..grid.len() {
            let tile = *grid.tile(idx);
            if tile.locked() {
                continue;
            }
            for rotation in Rotation::ALL {
                let mut trial = grid.clone();
                trial.tile_mut(idx).set_rotation(rotation);
                assert!(loose_ends(&trial) >= before);
            }
        }
    }
    match step {
        CpuStep::Moved(outcome) => assert_eq!(outcome.applied.actor, Actor::Cpu),
        CpuStep::Passed => panic!("crooked board has rotatable tiles"),
    }
}

#[test]
fn test_rejected_move_is_atomic() {
    let mut session = Session::with_game(SessionConfig::default(), 4, 4, 8).unwrap();
    let before = session.snapshot();

    assert_eq!(
        session.human_move(4, 0, RotationDelta::Cw).unwrap_err(),
        EngineError::OutOfBounds { row: 4, col: 0 }
    );
    assert_eq!(session.snapshot(), before);

    assert!(matches!(
        session.cpu_step().unwrap_err(),
        EngineError::NotYourTurn {
            expected: Actor::Human,
            actual: Actor::Cpu
        }
    ));
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_turns_alternate() {
    let mut session = Session::with_game(SessionConfig::default(), 4, 4, 21).unwrap();
    let (row, col) = rotatable_cell(session.state());

    let outcome = session.human_move(row, col, RotationDelta::Cw).unwrap();
    if outcome.solved() {
        return;
    }
    assert_eq!(session.state().turn(), Actor::Cpu);
    assert_eq!(session.state().last_move(), Some(outcome.applied));
    assert!(matches!(
        session.human_move(row, col, RotationDelta::Cw),
        Err(EngineError::NotYourTurn { .. })
    ));

    session.cpu_step().unwrap();
    if !session.state().is_solved() {
        assert_eq!(session.state().turn(), Actor::Human);
    }
}

#[test]
fn test_relaxed_turns_allow_consecutive_moves() {
    let mut session = Session::with_game(relaxed(), 4, 4, 21).unwrap();
    let (row, col) = rotatable_cell(session.state());
    session.human_move(row, col, RotationDelta::Cw).unwrap();
    if !session.state().is_solved() {
        session.human_move(row, col, RotationDelta::Ccw).unwrap();
    }
}

#[test]
fn test_solved_game_rejects_moves() {
    let mut session = Session::with_game(relaxed(), 3, 3, 4).unwrap();
    while let Some(hint) = session.hint() {
        if session.state().is_solved() {
            break;
        }
        session
            .human_set_rotation(hint.row, hint.col, hint.rotation)
            .unwrap();
    }
    assert!(session.state().is_solved());
    assert_eq!(session.state().status(), GameStatus::Solved);

    let before = session.snapshot();
    let (row, col) = rotatable_cell(session.state());
    assert_eq!(
        session.human_move(row, col, RotationDelta::Cw).unwrap_err(),
        EngineError::GameOver
    );
    assert_eq!(session.cpu_step().unwrap_err(), EngineError::GameOver);
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_reset_restores_the_initial_board() {
    let mut session = Session::with_game(SessionConfig::default(), 4, 4, 5).unwrap();
    let initial = session.snapshot();
    let (row, col) = rotatable_cell(session.state());
    session.human_move(row, col, RotationDelta::Cw).unwrap();
    assert_ne!(session.snapshot(), initial);

    session.reset().unwrap();
    assert_eq!(session.snapshot(), initial);
}

#[test]
fn test_failed_new_game_keeps_the_old_one() {
    let mut session = Session::with_game(SessionConfig::default(), 4, 4, 5).unwrap();
    let before = session.snapshot();
    assert_eq!(
        session.new_game(0, 3, 1).unwrap_err(),
        EngineError::GeneratorFailure { height: 0, width: 3 }
    );
    assert_eq!(session.snapshot(), before);

    assert_eq!(
        session.new_game(usize::MAX, 2, 0).unwrap_err(),
        EngineError::GeneratorFailure { height: usize::MAX, width: 2 }
    );
    assert!(session.new_game(100_000, 100_000, 0).is_err());
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_failed_load_keeps_the_old_game() {
    let mut session = Session::with_game(SessionConfig::default(), 4, 4, 5).unwrap();
    let before = session.snapshot();

    let mut bad = crooked_board();
    bad.grid.set(1, 1, Tile::power(Sides::ALL));
    assert!(matches!(
        session.load(bad),
        Err(EngineError::MalformedState(_))
    ));
    assert_eq!(session.snapshot(), before);
}

#[derive(Debug)]
struct Broken;

impl fmt::Display for Broken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("helper crashed")
    }
}

struct FailingMover;

impl CpuMover for FailingMover {
    type Error = Broken;

    fn name(&self) -> &str {
        "failing"
    }

    fn choose_move(&mut self, _snapshot: &GameSnapshot) -> Result<Option<Move>, Broken> {
        Err(Broken)
    }
}

/// Always proposes turning the Power tile.
struct PowerTwister;

impl CpuMover for PowerTwister {
    type Error = Broken;

    fn name(&self) -> &str {
        "power-twister"
    }

    fn choose_move(&mut self, snapshot: &GameSnapshot) -> Result<Option<Move>, Broken> {
        let idx = snapshot.grid.power_index().ok_or(Broken)?;
        let pos = snapshot.grid.pos(idx);
        Ok(Some(Move {
            actor: Actor::Cpu,
            row: pos.row,
            col: pos.col,
            rotation: Rotation::R90,
        }))
    }
}

#[test]
fn test_cpu_falls_back_to_greedy() {
    let expected = {
        let game = GameState::from_snapshot(crooked_board()).unwrap();
        choose_cpu_move(game.grid()).unwrap()
    };

    for mover in [&mut FailingMover as &mut dyn CpuMover<Error = Broken>, &mut PowerTwister] {
        let mut session = Session::new(relaxed()).unwrap();
        session.load(crooked_board()).unwrap();
        match session.cpu_step_with(mover).unwrap() {
            CpuStep::Moved(outcome) => {
                assert_eq!(outcome.applied.pos(), expected.pos());
                assert_eq!(outcome.applied.rotation, expected.rotation);
            }
            CpuStep::Passed => panic!("fallback should have moved"),
        }
    }
}

#[test]
fn test_cpu_passes_when_nothing_turns() {
    let mut grid = Grid::new(1, 2);
    grid.set(0, 0, Tile::power(Sides::NONE.with(Direction::East)));
    grid.set(0, 1, Tile::new(Shape::Straight, Rotation::R0).with_locked(true));
    let mut meta = Meta::new(1, 2, 0);
    meta.turn = Actor::Cpu;

    let mut session = Session::new(SessionConfig::default()).unwrap();
    session
        .load(GameSnapshot::unanalyzed(meta, grid, None))
        .unwrap();
    assert_eq!(session.cpu_step().unwrap(), CpuStep::Passed);
    assert_eq!(session.state().turn(), Actor::Human);
}
