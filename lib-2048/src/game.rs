use std::cmp;

use log::{info, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    direction::Direction,
    logic::{self, Shift},
    Grid, GridError,
};

const INITIAL_TILES: usize = 2;

#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid direction ({dx}, {dy}): exactly one component must be 1 or -1")]
    InvalidDirection { dx: i32, dy: i32 },
    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Active,
    Over,
}

/// What a single call to [`Game::apply_move`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Turn {
    pub moved: bool,
    pub score_delta: u64,
    /// Tile placed after the move, as `(col, row, value)`.
    pub spawned: Option<(usize, usize, u32)>,
    pub phase: Phase,
}

/// One session of the game: the grid, the running score and the best score seen so far.
#[derive(Clone, Debug)]
pub struct Game<R> {
    grid: Grid,
    score: u64,
    high_score: u64,
    phase: Phase,
    rng: R,
}

impl Game<ChaCha8Rng> {
    /// Reproducible game driven by a ChaCha8 stream seeded with `seed`.
    pub fn seeded(seed: u64, high_score: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed), high_score)
    }

    pub fn from_entropy(high_score: u64) -> Self {
        Self::new(ChaCha8Rng::from_entropy(), high_score)
    }
}

impl<R> Game<R>
where
    R: Rng,
{
    /// Starts a session on an empty grid with two spawned tiles.
    pub fn new(rng: R, high_score: u64) -> Self {
        let mut game = Self {
            grid: Grid::EMPTY,
            score: 0,
            high_score,
            phase: Phase::Active,
            rng,
        };

        game.spawn_initial_tiles();

        game
    }

    /// Resumes play from an arbitrary grid with a zero score. The phase is derived from the grid.
    pub fn from_grid(grid: Grid, rng: R, high_score: u64) -> Self {
        let phase = if logic::has_legal_move(&grid) {
            Phase::Active
        } else {
            Phase::Over
        };

        Self {
            grid,
            score: 0,
            high_score,
            phase,
            rng,
        }
    }

    fn spawn_initial_tiles(&mut self) {
        for _ in 0..INITIAL_TILES {
            logic::spawn_tile(&mut self.rng, &mut self.grid);
        }
    }

    /// Replaces the grid with a fresh one. The high score is kept.
    pub fn restart(&mut self) {
        info!(
            "restarting after score {} (high score {})",
            self.score, self.high_score
        );

        self.grid = Grid::EMPTY;
        self.score = 0;
        self.phase = Phase::Active;

        self.spawn_initial_tiles();
    }

    pub fn apply_move(&mut self, direction: Direction) -> Turn {
        if self.phase == Phase::Over {
            return Turn {
                moved: false,
                score_delta: 0,
                spawned: None,
                phase: Phase::Over,
            };
        }

        let Shift { grid, score, moved } = logic::shift(&self.grid, direction);

        trace!("{direction:?}: moved {moved}, +{score}");

        let spawned = if moved {
            self.grid = grid;
            self.score = self.score.saturating_add(score);
            self.high_score = cmp::max(self.high_score, self.score);

            logic::spawn_tile(&mut self.rng, &mut self.grid)
        } else {
            None
        };

        if !logic::has_legal_move(&self.grid) {
            self.phase = Phase::Over;

            info!(
                "game over with score {} (largest tile {})\n{}",
                self.score,
                self.grid.max_tile(),
                self.grid
            );
        }

        Turn {
            moved,
            score_delta: score,
            spawned,
            phase: self.phase,
        }
    }

    /// Like [`Game::apply_move`], for callers holding a raw `(dx, dy)` vector.
    pub fn apply_vector(&mut self, dx: i32, dy: i32) -> Result<Turn, GameError> {
        let direction = Direction::try_from((dx, dy))?;

        Ok(self.apply_move(direction))
    }
}

impl<R> Game<R> {
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, col: usize, row: usize) -> Result<u32, GameError> {
        Ok(self.grid.get(col, row)?)
    }

    pub const fn score(&self) -> u64 {
        self.score
    }

    pub const fn high_score(&self) -> u64 {
        self.high_score
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAX_TILE, N};

    fn game_from(rows: [[u32; N]; N]) -> Game<ChaCha8Rng> {
        Game::from_grid(
            Grid::from_rows(rows).unwrap(),
            ChaCha8Rng::seed_from_u64(5),
            0,
        )
    }

    #[test]
    fn new_game_has_two_tiles() {
        let game = Game::seeded(1, 0);

        assert_eq!(game.grid().count_empty(), N * N - 2);
        assert_eq!(game.score(), 0);
        assert_eq!(game.phase(), Phase::Active);
        assert!(game
            .grid()
            .cells()
            .all(|(_, _, value)| matches!(value, 0 | 2 | 4)));
    }

    #[test]
    fn same_seed_same_game() {
        let mut a = Game::seeded(42, 0);
        let mut b = Game::seeded(42, 0);

        for direction in (0..10).flat_map(|_| Direction::iter()) {
            assert_eq!(a.apply_move(direction), b.apply_move(direction));
        }

        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn merging_move_scores_and_spawns() {
        let mut game = game_from([[2, 2, 4, 0], [0; N], [0; N], [0; N]]);

        let turn = game.apply_move(Direction::Left);

        assert!(turn.moved);
        assert_eq!(turn.score_delta, 4);
        assert_eq!(game.score(), 4);
        assert_eq!(game.high_score(), 4);
        assert_eq!(&game.grid().rows()[0][..2], &[4, 4]);

        let (col, row, value) = turn.spawned.unwrap();
        assert_eq!(game.cell(col, row), Ok(value));
        assert_eq!(game.grid().count_empty(), N * N - 3);
    }

    #[test]
    fn no_op_move_changes_nothing() {
        let mut game = game_from([[2, 4, 0, 0], [0; N], [0; N], [0; N]]);
        let before = *game.grid();

        let turn = game.apply_move(Direction::Left);

        assert!(!turn.moved);
        assert_eq!(turn.spawned, None);
        assert_eq!(*game.grid(), before);
        assert_eq!(game.score(), 0);
        assert_eq!(game.phase(), Phase::Active);
    }

    #[test]
    fn move_that_fills_the_board_ends_the_game() {
        // Sliding the last row right leaves a single gap; whatever spawns there has no match.
        let mut game = game_from([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [8, 4, 2, 4],
            [8, 16, 8, 0],
        ]);
        assert_eq!(game.phase(), Phase::Active);

        let turn = game.apply_move(Direction::Right);

        assert!(turn.moved);
        assert_eq!(turn.spawned.map(|(col, row, _)| (col, row)), Some((0, 3)));
        assert_eq!(turn.phase, Phase::Over);
        assert!(game.is_over());
    }

    #[test]
    fn moves_are_ignored_once_over() {
        let mut game = game_from([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert_eq!(game.phase(), Phase::Over);
        let before = *game.grid();

        for direction in Direction::iter() {
            let turn = game.apply_move(direction);
            assert!(!turn.moved);
            assert_eq!(turn.phase, Phase::Over);
        }

        assert_eq!(*game.grid(), before);
    }

    #[test]
    fn restart_keeps_high_score() {
        let mut game = Game::from_grid(
            Grid::from_rows([[64, 64, 0, 0], [0; N], [0; N], [0; N]]).unwrap(),
            ChaCha8Rng::seed_from_u64(9),
            100,
        );

        game.apply_move(Direction::Right);
        assert_eq!(game.score(), 128);
        assert_eq!(game.high_score(), 128);

        game.restart();

        assert_eq!(game.score(), 0);
        assert_eq!(game.high_score(), 128);
        assert_eq!(game.phase(), Phase::Active);
        assert_eq!(game.grid().count_empty(), N * N - 2);
    }

    #[test]
    fn initial_high_score_is_not_lowered() {
        let mut game = Game::from_grid(
            Grid::from_rows([[2, 2, 0, 0], [0; N], [0; N], [0; N]]).unwrap(),
            ChaCha8Rng::seed_from_u64(0),
            500,
        );

        game.apply_move(Direction::Left);

        assert_eq!(game.score(), 4);
        assert_eq!(game.high_score(), 500);
    }

    #[test]
    fn large_merges_keep_scoring() {
        let half = MAX_TILE / 2;
        let mut game = Game::from_grid(
            Grid::from_rows([[half, half, 0, 0], [half, half, 0, 0], [0; N], [0; N]]).unwrap(),
            ChaCha8Rng::seed_from_u64(4),
            u64::from(u32::MAX),
        );

        let turn = game.apply_move(Direction::Left);

        assert_eq!(turn.score_delta, 2 * u64::from(MAX_TILE));
        assert_eq!(game.cell(0, 0), Ok(MAX_TILE));
        assert_eq!(game.high_score(), u64::from(u32::MAX));

        // The two largest tiles now stack vertically and cannot combine.
        game.apply_move(Direction::Up);
        assert_eq!(game.score(), 2 * u64::from(MAX_TILE));
        assert_eq!(game.grid().max_tile(), MAX_TILE);
        assert!(game.high_score() >= game.score());
    }

    #[test]
    fn raw_vectors() {
        let mut game = game_from([[0, 0, 0, 2], [0; N], [0; N], [0; N]]);

        assert_eq!(
            game.apply_vector(1, 1),
            Err(GameError::InvalidDirection { dx: 1, dy: 1 })
        );
        assert_eq!(
            game.apply_vector(0, 0),
            Err(GameError::InvalidDirection { dx: 0, dy: 0 })
        );

        let turn = game.apply_vector(-1, 0).unwrap();
        assert!(turn.moved);
        assert_eq!(game.cell(0, 0), Ok(2));
    }

    #[test]
    fn cell_out_of_range() {
        let game = Game::seeded(0, 0);

        assert_eq!(
            game.cell(N, 0),
            Err(GameError::Grid(GridError::IndexOutOfRange { col: N, row: 0 }))
        );
    }
}
