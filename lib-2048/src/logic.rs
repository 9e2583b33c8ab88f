use log::debug;
use rand::Rng;

use crate::{direction::Direction, Grid, MAX_TILE, N};

const MOVE_FUNCTIONS: [fn(Grid) -> (Grid, u64); 4] = [move_up, move_down, move_right, move_left];

const NEIGHBOUR_OFFSETS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Outcome of sliding every tile of a grid in one direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shift {
    pub grid: Grid,
    pub score: u64,
    pub moved: bool,
}

/// Slides the tiles of `row` towards index 0, merging equal neighbours. A tile produced by a
/// merge does not merge again in the same pass, and tiles at [`MAX_TILE`] never merge. Returns
/// the new row and the sum of the merged tile values.
pub fn compress_row(row: [u32; N]) -> ([u32; N], u64) {
    let mut new_row = [0; N];
    let mut score = 0;
    let mut len = 0;
    let mut can_merge = false;

    for tile in row.into_iter().filter(|&tile| tile != 0) {
        if can_merge && new_row[len - 1] == tile && tile < MAX_TILE {
            new_row[len - 1] = tile * 2;
            score += u64::from(tile) * 2;
            can_merge = false;
        } else {
            new_row[len] = tile;
            len += 1;
            can_merge = true;
        }
    }

    (new_row, score)
}

pub fn do_move(grid: Grid) -> (Grid, u64) {
    let mut score = 0;

    let grid = grid.map_rows(|row| {
        let (new_row, row_score) = compress_row(row);
        score += row_score;

        new_row
    });

    (grid, score)
}

fn move_up(grid: Grid) -> (Grid, u64) {
    let (new_grid, score) = do_move(grid.transpose());

    (new_grid.transpose(), score)
}

fn move_down(grid: Grid) -> (Grid, u64) {
    let (new_grid, score) = do_move(grid.transpose().mirror());

    (new_grid.mirror().transpose(), score)
}

fn move_right(grid: Grid) -> (Grid, u64) {
    let (new_grid, score) = do_move(grid.mirror());

    (new_grid.mirror(), score)
}

fn move_left(grid: Grid) -> (Grid, u64) {
    do_move(grid)
}

pub fn shift(grid: &Grid, direction: Direction) -> Shift {
    let (new_grid, score) = MOVE_FUNCTIONS[direction as usize](*grid);

    Shift {
        grid: new_grid,
        score,
        moved: new_grid != *grid,
    }
}

pub fn try_move(grid: &Grid, direction: Direction) -> Option<Shift> {
    Some(shift(grid, direction)).filter(|shift| shift.moved)
}

/// Indexed by `Direction as usize`.
pub fn try_all_moves(grid: &Grid) -> [Option<Shift>; 4] {
    [
        Direction::Up,
        Direction::Down,
        Direction::Right,
        Direction::Left,
    ]
    .map(|direction| try_move(grid, direction))
}

/// Places a 2 (90%) or a 4 (10%) on a uniformly chosen empty cell and returns it as
/// `(col, row, value)`. A full grid is left untouched.
pub fn spawn_tile(rng: &mut impl Rng, grid: &mut Grid) -> Option<(usize, usize, u32)> {
    let slot_count = grid.count_empty();

    if slot_count == 0 {
        return None;
    }

    let rand = rng.gen_range(0..(slot_count * 10));

    let slot_idx = rand / 10;
    let value = if rand % 10 == 0 { 4 } else { 2 };

    let (col, row) = grid.empty_cells().nth(slot_idx)?;
    grid.set(col, row, value).ok()?;

    debug!("spawned {value} at ({col}, {row})");

    Some((col, row, value))
}

/// Whether any direction would change the grid. Every adjacent pair has one endpoint on the
/// even squares of a checkerboard, so only those cells need their neighbours compared. A pair
/// of [`MAX_TILE`]s does not count.
pub fn has_legal_move(grid: &Grid) -> bool {
    if grid.count_empty() > 0 {
        return true;
    }

    grid.cells()
        .filter(|&(col, row, value)| (col + row) % 2 == 0 && value < MAX_TILE)
        .any(|(col, row, value)| {
            NEIGHBOUR_OFFSETS.iter().any(|&(dx, dy)| {
                col.checked_add_signed(dx)
                    .zip(row.checked_add_signed(dy))
                    .and_then(|(col, row)| grid.get(col, row).ok())
                    == Some(value)
            })
        })
}
