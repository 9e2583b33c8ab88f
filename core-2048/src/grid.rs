use std::fmt;

/// Side length of the board.
pub const N: usize = 4;

/// Largest tile a grid can hold. Two of these never merge, so every merge result fits in a `u32`.
pub const MAX_TILE: u32 = 1 << 30;

#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({col}, {row}) is outside the {n}x{n} grid", n = N)]
    IndexOutOfRange { col: usize, row: usize },
    #[error("invalid tile value {0}: must be 0 or a power of two from 2 to {max}", max = MAX_TILE)]
    InvalidTile(u32),
}

/// Square board of tile values, stored row-major. `0` marks an empty cell and every other value
/// is a power of two.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: [[u32; N]; N],
}

const fn is_valid_tile(value: u32) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

const fn check_index(col: usize, row: usize) -> Result<(), GridError> {
    if col < N && row < N {
        Ok(())
    } else {
        Err(GridError::IndexOutOfRange { col, row })
    }
}

impl Grid {
    pub const EMPTY: Self = Self { rows: [[0; N]; N] };

    pub fn from_rows(rows: [[u32; N]; N]) -> Result<Self, GridError> {
        match rows.iter().flatten().find(|&&value| !is_valid_tile(value)) {
            Some(&value) => Err(GridError::InvalidTile(value)),
            None => Ok(Self { rows }),
        }
    }

    pub const fn rows(&self) -> &[[u32; N]; N] {
        &self.rows
    }

    /// Replaces every row with `f(row)`. `f` must only produce valid tile values.
    #[must_use]
    pub fn map_rows(self, f: impl FnMut([u32; N]) -> [u32; N]) -> Self {
        let rows = self.rows.map(f);

        debug_assert!(rows.iter().flatten().all(|&value| is_valid_tile(value)));

        Self { rows }
    }

    pub fn get(&self, col: usize, row: usize) -> Result<u32, GridError> {
        check_index(col, row)?;

        Ok(self.rows[row][col])
    }

    pub fn set(&mut self, col: usize, row: usize, value: u32) -> Result<(), GridError> {
        check_index(col, row)?;

        if !is_valid_tile(value) {
            return Err(GridError::InvalidTile(value));
        }

        self.rows[row][col] = value;

        Ok(())
    }

    pub fn is_empty(&self, col: usize, row: usize) -> Result<bool, GridError> {
        self.get(col, row).map(|value| value == 0)
    }

    /// Iterates over every cell as `(col, row, value)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, &value)| (col, row, value))
        })
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells()
            .filter(|&(_, _, value)| value == 0)
            .map(|(col, row, _)| (col, row))
    }

    pub fn count_empty(&self) -> usize {
        self.empty_cells().count()
    }

    pub fn max_tile(&self) -> u32 {
        self.rows.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Swaps rows and columns.
    #[must_use]
    pub fn transpose(self) -> Self {
        let mut rows = [[0; N]; N];

        for (i, cells) in self.rows.iter().enumerate() {
            for (j, &value) in cells.iter().enumerate() {
                rows[j][i] = value;
            }
        }

        Self { rows }
    }

    /// Reverses every row.
    #[must_use]
    pub fn mirror(mut self) -> Self {
        for cells in &mut self.rows {
            cells.reverse();
        }

        self
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Grid").field(&self.rows).finish()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cells in &self.rows {
            for value in cells {
                match value {
                    0 => write!(f, "{:>6}", ".")?,
                    value => write!(f, "{value:>6}")?,
                }
            }

            writeln!(f)?;
        }

        Ok(())
    }
}
