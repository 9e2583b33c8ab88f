pub mod grid;

pub use grid::{Grid, GridError, MAX_TILE, N};
