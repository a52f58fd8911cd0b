//! Seeded grid noise.
//!
//! GRID rendering decorates each active symbol with bands of randomly lit
//! cells. The pattern is a pure function of its seed; the seed itself comes
//! from the caller's [`crate::env::Environment`], so a simulated session draws
//! the same noise every time.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::env::Environment;

/// Rows in a noise band.
pub const GRID_ROWS: usize = 4;

/// Columns in a noise band.
pub const GRID_COLS: usize = 40;

/// A rows × cols field of on/off cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPattern {
    seed: u64,
    cols: usize,
    cells: Vec<bool>,
}

impl GridPattern {
    /// Generate a `rows` × `cols` pattern from `seed`. Each cell is lit with
    /// probability one half.
    pub fn generate(seed: u64, rows: usize, cols: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let cells = (0..rows * cols).map(|_| rng.gen_bool(0.5)).collect();
        Self { seed, cols, cells }
    }

    /// Standard 4 × 40 band with a seed drawn from `env`.
    pub fn from_env(env: &impl Environment) -> Self {
        Self::generate(env.random_u64(), GRID_ROWS, GRID_COLS)
    }

    /// Seed the pattern was generated from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.cells.len().checked_div(self.cols).unwrap_or(0)
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the cell at (`row`, `col`) is lit. Out of range is unlit.
    pub fn is_lit(&self, row: usize, col: usize) -> bool {
        col < self.cols && self.cells.get(row * self.cols + col).copied().unwrap_or(false)
    }

    /// Cells row by row.
    pub fn row_iter(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(self.cols.max(1))
    }
}
