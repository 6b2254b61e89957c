//! In-memory pixel grid: a row-major matrix of optional colors.

pub mod random;
pub mod resize;

use thiserror::Error;

use crate::color::{Color, Hsl};
use crate::geometry::{CellCoord, GridDimensions};

pub use random::{RandomSource, Xorshift64};
pub use resize::{GridResizer, ResizeConfig, ResizePolicy};

/// Contents of one cell; `None` is empty (transparent).
pub type Cell = Option<Color>;

/// Share of cells painted by [`PixelGrid::randomize`] when no density is configured.
pub const DEFAULT_RANDOM_DENSITY: f64 = 0.3;
const RANDOM_SATURATION: f64 = 70.0;
const RANDOM_LIGHTNESS: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("cell ({row}, {col}) is outside the {width}x{height} grid")]
    OutOfRange {
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },
    #[error("invalid grid size range {min}..={max}")]
    InvalidSizeRange { min: usize, max: usize },
}

pub type GridResult<T> = std::result::Result<T, GridError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    dimensions: GridDimensions,
    cells: Vec<Cell>,
    revision: u64,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize) -> GridResult<Self> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }
        let cell_count = width
            .checked_mul(height)
            .ok_or(GridError::InvalidDimensions { width, height })?;
        Ok(Self {
            dimensions: GridDimensions::new(width, height),
            cells: vec![None; cell_count],
            revision: 0,
        })
    }

    pub fn square(size: usize) -> GridResult<Self> {
        Self::new(size, size)
    }

    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    pub const fn width(&self) -> usize {
        self.dimensions.width
    }

    pub const fn height(&self) -> usize {
        self.dimensions.height
    }

    /// Bumped on every write that changes a cell; renderers redraw when it moves.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    fn index(&self, row: usize, col: usize) -> GridResult<usize> {
        if !self.dimensions.contains(CellCoord::new(row, col)) {
            return Err(GridError::OutOfRange {
                row,
                col,
                width: self.dimensions.width,
                height: self.dimensions.height,
            });
        }
        Ok(row * self.dimensions.width + col)
    }

    pub fn get_cell(&self, row: usize, col: usize) -> GridResult<Cell> {
        let index = self.index(row, col)?;
        Ok(self.cells[index])
    }

    /// Writes one cell. Returns whether the stored value changed.
    pub fn set_cell(&mut self, row: usize, col: usize, value: Cell) -> GridResult<bool> {
        let index = self.index(row, col)?;
        if self.cells[index] == value {
            return Ok(false);
        }
        self.cells[index] = value;
        self.revision = self.revision.wrapping_add(1);
        Ok(true)
    }

    pub fn clear(&mut self) {
        if self.cells.iter().all(Option::is_none) {
            return;
        }
        self.cells.fill(None);
        self.revision = self.revision.wrapping_add(1);
    }

    /// Paints each cell independently with probability `density` using a
    /// random hue at fixed saturation and lightness; other cells become empty.
    pub fn randomize<R: RandomSource + ?Sized>(&mut self, density: f64, rng: &mut R) {
        self.randomize_with(density, rng, random_hue_color);
    }

    pub fn randomize_with<R, F>(&mut self, density: f64, rng: &mut R, mut palette: F)
    where
        R: RandomSource + ?Sized,
        F: FnMut(&mut R) -> Color,
    {
        let density = if density.is_finite() {
            density.clamp(0.0, 1.0)
        } else {
            0.0
        };
        for cell in &mut self.cells {
            *cell = if rng.next_unit() < density {
                Some(palette(&mut *rng))
            } else {
                None
            };
        }
        self.revision = self.revision.wrapping_add(1);
        tracing::debug!(
            density,
            painted = self.painted_count(),
            "randomized grid"
        );
    }

    pub fn painted_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Row-major iteration over every cell with its coordinate.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Cell)> + '_ {
        let width = self.dimensions.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (CellCoord::new(index / width, index % width), *cell))
    }

    /// Row-major iteration over non-empty cells only.
    pub fn painted(&self) -> impl Iterator<Item = (CellCoord, Color)> + '_ {
        self.iter()
            .filter_map(|(coord, cell)| cell.map(|color| (coord, color)))
    }
}

fn random_hue_color<R: RandomSource + ?Sized>(rng: &mut R) -> Color {
    let hue = (rng.next_unit() * 360.0).floor();
    Color::from_hsl(Hsl::new(hue, RANDOM_SATURATION, RANDOM_LIGHTNESS))
}
