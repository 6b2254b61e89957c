//! Cell addressing shared by the grid store, paint engine and exporters.

/// Pointer positions this far outside the drawn grid still snap to the edge cell.
pub const EDGE_TOLERANCE_PX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Grid size in cells: `width` columns by `height` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDimensions {
    pub width: usize,
    pub height: usize,
}

impl GridDimensions {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub const fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    pub const fn contains(self, cell: CellCoord) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// Pixel size of a surface that draws every cell as a `cell_pixel_size` square.
    pub fn pixel_size(self, cell_pixel_size: u32) -> Option<(u32, u32)> {
        let width = u32::try_from(self.width).ok()?.checked_mul(cell_pixel_size)?;
        let height = u32::try_from(self.height).ok()?.checked_mul(cell_pixel_size)?;
        Some((width, height))
    }
}

/// Maps a point on the rendered canvas to the cell beneath it.
///
/// Points just past the last row or column (within [`EDGE_TOLERANCE_PX`]) are
/// clamped to the edge cell; anything further out yields `None`.
pub fn cell_at_point(
    x: f64,
    y: f64,
    cell_pixel_size: u32,
    dimensions: GridDimensions,
) -> Option<CellCoord> {
    if cell_pixel_size == 0 || dimensions.width == 0 || dimensions.height == 0 {
        return None;
    }
    let col = axis_index(x, cell_pixel_size, dimensions.width)?;
    let row = axis_index(y, cell_pixel_size, dimensions.height)?;
    Some(CellCoord::new(row, col))
}

fn axis_index(position: f64, cell_pixel_size: u32, cells: usize) -> Option<usize> {
    if !position.is_finite() {
        return None;
    }
    let extent = f64::from(cell_pixel_size) * cells as f64;
    if position < -EDGE_TOLERANCE_PX || position > extent + EDGE_TOLERANCE_PX {
        return None;
    }
    let index = (position / f64::from(cell_pixel_size)).floor();
    if index <= 0.0 {
        return Some(0);
    }
    Some((index as usize).min(cells - 1))
}
