use super::{CellCoord, EditorTools};
use crate::geometry::cell_at_point;
use crate::grid::PixelGrid;

/// One continuous pointer-down-to-pointer-up gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub last_painted: CellCoord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOutcome {
    /// The cell changed; renderers should redraw.
    Painted(CellCoord),
    /// The write reached the grid but the cell already held the value.
    Unchanged(CellCoord),
    /// Pointer is still over the last painted cell; no write issued.
    Skipped,
    /// No drag session is active.
    Idle,
    /// Coordinates fall outside the grid; ignored.
    OutOfBounds,
}

impl PaintOutcome {
    pub const fn changed(self) -> bool {
        matches!(self, Self::Painted(_))
    }
}

/// Turns pointer input into grid writes using the active tool.
///
/// `pointer_up` carries no cell: it ends the drag wherever the release lands.
#[derive(Debug, Default)]
pub struct PaintEngine {
    drag: Option<DragSession>,
    writes: u64,
}

impl PaintEngine {
    pub const fn new() -> Self {
        Self {
            drag: None,
            writes: 0,
        }
    }

    pub const fn drag_session(&self) -> Option<DragSession> {
        self.drag
    }

    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Number of writes issued to the grid store so far.
    pub const fn writes(&self) -> u64 {
        self.writes
    }

    pub fn pointer_down(
        &mut self,
        grid: &mut PixelGrid,
        tools: &EditorTools,
        cell: CellCoord,
    ) -> PaintOutcome {
        if !grid.dimensions().contains(cell) {
            tracing::debug!(row = cell.row, col = cell.col, "pointer down outside grid ignored");
            // a new press always ends the previous gesture
            self.drag = None;
            return PaintOutcome::OutOfBounds;
        }
        tracing::debug!(row = cell.row, col = cell.col, tool = %tools.active_tool(), "drag started");
        self.drag = Some(DragSession { last_painted: cell });
        self.write(grid, tools, cell)
    }

    pub fn pointer_enter(
        &mut self,
        grid: &mut PixelGrid,
        tools: &EditorTools,
        cell: CellCoord,
    ) -> PaintOutcome {
        let Some(drag) = self.drag else {
            return PaintOutcome::Idle;
        };
        if drag.last_painted == cell {
            return PaintOutcome::Skipped;
        }
        if !grid.dimensions().contains(cell) {
            return PaintOutcome::OutOfBounds;
        }
        self.drag = Some(DragSession { last_painted: cell });
        self.write(grid, tools, cell)
    }

    /// Ends the drag wherever the pointer was released.
    pub fn pointer_up(&mut self) -> Option<DragSession> {
        let ended = self.drag.take();
        if let Some(drag) = ended {
            tracing::debug!(
                row = drag.last_painted.row,
                col = drag.last_painted.col,
                "drag ended"
            );
        }
        ended
    }

    /// Pointer-down from canvas pixel coordinates.
    pub fn pointer_down_at(
        &mut self,
        grid: &mut PixelGrid,
        tools: &EditorTools,
        x: f64,
        y: f64,
        cell_pixel_size: u32,
    ) -> PaintOutcome {
        match cell_at_point(x, y, cell_pixel_size, grid.dimensions()) {
            Some(cell) => self.pointer_down(grid, tools, cell),
            None => {
                self.drag = None;
                PaintOutcome::OutOfBounds
            }
        }
    }

    /// Pointer movement from canvas pixel coordinates.
    pub fn pointer_move_at(
        &mut self,
        grid: &mut PixelGrid,
        tools: &EditorTools,
        x: f64,
        y: f64,
        cell_pixel_size: u32,
    ) -> PaintOutcome {
        if self.drag.is_none() {
            return PaintOutcome::Idle;
        }
        match cell_at_point(x, y, cell_pixel_size, grid.dimensions()) {
            Some(cell) => self.pointer_enter(grid, tools, cell),
            None => PaintOutcome::OutOfBounds,
        }
    }

    fn write(&mut self, grid: &mut PixelGrid, tools: &EditorTools, cell: CellCoord) -> PaintOutcome {
        match grid.set_cell(cell.row, cell.col, tools.stroke_value()) {
            Ok(changed) => {
                self.writes = self.writes.saturating_add(1);
                if changed {
                    PaintOutcome::Painted(cell)
                } else {
                    PaintOutcome::Unchanged(cell)
                }
            }
            Err(err) => {
                tracing::debug!(%err, "paint write rejected");
                PaintOutcome::OutOfBounds
            }
        }
    }
}
