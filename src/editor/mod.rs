//! Editor session: the single owner of the grid and everything that edits it.

pub mod tools;

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::JoinHandle;

use thiserror::Error;

use crate::color::{Color, ColorResult, Hsl};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::export::{spawn_export, ExportError, ExportFormat, Exporter};
use crate::geometry::{CellCoord, GridDimensions};
use crate::grid::{GridResizer, PixelGrid, RandomSource, ResizePolicy, Xorshift64};
use crate::storage::{DownloadDirectory, KeyValueStore, RecentColors, StorageError};

pub use tools::{DragSession, EditorTools, PaintEngine, PaintOutcome, ToolKind, UnknownTool};

#[derive(Debug, Error)]
pub enum EditorActionError {
    #[error("export error while {operation} {format}: {source}")]
    Export {
        operation: &'static str,
        format: ExportFormat,
        #[source]
        source: ExportError,
    },

    #[error("storage error while {operation} {format}: {source}")]
    Storage {
        operation: &'static str,
        format: ExportFormat,
        #[source]
        source: StorageError,
    },
}

pub type ExportSaveResult = Result<PathBuf, EditorActionError>;

/// Export running on a worker thread; poll or wait for the saved path.
#[derive(Debug)]
pub struct PendingExport {
    format: ExportFormat,
    receiver: mpsc::Receiver<ExportSaveResult>,
    handle: JoinHandle<()>,
    delivered: Option<ExportSaveResult>,
}

impl PendingExport {
    pub const fn format(&self) -> ExportFormat {
        self.format
    }

    /// Non-blocking check; `None` while the worker is still encoding.
    ///
    /// Once delivered, the result stays available to later polls and to
    /// [`PendingExport::wait`].
    pub fn try_result(&mut self) -> Option<&ExportSaveResult> {
        if self.delivered.is_none() {
            self.delivered = match self.receiver.try_recv() {
                Ok(result) => Some(result),
                Err(mpsc::TryRecvError::Empty) => None,
                Err(mpsc::TryRecvError::Disconnected) => Some(Err(self.disconnected())),
            };
        }
        self.delivered.as_ref()
    }

    pub fn wait(mut self) -> ExportSaveResult {
        let result = match self.delivered.take() {
            Some(result) => result,
            None => self
                .receiver
                .recv()
                .unwrap_or_else(|_| Err(self.disconnected())),
        };
        let _ = self.handle.join();
        result
    }

    fn disconnected(&self) -> EditorActionError {
        EditorActionError::Export {
            operation: "exporting",
            format: self.format,
            source: ExportError::WorkerDisconnected,
        }
    }
}

#[derive(Debug)]
pub enum ExportOutcome {
    Saved(PathBuf),
    Pending(PendingExport),
}

impl ExportOutcome {
    /// Blocks on a pending export; a saved one returns immediately.
    pub fn wait(self) -> ExportSaveResult {
        match self {
            Self::Saved(path) => Ok(path),
            Self::Pending(pending) => pending.wait(),
        }
    }
}

/// One open editor: grid, tools, drag state and the surfaces that read them.
///
/// Every mutation goes through `&mut self`, so the grid has exactly one
/// writer. Exports take a snapshot and never observe later edits.
#[derive(Debug)]
pub struct EditorSession<S: KeyValueStore> {
    grid: PixelGrid,
    tools: EditorTools,
    paint: PaintEngine,
    resizer: GridResizer,
    exporter: Exporter,
    recent: RecentColors,
    store: S,
    palette: Vec<Color>,
    cell_pixel_size: u32,
    density: f64,
}

impl<S: KeyValueStore> EditorSession<S> {
    pub fn new(config: &AppConfig, exporter: Exporter, store: S) -> AppResult<Self> {
        let resizer = GridResizer::new(config.resize_config());
        let grid = resizer.create(config.grid.default_size)?;
        let recent = RecentColors::load(&store);
        let mut tools = EditorTools::new();
        tools.select_tool(config.initial_tool());
        tracing::info!(
            width = grid.width(),
            height = grid.height(),
            recent = recent.len(),
            "editor session opened"
        );
        Ok(Self {
            grid,
            tools,
            paint: PaintEngine::new(),
            resizer,
            exporter,
            recent,
            store,
            palette: config.palette_colors(),
            cell_pixel_size: config.cell_pixel_size,
            density: config.randomize.density,
        })
    }

    pub const fn snapshot(&self) -> &PixelGrid {
        &self.grid
    }

    pub const fn dimensions(&self) -> GridDimensions {
        self.grid.dimensions()
    }

    pub const fn cell_pixel_size(&self) -> u32 {
        self.cell_pixel_size
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn recent_colors(&self) -> &[Color] {
        self.recent.colors()
    }

    pub const fn tools(&self) -> &EditorTools {
        &self.tools
    }

    pub const fn resizer(&self) -> &GridResizer {
        &self.resizer
    }

    pub const fn is_dragging(&self) -> bool {
        self.paint.is_dragging()
    }

    pub fn set_active_tool(&mut self, tool: ToolKind) {
        self.tools.select_tool(tool);
    }

    /// Selects `color` for the pencil and records it as recently used.
    pub fn set_selected_color(&mut self, color: Color) {
        self.tools.set_selected_color(color);
        if self.recent.push(color) {
            if let Err(err) = self.recent.save(&mut self.store) {
                tracing::warn!(%err, "failed to persist recent colors");
            }
        }
    }

    /// Malformed input leaves the previous selection in place.
    pub fn set_selected_color_hex(&mut self, value: &str) -> ColorResult<Color> {
        match Color::from_hex(value) {
            Ok(color) => {
                self.set_selected_color(color);
                Ok(color)
            }
            Err(err) => {
                tracing::debug!(%err, kept = %self.tools.selected_color(), "color input rejected");
                Err(err)
            }
        }
    }

    pub fn set_selected_color_hsl(&mut self, hsl: Hsl) -> Color {
        let color = Color::from_hsl(hsl);
        self.set_selected_color(color);
        color
    }

    pub fn set_grid_size(&mut self, size: usize) -> AppResult<GridDimensions> {
        self.set_grid_dimensions(size, size)
    }

    pub fn set_grid_width(&mut self, width: usize) -> AppResult<GridDimensions> {
        let resized = self.resizer.set_width(&self.grid, width)?;
        Ok(self.replace_grid(resized))
    }

    pub fn set_grid_height(&mut self, height: usize) -> AppResult<GridDimensions> {
        let resized = self.resizer.set_height(&self.grid, height)?;
        Ok(self.replace_grid(resized))
    }

    pub fn set_grid_dimensions(&mut self, width: usize, height: usize) -> AppResult<GridDimensions> {
        let resized = self.resizer.resize(&self.grid, width, height)?;
        Ok(self.replace_grid(resized))
    }

    /// Turning linking on squares a rectangular grid to its width.
    pub fn set_linked_dimensions(&mut self, linked: bool) -> AppResult<GridDimensions> {
        self.resizer.set_linked_dimensions(linked);
        if linked && self.grid.width() != self.grid.height() {
            let size = self.grid.width();
            let resized = self.resizer.resize(&self.grid, size, size)?;
            return Ok(self.replace_grid(resized));
        }
        Ok(self.grid.dimensions())
    }

    pub fn set_resize_policy(&mut self, policy: ResizePolicy) {
        self.resizer.set_policy(policy);
    }

    fn replace_grid(&mut self, resized: PixelGrid) -> GridDimensions {
        // the old drag may point past the new bounds
        self.paint.pointer_up();
        self.grid = resized;
        self.grid.dimensions()
    }

    pub fn pointer_down(&mut self, cell: CellCoord) -> PaintOutcome {
        self.paint.pointer_down(&mut self.grid, &self.tools, cell)
    }

    pub fn pointer_enter(&mut self, cell: CellCoord) -> PaintOutcome {
        self.paint.pointer_enter(&mut self.grid, &self.tools, cell)
    }

    /// Global release: ends the drag regardless of where the pointer is.
    pub fn pointer_up(&mut self) -> Option<DragSession> {
        self.paint.pointer_up()
    }

    pub fn pointer_down_at(&mut self, x: f64, y: f64) -> PaintOutcome {
        self.paint
            .pointer_down_at(&mut self.grid, &self.tools, x, y, self.cell_pixel_size)
    }

    pub fn pointer_move_at(&mut self, x: f64, y: f64) -> PaintOutcome {
        self.paint
            .pointer_move_at(&mut self.grid, &self.tools, x, y, self.cell_pixel_size)
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        tracing::debug!("grid cleared");
    }

    pub fn randomize<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        self.grid.randomize(self.density, rng);
    }

    pub fn randomize_from_clock(&mut self) {
        self.randomize(&mut Xorshift64::from_clock());
    }

    /// Encodes the current grid and saves it under the format's file name.
    ///
    /// Raster and vector formats finish before returning. Background formats
    /// return [`ExportOutcome::Pending`]; each such request is independent.
    pub fn export(
        &self,
        format: ExportFormat,
        downloads: &DownloadDirectory,
    ) -> Result<ExportOutcome, EditorActionError> {
        if format.runs_in_background() {
            return Ok(ExportOutcome::Pending(self.export_in_background(format, downloads)));
        }

        let artifact = self
            .exporter
            .export(&self.grid, format)
            .map_err(|source| EditorActionError::Export {
                operation: "exporting",
                format,
                source,
            })?;
        let path = downloads
            .save(&artifact)
            .map_err(|source| EditorActionError::Storage {
                operation: "saving",
                format,
                source,
            })?;
        Ok(ExportOutcome::Saved(path))
    }

    fn export_in_background(&self, format: ExportFormat, downloads: &DownloadDirectory) -> PendingExport {
        let (tx, receiver) = mpsc::channel();
        let downloads = downloads.clone();
        let handle = spawn_export(
            self.exporter.clone(),
            self.grid.clone(),
            format,
            move |result| {
                let saved = result
                    .map_err(|source| EditorActionError::Export {
                        operation: "exporting",
                        format,
                        source,
                    })
                    .and_then(|artifact| {
                        downloads
                            .save(&artifact)
                            .map_err(|source| EditorActionError::Storage {
                                operation: "saving",
                                format,
                                source,
                            })
                    });
                let _ = tx.send(saved);
            },
        );
        PendingExport {
            format,
            receiver,
            handle,
            delivered: None,
        }
    }

    /// Ends any drag, persists recent colors and hands the store back.
    pub fn close(mut self) -> S {
        if let Some(drag) = self.paint.pointer_up() {
            tracing::debug!(row = drag.last_painted.row, col = drag.last_painted.col, "drag ended by close");
        }
        if let Err(err) = self.recent.save(&mut self.store) {
            tracing::warn!(%err, "failed to persist recent colors on close");
        }
        tracing::info!(revision = self.grid.revision(), "editor session closed");
        self.store
    }
}
