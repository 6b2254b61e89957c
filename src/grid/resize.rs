use serde::{Deserialize, Serialize};

use super::{GridError, GridResult, PixelGrid};
use crate::geometry::GridDimensions;

pub const DEFAULT_MIN_GRID_SIZE: usize = 8;
pub const DEFAULT_MAX_GRID_SIZE: usize = 20;

/// What happens to existing cells when the grid is reallocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizePolicy {
    /// Start a new, empty drawing.
    #[default]
    Discard,
    /// Keep the top-left intersection of the old and new grids.
    PreserveOverlap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeConfig {
    min_size: usize,
    max_size: usize,
    linked_dimensions: bool,
    policy: ResizePolicy,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_GRID_SIZE,
            max_size: DEFAULT_MAX_GRID_SIZE,
            linked_dimensions: true,
            policy: ResizePolicy::Discard,
        }
    }
}

impl ResizeConfig {
    pub fn new(
        min_size: usize,
        max_size: usize,
        linked_dimensions: bool,
        policy: ResizePolicy,
    ) -> GridResult<Self> {
        if min_size == 0 || min_size > max_size {
            return Err(GridError::InvalidSizeRange {
                min: min_size,
                max: max_size,
            });
        }
        Ok(Self {
            min_size,
            max_size,
            linked_dimensions,
            policy,
        })
    }

    pub const fn min_size(&self) -> usize {
        self.min_size
    }

    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    pub const fn linked_dimensions(&self) -> bool {
        self.linked_dimensions
    }

    pub const fn policy(&self) -> ResizePolicy {
        self.policy
    }

    pub fn clamp_size(&self, size: usize) -> usize {
        size.clamp(self.min_size, self.max_size)
    }
}

/// Reallocates grids within the configured size bounds.
///
/// Requests outside `min_size..=max_size` are clamped, never rejected. With
/// linked dimensions every grid is square and the last-changed side wins.
#[derive(Debug, Clone, Default)]
pub struct GridResizer {
    config: ResizeConfig,
}

impl GridResizer {
    pub const fn new(config: ResizeConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &ResizeConfig {
        &self.config
    }

    /// Only affects later resizes; an existing grid keeps its shape.
    pub fn set_linked_dimensions(&mut self, linked: bool) {
        self.config.linked_dimensions = linked;
    }

    pub fn set_policy(&mut self, policy: ResizePolicy) {
        self.config.policy = policy;
    }

    /// Empty grid at the clamped default size.
    pub fn create(&self, default_size: usize) -> GridResult<PixelGrid> {
        PixelGrid::square(self.config.clamp_size(default_size))
    }

    pub fn resolve(&self, width: usize, height: usize) -> GridDimensions {
        let width = self.config.clamp_size(width);
        let height = self.config.clamp_size(height);
        if width != height && self.config.linked_dimensions {
            return GridDimensions::square(width);
        }
        GridDimensions::new(width, height)
    }

    pub fn resize(&self, grid: &PixelGrid, width: usize, height: usize) -> GridResult<PixelGrid> {
        self.resize_with_policy(grid, width, height, self.config.policy)
    }

    pub fn resize_with_policy(
        &self,
        grid: &PixelGrid,
        width: usize,
        height: usize,
        policy: ResizePolicy,
    ) -> GridResult<PixelGrid> {
        let target = self.resolve(width, height);
        if target != GridDimensions::new(width, height) {
            tracing::warn!(
                requested_width = width,
                requested_height = height,
                width = target.width,
                height = target.height,
                "grid size adjusted to configured bounds"
            );
        }

        let mut resized = PixelGrid::new(target.width, target.height)?;
        if policy == ResizePolicy::PreserveOverlap {
            for (coord, color) in grid.painted() {
                if target.contains(coord) {
                    resized.set_cell(coord.row, coord.col, Some(color))?;
                }
            }
        }

        tracing::debug!(
            from_width = grid.width(),
            from_height = grid.height(),
            width = target.width,
            height = target.height,
            ?policy,
            "resized grid"
        );
        Ok(resized)
    }

    /// Changes only the width; linked mode drags the height along.
    pub fn set_width(&self, grid: &PixelGrid, width: usize) -> GridResult<PixelGrid> {
        let height = if self.config.linked_dimensions {
            width
        } else {
            grid.height()
        };
        self.resize(grid, width, height)
    }

    /// Changes only the height; linked mode drags the width along.
    pub fn set_height(&self, grid: &PixelGrid, height: usize) -> GridResult<PixelGrid> {
        let width = if self.config.linked_dimensions {
            height
        } else {
            grid.width()
        };
        self.resize(grid, width, height)
    }
}
