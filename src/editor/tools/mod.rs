mod paint;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use crate::color::Color;
pub use crate::geometry::{CellCoord, GridDimensions};
pub use crate::grid::Cell;
pub use paint::{DragSession, PaintEngine, PaintOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Pencil,
    Eraser,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::Pencil, ToolKind::Eraser];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Pencil => "pencil",
            Self::Eraser => "eraser",
        }
    }

    pub const fn uses_color(self) -> bool {
        matches!(self, Self::Pencil)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool {0:?}")]
pub struct UnknownTool(pub String);

impl FromStr for ToolKind {
    type Err = UnknownTool;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownTool(value.to_string()))
    }
}

/// Active tool and the color the pencil paints with.
#[derive(Debug, Clone)]
pub struct EditorTools {
    active_tool: ToolKind,
    selected_color: Color,
}

impl Default for EditorTools {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorTools {
    pub const fn new() -> Self {
        Self {
            active_tool: ToolKind::Pencil,
            selected_color: Color::BLACK,
        }
    }

    pub const fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn select_tool(&mut self, tool: ToolKind) {
        if self.active_tool != tool {
            tracing::debug!(from = %self.active_tool, to = %tool, "tool changed");
        }
        self.active_tool = tool;
    }

    pub const fn selected_color(&self) -> Color {
        self.selected_color
    }

    pub fn set_selected_color(&mut self, color: Color) {
        self.selected_color = color;
    }

    /// Value a pointer write stores with the active tool.
    pub const fn stroke_value(&self) -> Cell {
        if self.active_tool.uses_color() {
            Some(self.selected_color)
        } else {
            None
        }
    }
}
