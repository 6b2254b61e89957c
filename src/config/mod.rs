use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::color::{default_palette, parse_palette, Color};
use crate::editor::ToolKind;
use crate::export::{ExportSettings, DEFAULT_CELL_PIXEL_SIZE};
use crate::grid::resize::{DEFAULT_MAX_GRID_SIZE, DEFAULT_MIN_GRID_SIZE};
use crate::grid::{ResizeConfig, ResizePolicy, DEFAULT_RANDOM_DENSITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

pub const APP_DIR: &str = "pixelgrid";
const APP_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_GRID_SIZE: usize = 12;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub default_size: usize,
    pub min_size: usize,
    pub max_size: usize,
    pub linked_dimensions: bool,
    pub resize_policy: ResizePolicy,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_GRID_SIZE,
            min_size: DEFAULT_MIN_GRID_SIZE,
            max_size: DEFAULT_MAX_GRID_SIZE,
            linked_dimensions: true,
            resize_policy: ResizePolicy::Discard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub high_resolution_scale: u32,
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            high_resolution_scale: 1,
            output_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RandomizeConfig {
    pub density: f64,
}

impl Default for RandomizeConfig {
    fn default() -> Self {
        Self {
            density: DEFAULT_RANDOM_DENSITY,
        }
    }
}

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub grid: GridConfig,
    pub cell_pixel_size: u32,
    pub export: ExportConfig,
    pub randomize: RandomizeConfig,
    pub palette: Option<Vec<String>>,
    pub tool: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            cell_pixel_size: DEFAULT_CELL_PIXEL_SIZE,
            export: ExportConfig::default(),
            randomize: RandomizeConfig::default(),
            palette: None,
            tool: None,
        }
    }
}

impl AppConfig {
    /// Pulls every value back into a usable range.
    pub fn sanitized(mut self) -> Self {
        let grid = &mut self.grid;
        grid.min_size = grid.min_size.max(1);
        grid.max_size = grid.max_size.max(grid.min_size);
        grid.default_size = grid.default_size.clamp(grid.min_size, grid.max_size);

        if self.cell_pixel_size == 0 {
            tracing::warn!("cell_pixel_size must be positive; using default");
            self.cell_pixel_size = DEFAULT_CELL_PIXEL_SIZE;
        }
        self.export.high_resolution_scale = self.export.high_resolution_scale.max(1);
        self.randomize.density = if self.randomize.density.is_finite() {
            self.randomize.density.clamp(0.0, 1.0)
        } else {
            DEFAULT_RANDOM_DENSITY
        };
        self
    }

    pub fn resize_config(&self) -> ResizeConfig {
        ResizeConfig::new(
            self.grid.min_size,
            self.grid.max_size,
            self.grid.linked_dimensions,
            self.grid.resize_policy,
        )
        .unwrap_or_else(|err| {
            tracing::warn!(%err, "invalid grid size range; using defaults");
            ResizeConfig::default()
        })
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            cell_pixel_size: self.cell_pixel_size,
            high_resolution_scale: self.export.high_resolution_scale,
        }
    }

    /// Tool active when a session opens; unknown names fall back to the pencil.
    pub fn initial_tool(&self) -> ToolKind {
        let Some(name) = self.tool.as_deref() else {
            return ToolKind::default();
        };
        name.parse().unwrap_or_else(|err| {
            tracing::warn!(%err, "ignoring configured tool");
            ToolKind::default()
        })
    }

    /// Configured palette, or the built-in one when unset or unusable.
    pub fn palette_colors(&self) -> Vec<Color> {
        self.palette
            .as_deref()
            .and_then(parse_palette)
            .unwrap_or_else(default_palette)
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

pub fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    let config = match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    };
    config.sanitized()
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn data_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = xdg_root(xdg_config_home, home, ".config")?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

pub fn app_data_path(
    app_dir: &str,
    file_name: &str,
    xdg_data_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = xdg_root(xdg_data_home, home, ".local/share")?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn xdg_root(
    xdg_home: Option<&Path>,
    home: Option<&Path>,
    home_fallback: &str,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(home_fallback))
}
