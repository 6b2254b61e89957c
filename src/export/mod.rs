//! Serialises a pixel grid into downloadable artifacts.

pub mod document;
pub mod raster;
pub mod vector;
pub mod worker;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::grid::{GridError, PixelGrid};

pub use document::{DocumentEncoder, PdfDocumentEncoder, RasterSnapshot};
pub use raster::{sample_cells, JPEG_QUALITY};
pub use worker::spawn_export;

pub const DEFAULT_CELL_PIXEL_SIZE: u32 = 30;
/// Largest raster edge, in pixels, an export will allocate.
pub const MAX_SURFACE_EDGE_PX: u32 = 16_384;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no drawable surface for a {width}x{height} grid at {cell_pixel_size}px per cell")]
    SurfaceUnavailable {
        width: usize,
        height: usize,
        cell_pixel_size: u32,
    },
    #[error("no document encoder is available for {format}")]
    EncoderUnavailable { format: ExportFormat },
    #[error("unsupported export format {0:?}")]
    UnsupportedFormat(String),
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("vector markup failed: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("document encoding failed: {0}")]
    Document(String),
    #[error("raster is {actual_width}x{actual_height} but the grid needs {expected_width}x{expected_height}")]
    SampleMismatch {
        actual_width: u32,
        actual_height: u32,
        expected_width: u32,
        expected_height: u32,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("export worker stopped before reporting a result")]
    WorkerDisconnected,
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Svg,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [Self::Png, Self::Jpeg, Self::Svg, Self::Pdf];

    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Png => "pixel-art.png",
            Self::Jpeg => "pixel-art.jpg",
            Self::Svg => "pixel-art.svg",
            Self::Pdf => "pixel-art.pdf",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg => "image/svg+xml",
            Self::Pdf => "application/pdf",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }

    /// Formats whose encoding runs off the caller's thread.
    pub const fn runs_in_background(self) -> bool {
        matches!(self, Self::Pdf)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(value: &str) -> ExportResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(ExportError::UnsupportedFormat(value.to_string())),
        }
    }
}

/// Encoded output ready to be written under its fixed file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub const fn file_name(&self) -> &'static str {
        self.format.file_name()
    }

    pub const fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSettings {
    pub cell_pixel_size: u32,
    /// Integer upsampling applied to raster output only.
    pub high_resolution_scale: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            cell_pixel_size: DEFAULT_CELL_PIXEL_SIZE,
            high_resolution_scale: 1,
        }
    }
}

impl ExportSettings {
    /// Pixel size of one cell in raster output.
    pub fn raster_cell_size(&self) -> u32 {
        self.cell_pixel_size
            .saturating_mul(self.high_resolution_scale.max(1))
    }
}

/// Raster, vector and document exporter.
///
/// The document encoder is injected at construction; without one, PDF export
/// fails with [`ExportError::EncoderUnavailable`].
#[derive(Clone)]
pub struct Exporter {
    settings: ExportSettings,
    document_encoder: Option<Arc<dyn DocumentEncoder>>,
}

impl fmt::Debug for Exporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exporter")
            .field("settings", &self.settings)
            .field("has_document_encoder", &self.document_encoder.is_some())
            .finish()
    }
}

impl Exporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            settings,
            document_encoder: None,
        }
    }

    pub fn with_document_encoder(mut self, encoder: Arc<dyn DocumentEncoder>) -> Self {
        self.document_encoder = Some(encoder);
        self
    }

    pub const fn settings(&self) -> ExportSettings {
        self.settings
    }

    pub fn export(&self, grid: &PixelGrid, format: ExportFormat) -> ExportResult<ExportArtifact> {
        tracing::debug!(
            %format,
            width = grid.width(),
            height = grid.height(),
            "export started"
        );
        let bytes = match format {
            ExportFormat::Png | ExportFormat::Jpeg => raster::export_raster(
                grid,
                self.settings.raster_cell_size(),
                format,
            )?,
            ExportFormat::Svg => {
                vector::export_vector(grid, self.settings.cell_pixel_size)?.into_bytes()
            }
            ExportFormat::Pdf => self.export_document(grid)?,
        };
        tracing::info!(%format, bytes = bytes.len(), "export finished");
        Ok(ExportArtifact { format, bytes })
    }

    pub fn export_document(&self, grid: &PixelGrid) -> ExportResult<Vec<u8>> {
        let encoder = self
            .document_encoder
            .as_ref()
            .ok_or(ExportError::EncoderUnavailable {
                format: ExportFormat::Pdf,
            })?;
        let snapshot = RasterSnapshot::capture(grid, self.settings.raster_cell_size())?;
        encoder.encode_page(&snapshot)
    }
}
