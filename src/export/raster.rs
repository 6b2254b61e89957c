use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

use super::{ExportError, ExportFormat, ExportResult, MAX_SURFACE_EDGE_PX};
use crate::color::Color;
use crate::geometry::GridDimensions;
use crate::grid::PixelGrid;

/// JPEG quality on the 1..=100 scale (0.95 of the encoder's range).
pub const JPEG_QUALITY: u8 = 95;
/// Background JPEG output uses for empty cells, since it has no alpha channel.
pub const JPEG_BACKGROUND: Color = Color::WHITE;
const OPAQUE_ALPHA_THRESHOLD: u8 = 128;

/// Draws every painted cell as a `cell_pixel_size` square; empty cells stay transparent.
pub fn render_surface(grid: &PixelGrid, cell_pixel_size: u32) -> ExportResult<RgbaImage> {
    let (width, height) = surface_size(grid.dimensions(), cell_pixel_size)?;
    let mut surface = RgbaImage::new(width, height);

    for (coord, color) in grid.painted() {
        // surface_size already proved these fit in u32
        let left = coord.col as u32 * cell_pixel_size;
        let top = coord.row as u32 * cell_pixel_size;
        let pixel = Rgba([color.r, color.g, color.b, u8::MAX]);
        for y in top..top + cell_pixel_size {
            for x in left..left + cell_pixel_size {
                surface.put_pixel(x, y, pixel);
            }
        }
    }

    Ok(surface)
}

pub fn export_raster(
    grid: &PixelGrid,
    cell_pixel_size: u32,
    format: ExportFormat,
) -> ExportResult<Vec<u8>> {
    let surface = render_surface(grid, cell_pixel_size)?;
    match format {
        ExportFormat::Png => encode_png(&surface),
        ExportFormat::Jpeg => encode_jpeg(&surface),
        ExportFormat::Svg | ExportFormat::Pdf => {
            Err(ExportError::UnsupportedFormat(format.to_string()))
        }
    }
}

pub fn encode_png(surface: &RgbaImage) -> ExportResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    surface.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

pub fn encode_jpeg(surface: &RgbaImage) -> ExportResult<Vec<u8>> {
    let flattened = flatten_onto(surface, JPEG_BACKGROUND);
    let mut bytes = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
        encoder.encode_image(&flattened)?;
    }
    Ok(bytes)
}

fn flatten_onto(surface: &RgbaImage, background: Color) -> RgbImage {
    let mut flattened = RgbImage::from_pixel(
        surface.width(),
        surface.height(),
        Rgb([background.r, background.g, background.b]),
    );
    for (x, y, pixel) in surface.enumerate_pixels() {
        if pixel[3] >= OPAQUE_ALPHA_THRESHOLD {
            flattened.put_pixel(x, y, Rgb([pixel[0], pixel[1], pixel[2]]));
        }
    }
    flattened
}

/// Decodes a raster artifact and reads each cell back from its centre pixel.
///
/// Transparent samples become empty cells. `cell_pixel_size` must be the
/// size used for encoding, including any high-resolution scale.
pub fn sample_cells(
    bytes: &[u8],
    dimensions: GridDimensions,
    cell_pixel_size: u32,
) -> ExportResult<PixelGrid> {
    let expected = surface_size(dimensions, cell_pixel_size)?;
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let actual = (decoded.width(), decoded.height());
    if actual != expected {
        return Err(ExportError::SampleMismatch {
            actual_width: actual.0,
            actual_height: actual.1,
            expected_width: expected.0,
            expected_height: expected.1,
        });
    }

    let mut grid = PixelGrid::new(dimensions.width, dimensions.height)?;
    let half = cell_pixel_size / 2;
    for row in 0..dimensions.height {
        for col in 0..dimensions.width {
            let x = col as u32 * cell_pixel_size + half;
            let y = row as u32 * cell_pixel_size + half;
            let pixel = decoded.get_pixel(x, y);
            if pixel[3] < OPAQUE_ALPHA_THRESHOLD {
                continue;
            }
            grid.set_cell(row, col, Some(Color::new(pixel[0], pixel[1], pixel[2])))?;
        }
    }
    Ok(grid)
}

pub(crate) fn surface_size(
    dimensions: GridDimensions,
    cell_pixel_size: u32,
) -> ExportResult<(u32, u32)> {
    let unavailable = || ExportError::SurfaceUnavailable {
        width: dimensions.width,
        height: dimensions.height,
        cell_pixel_size,
    };
    if cell_pixel_size == 0 {
        return Err(unavailable());
    }
    let (width, height) = dimensions.pixel_size(cell_pixel_size).ok_or_else(unavailable)?;
    if width == 0 || height == 0 || width > MAX_SURFACE_EDGE_PX || height > MAX_SURFACE_EDGE_PX {
        return Err(unavailable());
    }
    Ok((width, height))
}
