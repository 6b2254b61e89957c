use std::io::Write;

use super::raster::{encode_jpeg, render_surface};
use super::{ExportError, ExportResult};
use crate::grid::PixelGrid;

/// A4 portrait in PDF points.
pub const A4_WIDTH_PT: f64 = 595.28;
pub const A4_HEIGHT_PT: f64 = 841.89;
/// 10 mm in PDF points.
pub const DEFAULT_MARGIN_PT: f64 = 28.35;

/// JPEG-encoded render of a grid, ready to be placed on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSnapshot {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

impl RasterSnapshot {
    pub fn capture(grid: &PixelGrid, cell_pixel_size: u32) -> ExportResult<Self> {
        let surface = render_surface(grid, cell_pixel_size)?;
        Ok(Self {
            width: surface.width(),
            height: surface.height(),
            jpeg: encode_jpeg(&surface)?,
        })
    }
}

/// Wraps a raster snapshot into a single-page print document.
pub trait DocumentEncoder: Send + Sync {
    fn encode_page(&self, snapshot: &RasterSnapshot) -> ExportResult<Vec<u8>>;
}

/// Placement of the image on the page, in points from the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Minimal PDF 1.4 writer: one page holding one DCT-encoded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfDocumentEncoder {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
}

impl Default for PdfDocumentEncoder {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH_PT,
            page_height: A4_HEIGHT_PT,
            margin: DEFAULT_MARGIN_PT,
        }
    }
}

impl PdfDocumentEncoder {
    /// Scales the image uniformly to fit inside the margins, anchored top-left.
    pub fn placement(&self, width_px: u32, height_px: u32) -> ExportResult<PagePlacement> {
        let available_width = self.page_width - 2.0 * self.margin;
        let available_height = self.page_height - 2.0 * self.margin;
        if width_px == 0 || height_px == 0 || available_width <= 0.0 || available_height <= 0.0 {
            return Err(ExportError::Document(format!(
                "cannot place a {width_px}x{height_px} image on a {}x{} page with margin {}",
                self.page_width, self.page_height, self.margin
            )));
        }

        let scale = (available_width / f64::from(width_px))
            .min(available_height / f64::from(height_px));
        let width = f64::from(width_px) * scale;
        let height = f64::from(height_px) * scale;
        Ok(PagePlacement {
            x: self.margin,
            y: self.page_height - self.margin - height,
            width,
            height,
        })
    }
}

impl DocumentEncoder for PdfDocumentEncoder {
    fn encode_page(&self, snapshot: &RasterSnapshot) -> ExportResult<Vec<u8>> {
        let placement = self.placement(snapshot.width, snapshot.height)?;
        let mut pdf = PdfWriter::new();

        pdf.object(b"<< /Type /Catalog /Pages 2 0 R >>")?;
        pdf.object(b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>")?;
        pdf.object(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /XObject << /Im0 4 0 R >> >> /Contents 5 0 R >>",
                self.page_width, self.page_height
            )
            .as_bytes(),
        )?;
        pdf.stream(
            &format!(
                "/Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode",
                snapshot.width, snapshot.height
            ),
            &snapshot.jpeg,
        )?;
        let content = format!(
            "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/Im0 Do\nQ",
            placement.width, placement.height, placement.x, placement.y
        );
        pdf.stream("", content.as_bytes())?;

        pdf.finish(1)
    }
}

struct PdfWriter {
    bytes: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            bytes,
            offsets: Vec::new(),
        }
    }

    fn begin_object(&mut self) -> ExportResult<()> {
        self.offsets.push(self.bytes.len());
        write!(self.bytes, "{} 0 obj\n", self.offsets.len()).map_err(io_error)
    }

    fn object(&mut self, body: &[u8]) -> ExportResult<()> {
        self.begin_object()?;
        self.bytes.extend_from_slice(body);
        self.bytes.extend_from_slice(b"\nendobj\n");
        Ok(())
    }

    fn stream(&mut self, dictionary: &str, data: &[u8]) -> ExportResult<()> {
        self.begin_object()?;
        let separator = if dictionary.is_empty() { "" } else { " " };
        write!(
            self.bytes,
            "<< {dictionary}{separator}/Length {} >>\nstream\n",
            data.len()
        )
        .map_err(io_error)?;
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\nendstream\nendobj\n");
        Ok(())
    }

    fn finish(mut self, root: usize) -> ExportResult<Vec<u8>> {
        let xref_offset = self.bytes.len();
        let size = self.offsets.len() + 1;
        write!(self.bytes, "xref\n0 {size}\n0000000000 65535 f \n").map_err(io_error)?;
        for offset in &self.offsets {
            write!(self.bytes, "{offset:010} 00000 n \n").map_err(io_error)?;
        }
        write!(
            self.bytes,
            "trailer\n<< /Size {size} /Root {root} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        )
        .map_err(io_error)?;
        Ok(self.bytes)
    }
}

fn io_error(err: std::io::Error) -> ExportError {
    ExportError::Document(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::export::raster::sample_cells;

    fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
        haystack[from..]
            .windows(needle.len())
            .position(|window| window == needle)
            .map(|index| index + from)
    }

    fn embedded_jpeg(pdf: &[u8]) -> &[u8] {
        let image = find(pdf, b"/Subtype /Image", 0).expect("image object present");
        let start = find(pdf, b"stream\n", image).expect("image stream present") + 7;
        let end = find(pdf, b"\nendstream", start).expect("image stream terminated");
        &pdf[start..end]
    }

    fn sample_grid() -> PixelGrid {
        let mut grid = PixelGrid::new(3, 2).expect("positive dimensions");
        grid.set_cell(0, 0, Some(Color::new(0xE5, 0x39, 0x35)))
            .expect("cell in range");
        grid.set_cell(1, 1, Some(Color::new(0x1E, 0x88, 0xE5)))
            .expect("cell in range");
        grid
    }

    #[test]
    fn pdf_has_header_trailer_and_valid_xref_offset() {
        let snapshot = RasterSnapshot::capture(&sample_grid(), 16).expect("snapshot");
        let pdf = PdfDocumentEncoder::default()
            .encode_page(&snapshot)
            .expect("pdf should encode");

        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert!(pdf.ends_with(b"%%EOF\n"));

        let marker = find(&pdf, b"startxref\n", 0).expect("startxref present") + 10;
        let end = find(&pdf, b"\n", marker).expect("offset line terminated");
        let offset: usize = std::str::from_utf8(&pdf[marker..end])
            .expect("ascii offset")
            .parse()
            .expect("numeric offset");
        assert!(pdf[offset..].starts_with(b"xref\n0 6\n"));

        let first_entry = offset + "xref\n0 6\n".len() + 20;
        let catalog: usize = std::str::from_utf8(&pdf[first_entry..first_entry + 10])
            .expect("ascii offset")
            .parse()
            .expect("numeric offset");
        assert!(pdf[catalog..].starts_with(b"1 0 obj\n<< /Type /Catalog"));
    }

    #[test]
    fn embedded_image_decodes_back_to_the_grid() {
        let grid = sample_grid();
        let snapshot = RasterSnapshot::capture(&grid, 16).expect("snapshot");
        assert_eq!((snapshot.width, snapshot.height), (48, 32));

        let pdf = PdfDocumentEncoder::default()
            .encode_page(&snapshot)
            .expect("pdf should encode");
        assert!(find(&pdf, b"/Width 48 /Height 32", 0).is_some());
        assert!(find(&pdf, b"/Filter /DCTDecode", 0).is_some());

        let jpeg = embedded_jpeg(&pdf);
        assert_eq!(jpeg, snapshot.jpeg.as_slice());
        let sampled = sample_cells(jpeg, grid.dimensions(), 16).expect("jpeg samples");
        let near = |a: u8, b: u8| (i16::from(a) - i16::from(b)).abs() <= 12;
        for (coord, color) in grid.painted() {
            let decoded = sampled
                .get_cell(coord.row, coord.col)
                .expect("cell in range")
                .expect("jpeg output is opaque");
            assert!(
                near(color.r, decoded.r) && near(color.g, decoded.g) && near(color.b, decoded.b),
                "{coord:?}: expected {color}, got {decoded}"
            );
        }
    }

    #[test]
    fn placement_fits_wide_images_to_the_margin_width() {
        let encoder = PdfDocumentEncoder::default();
        let placement = encoder.placement(400, 100).expect("placement");
        let available = A4_WIDTH_PT - 2.0 * DEFAULT_MARGIN_PT;
        assert!((placement.width - available).abs() < 1e-9);
        assert!((placement.height - available / 4.0).abs() < 1e-9);
        assert_eq!(placement.x, DEFAULT_MARGIN_PT);
        assert!(
            (placement.y + placement.height - (A4_HEIGHT_PT - DEFAULT_MARGIN_PT)).abs() < 1e-9
        );
    }

    #[test]
    fn placement_fits_tall_images_to_the_margin_height() {
        let encoder = PdfDocumentEncoder::default();
        let placement = encoder.placement(10, 1000).expect("placement");
        let available = A4_HEIGHT_PT - 2.0 * DEFAULT_MARGIN_PT;
        assert!((placement.height - available).abs() < 1e-9);
        assert!((placement.y - DEFAULT_MARGIN_PT).abs() < 1e-9);
    }

    #[test]
    fn placement_rejects_pages_smaller_than_their_margins() {
        let encoder = PdfDocumentEncoder {
            page_width: 20.0,
            page_height: 20.0,
            margin: 15.0,
        };
        assert!(matches!(
            encoder.placement(10, 10),
            Err(ExportError::Document(_))
        ));
    }
}
