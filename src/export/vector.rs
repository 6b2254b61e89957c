use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::raster::surface_size;
use super::{ExportError, ExportResult};
use crate::grid::PixelGrid;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// SVG document with one `<rect>` per painted cell.
///
/// The root declares the same pixel size as the raster export; empty cells
/// emit nothing.
pub fn export_vector(grid: &PixelGrid, cell_pixel_size: u32) -> ExportResult<String> {
    let (width, height) = surface_size(grid.dimensions(), cell_pixel_size)?;
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let width = width.to_string();
    let height = height.to_string();
    let view_box = format!("0 0 {width} {height}");
    let mut root = BytesStart::new("svg");
    root.push_attribute(("xmlns", SVG_NAMESPACE));
    root.push_attribute(("width", width.as_str()));
    root.push_attribute(("height", height.as_str()));
    root.push_attribute(("viewBox", view_box.as_str()));
    root.push_attribute(("shape-rendering", "crispEdges"));
    writer.write_event(Event::Start(root))?;

    let size = cell_pixel_size.to_string();
    for (coord, color) in grid.painted() {
        let x = (coord.col as u64 * u64::from(cell_pixel_size)).to_string();
        let y = (coord.row as u64 * u64::from(cell_pixel_size)).to_string();
        let fill = color.to_hex();

        let mut rect = BytesStart::new("rect");
        rect.push_attribute(("x", x.as_str()));
        rect.push_attribute(("y", y.as_str()));
        rect.push_attribute(("width", size.as_str()));
        rect.push_attribute(("height", size.as_str()));
        rect.push_attribute(("fill", fill.as_str()));
        writer.write_event(Event::Empty(rect))?;
    }

    writer.write_event(Event::End(BytesEnd::new("svg")))?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|err| ExportError::Document(format!("svg output is not utf-8: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use quick_xml::Reader;
    use std::collections::HashMap;

    fn attributes(element: &BytesStart<'_>) -> HashMap<String, String> {
        element
            .attributes()
            .map(|attr| {
                let attr = attr.expect("attribute should parse");
                (
                    String::from_utf8(attr.key.as_ref().to_vec()).expect("utf-8 key"),
                    String::from_utf8(attr.value.to_vec()).expect("utf-8 value"),
                )
            })
            .collect()
    }

    /// Root attributes plus the attributes of every `<rect>`.
    fn parse_svg(markup: &str) -> (HashMap<String, String>, Vec<HashMap<String, String>>) {
        let mut reader = Reader::from_str(markup);
        let mut root = HashMap::new();
        let mut rects = Vec::new();
        loop {
            match reader.read_event().expect("svg should parse") {
                Event::Start(element) if element.name().as_ref() == b"svg" => {
                    root = attributes(&element);
                }
                Event::Empty(element) if element.name().as_ref() == b"rect" => {
                    rects.push(attributes(&element));
                }
                Event::Eof => break,
                _ => {}
            }
        }
        (root, rects)
    }

    #[test]
    fn single_painted_cell_emits_exactly_one_rect() {
        let mut grid = PixelGrid::square(2).expect("positive dimensions");
        grid.set_cell(0, 0, Some(Color::from_hex("#FF0000").expect("valid hex")))
            .expect("cell in range");

        let markup = export_vector(&grid, 30).expect("svg export");
        let (root, rects) = parse_svg(&markup);

        assert_eq!(root["width"], "60");
        assert_eq!(root["height"], "60");
        assert_eq!(root["viewBox"], "0 0 60 60");
        assert_eq!(root["xmlns"], SVG_NAMESPACE);

        assert_eq!(rects.len(), 1);
        let rect = &rects[0];
        assert_eq!(rect["x"], "0");
        assert_eq!(rect["y"], "0");
        assert_eq!(rect["width"], "30");
        assert_eq!(rect["height"], "30");
        assert_eq!(rect["fill"], "#FF0000");
    }

    #[test]
    fn rect_positions_follow_column_and_row() {
        let mut grid = PixelGrid::new(4, 3).expect("positive dimensions");
        grid.set_cell(2, 1, Some(Color::new(0x12, 0x34, 0x56)))
            .expect("cell in range");
        grid.set_cell(0, 3, Some(Color::new(0xAB, 0xCD, 0xEF)))
            .expect("cell in range");

        let markup = export_vector(&grid, 10).expect("svg export");
        let (root, rects) = parse_svg(&markup);
        assert_eq!(root["width"], "40");
        assert_eq!(root["height"], "30");

        let placed = rects
            .iter()
            .map(|rect| (rect["x"].clone(), rect["y"].clone(), rect["fill"].clone()))
            .collect::<Vec<_>>();
        assert_eq!(
            placed,
            vec![
                ("30".to_string(), "0".to_string(), "#ABCDEF".to_string()),
                ("10".to_string(), "20".to_string(), "#123456".to_string()),
            ]
        );
    }

    #[test]
    fn fill_attributes_round_trip_every_color_exactly() {
        let mut grid = PixelGrid::new(8, 8).expect("positive dimensions");
        for (index, color) in crate::color::default_palette().into_iter().take(64).enumerate() {
            grid.set_cell(index / 8, index % 8, Some(color))
                .expect("cell in range");
        }

        let markup = export_vector(&grid, 1).expect("svg export");
        let (_, rects) = parse_svg(&markup);
        let mut decoded = PixelGrid::new(8, 8).expect("positive dimensions");
        for rect in &rects {
            let col: usize = rect["x"].parse().expect("numeric x");
            let row: usize = rect["y"].parse().expect("numeric y");
            let color = Color::from_hex(&rect["fill"]).expect("fill is hex");
            decoded.set_cell(row, col, Some(color)).expect("cell in range");
        }
        assert_eq!(
            decoded.painted().collect::<Vec<_>>(),
            grid.painted().collect::<Vec<_>>()
        );
    }

    #[test]
    fn empty_grid_emits_only_the_root_element() {
        let grid = PixelGrid::square(3).expect("positive dimensions");
        let (root, rects) = parse_svg(&export_vector(&grid, 5).expect("svg export"));
        assert_eq!(root["width"], "15");
        assert!(rects.is_empty());
    }
}
