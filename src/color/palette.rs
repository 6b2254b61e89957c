use super::Color;

pub const MAX_PALETTE_SIZE: usize = 96;

const DEFAULT_PALETTE_HEX: &[&str] = &[
    // red
    "#FFEBEE", "#FFCDD2", "#EF9A9A", "#E57373", "#EF5350", "#F44336", "#E53935", "#D32F2F",
    "#C62828", "#B71C1C", //
    // orange
    "#FFF3E0", "#FFE0B2", "#FFCC80", "#FFB74D", "#FFA726", "#FF9800", "#FB8C00", "#F57C00",
    "#EF6C00", "#E65100", //
    // yellow
    "#FFFDE7", "#FFF9C4", "#FFF59D", "#FFF176", "#FFEE58", "#FFEB3B", "#FDD835", "#FBC02D",
    "#F9A825", "#F57F17", //
    // green
    "#E8F5E9", "#C8E6C9", "#A5D6A7", "#81C784", "#66BB6A", "#4CAF50", "#43A047", "#388E3C",
    "#2E7D32", "#1B5E20", //
    // blue
    "#E3F2FD", "#BBDEFB", "#90CAF9", "#64B5F6", "#42A5F5", "#2196F3", "#1E88E5", "#1976D2",
    "#1565C0", "#0D47A1", //
    // purple
    "#F3E5F5", "#E1BEE7", "#CE93D8", "#BA68C8", "#AB47BC", "#9C27B0", "#8E24AA", "#7B1FA2",
    "#6A1B9A", "#4A148C", //
    // gray
    "#FAFAFA", "#F5F5F5", "#EEEEEE", "#E0E0E0", "#BDBDBD", "#9E9E9E", "#757575", "#616161",
    "#424242", "#212121", //
    // basics
    "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
];

/// Swatches offered by the color picker when no palette is configured.
pub fn default_palette() -> Vec<Color> {
    DEFAULT_PALETTE_HEX
        .iter()
        .filter_map(|hex| Color::from_hex(hex).ok())
        .collect()
}

/// Parses a configured palette, skipping invalid and duplicate entries.
///
/// Returns `None` when nothing usable remains so callers fall back to
/// [`default_palette`].
pub fn parse_palette(values: &[String]) -> Option<Vec<Color>> {
    if values.is_empty() {
        tracing::warn!("palette override is empty; ignoring");
        return None;
    }

    let mut parsed: Vec<Color> = Vec::with_capacity(values.len().min(MAX_PALETTE_SIZE));
    let mut truncated = false;
    for value in values {
        if parsed.len() >= MAX_PALETTE_SIZE {
            truncated = true;
            break;
        }
        let Ok(color) = Color::from_hex(value) else {
            tracing::warn!(value = value.as_str(), "invalid palette entry; expected #RRGGBB");
            continue;
        };
        if !parsed.contains(&color) {
            parsed.push(color);
        }
    }
    if truncated {
        tracing::warn!(
            max = MAX_PALETTE_SIZE,
            "palette supports up to `max` colors; extra entries were ignored"
        );
    }

    if parsed.is_empty() {
        tracing::warn!("no valid colors in palette override; ignoring");
        return None;
    }
    Some(parsed)
}
