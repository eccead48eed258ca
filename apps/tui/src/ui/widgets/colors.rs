use cube_report_core::{ColorStrategy, Rgb, UiState};
use ratatui::style::Color;

pub const fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Color of a time-series counter. Ungrouped data is a single total line.
pub fn series_color(palette: &impl ColorStrategy, state: &UiState, counter: &str) -> Color {
    let rgb = match state.group.as_deref() {
        Some(group) => palette.color(Some(counter), group),
        None => palette.color(None, ""),
    };
    to_color(rgb)
}

pub fn category_color(palette: &impl ColorStrategy, dimension: &str, name: &str) -> Color {
    to_color(palette.color(Some(name), dimension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_report_core::CategoryPalette;

    #[test]
    fn ungrouped_series_use_the_total_color() {
        let palette = CategoryPalette::new();
        let state = UiState::default();
        assert_eq!(series_color(&palette, &state, "c"), Color::Rgb(0x31, 0x82, 0xbd));
    }

    #[test]
    fn grouped_series_follow_category_colors() {
        let palette = CategoryPalette::new();
        let state = UiState {
            group: Some("sex".to_string()),
            ..UiState::default()
        };
        assert_eq!(series_color(&palette, &state, "female"), Color::Rgb(0xc7, 0x61, 0xc1));
        assert_eq!(category_color(&palette, "sex", "male"), Color::Rgb(0x72, 0x9c, 0xd1));
    }
}
