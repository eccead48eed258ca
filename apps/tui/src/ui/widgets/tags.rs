use cube_report_core::month::{month_label, shift_months};
use cube_report_core::{DateRange, UiState};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};

/// Kinds of chip shown above the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Group,
    Filter,
    Range,
    Comparing,
}

impl TagKind {
    const fn color(self) -> Color {
        match self {
            Self::Group => Color::Magenta,
            Self::Filter => Color::Green,
            Self::Range => Color::Yellow,
            Self::Comparing => Color::Cyan,
        }
    }
}

fn range_text(range: DateRange) -> String {
    let last = shift_months(range.end(), -1).unwrap_or_else(|| range.end());
    format!("{} – {}", month_label(range.start()), month_label(last))
}

/// Active selections as `(kind, text)` pairs, in display order.
pub fn tag_labels(state: &UiState) -> Vec<(TagKind, String)> {
    let mut tags = Vec::new();

    if let Some(group) = &state.group {
        tags.push((TagKind::Group, format!("by {group}")));
    }
    for (dimension, values) in state.filter.active() {
        tags.push((TagKind::Filter, format!("{dimension}: {}", values.join(" | "))));
    }
    if let Some(range) = state.range {
        tags.push((TagKind::Range, range_text(range)));
    }
    if let Some(window) = state.active_comparing_range() {
        tags.push((TagKind::Comparing, format!("vs {}", range_text(window))));
    }

    tags
}

pub fn tags_line(state: &UiState) -> TextLine<'static> {
    let tags = tag_labels(state);
    if tags.is_empty() {
        return TextLine::from(Span::styled(
            "All homicides, full period",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut spans = Vec::with_capacity(tags.len() * 2);
    for (kind, text) in tags {
        spans.push(Span::styled(
            format!("[{text}]"),
            Style::default().fg(kind.color()).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));
    }
    TextLine::from(spans)
}
