use crate::ui::widgets::popup::centered_rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

const SHORTCUTS: &[(&str, &str)] = &[
    ("Tab", "Switch between timeline and breakdown"),
    ("←/→", "Move the month cursor / the selected bar"),
    ("↑/↓", "Move between breakdown charts"),
    ("Enter", "Timeline: mark first, then last month of a range"),
    ("Esc", "Cancel a half-marked range"),
    ("x", "Clear the date range"),
    ("c", "Compare with the preceding window of equal length"),
    ("Space", "Toggle a filter on the selected bar"),
    ("g", "Group by the selected chart's dimension"),
    ("r", "Reload"),
    ("?/F1", "Toggle this help"),
    ("q", "Quit"),
];

pub fn render_help_popup(f: &mut Frame<'_>) {
    let area = centered_rect(70, 70, f.area());

    let mut lines = vec![
        TextLine::from(Span::styled(
            "Keyboard shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
    ];
    lines.extend(SHORTCUTS.iter().map(|(key, action)| {
        TextLine::from(vec![
            Span::styled(
                format!("{key:>7}  "),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(*action),
        ])
    }));
    lines.push(TextLine::from(""));
    lines.push(TextLine::from(Span::styled(
        "The status bar shows a command that reopens the current view.",
        Style::default().fg(Color::Gray),
    )));

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Help (Esc to close) ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}
