use crate::app::App;
use crate::ui::widgets::bars::render_bars;
use crate::ui::widgets::tags::tags_line;
use crate::ui::widgets::time_graph::render_time_graph;
use cube_report_core::LoadPhase;
use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use throbber_widgets_tui::BRAILLE_SIX;

pub fn render_dashboard(app: &App, f: &mut Frame<'_>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Title and selections
            Constraint::Percentage(40), // Monthly series
            Constraint::Min(6),         // Category breakdown
            Constraint::Length(4),      // Status
            Constraint::Length(1),      // Shortcuts hint
        ])
        .split(f.area().inner(Margin::new(1, 0)));

    render_title_section(app, f, layout[0]);
    render_time_graph(app, f, layout[1]);
    render_bars(app, f, layout[2]);
    render_status_section(app, f, layout[3]);
    render_shortcuts(app, f, layout[4]);
}

fn render_title_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title("== Homicide Report ==")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(tags_line(app.state())).block(block);
    f.render_widget(paragraph, area);
}

fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let state = app.state();
    let first_line = match state.phase() {
        LoadPhase::Loading => TextLine::from(vec![
            Span::styled(spinner_symbol(app), Style::default().fg(Color::Cyan)),
            Span::styled(" Loading cube data", Style::default().fg(Color::Gray)),
        ]),
        LoadPhase::Errored => TextLine::from(Span::styled(
            format!("Error: {}", state.error.as_deref().unwrap_or_default()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        LoadPhase::Loaded | LoadPhase::Idle => TextLine::from(Span::styled(
            app.status_message.clone(),
            Style::default().fg(Color::Green),
        )),
    };

    let share_line = TextLine::from(vec![
        Span::styled("Share: ", Style::default().fg(Color::Gray)),
        Span::styled(app.share_command(), Style::default().fg(Color::White)),
    ]);

    let paragraph = Paragraph::new(Text::from(vec![first_line, share_line]))
        .block(
            Block::default()
                .title(" Status ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn spinner_symbol(app: &App) -> &'static str {
    let symbols = BRAILLE_SIX.symbols;
    let step = usize::try_from(app.throbber.index()).unwrap_or(0);
    symbols.get(step % symbols.len().max(1)).copied().unwrap_or(" ")
}

fn render_shortcuts(app: &App, f: &mut Frame<'_>, area: Rect) {
    let hint = TextLine::from(vec![
        Span::styled(
            format!("[{}] ", app.cursor.focus.label()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Tab focus · Enter range · c compare · x clear · Space filter · g group · ? help · q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(hint), area);
}
