use crate::app::{App, Focus};
use crate::ui::widgets::colors::category_color;
use cube_report_core::Counters;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line as TextLine;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph};
use ratatui::Frame;

/// Bar heights are whole numbers; negative or non-finite counts draw empty.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn bar_value(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// Splits `count` charts into grid rows of `columns` cells.
pub fn grid_rows(count: usize, columns: usize) -> usize {
    count.div_ceil(columns.max(1))
}

pub fn render_bars(app: &App, f: &mut Frame<'_>, area: Rect) {
    let rows = app.rows();
    if rows.is_empty() {
        let block = Block::default()
            .title(" Breakdown ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let text = if app.state().loading {
            "Loading…"
        } else {
            "No categories in this view"
        };
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let columns = app.columns();
    let grid_height = grid_rows(rows.len(), columns);
    let row_ratio = u32::try_from(grid_height).unwrap_or(1);
    let column_ratio = u32::try_from(columns).unwrap_or(1);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, row_ratio); grid_height])
        .split(area);

    for (grid_row, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, column_ratio); columns])
            .split(*row_area);

        for (column, cell) in cells.iter().enumerate() {
            let index = grid_row * columns + column;
            if let Some((dimension, counters)) = rows.get(index) {
                render_dimension(app, f, *cell, index, dimension, counters);
            }
        }
    }
}

fn render_dimension(
    app: &App,
    f: &mut Frame<'_>,
    area: Rect,
    index: usize,
    dimension: &str,
    counters: &Counters,
) {
    let state = app.state();
    let selected_row = app.cursor.focus == Focus::Bars && app.cursor.row == index;
    let previous = state
        .comparing_data
        .as_ref()
        .and_then(|data| data.counter_series.get(dimension));

    let mut title = format!(" {dimension} ");
    if state.group.as_deref() == Some(dimension) {
        title.push_str("[grouped] ");
    }

    let border_color = if selected_row {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let mut chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(u16::from(previous.is_some()));

    for (item_index, (name, value)) in counters.iter().enumerate() {
        let color = category_color(&app.palette, dimension, name);
        let mut label_style = Style::default().fg(Color::Gray);
        if state.filter.is_selected(dimension, name) {
            label_style = label_style.fg(Color::White).add_modifier(Modifier::BOLD);
        }
        if selected_row && app.cursor.item == item_index {
            label_style = label_style.add_modifier(Modifier::REVERSED);
        }

        let mut bars = vec![Bar::default()
            .value(bar_value(*value))
            .label(TextLine::styled(name.clone(), label_style))
            .text_value(format!("{value}"))
            .style(Style::default().fg(color))
            .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))];

        if let Some(previous) = previous {
            let before = previous.get(name).copied().unwrap_or(0.0);
            bars.push(
                Bar::default()
                    .value(bar_value(before))
                    .label(TextLine::from("  prev"))
                    .text_value(format!("{before}"))
                    .style(Style::default().fg(color).add_modifier(Modifier::DIM)),
            );
        }

        chart = chart.data(BarGroup::default().bars(&bars));
    }

    f.render_widget(chart, area);
}
