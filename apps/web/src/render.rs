use cube_report_core::month::month_label;
use cube_report_core::{ColorStrategy, Counters, Focus, HistoryPort, Rgb, Timestamp};
use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line as TextLine, Span, Text},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType,
        Paragraph, Wrap,
    },
    Frame,
};
use std::collections::{BTreeMap, BTreeSet};

use crate::dashboard::WebDashboard;

const fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub fn render_dashboard<H: HistoryPort>(
    dashboard: &WebDashboard<H>,
    columns: usize,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(40),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(dashboard, f, main_layout[0]);
    render_time_graph(dashboard, f, main_layout[1]);
    render_bar_group(dashboard, columns, f, main_layout[2]);
    render_footer(dashboard, f, main_layout[3]);

    if dashboard.show_help {
        render_help(f, area);
    }
}

fn render_header<H: HistoryPort>(dashboard: &WebDashboard<H>, f: &mut Frame<'_>, area: Rect) {
    let state = dashboard.state();
    let mut spans = Vec::new();

    if let Some(group) = &state.group {
        spans.push(tag(format!("by {group}"), Color::Magenta));
    }
    for (dimension, values) in state.filter.active() {
        spans.push(tag(format!("{dimension}: {}", values.join(" | ")), Color::Green));
    }
    if let Some(range) = state.range {
        spans.push(tag(format!("from {}", month_label(range.start())), Color::Yellow));
    }
    if let Some(window) = state.active_comparing_range() {
        spans.push(tag(format!("vs {}", month_label(window.start())), Color::Cyan));
    }
    if spans.is_empty() {
        spans.push(Span::styled(
            "All homicides, full period",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let block = Block::default()
        .title("Homicide Report")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(Text::from(TextLine::from(spans)))
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn tag(text: String, color: Color) -> Span<'static> {
    Span::styled(
        format!("[{text}] "),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

fn series_points(time_series: &BTreeMap<Timestamp, Counters>) -> BTreeMap<String, Vec<(f64, f64)>> {
    let counters: BTreeSet<&String> = time_series.values().flat_map(Counters::keys).collect();
    counters
        .into_iter()
        .map(|counter| {
            let points = time_series
                .values()
                .enumerate()
                .map(|(index, values)| {
                    (index as f64, values.get(counter).copied().unwrap_or(0.0))
                })
                .collect();
            (counter.clone(), points)
        })
        .collect()
}

fn render_time_graph<H: HistoryPort>(dashboard: &WebDashboard<H>, f: &mut Frame<'_>, area: Rect) {
    let state = dashboard.state();
    let months = dashboard.months();
    let border = if dashboard.cursor.focus == Focus::Timeline {
        Color::Cyan
    } else {
        Color::Gray
    };
    let mut title = String::from("Monthly homicides");
    if let Some(cursor) = months.get(dashboard.cursor.month) {
        title = format!("{title} · {}", month_label(*cursor));
    }
    if let Some(anchor) = dashboard.cursor.anchor {
        title = format!("{title} · from {} …", month_label(anchor));
    }
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let Some(data) = state.data.as_ref().filter(|_| !months.is_empty()) else {
        let text = if state.loading {
            "Loading cube data..."
        } else {
            "No monthly data"
        };
        f.render_widget(
            Paragraph::new(text).block(block).alignment(Alignment::Center),
            area,
        );
        return;
    };

    let current = series_points(&data.time_series);
    let previous = state
        .comparing_data
        .as_ref()
        .map(|comparing| series_points(&comparing.time_series))
        .unwrap_or_default();
    let max = current
        .values()
        .chain(previous.values())
        .flatten()
        .map(|(_, y)| *y)
        .fold(0.0_f64, f64::max);
    let upper = (max * 1.1).max(1.0);

    let color_for = |counter: &str| {
        let rgb = match state.group.as_deref() {
            Some(group) => dashboard.palette.color(Some(counter), group),
            None => dashboard.palette.color(None, ""),
        };
        to_color(rgb)
    };

    let mut datasets = current
        .iter()
        .map(|(counter, points)| {
            Dataset::default()
                .name(counter.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color_for(counter)))
                .data(points)
        })
        .collect::<Vec<_>>();
    datasets.extend(previous.iter().map(|(counter, points)| {
        Dataset::default()
            .name(format!("{counter} (previous)"))
            .marker(Marker::Dot)
            .graph_type(GraphType::Line)
            .style(
                Style::default()
                    .fg(color_for(counter))
                    .add_modifier(Modifier::DIM),
            )
            .data(points)
    }));

    let last = months.len().saturating_sub(1);
    let x_labels = [0, last]
        .iter()
        .filter_map(|index| months.get(*index))
        .map(|ts| Span::raw(month_label(*ts)))
        .collect::<Vec<_>>();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, last.max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, upper])
                .labels(vec![Span::raw("0"), Span::raw(format!("{upper:.0}"))]),
        );
    f.render_widget(chart, area);
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bar_value(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

fn render_bar_group<H: HistoryPort>(
    dashboard: &WebDashboard<H>,
    columns: usize,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let rows = dashboard.rows();
    if rows.is_empty() {
        let paragraph = Paragraph::new("No categories in this view")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, area);
        return;
    }

    let columns = columns.max(1);
    let grid_height = rows.len().div_ceil(columns);
    let row_ratio = u32::try_from(grid_height).unwrap_or(1);
    let column_ratio = u32::try_from(columns).unwrap_or(1);
    let grid = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, row_ratio); grid_height])
        .split(area);

    for (grid_row, row_area) in grid.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, column_ratio); columns])
            .split(*row_area);
        for (column, cell) in cells.iter().enumerate() {
            let index = grid_row * columns + column;
            let Some((dimension, counters)) = rows.get(index) else {
                continue;
            };
            render_bar_chart(dashboard, index, dimension, counters, f, *cell);
        }
    }
}

fn render_bar_chart<H: HistoryPort>(
    dashboard: &WebDashboard<H>,
    index: usize,
    dimension: &str,
    counters: &Counters,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let state = dashboard.state();
    let selected_row = dashboard.cursor.focus == Focus::Bars && dashboard.cursor.row == index;
    let previous = state
        .comparing_data
        .as_ref()
        .and_then(|data| data.counter_series.get(dimension));

    let title = if state.group.as_deref() == Some(dimension) {
        format!("{dimension} [grouped]")
    } else {
        dimension.to_string()
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if selected_row {
            Color::Cyan
        } else {
            Color::Gray
        }));

    let mut chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(u16::from(previous.is_some()));

    for (item_index, (name, value)) in counters.iter().enumerate() {
        let color = to_color(dashboard.palette.color(Some(name), dimension));
        let mut label_style = Style::default().fg(Color::Gray);
        if state.filter.is_selected(dimension, name) {
            label_style = label_style.fg(Color::White).add_modifier(Modifier::BOLD);
        }
        if selected_row && dashboard.cursor.item == item_index {
            label_style = label_style.add_modifier(Modifier::REVERSED);
        }

        let mut bars = vec![Bar::default()
            .value(bar_value(*value))
            .label(TextLine::styled(name.clone(), label_style))
            .text_value(format!("{value}"))
            .style(Style::default().fg(color))];
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

fn render_footer<H: HistoryPort>(dashboard: &WebDashboard<H>, f: &mut Frame<'_>, area: Rect) {
    let state = dashboard.state();
    let line = if let Some(error) = &state.error {
        TextLine::from(Span::styled(
            format!("Error: {error}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else if state.loading {
        TextLine::from(Span::styled("Loading...", Style::default().fg(Color::Gray)))
    } else {
        TextLine::from(vec![
            Span::styled("Tab", Style::default().fg(Color::Gray)),
            Span::raw(" focus  "),
            Span::styled("Enter", Style::default().fg(Color::Gray)),
            Span::raw(" range  "),
            Span::styled("c/x", Style::default().fg(Color::Gray)),
            Span::raw(" compare/clear  "),
            Span::styled("Space/g", Style::default().fg(Color::Gray)),
            Span::raw(" filter/group  "),
            Span::styled("?", Style::default().fg(Color::Gray)),
            Span::raw(" help"),
        ])
    };
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_help(f: &mut Frame<'_>, area: Rect) {
    let popup = Rect {
        x: area.x + area.width / 6,
        y: area.y + area.height / 6,
        width: area.width * 2 / 3,
        height: area.height * 2 / 3,
    };
    let lines = [
        "Tab        switch between timeline and bars",
        "Left/Right move the month cursor or the selected bar",
        "Up/Down    move between bar charts",
        "Home/End   first or last month, PgUp/PgDn by six",
        "Enter      mark first, then last month of a range",
        "c          compare with the preceding window",
        "x          clear the date range",
        "Space      toggle a filter on the selected bar",
        "g          group by the selected chart",
        "r          reload",
    ]
    .into_iter()
    .map(TextLine::from)
    .collect::<Vec<_>>();

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title("Help (Esc to close)")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        popup,
    );
}
