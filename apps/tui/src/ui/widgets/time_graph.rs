use crate::app::{App, Focus};
use crate::ui::widgets::colors::series_color;
use cube_report_core::month::month_label;
use cube_report_core::{Counters, Timestamp};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;
use std::collections::{BTreeMap, BTreeSet};

/// One line per counter, x is the month index.
pub type SeriesPoints = BTreeMap<String, Vec<(f64, f64)>>;

/// Builds chart points from a time series. Months missing a counter plot
/// as zero so every line spans the full window.
pub fn series_points(time_series: &BTreeMap<Timestamp, Counters>) -> SeriesPoints {
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

fn y_upper_bound(series: &[&SeriesPoints]) -> f64 {
    let max = series
        .iter()
        .flat_map(|points| points.values())
        .flatten()
        .map(|(_, y)| *y)
        .fold(0.0_f64, f64::max);
    (max * 1.1).max(1.0)
}

pub fn render_time_graph(app: &App, f: &mut Frame<'_>, area: Rect) {
    let focused = app.cursor.focus == Focus::Timeline;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let months = app.months();

    let block = Block::default()
        .title(graph_title(app, &months))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let state = app.state();
    let Some(data) = state.data.as_ref().filter(|_| !months.is_empty()) else {
        let text = if state.loading {
            "Loading…"
        } else {
            "No monthly data"
        };
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    };

    let current = series_points(&data.time_series);
    let previous = state
        .comparing_data
        .as_ref()
        .map(|comparing| series_points(&comparing.time_series))
        .unwrap_or_default();

    let cursor_x = app.cursor.month as f64;
    let upper = y_upper_bound(&[&current, &previous]);
    let cursor_line = [(cursor_x, 0.0), (cursor_x, upper)];

    let mut datasets: Vec<Dataset<'_>> = current
        .iter()
        .map(|(counter, points)| {
            Dataset::default()
                .name(counter.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(&app.palette, state, counter)))
                .data(points)
        })
        .collect();

    datasets.extend(previous.iter().map(|(counter, points)| {
        Dataset::default()
            .name(format!("{counter} (previous)"))
            .marker(Marker::Dot)
            .graph_type(GraphType::Line)
            .style(
                Style::default()
                    .fg(series_color(&app.palette, state, counter))
                    .add_modifier(Modifier::DIM),
            )
            .data(points)
    }));

    if focused {
        datasets.push(
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Yellow))
                .data(&cursor_line),
        );
    }

    let last = months.len().saturating_sub(1);
    let x_labels = [0, last / 2, last]
        .iter()
        .filter_map(|index| months.get(*index))
        .map(|ts| Span::raw(month_label(*ts)))
        .collect::<Vec<_>>();
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", upper / 2.0)),
        Span::raw(format!("{upper:.0}")),
    ];

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
                .labels(y_labels),
        );

    f.render_widget(chart, area);
}

fn graph_title(app: &App, months: &[Timestamp]) -> String {
    let mut title = String::from(" Monthly homicides ");
    if let Some(cursor) = months.get(app.cursor.month) {
        title.push_str(&format!("· {} ", month_label(*cursor)));
    }
    if let Some(anchor) = app.cursor.anchor {
        title.push_str(&format!("· from {} … ", month_label(anchor)));
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAN_2020: Timestamp = 1_577_836_800_000;
    const FEB_2020: Timestamp = 1_580_515_200_000;

    #[test]
    fn missing_counters_plot_as_zero() {
        let mut time_series = BTreeMap::new();
        time_series.insert(JAN_2020, Counters::from([("male".to_string(), 3.0)]));
        time_series.insert(
            FEB_2020,
            Counters::from([("male".to_string(), 4.0), ("female".to_string(), 1.0)]),
        );

        let points = series_points(&time_series);
        assert_eq!(points["male"], vec![(0.0, 3.0), (1.0, 4.0)]);
        assert_eq!(points["female"], vec![(0.0, 0.0), (1.0, 1.0)]);
    }

    #[test]
    fn upper_bound_has_headroom() {
        let mut points = SeriesPoints::new();
        points.insert("c".to_string(), vec![(0.0, 10.0)]);
        let upper = y_upper_bound(&[&points, &SeriesPoints::new()]);
        assert!((upper - 11.0).abs() < f64::EPSILON * 16.0);
        assert!((y_upper_bound(&[]) - 1.0).abs() < f64::EPSILON);
    }
}
