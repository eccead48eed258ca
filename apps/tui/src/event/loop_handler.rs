use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use cube_report_core::month::format_month;
use cube_report_core::{encode, Counters, FetchResult};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::collections::BTreeMap;
use std::io::Stdout;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::app::{handle_input, App};
use crate::cube::{CubeClient, FetchOutcome};
use crate::ui;

/// Run the dashboard without a UI: load once and print the result
pub async fn run_headless(app: &mut App, client: &CubeClient, json: bool) -> Result<()> {
    app.mount();

    // a primary load may ask for the comparison load, so drain until idle
    loop {
        let pending = app.take_pending();
        if pending.is_empty() {
            break;
        }
        for command in pending {
            let outcome = client.execute(command).await;
            app.apply_outcome(outcome);
        }
    }

    let report = build_headless_report(app);
    if report.data.is_none() {
        let reason = report.error.as_deref().unwrap_or("no data returned");
        return Err(eyre!("Failed to load cube data: {reason}"));
    }

    if json {
        render_headless_json(&report)?;
    } else {
        render_headless_stats(&report);
    }

    Ok(())
}

fn render_headless_stats(report: &HeadlessReport) {
    println!("\nHomicide Report");
    println!("===============");
    println!("Source: {}", report.source);
    if !report.query.is_empty() {
        println!("Query: {}", report.query);
    }
    if let Some(error) = &report.error {
        println!("Warning: {error}");
    }

    if let Some(data) = &report.data {
        print_section("Monthly counts", data);
    }
    if let Some(data) = &report.comparing {
        print_section("Comparison window", data);
    }
}

fn print_section(title: &str, data: &HeadlessData) {
    println!("\n{title}:");
    for (month, counters) in &data.months {
        println!("- {month}: {}", format_counters(counters));
    }

    if !data.series.is_empty() {
        println!("\nBy category:");
        for (key, counters) in &data.series {
            println!("- {key}: {}", format_counters(counters));
        }
    }
}

fn format_counters(counters: &Counters) -> String {
    counters
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_headless_json(report: &HeadlessReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn build_headless_report(app: &App) -> HeadlessReport {
    let state = app.state();
    HeadlessReport {
        source: app.controller.endpoint().base().to_string(),
        query: encode(state),
        generated_at: chrono::Utc::now().to_rfc3339(),
        error: state.error.clone(),
        data: state.data.as_ref().map(HeadlessData::from),
        comparing: state.comparing_data.as_ref().map(HeadlessData::from),
    }
}

#[derive(serde::Serialize)]
struct HeadlessReport {
    source: String,
    query: String,
    generated_at: String,
    error: Option<String>,
    data: Option<HeadlessData>,
    comparing: Option<HeadlessData>,
}

#[derive(serde::Serialize)]
struct HeadlessData {
    months: Vec<(String, Counters)>,
    series: BTreeMap<String, Counters>,
}

impl From<&FetchResult> for HeadlessData {
    fn from(result: &FetchResult) -> Self {
        let months = result
            .time_series
            .iter()
            .map(|(ts, counters)| {
                let label = format_month(*ts).unwrap_or_else(|| ts.to_string());
                (label, counters.clone())
            })
            .collect();
        Self {
            months,
            series: result.counter_series.clone(),
        }
    }
}

fn spawn_pending(app: &mut App, client: &CubeClient, tx: &UnboundedSender<FetchOutcome>) {
    for command in app.take_pending() {
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = client.execute(command).await;
            // the receiver is gone once the dashboard quits
            let _ = tx.send(outcome);
        });
    }
}

/// Run the main application event loop
pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    client: CubeClient,
) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    let (tx, mut rx) = mpsc::unbounded_channel();

    if let Ok((width, _)) = crossterm::terminal::size() {
        app.resize(width);
    }
    app.mount();
    spawn_pending(app, &client, &tx);

    loop {
        app.update();

        while let Ok(outcome) = rx.try_recv() {
            app.apply_outcome(outcome);
        }

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key.code);
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Resize(width, _)) => {
                    tracing::debug!(width, "terminal resized");
                    app.resize(width);
                }
                Ok(_) | Err(_) => {}
            }
        }

        spawn_pending(app, &client, &tx);
    }

    tracing::info!("dashboard closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_report_core::{reshape, ColumnLayout, CubeEndpoint, MemoryHistory, DEFAULT_BASE_URL};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn app_with(query: &str, body: &[u8]) -> std::result::Result<App, Box<dyn std::error::Error>> {
        let mut app = App::new(
            CubeEndpoint::parse(DEFAULT_BASE_URL)?,
            MemoryHistory::with_initial(query),
            ColumnLayout::new(120),
        );
        app.mount();
        for command in app.take_pending() {
            app.apply_outcome(FetchOutcome {
                command,
                result: reshape(body),
            });
        }
        Ok(app)
    }

    #[test]
    fn report_lists_months_and_categories() -> TestResult {
        let app = app_with(
            "group=sex",
            br#"{"response":{"p":{"2020-01":{"male":3}},"male":{"c":3}}}"#,
        )?;
        let report = build_headless_report(&app);

        assert_eq!(report.source, DEFAULT_BASE_URL);
        assert_eq!(report.query, "group=sex");
        let data = report.data.ok_or("no data")?;
        assert_eq!(data.months[0].0, "2020-01");
        assert_eq!(data.series["male"]["c"], 3.0);
        assert!(report.comparing.is_none());
        Ok(())
    }

    #[test]
    fn report_serializes_to_json() -> TestResult {
        let app = app_with("", br#"{"response":{"p":{"2020-01":{"c":5}}}}"#)?;
        let json = serde_json::to_value(build_headless_report(&app))?;
        assert_eq!(json["data"]["months"][0][0], "2020-01");
        assert_eq!(json["data"]["months"][0][1]["c"], 5.0);
        assert_eq!(json["error"], serde_json::Value::Null);
        Ok(())
    }

    #[test]
    fn failed_load_is_reported() -> TestResult {
        let app = app_with("", b"{}")?;
        let report = build_headless_report(&app);
        assert!(report.data.is_none());
        assert_eq!(
            report.error.as_deref(),
            Some("Invalid cube response: missing 'response' field")
        );
        assert_eq!(format_counters(&Counters::new()), "");
        Ok(())
    }
}
