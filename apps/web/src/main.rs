mod browser;
mod dashboard;
mod render;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use cube_report_core::{CubeEndpoint, FetchCommand, ViewportProvider, DEFAULT_BASE_URL};
use ratzilla::ratatui::{
    layout::Margin,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen_futures::spawn_local;

use browser::{fetch_cube, BrowserHistory, BrowserViewport};
use dashboard::WebDashboard;

type SharedDashboard = Rc<RefCell<WebDashboard<BrowserHistory>>>;

/// Runs a fetch in the background and feeds the result back, following up
/// with the comparison fetch when the controller asks for one.
fn dispatch(dashboard: &SharedDashboard, command: Option<FetchCommand>) {
    let Some(command) = command else {
        return;
    };
    let dashboard = dashboard.clone();
    spawn_local(async move {
        let result = fetch_cube(&command.url).await;
        if let Err(error) = &result {
            web_sys::console::error_1(&format!("Cube fetch failed: {error}").into());
        }
        let follow_up =
            dashboard
                .borrow_mut()
                .apply_result(command.slot, command.generation, result);
        dispatch(&dashboard, follow_up);
    });
}

fn main() -> io::Result<()> {
    let endpoint = CubeEndpoint::parse(DEFAULT_BASE_URL)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let dashboard: SharedDashboard =
        Rc::new(RefCell::new(WebDashboard::new(endpoint, BrowserHistory)));

    let initial = dashboard.borrow_mut().mount();
    dispatch(&dashboard, initial);

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let dashboard = dashboard.clone();
        move |event| {
            let command = dashboard.borrow_mut().handle_key(event.code);
            dispatch(&dashboard, command);
        }
    });

    terminal.draw_web(move |f| {
        let area = f.area();
        let block = Block::default()
            .title("Cube Report")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));
        let inner = block.inner(area).inner(Margin::new(1, 0));
        f.render_widget(block, area);

        let Ok(dashboard) = dashboard.try_borrow() else {
            f.render_widget(Paragraph::new("Updating..."), inner);
            return;
        };
        let columns = dashboard.layout.columns(&BrowserViewport);
        render::render_dashboard(&dashboard, columns, f, inner);
    });

    Ok(())
}
