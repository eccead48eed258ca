use crate::app::state::App;
use crossterm::event::KeyCode;
use cube_report_core::Focus;

pub fn handle_help_toggle(app: &mut App, key: KeyCode) -> bool {
    if matches!(key, KeyCode::F(1) | KeyCode::Char('?')) {
        app.show_help = !app.show_help;
        return true;
    }

    if app.show_help {
        if key == KeyCode::Esc {
            app.show_help = false;
        }
        return true;
    }

    false
}

pub fn handle_dashboard_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('q') => {
            app.running = false;
        }
        KeyCode::Tab | KeyCode::BackTab => app.cursor.switch_focus(),
        KeyCode::Char('r') => {
            app.status_message = "Reloading".to_string();
            app.reload();
        }
        KeyCode::Char('c') => app.toggle_compare(),
        KeyCode::Char('x') => app.clear_range(),
        _ => match app.cursor.focus {
            Focus::Timeline => handle_timeline_input(app, key),
            Focus::Bars => handle_bars_input(app, key),
        },
    }
}

fn handle_timeline_input(app: &mut App, key: KeyCode) {
    let state = app.controller.state();
    match key {
        KeyCode::Left => app.cursor.previous_month(state),
        KeyCode::Right => app.cursor.next_month(state),
        KeyCode::PageUp => app.cursor.page_up(),
        KeyCode::PageDown => app.cursor.page_down(state),
        KeyCode::Home => app.cursor.first_month(),
        KeyCode::End => app.cursor.last_month(state),
        KeyCode::Enter => app.mark_range(),
        KeyCode::Esc => {
            if app.cursor.cancel_anchor() {
                app.status_message = "Range selection cancelled".to_string();
            }
        }
        _ => {}
    }
}

fn handle_bars_input(app: &mut App, key: KeyCode) {
    let state = app.controller.state();
    match key {
        KeyCode::Up => app.cursor.previous_row(state),
        KeyCode::Down => app.cursor.next_row(state),
        KeyCode::Left => app.cursor.previous_item(state),
        KeyCode::Right => app.cursor.next_item(state),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected_filter(),
        KeyCode::Char('g') => app.toggle_selected_group(),
        _ => {}
    }
}
