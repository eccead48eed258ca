mod dashboard;

use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_input(app: &mut App, key: KeyCode) {
    if dashboard::handle_help_toggle(app, key) {
        return;
    }
    dashboard::handle_dashboard_input(app, key);
}
