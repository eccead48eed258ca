use cube_report_core::cursor::{self, CompareToggle, DashboardCursor, RangeMark};
use cube_report_core::{
    CategoryPalette, ColumnLayout, Counters, CubeEndpoint, DashboardController, FetchCommand,
    FetchError, FetchResult, Focus, HistoryPort, Slot, Timestamp, UiState,
};
use ratzilla::event::KeyCode;

/// Viewport width (px) from which the bar graphs use two columns.
pub const COLUMN_BREAKPOINT: u16 = 640;

pub struct WebDashboard<H> {
    pub controller: DashboardController<H>,
    pub palette: CategoryPalette,
    pub layout: ColumnLayout,
    pub cursor: DashboardCursor,
    pub show_help: bool,
}

impl<H: HistoryPort> WebDashboard<H> {
    pub fn new(endpoint: CubeEndpoint, history: H) -> Self {
        Self {
            controller: DashboardController::new(endpoint, history),
            palette: CategoryPalette::new(),
            layout: ColumnLayout::new(COLUMN_BREAKPOINT),
            cursor: DashboardCursor::new(),
            show_help: false,
        }
    }

    pub const fn state(&self) -> &UiState {
        self.controller.state()
    }

    pub fn mount(&mut self) -> Option<FetchCommand> {
        self.controller.mount()
    }

    pub fn apply_result(
        &mut self,
        slot: Slot,
        generation: u64,
        result: Result<FetchResult, FetchError>,
    ) -> Option<FetchCommand> {
        let follow_up = self.controller.apply_result(slot, generation, result);
        self.cursor.clamp(self.controller.state());
        follow_up
    }

    pub fn months(&self) -> Vec<Timestamp> {
        cursor::months(self.state())
    }

    pub fn rows(&self) -> Vec<(&str, &Counters)> {
        cursor::rows(self.state())
    }

    /// Applies one key press and returns the fetch it triggered, if any.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<FetchCommand> {
        if matches!(key, KeyCode::Char('?')) {
            self.show_help = !self.show_help;
            return None;
        }
        if self.show_help {
            if matches!(key, KeyCode::Esc) {
                self.show_help = false;
            }
            return None;
        }

        match key {
            KeyCode::Tab => {
                self.cursor.switch_focus();
                None
            }
            KeyCode::Char('r') => self.controller.reload(),
            KeyCode::Char('x') => {
                self.cursor.anchor = None;
                if self.state().range.is_some() {
                    self.controller.on_date_range_change(None)
                } else {
                    None
                }
            }
            KeyCode::Char('c') => match CompareToggle::for_state(self.state()) {
                CompareToggle::Disable => self.controller.on_compare_toggle(false, None),
                CompareToggle::Enable(window) => self.controller.on_compare_toggle(true, window),
                CompareToggle::NeedsRange => None,
            },
            _ => match self.cursor.focus {
                Focus::Timeline => self.handle_timeline_key(key),
                Focus::Bars => self.handle_bars_key(key),
            },
        }
    }

    fn handle_timeline_key(&mut self, key: KeyCode) -> Option<FetchCommand> {
        let state = self.controller.state();
        match key {
            KeyCode::Left => self.cursor.previous_month(state),
            KeyCode::Right => self.cursor.next_month(state),
            KeyCode::PageUp => self.cursor.page_up(),
            KeyCode::PageDown => self.cursor.page_down(state),
            KeyCode::Home => self.cursor.first_month(),
            KeyCode::End => self.cursor.last_month(state),
            KeyCode::Esc => {
                self.cursor.cancel_anchor();
            }
            KeyCode::Enter => {
                if let RangeMark::Selected { range, .. } = self.cursor.mark_range(state) {
                    return self.controller.on_date_range_change(Some(range));
                }
            }
            _ => {}
        }
        None
    }

    fn handle_bars_key(&mut self, key: KeyCode) -> Option<FetchCommand> {
        let state = self.controller.state();
        match key {
            KeyCode::Up => self.cursor.previous_row(state),
            KeyCode::Down => self.cursor.next_row(state),
            KeyCode::Left => self.cursor.previous_item(state),
            KeyCode::Right => self.cursor.next_item(state),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let (row, item) = self.cursor.selected_bar(state)?;
                return self.controller.on_change(&row, &item);
            }
            KeyCode::Char('g') => {
                let (row, _) = self.cursor.selected_bar(state)?;
                self.cursor.reset_bars();
                return self.controller.on_group_change(&row);
            }
            _ => {}
        }
        None
    }
}
