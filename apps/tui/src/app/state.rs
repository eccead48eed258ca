use cube_report_core::cursor::{self, CompareToggle, DashboardCursor, RangeMark};
use cube_report_core::month::{month_label, shift_months};
use cube_report_core::{
    encode, CategoryPalette, ColumnLayout, Counters, CubeEndpoint, DashboardController,
    FetchCommand, MemoryHistory, Timestamp, UiState, ViewportProvider,
};
use throbber_widgets_tui::ThrobberState;

use crate::cube::FetchOutcome;

/// Terminal width as seen by the last draw or resize event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalViewport {
    pub width: u16,
}

impl ViewportProvider for TerminalViewport {
    fn width(&self) -> u16 {
        self.width
    }
}

pub struct App {
    pub running: bool,
    pub controller: DashboardController<MemoryHistory>,
    pub palette: CategoryPalette,
    pub layout: ColumnLayout,
    pub viewport: TerminalViewport,
    pub cursor: DashboardCursor,
    pub show_help: bool,
    pub status_message: String,
    pub throbber: ThrobberState,
    pending: Vec<FetchCommand>,
}

impl App {
    pub fn new(endpoint: CubeEndpoint, history: MemoryHistory, layout: ColumnLayout) -> Self {
        Self {
            running: true,
            controller: DashboardController::new(endpoint, history),
            palette: CategoryPalette::new(),
            layout,
            viewport: TerminalViewport { width: 80 },
            cursor: DashboardCursor::new(),
            show_help: false,
            status_message: String::new(),
            throbber: ThrobberState::default(),
            pending: Vec::new(),
        }
    }

    pub const fn state(&self) -> &UiState {
        self.controller.state()
    }

    pub fn mount(&mut self) {
        let command = self.controller.mount();
        self.queue(command);
    }

    /// Fetches waiting to be spawned by the event loop.
    pub fn take_pending(&mut self) -> Vec<FetchCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn queue(&mut self, command: Option<FetchCommand>) {
        self.pending.extend(command);
    }

    pub fn apply_outcome(&mut self, outcome: FetchOutcome) {
        let FetchOutcome { command, result } = outcome;
        let follow_up = self
            .controller
            .apply_result(command.slot, command.generation, result);
        self.queue(follow_up);
        self.cursor.clamp(self.controller.state());
    }

    /// Advances the loading spinner.
    pub fn update(&mut self) {
        if self.state().loading {
            self.throbber.calc_next();
        }
    }

    pub fn resize(&mut self, width: u16) {
        self.viewport.width = width;
    }

    pub fn columns(&self) -> usize {
        self.layout.columns(&self.viewport)
    }

    /// Month keys of the loaded time series, oldest first.
    pub fn months(&self) -> Vec<Timestamp> {
        cursor::months(self.state())
    }

    /// Counter series rows in display order.
    pub fn rows(&self) -> Vec<(&str, &Counters)> {
        cursor::rows(self.state())
    }

    pub fn selected_bar(&self) -> Option<(String, String)> {
        self.cursor.selected_bar(self.state())
    }

    /// First press anchors the range at the cursor month, the second closes
    /// it and loads the selection.
    pub fn mark_range(&mut self) {
        match self.cursor.mark_range(self.controller.state()) {
            RangeMark::NoMonths => {
                self.status_message = "No months loaded yet".to_string();
            }
            RangeMark::Anchored(month) => {
                self.status_message = format!(
                    "Range starts {}; move and press Enter on the last month",
                    month_label(month)
                );
            }
            RangeMark::OutOfRange => {
                self.status_message = "Selected month is out of range".to_string();
            }
            RangeMark::Selected { first, last, range } => {
                self.status_message =
                    format!("Range {} - {}", month_label(first), month_label(last));
                let command = self.controller.on_date_range_change(Some(range));
                self.queue(command);
            }
        }
    }

    pub fn clear_range(&mut self) {
        self.cursor.anchor = None;
        if self.state().range.is_some() {
            self.status_message = "Range cleared".to_string();
            let command = self.controller.on_date_range_change(None);
            self.queue(command);
        }
    }

    /// Compares the selected range with the window of equal length right
    /// before it, or switches comparison off.
    pub fn toggle_compare(&mut self) {
        let command = match CompareToggle::for_state(self.state()) {
            CompareToggle::NeedsRange => {
                self.status_message = "Select a date range before comparing".to_string();
                return;
            }
            CompareToggle::Disable => {
                self.status_message = "Comparison off".to_string();
                self.controller.on_compare_toggle(false, None)
            }
            CompareToggle::Enable(window) => {
                if let Some(window) = window {
                    self.status_message = format!(
                        "Comparing with {} - {}",
                        month_label(window.start()),
                        month_label(shift_months(window.end(), -1).unwrap_or(window.end()))
                    );
                }
                self.controller.on_compare_toggle(true, window)
            }
        };
        self.queue(command);
    }

    pub fn toggle_selected_filter(&mut self) {
        let Some((row, item)) = self.selected_bar() else {
            return;
        };
        let command = self.controller.on_change(&row, &item);
        self.queue(command);
    }

    pub fn toggle_selected_group(&mut self) {
        let Some((row, _)) = self.selected_bar() else {
            return;
        };
        let command = self.controller.on_group_change(&row);
        self.queue(command);
        self.cursor.reset_bars();
    }

    pub fn reload(&mut self) {
        let command = self.controller.reload();
        self.queue(command);
    }

    /// Command line reproducing the current view.
    pub fn share_command(&self) -> String {
        let query = encode(self.state());
        if query.is_empty() {
            "cube-report".to_string()
        } else {
            format!("cube-report --query '{query}'")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_report_core::{reshape, DateRange, Slot, DEFAULT_BASE_URL};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    const JAN_2020: Timestamp = 1_577_836_800_000;
    const MAR_2020: Timestamp = 1_583_020_800_000;
    const APR_2020: Timestamp = 1_585_699_200_000;

    const BODY: &[u8] = br#"{"response":{
        "p":{"2020-01":{"c":5},"2020-02":{"c":7},"2020-03":{"c":2}},
        "sex":{"female":2,"male":12},
        "weapon":{"gun":9,"knife":5}
    }}"#;

    fn loaded_app() -> Result<App, Box<dyn std::error::Error>> {
        let mut app = App::new(
            CubeEndpoint::parse(DEFAULT_BASE_URL)?,
            MemoryHistory::new(),
            ColumnLayout::new(120),
        );
        app.mount();
        deliver_all(&mut app)?;
        Ok(app)
    }

    fn deliver_all(app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
        for command in app.take_pending() {
            let result = reshape(BODY);
            app.apply_outcome(FetchOutcome { command, result });
        }
        Ok(())
    }

    #[test]
    fn mount_queues_primary_fetch() -> TestResult {
        let mut app = App::new(
            CubeEndpoint::parse(DEFAULT_BASE_URL)?,
            MemoryHistory::with_initial("group=sex"),
            ColumnLayout::new(120),
        );
        app.mount();
        let pending = app.take_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].slot, Slot::Primary);
        assert!(pending[0].url.ends_with("/group_by/sex"));
        assert!(app.take_pending().is_empty());
        Ok(())
    }

    #[test]
    fn two_presses_select_a_half_open_range() -> TestResult {
        let mut app = loaded_app()?;
        assert_eq!(app.months(), vec![JAN_2020, 1_580_515_200_000, MAR_2020]);

        app.mark_range();
        assert_eq!(app.cursor.anchor, Some(JAN_2020));
        app.cursor.month = 2;
        app.mark_range();

        assert_eq!(app.state().range, Some(DateRange::new(JAN_2020, APR_2020)));
        assert_eq!(app.cursor.anchor, None);
        let pending = app.take_pending();
        assert!(pending[0].url.ends_with("?p=2020-01&p=2020-03"));
        Ok(())
    }

    #[test]
    fn compare_needs_a_range() -> TestResult {
        let mut app = loaded_app()?;
        app.toggle_compare();
        assert!(!app.state().comparing);
        assert!(app.take_pending().is_empty());

        app.cursor.month = 1;
        app.mark_range();
        app.mark_range();
        deliver_all(&mut app)?;

        app.toggle_compare();
        assert!(app.state().comparing);
        let window = app.state().comparing_range.ok_or("no comparing range")?;
        assert_eq!(window.start(), JAN_2020);
        deliver_all(&mut app)?;
        // the primary result queued the comparison fetch
        deliver_all(&mut app)?;
        assert!(app.state().comparing_data.is_some());

        app.toggle_compare();
        assert!(!app.state().comparing);
        assert!(app.state().comparing_data.is_none());
        Ok(())
    }

    #[test]
    fn bar_cursor_toggles_filters_and_groups() -> TestResult {
        let mut app = loaded_app()?;
        app.cursor.row = 1;
        app.cursor.item = 1;
        assert_eq!(
            app.selected_bar(),
            Some(("weapon".to_string(), "knife".to_string()))
        );

        app.toggle_selected_filter();
        assert_eq!(app.state().filter.selected("weapon"), ["knife"]);
        assert_eq!(app.share_command(), "cube-report --query 'weapon=knife'");

        app.toggle_selected_group();
        assert_eq!(app.state().group.as_deref(), Some("weapon"));
        assert_eq!(app.cursor.row, 0);
        Ok(())
    }

    #[test]
    fn clearing_range_turns_comparison_off() -> TestResult {
        let mut app = loaded_app()?;
        app.mark_range();
        app.mark_range();
        deliver_all(&mut app)?;
        app.toggle_compare();
        deliver_all(&mut app)?;

        app.clear_range();
        assert!(!app.state().comparing);
        assert_eq!(app.state().range, None);
        assert_eq!(app.share_command(), "cube-report");
        Ok(())
    }

    #[test]
    fn columns_follow_viewport_width() -> TestResult {
        let mut app = loaded_app()?;
        app.resize(80);
        assert_eq!(app.columns(), 1);
        app.resize(160);
        assert_eq!(app.columns(), 2);
        Ok(())
    }
}
