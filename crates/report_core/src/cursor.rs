//! Keyboard selection model shared by the front ends: which panel has
//! focus, the month cursor with its two-press range selection, and the bar
//! cursor over the counter series.
//!
//! Cursors wrap at both ends. Paging stops at the ends.

use crate::model::{Counters, DateRange, UiState};
use crate::month::{shift_months, Timestamp};

/// Months moved by one page.
pub const MONTH_PAGE: usize = 6;

/// Which part of the dashboard receives arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Timeline,
    Bars,
}

impl Focus {
    pub const fn next(self) -> Self {
        match self {
            Self::Timeline => Self::Bars,
            Self::Bars => Self::Timeline,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Timeline => "Timeline",
            Self::Bars => "Counts",
        }
    }
}

/// Outcome of pressing the range key on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMark {
    /// Nothing loaded to select from.
    NoMonths,
    /// First press: the range starts here.
    Anchored(Timestamp),
    /// Second press: `range` is half-open and ends at the start of the
    /// month after `last`.
    Selected {
        first: Timestamp,
        last: Timestamp,
        range: DateRange,
    },
    /// The later month cannot be advanced by one month.
    OutOfRange,
}

/// What the compare key should do given the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareToggle {
    Disable,
    /// Compare with the window of equal length right before the range.
    Enable(Option<DateRange>),
    NeedsRange,
}

impl CompareToggle {
    pub fn for_state(state: &UiState) -> Self {
        if state.comparing {
            return Self::Disable;
        }
        state
            .range
            .map_or(Self::NeedsRange, |range| Self::Enable(range.preceding()))
    }
}

pub const fn wrap_decrement(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }

    if index == 0 {
        len - 1
    } else {
        index - 1
    }
}

pub const fn wrap_increment(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }

    (index + 1) % len
}

/// Moves a cursor by a page without wrapping.
pub const fn page_down(index: usize, len: usize, step: usize) -> usize {
    if len == 0 {
        return 0;
    }

    let next = index.saturating_add(step);
    if next >= len {
        len - 1
    } else {
        next
    }
}

/// Month keys of the loaded time series, oldest first.
pub fn months(state: &UiState) -> Vec<Timestamp> {
    state
        .data
        .as_ref()
        .map(|data| data.time_series.keys().copied().collect())
        .unwrap_or_default()
}

/// Counter series rows in display order.
pub fn rows(state: &UiState) -> Vec<(&str, &Counters)> {
    state
        .data
        .as_ref()
        .map(|data| {
            data.counter_series
                .iter()
                .map(|(key, counters)| (key.as_str(), counters))
                .collect()
        })
        .unwrap_or_default()
}

fn items_in_row(state: &UiState, row: usize) -> usize {
    rows(state)
        .get(row)
        .map_or(0, |(_, counters)| counters.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardCursor {
    pub focus: Focus,
    pub month: usize,
    pub anchor: Option<Timestamp>,
    pub row: usize,
    pub item: usize,
}

impl DashboardCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switching panels drops a half-selected range.
    pub fn switch_focus(&mut self) {
        self.focus = self.focus.next();
        self.anchor = None;
    }

    pub fn previous_month(&mut self, state: &UiState) {
        self.month = wrap_decrement(self.month, months(state).len());
    }

    pub fn next_month(&mut self, state: &UiState) {
        self.month = wrap_increment(self.month, months(state).len());
    }

    pub fn page_up(&mut self) {
        self.month = self.month.saturating_sub(MONTH_PAGE);
    }

    pub fn page_down(&mut self, state: &UiState) {
        self.month = page_down(self.month, months(state).len(), MONTH_PAGE);
    }

    pub fn first_month(&mut self) {
        self.month = 0;
    }

    pub fn last_month(&mut self, state: &UiState) {
        self.month = months(state).len().saturating_sub(1);
    }

    pub fn previous_row(&mut self, state: &UiState) {
        self.row = wrap_decrement(self.row, rows(state).len());
        self.item = 0;
    }

    pub fn next_row(&mut self, state: &UiState) {
        self.row = wrap_increment(self.row, rows(state).len());
        self.item = 0;
    }

    pub fn previous_item(&mut self, state: &UiState) {
        self.item = wrap_decrement(self.item, items_in_row(state, self.row));
    }

    pub fn next_item(&mut self, state: &UiState) {
        self.item = wrap_increment(self.item, items_in_row(state, self.row));
    }

    pub fn reset_bars(&mut self) {
        self.row = 0;
        self.item = 0;
    }

    /// Returns whether a half-selected range was dropped.
    pub fn cancel_anchor(&mut self) -> bool {
        self.anchor.take().is_some()
    }

    pub fn selected_month(&self, state: &UiState) -> Option<Timestamp> {
        months(state).get(self.month).copied()
    }

    /// The (row, item) pair under the bar cursor.
    pub fn selected_bar(&self, state: &UiState) -> Option<(String, String)> {
        let rows = rows(state);
        let (row, counters) = rows.get(self.row)?;
        let item = counters.keys().nth(self.item)?;
        Some(((*row).to_string(), item.clone()))
    }

    /// First press anchors the range at the cursor month, the second closes
    /// it and moves the cursor back to the first month.
    pub fn mark_range(&mut self, state: &UiState) -> RangeMark {
        let Some(month) = self.selected_month(state) else {
            return RangeMark::NoMonths;
        };

        let Some(anchor) = self.anchor.take() else {
            self.anchor = Some(month);
            return RangeMark::Anchored(month);
        };

        let first = anchor.min(month);
        let last = anchor.max(month);
        let Some(end) = shift_months(last, 1) else {
            return RangeMark::OutOfRange;
        };
        self.month = 0;
        RangeMark::Selected {
            first,
            last,
            range: DateRange::new(first, end),
        }
    }

    /// Pulls every cursor back inside the loaded data.
    pub fn clamp(&mut self, state: &UiState) {
        self.month = self.month.min(months(state).len().saturating_sub(1));

        let row_count = rows(state).len();
        self.row = self.row.min(row_count.saturating_sub(1));
        self.item = self
            .item
            .min(items_in_row(state, self.row).saturating_sub(1));
    }
}
