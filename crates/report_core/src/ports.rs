//! Seams to the host environment: where the shareable query lives and how
//! wide the screen is.

/// Navigation history holding the shareable query string.
pub trait HistoryPort {
    /// Query string the dashboard was opened with, without the leading `?`.
    fn initial_query(&self) -> Option<String>;

    /// Records a new location without reloading anything.
    fn push(&mut self, query: &str);
}

/// Reports the current viewport width in the host's unit (pixels in a
/// browser, cells in a terminal).
pub trait ViewportProvider {
    fn width(&self) -> u16;
}

/// History kept in memory. Used by the terminal front end and by tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryHistory {
    initial: Option<String>,
    entries: Vec<String>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(query: impl Into<String>) -> Self {
        let query = query.into();
        let query = query.trim_start_matches('?').to_string();
        Self {
            initial: (!query.is_empty()).then_some(query),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// The most recent location, falling back to the initial one.
    pub fn current(&self) -> Option<&str> {
        self.entries
            .last()
            .map(String::as_str)
            .or(self.initial.as_deref())
    }
}

impl HistoryPort for MemoryHistory {
    fn initial_query(&self) -> Option<String> {
        self.initial.clone()
    }

    fn push(&mut self, query: &str) {
        self.entries.push(query.to_string());
    }
}

/// A viewport of fixed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedViewport(pub u16);

impl ViewportProvider for FixedViewport {
    fn width(&self) -> u16 {
        self.0
    }
}

/// Column layout for the bar-graph group: one column below `breakpoint`,
/// two at or above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub breakpoint: u16,
}

impl ColumnLayout {
    pub const fn new(breakpoint: u16) -> Self {
        Self { breakpoint }
    }

    pub fn columns(self, viewport: &impl ViewportProvider) -> usize {
        if viewport.width() < self.breakpoint {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_history_tracks_pushes() {
        let mut history = MemoryHistory::with_initial("?sex=male");
        assert_eq!(history.initial_query().as_deref(), Some("sex=male"));
        assert_eq!(history.current(), Some("sex=male"));

        history.push("group=race");
        assert_eq!(history.current(), Some("group=race"));
        assert_eq!(history.entries(), ["group=race"]);
    }

    #[test]
    fn blank_initial_query_is_none() {
        assert_eq!(MemoryHistory::with_initial("?").initial_query(), None);
        assert_eq!(MemoryHistory::new().current(), None);
    }

    #[test]
    fn column_count_switches_at_breakpoint() {
        let layout = ColumnLayout::new(640);
        assert_eq!(layout.columns(&FixedViewport(639)), 1);
        assert_eq!(layout.columns(&FixedViewport(640)), 2);
        assert_eq!(layout.columns(&FixedViewport(1920)), 2);
    }
}
