use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::month::{months_between, shift_months, Timestamp};

/// Counter name to value, e.g. `{"c": 12.0}`.
pub type Counters = BTreeMap<String, f64>;

/// A date window. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: Timestamp,
    end: Timestamp,
}

impl DateRange {
    /// Builds a range from two endpoints in either order.
    pub const fn new(a: Timestamp, b: Timestamp) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Builds a range from a slice, as handed over by chart brushes. Anything
    /// other than exactly two endpoints is treated as "no range".
    pub fn from_slice(points: &[Timestamp]) -> Option<Self> {
        match points {
            [a, b] => Some(Self::new(*a, *b)),
            _ => None,
        }
    }

    pub const fn start(self) -> Timestamp {
        self.start
    }

    pub const fn end(self) -> Timestamp {
        self.end
    }

    /// The window of equal month length ending where this one starts.
    pub fn preceding(self) -> Option<Self> {
        let length = months_between(self.start, self.end)?.max(1);
        let start = shift_months(self.start, -length)?;
        Some(Self::new(start, self.start))
    }
}

/// Selected tag values per dimension. Values keep their selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(BTreeMap<String, Vec<String>>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to the dimension if absent, removes it if present.
    /// Returns whether the value is selected afterwards.
    pub fn toggle(&mut self, dimension: &str, value: &str) -> bool {
        let values = self.0.entry(dimension.to_string()).or_default();
        if let Some(index) = values.iter().position(|v| v == value) {
            values.remove(index);
            if values.is_empty() {
                self.0.remove(dimension);
            }
            false
        } else {
            values.push(value.to_string());
            true
        }
    }

    pub fn insert(&mut self, dimension: impl Into<String>, values: Vec<String>) {
        self.0.insert(dimension.into(), values);
    }

    pub fn selected(&self, dimension: &str) -> &[String] {
        self.0.get(dimension).map_or(&[], Vec::as_slice)
    }

    pub fn is_selected(&self, dimension: &str, value: &str) -> bool {
        self.selected(dimension).iter().any(|v| v == value)
    }

    /// Dimensions with at least one selected value.
    pub fn active(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(dimension, values)| (dimension.as_str(), values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}

/// One reshaped cube response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchResult {
    /// Month start timestamp to counters.
    pub time_series: BTreeMap<Timestamp, Counters>,
    /// Every other top-level key of the response, untouched.
    pub counter_series: BTreeMap<String, Counters>,
}

/// Which result a fetch writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Primary,
    Comparing,
}

impl Slot {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Comparing => "comparing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// Everything the dashboard view renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub group: Option<String>,
    pub filter: Filter,
    pub range: Option<DateRange>,
    pub comparing_range: Option<DateRange>,
    pub comparing: bool,
    pub loading: bool,
    pub data: Option<FetchResult>,
    pub comparing_data: Option<FetchResult>,
    pub error: Option<String>,
}

impl UiState {
    pub const fn phase(&self) -> LoadPhase {
        if self.loading {
            LoadPhase::Loading
        } else if self.error.is_some() {
            LoadPhase::Errored
        } else if self.data.is_some() {
            LoadPhase::Loaded
        } else {
            LoadPhase::Idle
        }
    }

    /// Range used for the comparison fetch, if comparing is on.
    pub const fn active_comparing_range(&self) -> Option<DateRange> {
        if self.comparing {
            self.comparing_range
        } else {
            None
        }
    }
}
