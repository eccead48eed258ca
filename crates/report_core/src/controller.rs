//! Dashboard state machine.
//!
//! The controller never performs IO. Every handler mutates [`UiState`],
//! records the new query in the [`HistoryPort`] and hands back the fetch the
//! front end should run. Results come back through
//! [`DashboardController::apply_result`], which may ask for the comparison
//! fetch in turn.

use crate::codec::{decode, encode, is_filter_dimension, GROUP_KEY};
use crate::error::FetchError;
use crate::model::{DateRange, FetchResult, Slot, UiState};
use crate::ports::HistoryPort;
use crate::request::CubeEndpoint;

/// A request the front end should execute and report back on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCommand {
    pub slot: Slot,
    pub generation: u64,
    pub url: String,
}

#[derive(Debug)]
pub struct DashboardController<H> {
    endpoint: CubeEndpoint,
    history: H,
    state: UiState,
    generation: u64,
}

impl<H: HistoryPort> DashboardController<H> {
    pub fn new(endpoint: CubeEndpoint, history: H) -> Self {
        Self {
            endpoint,
            history,
            state: UiState::default(),
            generation: 0,
        }
    }

    pub const fn state(&self) -> &UiState {
        &self.state
    }

    pub const fn history(&self) -> &H {
        &self.history
    }

    pub const fn endpoint(&self) -> &CubeEndpoint {
        &self.endpoint
    }

    /// Restores state from the initial query, if any, and loads.
    pub fn mount(&mut self) -> Option<FetchCommand> {
        if let Some(query) = self.history.initial_query() {
            tracing::debug!(%query, "restoring dashboard state from query");
            decode(&query).apply_to(&mut self.state);
        }
        self.update()
    }

    /// Selecting the active group clears it.
    pub fn on_group_change(&mut self, group: &str) -> Option<FetchCommand> {
        self.state.group = if self.state.group.as_deref() == Some(group) {
            None
        } else {
            Some(group.to_string())
        };
        self.sync_query()
    }

    /// Dimensions that cannot survive the query string (see
    /// [`is_filter_dimension`]) are ignored.
    pub fn on_filter_toggle(&mut self, dimension: &str, value: &str) -> Option<FetchCommand> {
        if !is_filter_dimension(dimension) {
            tracing::warn!(dimension, "ignoring filter on a reserved query key");
            return None;
        }
        let selected = self.state.filter.toggle(dimension, value);
        tracing::debug!(dimension, value, selected, "filter toggled");
        self.sync_query()
    }

    /// Tag and bar widgets report both kinds of click through one callback;
    /// the `group` key selects the group-by dimension.
    pub fn on_change(&mut self, key: &str, value: &str) -> Option<FetchCommand> {
        if key == GROUP_KEY {
            self.on_group_change(value)
        } else {
            self.on_filter_toggle(key, value)
        }
    }

    /// Clearing the range also switches comparison off.
    pub fn on_date_range_change(&mut self, range: Option<DateRange>) -> Option<FetchCommand> {
        self.state.range = range;
        if range.is_none() {
            self.state.comparing = false;
            self.state.comparing_range = None;
            self.state.comparing_data = None;
        }
        self.sync_query()
    }

    pub fn on_compare_toggle(
        &mut self,
        comparing: bool,
        range: Option<DateRange>,
    ) -> Option<FetchCommand> {
        self.state.comparing = comparing;
        if comparing {
            self.state.comparing_range = range;
        } else {
            self.state.comparing_range = None;
            self.state.comparing_data = None;
        }
        self.sync_query()
    }

    /// Re-runs the current query without touching state or history.
    pub fn reload(&mut self) -> Option<FetchCommand> {
        self.update()
    }

    /// Stores a finished fetch. Results from an older generation are
    /// dropped. Once the primary load finishes, successfully or not, the
    /// comparison fetch follows when comparing is on.
    pub fn apply_result(
        &mut self,
        slot: Slot,
        generation: u64,
        result: Result<FetchResult, FetchError>,
    ) -> Option<FetchCommand> {
        if generation != self.generation {
            tracing::debug!(
                slot = slot.as_str(),
                generation,
                current = self.generation,
                "dropping stale cube response"
            );
            return None;
        }

        match (slot, result) {
            (Slot::Primary, Ok(data)) => {
                tracing::info!(
                    months = data.time_series.len(),
                    series = data.counter_series.len(),
                    "cube data loaded"
                );
                self.state.loading = false;
                self.state.error = None;
                self.state.data = Some(data);
                let window = self.state.active_comparing_range()?;
                self.issue(Slot::Comparing, Some(window))
            }
            (Slot::Comparing, Ok(data)) => {
                if self.state.comparing {
                    self.state.comparing_data = Some(data);
                }
                self.state.loading = false;
                None
            }
            (Slot::Primary, Err(error)) => {
                self.record_failure(Slot::Primary, &error);
                let window = self.state.active_comparing_range()?;
                self.issue(Slot::Comparing, Some(window))
            }
            (Slot::Comparing, Err(error)) => {
                self.record_failure(Slot::Comparing, &error);
                None
            }
        }
    }

    fn record_failure(&mut self, slot: Slot, error: &FetchError) {
        tracing::warn!(slot = slot.as_str(), %error, "cube fetch failed");
        self.state.loading = false;
        self.state.error = Some(error.to_string());
    }

    fn sync_query(&mut self) -> Option<FetchCommand> {
        let query = encode(&self.state);
        tracing::debug!(%query, "pushing dashboard query");
        self.history.push(&query);
        self.update()
    }

    fn update(&mut self) -> Option<FetchCommand> {
        self.generation += 1;
        self.state.loading = true;
        self.issue(Slot::Primary, self.state.range)
    }

    fn issue(&mut self, slot: Slot, range: Option<DateRange>) -> Option<FetchCommand> {
        let url = self
            .endpoint
            .url_for(self.state.group.as_deref(), &self.state.filter, range);
        match url {
            Ok(url) => {
                tracing::debug!(
                    slot = slot.as_str(),
                    generation = self.generation,
                    %url,
                    "issuing cube fetch"
                );
                Some(FetchCommand {
                    slot,
                    generation: self.generation,
                    url,
                })
            }
            Err(error) => {
                tracing::warn!(slot = slot.as_str(), %error, "could not build cube request");
                self.state.loading = false;
                self.state.error = Some(error.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MemoryHistory;
    use crate::request::DEFAULT_BASE_URL;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn controller(
        query: &str,
    ) -> Result<DashboardController<MemoryHistory>, Box<dyn std::error::Error>> {
        Ok(DashboardController::new(
            CubeEndpoint::parse(DEFAULT_BASE_URL)?,
            MemoryHistory::with_initial(query),
        ))
    }

    #[test]
    fn mount_without_query_loads_defaults() -> TestResult {
        let mut controller = controller("")?;
        let command = controller.mount().ok_or("no fetch issued")?;

        assert_eq!(command.slot, Slot::Primary);
        assert_eq!(command.url, "https://cubedb.org/v1/homicides_month/last/400/");
        assert!(controller.state().loading);
        assert!(controller.history().entries().is_empty());
        Ok(())
    }

    #[test]
    fn mount_restores_state_from_query() -> TestResult {
        let mut controller = controller("?group=sex&weapon=knife")?;
        let command = controller.mount().ok_or("no fetch issued")?;

        assert_eq!(controller.state().group.as_deref(), Some("sex"));
        assert_eq!(controller.state().filter.selected("weapon"), ["knife"]);
        assert!(command.url.ends_with("/group_by/sex?weapon=knife"));
        Ok(())
    }

    #[test]
    fn group_change_toggles_and_pushes_query() -> TestResult {
        let mut controller = controller("")?;
        controller.on_group_change("sex");
        assert_eq!(controller.state().group.as_deref(), Some("sex"));
        controller.on_group_change("sex");
        assert_eq!(controller.state().group, None);

        assert_eq!(controller.history().entries(), ["group=sex", ""]);
        Ok(())
    }

    #[test]
    fn on_change_routes_group_key() -> TestResult {
        let mut controller = controller("")?;
        controller.on_change("group", "race");
        controller.on_change("sex", "female");
        assert_eq!(controller.state().group.as_deref(), Some("race"));
        assert_eq!(controller.state().filter.selected("sex"), ["female"]);
        assert!(controller.state().filter.selected("group").is_empty());
        Ok(())
    }

    #[test]
    fn filters_on_reserved_keys_are_ignored() -> TestResult {
        let mut controller = controller("")?;
        controller.mount();
        assert_eq!(controller.on_filter_toggle("window", "x"), None);
        assert_eq!(controller.on_change("from", "2020"), None);
        assert_eq!(controller.on_filter_toggle("weapon[]", "knife"), None);
        assert_eq!(controller.on_filter_toggle("", "knife"), None);

        assert!(controller.state().filter.is_empty());
        assert!(controller.history().entries().is_empty());
        Ok(())
    }

    #[test]
    fn clearing_range_switches_comparison_off() -> TestResult {
        let mut controller = controller("")?;
        controller.on_date_range_change(Some(DateRange::new(10, 20)));
        controller.on_compare_toggle(true, Some(DateRange::new(0, 10)));
        assert!(controller.state().comparing);

        controller.on_date_range_change(None);
        let state = controller.state();
        assert!(!state.comparing);
        assert_eq!(state.comparing_range, None);
        assert_eq!(state.comparing_data, None);
        Ok(())
    }

    #[test]
    fn compare_off_drops_comparing_data() -> TestResult {
        let mut controller = controller("")?;
        controller.on_date_range_change(Some(DateRange::new(10, 20)));
        let primary = controller
            .on_compare_toggle(true, Some(DateRange::new(0, 10)))
            .ok_or("no fetch issued")?;
        let comparing = controller
            .apply_result(Slot::Primary, primary.generation, Ok(FetchResult::default()))
            .ok_or("no comparison fetch")?;
        controller.apply_result(Slot::Comparing, comparing.generation, Ok(FetchResult::default()));
        assert!(controller.state().comparing_data.is_some());

        controller.on_compare_toggle(false, None);
        assert_eq!(controller.state().comparing_data, None);
        assert_eq!(controller.state().comparing_range, None);
        Ok(())
    }

    #[test]
    fn stale_results_are_dropped() -> TestResult {
        let mut controller = controller("")?;
        let first = controller.mount().ok_or("no fetch issued")?;
        let second = controller.on_group_change("sex").ok_or("no fetch issued")?;

        let mut stale = FetchResult::default();
        stale.counter_series.insert("stale".to_string(), Default::default());
        controller.apply_result(Slot::Primary, first.generation, Ok(stale));
        assert_eq!(controller.state().data, None);
        assert!(controller.state().loading);

        controller.apply_result(Slot::Primary, second.generation, Ok(FetchResult::default()));
        assert_eq!(controller.state().data, Some(FetchResult::default()));
        assert!(!controller.state().loading);
        Ok(())
    }

    #[test]
    fn url_errors_surface_in_state() -> TestResult {
        let mut controller = controller("")?;
        let command = controller.on_date_range_change(Some(DateRange::new(i64::MAX - 1, i64::MAX)));
        assert_eq!(command, None);
        assert!(!controller.state().loading);
        assert!(controller.state().error.is_some());
        Ok(())
    }
}
