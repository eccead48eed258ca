//! Mirrors the shareable part of [`UiState`] into a URL query string and back.
//!
//! Reserved keys are `group`, `from`, `to`, `window` and `comparing`. Every
//! other key names a filter dimension and may repeat once per selected value.

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::model::{DateRange, Filter, UiState};
use crate::month::Timestamp;

pub const GROUP_KEY: &str = "group";
pub const FROM_KEY: &str = "from";
pub const TO_KEY: &str = "to";
pub const WINDOW_KEY: &str = "window";
pub const COMPARING_KEY: &str = "comparing";

const RESERVED_KEYS: [&str; 5] = [GROUP_KEY, FROM_KEY, TO_KEY, WINDOW_KEY, COMPARING_KEY];

/// The subset of [`UiState`] that survives a trip through the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub group: Option<String>,
    pub filter: Filter,
    pub range: Option<DateRange>,
    pub comparing_range: Option<DateRange>,
    pub comparing: bool,
}

impl QueryState {
    /// Overwrites the shareable fields of `state`.
    pub fn apply_to(self, state: &mut UiState) {
        state.group = self.group;
        state.filter = self.filter;
        state.range = self.range;
        state.comparing_range = self.comparing_range;
        state.comparing = self.comparing;
    }
}

pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Whether `key` decodes back as the same filter dimension: not empty, not
/// a reserved key and without the `[]` array suffix.
pub fn is_filter_dimension(key: &str) -> bool {
    !key.is_empty() && !is_reserved(key) && !key.ends_with("[]")
}

/// Serializes filter, group, range and comparison state. Empty values are
/// skipped and filter lists are written as repeated keys. Filter dimensions
/// rejected by [`is_filter_dimension`] are left out.
pub fn encode(state: &UiState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    for (dimension, values) in state.filter.active() {
        if !is_filter_dimension(dimension) {
            tracing::warn!(dimension, "skipping filter that would not decode back");
            continue;
        }
        for value in values {
            serializer.append_pair(dimension, value);
        }
    }

    if let Some(group) = state.group.as_deref().filter(|g| !g.is_empty()) {
        serializer.append_pair(GROUP_KEY, group);
    }
    if let Some(range) = state.range {
        serializer.append_pair(FROM_KEY, &range.start().to_string());
        serializer.append_pair(TO_KEY, &range.end().to_string());
    }
    if let Some(window) = state.comparing_range {
        serializer.append_pair(WINDOW_KEY, &window.start().to_string());
    }
    if state.comparing {
        serializer.append_pair(COMPARING_KEY, "true");
    }

    serializer.finish()
}

/// Parses a query string (a leading `?` is ignored) into a [`QueryState`].
///
/// `range` needs both `from` and `to`. `comparing_range` needs `window` and
/// `from` and spans `window..to`. Without `to` there is no comparison range.
pub fn decode(query: &str) -> QueryState {
    let query = query.strip_prefix('?').unwrap_or(query);

    let mut group = None;
    let mut from = None;
    let mut to = None;
    let mut window = None;
    let mut comparing = false;
    let mut filters: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let raw: &str = &key;
        let key = raw.strip_suffix("[]").unwrap_or(raw);
        match key {
            GROUP_KEY => group = Some(value.into_owned()).filter(|g| !g.is_empty()),
            FROM_KEY => from = parse_timestamp(key, &value),
            TO_KEY => to = parse_timestamp(key, &value),
            WINDOW_KEY => window = parse_timestamp(key, &value),
            COMPARING_KEY => comparing = !value.is_empty(),
            "" => {}
            dimension => filters
                .entry(dimension.to_string())
                .or_default()
                .push(value.into_owned()),
        }
    }

    let mut filter = Filter::new();
    for (dimension, values) in filters {
        filter.insert(dimension, values);
    }

    let range = match (from, to) {
        (Some(from), Some(to)) => Some(DateRange::new(from, to)),
        _ => None,
    };
    let comparing_range = match (window, from, to) {
        (Some(window), Some(_), Some(to)) => Some(DateRange::new(window, to)),
        _ => None,
    };

    QueryState {
        group,
        filter,
        range,
        comparing_range,
        comparing,
    }
}

fn parse_timestamp(key: &str, value: &str) -> Option<Timestamp> {
    match value.trim().parse::<Timestamp>() {
        Ok(ts) => Some(ts),
        Err(error) => {
            if !value.is_empty() {
                tracing::warn!(key, value, %error, "ignoring unparseable timestamp in query");
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_filters() -> UiState {
        let mut state = UiState {
            group: Some("sex".to_string()),
            ..UiState::default()
        };
        state.filter.toggle("weapon", "knife");
        state.filter.toggle("weapon", "gun");
        state.filter.toggle("region", "Gauteng North");
        state
    }

    #[test]
    fn encodes_repeated_keys_without_indices() {
        let query = encode(&state_with_filters());
        assert_eq!(
            query,
            "region=Gauteng+North&weapon=knife&weapon=gun&group=sex"
        );
    }

    #[test]
    fn skips_empty_values() {
        let mut state = UiState {
            group: Some(String::new()),
            ..UiState::default()
        };
        state.filter.insert("sex", Vec::new());
        assert_eq!(encode(&state), "");
    }

    #[test]
    fn encodes_ranges_and_comparison() {
        let state = UiState {
            range: Some(DateRange::new(300, 100)),
            comparing_range: Some(DateRange::new(50, 100)),
            comparing: true,
            ..UiState::default()
        };
        assert_eq!(encode(&state), "from=100&to=300&window=50&comparing=true");
    }

    #[test]
    fn round_trips_filter_and_group() {
        let state = state_with_filters();
        let decoded = decode(&encode(&state));
        assert_eq!(decoded.filter, state.filter);
        assert_eq!(decoded.group, state.group);
        assert_eq!(decoded.range, None);
    }

    #[test]
    fn dimensions_that_would_not_decode_back_are_left_out() {
        let mut state = state_with_filters();
        state.filter.insert("window", vec!["x".to_string()]);
        state.filter.insert("weapon[]", vec!["knife".to_string()]);
        assert!(!is_filter_dimension("window"));
        assert!(!is_filter_dimension("weapon[]"));
        assert!(is_filter_dimension("weapon"));

        let query = encode(&state);
        assert_eq!(query, encode(&state_with_filters()));
        assert_eq!(decode(&query).filter, state_with_filters().filter);
    }

    #[test]
    fn scalar_values_become_single_element_lists() {
        let decoded = decode("?sex=male&weapon[]=knife&weapon[]=gun");
        assert_eq!(decoded.filter.selected("sex"), ["male"]);
        assert_eq!(decoded.filter.selected("weapon"), ["knife", "gun"]);
    }

    #[test]
    fn range_needs_both_endpoints() {
        assert_eq!(decode("from=100").range, None);
        assert_eq!(decode("from=100&to=abc").range, None);
        assert_eq!(decode("from=100&to=300").range, Some(DateRange::new(100, 300)));
    }

    #[test]
    fn comparing_range_pairs_window_with_to() {
        let decoded = decode("from=100&to=300&window=50&comparing=true");
        assert!(decoded.comparing);
        assert_eq!(decoded.comparing_range, Some(DateRange::new(50, 300)));

        assert_eq!(decode("window=50&to=300").comparing_range, None);
        assert_eq!(decode("window=50&from=100").comparing_range, None);
    }

    #[test]
    fn comparing_flag_needs_a_value() {
        assert!(!decode("comparing=").comparing);
        assert!(decode("comparing=1").comparing);
        assert!(!decode("sex=male").comparing);
    }

    #[test]
    fn apply_overwrites_shareable_fields_only() {
        let mut state = UiState {
            loading: true,
            error: Some("old".to_string()),
            comparing: true,
            ..UiState::default()
        };
        decode("group=race").apply_to(&mut state);
        assert_eq!(state.group.as_deref(), Some("race"));
        assert!(!state.comparing);
        assert!(state.loading);
        assert_eq!(state.error.as_deref(), Some("old"));
    }
}
