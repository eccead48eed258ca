//! Request building and response reshaping for the cube endpoint.
//!
//! The transport itself lives with each front end; this module only knows
//! how a URL is laid out and what a response body looks like.

use std::collections::BTreeMap;

use serde::Deserialize;
use url::{form_urlencoded, Url};

use crate::error::{FetchError, RequestError};
use crate::model::{Counters, DateRange, FetchResult, Filter};
use crate::month::{format_month, inclusive_upper, parse_month};

/// Query key carrying the month window.
pub const PERIOD_KEY: &str = "p";

pub const DEFAULT_BASE_URL: &str = "https://cubedb.org/v1/homicides_month/last/400";

/// The cube resource all requests are built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeEndpoint {
    base: Url,
}

impl CubeEndpoint {
    pub fn parse(base: &str) -> Result<Self, RequestError> {
        let base = Url::parse(base.trim()).map_err(|error| RequestError::InvalidBase {
            url: base.to_string(),
            reason: error.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(RequestError::CannotBeABase(base.to_string()));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &str {
        self.base.as_str()
    }

    /// `<base>/[group_by/<group>]?<filters>[&p=<from>&p=<to>]`
    pub fn url_for(
        &self,
        group: Option<&str>,
        filter: &Filter,
        range: Option<DateRange>,
    ) -> Result<String, RequestError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| RequestError::CannotBeABase(self.base.to_string()))?;
            segments.pop_if_empty();
            match group.filter(|g| !g.is_empty()) {
                Some(group) => {
                    segments.push("group_by").push(group);
                }
                None => {
                    segments.push("");
                }
            }
        }

        let mut query = form_urlencoded::Serializer::new(String::new());
        for (dimension, values) in filter.active() {
            if range.is_some() && dimension == PERIOD_KEY {
                continue;
            }
            for value in values {
                query.append_pair(dimension, value);
            }
        }
        if let Some(range) = range {
            let (from, to) = period_bounds(range)?;
            query.append_pair(PERIOD_KEY, &from);
            query.append_pair(PERIOD_KEY, &to);
        }

        let query = query.finish();
        url.set_query((!query.is_empty()).then_some(query.as_str()));
        Ok(url.into())
    }
}

/// Month strings sent for a half-open range. The upper bound is pulled back
/// a day so `[Jan 1, Apr 1)` asks for `2020-01..2020-03`.
pub fn period_bounds(range: DateRange) -> Result<(String, String), RequestError> {
    let from =
        format_month(range.start()).ok_or(RequestError::BadTimestamp(range.start()))?;
    let upper = inclusive_upper(range.end()).max(range.start());
    let to = format_month(upper).ok_or(RequestError::BadTimestamp(range.end()))?;
    Ok((from, to))
}

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Option<CubeResponse>,
}

#[derive(Debug, Deserialize)]
struct CubeResponse {
    #[serde(rename = "p", default)]
    period: BTreeMap<String, Counters>,
    #[serde(flatten)]
    series: BTreeMap<String, Counters>,
}

/// Parses a cube response body and re-keys the `p` series to timestamps.
pub fn reshape(body: &[u8]) -> Result<FetchResult, FetchError> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    let response = envelope
        .response
        .ok_or_else(|| FetchError::Parse("missing 'response' field".to_string()))?;

    let mut time_series = BTreeMap::new();
    for (key, counters) in response.period {
        let ts = parse_month(&key)
            .ok_or_else(|| FetchError::Parse(format!("bad month key '{key}'")))?;
        time_series.insert(ts, counters);
    }

    Ok(FetchResult {
        time_series,
        counter_series: response.series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    const JAN_2020: i64 = 1_577_836_800_000;
    const APR_2020: i64 = 1_585_699_200_000;

    #[test]
    fn builds_plain_url_with_trailing_slash() -> TestResult {
        let endpoint = CubeEndpoint::parse(DEFAULT_BASE_URL)?;
        let url = endpoint.url_for(None, &Filter::new(), None)?;
        assert_eq!(url, "https://cubedb.org/v1/homicides_month/last/400/");
        Ok(())
    }

    #[test]
    fn builds_group_by_url_with_filters_and_period() -> TestResult {
        let endpoint = CubeEndpoint::parse(DEFAULT_BASE_URL)?;
        let mut filter = Filter::new();
        filter.toggle("weapon", "knife");
        filter.toggle("weapon", "blunt object");

        let url = endpoint.url_for(
            Some("sex"),
            &filter,
            Some(DateRange::new(JAN_2020, APR_2020)),
        )?;
        assert_eq!(
            url,
            "https://cubedb.org/v1/homicides_month/last/400/group_by/sex\
             ?weapon=knife&weapon=blunt+object&p=2020-01&p=2020-03"
        );
        Ok(())
    }

    #[test]
    fn range_replaces_period_filter() -> TestResult {
        let endpoint = CubeEndpoint::parse("http://localhost:9000/v1/cube/")?;
        let mut filter = Filter::new();
        filter.toggle("p", "1999-01");

        let url = endpoint.url_for(None, &filter, Some(DateRange::new(JAN_2020, JAN_2020)))?;
        assert_eq!(url, "http://localhost:9000/v1/cube/?p=2020-01&p=2020-01");

        let url = endpoint.url_for(None, &filter, None)?;
        assert_eq!(url, "http://localhost:9000/v1/cube/?p=1999-01");
        Ok(())
    }

    #[test]
    fn group_segment_is_escaped() -> TestResult {
        let endpoint = CubeEndpoint::parse(DEFAULT_BASE_URL)?;
        let url = endpoint.url_for(Some("age group"), &Filter::new(), None)?;
        assert_eq!(
            url,
            "https://cubedb.org/v1/homicides_month/last/400/group_by/age%20group"
        );
        Ok(())
    }

    #[test]
    fn rejects_unusable_bases() {
        assert!(matches!(
            CubeEndpoint::parse("not a url"),
            Err(RequestError::InvalidBase { .. })
        ));
        assert!(matches!(
            CubeEndpoint::parse("mailto:someone@example.com"),
            Err(RequestError::CannotBeABase(_))
        ));
    }

    #[test]
    fn reshapes_period_keys_to_timestamps() -> TestResult {
        let body = br#"{"response":{"p":{"2020-01":{"a":5}},"male":{"a":3}}}"#;
        let result = reshape(body)?;

        assert_eq!(result.time_series.len(), 1);
        assert_eq!(result.time_series[&JAN_2020]["a"], 5.0);
        assert_eq!(result.counter_series.len(), 1);
        assert_eq!(result.counter_series["male"]["a"], 3.0);
        Ok(())
    }

    #[test]
    fn response_without_period_passes_through() -> TestResult {
        let result = reshape(br#"{"response":{"female":{"c":1.5}}}"#)?;
        assert!(result.time_series.is_empty());
        assert_eq!(result.counter_series["female"]["c"], 1.5);
        Ok(())
    }

    #[test]
    fn reports_parse_failures() {
        assert!(matches!(reshape(b"<html>"), Err(FetchError::Parse(_))));
        assert_eq!(
            reshape(br#"{"status":"ok"}"#),
            Err(FetchError::Parse("missing 'response' field".to_string()))
        );
        assert!(matches!(
            reshape(br#"{"response":{"p":{"last week":{"a":1}}}}"#),
            Err(FetchError::Parse(_))
        ));
    }
}
