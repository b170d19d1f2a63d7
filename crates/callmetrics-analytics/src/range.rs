//! Resolution of caller-supplied start/end dates into closed calendar-day
//! ranges in the reporting time zone.

use callmetrics_common::{CallMetricsError, Result, Timestamp};
use callmetrics_config::AnalyticsConfig;
use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Raw range parameters as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRequest {
    /// First day, `YYYY-MM-DD` or RFC 3339. Absent or blank means the lookback default.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Last day, `YYYY-MM-DD` or RFC 3339. Absent or blank means today.
    #[serde(default)]
    pub end_date: Option<String>,
}

impl RangeRequest {
    /// Request for the default trailing window.
    pub const fn trailing() -> Self {
        Self {
            start_date: None,
            end_date: None,
        }
    }

    /// Request for an explicit pair of days.
    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start_date: Some(start.into()),
            end_date: Some(end.into()),
        }
    }
}

/// Closed range of whole calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Local midnight of the first day, as UTC
    pub start: Timestamp,
    /// Last millisecond of the last day, as UTC
    pub end: Timestamp,
    /// First calendar day
    pub start_day: NaiveDate,
    /// Last calendar day
    pub end_day: NaiveDate,
}

impl DateRange {
    /// Builds the range covering `start_day..=end_day` in `tz`. The days are
    /// reordered if given backwards.
    pub fn from_days(start_day: NaiveDate, end_day: NaiveDate, tz: Tz) -> Self {
        let (start_day, end_day) = if start_day <= end_day {
            (start_day, end_day)
        } else {
            (end_day, start_day)
        };

        Self {
            start: start_of_day(start_day, tz),
            end: end_of_day(end_day, tz),
            start_day,
            end_day,
        }
    }

    /// `end_day - start_day` in days; 0 for a single-day range.
    pub fn span_days(&self) -> i64 {
        (self.end_day - self.start_day).num_days()
    }

    /// Number of calendar days covered.
    pub fn day_count(&self) -> i64 {
        self.span_days() + 1
    }

    /// Whether `ts` falls inside the range, both ends inclusive.
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// First instant of `day` in `tz`.
///
/// Where midnight does not exist locally (a DST gap) the first existing hour
/// of the day is used.
pub fn start_of_day(day: NaiveDate, tz: Tz) -> Timestamp {
    let midnight = day.and_time(NaiveTime::MIN);
    (0..=3)
        .find_map(|hour| {
            tz.from_local_datetime(&(midnight + Duration::hours(hour)))
                .earliest()
        })
        .map_or_else(
            || Utc.from_utc_datetime(&midnight),
            |local| local.with_timezone(&Utc),
        )
}

/// Last millisecond of `day` in `tz`.
pub fn end_of_day(day: NaiveDate, tz: Tz) -> Timestamp {
    day.succ_opt().map_or_else(
        || Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)) + Duration::milliseconds(86_399_999),
        |next| start_of_day(next, tz) - Duration::milliseconds(1),
    )
}

/// Calendar day of `ts` in `tz`.
pub fn local_day(ts: Timestamp, tz: Tz) -> NaiveDate {
    ts.with_timezone(&tz).date_naive()
}

/// Turns [`RangeRequest`]s into [`DateRange`]s.
#[derive(Debug, Clone, Copy)]
pub struct RangeResolver {
    tz: Tz,
    lookback_days: u32,
}

impl RangeResolver {
    /// Creates a resolver for `tz` defaulting to `lookback_days` before today.
    pub const fn new(tz: Tz, lookback_days: u32) -> Self {
        Self { tz, lookback_days }
    }

    /// Creates a resolver from the analytics configuration.
    pub fn from_config(config: &AnalyticsConfig) -> Result<Self> {
        Ok(Self::new(config.tz()?, config.default_lookback_days))
    }

    /// Reporting time zone.
    pub const fn tz(&self) -> Tz {
        self.tz
    }

    /// Resolves `request` relative to `now`.
    pub fn resolve(&self, request: &RangeRequest, now: Timestamp) -> Result<DateRange> {
        let today = local_day(now, self.tz);

        let end_day = match non_blank(request.end_date.as_deref()) {
            Some(raw) => self.parse_day(raw, "endDate")?,
            None => today,
        };
        let start_day = match non_blank(request.start_date.as_deref()) {
            Some(raw) => self.parse_day(raw, "startDate")?,
            None => today
                .checked_sub_days(Days::new(u64::from(self.lookback_days)))
                .ok_or_else(|| {
                    CallMetricsError::invalid_range("lookback reaches before the earliest date")
                })?,
        };

        if start_day > end_day {
            warn!(%start_day, %end_day, "Start date after end date, swapping");
        }

        let range = DateRange::from_days(start_day, end_day, self.tz);
        debug!(
            start = %range.start_day,
            end = %range.end_day,
            tz = %self.tz,
            "Resolved date range"
        );
        Ok(range)
    }

    fn parse_day(&self, raw: &str, field: &str) -> Result<NaiveDate> {
        if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(day);
        }

        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&self.tz).date_naive())
            .map_err(|_| {
                CallMetricsError::invalid_range_input(
                    format!("{field} is not a YYYY-MM-DD date or RFC 3339 timestamp"),
                    raw,
                )
            })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use callmetrics_common::test_utils::{mock_date, mock_timestamp};
    use chrono::Timelike;

    fn utc_resolver() -> RangeResolver {
        RangeResolver::new(Tz::UTC, 7)
    }

    #[test]
    fn test_default_range_is_trailing_week() {
        let now = mock_timestamp(2024, 3, 15, 18, 30, 0);
        let range = utc_resolver().resolve(&RangeRequest::trailing(), now).unwrap();

        assert_eq!(range.start_day, mock_date(2024, 3, 8));
        assert_eq!(range.end_day, mock_date(2024, 3, 15));
        assert_eq!(range.start, mock_timestamp(2024, 3, 8, 0, 0, 0));
        assert_eq!(range.end.time().hour(), 23);
        assert_eq!(range.end.timestamp_subsec_millis(), 999);
        assert_eq!(range.span_days(), 7);
        assert_eq!(range.day_count(), 8);
    }

    #[test]
    fn test_blank_inputs_use_defaults() {
        let now = mock_timestamp(2024, 3, 15, 0, 0, 0);
        let request = RangeRequest::between("  ", "");
        let range = utc_resolver().resolve(&request, now).unwrap();

        assert_eq!(range.start_day, mock_date(2024, 3, 8));
        assert_eq!(range.end_day, mock_date(2024, 3, 15));
    }

    #[test]
    fn test_explicit_days() {
        let now = mock_timestamp(2024, 3, 15, 0, 0, 0);
        let request = RangeRequest::between("2024-01-01", "2024-01-31");
        let range = utc_resolver().resolve(&request, now).unwrap();

        assert_eq!(range.span_days(), 30);
        assert!(range.contains(mock_timestamp(2024, 1, 31, 23, 59, 59)));
        assert!(!range.contains(mock_timestamp(2024, 2, 1, 0, 0, 0)));
        assert!(range.contains(mock_timestamp(2024, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_rfc3339_input_uses_local_day() {
        let resolver = RangeResolver::new(chrono_tz::America::New_York, 7);
        let now = mock_timestamp(2024, 3, 15, 12, 0, 0);
        // 02:00 UTC on the 10th is still the 9th in New York.
        let request = RangeRequest::between("2024-03-10T02:00:00Z", "2024-03-12");
        let range = resolver.resolve(&request, now).unwrap();

        assert_eq!(range.start_day, mock_date(2024, 3, 9));
        assert_eq!(range.start, mock_timestamp(2024, 3, 9, 5, 0, 0));
    }

    #[test]
    fn test_swapped_range_is_reordered() {
        let now = mock_timestamp(2024, 3, 15, 0, 0, 0);
        let request = RangeRequest::between("2024-03-10", "2024-03-01");
        let range = utc_resolver().resolve(&request, now).unwrap();

        assert_eq!(range.start_day, mock_date(2024, 3, 1));
        assert_eq!(range.end_day, mock_date(2024, 3, 10));
        assert!(range.start <= range.end);
    }

    #[test]
    fn test_unparsable_input_names_field() {
        let now = mock_timestamp(2024, 3, 15, 0, 0, 0);
        let request = RangeRequest::between("yesterday", "2024-03-01");
        let err = utc_resolver().resolve(&request, now).unwrap_err();

        assert!(err.is_client_error());
        assert!(err.to_string().contains("startDate"));

        let request = RangeRequest::between("2024-03-01", "2024-02-30");
        let err = utc_resolver().resolve(&request, now).unwrap_err();
        assert!(err.to_string().contains("endDate"));
    }

    #[test]
    fn test_today_follows_reporting_zone() {
        let resolver = RangeResolver::new(chrono_tz::Asia::Tokyo, 0);
        // 20:00 UTC on the 15th is already the 16th in Tokyo.
        let now = mock_timestamp(2024, 3, 15, 20, 0, 0);
        let range = resolver.resolve(&RangeRequest::trailing(), now).unwrap();

        assert_eq!(range.start_day, mock_date(2024, 3, 16));
        assert_eq!(range.end_day, mock_date(2024, 3, 16));
        assert_eq!(range.start, mock_timestamp(2024, 3, 15, 15, 0, 0));
    }

    #[test]
    fn test_dst_day_boundaries() {
        let tz = chrono_tz::Europe::Berlin;
        // Clocks go forward on 2024-03-31: the day is 23 hours long.
        let range = DateRange::from_days(mock_date(2024, 3, 31), mock_date(2024, 3, 31), tz);

        assert_eq!(range.start, mock_timestamp(2024, 3, 30, 23, 0, 0));
        assert_eq!(
            range.end + Duration::milliseconds(1),
            mock_timestamp(2024, 3, 31, 22, 0, 0)
        );
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: RangeRequest =
            serde_json::from_str(r#"{"startDate":"2024-01-01"}"#).unwrap();
        assert_eq!(request.start_date.as_deref(), Some("2024-01-01"));
        assert!(request.end_date.is_none());
    }
}
