//! Fixed UTC+7 (WIB) rendering of provider timestamps.
//!
//! The offset is a constant, not a named zone: output is identical on every
//! host regardless of its local timezone database.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Seconds east of UTC for Waktu Indonesia Barat.
pub const WIB_OFFSET_SECS: i32 = 7 * 3600;

/// Label attached to every aggregate response.
pub const TIMEZONE_LABEL: &str = "UTC+7 (WIB)";

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

const WIB: FixedOffset = match FixedOffset::east_opt(WIB_OFFSET_SECS) {
    Some(offset) => offset,
    None => panic!("UTC+7 is outside chrono's offset bounds"),
};

/// Earliest instant rendered: 0001-01-01T00:00:00Z.
const MIN_TIMESTAMP: i64 = -62_135_596_800;
/// Latest instant rendered: 9999-12-31T23:59:59 in WIB.
const MAX_TIMESTAMP: i64 = 253_402_300_799 - WIB_OFFSET_SECS as i64;

/// Interpret `timestamp` as Unix seconds and render it as ISO-8601 at `+07:00`.
///
/// Values outside years 0001..=9999 saturate to the nearest bound, so this
/// never fails and always yields a four-digit year.
pub fn to_wib(timestamp: i64) -> String {
    let clamped = timestamp.clamp(MIN_TIMESTAMP, MAX_TIMESTAMP);
    let utc = DateTime::<Utc>::from_timestamp(clamped, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    utc.with_timezone(&WIB).format(ISO_FORMAT).to_string()
}

/// A Unix timestamp together with its WIB rendering.
///
/// Only built from a single source value, so both fields always denote the
/// same instant. Deserializing recomputes `datetime_wib` from `timestamp` and
/// rejects input whose rendering disagrees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StampFields")]
pub struct WibStamp {
    timestamp: i64,
    datetime_wib: String,
}

#[derive(Deserialize)]
struct StampFields {
    timestamp: i64,
    datetime_wib: Option<String>,
}

impl TryFrom<StampFields> for WibStamp {
    type Error = String;

    fn try_from(fields: StampFields) -> Result<Self, Self::Error> {
        let stamp = WibStamp::from_unix(fields.timestamp);
        match fields.datetime_wib {
            Some(given) if given != stamp.datetime_wib => Err(format!(
                "datetime_wib '{given}' does not match timestamp {} ({})",
                stamp.timestamp, stamp.datetime_wib
            )),
            _ => Ok(stamp),
        }
    }
}

impl WibStamp {
    pub fn from_unix(timestamp: i64) -> Self {
        Self { timestamp, datetime_wib: to_wib(timestamp) }
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn datetime_wib(&self) -> &str {
        &self.datetime_wib
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_seven_in_the_morning() {
        assert_eq!(to_wib(0), "1970-01-01T07:00:00+07:00");
    }

    #[test]
    fn offset_is_seven_hours_east() {
        assert_eq!(WIB.local_minus_utc(), WIB_OFFSET_SECS);
        assert_eq!(WIB.to_string(), "+07:00");
    }

    #[test]
    fn crosses_the_date_line_forward() {
        // 2024-01-01T20:00:00Z
        assert_eq!(to_wib(1_704_139_200), "2024-01-02T03:00:00+07:00");
    }

    #[test]
    fn negative_timestamps_render() {
        assert_eq!(to_wib(-3600), "1970-01-01T06:00:00+07:00");
    }

    #[test]
    fn denotes_the_same_instant() {
        for ts in [0, 1, 86_399, 1_700_000_000, 2_147_483_647, -2_147_483_648] {
            let rendered = to_wib(ts);
            assert!(rendered.ends_with("+07:00"), "{rendered}");

            let parsed = DateTime::parse_from_rfc3339(&rendered).expect("valid rfc3339");
            assert_eq!(parsed.timestamp(), ts);
            assert_eq!(parsed.offset().local_minus_utc(), WIB_OFFSET_SECS);
        }
    }

    #[test]
    fn extreme_values_saturate() {
        assert_eq!(to_wib(i64::MAX), "9999-12-31T23:59:59+07:00");
        assert_eq!(to_wib(i64::MIN), "0001-01-01T07:00:00+07:00");
        assert_eq!(to_wib(MAX_TIMESTAMP), to_wib(MAX_TIMESTAMP + 1));
    }

    #[test]
    fn stamp_pairs_raw_and_rendered() {
        let stamp = WibStamp::from_unix(1_726_000_000);
        assert_eq!(stamp.timestamp(), 1_726_000_000);
        assert_eq!(stamp.datetime_wib(), to_wib(1_726_000_000));
    }

    #[test]
    fn stamp_deserializes_from_its_own_output() {
        let stamp = WibStamp::from_unix(1_726_000_000);
        let json = serde_json::to_value(&stamp).unwrap();
        assert_eq!(serde_json::from_value::<WibStamp>(json).unwrap(), stamp);
    }

    #[test]
    fn stamp_rejects_a_rendering_of_another_instant() {
        let err = serde_json::from_value::<WibStamp>(serde_json::json!({
            "timestamp": 0,
            "datetime_wib": "2099-01-01T00:00:00+07:00"
        }))
        .unwrap_err();

        assert!(err.to_string().contains("does not match timestamp 0"));
    }

    #[test]
    fn stamp_fills_in_missing_rendering() {
        let stamp: WibStamp =
            serde_json::from_value(serde_json::json!({"timestamp": 0})).unwrap();
        assert_eq!(stamp.datetime_wib(), "1970-01-01T07:00:00+07:00");
    }

    #[test]
    fn stamp_serializes_flat_fields() {
        let json = serde_json::to_value(WibStamp::from_unix(0)).unwrap();
        assert_eq!(json["timestamp"], 0);
        assert_eq!(json["datetime_wib"], "1970-01-01T07:00:00+07:00");
    }
}
