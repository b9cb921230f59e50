//! oneM2M timestamps, e.g. `20240101T120000,000000`.

use chrono::{DateTime, Duration, Utc};

const ONEM2M_DATE_FORMAT: &str = "%Y%m%dT%H%M%S,%6f";

/// The current UTC time shifted by `delta` seconds. Returns `None` if the
/// result is not representable.
pub fn get_date(delta: i64) -> Option<String> {
    let delta = Duration::try_seconds(delta)?;
    Utc::now().checked_add_signed(delta).map(to_iso8601_date)
}

pub fn to_iso8601_date(date: DateTime<Utc>) -> String {
    date.format(ONEM2M_DATE_FORMAT).to_string()
}

/// Format a Unix timestamp in seconds. Returns `None` if it is out of range.
pub fn timestamp_to_iso8601_date(timestamp: f64) -> Option<String> {
    if !timestamp.is_finite() {
        return None;
    }
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos).map(to_iso8601_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, TimeZone};

    fn parse(date: &str) -> DateTime<Utc> {
        Utc.from_utc_datetime(&NaiveDateTime::parse_from_str(date, ONEM2M_DATE_FORMAT).unwrap())
    }

    #[test]
    fn test_format() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap() + Duration::microseconds(42);
        assert_eq!(to_iso8601_date(date), "20240102T030405,000042");
    }

    #[test]
    fn test_timestamp() {
        assert_eq!(
            timestamp_to_iso8601_date(0.5).as_deref(),
            Some("19700101T000000,500000")
        );
        assert_eq!(
            timestamp_to_iso8601_date(1_704_067_200.0).as_deref(),
            Some("20240101T000000,000000")
        );
        assert_eq!(timestamp_to_iso8601_date(f64::NAN), None);
    }

    #[test]
    fn test_delta() {
        let now = parse(&get_date(0).unwrap());
        let later = parse(&get_date(3600).unwrap());
        let difference = (later - now).num_seconds();
        assert!((3599..=3601).contains(&difference));

        let earlier = parse(&get_date(-60).unwrap());
        assert!(earlier < now);
    }

    #[test]
    fn test_delta_out_of_range() {
        assert_eq!(get_date(i64::MAX), None);
        assert_eq!(get_date(i64::MIN), None);
        assert_eq!(get_date(400_000 * 365 * 86_400), None);
    }
}
