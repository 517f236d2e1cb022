//! Date handling shared by bookings, availability, pricing and the tonight views.
//!
//! A booking belongs to the UTC calendar date of its timestamp; inventory,
//! availability and the tonight views all key on that date. The venue timezone
//! only decides which date "today" is and which bookings fall in the evening shift.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;

use crate::entities::DayType;
use crate::errors::ServiceError;

/// Hour (venue-local) from which a booking counts as part of the evening shift.
pub const EVENING_SHIFT_START_HOUR: u32 = 18;

const WEEKEND_MULTIPLIER: f64 = 1.5;

/// Parses a booking timestamp: RFC 3339, bare `YYYY-MM-DD` (midnight UTC),
/// or a naive `YYYY-MM-DDTHH:MM[:SS]` read as UTC. Sub-second precision is dropped.
pub fn parse_booking_timestamp(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    let raw = raw.trim();
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        })
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|naive| naive.and_utc())
        })
        .ok_or_else(|| ServiceError::BadRequest(format!("Invalid date: {}", raw)))?;

    Ok(parsed.with_nanosecond(0).unwrap_or(parsed))
}

/// Parses a calendar day from `YYYY-MM-DD` or a full timestamp.
pub fn parse_day(raw: &str) -> Result<NaiveDate, ServiceError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| parse_booking_timestamp(raw).map(|dt| dt.date_naive()))
        .map_err(|_| ServiceError::BadRequest(format!("Invalid date: {}", raw)))
}

/// The inventory key for a booking timestamp.
pub fn inventory_day(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

/// Friday and Saturday nights are weekend pricing.
pub fn day_type_for(date: NaiveDate) -> DayType {
    match date.weekday() {
        Weekday::Fri | Weekday::Sat => DayType::Weekend,
        _ => DayType::Weekday,
    }
}

pub fn price_multiplier(date: NaiveDate) -> f64 {
    match day_type_for(date) {
        DayType::Weekend => WEEKEND_MULTIPLIER,
        _ => 1.0,
    }
}

/// `[start, end)` of a UTC calendar day.
pub fn utc_day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Today's date at the venue.
pub fn venue_today(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Whether a booking timestamp falls in the venue's evening shift.
pub fn is_evening(tz: Tz, at: DateTime<Utc>) -> bool {
    at.with_timezone(&tz).hour() >= EVENING_SHIFT_START_HOUR
}

/// Inclusive iterator over calendar days.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[rstest]
    #[case("2025-03-14", DayType::Weekend)] // Friday
    #[case("2025-03-15", DayType::Weekend)] // Saturday
    #[case("2025-03-16", DayType::Weekday)] // Sunday
    #[case("2025-03-13", DayType::Weekday)] // Thursday
    fn fri_and_sat_are_weekend(#[case] date: &str, #[case] expected: DayType) {
        assert_eq!(day_type_for(day(date)), expected);
    }

    #[test]
    fn weekend_multiplier() {
        assert_eq!(price_multiplier(day("2025-03-15")), 1.5);
        assert_eq!(price_multiplier(day("2025-03-17")), 1.0);
    }

    #[rstest]
    #[case("2025-06-07T23:30:00Z", "2025-06-07")]
    #[case("2025-06-07T23:30:00-04:00", "2025-06-08")]
    #[case("2025-06-07", "2025-06-07")]
    #[case("2025-06-07T21:00", "2025-06-07")]
    fn booking_timestamps_key_by_utc_day(#[case] raw: &str, #[case] expected: &str) {
        let at = parse_booking_timestamp(raw).unwrap();
        assert_eq!(inventory_day(at), day(expected));
    }

    #[test]
    fn timestamps_are_truncated_to_seconds() {
        let at = parse_booking_timestamp("2025-06-07T22:15:30.987Z").unwrap();
        assert_eq!(at.nanosecond(), 0);
        assert_eq!(at.second(), 30);
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(parse_booking_timestamp("next friday").is_err());
        assert!(parse_day("2025-13-01").is_err());
    }

    #[test]
    fn venue_today_follows_local_clock() {
        let tz: Tz = "America/New_York".parse().unwrap();
        // 02:00 UTC on the 5th is still the evening of the 4th in New York
        let now = parse_booking_timestamp("2025-07-05T02:00:00Z").unwrap();
        assert_eq!(venue_today(tz, now), day("2025-07-04"));
    }

    #[test]
    fn evening_shift_uses_local_hour() {
        let tz: Tz = "America/New_York".parse().unwrap();
        // 22:30 UTC is 18:30 EDT
        assert!(is_evening(tz, parse_booking_timestamp("2025-07-04T22:30:00Z").unwrap()));
        // 20:00 UTC is 16:00 EDT
        assert!(!is_evening(tz, parse_booking_timestamp("2025-07-04T20:00:00Z").unwrap()));
    }

    #[test]
    fn days_between_is_inclusive() {
        let days: Vec<_> = days_between(day("2025-01-30"), day("2025-02-02")).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days.last(), Some(&day("2025-02-02")));
        assert_eq!(days_between(day("2025-02-02"), day("2025-02-01")).count(), 0);
    }
}
