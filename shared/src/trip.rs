//! Unit conversion and timestamp arithmetic for trip display.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Wire format for the `departAt` parameter (naive local time, no zone).
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const CLOCK_FORMAT: &str = "%Y-%m-%d %I:%M %p";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

/// Convert a 12-hour clock reading to a 24-hour one.
/// 12 AM maps to 00h, 12 PM stays 12h.
pub fn to_24_hour(hour12: u32, meridiem: Meridiem) -> u32 {
    match (meridiem, hour12) {
        (Meridiem::Am, 12) => 0,
        (Meridiem::Am, hour) => hour,
        (Meridiem::Pm, 12) => 12,
        (Meridiem::Pm, hour) => hour + 12,
    }
}

pub fn combine_departure(
    date: NaiveDate,
    hour12: u32,
    minute: u32,
    meridiem: Meridiem,
) -> Option<NaiveDateTime> {
    let time = NaiveTime::from_hms_opt(to_24_hour(hour12, meridiem), minute, 0)?;
    Some(date.and_time(time))
}

/// Assemble the `departAt` string from the separate picker controls.
/// Returns `None` when the date string or clock reading is invalid.
pub fn departure_iso(date: &str, hour12: u32, minute: u32, meridiem: Meridiem) -> Option<String> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let departure = combine_departure(date, hour12, minute, meridiem)?;
    Some(departure.format(ISO_FORMAT).to_string())
}

pub fn parse_departure(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, ISO_FORMAT).ok()
}

pub fn arrival_after(departure: NaiveDateTime, travel_seconds: u64) -> NaiveDateTime {
    departure + Duration::seconds(travel_seconds as i64)
}

pub fn format_distance(length_in_meters: u64) -> String {
    format!("{:.2} km", length_in_meters as f64 / 1000.0)
}

pub fn format_travel_time(travel_seconds: u64) -> String {
    format!("{:.2} minutes", travel_seconds as f64 / 60.0)
}

pub fn format_clock(value: NaiveDateTime) -> String {
    value.format(CLOCK_FORMAT).to_string()
}

/// Departure and arrival labels for a trip starting at `depart_iso` and
/// lasting `travel_seconds`.
pub fn trip_times(depart_iso: &str, travel_seconds: u64) -> Option<(String, String)> {
    let departure = parse_departure(depart_iso)?;
    let arrival = arrival_after(departure, travel_seconds);
    Some((format_clock(departure), format_clock(arrival)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_distance_in_kilometers() {
        assert_eq!(format_distance(10_000), "10.00 km");
        assert_eq!(format_distance(1_234), "1.23 km");
        assert_eq!(format_distance(0), "0.00 km");
    }

    #[test]
    fn formats_travel_time_in_minutes() {
        assert_eq!(format_travel_time(1_200), "20.00 minutes");
        assert_eq!(format_travel_time(90), "1.50 minutes");
    }

    #[test]
    fn arrival_adds_duration() {
        let departure = parse_departure("2024-01-01T09:00:00").unwrap();
        let arrival = arrival_after(departure, 20 * 60);
        assert_eq!(arrival.format(ISO_FORMAT).to_string(), "2024-01-01T09:20:00");
    }

    #[test]
    fn midnight_and_noon_conversions() {
        assert_eq!(to_24_hour(12, Meridiem::Am), 0);
        assert_eq!(to_24_hour(12, Meridiem::Pm), 12);
        assert_eq!(to_24_hour(1, Meridiem::Am), 1);
        assert_eq!(to_24_hour(1, Meridiem::Pm), 13);
        assert_eq!(to_24_hour(11, Meridiem::Pm), 23);
    }

    #[test]
    fn builds_departure_string() {
        assert_eq!(
            departure_iso("2024-01-01", 9, 0, Meridiem::Am).as_deref(),
            Some("2024-01-01T09:00:00")
        );
        assert_eq!(
            departure_iso("2024-06-15", 12, 30, Meridiem::Pm).as_deref(),
            Some("2024-06-15T12:30:00")
        );
    }

    #[test]
    fn rejects_malformed_date() {
        assert_eq!(departure_iso("not-a-date", 9, 0, Meridiem::Am), None);
        assert_eq!(departure_iso("2024-13-40", 9, 0, Meridiem::Am), None);
    }

    #[test]
    fn rejects_out_of_range_minute() {
        assert_eq!(departure_iso("2024-01-01", 9, 75, Meridiem::Am), None);
    }

    #[test]
    fn trip_times_cross_midnight() {
        let (departure, arrival) = trip_times("2024-01-01T23:50:00", 1_200).unwrap();
        assert_eq!(departure, "2024-01-01 11:50 PM");
        assert_eq!(arrival, "2024-01-02 12:10 AM");
    }

    #[test]
    fn trip_times_sample_trip() {
        let (departure, arrival) = trip_times("2024-01-01T09:00:00", 1_200).unwrap();
        assert_eq!(departure, "2024-01-01 09:00 AM");
        assert_eq!(arrival, "2024-01-01 09:20 AM");
    }

    #[test]
    fn trip_times_rejects_garbage() {
        assert_eq!(trip_times("yesterday-ish", 60), None);
    }
}
