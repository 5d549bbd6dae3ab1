use chrono::{DateTime, Duration, Local};

/// Stopwatch display text, `MM:SS`. Minutes are unbounded rather than wrapped
/// into hours.
pub fn stopwatch_text(elapsed_seconds: u64) -> String {
    format!("{:02}:{:02}", elapsed_seconds / 60, elapsed_seconds % 60)
}

/// Date column text, `MM/DD/YYYY`.
pub fn sheet_date(moment: DateTime<Local>) -> String {
    moment.format("%m/%d/%Y").to_string()
}

/// Time-of-day column text, 12-hour `HH:MM:SS AM/PM`.
pub fn sheet_time(moment: DateTime<Local>) -> String {
    moment.format("%I:%M:%S %p").to_string()
}

/// Total duration column text, `H:MM:SS` with unpadded hours.
pub fn sheet_duration(total: Duration) -> String {
    let seconds = total.num_seconds().max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        seconds % 3600 / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local, TimeZone};

    use super::*;

    #[test]
    fn stopwatch_is_zero_padded() {
        assert_eq!(stopwatch_text(0), "00:00");
        assert_eq!(stopwatch_text(9), "00:09");
        assert_eq!(stopwatch_text(65), "01:05");
    }

    #[test]
    fn stopwatch_minutes_are_unbounded() {
        assert_eq!(stopwatch_text(60 * 60 + 5), "60:05");
        assert_eq!(stopwatch_text(125 * 60), "125:00");
    }

    #[test]
    fn sheet_date_and_time_formats() {
        let moment = Local.with_ymd_and_hms(2024, 1, 5, 13, 5, 9).unwrap();
        assert_eq!(sheet_date(moment), "01/05/2024");
        assert_eq!(sheet_time(moment), "01:05:09 PM");
    }

    #[test]
    fn sheet_time_morning_keeps_leading_zero() {
        let moment = Local.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap();
        assert_eq!(sheet_time(moment), "09:00:00 AM");
    }

    #[test]
    fn sheet_duration_pads_minutes_and_seconds_only() {
        let start = Local.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2024, 1, 5, 10, 30, 5).unwrap();
        assert_eq!(sheet_duration(end - start), "1:30:05");
    }

    #[test]
    fn sheet_duration_of_equal_endpoints_is_zero() {
        assert_eq!(sheet_duration(Duration::zero()), "0:00:00");
    }

    #[test]
    fn sheet_duration_clamps_negative_to_zero() {
        assert_eq!(sheet_duration(Duration::seconds(-30)), "0:00:00");
    }
}
