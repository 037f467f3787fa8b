use chrono::{DateTime, Local, TimeZone};

/// Format the local calendar date of `instant` as a zero-padded
/// `YYYY-MM-DD` day key.
///
/// Two instants on the same local calendar day always produce the same key;
/// instants on different local days produce different keys even when their
/// UTC days coincide.
pub fn to_date_key(instant: DateTime<Local>) -> String {
    instant.format("%Y-%m-%d").to_string()
}

/// Local midnight of `instant`'s calendar day.
pub fn local_midnight(instant: DateTime<Local>) -> DateTime<Local> {
    let date = instant.date_naive();
    // Midnight always exists for the dates we handle; fall back to the
    // earliest valid instant on DST-shifted days.
    match Local.from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap()) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(dt, _) => dt,
        chrono::LocalResult::None => instant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_date_key_is_zero_padded() {
        let dt = Local.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
        assert_eq!(to_date_key(dt), "2024-03-05");
    }

    #[test]
    fn test_same_local_day_same_key() {
        let morning = Local.with_ymd_and_hms(2024, 7, 1, 0, 0, 1).unwrap();
        let night = Local.with_ymd_and_hms(2024, 7, 1, 23, 59, 59).unwrap();
        assert_eq!(to_date_key(morning), to_date_key(night));
    }

    #[test]
    fn test_adjacent_days_differ() {
        let late = Local.with_ymd_and_hms(2024, 7, 1, 23, 59, 59).unwrap();
        let next = late + Duration::seconds(2);
        assert_ne!(to_date_key(late), to_date_key(next));
    }

    #[test]
    fn test_local_midnight_truncates_time() {
        let dt = Local.with_ymd_and_hms(2024, 7, 1, 15, 45, 12).unwrap();
        let midnight = local_midnight(dt);
        assert_eq!(to_date_key(midnight), "2024-07-01");
        assert_eq!(midnight.format("%H:%M:%S").to_string(), "00:00:00");
    }
}
