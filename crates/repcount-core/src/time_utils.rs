use chrono::{Datelike, Month, NaiveDate, NaiveTime};

// ── Calendar helpers ──────────────────────────────────────────────────────────

/// Number of days in `month` of `year` (28–31).
///
/// Returns `0` for a month outside `1..=12`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match last_day_of_month(year, month) {
        Some(d) => d.day(),
        None => 0,
    }
}

/// Last calendar date of `month` in `year`.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Full English name of a month number, e.g. `11` → `"November"`.
pub fn month_name(month: u32) -> Option<&'static str> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
}

/// Parse a month name (`"November"`, `"nov"`) or number (`"11"`) into `1..=12`.
pub fn parse_month(s: &str) -> Option<u32> {
    let trimmed = s.trim();
    if let Ok(n) = trimmed.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    trimmed
        .parse::<Month>()
        .ok()
        .map(|m| m.number_from_month())
}

// ── Text parsing ──────────────────────────────────────────────────────────────

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M%p"];

/// Parse a textual calendar date.
///
/// Accepts ISO dates, slash-separated ISO dates, US `month/day/year` dates and
/// full ISO datetimes (the time component is discarded).
pub fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse a textual clock time (`"07:30"`, `"7:30 PM"`, `"19:30:05"`).
///
/// Full ISO datetimes are also accepted; only the clock part is kept.
pub fn parse_time_text(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.time());
        }
    }
    None
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 1), 31);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 11), 30);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn test_last_day_of_december_rolls_year() {
        assert_eq!(last_day_of_month(2024, 12), Some(d(2024, 12, 31)));
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(11), Some("November"));
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn test_parse_month_names_and_numbers() {
        assert_eq!(parse_month("November"), Some(11));
        assert_eq!(parse_month("nov"), Some(11));
        assert_eq!(parse_month("02"), Some(2));
        assert_eq!(parse_month("13"), None);
        assert_eq!(parse_month("Smarch"), None);
    }

    #[test]
    fn test_parse_date_text_formats() {
        assert_eq!(parse_date_text("2024-11-05"), Some(d(2024, 11, 5)));
        assert_eq!(parse_date_text("2024/11/05"), Some(d(2024, 11, 5)));
        assert_eq!(parse_date_text("11/05/2024"), Some(d(2024, 11, 5)));
        assert_eq!(parse_date_text("2024-11-05T07:30:00"), Some(d(2024, 11, 5)));
        assert_eq!(parse_date_text(" "), None);
        assert_eq!(parse_date_text("yesterday"), None);
    }

    #[test]
    fn test_parse_time_text_formats() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(parse_time_text("07:30"), Some(t(7, 30)));
        assert_eq!(parse_time_text("7:30 PM"), Some(t(19, 30)));
        assert_eq!(parse_time_text("7:30pm"), Some(t(19, 30)));
        assert_eq!(parse_time_text("2024-11-05 18:15:00"), Some(t(18, 15)));
        assert_eq!(parse_time_text("noon"), None);
    }
}
