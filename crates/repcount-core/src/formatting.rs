use chrono::NaiveDate;

use crate::models::DailyRate;

/// Format a number with thousands separators and a fixed number of decimals.
///
/// # Examples
///
/// ```
/// use repcount_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let fixed = format!("{:.prec$}", value.abs(), prec = decimals as usize);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::new();
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a whole count with thousands separators.
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format an optional statistic, using `"-"` when it is undefined.
pub fn format_optional(value: Option<f64>, decimals: u32) -> String {
    match value {
        Some(v) => format_number(v, decimals),
        None => "-".to_string(),
    }
}

/// Format a required daily pace.
///
/// # Examples
///
/// ```
/// use repcount_core::formatting::format_rate;
/// use repcount_core::models::DailyRate;
///
/// assert_eq!(format_rate(&DailyRate::Required(12.0)), "12.00 per day");
/// assert_eq!(format_rate(&DailyRate::Undefined), "undefined (no days left)");
/// ```
pub fn format_rate(rate: &DailyRate) -> String {
    match rate {
        DailyRate::Required(v) => format!("{} per day", format_number(*v, 2)),
        DailyRate::Undefined => "undefined (no days left)".to_string(),
    }
}

/// `(part / whole) * 100`, or `0.0` when `whole` is zero.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    (part / whole) * 100.0
}

/// Day-first date used in report headers, e.g. `17/11/2024`.
pub fn format_day_month_year(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

/// Upper-case the first character and lower-case the rest (`"pushUps"` →
/// `"Pushups"`), matching how exercise names appear in chart titles.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_thousands() {
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-1234.5, 1), "-1,234.5");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero_drops_sign() {
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn test_format_number_rounds() {
        assert_eq!(format_number(12.345, 1), "12.3");
        assert_eq!(format_number(13.333333, 2), "13.33");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(1500), "1,500");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some(4.26), 1), "4.3");
        assert_eq!(format_optional(None, 1), "-");
    }

    #[test]
    fn test_format_rate_goal_reached_is_zero() {
        assert_eq!(format_rate(&DailyRate::Required(0.0)), "0.00 per day");
    }

    #[test]
    fn test_percentage() {
        assert!((percentage(40.0, 100.0) - 40.0).abs() < 1e-9);
        assert_eq!(percentage(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_format_day_month_year() {
        let d = NaiveDate::from_ymd_opt(2024, 11, 7).unwrap();
        assert_eq!(format_day_month_year(d), "7/11/2024");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("pushups"), "Pushups");
        assert_eq!(capitalize("pUSH UPS"), "Push ups");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
