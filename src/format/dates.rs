//! Timezone- and locale-aware date rendering and parsing.
//!
//! All timestamps are stored in UTC; users enter and see them in the single
//! configured timezone. This module is the only place the two meet, so a
//! conversion bug here is a correctness bug, not cosmetic.

use chrono::{DateTime, Duration, Locale, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Render a UTC timestamp in the given timezone, format, and locale.
pub fn format_in_tz(dt: DateTime<Utc>, tz: Tz, fmt: &str, locale: Locale) -> String {
    dt.with_timezone(&tz).format_localized(fmt, locale).to_string()
}

/// Parse a user-entered date-time in the given timezone back to UTC.
///
/// Returns `None` on malformed input or on local times that do not exist in
/// the timezone (spring-forward gaps). Ambiguous times resolve to the
/// earlier instant.
pub fn parse_in_tz(text: &str, fmt: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), fmt).ok()?;
    tz.from_local_datetime(&naive).earliest().map(|dt| dt.with_timezone(&Utc))
}

/// Parse a user-entered date without a time component.
pub fn parse_date_only(text: &str, fmt: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), fmt).ok()
}

/// The current civil date in the given timezone.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// UTC bounds of a civil day in the given timezone, inclusive on both ends.
///
/// An event overlaps the day iff `date <= end && end_date >= start`.
pub fn day_bounds(day: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = tz
        .from_local_datetime(&day.and_hms_opt(0, 0, 0).expect("midnight is always valid"))
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&day.and_hms_opt(0, 0, 0).expect("midnight is always valid")))
        .with_timezone(&Utc);

    let end = start + Duration::days(1) - Duration::seconds(1);

    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FMT: &str = "%d.%m.%Y %H:%M";

    #[test]
    fn render_and_parse_round_trip() {
        let tz = chrono_tz::Europe::Berlin;
        let original = Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap();

        let rendered = format_in_tz(original, tz, FMT, Locale::de_DE);
        assert_eq!(rendered, "01.06.2025 19:00");

        let parsed = parse_in_tz(&rendered, FMT, tz).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn rejects_malformed_input() {
        let tz = chrono_tz::Europe::Berlin;
        assert!(parse_in_tz("tomorrow at eight", FMT, tz).is_none());
        assert!(parse_in_tz("32.13.2025 99:99", FMT, tz).is_none());
    }

    #[test]
    fn day_bounds_cover_the_civil_day() {
        let tz = chrono_tz::Europe::Berlin;
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let (start, end) = day_bounds(day, tz);

        // Berlin is UTC+2 in June.
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 5, 31, 22, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 6, 1, 21, 59, 59).unwrap());
    }
}
