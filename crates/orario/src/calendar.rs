//! Calendar arithmetic and localized labels for the weekly grid.
//!
//! All dates are plain `NaiveDate`s: comparisons are done on calendar
//! components and never go through a zone-aware timestamp.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use std::str::FromStr;

use crate::types::SessionType;

/// Today's date in the local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Monday at or before `date` (ISO week start).
///
/// Only the first week of chrono's range has no Monday before it; there the
/// date itself is returned.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(i64::from(
        date.weekday().num_days_from_monday(),
    )))
    .unwrap_or(date)
}

/// The dates of the week starting at `start`.
///
/// Always seven, except in the last week of chrono's range, which is cut
/// off at `NaiveDate::MAX`.
pub fn week_days(start: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take(7).collect()
}

/// Shift `date` by a whole number of weeks, `None` past chrono's range
pub fn shift_weeks(date: NaiveDate, weeks: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::weeks(weeks))
}

/// Language used for weekday, month and session type names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    English,
    Italian,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::English),
            "it" | "italian" | "italiano" => Ok(Locale::Italian),
            other => Err(format!("unsupported locale: {other:?} (expected \"en\" or \"it\")")),
        }
    }
}

impl Locale {
    pub fn lang(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Italian => "it",
        }
    }

    pub fn weekday_name(self, weekday: Weekday) -> &'static str {
        const EN: [&str; 7] = [
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
        ];
        const IT: [&str; 7] = [
            "Lunedì",
            "Martedì",
            "Mercoledì",
            "Giovedì",
            "Venerdì",
            "Sabato",
            "Domenica",
        ];

        let idx = weekday.num_days_from_monday() as usize;
        match self {
            Locale::English => EN[idx],
            Locale::Italian => IT[idx],
        }
    }

    pub fn month_short(self, month: u32) -> &'static str {
        const EN: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        const IT: [&str; 12] = [
            "gen", "feb", "mar", "apr", "mag", "giu", "lug", "ago", "set", "ott", "nov", "dic",
        ];

        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Locale::English => EN[idx],
            Locale::Italian => IT[idx],
        }
    }

    pub fn session_type_label(self, session_type: SessionType) -> &'static str {
        match (self, session_type) {
            (Locale::English, SessionType::Individual) => "Individual",
            (Locale::English, SessionType::Group) => "Group",
            (Locale::Italian, SessionType::Individual) => "Individuale",
            (Locale::Italian, SessionType::Group) => "Di gruppo",
        }
    }

    /// `13 Mar 2024`
    pub fn format_date(self, date: NaiveDate) -> String {
        format!(
            "{} {} {}",
            date.day(),
            self.month_short(date.month()),
            date.year()
        )
    }

    /// Header label for the week starting at `start`, e.g. `11 – 17 Mar 2024`.
    ///
    /// Month and year are only repeated when the week crosses them.
    pub fn week_label(self, start: NaiveDate) -> String {
        let end = start
            .checked_add_signed(Duration::days(6))
            .unwrap_or(NaiveDate::MAX);
        if start.year() != end.year() {
            format!("{} – {}", self.format_date(start), self.format_date(end))
        } else if start.month() != end.month() {
            format!(
                "{} {} – {} {} {}",
                start.day(),
                self.month_short(start.month()),
                end.day(),
                self.month_short(end.month()),
                end.year()
            )
        } else {
            format!(
                "{} – {} {} {}",
                start.day(),
                end.day(),
                self.month_short(end.month()),
                end.year()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Every date from 2023-01-01 through 2025-12-31
    fn all_dates() -> impl Iterator<Item = NaiveDate> {
        date(2023, 1, 1).iter_days().take_while(|d| *d <= date(2025, 12, 31))
    }

    // ========== week_start tests ==========

    #[test]
    fn test_week_start_thursday() {
        assert_eq!(week_start(date(2024, 3, 14)), date(2024, 3, 11));
    }

    #[test]
    fn test_week_start_monday_is_itself() {
        assert_eq!(week_start(date(2024, 3, 11)), date(2024, 3, 11));
    }

    #[test]
    fn test_week_start_sunday_goes_back_six_days() {
        assert_eq!(week_start(date(2024, 3, 10)), date(2024, 3, 4));
        assert_eq!(week_start(date(2024, 3, 17)), date(2024, 3, 11));
    }

    #[test]
    fn test_week_start_across_month_boundary() {
        assert_eq!(week_start(date(2024, 3, 1)), date(2024, 2, 26));
    }

    #[test]
    fn test_week_start_across_year_boundary() {
        assert_eq!(week_start(date(2025, 1, 1)), date(2024, 12, 30));
        assert_eq!(week_start(date(2023, 1, 1)), date(2022, 12, 26));
    }

    #[test]
    fn test_week_start_is_monday_within_six_days() {
        for d in all_dates() {
            let start = week_start(d);
            assert_eq!(start.weekday(), Weekday::Mon, "{d}");
            let diff = (d - start).num_days();
            assert!((0..=6).contains(&diff), "{d}: {diff}");
        }
    }

    #[test]
    fn test_week_start_idempotent() {
        for d in all_dates() {
            assert_eq!(week_start(week_start(d)), week_start(d), "{d}");
        }
    }

    // ========== week_days / shift_weeks tests ==========

    #[test]
    fn test_week_days_monday_to_sunday() {
        let days = week_days(date(2024, 2, 26));

        assert_eq!(days[0], date(2024, 2, 26));
        assert_eq!(days[3], date(2024, 2, 29));
        assert_eq!(days[6], date(2024, 3, 3));
        assert_eq!(days[6].weekday(), Weekday::Sun);
    }

    #[test]
    fn test_shift_weeks() {
        assert_eq!(shift_weeks(date(2024, 3, 14), 1), Some(date(2024, 3, 21)));
        assert_eq!(shift_weeks(date(2024, 1, 3), -1), Some(date(2023, 12, 27)));
    }

    #[test]
    fn test_shift_weeks_past_range_is_none() {
        assert_eq!(shift_weeks(NaiveDate::MAX, 1), None);
        assert_eq!(shift_weeks(NaiveDate::MIN, -1), None);
    }

    #[test]
    fn test_week_days_cut_off_at_max_date() {
        let start = week_start(NaiveDate::MAX);
        let days = week_days(start);

        assert!(!days.is_empty() && days.len() <= 7);
        assert_eq!(days.last(), Some(&NaiveDate::MAX));
    }

    #[test]
    fn test_week_start_and_label_at_range_edges() {
        assert!(week_start(NaiveDate::MIN) <= NaiveDate::MIN);
        let label = Locale::English.week_label(week_start(NaiveDate::MAX));
        assert!(label.contains(" – "));
    }

    // ========== Locale tests ==========

    #[test]
    fn test_locale_from_str() {
        assert_eq!("en".parse::<Locale>(), Ok(Locale::English));
        assert_eq!("IT".parse::<Locale>(), Ok(Locale::Italian));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_weekday_names() {
        assert_eq!(Locale::English.weekday_name(Weekday::Mon), "Monday");
        assert_eq!(Locale::English.weekday_name(Weekday::Sun), "Sunday");
        assert_eq!(Locale::Italian.weekday_name(Weekday::Wed), "Mercoledì");
    }

    #[test]
    fn test_week_label_same_month() {
        assert_eq!(Locale::English.week_label(date(2024, 3, 11)), "11 – 17 Mar 2024");
    }

    #[test]
    fn test_week_label_cross_month() {
        assert_eq!(
            Locale::English.week_label(date(2024, 2, 26)),
            "26 Feb – 3 Mar 2024"
        );
    }

    #[test]
    fn test_week_label_cross_year() {
        assert_eq!(
            Locale::Italian.week_label(date(2024, 12, 30)),
            "30 dic 2024 – 5 gen 2025"
        );
    }
}
