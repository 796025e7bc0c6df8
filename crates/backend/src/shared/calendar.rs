use chrono::{Datelike, NaiveDate, Weekday};
use contracts::shared::kpi::MonthProgress;
use std::collections::HashSet;

/// Enumerated non-business dates injected into the month-progress weighting.
///
/// The set is a finite, year-specific enumeration. Dates outside the
/// enumerated year simply miss the lookup and fall back to the
/// weekday/Saturday rule — a known staleness limitation, not an error.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    dates: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Brazilian national holidays for 2025
    pub fn brazil_2025() -> Self {
        let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid holiday date");
        Self::new([
            ymd(2025, 1, 1),   // Confraternização Universal
            ymd(2025, 3, 3),   // Carnaval
            ymd(2025, 3, 4),   // Carnaval
            ymd(2025, 4, 18),  // Sexta-feira Santa
            ymd(2025, 4, 21),  // Tiradentes
            ymd(2025, 5, 1),   // Dia do Trabalho
            ymd(2025, 6, 19),  // Corpus Christi
            ymd(2025, 9, 7),   // Independência
            ymd(2025, 10, 12), // Nossa Senhora Aparecida
            ymd(2025, 11, 2),  // Finados
            ymd(2025, 11, 15), // Proclamação da República
            ymd(2025, 11, 20), // Consciência Negra
            ymd(2025, 12, 25), // Natal
        ])
    }
}

/// Expected sales weight of one calendar day.
///
/// Single authoritative rule for the whole application: gyms are closed on
/// Sundays, and Saturdays and holidays run at roughly half volume.
fn day_weight(date: NaiveDate, holidays: &HolidayCalendar) -> f64 {
    match date.weekday() {
        Weekday::Sun => 0.0,
        Weekday::Sat => 0.5,
        _ if holidays.contains(date) => 0.5,
        _ => 1.0,
    }
}

/// Compute the weighted month progress for a reference date.
///
/// Days 1..=day-of-month accumulate into `effective_past`, the rest of the
/// month into `effective_remaining`.
pub fn compute_month_progress(
    reference_date: NaiveDate,
    holidays: &HolidayCalendar,
) -> MonthProgress {
    let year = reference_date.year();
    let month = reference_date.month();
    let total_days = days_in_month(year, month);
    let elapsed_days = reference_date.day();

    let mut effective_past = 0.0;
    let mut effective_remaining = 0.0;

    for day in 1..=total_days {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .expect("day within month bounds");
        let weight = day_weight(date, holidays);
        if day <= elapsed_days {
            effective_past += weight;
        } else {
            effective_remaining += weight;
        }
    }

    MonthProgress {
        total_days,
        elapsed_days,
        effective_past,
        effective_remaining,
    }
}

/// Number of days in a calendar month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_april_2024_full_month_weights() {
        // April 2024: 30 days, starts on a Monday. 21 weekdays, 4 Saturdays
        // (6, 13, 20, 27), 4 Sundays (7, 14, 21, 28), 1 extra Monday (29) and
        // Tuesday (30) -> 22 weekdays total.
        let progress = compute_month_progress(date(2024, 4, 30), &HolidayCalendar::empty());
        assert_eq!(progress.total_days, 30);
        assert_eq!(progress.elapsed_days, 30);
        assert_eq!(progress.effective_past, 22.0 + 4.0 * 0.5);
        assert_eq!(progress.effective_remaining, 0.0);
    }

    #[test]
    fn test_first_day_of_month() {
        // 2024-04-01 is a Monday: only day 1 weighted into the past.
        let progress = compute_month_progress(date(2024, 4, 1), &HolidayCalendar::empty());
        assert_eq!(progress.elapsed_days, 1);
        assert_eq!(progress.effective_past, 1.0);
        assert_eq!(progress.effective_total(), 24.0);
    }

    #[test]
    fn test_last_day_of_month_has_no_remaining() {
        let progress = compute_month_progress(date(2025, 2, 28), &HolidayCalendar::empty());
        assert_eq!(progress.total_days, 28);
        assert_eq!(progress.effective_remaining, 0.0);
    }

    #[test]
    fn test_sunday_counts_zero_saturday_half() {
        let holidays = HolidayCalendar::empty();
        // 2025-06-01 is a Sunday.
        let sunday_only = compute_month_progress(date(2025, 6, 1), &holidays);
        assert_eq!(sunday_only.effective_past, 0.0);
        // 2025-06-07 is a Saturday: Mon-Fri (2..=6) + 0.5.
        let first_week = compute_month_progress(date(2025, 6, 7), &holidays);
        assert_eq!(first_week.effective_past, 5.0 + 0.5);
    }

    #[test]
    fn test_weekday_holiday_counts_half() {
        let holidays = HolidayCalendar::brazil_2025();
        // 2025-05-01 (Dia do Trabalho) is a Thursday.
        let with = compute_month_progress(date(2025, 5, 2), &holidays);
        let without = compute_month_progress(date(2025, 5, 2), &HolidayCalendar::empty());
        assert_eq!(without.effective_past - with.effective_past, 0.5);
    }

    #[test]
    fn test_holiday_on_weekend_does_not_double_discount() {
        let holidays = HolidayCalendar::brazil_2025();
        // 2025-11-02 (Finados) is a Sunday: already weight 0.
        let with = compute_month_progress(date(2025, 11, 3), &holidays);
        let without = compute_month_progress(date(2025, 11, 3), &HolidayCalendar::empty());
        assert_eq!(with.effective_past, without.effective_past);
    }

    #[test]
    fn test_dates_outside_enumerated_year_fall_back_to_weekday_rule() {
        let holidays = HolidayCalendar::brazil_2025();
        // 2026-05-01 is a Friday and not in the 2025 set: full weight.
        let progress_2026 = compute_month_progress(date(2026, 5, 31), &holidays);
        let unweighted = compute_month_progress(date(2026, 5, 31), &HolidayCalendar::empty());
        assert_eq!(progress_2026.effective_past, unweighted.effective_past);
    }

    #[test]
    fn test_weight_sums_bounded_by_total_days() {
        let holidays = HolidayCalendar::brazil_2025();
        for month in 1..=12u32 {
            for day in [1u32, 10, days_in_month(2025, month)] {
                let progress = compute_month_progress(date(2025, month, day), &holidays);
                let total = progress.effective_total();
                assert!(total >= 0.0);
                assert!(total <= progress.total_days as f64);
                assert_eq!(
                    progress.elapsed_days + (progress.total_days - progress.elapsed_days),
                    progress.total_days
                );
            }
        }
    }

    #[test]
    fn test_days_in_month_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
    }
}
