// calendar.rs — Host-local calendar days.
//
// The streak engine and the reminder scheduler take `today` / `yesterday`
// as parameters; this is the one place that reads the wall clock to produce
// them.

use chrono::{Local, NaiveDate};

/// Today's date in the host's local timezone.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// The calendar day before `day`.
///
/// Saturates at `NaiveDate::MIN`, which no real goal will ever reach.
pub fn yesterday_of(day: NaiveDate) -> NaiveDate {
    day.pred_opt().unwrap_or(NaiveDate::MIN)
}

/// `(today, yesterday)` for the host's local calendar.
pub fn local_days() -> (NaiveDate, NaiveDate) {
    let today = today_local();
    (today, yesterday_of(today))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yesterday_crosses_month_and_year_boundaries() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(yesterday_of(d), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(yesterday_of(d), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn local_days_are_adjacent() {
        let (today, yesterday) = local_days();
        assert_eq!(yesterday_of(today), yesterday);
    }
}
