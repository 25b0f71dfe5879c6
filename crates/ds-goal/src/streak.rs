// streak.rs — The streak engine: a pure toggle over calendar days.
//
// Each goal is in one of two states per day: completed today or not.
// Toggling flips between them, and the streak counter tracks an unbroken
// run of consecutive completed days:
//
//   completed today      → uncheck: clear the day, streak - 1 (floor 0)
//   completed yesterday  → continue: streak + 1, completed today
//   anything else        → restart: streak = 1, completed today
//
// `today` and `yesterday` are parameters rather than clock reads so the
// engine can be tested across arbitrary simulated dates.

use chrono::NaiveDate;

use crate::goal::Goal;

/// Apply one toggle to `goal` and return the updated goal.
///
/// Unchecking always costs one day of streak, even if the streak was built
/// over several earlier days.
pub fn toggle(goal: &Goal, today: NaiveDate, yesterday: NaiveDate) -> Goal {
    let mut next = goal.clone();
    if goal.last_completed_date == Some(today) {
        next.last_completed_date = None;
        next.streak = goal.streak.saturating_sub(1);
    } else {
        next.streak = if goal.last_completed_date == Some(yesterday) {
            goal.streak.saturating_add(1)
        } else {
            1
        };
        next.last_completed_date = Some(today);
    }
    next
}
