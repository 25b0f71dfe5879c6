// scheduler.rs — Once-per-day reminder about an incomplete goal.
//
// Reminders are evaluated once, at startup, after the goal store has
// loaded. The decision itself is a pure function of the goals, today's
// calendar day, and the day the last reminder fired. The scheduler wraps it
// with the storage port: it reads the marker, delivers the reminder to the
// configured sinks, and records today as the marker.
//
// If every goal is already done, nothing fires and the marker is left
// alone, so a later startup on the same day gets another look.

use std::sync::Arc;

use chrono::NaiveDate;
use ds_goal::Goal;
use ds_storage::{KeyValueStore, LAST_NOTIFIED_KEY};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sink::ReminderSink;

/// A reminder about one goal that is still incomplete today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub goal_id: Uuid,
    pub goal_title: String,
    pub message: String,
    /// The calendar day the reminder is for.
    pub day: NaiveDate,
}

impl Reminder {
    fn for_goal(goal: &Goal, day: NaiveDate) -> Self {
        Self {
            goal_id: goal.id,
            goal_title: goal.title.clone(),
            message: format!("Don't forget to complete \"{}\" today!", goal.title),
            day,
        }
    }
}

/// Decide whether a reminder is due.
///
/// Returns `None` if one already fired `today`, or if every goal is
/// complete. Otherwise picks the first incomplete goal in collection order.
pub fn check_and_notify(
    goals: &[Goal],
    today: NaiveDate,
    last_notified_day: Option<NaiveDate>,
) -> Option<Reminder> {
    if last_notified_day == Some(today) {
        return None;
    }
    goals
        .iter()
        .find(|g| !g.is_completed_on(today))
        .map(|g| Reminder::for_goal(g, today))
}

/// Binds [`check_and_notify`] to the persisted last-notified marker and a
/// set of delivery sinks.
pub struct NotificationScheduler {
    storage: Arc<dyn KeyValueStore>,
    sinks: Vec<Box<dyn ReminderSink>>,
}

impl NotificationScheduler {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            sinks: Vec::new(),
        }
    }

    /// Add a delivery sink.
    pub fn add_sink(&mut self, sink: Box<dyn ReminderSink>) {
        self.sinks.push(sink);
    }

    pub fn with_sink(mut self, sink: Box<dyn ReminderSink>) -> Self {
        self.add_sink(sink);
        self
    }

    /// The day the last reminder fired on, if it can be read.
    ///
    /// A missing, unreadable, or malformed marker counts as "never".
    pub fn last_notified_day(&self) -> Option<NaiveDate> {
        let raw = match self.storage.get(LAST_NOTIFIED_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("could not read last-notified marker: {}", e);
                return None;
            }
        };
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(day) => Some(day),
            Err(e) => {
                tracing::warn!(marker = %raw, "ignoring malformed last-notified marker: {}", e);
                None
            }
        }
    }

    /// Run the daily check: fire at most one reminder per calendar day.
    ///
    /// Returns the reminder that fired, if any. Sink and marker-write
    /// failures are logged; the reminder still counts as fired.
    pub fn run(&self, goals: &[Goal], today: NaiveDate) -> Option<Reminder> {
        let reminder = check_and_notify(goals, today, self.last_notified_day())?;

        tracing::info!(goal_id = %reminder.goal_id, title = %reminder.goal_title, "reminder due");
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(&reminder) {
                tracing::warn!("reminder sink error: {}", e);
            }
        }

        let marker = today.format("%Y-%m-%d").to_string();
        if let Err(e) = self.storage.set(LAST_NOTIFIED_KEY, &marker) {
            tracing::warn!("could not record last-notified day: {}", e);
        }

        Some(reminder)
    }
}
