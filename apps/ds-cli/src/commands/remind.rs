// remind.rs — Startup reminder check and the `remind` subcommand.

use std::sync::Arc;

use ds_goal::Goal;
use ds_notify::{JsonlSink, LogSink, NotificationScheduler, Reminder, TerminalSink};
use ds_storage::KeyValueStore;

use crate::commands::goal::Today;
use crate::config::ReminderConfig;

/// Build a scheduler with the sinks the config asks for.
pub fn scheduler(storage: Arc<dyn KeyValueStore>, config: &ReminderConfig) -> NotificationScheduler {
    let mut scheduler = NotificationScheduler::new(storage).with_sink(Box::new(LogSink));
    if config.terminal {
        scheduler.add_sink(Box::new(TerminalSink::stdout()));
    }
    if let Some(path) = &config.log_file {
        scheduler.add_sink(Box::new(JsonlSink::new(path)));
    }
    scheduler
}

/// Run the once-a-day check and print the reminder that fired, if any.
pub fn check(
    storage: Arc<dyn KeyValueStore>,
    config: &ReminderConfig,
    goals: &[Goal],
    days: Today,
) -> Option<Reminder> {
    if !config.enabled {
        tracing::debug!("reminders disabled");
        return None;
    }
    let reminder = scheduler(storage, config).run(goals, days.today)?;
    println!("Reminder: {}", reminder.message);
    Some(reminder)
}

/// `streak status`: report when the last reminder fired.
pub fn status(storage: Arc<dyn KeyValueStore>, config: &ReminderConfig, days: Today) {
    let scheduler = scheduler(storage, config);
    match scheduler.last_notified_day() {
        Some(d) if d == days.today => println!("Already reminded today ({}).", d),
        Some(d) => println!("Last reminder: {}", d),
        None => println!("No reminder has fired yet."),
    }
    if !config.enabled {
        println!("Reminders are disabled in config.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono::NaiveDate;
    use ds_storage::{MemoryStore, LAST_NOTIFIED_KEY};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn days(today: &str) -> Today {
        let today = NaiveDate::parse_from_str(today, "%Y-%m-%d").unwrap();
        Today {
            today,
            yesterday: today.pred_opt().unwrap(),
        }
    }

    #[test]
    fn fires_once_per_day_and_writes_history() {
        let dir = TempDir::new().unwrap();
        let log: PathBuf = dir.path().join("reminders.jsonl");
        let config = ReminderConfig {
            log_file: Some(log.clone()),
            ..ReminderConfig::default()
        };
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let goals = vec![Goal::new(Uuid::from_u128(1), "Read", "")];

        let first = check(storage.clone(), &config, &goals, days("2024-01-02")).unwrap();
        assert_eq!(first.goal_title, "Read");
        assert!(check(storage.clone(), &config, &goals, days("2024-01-02")).is_none());

        assert_eq!(
            storage.get(LAST_NOTIFIED_KEY).unwrap().as_deref(),
            Some("2024-01-02")
        );
        assert_eq!(std::fs::read_to_string(&log).unwrap().lines().count(), 1);
    }

    #[test]
    fn disabled_config_never_fires_or_marks() {
        let config = ReminderConfig {
            enabled: false,
            ..ReminderConfig::default()
        };
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let goals = vec![Goal::new(Uuid::from_u128(1), "Read", "")];

        assert!(check(storage.clone(), &config, &goals, days("2024-01-02")).is_none());
        assert!(storage.get(LAST_NOTIFIED_KEY).unwrap().is_none());
    }
}
