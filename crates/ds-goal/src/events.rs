// events.rs — Store events and observer dispatch.
//
// The goal store emits an event after every mutation. Observers (a view that
// needs to re-render, an activity log, tests) subscribe to these events
// instead of the store knowing anything about how it is displayed.
//
// Dispatch is synchronous and happens after the mutation (and its
// persistence attempt) has finished. Observer failures are logged and never
// undo or block a mutation.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GoalError;

/// Events emitted by the goal store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GoalEvent {
    /// A new goal was added to the collection.
    GoalAdded {
        goal_id: Uuid,
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// A goal and its photos were deleted.
    GoalRemoved {
        goal_id: Uuid,
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// A goal was completed for the day, or unchecked.
    GoalToggled {
        goal_id: Uuid,
        day: NaiveDate,
        completed: bool,
        streak: u32,
        timestamp: DateTime<Utc>,
    },

    /// A progress photo was appended to a goal.
    PhotoAttached {
        goal_id: Uuid,
        photo_id: Uuid,
        bytes: usize,
        timestamp: DateTime<Utc>,
    },

    /// The collection changed in memory but could not be written durably.
    PersistFailed {
        reason: String,
        quota_exceeded: bool,
        timestamp: DateTime<Utc>,
    },
}

impl GoalEvent {
    /// Get the event type name as a string.
    pub fn event_type(&self) -> &str {
        match self {
            GoalEvent::GoalAdded { .. } => "goal_added",
            GoalEvent::GoalRemoved { .. } => "goal_removed",
            GoalEvent::GoalToggled { .. } => "goal_toggled",
            GoalEvent::PhotoAttached { .. } => "photo_attached",
            GoalEvent::PersistFailed { .. } => "persist_failed",
        }
    }

    pub fn goal_added(goal_id: Uuid, title: &str) -> Self {
        GoalEvent::GoalAdded {
            goal_id,
            title: title.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn goal_removed(goal_id: Uuid, title: &str) -> Self {
        GoalEvent::GoalRemoved {
            goal_id,
            title: title.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn goal_toggled(goal_id: Uuid, day: NaiveDate, completed: bool, streak: u32) -> Self {
        GoalEvent::GoalToggled {
            goal_id,
            day,
            completed,
            streak,
            timestamp: Utc::now(),
        }
    }

    pub fn photo_attached(goal_id: Uuid, photo_id: Uuid, bytes: usize) -> Self {
        GoalEvent::PhotoAttached {
            goal_id,
            photo_id,
            bytes,
            timestamp: Utc::now(),
        }
    }

    pub fn persist_failed(error: &GoalError) -> Self {
        GoalEvent::PersistFailed {
            reason: error.to_string(),
            quota_exceeded: error.is_quota_exceeded(),
            timestamp: Utc::now(),
        }
    }
}

/// Trait for receiving store events.
pub trait StoreObserver: Send {
    /// Handle an event. Errors are logged but don't stop the store.
    fn notify(&self, event: &GoalEvent) -> Result<(), GoalError>;
}

/// Logs every event through `tracing`.
#[derive(Debug, Default)]
pub struct LogObserver;

impl StoreObserver for LogObserver {
    fn notify(&self, event: &GoalEvent) -> Result<(), GoalError> {
        tracing::info!(event_type = event.event_type(), "{:?}", event);
        Ok(())
    }
}

/// Appends events as JSONL to an activity log file.
pub struct JsonlObserver {
    path: PathBuf,
}

impl JsonlObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl StoreObserver for JsonlObserver {
    fn notify(&self, event: &GoalEvent) -> Result<(), GoalError> {
        let io_err = |e: std::io::Error| {
            GoalError::ObserverError(format!("{}: {}", self.path.display(), e))
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;

        let json = serde_json::to_string(event)?;
        writeln!(file, "{}", json).map_err(io_err)?;
        Ok(())
    }
}

/// Dispatches events to every registered observer.
///
/// Errors from individual observers are logged (via tracing) but don't
/// prevent other observers from receiving the event.
#[derive(Default)]
pub struct EventDispatcher {
    observers: Vec<Box<dyn StoreObserver>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn dispatch(&self, event: &GoalEvent) {
        for observer in &self.observers {
            if let Err(e) = observer.notify(event) {
                tracing::warn!("store observer error: {}", e);
            }
        }
    }
}
