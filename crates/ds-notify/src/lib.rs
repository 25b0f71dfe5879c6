//! # ds-notify
//!
//! Once-per-day reminder scheduling for Daily Streak.
//!
//! On startup the host hands the loaded goals to the
//! [`NotificationScheduler`], which fires at most one [`Reminder`] per
//! calendar day about the first goal not yet completed today.
//!
//! ## Key components
//!
//! - [`check_and_notify`] — the pure decision
//! - [`NotificationScheduler`] — persisted last-notified marker + delivery
//! - [`ReminderSink`] — trait for delivering reminders
//! - [`LogSink`], [`JsonlSink`], [`TerminalSink`] — built-in sinks

pub mod error;
pub mod scheduler;
pub mod sink;

pub use error::NotifyError;
pub use scheduler::{check_and_notify, NotificationScheduler, Reminder};
pub use sink::{JsonlSink, LogSink, ReminderSink, TerminalSink};
