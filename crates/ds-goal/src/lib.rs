//! # ds-goal
//!
//! Goal model, streak engine, and persisted goal store for Daily Streak.
//!
//! A [`Goal`] is a daily habit with a streak counter and the calendar day
//! it was last completed. The streak engine is a pure function of the goal
//! and the injected `today` / `yesterday`; the store owns the collection
//! and writes it through the `ds-storage` port after every mutation.
//!
//! ## Key components
//!
//! - [`Goal`] / [`PhotoEntry`] — the persisted records
//! - [`streak::toggle`] — complete / uncheck for a calendar day
//! - [`GoalStore`] — add, remove, toggle, attach photo; persists every change
//! - [`SharedGoalStore`] — cloneable handle so a photo resize doesn't block edits
//! - [`GoalEvent`] / [`StoreObserver`] — change notifications for views and logs
//! - [`IdGenerator`] — pluggable goal/photo identifiers

pub mod calendar;
pub mod error;
pub mod events;
pub mod goal;
pub mod ids;
pub mod shared;
pub mod store;
pub mod streak;

pub use error::GoalError;
pub use events::{EventDispatcher, GoalEvent, JsonlObserver, LogObserver, StoreObserver};
pub use goal::{Goal, PhotoEntry};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use shared::SharedGoalStore;
pub use store::{load, GoalStore, Loaded};
