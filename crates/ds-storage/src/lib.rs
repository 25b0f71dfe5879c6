//! # ds-storage
//!
//! Durable key-value storage port for Daily Streak.
//!
//! The goal store and the reminder scheduler never touch files directly;
//! they read and write string values by key through [`KeyValueStore`].
//!
//! ## Key components
//!
//! - [`KeyValueStore`] — the get/set/remove port
//! - [`MemoryStore`] — in-memory fake with an optional quota
//! - [`FileStore`] — one file per key in a data directory
//! - [`StorageError`] — quota and I/O failures

pub mod error;
pub mod kv;

pub use error::StorageError;
pub use kv::{FileStore, KeyValueStore, MemoryStore, DEFAULT_MAX_VALUE_BYTES};

/// Key holding the JSON-encoded goal collection.
pub const GOALS_KEY: &str = "goals";

/// Key holding the calendar day the last reminder fired on.
pub const LAST_NOTIFIED_KEY: &str = "last_notified_day";
