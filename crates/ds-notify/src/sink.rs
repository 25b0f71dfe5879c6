// sink.rs — Reminder delivery sinks.
//
// The scheduler decides *whether* to remind; sinks decide *how*. A host
// wires up whichever it wants: log lines, a JSONL history file, or a
// desktop notification raised through terminal escape codes.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::NotifyError;
use crate::scheduler::Reminder;

/// Trait for receiving reminders.
pub trait ReminderSink: Send {
    /// Deliver a reminder. Errors are logged but don't stop other sinks.
    fn deliver(&self, reminder: &Reminder) -> Result<(), NotifyError>;
}

/// Emits reminders as `tracing` events.
#[derive(Debug, Default)]
pub struct LogSink;

impl ReminderSink for LogSink {
    fn deliver(&self, reminder: &Reminder) -> Result<(), NotifyError> {
        tracing::info!(
            goal_id = %reminder.goal_id,
            day = %reminder.day,
            "{}",
            reminder.message
        );
        Ok(())
    }
}

/// Appends each reminder as one JSON line to a history file.
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ReminderSink for JsonlSink {
    fn deliver(&self, reminder: &Reminder) -> Result<(), NotifyError> {
        // Ensure parent directory exists.
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| NotifyError::IoError {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| NotifyError::IoError {
                path: self.path.clone(),
                source,
            })?;

        let json = serde_json::to_string(reminder)?;
        writeln!(file, "{}", json).map_err(|source| NotifyError::IoError {
            path: self.path.clone(),
            source,
        })?;

        Ok(())
    }
}

/// Raises a desktop notification via terminal escape codes.
///
/// Writes BEL, OSC 9 (iTerm2 and friends) and OSC 777 (VTE, Konsole), so
/// most terminal emulators surface something.
pub struct TerminalSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalSink {
    /// Write escape codes to stdout.
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl ReminderSink for TerminalSink {
    fn deliver(&self, reminder: &Reminder) -> Result<(), NotifyError> {
        let title = escape_osc("Daily Streak");
        let message = escape_osc(&reminder.message);
        let payload = format!(
            "\x07\x1b]9;{message}\x07\x1b]777;notify;{title};{message}\x07",
        );

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(payload.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| NotifyError::SinkError(format!("terminal notification failed: {}", e)))
    }
}

/// Strip characters that would terminate or corrupt an OSC sequence.
fn escape_osc(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == ';' { ',' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn reminder(title: &str) -> Reminder {
        Reminder {
            goal_id: Uuid::from_u128(1),
            goal_title: title.to_string(),
            message: format!("Don't forget to complete \"{}\" today!", title),
            day: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        }
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn jsonl_sink_appends_one_line_per_reminder() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history/reminders.jsonl");
        let sink = JsonlSink::new(&path);

        sink.deliver(&reminder("Read")).unwrap();
        sink.deliver(&reminder("Run")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let restored: Reminder = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(restored, reminder("Run"));
    }

    #[test]
    fn terminal_sink_writes_bell_and_osc_sequences() {
        let buf = SharedBuf::default();
        let sink = TerminalSink::new(Box::new(buf.clone()));
        sink.deliver(&reminder("Read; then\nsleep")).unwrap();

        let written = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(written.starts_with('\x07'));
        assert!(written.contains("\x1b]9;Don't forget to complete \"Read, thensleep\" today!\x07"));
        assert!(written.contains("\x1b]777;notify;Daily Streak;"));
    }

    #[test]
    fn escape_osc_strips_controls_and_separators() {
        assert_eq!(escape_osc("a;b\x1bc\x07d"), "a,bcd");
    }
}
