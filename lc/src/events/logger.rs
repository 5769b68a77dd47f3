//! Event Logger - persists loading events to a JSONL file
//!
//! The logger subscribes to a store's event bus and appends every event as
//! one JSON line, so a session can be inspected or replayed afterwards.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use super::types::{EventLogEntry, LoadingEvent};

/// Appends events to a JSONL file
pub struct EventLogger {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl EventLogger {
    /// Open (or create) the log file for appending
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!(?path, "EventLogger::open: called");

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create event log directory")?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context(format!("Failed to open event log {}", path.display()))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one event as a JSON line
    pub fn write_event(&mut self, event: &LoadingEvent) -> Result<()> {
        debug!(event_type = event.event_type(), "EventLogger::write_event");
        let entry = EventLogEntry::new(event.clone());
        let json = serde_json::to_string(&entry)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Consume events until the bus closes
    ///
    /// Meant to be spawned as a background task.
    pub async fn run(mut self, mut rx: broadcast::Receiver<LoadingEvent>) {
        debug!(path = ?self.path, "EventLogger::run: starting");

        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = self.write_event(&event) {
                        error!(error = %e, "EventLogger: failed to write event");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "EventLogger: lagged behind, missed events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("EventLogger: channel closed, shutting down");
                    break;
                }
            }
        }

        let _ = self.writer.flush();
    }
}

/// Read all entries from a JSONL event log
///
/// Malformed lines are skipped with a warning; a missing file yields no
/// entries.
pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<EventLogEntry>> {
    let path = path.as_ref();
    debug!(?path, "read_events: reading log file");

    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).context(format!("Failed to read event log {}", path.display()))?;
    let mut entries = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<EventLogEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(line, error = %e, "read_events: failed to parse line");
            }
        }
    }

    debug!(count = entries.len(), "read_events: loaded entries");
    Ok(entries)
}
