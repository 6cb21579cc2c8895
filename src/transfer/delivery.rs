//! Getting schedules in and out of the block.
//!
//! Export shows the envelope text, copies it to the clipboard and saves it as
//! a file. Each of those is attempted on its own, so one failing never blocks
//! another. Import waits a bounded time for the user to pick a file.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::envelope::{download_filename, export_envelope, ExportEnvelope};
use crate::error::Result;
use crate::host::{Notification, Notifier};
use crate::schedule::ScheduleDocument;

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Saves an exported file where the user can reach it
pub trait DownloadSink {
    fn save(&self, filename: &str, contents: &str) -> Result<PathBuf>;
}

/// Asks the user for an import file
#[async_trait]
pub trait FilePicker: Send + Sync {
    /// Text of the chosen file, or `None` when nothing was chosen
    async fn pick_file(&self) -> Result<Option<String>>;
}

/// Writes downloads into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySink { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, filename: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.join(filename);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// Clipboard unavailable; this byte range of the text is selected instead
    ManualSelection { start: usize, end: usize },
}

/// The export surface: envelope text ready to copy or download
#[derive(Debug, Clone)]
pub struct ExportDialog {
    envelope: ExportEnvelope,
    text: String,
}

impl ExportDialog {
    pub fn open(document: &ScheduleDocument) -> Result<Self> {
        Self::from_envelope(export_envelope(document))
    }

    pub fn from_envelope(envelope: ExportEnvelope) -> Result<Self> {
        let text = envelope.to_pretty_json()?;
        Ok(ExportDialog { envelope, text })
    }

    pub fn envelope(&self) -> &ExportEnvelope {
        &self.envelope
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub async fn copy(&self, clipboard: &dyn Clipboard, notifier: &dyn Notifier) -> CopyOutcome {
        match clipboard.write_text(&self.text).await {
            Ok(()) => {
                notifier.notify(Notification::success("Copied to clipboard!"));
                CopyOutcome::Copied
            }
            Err(e) => {
                debug!("clipboard write failed, selecting text instead: {}", e);
                notifier.notify(Notification::info("Selected for copying (Ctrl+C)"));
                CopyOutcome::ManualSelection { start: 0, end: self.text.len() }
            }
        }
    }

    /// Saves the text as `schedule-<unix-millis>.json`; returns the path
    pub fn download(&self, sink: &dyn DownloadSink, notifier: &dyn Notifier, at: DateTime<Utc>) -> Result<PathBuf> {
        let filename = download_filename(at);
        match sink.save(&filename, &self.text) {
            Ok(path) => {
                info!(path = %path.display(), "schedule exported");
                notifier.notify(Notification::success("Schedule downloaded!"));
                Ok(path)
            }
            Err(e) => {
                warn!("schedule download failed: {}", e);
                notifier.notify(Notification::error("Export failed. Please try again."));
                Err(e)
            }
        }
    }
}

/// Result of waiting for an import file
#[derive(Debug, Clone, PartialEq)]
pub enum Acquired {
    File(Value),
    /// Nothing chosen, or the wait ran out
    Cancelled,
}

/// Prompts for a file and parses it as JSON, giving up after `wait`
pub async fn acquire_import(picker: &dyn FilePicker, wait: Duration) -> Result<Acquired> {
    match tokio::time::timeout(wait, picker.pick_file()).await {
        Err(_) => {
            debug!(?wait, "import cancelled: no file chosen in time");
            Ok(Acquired::Cancelled)
        }
        Ok(Ok(None)) => Ok(Acquired::Cancelled),
        Ok(Ok(Some(text))) => Ok(Acquired::File(serde_json::from_str(&text)?)),
        Ok(Err(e)) => Err(e),
    }
}
