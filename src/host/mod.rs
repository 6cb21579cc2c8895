//! Collaborators provided by the host application.

pub mod field;

use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::Result;

pub use field::{FieldChange, FieldComposer, OutputBlock, OutputData, SCHEDULE_BLOCK_TYPE};

/// The block editor that contains this block
pub trait BlockContainer {
    /// Position of the block the user is working in
    fn current_block_index(&self) -> usize;

    /// Inserts a block of `kind` preloaded with `data` at `index`
    fn insert_block(&mut self, kind: &str, data: Value, config: Option<Value>, index: usize) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

/// A transient, dismissible message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification { message: message.into(), level: NotificationLevel::Success }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification { message: message.into(), level: NotificationLevel::Error }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Notification { message: message.into(), level: NotificationLevel::Info }
    }
}

/// Shows notifications to the user
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Sends notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => warn!("{}", notification.message),
            _ => info!("{}", notification.message),
        }
    }
}

/// Collects notifications so they can be handed back to a client
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        match self.entries.lock() {
            Ok(mut entries) => std::mem::take(&mut *entries),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
