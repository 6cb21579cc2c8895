//! Block-level actions: export, import and duplicate.

use serde_json::Value;
use tracing::{info, warn};

use super::ScheduleEditor;
use crate::error::Result;
use crate::host::{BlockContainer, Notification, Notifier};
use crate::transfer::{duplicate_snapshot, import_envelope, Acquired, ExportDialog};

/// What happened to an import attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported,
    Cancelled,
    /// Rejected; the editor is unchanged
    Failed,
}

impl ScheduleEditor {
    /// Opens the export surface for a snapshot of the current tree
    pub fn export(&self, notifier: &dyn Notifier) -> Option<ExportDialog> {
        match ExportDialog::open(&self.serialize()) {
            Ok(dialog) => Some(dialog),
            Err(e) => {
                warn!("export failed: {}", e);
                notifier.notify(Notification::error("Export failed. Please try again."));
                None
            }
        }
    }

    /// Replaces the whole tree with the document inside an import payload
    ///
    /// All or nothing: on any error the tree is left as it was.
    pub fn import_value(&mut self, raw: &Value, notifier: &dyn Notifier) -> Result<()> {
        let result = import_envelope(raw).and_then(|document| self.replace(&document));
        match &result {
            Ok(()) => {
                info!(days = self.days().len(), "schedule imported");
                notifier.notify(Notification::success("Schedule imported successfully!"));
            }
            Err(e) => {
                warn!("import failed: {}", e);
                notifier.notify(Notification::error("Import failed. Please check your data."));
            }
        }
        result
    }

    /// Applies the result of [`crate::transfer::acquire_import`]
    ///
    /// The file is awaited without holding the editor, so editing can go on
    /// while the picker is open; the replacement itself happens here in one
    /// step.
    pub fn finish_import(&mut self, acquired: Result<Acquired>, notifier: &dyn Notifier) -> ImportOutcome {
        match acquired {
            Ok(Acquired::Cancelled) => ImportOutcome::Cancelled,
            Ok(Acquired::File(raw)) => match self.import_value(&raw, notifier) {
                Ok(()) => ImportOutcome::Imported,
                Err(_) => ImportOutcome::Failed,
            },
            Err(e) => {
                warn!("import failed: {}", e);
                notifier.notify(Notification::error("Import failed. Please check your data."));
                ImportOutcome::Failed
            }
        }
    }

    /// Asks the host to insert a copy of this block right after it
    pub fn duplicate(&self, host: &mut dyn BlockContainer, notifier: &dyn Notifier) -> Result<usize> {
        self.ensure_editable()?;
        duplicate_snapshot(&self.serialize(), host, notifier)
    }
}
