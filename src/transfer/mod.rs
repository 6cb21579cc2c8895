pub mod envelope;
pub mod delivery;
pub mod duplicate;

use std::path::Path;

use serde_json::Value;

use crate::error::Result;
use crate::schedule::{from_input, ScheduleDocument};

pub use envelope::{
    download_filename, export_envelope, import_envelope, parse_import, ExportEnvelope, ENVELOPE_TYPE,
    ENVELOPE_VERSION,
};
pub use delivery::{acquire_import, Acquired, Clipboard, CopyOutcome, DirectorySink, DownloadSink, ExportDialog, FilePicker};
pub use duplicate::duplicate_snapshot;

/// Loads a schedule from a JSON file
///
/// The file may hold an export envelope or bare block data in either the
/// current or the legacy shape.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<ScheduleDocument> {
    let text = std::fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&text)?;
    if raw.get("type").is_some() {
        import_envelope(&raw)
    } else {
        Ok(from_input(&raw))
    }
}
