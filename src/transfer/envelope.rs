use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::schedule::{from_input, ScheduleDocument};

pub const ENVELOPE_TYPE: &str = "schedule";
pub const ENVELOPE_VERSION: &str = "1.0";

/// Versioned wrapper used to move a schedule between blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub timestamp: String,
    pub data: ScheduleDocument,
}

impl ExportEnvelope {
    pub fn new(data: ScheduleDocument, at: DateTime<Utc>) -> Self {
        ExportEnvelope {
            kind: ENVELOPE_TYPE.to_string(),
            version: ENVELOPE_VERSION.to_string(),
            timestamp: iso_timestamp(at),
            data,
        }
    }

    /// JSON text with 2-space indentation
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Wraps a snapshot of `document` stamped with the current time
pub fn export_envelope(document: &ScheduleDocument) -> ExportEnvelope {
    ExportEnvelope::new(document.clone(), Utc::now())
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2024-05-01T09:30:00.000Z`
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `schedule-<unix-millis>.json`
pub fn download_filename(at: DateTime<Utc>) -> String {
    format!("schedule-{}.json", at.timestamp_millis())
}

/// Extracts the document from an import payload
///
/// Anything but `"type": "schedule"` is rejected. The payload's `data` may be
/// in the legacy single-day shape and is migrated.
pub fn import_envelope(raw: &Value) -> Result<ScheduleDocument> {
    match raw.get("type").and_then(Value::as_str) {
        Some(ENVELOPE_TYPE) => {}
        Some(other) => {
            return Err(Error::InvalidEnvelope(format!("expected type \"{}\", found \"{}\"", ENVELOPE_TYPE, other)))
        }
        None => return Err(Error::InvalidEnvelope("missing type".to_string())),
    }

    if let Some(version) = raw.get("version").and_then(Value::as_str) {
        if version != ENVELOPE_VERSION {
            warn!(version, "importing schedule envelope with unexpected version");
        }
    }

    Ok(from_input(raw.get("data").unwrap_or(&Value::Null)))
}

/// Parses import text and extracts its document
pub fn parse_import(text: &str) -> Result<ScheduleDocument> {
    let raw: Value = serde_json::from_str(text)?;
    import_envelope(&raw)
}
