//! The persisted CMS field value.
//!
//! The field stores the block editor's output document,
//! `{"blocks": [{"id"?, "type", "data"}]}`. Schedule blocks are loaded into
//! editors; blocks of any other type pass through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{BlockContainer, Notifier};
use crate::config::ScheduleBlockConfig;
use crate::editor::ScheduleEditor;
use crate::error::{Error, Result};
use crate::schedule::{from_input, ScheduleDocument};
use crate::transfer::duplicate_snapshot;

pub const SCHEDULE_BLOCK_TYPE: &str = "schedule";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

/// Block editor output; `time` and `version` are dropped on read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputData {
    #[serde(default)]
    pub blocks: Vec<OutputBlock>,
}

#[derive(Debug, Clone)]
enum Slot {
    Schedule { id: Option<String>, editor: ScheduleEditor },
    Other(OutputBlock),
}

/// How an external field-value change was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldChange {
    /// Same as the value we last saved
    Unchanged,
    Cleared,
    Rendered,
    /// Not valid JSON; state kept
    Ignored,
}

/// All blocks of one field, plus the bookkeeping for the host channel
#[derive(Debug, Clone)]
pub struct FieldComposer {
    slots: Vec<Slot>,
    config: ScheduleBlockConfig,
    saved_value: Option<String>,
    current_block: usize,
}

impl FieldComposer {
    pub fn new(config: ScheduleBlockConfig) -> Self {
        FieldComposer {
            slots: Vec::new(),
            config,
            saved_value: None,
            current_block: 0,
        }
    }

    /// Initial load of the field value
    pub fn load(&mut self, field_value: &str) -> FieldChange {
        self.apply_value(field_value)
    }

    /// Handles a field-value change made outside the composer
    pub fn on_field_value_changed(&mut self, field_value: &str) -> FieldChange {
        if self.saved_value.as_deref() == Some(field_value) {
            return FieldChange::Unchanged;
        }
        self.apply_value(field_value)
    }

    fn apply_value(&mut self, field_value: &str) -> FieldChange {
        if field_value.trim().is_empty() {
            self.clear();
            return FieldChange::Cleared;
        }

        let output: OutputData = match serde_json::from_str(field_value) {
            Ok(output) => output,
            Err(e) => {
                warn!("Error parsing JSON for Workshop Schedule Composer: {}", e);
                return FieldChange::Ignored;
            }
        };

        if output.blocks.is_empty() {
            self.clear();
            return FieldChange::Cleared;
        }

        let slots: Vec<Slot> = output.blocks.into_iter().map(|block| self.slot_for(block)).collect();
        self.slots = slots;
        self.current_block = self.current_block.min(self.slots.len().saturating_sub(1));
        FieldChange::Rendered
    }

    fn slot_for(&self, block: OutputBlock) -> Slot {
        if block.kind == SCHEDULE_BLOCK_TYPE {
            Slot::Schedule {
                editor: ScheduleEditor::new(&from_input(&block.data), self.config.clone()),
                id: block.id,
            }
        } else {
            Slot::Other(block)
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.current_block = 0;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Serializes every block into the output document
    pub fn output(&self) -> OutputData {
        let blocks = self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Schedule { id, editor } => OutputBlock {
                    id: id.clone(),
                    kind: SCHEDULE_BLOCK_TYPE.to_string(),
                    data: serde_json::to_value(editor.serialize()).unwrap_or(Value::Null),
                },
                Slot::Other(block) => block.clone(),
            })
            .collect();
        OutputData { blocks }
    }

    /// Produces the JSON to hand to the host as the new field value
    ///
    /// Returns `None` when nothing changed since the last save.
    pub fn save(&mut self) -> Result<Option<String>> {
        let value = serde_json::to_string(&self.output())?;
        if self.saved_value.as_deref() == Some(value.as_str()) {
            return Ok(None);
        }
        debug!(blocks = self.slots.len(), "field value changed");
        self.saved_value = Some(value.clone());
        Ok(Some(value))
    }

    pub fn saved_value(&self) -> Option<&str> {
        self.saved_value.as_deref()
    }

    /// Appends a schedule block; returns its index
    pub fn add_schedule_block(&mut self, document: &ScheduleDocument) -> Result<usize> {
        self.ensure_editable()?;
        self.slots.push(Slot::Schedule {
            id: None,
            editor: ScheduleEditor::new(document, self.config.clone()),
        });
        self.current_block = self.slots.len() - 1;
        Ok(self.current_block)
    }

    pub fn editor(&self, index: usize) -> Result<&ScheduleEditor> {
        match self.slots.get(index) {
            Some(Slot::Schedule { editor, .. }) => Ok(editor),
            _ => Err(Error::UnknownBlock(index)),
        }
    }

    /// Editor of the schedule block at `index`; it becomes the current block
    pub fn editor_mut(&mut self, index: usize) -> Result<&mut ScheduleEditor> {
        match self.slots.get_mut(index) {
            Some(Slot::Schedule { editor, .. }) => {
                self.current_block = index;
                Ok(editor)
            }
            _ => Err(Error::UnknownBlock(index)),
        }
    }

    /// Duplicates the schedule block at `index` right after itself
    pub fn duplicate_block(&mut self, index: usize, notifier: &dyn Notifier) -> Result<usize> {
        self.ensure_editable()?;
        let snapshot = self.editor(index)?.serialize();
        self.current_block = index;
        duplicate_snapshot(&snapshot, self, notifier)
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.config.read_only {
            Err(Error::ReadOnly)
        } else {
            Ok(())
        }
    }
}

impl BlockContainer for FieldComposer {
    fn current_block_index(&self) -> usize {
        self.current_block
    }

    fn insert_block(&mut self, kind: &str, data: Value, _config: Option<Value>, index: usize) -> Result<()> {
        self.ensure_editable()?;
        if index > self.slots.len() {
            return Err(Error::Host(format!(
                "cannot insert at {} in a field of {} blocks",
                index,
                self.slots.len()
            )));
        }
        let slot = self.slot_for(OutputBlock { id: None, kind: kind.to_string(), data });
        self.slots.insert(index, slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NotificationLog;
    use serde_json::json;

    fn field_value() -> String {
        json!({
            "time": 1714555800000u64,
            "version": "2.29.0",
            "blocks": [
                {"id": "h1", "type": "header", "data": {"text": "Agenda", "level": 2}},
                {"id": "s1", "type": "schedule", "data": {"0": {"description": "Day", "items": [
                    {"id": "a", "timeType": "specific", "time": "09:00", "title": "Doors", "description": ""}
                ]}}}
            ]
        })
        .to_string()
    }

    #[test]
    fn save_strips_time_and_version() {
        let mut composer = FieldComposer::new(ScheduleBlockConfig::default());
        assert_eq!(composer.load(&field_value()), FieldChange::Rendered);
        let saved: Value = serde_json::from_str(&composer.save().unwrap().unwrap()).unwrap();
        assert!(saved.get("time").is_none());
        assert!(saved.get("version").is_none());
        assert_eq!(saved["blocks"][0]["data"]["text"], "Agenda");
        assert_eq!(saved["blocks"][1]["id"], "s1");
        assert_eq!(saved["blocks"][1]["data"]["0"]["items"][0]["title"], "Doors");
    }

    #[test]
    fn echo_of_saved_value_is_ignored() {
        let mut composer = FieldComposer::new(ScheduleBlockConfig::default());
        composer.load(&field_value());
        let saved = composer.save().unwrap().unwrap();
        assert_eq!(composer.save().unwrap(), None);

        composer.editor_mut(1).unwrap().add_day().unwrap();
        assert_eq!(composer.on_field_value_changed(&saved), FieldChange::Unchanged);
        assert_eq!(composer.editor(1).unwrap().days().len(), 2);
    }

    #[test]
    fn empty_value_clears_and_invalid_json_is_ignored() {
        let mut composer = FieldComposer::new(ScheduleBlockConfig::default());
        composer.load(&field_value());
        assert_eq!(composer.on_field_value_changed("{broken"), FieldChange::Ignored);
        assert_eq!(composer.len(), 2);

        assert_eq!(composer.on_field_value_changed(r#"{"blocks": []}"#), FieldChange::Cleared);
        assert!(composer.is_empty());
        composer.load(&field_value());
        assert_eq!(composer.on_field_value_changed(""), FieldChange::Cleared);
        assert!(composer.is_empty());
    }

    #[test]
    fn external_change_rerenders() {
        let mut composer = FieldComposer::new(ScheduleBlockConfig::default());
        composer.load(&field_value());
        let changed = json!({"blocks": [{"type": "schedule", "data": {"title": "Legacy", "items": []}}]}).to_string();
        assert_eq!(composer.on_field_value_changed(&changed), FieldChange::Rendered);
        assert_eq!(composer.len(), 1);
        assert_eq!(composer.editor(0).unwrap().days()[0].description, "Legacy");
    }

    #[test]
    fn duplicate_lands_after_the_source_block() {
        let log = NotificationLog::new();
        let mut composer = FieldComposer::new(ScheduleBlockConfig::default());
        composer.load(&field_value());
        composer.add_schedule_block(&ScheduleDocument::default()).unwrap();

        let index = composer.duplicate_block(1, &log).unwrap();
        assert_eq!(index, 2);
        assert_eq!(composer.len(), 4);
        let copy = composer.editor(2).unwrap();
        assert_eq!(copy.item("a").unwrap().title, "Doors");
        assert!(matches!(composer.editor(0), Err(Error::UnknownBlock(0))));
    }

    #[test]
    fn read_only_field_refuses_block_changes() {
        let log = NotificationLog::new();
        let config = ScheduleBlockConfig { read_only: true, ..ScheduleBlockConfig::default() };
        let mut composer = FieldComposer::new(config);
        composer.load(&field_value());
        let before = composer.len();

        assert!(matches!(composer.add_schedule_block(&ScheduleDocument::default()), Err(Error::ReadOnly)));
        assert!(matches!(composer.duplicate_block(1, &log), Err(Error::ReadOnly)));
        assert!(matches!(composer.insert_block("schedule", json!({}), None, 0), Err(Error::ReadOnly)));
        assert_eq!(composer.len(), before);
        assert!(log.take().is_empty());
    }

    #[test]
    fn insert_past_the_end_is_a_host_error() {
        let mut composer = FieldComposer::new(ScheduleBlockConfig::default());
        composer.load(&field_value());
        let len = composer.len();

        let err = composer.insert_block("paragraph", json!({"text": "x"}), None, len + 1).unwrap_err();
        assert!(matches!(err, Error::Host(_)));
        composer.insert_block("paragraph", json!({"text": "x"}), None, len).unwrap();
        assert_eq!(composer.len(), len + 1);
    }
}
