//! Presentation snapshot of an editor.
//!
//! A toolkit-neutral description of what the block shows: which controls
//! exist, which are visible, and the current field values.

use serde::Serialize;

use super::view::{DayView, ItemView};
use super::ScheduleEditor;
use crate::config::ScheduleBlockConfig;
use crate::schedule::{Period, TimeType};

/// Block-level actions offered in editable mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockAction {
    Export,
    Import,
    Duplicate,
}

pub const BLOCK_ACTIONS: [BlockAction; 3] = [BlockAction::Export, BlockAction::Import, BlockAction::Duplicate];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedBlock {
    pub read_only: bool,
    pub add_day: bool,
    pub actions: Vec<BlockAction>,
    pub days: Vec<RenderedDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDay {
    pub index: usize,
    pub label: String,
    pub removable: bool,
    pub description: String,
    pub description_placeholder: String,
    pub items: Vec<RenderedItem>,
    pub add_item: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedItem {
    pub id: String,
    pub time_type: TimeType,
    /// Present only while the time input is visible
    pub time: Option<String>,
    /// Present only while the period dropdown is visible
    pub period: Option<Period>,
    pub time_placeholder: String,
    pub title: String,
    pub title_placeholder: String,
    pub description: String,
    pub description_placeholder: String,
    pub removable: bool,
}

impl ScheduleEditor {
    pub fn render(&self) -> RenderedBlock {
        let editable = !self.config.read_only;
        let removable_days = editable && self.days.len() > 1;
        RenderedBlock {
            read_only: !editable,
            add_day: editable,
            actions: if editable { BLOCK_ACTIONS.to_vec() } else { Vec::new() },
            days: self
                .days
                .iter()
                .map(|day| render_day(day, &self.config, removable_days, editable))
                .collect(),
        }
    }
}

fn render_day(day: &DayView, config: &ScheduleBlockConfig, removable: bool, editable: bool) -> RenderedDay {
    RenderedDay {
        index: day.index(),
        label: day.label(),
        removable,
        description: day.description.clone(),
        description_placeholder: config.title_placeholder.clone(),
        items: day.items.iter().map(|item| render_item(item, config, editable)).collect(),
        add_item: editable,
    }
}

fn render_item(item: &ItemView, config: &ScheduleBlockConfig, editable: bool) -> RenderedItem {
    RenderedItem {
        id: item.id().to_string(),
        time_type: item.time_type,
        time: item.time_input_visible().then(|| item.time_input.clone()),
        period: item.period_visible().then_some(item.period),
        time_placeholder: config.time_placeholder.clone(),
        title: item.title.clone(),
        title_placeholder: config.title_item_placeholder.clone(),
        description: item.description.clone(),
        description_placeholder: config.description_placeholder.clone(),
        removable: editable,
    }
}
