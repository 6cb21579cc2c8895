//! Live editing of a schedule block.
//!
//! `ScheduleEditor` owns the view-model tree for one block instance. While
//! editing, the tree is the source of truth; `serialize` reads the current
//! control values back into a [`ScheduleDocument`] whenever the host asks.

pub mod view;
pub mod render;
pub mod actions;

use serde::Deserialize;
use tracing::debug;

use crate::config::ScheduleBlockConfig;
use crate::error::{Error, Result};
use crate::sanitize::{sanitize, FieldKind};
use crate::schedule::{Period, ScheduleDocument, TimeType};

pub use render::{BlockAction, RenderedBlock, RenderedDay, RenderedItem};
pub use view::{DayView, ItemView};

/// Field that should receive focus after a structural edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    DayDescription(usize),
    ItemTitle(String),
}

/// Partial update of an item's controls
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub time_type: Option<TimeType>,
    pub time: Option<String>,
    pub period: Option<Period>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Partial update of a day
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DayPatch {
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScheduleEditor {
    days: Vec<DayView>,
    config: ScheduleBlockConfig,
    focus: Option<Focus>,
}

impl ScheduleEditor {
    /// Builds the view tree for `document`
    pub fn new(document: &ScheduleDocument, config: ScheduleBlockConfig) -> Self {
        ScheduleEditor {
            days: build_days(document),
            config,
            focus: None,
        }
    }

    pub fn days(&self) -> &[DayView] {
        &self.days
    }

    pub fn config(&self) -> &ScheduleBlockConfig {
        &self.config
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn focus(&self) -> Option<&Focus> {
        self.focus.as_ref()
    }

    pub fn day(&self, index: usize) -> Result<&DayView> {
        self.days.get(index).ok_or(Error::UnknownDay(index))
    }

    pub fn item(&self, id: &str) -> Result<&ItemView> {
        self.days
            .iter()
            .find_map(|day| day.item(id))
            .ok_or_else(|| Error::UnknownItem(id.to_string()))
    }

    /// Appends a day seeded with one empty item; returns its index
    pub fn add_day(&mut self) -> Result<usize> {
        self.ensure_editable()?;
        Ok(self.push_day())
    }

    /// Removes the day at `index` and re-indexes the rest
    ///
    /// Removing the only day leaves a fresh empty one in its place.
    pub fn remove_day(&mut self, index: usize) -> Result<()> {
        self.ensure_editable()?;
        if index >= self.days.len() {
            return Err(Error::UnknownDay(index));
        }
        let removed = self.days.remove(index);
        for (position, day) in self.days.iter_mut().enumerate() {
            day.set_index(position);
        }
        self.focus = match self.focus.take() {
            Some(Focus::DayDescription(focused)) if focused == index => None,
            Some(Focus::DayDescription(focused)) if focused > index => Some(Focus::DayDescription(focused - 1)),
            Some(Focus::ItemTitle(id)) if removed.item(&id).is_some() => None,
            other => other,
        };
        debug!(removed = index, remaining = self.days.len(), "removed schedule day");

        if self.days.is_empty() {
            self.push_day();
        }
        Ok(())
    }

    /// Appends an empty item to the day at `day`; returns the new item's id
    pub fn add_item(&mut self, day: usize) -> Result<String> {
        self.ensure_editable()?;
        let view = self.days.get_mut(day).ok_or(Error::UnknownDay(day))?;
        let item = ItemView::empty();
        let id = item.id().to_string();
        view.items.push(item);
        self.focus = Some(Focus::ItemTitle(id.clone()));
        Ok(id)
    }

    /// Removes an item; a day left without items gets a fresh empty one
    pub fn remove_item(&mut self, id: &str) -> Result<()> {
        self.ensure_editable()?;
        let (day, position) = self.locate(id)?;
        let view = &mut self.days[day];
        view.items.remove(position);
        if self.focus == Some(Focus::ItemTitle(id.to_string())) {
            self.focus = None;
        }
        if let Some(replacement) = view.ensure_item() {
            self.focus = Some(Focus::ItemTitle(replacement));
        }
        Ok(())
    }

    pub fn set_time_type(&mut self, id: &str, time_type: TimeType) -> Result<()> {
        self.item_mut(id)?.time_type = time_type;
        Ok(())
    }

    pub fn set_time(&mut self, id: &str, time: &str) -> Result<()> {
        self.item_mut(id)?.time_input = sanitize(time, FieldKind::Plain);
        Ok(())
    }

    pub fn set_period(&mut self, id: &str, period: Period) -> Result<()> {
        self.item_mut(id)?.period = period;
        Ok(())
    }

    pub fn set_title(&mut self, id: &str, html: &str) -> Result<()> {
        self.item_mut(id)?.title = sanitize(html, FieldKind::ItemTitle);
        Ok(())
    }

    pub fn set_item_description(&mut self, id: &str, html: &str) -> Result<()> {
        self.item_mut(id)?.description = sanitize(html, FieldKind::ItemDescription);
        Ok(())
    }

    pub fn set_day_description(&mut self, day: usize, html: &str) -> Result<()> {
        self.ensure_editable()?;
        let view = self.days.get_mut(day).ok_or(Error::UnknownDay(day))?;
        view.description = sanitize(html, FieldKind::DayDescription);
        Ok(())
    }

    pub fn apply_item_patch(&mut self, id: &str, patch: &ItemPatch) -> Result<()> {
        // resolve first so a bad id leaves the row untouched
        self.item_mut(id)?;
        if let Some(time_type) = patch.time_type {
            self.set_time_type(id, time_type)?;
        }
        if let Some(time) = &patch.time {
            self.set_time(id, time)?;
        }
        if let Some(period) = patch.period {
            self.set_period(id, period)?;
        }
        if let Some(title) = &patch.title {
            self.set_title(id, title)?;
        }
        if let Some(description) = &patch.description {
            self.set_item_description(id, description)?;
        }
        Ok(())
    }

    pub fn apply_day_patch(&mut self, day: usize, patch: &DayPatch) -> Result<()> {
        match &patch.description {
            Some(description) => self.set_day_description(day, description),
            None => self.day(day).map(|_| ()),
        }
    }

    /// Reads the current tree into a document
    ///
    /// Untitled items are dropped, and any day left empty gets a fresh empty
    /// item. Days are keyed by their position.
    pub fn serialize(&self) -> ScheduleDocument {
        let document = ScheduleDocument::from_days(self.days.iter().map(DayView::to_day).collect());
        debug!(days = document.len(), "serialized schedule block");
        document
    }

    /// True iff the current tree would persist at least one titled item
    pub fn validate(&self) -> bool {
        self.days.iter().any(|day| day.items.iter().any(ItemView::has_title))
    }

    /// Replaces the whole tree with `document` and renders it from scratch
    pub fn replace(&mut self, document: &ScheduleDocument) -> Result<()> {
        self.ensure_editable()?;
        self.days = build_days(document);
        self.focus = None;
        Ok(())
    }

    fn push_day(&mut self) -> usize {
        let index = self.days.len();
        self.days.push(DayView::empty(index));
        self.focus = Some(Focus::DayDescription(index));
        index
    }

    fn locate(&self, id: &str) -> Result<(usize, usize)> {
        self.days
            .iter()
            .enumerate()
            .find_map(|(d, day)| day.items.iter().position(|item| item.id() == id).map(|i| (d, i)))
            .ok_or_else(|| Error::UnknownItem(id.to_string()))
    }

    fn item_mut(&mut self, id: &str) -> Result<&mut ItemView> {
        self.ensure_editable()?;
        let (day, position) = self.locate(id)?;
        Ok(&mut self.days[day].items[position])
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.config.read_only {
            Err(Error::ReadOnly)
        } else {
            Ok(())
        }
    }
}

fn build_days(document: &ScheduleDocument) -> Vec<DayView> {
    let mut days: Vec<DayView> = document
        .days()
        .iter()
        .enumerate()
        .map(|(index, day)| DayView::from_day(index, day))
        .collect();
    if days.is_empty() {
        days.push(DayView::empty(0));
    }
    days
}
