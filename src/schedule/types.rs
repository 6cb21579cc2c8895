use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::ids::{fresh_id, ITEM_ID_PREFIX};
use crate::sanitize::to_plain_text;

/// How an item's `time` field is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeType {
    /// `time` holds an `HH:MM` value (or is empty)
    #[default]
    Specific,
    /// `time` holds a [`Period`] name
    Period,
}

impl TimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeType::Specific => "specific",
            TimeType::Period => "period",
        }
    }

    /// Parses a time type, falling back to `Specific` for anything unknown
    pub fn parse_lenient(value: &str) -> TimeType {
        match value {
            "period" => TimeType::Period,
            _ => TimeType::Specific,
        }
    }
}

/// General time of day used when an item has no specific time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[default]
    Morning,
    Noon,
    Afternoon,
    Evening,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Morning, Period::Noon, Period::Afternoon, Period::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Morning => "Morning",
            Period::Noon => "Noon",
            Period::Afternoon => "Afternoon",
            Period::Evening => "Evening",
        }
    }

    pub fn parse(value: &str) -> Option<Period> {
        Period::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

/// A single activity within a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: String,
    pub time_type: TimeType,
    pub time: String,
    pub title: String,
    pub description: String,
}

impl ScheduleItem {
    /// Creates an item with a fresh id and every field empty
    pub fn empty() -> Self {
        ScheduleItem {
            id: fresh_id(ITEM_ID_PREFIX),
            time_type: TimeType::Specific,
            time: String::new(),
            title: String::new(),
            description: String::new(),
        }
    }

    /// True when the title has visible text once markup is removed
    pub fn has_title(&self) -> bool {
        !to_plain_text(&self.title).trim().is_empty()
    }
}

/// One day of a schedule: an optional description and at least one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleDay {
    pub description: String,
    pub items: Vec<ScheduleItem>,
}

impl ScheduleDay {
    /// Creates a day holding a single empty item
    pub fn empty() -> Self {
        ScheduleDay {
            description: String::new(),
            items: vec![ScheduleItem::empty()],
        }
    }

    /// Builds a day, substituting an empty item when `items` is empty
    pub fn new(description: String, items: Vec<ScheduleItem>) -> Self {
        let items = if items.is_empty() {
            vec![ScheduleItem::empty()]
        } else {
            items
        };
        ScheduleDay { description, items }
    }
}

/// A multi-day schedule
///
/// Days are kept in display order. On the wire the document is a JSON object
/// keyed by day index (`"0"`, `"1"`, ...), and the keys are always derived
/// from position so they stay dense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDocument {
    days: Vec<ScheduleDay>,
}

impl ScheduleDocument {
    /// Builds a document, substituting a single empty day when `days` is empty
    pub fn from_days(days: Vec<ScheduleDay>) -> Self {
        let days = if days.is_empty() {
            vec![ScheduleDay::empty()]
        } else {
            days
        };
        ScheduleDocument { days }
    }

    pub fn days(&self) -> &[ScheduleDay] {
        &self.days
    }

    pub fn into_days(self) -> Vec<ScheduleDay> {
        self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, index: usize) -> Option<&ScheduleDay> {
        self.days.get(index)
    }

    /// Looks a day up by its wire key
    pub fn get(&self, key: &str) -> Option<&ScheduleDay> {
        key.parse::<usize>().ok().and_then(|i| self.days.get(i))
    }

    /// Day-index keys in order: `"0"` .. `"N-1"`
    pub fn keys(&self) -> Vec<String> {
        (0..self.days.len()).map(|i| i.to_string()).collect()
    }

    pub fn items(&self) -> impl Iterator<Item = &ScheduleItem> {
        self.days.iter().flat_map(|d| d.items.iter())
    }

    /// A document can be persisted once at least one item anywhere has a title
    pub fn validate(&self) -> bool {
        self.items().any(ScheduleItem::has_title)
    }
}

impl Default for ScheduleDocument {
    fn default() -> Self {
        ScheduleDocument::from_days(Vec::new())
    }
}

impl Serialize for ScheduleDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (index, day) in self.days.iter().enumerate() {
            map.serialize_entry(&index.to_string(), day)?;
        }
        map.end()
    }
}
