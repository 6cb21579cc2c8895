//! Interpretation of raw block data.
//!
//! Block data arrives from persisted field values, from the host and from
//! user-supplied imports, so nothing here fails: missing or malformed fields
//! are defaulted and structural gaps are repaired.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

use super::ids::{fresh_id, ITEM_ID_PREFIX};
use super::types::{ScheduleDay, ScheduleDocument, ScheduleItem, TimeType};

/// Keys whose presence marks the old single-day shape
const LEGACY_KEYS: [&str; 3] = ["date", "title", "items"];

/// The shape of incoming block data, resolved once at the boundary
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleInput<'a> {
    /// Old single-day shape: `{ date?, title?, items? }`
    Legacy(LegacySchedule<'a>),
    /// Multi-day shape keyed by day index
    Current(&'a Map<String, Value>),
    /// Nothing usable (missing, empty object, or not an object)
    Empty,
}

/// Fields of the legacy single-day shape
#[derive(Debug, Clone, PartialEq)]
pub struct LegacySchedule<'a> {
    pub date: Option<&'a str>,
    pub title: Option<&'a str>,
    pub items: &'a [Value],
}

/// Classifies raw block data
///
/// Any of `date`, `title` or `items` present as a key selects the legacy
/// shape, whatever its value.
pub fn parse_input(raw: &Value) -> ScheduleInput<'_> {
    let Some(object) = raw.as_object() else {
        return ScheduleInput::Empty;
    };

    if LEGACY_KEYS.iter().any(|key| object.contains_key(*key)) {
        return ScheduleInput::Legacy(LegacySchedule {
            date: object.get("date").and_then(Value::as_str),
            title: object.get("title").and_then(Value::as_str),
            items: object
                .get("items")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        });
    }

    if object.is_empty() {
        ScheduleInput::Empty
    } else {
        ScheduleInput::Current(object)
    }
}

/// Builds a document from raw block data of any supported shape
pub fn from_input(raw: &Value) -> ScheduleDocument {
    match parse_input(raw) {
        ScheduleInput::Legacy(legacy) => {
            debug!(date = ?legacy.date, items = legacy.items.len(), "migrating legacy schedule");
            migrate_legacy(&legacy)
        }
        ScheduleInput::Current(days) => document_from_days(days),
        ScheduleInput::Empty => ScheduleDocument::default(),
    }
}

/// Converts the legacy shape into a single day `"0"`
///
/// The legacy `title` becomes the day description.
pub fn migrate_legacy(legacy: &LegacySchedule<'_>) -> ScheduleDocument {
    let items = legacy.items.iter().map(item_from_value).collect();
    let day = ScheduleDay::new(legacy.title.unwrap_or_default().to_string(), items);
    ScheduleDocument::from_days(vec![day])
}

fn document_from_days(days: &Map<String, Value>) -> ScheduleDocument {
    let mut entries: Vec<(Option<usize>, &Value)> = days
        .iter()
        .map(|(key, day)| (key.trim().parse::<usize>().ok(), day))
        .collect();
    // numeric keys first, in numeric order; the rest keep map order
    entries.sort_by_key(|(index, _)| index.unwrap_or(usize::MAX));

    ScheduleDocument::from_days(entries.into_iter().map(|(_, day)| day_from_value(day)).collect())
}

fn day_from_value(value: &Value) -> ScheduleDay {
    let items = value
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(item_from_value).collect())
        .unwrap_or_default();
    ScheduleDay::new(string_field(value, "description"), items)
}

/// Reads one item, defaulting every missing field
pub fn item_from_value(value: &Value) -> ScheduleItem {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fresh_id(ITEM_ID_PREFIX));

    let time_type = value
        .get("timeType")
        .and_then(Value::as_str)
        .map(TimeType::parse_lenient)
        .unwrap_or_default();

    ScheduleItem {
        id,
        time_type,
        time: string_field(value, "time"),
        title: string_field(value, "title"),
        description: string_field(value, "description"),
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl<'de> Deserialize<'de> for ScheduleDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(from_input(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn migrates_legacy_single_day_shape() {
        let raw = json!({
            "date": "2024-01-01",
            "title": "Setup",
            "items": [{"id": "a", "time": "09:00", "title": "Registration", "description": ""}]
        });
        let doc = from_input(&raw);
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"0": {"description": "Setup", "items": [
                {"id": "a", "timeType": "specific", "time": "09:00", "title": "Registration", "description": ""}
            ]}})
        );
    }

    #[test]
    fn legacy_detection_is_by_key_presence() {
        let raw = json!({"title": null, "0": {"description": "ignored", "items": []}});
        assert!(matches!(parse_input(&raw), ScheduleInput::Legacy(_)));

        let doc = from_input(&raw);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.days()[0].description, "");
        assert_eq!(doc.days()[0].items.len(), 1);
        assert!(!doc.days()[0].items[0].has_title());
    }

    #[test]
    fn legacy_keeps_existing_time_type() {
        let raw = json!({"items": [{"id": "p", "timeType": "period", "time": "Noon", "title": "Lunch"}]});
        let doc = from_input(&raw);
        let item = &doc.days()[0].items[0];
        assert_eq!(item.time_type, TimeType::Period);
        assert_eq!(item.time, "Noon");
        assert_eq!(item.description, "");
    }

    #[test]
    fn empty_or_non_object_input_gives_default_document() {
        for raw in [Value::Null, json!({}), json!([1, 2]), json!("text")] {
            let doc = from_input(&raw);
            assert_eq!(doc.len(), 1, "input {raw}");
            assert_eq!(doc.days()[0].items.len(), 1);
        }
    }

    #[test]
    fn orders_days_by_numeric_key() {
        let mut days = Map::new();
        for i in [2usize, 10, 0, 1, 3, 4, 5, 6, 7, 8, 9] {
            days.insert(
                i.to_string(),
                json!({"description": format!("day {i}"), "items": [{"id": format!("i{i}"), "title": "x"}]}),
            );
        }
        let doc = from_input(&Value::Object(days));
        let descriptions: Vec<&str> = doc.days().iter().map(|d| d.description.as_str()).collect();
        assert_eq!(descriptions[2], "day 2");
        assert_eq!(descriptions[10], "day 10");
        assert_eq!(doc.keys().last().map(String::as_str), Some("10"));
    }

    #[test]
    fn repairs_structural_gaps() {
        let raw = json!({
            "0": {"description": "Empty day", "items": []},
            "1": {"items": [{"title": "No id", "timeType": "weird"}]}
        });
        let doc = from_input(&raw);
        assert_eq!(doc.days()[0].items.len(), 1);
        let repaired = &doc.days()[1].items[0];
        assert!(repaired.id.starts_with(ITEM_ID_PREFIX));
        assert_eq!(repaired.time_type, TimeType::Specific);
        assert_eq!(doc.days()[1].description, "");
    }

    #[test]
    fn deserializes_through_the_same_rules() {
        let doc: ScheduleDocument =
            serde_json::from_str(r#"{"title":"Old","items":[{"id":"z","title":"Kickoff"}]}"#).unwrap();
        assert_eq!(doc.days()[0].description, "Old");
        assert_eq!(doc.days()[0].items[0].id, "z");
    }
}
