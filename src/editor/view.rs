use crate::sanitize::{sanitize, to_plain_text, FieldKind};
use crate::schedule::{Period, ScheduleDay, ScheduleItem, TimeType};

/// Editable row for one schedule item
///
/// The time input and the period dropdown both keep their values while
/// hidden, so switching the time type back and forth loses nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    id: String,
    pub time_type: TimeType,
    pub time_input: String,
    pub period: Period,
    pub title: String,
    pub description: String,
}

impl ItemView {
    pub fn from_item(item: &ScheduleItem) -> Self {
        let (time_input, period) = match item.time_type {
            TimeType::Specific => (item.time.clone(), Period::default()),
            TimeType::Period => (String::new(), Period::parse(&item.time).unwrap_or_default()),
        };
        ItemView {
            id: item.id.clone(),
            time_type: item.time_type,
            time_input,
            period,
            title: sanitize(&item.title, FieldKind::ItemTitle),
            description: sanitize(&item.description, FieldKind::ItemDescription),
        }
    }

    pub fn empty() -> Self {
        ItemView::from_item(&ScheduleItem::empty())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn time_input_visible(&self) -> bool {
        self.time_type == TimeType::Specific
    }

    pub fn period_visible(&self) -> bool {
        self.time_type == TimeType::Period
    }

    pub fn has_title(&self) -> bool {
        !to_plain_text(&sanitize(&self.title, FieldKind::ItemTitle)).trim().is_empty()
    }

    /// Reads the controls back into an item
    pub fn to_item(&self) -> ScheduleItem {
        let time = match self.time_type {
            TimeType::Specific => sanitize(&self.time_input, FieldKind::Plain),
            TimeType::Period => self.period.as_str().to_string(),
        };
        ScheduleItem {
            id: self.id.clone(),
            time_type: self.time_type,
            time,
            title: sanitize(&self.title, FieldKind::ItemTitle),
            description: sanitize(&self.description, FieldKind::ItemDescription),
        }
    }
}

/// Container for one day and its item rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayView {
    index: usize,
    pub description: String,
    pub items: Vec<ItemView>,
}

impl DayView {
    pub fn from_day(index: usize, day: &ScheduleDay) -> Self {
        let mut view = DayView {
            index,
            description: sanitize(&day.description, FieldKind::DayDescription),
            items: day.items.iter().map(ItemView::from_item).collect(),
        };
        view.ensure_item();
        view
    }

    pub fn empty(index: usize) -> Self {
        DayView {
            index,
            description: String::new(),
            items: vec![ItemView::empty()],
        }
    }

    /// Stored day index, kept equal to position by the editor
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// "Day N", derived from the stored index
    pub fn label(&self) -> String {
        format!("Day {}", self.index + 1)
    }

    pub fn item(&self, id: &str) -> Option<&ItemView> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Appends an empty row if the day has none; returns the new row's id
    pub(crate) fn ensure_item(&mut self) -> Option<String> {
        if self.items.is_empty() {
            let item = ItemView::empty();
            let id = item.id.clone();
            self.items.push(item);
            Some(id)
        } else {
            None
        }
    }

    /// Reads the day back, keeping only titled items
    pub fn to_day(&self) -> ScheduleDay {
        let items = self
            .items
            .iter()
            .filter(|item| item.has_title())
            .map(ItemView::to_item)
            .collect();
        ScheduleDay::new(sanitize(&self.description, FieldKind::DayDescription), items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(time_type: TimeType, time: &str, title: &str) -> ScheduleItem {
        ScheduleItem {
            id: "fixed".to_string(),
            time_type,
            time: time.to_string(),
            title: title.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn exactly_one_time_control_is_visible() {
        let specific = ItemView::from_item(&item(TimeType::Specific, "10:30", "Talk"));
        assert!(specific.time_input_visible());
        assert!(!specific.period_visible());
        assert_eq!(specific.time_input, "10:30");

        let period = ItemView::from_item(&item(TimeType::Period, "Evening", "Dinner"));
        assert!(!period.time_input_visible());
        assert!(period.period_visible());
        assert_eq!(period.period, Period::Evening);
        assert_eq!(period.time_input, "");
    }

    #[test]
    fn unknown_period_reads_back_as_morning() {
        let view = ItemView::from_item(&item(TimeType::Period, "Brunch", "Eat"));
        assert_eq!(view.to_item().time, "Morning");
    }

    #[test]
    fn switching_time_type_reads_the_visible_control() {
        let mut view = ItemView::from_item(&item(TimeType::Specific, "08:15", "Coffee"));
        view.time_type = TimeType::Period;
        view.period = Period::Noon;
        assert_eq!(view.to_item().time, "Noon");
        view.time_type = TimeType::Specific;
        assert_eq!(view.to_item().time, "08:15");
    }

    #[test]
    fn day_drops_untitled_items_and_refills() {
        let day = DayView::from_day(
            0,
            &ScheduleDay::new("Intro".into(), vec![item(TimeType::Specific, "", "  ")]),
        );
        let saved = day.to_day();
        assert_eq!(saved.items.len(), 1);
        assert_ne!(saved.items[0].id, "fixed");
        assert_eq!(day.label(), "Day 1");
    }

    #[test]
    fn markup_only_titles_count_as_untitled() {
        let day = DayView::from_day(
            0,
            &ScheduleDay::new(
                String::new(),
                vec![
                    item(TimeType::Specific, "", "<br>"),
                    item(TimeType::Specific, "", "<p> </p>"),
                    item(TimeType::Specific, "", "<b></b>"),
                ],
            ),
        );
        assert!(day.items.iter().all(|i| !i.has_title()));
        let saved = day.to_day();
        assert_eq!(saved.items.len(), 1);
        assert_eq!(saved.items[0].title, "");
    }

    #[test]
    fn loaded_fields_are_sanitized() {
        let mut loaded = item(TimeType::Specific, "09:00", "<script>x</script><b>Talk</b>");
        loaded.description = "<a href=\"javascript:x\" onclick=\"y\">go</a>".to_string();
        let view = ItemView::from_item(&loaded);
        assert_eq!(view.title, "x<b>Talk</b>");
        assert_eq!(view.description, "<a>go</a>");
    }
}
