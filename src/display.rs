use std::fs::File;
use std::io::Write;

use crate::sanitize::to_plain_text;
use crate::schedule::{ScheduleDocument, ScheduleItem, TimeType};

/// Formats an item's time: `HH:MM`, a period name, or `--:--` when unset
pub fn format_item_time(item: &ScheduleItem) -> String {
    match item.time_type {
        TimeType::Specific if item.time.trim().is_empty() => "--:--".to_string(),
        TimeType::Specific | TimeType::Period => item.time.trim().to_string(),
    }
}

/// Formats one item as a single line: `HH:MM Title - description`
pub fn format_item_line(item: &ScheduleItem) -> String {
    let title = to_plain_text(&item.title);
    let title = if title.trim().is_empty() { "[UNTITLED]".to_string() } else { title };
    let description = to_plain_text(&item.description);
    if description.trim().is_empty() {
        format!("{} {}", format_item_time(item), title)
    } else {
        format!("{} {} - {}", format_item_time(item), title, description.trim())
    }
}

/// Renders the whole schedule as plain text, one day after another
pub fn format_schedule(document: &ScheduleDocument) -> String {
    let mut out = String::new();
    for (index, day) in document.days().iter().enumerate() {
        out.push_str(&format!("** Day {} **\n", index + 1));
        let description = to_plain_text(&day.description);
        if !description.trim().is_empty() {
            out.push_str(description.trim());
            out.push('\n');
        }
        for item in &day.items {
            out.push_str(&format_item_line(item));
            out.push('\n');
        }
    }
    out
}

/// Writes a schedule to a file in plain text
pub fn write_schedule_to_file(document: &ScheduleDocument, filename: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;
    write!(file, "{}", format_schedule(document))?;
    Ok(())
}

/// Prints a schedule in a readable format
pub fn print_schedule(document: &ScheduleDocument) {
    let item_count: usize = document.days().iter().map(|d| d.items.len()).sum();
    println!("\n=== Workshop Schedule ===");
    println!("Days: {}, activities: {}", document.len(), item_count);
    if !document.validate() {
        println!("⚠️  No activity has a title yet; this schedule would not be saved");
    }
    println!();
    print!("{}", format_schedule(document));
}
