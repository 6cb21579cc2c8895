//! Invariants that must hold after any sequence of editor operations.

use proptest::prelude::*;
use serde_json::json;

use schedule_block::config::ScheduleBlockConfig;
use schedule_block::editor::ScheduleEditor;
use schedule_block::schedule::{from_input, ScheduleDocument};
use schedule_block::transfer::{export_envelope, import_envelope};

#[derive(Debug, Clone)]
enum Op {
    AddDay,
    RemoveDay(usize),
    AddItem(usize),
    RemoveItem(usize, usize),
    Title(usize, usize, String),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::AddDay),
        (0usize..6).prop_map(Op::RemoveDay),
        (0usize..6).prop_map(Op::AddItem),
        (0usize..6, 0usize..6).prop_map(|(d, i)| Op::RemoveItem(d, i)),
        (0usize..6, 0usize..6, "[ a-z]{0,6}").prop_map(|(d, i, t)| Op::Title(d, i, t)),
    ]
}

fn apply(editor: &mut ScheduleEditor, op: &Op) {
    let days = editor.days().len();
    match op {
        Op::AddDay => {
            editor.add_day().unwrap();
        }
        Op::RemoveDay(d) => editor.remove_day(d % days).unwrap(),
        Op::AddItem(d) => {
            editor.add_item(d % days).unwrap();
        }
        Op::RemoveItem(d, i) => {
            let day = &editor.days()[d % days];
            let id = day.items[i % day.items.len()].id().to_string();
            editor.remove_item(&id).unwrap();
        }
        Op::Title(d, i, title) => {
            let day = &editor.days()[d % days];
            let id = day.items[i % day.items.len()].id().to_string();
            editor.set_title(&id, title).unwrap();
        }
    }
}

fn assert_invariants(editor: &ScheduleEditor) {
    assert!(!editor.days().is_empty());
    for (position, day) in editor.days().iter().enumerate() {
        assert_eq!(day.index(), position);
        assert_eq!(day.label(), format!("Day {}", position + 1));
        assert!(!day.items.is_empty());
    }

    let doc = editor.serialize();
    let expected: Vec<String> = (0..editor.days().len()).map(|i| i.to_string()).collect();
    assert_eq!(doc.keys(), expected);
    assert!(doc.days().iter().all(|d| !d.items.is_empty()));
}

/// Equality ignoring ids of untitled placeholder items
fn same_titled_content(a: &ScheduleDocument, b: &ScheduleDocument) -> bool {
    a.len() == b.len()
        && a.days().iter().zip(b.days()).all(|(x, y)| {
            x.description == y.description
                && x.items.len() == y.items.len()
                && x.items.iter().zip(&y.items).all(|(i, j)| {
                    if i.has_title() {
                        i == j
                    } else {
                        !j.has_title() && i.time == j.time && i.time_type == j.time_type
                    }
                })
        })
}

proptest! {
    #[test]
    fn structure_invariants_hold_after_every_operation(ops in prop::collection::vec(op(), 0..40)) {
        let mut editor = ScheduleEditor::new(&ScheduleDocument::default(), ScheduleBlockConfig::default());
        assert_invariants(&editor);
        for op in &ops {
            apply(&mut editor, op);
            assert_invariants(&editor);
        }
    }

    #[test]
    fn serialize_twice_gives_the_same_document(ops in prop::collection::vec(op(), 0..30)) {
        let mut editor = ScheduleEditor::new(&ScheduleDocument::default(), ScheduleBlockConfig::default());
        for op in &ops {
            apply(&mut editor, op);
        }
        let first = editor.serialize();
        let second = editor.serialize();
        prop_assert!(same_titled_content(&first, &second));
        prop_assert_eq!(first.validate(), editor.validate());
    }

    #[test]
    fn export_then_import_is_lossless(titles in prop::collection::vec(prop::collection::vec("[A-Za-z][a-z ]{0,8}", 1..4), 1..4)) {
        let mut days = serde_json::Map::new();
        for (d, day) in titles.iter().enumerate() {
            let items: Vec<_> = day
                .iter()
                .enumerate()
                .map(|(i, title)| json!({
                    "id": format!("item_{d}_{i}"),
                    "timeType": if i % 2 == 0 { "specific" } else { "period" },
                    "time": if i % 2 == 0 { "10:15" } else { "Afternoon" },
                    "title": title,
                    "description": ""
                }))
                .collect();
            days.insert(d.to_string(), json!({"description": format!("Day {d}"), "items": items}));
        }
        let original = from_input(&serde_json::Value::Object(days));

        let editor = ScheduleEditor::new(&original, ScheduleBlockConfig::default());
        let envelope = serde_json::to_value(export_envelope(&editor.serialize())).unwrap();
        prop_assert_eq!(import_envelope(&envelope).unwrap(), original);
    }
}
