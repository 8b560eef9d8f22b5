//! Integration tests for tracker configuration, logging and table rows.

use std::sync::Arc;

use shared_selection::prelude::*;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            "shared_selection::tracker=debug,shared_selection::update=trace,shared_selection::row=debug",
        ))
        .with_test_writer()
        .try_init();
}

#[derive(Debug, serde::Deserialize)]
struct TableSettings {
    units: TrackerPolicy,
    labels: TrackerPolicy,
}

const SETTINGS: &str = r#"
[units.selection]
allow_empty_selection = false
match_by_value = true

[units.mutation]
force_deselection_on_index_change = true

[labels.mutation]
allow_one_mutation = true
"#;

#[test]
fn test_policies_load_from_toml() {
    let settings: TableSettings = toml::from_str(SETTINGS).unwrap();

    assert!(!settings.units.selection.allow_empty_selection);
    assert!(settings.units.selection.match_by_value);
    assert!(settings.units.mutation.force_deselection_on_index_change);
    assert!(!settings.units.mutation.allow_one_mutation);

    assert_eq!(settings.labels.selection, SelectionPolicy::default());
    assert!(settings.labels.mutation.allow_one_mutation);
}

#[test]
fn test_mistyped_policy_field_is_rejected() {
    let result = toml::from_str::<TrackerPolicy>("[selection]\nmatch_by_value = \"yes\"\n");
    assert!(result.is_err());
}

#[test]
fn test_loaded_policy_drives_tracker() {
    init_logging();
    let settings: TableSettings = toml::from_str(SETTINGS).unwrap();

    let units = SharedCollection::new(vec!["mm", "cm", "m"]);
    let tracker = MutationTracker::new(
        units.clone(),
        Some("cm"),
        settings.units.selection,
        settings.units.mutation,
    );
    assert_eq!(tracker.policy(), settings.units);

    let transitions = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let recv = transitions.clone();
    tracker
        .selection_changed
        .connect(move |(new, _old)| recv.lock().push(*new));

    units.update(vec!["cm", "m", "km"]);

    assert_eq!(tracker.selected(), Some("cm"));
    assert_eq!(*transitions.lock(), vec![None, Some("cm")]);
    tracker.dispose();
}

#[test]
fn test_rows_share_choice_collection() {
    init_logging();
    let colors = SharedCollection::new(vec![
        "red".to_string(),
        "green".to_string(),
        "blue".to_string(),
    ]);
    let columns = ["string", "choice(color)", "boolean"];

    let mut rows = Vec::new();
    for (name, color) in [("sky", "blue"), ("grass", "green"), ("unset", "")] {
        rows.push(RowEntry::new(&columns, &[colors.clone()], &[name, color, "false"]).unwrap());
    }
    assert_eq!(colors.observer_count(), 3);
    // An unknown default falls back to the first option.
    assert_eq!(rows[2].cell(1), Some(CellValue::Choice(Some("red".to_string()))));

    // Too many positions change for a rename, so only "blue" is followed by
    // value; the other rows fall back to the first option.
    colors.update(vec![
        "blue".to_string(),
        "lime".to_string(),
        "yellow".to_string(),
    ]);

    assert_eq!(rows[0].cell(1), Some(CellValue::Choice(Some("blue".to_string()))));
    assert_eq!(rows[1].cell(1), Some(CellValue::Choice(Some("blue".to_string()))));
    assert_eq!(rows[2].cell(1), Some(CellValue::Choice(Some("blue".to_string()))));

    rows[1].set_cell(1, "lime");
    rows[1].set_cell(2, true);
    assert_eq!(rows[1].cell(1), Some(CellValue::Choice(Some("lime".to_string()))));
    assert_eq!(rows[1].cell(2), Some(CellValue::Flag(true)));

    for row in &rows {
        row.dispose();
    }
    assert_eq!(colors.observer_count(), 0);
}

#[test]
fn test_row_construction_errors() {
    let colors = SharedCollection::new(vec!["red".to_string()]);

    let err = RowEntry::new(&["string", "color"], &[], &[]).unwrap_err();
    assert_eq!(err, RowError::unknown_column_type("color"));

    let err = RowEntry::new(&["choice"], &[], &[]).unwrap_err();
    assert!(matches!(err, RowError::ChoiceModelCount { choice_columns: 1, models: 0 }));

    let err = RowEntry::new(&["choice", "string"], &[colors], &["red"]).unwrap_err();
    assert_eq!(err.to_string(), "Expected 2 default values, got 1");

    let err = RowEntry::from_cells(&[ColumnKind::Flag], vec!["x".to_string()], vec![], vec![]).unwrap_err();
    assert!(matches!(err, RowError::MissingCellValue { column: 0, kind: ColumnKind::Flag }));
}
