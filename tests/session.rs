mod common;

use std::io::Cursor;

use common::{PEOPLE_CSV, load_session, people_schema};
use csv_importer::{
    mapping::Binding,
    parser::ParseOptions,
    projection::project,
    session::{Callbacks, ImportSession},
    value::Value,
};
use proptest::prelude::*;

const SOURCES: &[&str] = &["name", "E-mail", "age", "notes"];
const TARGETS: &[&str] = &["name", "email", "age"];

// Ann's row is short: it has no `age` or `notes` cells.
const RAGGED_CSV: &str = "name,E-mail,age,notes
Ann,ann@example.com
Bob,,42,likes tea
";

fn target_keys(entries: &[(String, Binding)]) -> Vec<&str> {
    entries.iter().map(|(key, _)| key.as_str()).collect()
}

#[derive(Debug, Clone)]
enum Edit {
    Rename { source: usize, target: usize },
    Toggle { target: usize, checked: bool },
    Reset,
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0..SOURCES.len(), 0..TARGETS.len())
            .prop_map(|(source, target)| Edit::Rename { source, target }),
        (0..TARGETS.len(), any::<bool>())
            .prop_map(|(target, checked)| Edit::Toggle { target, checked }),
        Just(Edit::Reset),
    ]
}

fn apply(session: &mut ImportSession, edit: &Edit) {
    match *edit {
        Edit::Rename { source, target } => session
            .rename(SOURCES[source], TARGETS[target])
            .expect("rename known column"),
        Edit::Toggle { target, checked } => session
            .toggle(TARGETS[target], checked)
            .expect("toggle known target"),
        Edit::Reset => session.reset(),
    }
}

proptest! {
    #[test]
    fn current_and_original_share_target_keys(edits in prop::collection::vec(edit_strategy(), 0..24)) {
        let mut session = load_session(people_schema(), PEOPLE_CSV, ParseOptions::default());
        for edit in &edits {
            apply(&mut session, edit);
            let mappings = session.mappings();
            prop_assert_eq!(target_keys(mappings.current()), target_keys(mappings.original()));
            prop_assert_eq!(target_keys(mappings.current()), TARGETS.to_vec());
        }
    }

    #[test]
    fn projection_always_derives_from_parsed_baseline(edits in prop::collection::vec(edit_strategy(), 1..24)) {
        let mut session = load_session(people_schema(), PEOPLE_CSV, ParseOptions::default());
        for edit in &edits {
            apply(&mut session, edit);
        }
        let expected = project(session.parsed(), session.mappings().current());
        prop_assert_eq!(session.mapped(), expected.as_slice());
    }

    #[test]
    fn reset_restores_baseline_after_any_history(edits in prop::collection::vec(edit_strategy(), 0..24)) {
        let mut session = load_session(people_schema(), RAGGED_CSV, ParseOptions::default());
        for edit in &edits {
            apply(&mut session, edit);
        }
        session.reset();
        prop_assert_eq!(session.mapped(), session.parsed());
        prop_assert_eq!(session.mappings().current(), session.mappings().original());
    }
}

#[test]
fn seed_binds_matching_targets_and_excludes_others() {
    let session = load_session(people_schema(), PEOPLE_CSV, ParseOptions::default());
    let mappings = session.mappings();
    assert_eq!(
        mappings.original_binding("name"),
        Some(&Binding::Bound("name".into()))
    );
    assert_eq!(mappings.original_binding("email"), Some(&Binding::Excluded));
    assert_eq!(session.mapped(), session.parsed());
}

#[test]
fn rename_then_inverse_rename_reproduces_original_values() {
    let mut session = load_session(people_schema(), PEOPLE_CSV, ParseOptions::default());
    let before = session.mapped().to_vec();

    session.rename("notes", "name").expect("rename to notes");
    assert_eq!(session.mapped()[1].get("name"), Some(&Value::from("likes tea")));

    session.rename("name", "name").expect("rename back");
    assert_eq!(session.mapped(), before.as_slice());
}

#[test]
fn short_rows_keep_missing_keys_absent_across_rename_round_trip() {
    let mut session = load_session(people_schema(), RAGGED_CSV, ParseOptions::default());
    assert_eq!(session.mapped(), session.parsed());
    assert!(!session.mapped()[0].contains_key("age"));

    session.rename("E-mail", "name").expect("rename to e-mail");
    assert_eq!(
        session.mapped()[0].get("name"),
        Some(&Value::from("ann@example.com"))
    );
    session.rename("name", "name").expect("rename back");
    assert_eq!(session.mapped(), session.parsed());

    session.rename("notes", "age").expect("bind age to notes");
    assert!(!session.mapped()[0].contains_key("age"));
    assert_eq!(session.mapped()[1].get("age"), Some(&Value::from("likes tea")));

    let rows = session.finalize();
    assert!(!rows[0].contains_key("age"));
}

#[test]
fn repeated_rename_is_idempotent() {
    let mut session = load_session(people_schema(), PEOPLE_CSV, ParseOptions::default());
    session.rename("E-mail", "email").unwrap();
    let once = session.mapped().to_vec();
    session.rename("E-mail", "email").unwrap();
    assert_eq!(session.mapped(), once.as_slice());
    assert_eq!(
        session.mapped()[0].get("email"),
        Some(&Value::from("ann@example.com"))
    );
    assert_eq!(session.mapped()[1].get("email"), Some(&Value::Null));
}

#[test]
fn toggle_off_removes_field_and_toggle_on_leaves_it_unbound() {
    let mut session = load_session(people_schema(), PEOPLE_CSV, ParseOptions::default());
    session.rename("notes", "name").unwrap();

    session.toggle("name", false).unwrap();
    assert!(session.mapped().iter().all(|row| !row.contains_key("name")));

    session.toggle("name", true).unwrap();
    assert_eq!(
        session.mappings().current_binding("name"),
        Some(&Binding::Unbound)
    );
    assert!(
        session
            .mapped()
            .iter()
            .all(|row| row.get("name") == Some(&Value::Null))
    );
}

#[test]
fn required_fields_can_still_be_toggled_off() {
    let mut session = load_session(people_schema(), PEOPLE_CSV, ParseOptions::default());
    session.toggle("name", false).expect("engine does not guard required");
    assert_eq!(session.missing_required().len(), 1);
}

#[test]
fn row_limit_keeps_first_n_rows_and_reports_once() {
    for limit in [0usize, 1, 3, 10] {
        let mut csv = String::from("id\n");
        for idx in 0..=limit {
            csv.push_str(&format!("{idx}\n"));
        }
        let mut errors = Vec::new();
        let mut successes = 0;
        let mut session = ImportSession::new(people_schema());
        session.load(
            Cursor::new(csv.into_bytes()),
            Some("ids.csv"),
            &ParseOptions {
                limit: Some(limit),
                ..ParseOptions::default()
            },
            &mut Callbacks {
                on_success: |_: &[_]| successes += 1,
                on_error: |message: &str| errors.push(message.to_string()),
            },
        );
        assert_eq!(session.row_count(), limit);
        assert_eq!(errors, vec![format!("Only {limit} rows are allowed")]);
        assert_eq!(successes, 1);
        assert_eq!(
            session.error(),
            Some(format!("Only {limit} rows are allowed").as_str())
        );
        assert_eq!(session.mapped(), session.parsed());
    }
}

#[test]
fn later_errors_overwrite_earlier_ones() {
    let session = load_session(
        people_schema(),
        "name,age\nAnn\nBob,1,2\n",
        ParseOptions::default(),
    );
    assert_eq!(session.row_count(), 2);
    assert_eq!(
        session.error(),
        Some("Row 3: Too many fields: expected 2 fields but parsed 3")
    );
}

#[test]
fn reloading_replaces_state_and_clears_error() {
    let mut session = load_session(
        people_schema(),
        PEOPLE_CSV,
        ParseOptions {
            limit: Some(1),
            ..ParseOptions::default()
        },
    );
    assert!(session.error().is_some());
    session.rename("notes", "email").unwrap();

    session.load(
        Cursor::new(b"name,email\nZed,z@example.com\n".to_vec()),
        None,
        &ParseOptions::default(),
        &mut (),
    );
    assert_eq!(session.error(), None);
    assert_eq!(session.file_name(), "Untitled");
    assert_eq!(session.row_count(), 1);
    assert_eq!(
        session.mappings().current_binding("email"),
        Some(&Binding::Bound("email".into()))
    );
}

#[test]
fn blank_header_handling_flows_into_session_headers() {
    let csv = "Name,,Age\nAnn,,31\nBob,,42\n";
    let dropped = load_session(people_schema(), csv, ParseOptions::default());
    assert_eq!(dropped.headers(), ["Name", "Age"]);
    assert!(dropped.parsed().iter().all(|row| row.len() == 2));

    let kept = load_session(
        people_schema(),
        csv,
        ParseOptions {
            show_empty_fields: true,
            ..ParseOptions::default()
        },
    );
    assert_eq!(kept.headers(), ["Name", "Field 2", "Age"]);
    assert_eq!(kept.parsed()[0].get("Field 2"), Some(&Value::Null));

    let partial = load_session(people_schema(), "Name,,Age\nAnn,,31\nBob,x,42\n", ParseOptions::default());
    assert_eq!(partial.headers(), ["Name", "Field 2", "Age"]);
}

#[test]
fn finalize_returns_null_free_rows_while_preview_keeps_nulls() {
    let mut session = load_session(people_schema(), PEOPLE_CSV, ParseOptions::default());
    session.rename("E-mail", "email").unwrap();
    assert_eq!(session.mapped()[1].get("email"), Some(&Value::Null));

    let rows = session.finalize();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.iter().all(|(_, v)| !v.is_null())));
    assert_eq!(rows[1].get("email"), Some(&Value::from("")));
    assert_eq!(rows[0].get("age"), Some(&Value::Integer(31)));
}
