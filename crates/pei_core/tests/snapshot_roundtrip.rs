use pei_core::db::open_db_in_memory;
use pei_core::snapshot::{decode_snapshot, plan_import, replay};
use pei_core::{
    PeiTracker, RosterRepository, SnapshotError, SqliteRecordStore, Status, StatusEntry,
    StatusListQuery, StatusRepository, Student, Subject, Term, TermMode, TrackerError,
};
use rusqlite::Connection;

struct Roster {
    ana: Student,
    bia: Student,
    math: Subject,
    art: Subject,
}

fn roster() -> Roster {
    let mut ana = Student::new("Ana", "7A");
    ana.segment = Some("fundamental".to_string());
    Roster {
        ana,
        bia: Student::new("Bia", "8B"),
        math: Subject::new("Math", 1),
        art: Subject::new("Art", 2),
    }
}

fn seed_roster(conn: &Connection, roster: &Roster) {
    let store = SqliteRecordStore::new(conn);
    store.create_student(&roster.ana).unwrap();
    store.create_student(&roster.bia).unwrap();
    store.create_subject(&roster.math).unwrap();
    store.create_subject(&roster.art).unwrap();
}

fn upsert(conn: &Connection, student: &Student, subject: &Subject, status: Status) {
    SqliteRecordStore::new(conn)
        .upsert_status(&StatusEntry {
            student_id: student.id,
            subject_id: subject.id,
            term: None,
            status,
        })
        .unwrap();
}

fn entry_count(conn: &Connection) -> usize {
    SqliteRecordStore::new(conn)
        .list_status_entries(&StatusListQuery::default())
        .unwrap()
        .len()
}

#[test]
fn export_then_import_into_empty_store_restores_view() {
    let roster = roster();
    let source = open_db_in_memory().unwrap();
    seed_roster(&source, &roster);
    upsert(&source, &roster.ana, &roster.math, Status::Done);
    upsert(&source, &roster.ana, &roster.art, Status::InReview);
    upsert(&source, &roster.bia, &roster.art, Status::NotStarted);

    let mut exporter = PeiTracker::new(SqliteRecordStore::new(&source), TermMode::Global);
    let original = exporter.load().unwrap().to_vec();
    let text = exporter.export_snapshot().unwrap();

    let target = open_db_in_memory().unwrap();
    seed_roster(&target, &roster);
    let mut importer = PeiTracker::new(SqliteRecordStore::new(&target), TermMode::Global);
    let summary = importer.import_snapshot(&text, None).unwrap();
    assert_eq!(summary.students, 2);
    assert_eq!(summary.upserts_applied, 3);

    let restored = importer.load().unwrap();
    assert_eq!(restored, original.as_slice());
}

#[test]
fn scoped_export_then_import_keeps_terms_and_unknown_subjects() {
    let roster = roster();
    let orphan = uuid::Uuid::new_v4();
    let source = open_db_in_memory().unwrap();
    seed_roster(&source, &roster);
    let store = SqliteRecordStore::new(&source);
    for (subject_id, term, status) in [
        (roster.math.id, Some(Term::Second), Status::Done),
        (orphan, Some(Term::Second), Status::InReview),
        (roster.art.id, Some(Term::First), Status::InReview),
    ] {
        store
            .upsert_status(&StatusEntry {
                student_id: roster.ana.id,
                subject_id,
                term,
                status,
            })
            .unwrap();
    }

    let mode = TermMode::Scoped(Term::Second);
    let mut exporter = PeiTracker::new(SqliteRecordStore::new(&source), mode);
    let original = exporter.load().unwrap().to_vec();
    assert_eq!(original[0].statuses.len(), 2);
    assert!(original[0].statuses.iter().any(|record| record.subject.is_none()));
    let text = exporter.export_snapshot().unwrap();
    assert_eq!(decode_snapshot(&text).unwrap(), original);

    let target = open_db_in_memory().unwrap();
    seed_roster(&target, &roster);
    let mut importer = PeiTracker::new(SqliteRecordStore::new(&target), mode);
    let summary = importer.import_snapshot(&text, None).unwrap();
    assert_eq!(summary.upserts_applied, 2);

    let restored = importer.load().unwrap();
    assert_eq!(restored, original.as_slice());
}

#[test]
fn nested_entries_may_omit_student_id() {
    let roster = roster();
    let text = format!(
        r#"[{{"id": "{}", "name": "Ana", "class_label": "7A",
             "statuses": [{{"subject_id": "{}", "term": 2, "status": "done"}}]}}]"#,
        roster.ana.id, roster.math.id
    );

    let plan = plan_import(&text, None).unwrap();
    assert_eq!(
        plan,
        vec![StatusEntry {
            student_id: roster.ana.id,
            subject_id: roster.math.id,
            term: Some(Term::Second),
            status: Status::Done,
        }]
    );
}

#[test]
fn exported_text_decodes_back_to_same_view() {
    let roster = roster();
    let conn = open_db_in_memory().unwrap();
    seed_roster(&conn, &roster);
    upsert(&conn, &roster.bia, &roster.math, Status::InReview);

    let mut tracker = PeiTracker::new(SqliteRecordStore::new(&conn), TermMode::Global);
    let view = tracker.load().unwrap().to_vec();
    let text = tracker.export_snapshot().unwrap();

    assert!(text.contains("\"class_label\": \"7A\""));
    assert_eq!(decode_snapshot(&text).unwrap(), view);
}

#[test]
fn malformed_snapshot_issues_no_upserts() {
    let roster = roster();
    let conn = open_db_in_memory().unwrap();
    seed_roster(&conn, &roster);
    let mut tracker = PeiTracker::new(SqliteRecordStore::new(&conn), TermMode::Global);

    for text in [
        "not json",
        r#"{"students": []}"#,
        r#"[{"id": "not-a-uuid", "name": "x", "class_label": "7A"}]"#,
        r#"[null]"#,
    ] {
        let err = tracker.import_snapshot(text, None).unwrap_err();
        assert!(
            matches!(err, TrackerError::Snapshot(SnapshotError::Malformed(_))),
            "unexpected error for {text}: {err}"
        );
    }
    assert_eq!(entry_count(&conn), 0);
}

#[test]
fn entries_without_term_take_the_current_term() {
    let roster = roster();
    let student_id = roster.ana.id;
    let subject_id = roster.math.id;
    let text = format!(
        r#"[{{
            "id": "{student_id}",
            "name": "Ana",
            "class_label": "7A",
            "statuses": [
                {{"student_id": "{student_id}", "subject_id": "{subject_id}", "status": "Em Correção"}},
                {{"student_id": "{student_id}", "subject_id": "{subject_id}", "term": 1, "status": "done"}}
            ]
        }}]"#
    );

    let plan = plan_import(&text, Some(Term::Third)).unwrap();
    assert_eq!(
        plan,
        vec![
            StatusEntry {
                student_id,
                subject_id,
                term: Some(Term::Third),
                status: Status::InReview,
            },
            StatusEntry {
                student_id,
                subject_id,
                term: Some(Term::First),
                status: Status::Done,
            },
        ]
    );
}

#[test]
fn upsert_key_uses_parent_student_id() {
    let roster = roster();
    let stray = uuid::Uuid::new_v4();
    let text = format!(
        r#"[{{"id": "{}", "name": "Ana", "class_label": "7A",
             "statuses": [{{"student_id": "{stray}", "subject_id": "{}", "status": "done"}}]}}]"#,
        roster.ana.id, roster.art.id
    );

    let plan = plan_import(&text, None).unwrap();
    assert_eq!(plan[0].student_id, roster.ana.id);
}

#[test]
fn replay_failure_keeps_prior_upserts_and_reports_progress() {
    let roster = roster();
    let conn = open_db_in_memory().unwrap();
    seed_roster(&conn, &roster);
    let plan: Vec<StatusEntry> = [&roster.math, &roster.art]
        .into_iter()
        .map(|subject| StatusEntry {
            student_id: roster.ana.id,
            subject_id: subject.id,
            term: None,
            status: Status::Done,
        })
        .collect();

    conn.execute_batch(
        "CREATE TRIGGER reject_art BEFORE INSERT ON status_entries
         WHEN NEW.subject_id = '__ART__'
         BEGIN SELECT RAISE(ABORT, 'art is locked'); END;"
            .replace("__ART__", &roster.art.id.to_string())
            .as_str(),
    )
    .unwrap();

    let store = SqliteRecordStore::new(&conn);
    match replay(&store, &plan).unwrap_err() {
        SnapshotError::ReplayInterrupted {
            applied,
            total,
            key,
            ..
        } => {
            assert_eq!(applied, 1);
            assert_eq!(total, 2);
            assert_eq!(key.subject_id, roster.art.id);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(entry_count(&conn), 1);
}
