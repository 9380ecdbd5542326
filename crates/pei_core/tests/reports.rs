use pei_core::{
    generate_report, JoinedStudentView, ReportGrouping, ReportOutcome, ReportRequest, Status,
    StatusEntry, StatusRecord, Student, Subject,
};
use uuid::Uuid;

fn record(student: &Student, subject: &Subject, status: Status) -> StatusRecord {
    StatusRecord {
        entry: StatusEntry {
            student_id: student.id,
            subject_id: subject.id,
            term: None,
            status,
        },
        subject: Some(subject.meta()),
    }
}

fn view_of(student: &Student, statuses: Vec<StatusRecord>) -> JoinedStudentView {
    JoinedStudentView {
        student: student.clone(),
        statuses,
    }
}

fn by_class(class_filter: Option<&str>) -> ReportRequest {
    ReportRequest {
        grouping: ReportGrouping::ByClass,
        class_filter: class_filter.map(str::to_string),
        ..ReportRequest::default()
    }
}

fn by_subject(class_filter: Option<&str>) -> ReportRequest {
    ReportRequest {
        grouping: ReportGrouping::BySubject,
        class_filter: class_filter.map(str::to_string),
        ..ReportRequest::default()
    }
}

#[test]
fn by_class_lists_only_incomplete_subjects() {
    let math = Subject::new("Math", 1);
    let art = Subject::new("Art", 2);
    let ana = Student::new("Ana", "7A");
    let bia = Student::new("Bia", "7A");
    let view = vec![
        view_of(
            &ana,
            vec![
                record(&ana, &math, Status::Done),
                record(&ana, &art, Status::NotStarted),
            ],
        ),
        view_of(&bia, vec![record(&bia, &math, Status::InReview)]),
    ];

    let outcome = generate_report(&view, &by_class(Some("7A")));

    let sections = outcome.sections();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].label, "7A");
    assert_eq!(sections[0].lines, ["• *Ana* (Art)", "• *Bia* (Math)"]);
}

#[test]
fn by_class_sorts_classes_and_subjects_and_skips_complete_students() {
    let math = Subject::new("Math", 1);
    let art = Subject::new("Art", 2);
    let history = Subject::new("History", 3);
    let caio = Student::new("Caio", "9C");
    let ana = Student::new("Ana", "7A");
    let done = Student::new("Duda", "8B");
    let view = vec![
        view_of(
            &caio,
            vec![
                record(&caio, &history, Status::NotStarted),
                record(&caio, &math, Status::InReview),
            ],
        ),
        view_of(&done, vec![record(&done, &art, Status::Done)]),
        view_of(&ana, vec![record(&ana, &art, Status::InReview)]),
    ];

    let outcome = generate_report(&view, &by_class(None));

    let labels: Vec<&str> = outcome.sections().iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, ["7A", "9C"]);
    assert_eq!(outcome.sections()[1].lines, ["• *Caio* (Math, History)"]);
}

#[test]
fn by_subject_uses_display_order_and_lists_classes() {
    let math = Subject::new("Math", 1);
    let art = Subject::new("Art", 2);
    let ana = Student::new("Ana", "7A");
    let caio = Student::new("Caio", "8B");
    let view = vec![
        view_of(&ana, vec![record(&ana, &art, Status::NotStarted)]),
        view_of(
            &caio,
            vec![
                record(&caio, &math, Status::InReview),
                record(&caio, &art, Status::NotStarted),
            ],
        ),
    ];

    let outcome = generate_report(&view, &by_subject(None));

    let sections = outcome.sections();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].label, "Math");
    assert_eq!(sections[0].lines, ["• *Caio* (8B)"]);
    assert_eq!(sections[1].label, "Art");
    assert_eq!(sections[1].lines, ["• *Ana* (7A)", "• *Caio* (8B)"]);
}

#[test]
fn by_subject_honors_class_filter() {
    let math = Subject::new("Math", 1);
    let ana = Student::new("Ana", "7A");
    let caio = Student::new("Caio", "8B");
    let view = vec![
        view_of(&ana, vec![record(&ana, &math, Status::NotStarted)]),
        view_of(&caio, vec![record(&caio, &math, Status::InReview)]),
    ];

    let outcome = generate_report(&view, &by_subject(Some("7A")));
    let sections = outcome.sections();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].label, "Math");
    assert_eq!(sections[0].lines, ["• *Ana* (7A)"]);

    let outcome = generate_report(&view, &by_subject(Some("9Z")));
    assert!(outcome.is_fully_complete());
}

#[test]
fn all_done_yields_fully_complete_for_both_groupings() {
    let math = Subject::new("Math", 1);
    let ana = Student::new("Ana", "7A");
    let bia = Student::new("Bia", "7B");
    let view = vec![
        view_of(&ana, vec![record(&ana, &math, Status::Done)]),
        view_of(&bia, vec![]),
    ];

    for request in [by_class(None), by_subject(None)] {
        let outcome = generate_report(&view, &request);
        assert!(outcome.is_fully_complete());
        assert!(outcome.render().contains("All PEIs are complete"));
    }
}

#[test]
fn class_filter_outside_view_yields_fully_complete() {
    let math = Subject::new("Math", 1);
    let ana = Student::new("Ana", "7A");
    let view = vec![view_of(&ana, vec![record(&ana, &math, Status::NotStarted)])];

    let outcome = generate_report(&view, &by_class(Some("9Z")));
    assert_eq!(
        outcome,
        ReportOutcome::FullyComplete {
            title: "*PEI PENDING ITEMS - class 9Z*".to_string()
        }
    );
}

#[test]
fn unknown_subject_is_reported_with_placeholder_label() {
    let ana = Student::new("Ana", "7A");
    let orphan = Uuid::new_v4();
    let view = vec![view_of(
        &ana,
        vec![StatusRecord {
            entry: StatusEntry {
                student_id: ana.id,
                subject_id: orphan,
                term: None,
                status: Status::InReview,
            },
            subject: None,
        }],
    )];

    let outcome = generate_report(&view, &by_subject(None));
    assert_eq!(
        outcome.sections()[0].label,
        format!("unknown subject {orphan}")
    );
}

#[test]
fn rendered_block_has_title_then_sections() {
    let math = Subject::new("Math", 1);
    let ana = Student::new("Ana", "7A");
    let view = vec![view_of(&ana, vec![record(&ana, &math, Status::InReview)])];

    let text = generate_report(&view, &by_class(None)).render();
    assert_eq!(
        text,
        "*PEI PENDING ITEMS - all classes*\n\n*CLASS: 7A*\n• *Ana* (Math)\n\n"
    );
}
