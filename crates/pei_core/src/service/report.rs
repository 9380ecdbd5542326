//! Pending-work reports over the joined view.
//!
//! # Responsibility
//! - Group incomplete entries (`status != Done`) by class or by subject.
//! - Render the groups as one text block for a messenger.
//!
//! # Invariants
//! - Classes are listed in ascending lexical order.
//! - Subjects are listed by display order in both groupings; ties keep
//!   first-seen order.
//! - Nothing incomplete in scope yields `ReportOutcome::FullyComplete`,
//!   never an empty section list.

use crate::model::roster::SubjectId;
use crate::model::status::Term;
use crate::model::view::JoinedStudentView;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};

pub const DEFAULT_REPORT_TITLE: &str = "PEI PENDING ITEMS";

/// Which entity each report section is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportGrouping {
    #[default]
    ByClass,
    BySubject,
}

impl Display for ReportGrouping {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByClass => f.write_str("by_class"),
            Self::BySubject => f.write_str("by_subject"),
        }
    }
}

/// Scope and labelling of one report run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRequest {
    pub grouping: ReportGrouping,
    /// Exact class label. `None` covers every class.
    pub class_filter: Option<String>,
    /// Term the view was loaded for; only used in the title.
    pub term: Option<Term>,
    /// Title prefix. Defaults to `DEFAULT_REPORT_TITLE`.
    pub title: Option<String>,
}

impl ReportRequest {
    pub fn title_line(&self) -> String {
        let prefix = self.title.as_deref().unwrap_or(DEFAULT_REPORT_TITLE);
        let scope = match &self.class_filter {
            Some(class_label) => format!("class {class_label}"),
            None => "all classes".to_string(),
        };
        match self.term {
            Some(term) => format!("*{prefix} - {scope} - term {term}*"),
            None => format!("*{prefix} - {scope}*"),
        }
    }

    fn includes(&self, view: &JoinedStudentView) -> bool {
        self.class_filter
            .as_deref()
            .map_or(true, |class_label| view.student.class_label == class_label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    /// Class label or subject name.
    pub label: String,
    /// One bullet per student.
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReport {
    pub title: String,
    pub grouping: ReportGrouping,
    pub sections: Vec<ReportSection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Pending(PendingReport),
    /// Every entry in scope is `Done`.
    FullyComplete { title: String },
}

impl ReportOutcome {
    pub fn is_fully_complete(&self) -> bool {
        matches!(self, Self::FullyComplete { .. })
    }

    pub fn sections(&self) -> &[ReportSection] {
        match self {
            Self::Pending(report) => &report.sections,
            Self::FullyComplete { .. } => &[],
        }
    }

    /// Text block handed to delivery channels.
    pub fn render(&self) -> String {
        match self {
            Self::FullyComplete { title } => {
                format!("{title}\n\nAll PEIs are complete. Nothing pending.\n")
            }
            Self::Pending(report) => {
                let mut text = format!("{}\n\n", report.title);
                for section in &report.sections {
                    let heading = match report.grouping {
                        ReportGrouping::ByClass => format!("*CLASS: {}*", section.label),
                        ReportGrouping::BySubject => format!("*SUBJECT: {}*", section.label),
                    };
                    text.push_str(&heading);
                    text.push('\n');
                    for line in &section.lines {
                        text.push_str(line);
                        text.push('\n');
                    }
                    text.push('\n');
                }
                text
            }
        }
    }
}

/// Builds the report described by `request` from `view`.
pub fn generate_report(view: &[JoinedStudentView], request: &ReportRequest) -> ReportOutcome {
    let sections = match request.grouping {
        ReportGrouping::ByClass => group_by_class(view, request),
        ReportGrouping::BySubject => group_by_subject(view, request),
    };
    let title = request.title_line();

    if sections.is_empty() {
        return ReportOutcome::FullyComplete { title };
    }
    ReportOutcome::Pending(PendingReport {
        title,
        grouping: request.grouping,
        sections,
    })
}

fn group_by_class(view: &[JoinedStudentView], request: &ReportRequest) -> Vec<ReportSection> {
    let mut classes: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for student_view in view.iter().filter(|candidate| request.includes(candidate)) {
        let pending = student_view.incomplete();
        if pending.is_empty() {
            continue;
        }
        let subjects = pending
            .iter()
            .map(|record| record.subject_label())
            .collect::<Vec<_>>()
            .join(", ");
        classes
            .entry(student_view.student.class_label.as_str())
            .or_default()
            .push(format!("• *{}* ({subjects})", student_view.student.name));
    }

    classes
        .into_iter()
        .map(|(label, lines)| ReportSection {
            label: label.to_string(),
            lines,
        })
        .collect()
}

fn group_by_subject(view: &[JoinedStudentView], request: &ReportRequest) -> Vec<ReportSection> {
    struct SubjectGroup {
        order: i64,
        section: ReportSection,
    }

    let mut index: HashMap<SubjectId, usize> = HashMap::new();
    let mut groups: Vec<SubjectGroup> = Vec::new();

    for student_view in view.iter().filter(|candidate| request.includes(candidate)) {
        for record in student_view.incomplete() {
            let slot = *index.entry(record.entry.subject_id).or_insert_with(|| {
                groups.push(SubjectGroup {
                    order: record.order_key(),
                    section: ReportSection {
                        label: record.subject_label(),
                        lines: Vec::new(),
                    },
                });
                groups.len() - 1
            });
            groups[slot].section.lines.push(format!(
                "• *{}* ({})",
                student_view.student.name, student_view.student.class_label
            ));
        }
    }

    groups.sort_by_key(|group| group.order);
    groups.into_iter().map(|group| group.section).collect()
}
