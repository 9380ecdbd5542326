//! `pei` command-line front end.
//!
//! # Responsibility
//! - Resolve settings (flags over `PEI_*` environment variables).
//! - Seed the roster, advance statuses, print reports and move snapshots
//!   in and out of the store.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use pei_core::db::open_db;
use pei_core::{
    core_version, init_logging, parse_snapshot_file_name, snapshot_file_name, ReportChannel,
    ReportGrouping, RosterRepository, ShareLinkChannel, SqliteRecordStore, Student, Subject, Term,
    TermMode, TrackerConfig, WriterChannel,
};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "pei", version, about = "Track PEI completion per student and subject")]
struct Cli {
    /// SQLite database file. Overrides PEI_DB_PATH.
    #[arg(long, global = true)]
    db: Option<String>,
    /// `global`, `1`..`4` or `b1`..`b4`. Overrides PEI_TERM.
    #[arg(long, global = true)]
    term: Option<String>,
    /// Overrides PEI_LOG_LEVEL.
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling logs. Overrides PEI_LOG_DIR.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Roster maintenance for students.
    #[command(subcommand)]
    Student(StudentCommand),
    /// Roster maintenance for subjects.
    #[command(subcommand)]
    Subject(SubjectCommand),
    /// Print the joined view.
    List {
        #[arg(long)]
        class: Option<String>,
    },
    /// Move one entry to the next status.
    Advance {
        #[arg(long)]
        student: Uuid,
        #[arg(long)]
        subject: Uuid,
    },
    /// Print the pending-work report.
    Report(ReportArgs),
    /// Write a snapshot of the joined view.
    Export {
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Replay a snapshot into the store.
    Import {
        file: PathBuf,
        /// Term stamped onto entries without one. Defaults to the term in the
        /// file name, then the active term.
        #[arg(long)]
        as_term: Option<u8>,
    },
}

#[derive(Debug, Subcommand)]
enum StudentCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        class: String,
        #[arg(long)]
        segment: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum SubjectCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        order: i64,
    },
    List,
}

#[derive(Debug, Args)]
struct ReportArgs {
    #[arg(long, value_enum, default_value_t = GroupBy::Class)]
    by: GroupBy,
    #[arg(long)]
    class: Option<String>,
    /// Also print a messenger share link.
    #[arg(long)]
    share: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GroupBy {
    Class,
    Subject,
}

impl From<GroupBy> for ReportGrouping {
    fn from(value: GroupBy) -> Self {
        match value {
            GroupBy::Class => ReportGrouping::ByClass,
            GroupBy::Subject => ReportGrouping::BySubject,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).map_err(anyhow::Error::msg)?;
    }
    info!(
        "event=cli_start module=cli status=ok version={} db={} term_mode={}",
        core_version(),
        config.db_path.display(),
        config.term_mode
    );

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let store = SqliteRecordStore::new(&conn);

    match cli.command {
        Command::Student(StudentCommand::Add {
            name,
            class,
            segment,
        }) => {
            let mut student = Student::new(name, class);
            student.segment = segment;
            let id = store.create_student(&student)?;
            println!("{id}");
        }
        Command::Subject(SubjectCommand::Add { name, order }) => {
            let id = store.create_subject(&Subject::new(name, order))?;
            println!("{id}");
        }
        Command::Subject(SubjectCommand::List) => {
            for subject in store.list_subjects()? {
                println!("{}\t{}\t{}", subject.display_order, subject.id, subject.name);
            }
        }
        Command::List { class } => {
            let mut tracker = pei_core::PeiTracker::new(store, config.term_mode);
            tracker.load()?;
            for view in tracker.students_in_class(class.as_deref()) {
                println!(
                    "{} [{}] {}",
                    view.student.name, view.student.class_label, view.student.id
                );
                for record in &view.statuses {
                    println!(
                        "    {:<12} {} {}",
                        record.entry.status,
                        record.entry.subject_id,
                        record.subject_label()
                    );
                }
            }
        }
        Command::Advance { student, subject } => {
            let mut tracker = pei_core::PeiTracker::new(store, config.term_mode);
            tracker.load()?;
            let entry = tracker
                .advance(student, subject)
                .context("status was not changed")?;
            println!("{}", entry.status);
        }
        Command::Report(args) => {
            let mut tracker = pei_core::PeiTracker::new(store, config.term_mode);
            tracker.load()?;
            let outcome = tracker.report(args.by.into(), args.class.as_deref());
            let text = outcome.render();
            WriterChannel::new(std::io::stdout().lock()).deliver(&text)?;
            if args.share {
                ShareLinkChannel::new(std::io::stdout().lock()).deliver(&text)?;
            }
        }
        Command::Export { out_dir } => {
            let mut tracker = pei_core::PeiTracker::new(store, config.term_mode);
            tracker.load()?;
            let text = tracker.export_snapshot()?;
            let name = snapshot_file_name(
                chrono::Local::now().naive_local(),
                tracker.term_mode().term(),
            );
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;
            let path = out_dir.join(name);
            std::fs::write(&path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("{}", path.display());
        }
        Command::Import { file, as_term } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let current_term = import_term(&file, as_term, config.term_mode)?;
            let mut tracker = pei_core::PeiTracker::new(store, config.term_mode);
            let summary = tracker.import_snapshot(&text, current_term)?;
            println!(
                "restored {} entries for {} students",
                summary.upserts_applied, summary.students
            );
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> anyhow::Result<TrackerConfig> {
    let mut config = TrackerConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = pei_core::resolve_db_path(Some(db));
    }
    if let Some(term) = &cli.term {
        config.term_mode = term.parse()?;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    Ok(config)
}

fn import_term(
    file: &std::path::Path,
    explicit: Option<u8>,
    term_mode: TermMode,
) -> anyhow::Result<Option<Term>> {
    if let Some(number) = explicit {
        match Term::from_number(number) {
            Some(term) => return Ok(Some(term)),
            None => bail!("--as-term must be between 1 and 4, got {number}"),
        }
    }
    let from_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(parse_snapshot_file_name)
        .and_then(|info| info.term);
    Ok(from_name.or(term_mode.term()))
}
