//! `chorewheel` command-line trigger.
//!
//! Usage:
//!   chorewheel --db house.db run [--date 2024-05-01] [--config rotation.json]
//!   chorewheel --db house.db add-family "Santos"
//!   chorewheel --db house.db add-member <family> "Ana" 1980-04-02
//!   chorewheel --db house.db add-task <family> "Dishes"
//!   chorewheel --db house.db set-status <assignment> completed
//!   chorewheel --db house.db history <task>

use anyhow::{bail, Context, Result};
use chorewheel_core::db::open_db;
use chorewheel_core::{
    default_log_level, init_logging, AssignmentStatus, Family, Member, MissingAssigneePolicy,
    RotationConfig, RotationService, SqliteAssignmentRepository, SqliteFamilyRepository,
    SqliteTaskRepository, Task,
};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "chorewheel")]
#[command(author, version, about = "Rotate household tasks between family members")]
struct Cli {
    /// SQLite database file (created when missing)
    #[arg(long, value_name = "FILE")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when omitted
    #[arg(long, value_name = "DIR")]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one rotation for every rotation-enabled task
    Run {
        /// Run date (defaults to today, local time)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,

        /// JSON file with rotation settings
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Overrides the missing-assignee policy from the config file
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a family
    AddFamily { name: String },

    /// Add a member to a family
    AddMember {
        family: Uuid,
        name: String,
        #[arg(value_name = "YYYY-MM-DD")]
        birth_date: NaiveDate,
    },

    /// Create a task owned by a family
    AddTask {
        family: Uuid,
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// Keep the task out of rotation runs
        #[arg(long)]
        no_rotation: bool,

        /// Stored for reference; rotation still happens on every run
        #[arg(long, default_value_t = chorewheel_core::DEFAULT_FREQUENCY_DAYS)]
        frequency_days: u32,
    },

    /// Record the completion state of an assignment
    SetStatus {
        assignment: Uuid,
        #[arg(value_enum)]
        status: StatusArg,
    },

    /// Show the assignment history of a task
    History { task: Uuid },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Oldest,
    Restart,
    Fail,
}

impl From<PolicyArg> for MissingAssigneePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Oldest => Self::OldestMember,
            PolicyArg::Restart => Self::RestartCycle,
            PolicyArg::Fail => Self::FailTask,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Completed,
    Skipped,
    Missed,
}

impl From<StatusArg> for AssignmentStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => Self::Pending,
            StatusArg::Completed => Self::Completed,
            StatusArg::Skipped => Self::Skipped,
            StatusArg::Missed => Self::Missed,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;

    match cli.command {
        Commands::Run {
            date,
            config,
            policy,
            json,
        } => run_rotation(&conn, date, config, policy, json),
        Commands::AddFamily { name } => {
            let family = Family::new(name)?;
            SqliteFamilyRepository::try_new(&conn)?.create_family(&family)?;
            println!("{}", family.family_uuid);
            Ok(())
        }
        Commands::AddMember {
            family,
            name,
            birth_date,
        } => {
            let member = Member::new(name, birth_date, Some(family))?;
            SqliteFamilyRepository::try_new(&conn)?.add_member(&member)?;
            println!("{}", member.member_uuid);
            Ok(())
        }
        Commands::AddTask {
            family,
            title,
            description,
            no_rotation,
            frequency_days,
        } => {
            let mut task = Task::new(family, title)?;
            task.description = description;
            task.rotation_enabled = !no_rotation;
            task.frequency_days = frequency_days;
            SqliteTaskRepository::try_new(&conn)?.create_task(&task)?;
            println!("{}", task.task_uuid);
            Ok(())
        }
        Commands::SetStatus { assignment, status } => {
            SqliteAssignmentRepository::try_new(&conn)?.set_status(assignment, status.into())?;
            Ok(())
        }
        Commands::History { task } => {
            let repo = SqliteAssignmentRepository::try_new(&conn)?;
            for assignment in repo.list_assignments(task)? {
                println!(
                    "{} {} {} {}{}",
                    assignment.scheduled_date,
                    assignment.assignment_uuid,
                    assignment.member_uuid,
                    assignment.status.as_str(),
                    if assignment.is_rollover { " rollover" } else { "" }
                );
            }
            Ok(())
        }
    }
}

fn run_rotation(
    conn: &Connection,
    date: Option<NaiveDate>,
    config_path: Option<PathBuf>,
    policy: Option<PolicyArg>,
    json: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => load_config(&path)?,
        None => RotationConfig::default(),
    };
    if let Some(policy) = policy {
        config = config.with_policy(policy.into());
    }

    let run_date = date.unwrap_or_else(|| Local::now().date_naive());
    info!("event=cli_run module=cli status=start run_date={run_date}");

    let service = RotationService::new(
        SqliteTaskRepository::try_new(conn)?,
        SqliteFamilyRepository::try_new(conn)?,
        SqliteAssignmentRepository::try_new(conn)?,
        config,
    );
    let report = service.run(run_date);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "rotation {}: assigned={} already_assigned={} skipped={} failed={} not_run={}",
            report.run_date,
            report.assigned_count(),
            report.already_assigned_count(),
            report.skipped_count(),
            report.failed_count(),
            report.not_run_count()
        );
        for line in &report.outcomes {
            println!("  {} {:?}", line.task_title, line.outcome);
        }
    }

    if let Some(message) = report.task_listing_error {
        bail!("could not list rotation tasks: {message}");
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<RotationConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config `{}`", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config `{}`", path.display()))
}
