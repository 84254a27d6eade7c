//! Command-line driver for `chronos_core`.
//!
//! # Responsibility
//! - Map subcommands onto the core mutation boundary.
//! - Print the day-grouped agenda for the signed-in user.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chronos_core::db::{open_db, open_db_in_dir};
use chronos_core::{
    group_by_day, init_logging, render_sections, AccountService, CardBadge, CoreConfig,
    CreateEventRequest, CreateTaskRequest, EventService, OwnerId, RecordId,
    RegisterProfileRequest, Session, SqliteEventRepository, SqliteProfileRepository,
    SqliteTaskRepository, TaskService, EMPTY_AGENDA_MESSAGE,
};
use clap::{Parser, Subcommand};
use log::info;
use rusqlite::Connection;
use std::fmt::Display;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "chronos", version, about = "Tasks and events grouped by day.")]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file; overrides `data_dir`/`db_file_name` from config.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Owner id of the signed-in user.
    #[arg(long, short, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store the profile of the signed-in user.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
    },
    /// Show the signed-in user's profile.
    Whoami,
    /// Create a task on a date (YYYY-MM-DD) with an optional time (HH:MM).
    AddTask {
        title: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        attachment: Option<String>,
    },
    /// Create an event; `--start` takes `YYYY-MM-DD` or `YYYY-MM-DD HH:MM`.
    AddEvent {
        title: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        all_day: bool,
        #[arg(long)]
        note: Option<String>,
    },
    /// Mark a task completed, or pending again with `--undo`.
    Complete {
        id: RecordId,
        #[arg(long)]
        undo: bool,
    },
    DeleteTask {
        id: RecordId,
    },
    DeleteEvent {
        id: RecordId,
    },
    /// Print tasks and events grouped into yesterday/today/tomorrow/others.
    Agenda,
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => CoreConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CoreConfig::default(),
    };
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).context("initializing logging")?;
    }

    match config.time_zone()? {
        Some(tz) => run_in_zone(cli, &config, &tz),
        None => run_in_zone(cli, &config, &Local),
    }
}

fn run_in_zone<Tz>(cli: Cli, config: &CoreConfig, tz: &Tz) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let conn = match &cli.db {
        Some(path) => open_db(path),
        None => open_db_in_dir(&config.data_dir, &config.db_file_name),
    }
    .context("opening database")?;
    let session = session_for(cli.user.as_deref())?;

    match cli.command {
        Command::Register {
            name,
            last_name,
            email,
        } => {
            let accounts = AccountService::new(SqliteProfileRepository::try_new(&conn)?);
            let profile = accounts.register_profile(
                &session,
                RegisterProfileRequest {
                    name,
                    last_name,
                    email,
                },
            )?;
            println!("registered {} <{}>", profile.full_name(), profile.email);
        }
        Command::Whoami => {
            let accounts = AccountService::new(SqliteProfileRepository::try_new(&conn)?);
            let profile = accounts.get_profile(&session)?;
            println!("{} <{}>", profile.full_name(), profile.email);
        }
        Command::AddTask {
            title,
            date,
            time,
            note,
            attachment,
        } => {
            let date = parse_date(&date)?;
            let time = time.as_deref().map(parse_time).transpose()?;
            let mut request = CreateTaskRequest::at_local(tz, title, date, time)?;
            request.note = note;
            request.attachment_url = attachment;

            let tasks = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
            let task = tasks.create_task(&session, request)?;
            println!("{}", task.id);
        }
        Command::AddEvent {
            title,
            start,
            end,
            all_day,
            note,
        } => {
            let mut request = CreateEventRequest::new(title, parse_instant(tz, &start)?);
            if let Some(end) = end {
                request = request.ending_at(parse_instant(tz, &end)?);
            }
            if all_day {
                request = request.all_day();
            }
            request.note = note;

            let events = EventService::new(SqliteEventRepository::try_new(&conn)?);
            let event = events.create_event(&session, request)?;
            println!("{}", event.id);
        }
        Command::Complete { id, undo } => {
            let tasks = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
            tasks.set_task_completed(&session, id, !undo)?;
        }
        Command::DeleteTask { id } => {
            let tasks = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
            tasks.delete_task(&session, id)?;
        }
        Command::DeleteEvent { id } => {
            let events = EventService::new(SqliteEventRepository::try_new(&conn)?);
            events.delete_event(&session, id)?;
        }
        Command::Agenda => print_agenda(&conn, &session, tz)?,
    }

    Ok(())
}

fn print_agenda<Tz>(conn: &Connection, session: &Session, tz: &Tz) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tasks = TaskService::new(SqliteTaskRepository::try_new(conn)?).list_tasks(session)?;
    let events = EventService::new(SqliteEventRepository::try_new(conn)?).list_events(session)?;
    let now = Local::now().with_timezone(tz);

    let grouped = group_by_day(&tasks, &events, &now);
    info!(
        "event=agenda_print module=cli status=ok grouped={} skipped={}",
        grouped.len(),
        grouped.skipped()
    );
    if grouped.is_empty() {
        println!("{EMPTY_AGENDA_MESSAGE}");
        return Ok(());
    }

    for section in render_sections(&grouped, tz) {
        println!("{}", section.title);
        for card in section.cards {
            let marker = match card.badge {
                CardBadge::Completed => "[x]",
                CardBadge::Pending => "[ ]",
                CardBadge::AllDay | CardBadge::Timed => " * ",
            };
            println!("  {marker} {}  {}  ({})", card.title, card.subtitle, card.id);
        }
    }
    Ok(())
}

fn session_for(user: Option<&str>) -> Result<Session> {
    let Some(user) = user else {
        bail!("--user is required");
    };
    Ok(Session::signed_in(OwnerId::parse(user)?))
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date `{value}`, expected YYYY-MM-DD"))
}

fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .with_context(|| format!("invalid time `{value}`, expected HH:MM"))
}

/// Parses `YYYY-MM-DD HH:MM`, or a bare date meaning the start of that day.
fn parse_instant<Tz: TimeZone>(tz: &Tz, value: &str) -> Result<i64> {
    let value = value.trim();
    let naive = match NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M") {
        Ok(naive) => naive,
        Err(_) => parse_date(value)?.and_time(NaiveTime::MIN),
    };
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|zoned| zoned.timestamp_millis())
        .with_context(|| format!("`{value}` does not exist in this time zone"))
}
