//! Command-line entry point for the Eisenhower task matrix.
//!
//! # Responsibility
//! - Parse arguments and resolve configuration.
//! - Start logging, open the store and dispatch to `api`.
//! - Map responses to stdout/stderr and the process exit code.

mod api;
mod render;

use api::ActionResponse;
use chrono::{DateTime, Local, Utc};
use clap::{Args, Parser, Subcommand};
use eisenhower_core::db::open_db;
use eisenhower_core::model::settings::parse_bool;
use eisenhower_core::model::snapshot::parse_timestamp;
use eisenhower_core::{
    default_export_file_name, init_logging, AppConfig, ConfigOverrides, Quadrant, TaskId,
    TaskInput, Theme, ViewMode,
};
use log::{error, info};
use rusqlite::Connection;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "eisenhower", version, about = "Eisenhower matrix task manager")]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List tasks in display order.
    List {
        #[arg(long, value_parser = parse_quadrant)]
        quadrant: Option<Quadrant>,
    },
    /// Show the four-quadrant view.
    Matrix {
        #[arg(long, value_parser = parse_quadrant)]
        quadrant: Option<Quadrant>,
    },
    /// Show one task.
    Show { id: TaskId },
    /// Create a task.
    Add {
        title: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, value_parser = parse_quadrant)]
        quadrant: Option<Quadrant>,
        /// YYYY-MM-DD or RFC 3339.
        #[arg(long, value_parser = parse_due)]
        due: Option<DateTime<Utc>>,
    },
    /// Edit a task; fields without a flag keep their current value.
    Edit {
        id: TaskId,
        #[command(flatten)]
        edits: EditArgs,
    },
    /// Move a task to another quadrant.
    Move {
        id: TaskId,
        #[arg(value_parser = parse_quadrant)]
        quadrant: Quadrant,
    },
    /// Flip the completion flag.
    Toggle { id: TaskId },
    Delete { id: TaskId },
    /// Delete every completed task.
    ClearCompleted,
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Write a JSON snapshot of all tasks and settings.
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Restore a JSON snapshot.
    Import {
        file: PathBuf,
        /// Delete all tasks before importing.
        #[arg(long)]
        clear_existing: bool,
    },
}

#[derive(Debug, Args)]
struct EditArgs {
    title: String,
    #[arg(long, conflicts_with = "clear_notes")]
    notes: Option<String>,
    #[arg(long)]
    clear_notes: bool,
    #[arg(long, value_parser = parse_quadrant)]
    quadrant: Option<Quadrant>,
    #[arg(long, value_parser = parse_due, conflicts_with = "clear_due")]
    due: Option<DateTime<Utc>>,
    #[arg(long)]
    clear_due: bool,
    /// true or false.
    #[arg(long, value_parser = parse_flag)]
    completed: Option<FlagValue>,
}

impl EditArgs {
    /// Overlays the given flags onto `current`.
    fn apply(self, current: TaskInput) -> TaskInput {
        TaskInput {
            title: self.title,
            notes: if self.clear_notes {
                None
            } else {
                self.notes.or(current.notes)
            },
            quadrant: self.quadrant.unwrap_or(current.quadrant),
            due_date: if self.clear_due {
                None
            } else {
                self.due.or(current.due_date)
            },
            completed: self.completed.map_or(current.completed, |flag| flag.0),
        }
    }
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    Show,
    /// Light, Dark or System.
    Theme {
        #[arg(value_parser = parse_theme)]
        theme: Theme,
    },
    /// true or false.
    ShowCompleted {
        #[arg(value_parser = parse_flag)]
        show: FlagValue,
    },
    /// Card or List.
    ViewMode {
        #[arg(value_parser = parse_view_mode)]
        view_mode: ViewMode,
    },
}

#[derive(Debug, Clone, Copy)]
struct FlagValue(bool);

fn parse_quadrant(value: &str) -> Result<Quadrant, String> {
    Quadrant::parse(value).map_err(|err| err.to_string())
}

fn parse_due(value: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(value).ok_or_else(|| format!("invalid date `{value}`; expected YYYY-MM-DD"))
}

fn parse_theme(value: &str) -> Result<Theme, String> {
    Theme::parse(value).ok_or_else(|| format!("unknown theme `{value}`"))
}

fn parse_view_mode(value: &str) -> Result<ViewMode, String> {
    ViewMode::parse(value).ok_or_else(|| format!("unknown view mode `{value}`"))
}

fn parse_flag(value: &str) -> Result<FlagValue, String> {
    parse_bool(value)
        .map(FlagValue)
        .ok_or_else(|| format!("expected true or false, got `{value}`"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = AppConfig::from_env(ConfigOverrides {
        db_path: cli.db.clone(),
        log_level: cli.log_level.clone(),
        log_dir: cli.log_dir.clone(),
    });

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=cli_start module=cli status=error error_code=db_open_failed error={err}"
            );
            eprintln!("Could not open database `{}`.", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };

    match run(&conn, cli.command) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(conn: &Connection, command: Command) -> Result<String, String> {
    let now = Utc::now();
    match command {
        Command::List { quadrant } => {
            api::task_list(conn, quadrant).map(|tasks| render::task_list(&tasks, now))
        }
        Command::Matrix { quadrant } => {
            api::matrix(conn, quadrant).map(|view| render::matrix(&view, now))
        }
        Command::Show { id } => match api::task_get(conn, id)? {
            Some(task) => Ok(render::task_detail(&task)),
            None => Err("Task not found.".to_string()),
        },
        Command::Add {
            title,
            notes,
            quadrant,
            due,
        } => {
            let input = build_input(title, notes, quadrant, due);
            let response = api::task_create(conn, &input);
            let created_id = response.task_id;
            respond(response).map(|message| match created_id {
                Some(id) => format!("{message} (#{id})"),
                None => message,
            })
        }
        Command::Edit { id, edits } => {
            let Some(task) = api::task_get(conn, id)? else {
                return Err("Task not found.".to_string());
            };
            let input = edits.apply(task.to_input());
            respond(api::task_update(conn, id, &input))
        }
        Command::Move { id, quadrant } => respond(api::task_move(conn, id, quadrant)),
        Command::Toggle { id } => respond(api::task_toggle(conn, id)),
        Command::Delete { id } => respond(api::task_delete(conn, id)),
        Command::ClearCompleted => respond(api::tasks_clear_completed(conn)),
        Command::Settings(SettingsCommand::Show) => {
            api::settings_summary(conn).map(|summary| render::settings(&summary))
        }
        Command::Settings(SettingsCommand::Theme { theme }) => {
            respond(api::settings_set_theme(conn, theme))
        }
        Command::Settings(SettingsCommand::ShowCompleted { show }) => {
            respond(api::settings_set_show_completed(conn, show.0))
        }
        Command::Settings(SettingsCommand::ViewMode { view_mode }) => {
            respond(api::settings_set_view_mode(conn, view_mode))
        }
        Command::Export { output } => export(conn, output),
        Command::Import {
            file,
            clear_existing,
        } => {
            let raw = std::fs::read_to_string(&file)
                .map_err(|err| format!("Could not read `{}`: {err}", file.display()))?;
            respond(api::snapshot_import(conn, &raw, clear_existing))
        }
    }
}

fn build_input(
    title: String,
    notes: Option<String>,
    quadrant: Option<Quadrant>,
    due: Option<DateTime<Utc>>,
) -> TaskInput {
    let mut input = TaskInput::new(title).with_quadrant(quadrant.unwrap_or_default());
    if let Some(notes) = notes {
        input = input.with_notes(notes);
    }
    if let Some(due) = due {
        input = input.with_due_date(due);
    }
    input
}

fn export(conn: &Connection, output: Option<PathBuf>) -> Result<String, String> {
    let (json, count) = api::snapshot_export(conn)?;
    let path = output.unwrap_or_else(|| PathBuf::from(default_export_file_name(Local::now())));
    std::fs::write(&path, json)
        .map_err(|err| format!("Could not write `{}`: {err}", path.display()))?;
    info!("event=snapshot_export module=cli status=ok tasks={count}");
    Ok(format!("Exported {count} task(s) to {}.", path.display()))
}

fn respond(response: ActionResponse) -> Result<String, String> {
    if response.ok {
        Ok(response.message)
    } else {
        Err(response.message)
    }
}
